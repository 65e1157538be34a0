// Float trait used by the vector types. It is num_traits' float with the
// handful of constants the optics code keeps reaching for.

use num_traits;

pub trait Float: num_traits::Float + num_traits::Bounded {
    const PI: Self;
    const PI_OVER_2: Self;
    const PI_OVER_4: Self;
    const SQRT_2: Self;
    /// Anything shorter than this is treated as a zero-length vector.
    const DEGENERATE_LENGTH2: Self;

    fn two() -> Self;
    fn half() -> Self;

    /// `1` for non-negative values and `-1` otherwise. Unlike `signum`, zero maps to `1`.
    fn sign_of(self) -> Self {
        if self < Self::zero() {
            -Self::one()
        } else {
            Self::one()
        }
    }
}

impl Float for f32 {
    const PI: Self = std::f32::consts::PI;
    const PI_OVER_2: Self = std::f32::consts::FRAC_PI_2;
    const PI_OVER_4: Self = std::f32::consts::FRAC_PI_4;
    const SQRT_2: Self = std::f32::consts::SQRT_2;
    const DEGENERATE_LENGTH2: Self = 1e-12;

    fn two() -> Self {
        2f32
    }

    fn half() -> Self {
        0.5f32
    }
}

impl Float for f64 {
    const PI: Self = std::f64::consts::PI;
    const PI_OVER_2: Self = std::f64::consts::FRAC_PI_2;
    const PI_OVER_4: Self = std::f64::consts::FRAC_PI_4;
    const SQRT_2: Self = std::f64::consts::SQRT_2;
    const DEGENERATE_LENGTH2: Self = 1e-24;

    fn two() -> Self {
        2.
    }

    fn half() -> Self {
        0.5
    }
}
