// Represents colour in the kernel. Values are not bounded above; clamping only
// happens when a caller turns them into pixels.

use pmath::util::clamp;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Index, Mul};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    pub fn grey(s: f64) -> Self {
        Color { r: s, g: s, b: s }
    }

    // No more light:
    pub fn black() -> Self {
        Color::grey(0.)
    }

    pub fn white() -> Self {
        Color::grey(1.)
    }

    // Multiplies all of the components by the scale value:
    pub fn scale(self, s: f64) -> Self {
        Color {
            r: self.r * s,
            g: self.g * s,
            b: self.b * s,
        }
    }

    pub fn is_black(self) -> bool {
        self.r == 0. && self.g == 0. && self.b == 0.
    }

    pub fn lerp(self, s2: Self, t: f64) -> Self {
        self.scale(1. - t) + s2.scale(t)
    }

    pub fn clamp(self, low: f64, high: f64) -> Self {
        Color {
            r: clamp(self.r, low, high),
            g: clamp(self.g, low, high),
            b: clamp(self.b, low, high),
        }
    }

    /// Largest absolute component difference, handy when comparing colours.
    pub fn max_difference(self, o: Self) -> f64 {
        (self.r - o.r)
            .abs()
            .max((self.g - o.g).abs())
            .max((self.b - o.b).abs())
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Color {
            r: self.r + rhs.r,
            g: self.g + rhs.g,
            b: self.b + rhs.b,
        }
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

// Component-wise, used for tinting and absorption:
impl Mul for Color {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Color {
            r: self.r * rhs.r,
            g: self.g * rhs.g,
            b: self.b * rhs.b,
        }
    }
}

impl Index<usize> for Color {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.r,
            1 => &self.g,
            2 => &self.b,
            _ => panic!("Index out of range for Color"),
        }
    }
}
