//! Curved rays through graded-index media, in Hamiltonian form.
//!
//! A ray is a point `(x, k)` in phase space that moves along
//! `dx/dtau = dH/dk`, `dk/dtau = -dH/dx` while staying on the shell `H(x, k) = 0`.

pub mod integrator;
pub mod medium;

pub use integrator::{IntegrationScheme, Integrator};
pub use medium::{
    FnIndex, FnMetric, IndexField, IsotropicMedium, LinearGradientIndex, LuneburgIndex, MetricField,
    MetricMedium, UniformIndex, UniformMetric,
};

use crate::error::{invalid, TraceResult};
use pmath::vector::Vec3;

use std::ops::{Add, Mul};

/// Step used by the finite-difference derivatives, relative to the size of the argument.
const DIFFERENCE_STEP: f64 = 1e-6;

const NEWTON_ITERATIONS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSpacePoint {
    /// Position.
    pub x: Vec3<f64>,
    /// Wave vector.
    pub k: Vec3<f64>,
}

impl Add for PhaseSpacePoint {
    type Output = PhaseSpacePoint;

    fn add(self, o: PhaseSpacePoint) -> PhaseSpacePoint {
        PhaseSpacePoint {
            x: self.x + o.x,
            k: self.k + o.k,
        }
    }
}

impl Mul<f64> for PhaseSpacePoint {
    type Output = PhaseSpacePoint;

    fn mul(self, s: f64) -> PhaseSpacePoint {
        PhaseSpacePoint {
            x: self.x.scale(s),
            k: self.k.scale(s),
        }
    }
}

// Central difference of f along each axis.
pub(crate) fn central_difference<F: Fn(Vec3<f64>) -> f64>(f: F, at: Vec3<f64>) -> Vec3<f64> {
    let h = DIFFERENCE_STEP * at.length().max(1.);
    let axis = |i: usize| {
        let mut e = [0.; 3];
        e[i] = h;
        let e = Vec3::from_arr(e);
        (f(at + e) - f(at - e)) / (2. * h)
    };
    Vec3::new(axis(0), axis(1), axis(2))
}

/// A medium, described by its Hamiltonian.
///
/// Only `value` has to be provided; the derivatives default to finite differences.
pub trait Hamiltonian: Send + Sync {
    fn value(&self, x: Vec3<f64>, k: Vec3<f64>) -> f64;

    fn dh_dk(&self, x: Vec3<f64>, k: Vec3<f64>) -> Vec3<f64> {
        central_difference(|k| self.value(x, k), k)
    }

    fn dh_dx(&self, x: Vec3<f64>, k: Vec3<f64>) -> Vec3<f64> {
        central_difference(|x| self.value(x, k), x)
    }

    /// The wave vector `k = lambda * dir` (with `lambda > 0`) on the shell `H = 0`.
    ///
    /// The default solves for `lambda` with Newton's method, starting from 1.
    fn initial_wavevector(&self, x: Vec3<f64>, dir: Vec3<f64>) -> TraceResult<Vec3<f64>> {
        newton_wavevector(self, x, dir)
    }
}

// Solves H(x, lambda * dir) = 0 for lambda > 0, starting from lambda = 1.
pub(crate) fn newton_wavevector<H: Hamiltonian + ?Sized>(
    h: &H,
    x: Vec3<f64>,
    dir: Vec3<f64>,
) -> TraceResult<Vec3<f64>> {
    let d = dir.normalize();
    let mut lambda = 1.;
    for _ in 0..NEWTON_ITERATIONS {
        let k = d.scale(lambda);
        let value = h.value(x, k);
        let slope = h.dh_dk(x, k).dot(d);
        if slope == 0. || !slope.is_finite() {
            break;
        }
        let step = value / slope;
        lambda -= step;
        if step.abs() <= 1e-12 * lambda.abs().max(1.) {
            if lambda > 0. {
                return Ok(d.scale(lambda));
            }
            break;
        }
    }
    invalid(format!(
        "no wave vector on the shell H = 0 at ({}, {}, {}) along ({}, {}, {})",
        x.x, x.y, x.z, d.x, d.y, d.z
    ))
}

impl<H: Hamiltonian + ?Sized> Hamiltonian for Box<H> {
    fn value(&self, x: Vec3<f64>, k: Vec3<f64>) -> f64 {
        (**self).value(x, k)
    }

    fn dh_dk(&self, x: Vec3<f64>, k: Vec3<f64>) -> Vec3<f64> {
        (**self).dh_dk(x, k)
    }

    fn dh_dx(&self, x: Vec3<f64>, k: Vec3<f64>) -> Vec3<f64> {
        (**self).dh_dx(x, k)
    }

    fn initial_wavevector(&self, x: Vec3<f64>, dir: Vec3<f64>) -> TraceResult<Vec3<f64>> {
        (**self).initial_wavevector(x, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_close, assert_vec_close};
    use test_log::test;

    /// H = |k|^4 - 16, numerically differentiated.
    struct Quartic;

    impl Hamiltonian for Quartic {
        fn value(&self, _: Vec3<f64>, k: Vec3<f64>) -> f64 {
            k.length2() * k.length2() - 16.
        }
    }

    #[test]
    fn newton_finds_the_shell() {
        let k = Quartic
            .initial_wavevector(Vec3::zero(), Vec3::new(0., 3., 4.))
            .unwrap();
        assert_vec_close(k, Vec3::new(0., 1.2, 1.6), 1e-9);
    }

    #[test]
    fn numerical_derivatives() {
        let k = Vec3::new(1., -2., 0.5);
        let expected = k.scale(4. * k.length2());
        assert_vec_close(Quartic.dh_dk(Vec3::zero(), k), expected, 1e-5);
        assert_close(Quartic.dh_dx(Vec3::zero(), k).length(), 0., 1e-9);
    }

    /// No real shell: H = |k|^2 + 1.
    struct Massive;

    impl Hamiltonian for Massive {
        fn value(&self, _: Vec3<f64>, k: Vec3<f64>) -> f64 {
            k.length2() + 1.
        }
    }

    #[test]
    fn missing_shell_is_an_error() {
        assert!(Massive
            .initial_wavevector(Vec3::zero(), Vec3::new(1., 0., 0.))
            .is_err());
    }
}
