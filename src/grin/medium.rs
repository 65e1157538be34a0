use super::{central_difference, newton_wavevector, Hamiltonian};
use crate::error::{invalid, TraceResult};
use pmath::matrix::Mat3;
use pmath::vector::Vec3;

/// A scalar refractive-index field.
pub trait IndexField: Send + Sync {
    fn index(&self, x: Vec3<f64>) -> f64;

    fn gradient(&self, x: Vec3<f64>) -> Vec3<f64> {
        central_difference(|x| self.index(x), x)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct UniformIndex(pub f64);

impl IndexField for UniformIndex {
    fn index(&self, _: Vec3<f64>) -> f64 {
        self.0
    }

    fn gradient(&self, _: Vec3<f64>) -> Vec3<f64> {
        Vec3::zero()
    }
}

/// `n(x) = n0 + gradient . (x - origin)`.
#[derive(Clone, Copy, Debug)]
pub struct LinearGradientIndex {
    pub n0: f64,
    pub gradient: Vec3<f64>,
    pub origin: Vec3<f64>,
}

impl IndexField for LinearGradientIndex {
    fn index(&self, x: Vec3<f64>) -> f64 {
        self.n0 + self.gradient.dot(x - self.origin)
    }

    fn gradient(&self, _: Vec3<f64>) -> Vec3<f64> {
        self.gradient
    }
}

/// The Luneburg lens, `n = sqrt(2 - (r / R)^2)` inside radius `R`, 1 outside. Parallel
/// light entering it is focussed to a point on the opposite side of its surface.
#[derive(Clone, Copy, Debug)]
pub struct LuneburgIndex {
    pub centre: Vec3<f64>,
    pub radius: f64,
}

impl IndexField for LuneburgIndex {
    fn index(&self, x: Vec3<f64>) -> f64 {
        let s2 = (x - self.centre).length2() / (self.radius * self.radius);
        if s2 < 1. {
            (2. - s2).sqrt()
        } else {
            1.
        }
    }

    fn gradient(&self, x: Vec3<f64>) -> Vec3<f64> {
        let r = x - self.centre;
        let r2 = self.radius * self.radius;
        if r.length2() < r2 {
            r.scale(-1. / (r2 * self.index(x)))
        } else {
            Vec3::zero()
        }
    }
}

/// An index field given by a closure.
pub struct FnIndex<F>(F);

impl<F> FnIndex<F>
where
    F: Fn(Vec3<f64>) -> f64 + Send + Sync,
{
    pub fn new(index: F) -> Self {
        FnIndex(index)
    }
}

impl<F> IndexField for FnIndex<F>
where
    F: Fn(Vec3<f64>) -> f64 + Send + Sync,
{
    fn index(&self, x: Vec3<f64>) -> f64 {
        (self.0)(x)
    }
}

/// An isotropic medium, `H = |k|^2 n - n^3`. On the shell `|k| = n`.
pub struct IsotropicMedium<F: IndexField> {
    field: F,
}

impl<F: IndexField> IsotropicMedium<F> {
    pub fn new(field: F) -> Self {
        IsotropicMedium { field }
    }

    pub fn field(&self) -> &F {
        &self.field
    }
}

impl<F: IndexField> Hamiltonian for IsotropicMedium<F> {
    fn value(&self, x: Vec3<f64>, k: Vec3<f64>) -> f64 {
        let n = self.field.index(x);
        k.length2() * n - n * n * n
    }

    fn dh_dk(&self, x: Vec3<f64>, k: Vec3<f64>) -> Vec3<f64> {
        k.scale(2. * self.field.index(x))
    }

    fn dh_dx(&self, x: Vec3<f64>, k: Vec3<f64>) -> Vec3<f64> {
        let n = self.field.index(x);
        self.field.gradient(x).scale(k.length2() - 3. * n * n)
    }

    fn initial_wavevector(&self, x: Vec3<f64>, dir: Vec3<f64>) -> TraceResult<Vec3<f64>> {
        let n = self.field.index(x);
        if !(n > 0.) {
            return invalid(format!("refractive index must be positive, got {}", n));
        }
        Ok(dir.normalize().scale(n))
    }
}

/// A symmetric tensor field.
pub trait MetricField: Send + Sync {
    fn metric(&self, x: Vec3<f64>) -> Mat3<f64>;
}

#[derive(Clone, Copy, Debug)]
pub struct UniformMetric(pub Mat3<f64>);

impl MetricField for UniformMetric {
    fn metric(&self, _: Vec3<f64>) -> Mat3<f64> {
        self.0
    }
}

pub struct FnMetric<F>(F);

impl<F> FnMetric<F>
where
    F: Fn(Vec3<f64>) -> Mat3<f64> + Send + Sync,
{
    pub fn new(metric: F) -> Self {
        FnMetric(metric)
    }
}

impl<F> MetricField for FnMetric<F>
where
    F: Fn(Vec3<f64>) -> Mat3<f64> + Send + Sync,
{
    fn metric(&self, x: Vec3<f64>) -> Mat3<f64> {
        (self.0)(x)
    }
}

/// An impedance-matched anisotropic medium with permittivity = permeability = `g`,
/// `H = k^T g k - det g`. With `g = n I` this is the isotropic medium of index `n`.
pub struct MetricMedium<M: MetricField> {
    field: M,
}

impl<M: MetricField> MetricMedium<M> {
    pub fn new(field: M) -> Self {
        MetricMedium { field }
    }
}

impl<M: MetricField> Hamiltonian for MetricMedium<M> {
    fn value(&self, x: Vec3<f64>, k: Vec3<f64>) -> f64 {
        let g = self.field.metric(x);
        g.quadratic_form(k) - g.determinant()
    }

    fn dh_dk(&self, x: Vec3<f64>, k: Vec3<f64>) -> Vec3<f64> {
        self.field.metric(x).vec_mul(k).scale(2.)
    }

    fn initial_wavevector(&self, x: Vec3<f64>, dir: Vec3<f64>) -> TraceResult<Vec3<f64>> {
        if !self.field.metric(x).is_symmetric(1e-12) {
            return invalid(format!(
                "metric tensor at ({}, {}, {}) is not symmetric",
                x.x, x.y, x.z
            ));
        }
        newton_wavevector(self, x, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_close, assert_vec_close};
    use test_log::test;

    #[test]
    fn luneburg_index_and_gradient() {
        let lens = LuneburgIndex {
            centre: Vec3::new(1., 0., 0.),
            radius: 2.,
        };
        assert_close(lens.index(Vec3::new(1., 0., 0.)), 2f64.sqrt(), 1e-15);
        assert_close(lens.index(Vec3::new(1., 0., 1.99999)), 1., 1e-4);
        assert_close(lens.index(Vec3::new(5., 0., 0.)), 1., 0.);

        let x = Vec3::new(1.5, 0.3, -0.7);
        let numerical = central_difference(|x| lens.index(x), x);
        assert_vec_close(lens.gradient(x), numerical, 1e-8);
    }

    #[test]
    fn isotropic_shell_and_derivatives() {
        let medium = IsotropicMedium::new(LinearGradientIndex {
            n0: 1.5,
            gradient: Vec3::new(0., 0.1, 0.),
            origin: Vec3::zero(),
        });
        let x = Vec3::new(0.2, 1., 0.);
        let k = medium.initial_wavevector(x, Vec3::new(3., 0., 4.)).unwrap();
        assert_close(k.length(), 1.6, 1e-12);
        assert_close(medium.value(x, k), 0., 1e-12);

        let numerical = central_difference(|x| medium.value(x, k), x);
        assert_vec_close(medium.dh_dx(x, k), numerical, 1e-7);

        assert!(IsotropicMedium::new(UniformIndex(0.))
            .initial_wavevector(x, Vec3::new(1., 0., 0.))
            .is_err());
    }

    #[test]
    fn scaled_identity_metric_is_isotropic() {
        let metric = MetricMedium::new(UniformMetric(Mat3::identity().scale(1.5)));
        let isotropic = IsotropicMedium::new(UniformIndex(1.5));
        let x = Vec3::new(0.1, 0.2, 0.3);
        let dir = Vec3::new(1., 1., 0.);

        // Newton on the metric Hamiltonian finds the same shell:
        let k = metric.initial_wavevector(x, dir).unwrap();
        assert_vec_close(k, isotropic.initial_wavevector(x, dir).unwrap(), 1e-9);
        assert_close(metric.value(x, k), isotropic.value(x, k), 1e-9);
        assert_vec_close(metric.dh_dk(x, k), isotropic.dh_dk(x, k), 1e-9);
    }

    #[test]
    fn asymmetric_metric_is_rejected() {
        let skewed = Mat3::from_rows(
            Vec3::new(1., 0.5, 0.),
            Vec3::new(0., 1., 0.),
            Vec3::new(0., 0., 1.),
        );
        let metric = MetricMedium::new(UniformMetric(skewed));
        assert!(metric.initial_wavevector(Vec3::zero(), Vec3::new(1., 0., 0.)).is_err());
    }
}
