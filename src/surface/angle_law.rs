//! Generalised refraction: the outgoing angle is an arbitrary function of the angle of
//! incidence.
//!
//! The outgoing ray stays in the plane of incidence and on the transmission side of the
//! surface. A law may return a negative angle, which sends the ray to the other side of
//! the normal (negative refraction).

use super::{transmit_or_reflect, SurfaceBehavior};
use crate::error::{check_coefficient, TraceResult};
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::{angle_of_incidence, Evanescent, Side};
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;
use pmath::numbers::Float;
use pmath::util::coord_system;
use pmath::vector::Vec3;

/// Maps the angle of incidence (in `[0, pi/2]`) to the outgoing angle (in
/// `(-pi/2, pi/2)`).
pub trait AngleLaw: Send + Sync {
    fn outgoing_angle(&self, alpha: f64) -> Result<f64, Evanescent>;
}

fn checked(alpha: f64) -> Result<f64, Evanescent> {
    if alpha.is_finite() && alpha.abs() < f64::PI_OVER_2 {
        Ok(alpha)
    } else {
        Err(Evanescent)
    }
}

/// `sin a' = ratio * sin a`, where `ratio` is `n_incident / n_transmitted`.
#[derive(Clone, Copy, Debug)]
pub struct Snell(pub f64);

impl AngleLaw for Snell {
    fn outgoing_angle(&self, alpha: f64) -> Result<f64, Evanescent> {
        let s = self.0 * alpha.sin();
        if s.abs() > 1. {
            return Err(Evanescent);
        }
        Ok(s.asin())
    }
}

/// Confocal lenslet arrays: `tan a' = eta * tan a`.
#[derive(Clone, Copy, Debug)]
pub struct ConfocalLenslets(pub f64);

impl AngleLaw for ConfocalLenslets {
    fn outgoing_angle(&self, alpha: f64) -> Result<f64, Evanescent> {
        checked((alpha.tan() * self.0).atan())
    }
}

/// `a' = a + delta`.
#[derive(Clone, Copy, Debug)]
pub struct Offset(pub f64);

impl AngleLaw for Offset {
    fn outgoing_angle(&self, alpha: f64) -> Result<f64, Evanescent> {
        checked(alpha + self.0)
    }
}

/// `a' = k * a`.
#[derive(Clone, Copy, Debug)]
pub struct Scaled(pub f64);

impl AngleLaw for Scaled {
    fn outgoing_angle(&self, alpha: f64) -> Result<f64, Evanescent> {
        checked(alpha * self.0)
    }
}

/// Leaves the angle alone.
#[derive(Clone, Copy, Debug)]
pub struct Identity;

impl AngleLaw for Identity {
    fn outgoing_angle(&self, alpha: f64) -> Result<f64, Evanescent> {
        Ok(alpha)
    }
}

/// An angle law given by a closure; `None` means there is no outgoing ray.
pub struct FnLaw<F>(F);

impl<F> FnLaw<F>
where
    F: Fn(f64) -> Option<f64> + Send + Sync,
{
    pub fn new(law: F) -> Self {
        FnLaw(law)
    }
}

impl<F> AngleLaw for FnLaw<F>
where
    F: Fn(f64) -> Option<f64> + Send + Sync,
{
    fn outgoing_angle(&self, alpha: f64) -> Result<f64, Evanescent> {
        (self.0)(alpha).ok_or(Evanescent).and_then(checked)
    }
}

/// Refraction with separate angle laws for rays entering and exiting the surface.
pub struct GeneralisedRefraction {
    entering: Box<dyn AngleLaw>,
    exiting: Box<dyn AngleLaw>,
    coefficient: f64,
    shadow_throwing: bool,
}

impl GeneralisedRefraction {
    pub fn new<E, X>(entering: E, exiting: X, coefficient: f64) -> TraceResult<Self>
    where
        E: AngleLaw + 'static,
        X: AngleLaw + 'static,
    {
        Ok(GeneralisedRefraction {
            entering: Box::new(entering),
            exiting: Box::new(exiting),
            coefficient: check_coefficient(coefficient)?,
            shadow_throwing: false,
        })
    }

    /// Ordinary refraction with `ratio = n_outside / n_inside`, written as an angle law.
    pub fn snell(ratio: f64, coefficient: f64) -> TraceResult<Self> {
        GeneralisedRefraction::new(Snell(ratio), Snell(1. / ratio), coefficient)
    }

    /// A sheet of confocal lenslet arrays with focal-length ratio `eta`.
    pub fn confocal_lenslets(eta: f64, coefficient: f64) -> TraceResult<Self> {
        GeneralisedRefraction::new(ConfocalLenslets(eta), ConfocalLenslets(1. / eta), coefficient)
    }

    pub fn shadow_throwing(mut self, shadow_throwing: bool) -> Self {
        self.shadow_throwing = shadow_throwing;
        self
    }

    /// The outgoing direction for the incident direction `d` at a surface with outward
    /// unit normal `n`.
    pub fn outgoing_direction(&self, d: Vec3<f64>, n: Vec3<f64>) -> Result<Vec3<f64>, Evanescent> {
        let d = d.normalize();
        let law = match Side::of(d, n) {
            Side::Entering => &self.entering,
            Side::Exiting => &self.exiting,
        };
        let alpha_out = law.outgoing_angle(angle_of_incidence(d, n))?;

        // At normal incidence the plane of incidence is undefined; any tangent will do.
        let t = match d.perpendicular_to(n).try_normalize() {
            Some(t) => t,
            None => coord_system(n).0,
        };
        let normal_sign = d.dot(n).sign_of();
        Ok(t.scale(alpha_out.sin()) + n.scale(normal_sign * alpha_out.cos()))
    }
}

impl SurfaceBehavior for GeneralisedRefraction {
    fn interact(
        &self,
        ray: &Ray,
        hit: &Intersection,
        scene: &dyn Scene,
        light: &dyn LightSource,
        budget: TraceBudget,
    ) -> TraceResult<Color> {
        if budget.is_exhausted() {
            return Ok(Color::black());
        }
        let outgoing = self.outgoing_direction(ray.dir, hit.normal());
        transmit_or_reflect(outgoing, self.coefficient, ray, hit, scene, light, budget)
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_throwing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::NoLight;
    use crate::optics::refract_through;
    use crate::testing::{assert_close, assert_vec_close, hit_on_plane, RecordingScene};
    use test_log::test;

    const N: Vec3<f64> = Vec3 {
        x: 0.,
        y: 0.,
        z: 1.,
    };

    #[test]
    fn snell_law_matches_vector_refraction() {
        let surface = GeneralisedRefraction::snell(1. / 1.33, 1.).unwrap();
        for &d in &[
            Vec3::new(0.3, -0.2, -1.),
            Vec3::new(-0.7, 0.1, 0.8),
            Vec3::new(0., 0., -1.),
        ] {
            let expected = refract_through(d, N, 1. / 1.33).unwrap();
            assert_vec_close(surface.outgoing_direction(d, N).unwrap(), expected, 1e-12);
        }
    }

    #[test]
    fn offset_law_adds_angle() {
        let surface = GeneralisedRefraction::new(Offset(0.2), Identity, 1.).unwrap();
        let alpha: f64 = 0.3;
        let out = surface
            .outgoing_direction(Vec3::new(alpha.sin(), 0., -alpha.cos()), N)
            .unwrap();
        assert_close(out.x.asin(), 0.5, 1e-12);
        assert!(out.z < 0.);
        // Far enough out the law has no outgoing ray:
        let grazing = Vec3::new(1.45f64.sin(), 0., -1.45f64.cos());
        assert_eq!(surface.outgoing_direction(grazing, N), Err(Evanescent));
    }

    #[test]
    fn negative_angles_cross_the_normal() {
        let surface = GeneralisedRefraction::new(Scaled(-1.), Scaled(-1.), 1.).unwrap();
        let out = surface.outgoing_direction(Vec3::new(0.5, 0., -1.), N).unwrap();
        assert_vec_close(out, Vec3::new(-0.5, 0., -1.).normalize(), 1e-12);
    }

    #[test]
    fn closure_law_failure_reflects() {
        let scene = RecordingScene::new(Color::white());
        let surface = GeneralisedRefraction::new(FnLaw::new(|_| None), Identity, 0.5).unwrap();
        let (plane, ray) = hit_on_plane(Vec3::new(0.2, 0., -1.));
        let c = surface
            .interact(&ray, &plane.hit(&ray), &scene, &NoLight, TraceBudget::new(3))
            .unwrap();
        // Reflection is lossless, unlike transmission:
        assert_eq!(c, Color::white());
        assert_vec_close(scene.traced()[0].dir, Vec3::new(0.2, 0., 1.).normalize(), 1e-12);
    }

    #[test]
    fn confocal_lenslets_scale_tangent() {
        let law = ConfocalLenslets(-2.);
        let alpha: f64 = 0.4;
        assert_close(law.outgoing_angle(alpha).unwrap().tan(), -2. * alpha.tan(), 1e-12);

        // Going back out through the same sheet retraces the ray:
        let sheet = GeneralisedRefraction::confocal_lenslets(0.5, 1.).unwrap();
        assert!(GeneralisedRefraction::confocal_lenslets(0.5, 2.).is_err());
        let d = Vec3::new(0.3, 0.2, -1.).normalize();
        let inside = sheet.outgoing_direction(d, N).unwrap();
        let back = sheet.outgoing_direction(-inside, N).unwrap();
        assert_vec_close(back, -d, 1e-12);
    }
}
