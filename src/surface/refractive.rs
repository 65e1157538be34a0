use super::{trace_branch, transmit_or_reflect, SurfaceBehavior};
use crate::error::{check_coefficient, invalid, TraceResult};
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::{fresnel_dielectric, reflect, refract_through, Side};
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;
use log::debug;

/// A surface the ray passes through without changing direction.
#[derive(Clone, Copy, Debug)]
pub struct Transparent {
    coefficient: f64,
    shadow_throwing: bool,
}

impl Transparent {
    pub fn new(coefficient: f64) -> TraceResult<Self> {
        Ok(Transparent {
            coefficient: check_coefficient(coefficient)?,
            ..Transparent::perfect()
        })
    }

    pub fn perfect() -> Self {
        Transparent {
            coefficient: 1.,
            shadow_throwing: false,
        }
    }

    pub fn shadow_throwing(mut self, shadow_throwing: bool) -> Self {
        self.shadow_throwing = shadow_throwing;
        self
    }
}

impl SurfaceBehavior for Transparent {
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
        Ok(trace_branch(ray, hit, ray.dir, scene, light, budget)?.scale(self.coefficient))
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_throwing
    }
}

/// The interface between two isotropic media.
///
/// `ratio` is `n_outside / n_inside`, the ratio of the refractive index on the side the
/// outward normal points into to the one on the other side. Totally internally reflected
/// rays are traced without loss; transmitted rays are scaled by the transmission
/// coefficient.
#[derive(Clone, Copy, Debug)]
pub struct Refractive {
    ratio: f64,
    coefficient: f64,
    shadow_throwing: bool,
}

impl Refractive {
    pub fn new(ratio: f64, coefficient: f64) -> TraceResult<Self> {
        if !(ratio > 0.) || !ratio.is_finite() {
            return invalid(format!("refractive index ratio must be positive, got {}", ratio));
        }
        Ok(Refractive {
            ratio,
            coefficient: check_coefficient(coefficient)?,
            shadow_throwing: true,
        })
    }

    /// The surface of an object with index `n_inside` in a medium of index `n_outside`.
    pub fn between(n_outside: f64, n_inside: f64, coefficient: f64) -> TraceResult<Self> {
        Refractive::new(n_outside / n_inside, coefficient)
    }

    pub fn shadow_throwing(mut self, shadow_throwing: bool) -> Self {
        self.shadow_throwing = shadow_throwing;
        self
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

impl SurfaceBehavior for Refractive {
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
        let outgoing = refract_through(ray.dir, hit.normal(), self.ratio);
        if outgoing.is_err() {
            debug!("total internal reflection at \"{}\"", hit.primitive.name());
        }
        transmit_or_reflect(outgoing, self.coefficient, ray, hit, scene, light, budget)
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_throwing
    }
}

/// A dielectric interface whose reflected and refracted rays are weighted with the
/// Fresnel reflectance for unpolarised light.
#[derive(Clone, Copy, Debug)]
pub struct FresnelRefractive {
    eta_outside: f64,
    eta_inside: f64,
    coefficient: f64,
    shadow_throwing: bool,
}

impl FresnelRefractive {
    pub fn new(eta_outside: f64, eta_inside: f64, coefficient: f64) -> TraceResult<Self> {
        if !(eta_outside > 0.) || !(eta_inside > 0.) {
            return invalid(format!(
                "refractive indices must be positive, got {} and {}",
                eta_outside, eta_inside
            ));
        }
        Ok(FresnelRefractive {
            eta_outside,
            eta_inside,
            coefficient: check_coefficient(coefficient)?,
            shadow_throwing: true,
        })
    }

    pub fn shadow_throwing(mut self, shadow_throwing: bool) -> Self {
        self.shadow_throwing = shadow_throwing;
        self
    }
}

impl SurfaceBehavior for FresnelRefractive {
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
        let d = ray.dir.normalize();
        let n = hit.normal();
        let (eta_i, eta_t) = match Side::of(d, n) {
            Side::Entering => (self.eta_outside, self.eta_inside),
            Side::Exiting => (self.eta_inside, self.eta_outside),
        };

        let reflectance = fresnel_dielectric(d.dot(n), eta_i, eta_t);
        let reflected = trace_branch(ray, hit, reflect(d, n), scene, light, budget)?;
        if reflectance >= 1. {
            debug!("total internal reflection at \"{}\"", hit.primitive.name());
            return Ok(reflected);
        }

        let refracted = match refract_through(d, n, self.eta_outside / self.eta_inside) {
            Ok(dir) => trace_branch(ray, hit, dir, scene, light, budget)?,
            Err(_) => Color::black(),
        };
        Ok(reflected.scale(reflectance) + refracted.scale((1. - reflectance) * self.coefficient))
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_throwing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::NoLight;
    use crate::optics::critical_angle;
    use crate::testing::{assert_close, assert_vec_close, hit_on_plane, RecordingScene};
    use pmath::vector::Vec3;
    use test_log::test;

    #[test]
    fn transparent_keeps_direction() {
        let scene = RecordingScene::new(Color::white());
        let (plane, ray) = hit_on_plane(Vec3::new(0.3, 0.2, -1.));
        let hit = plane.hit(&ray);
        let c = Transparent::new(0.5)
            .unwrap()
            .interact(&ray, &hit, &scene, &NoLight, TraceBudget::new(2))
            .unwrap();
        assert_eq!(c, Color::grey(0.5));
        assert_eq!(scene.traced()[0].dir, ray.dir);
        assert_eq!(scene.traced()[0].org, hit.p);
    }

    #[test]
    fn coefficients_outside_the_unit_interval_are_rejected() {
        for &c in &[-0.1, 1.5, f64::NAN] {
            assert!(Transparent::new(c).is_err());
            assert!(Refractive::new(0.8, c).is_err());
            assert!(FresnelRefractive::new(1., 1.5, c).is_err());
        }
        assert!(Transparent::new(0.).is_ok());
        assert!(Refractive::new(0.8, 1.).is_ok());
    }

    #[test]
    fn refracts_into_denser_medium() {
        let scene = RecordingScene::new(Color::white());
        let alpha: f64 = 0.5;
        let (plane, ray) = hit_on_plane(Vec3::new(alpha.sin(), 0., -alpha.cos()));
        let hit = plane.hit(&ray);
        let glass = Refractive::between(1., 1.5, 0.9).unwrap();
        let c = glass
            .interact(&ray, &hit, &scene, &NoLight, TraceBudget::new(2))
            .unwrap();
        assert_eq!(c, Color::grey(0.9));
        let out = scene.traced()[0].dir;
        assert_close(alpha.sin(), 1.5 * out.x, 1e-12);
        assert!(out.z < 0.);
    }

    #[test]
    fn tir_reflects_without_loss() {
        let scene = RecordingScene::new(Color::white());
        let alpha = critical_angle(1.5).unwrap() + 0.05;
        // Travelling upwards, from inside the glass:
        let (plane, ray) = hit_on_plane(Vec3::new(alpha.sin(), 0., alpha.cos()));
        let hit = plane.hit(&ray);
        let glass = Refractive::between(1., 1.5, 0.5).unwrap();
        let c = glass
            .interact(&ray, &hit, &scene, &NoLight, TraceBudget::new(2))
            .unwrap();
        assert_eq!(c, Color::white());
        assert_vec_close(
            scene.traced()[0].dir,
            Vec3::new(alpha.sin(), 0., -alpha.cos()),
            1e-12,
        );
    }

    #[test]
    fn rejects_non_positive_ratio() {
        assert!(Refractive::new(0., 1.).is_err());
        assert!(Refractive::new(-1.5, 1.).is_err());
        assert!(FresnelRefractive::new(1., 0., 1.).is_err());
    }

    #[test]
    fn fresnel_splits_energy() {
        let scene = RecordingScene::new(Color::white());
        let (plane, ray) = hit_on_plane(Vec3::new(0., 0., -1.));
        let hit = plane.hit(&ray);
        let c = FresnelRefractive::new(1., 1.5, 1.)
            .unwrap()
            .interact(&ray, &hit, &scene, &NoLight, TraceBudget::new(2))
            .unwrap();
        assert_close(c.r, 1., 1e-12);
        assert_eq!(scene.traced().len(), 2);
    }
}
