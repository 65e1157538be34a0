use super::Primitive;
use crate::interaction::SurfaceCoordinates;
use crate::ray::Ray;
use crate::surface::SurfaceBehavior;
use pmath::numbers::Float;
use pmath::util::{clamp, quadratic};
use pmath::vector::{Vec2, Vec3};

/// A sphere, parameterised by azimuth `u = φ` (about the z axis) and polar angle `v = θ`.
pub struct Sphere {
    name: String,
    centre: Vec3<f64>,
    radius: f64,
    surface: Box<dyn SurfaceBehavior>,
}

impl Sphere {
    pub fn new<S: SurfaceBehavior + 'static>(
        name: &str,
        centre: Vec3<f64>,
        radius: f64,
        surface: S,
    ) -> Self {
        Sphere {
            name: name.to_string(),
            centre,
            radius,
            surface: Box::new(surface),
        }
    }

    pub fn centre(&self) -> Vec3<f64> {
        self.centre
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Primitive for Sphere {
    fn name(&self) -> &str {
        &self.name
    }

    fn intersect(&self, ray: &Ray, t_min: f64) -> Option<f64> {
        let oc = ray.org - self.centre;
        let a = ray.dir.length2();
        let b = 2. * ray.dir.dot(oc);
        let c = oc.length2() - self.radius * self.radius;
        let (t0, t1) = quadratic(a, b, c)?;
        if t0 > t_min {
            Some(t0)
        } else if t1 > t_min {
            Some(t1)
        } else {
            None
        }
    }

    fn normal(&self, p: Vec3<f64>) -> Vec3<f64> {
        p - self.centre
    }

    fn coordinates(&self, p: Vec3<f64>) -> Option<SurfaceCoordinates> {
        let r = p - self.centre;
        let theta = clamp(r.z / self.radius, -1., 1.).acos();
        let mut phi = r.y.atan2(r.x);
        if phi < 0. {
            phi += 2. * f64::PI;
        }
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_p, cos_p) = phi.sin_cos();
        Some(SurfaceCoordinates {
            uv: Vec2 { x: phi, y: theta },
            dpdu: Vec3::new(-sin_p, cos_p, 0.).scale(self.radius * sin_t),
            dpdv: Vec3::new(cos_t * cos_p, cos_t * sin_p, -sin_t).scale(self.radius),
        })
    }

    fn surface(&self) -> &dyn SurfaceBehavior {
        self.surface.as_ref()
    }
}
