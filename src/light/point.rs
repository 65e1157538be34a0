use crate::error::TraceResult;
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::reflect;
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;
use pmath::util::align;
use pmath::vector::Vec3;

/// A point light source with Lambertian + Phong shading and hard shadows.
pub struct PointLight {
    position: Vec3<f64>,
    colour: Color,
    shininess: f64,
}

impl PointLight {
    pub fn new(position: Vec3<f64>, colour: Color) -> Self {
        PointLight {
            position,
            colour,
            shininess: 20.,
        }
    }

    pub fn with_shininess(mut self, shininess: f64) -> Self {
        self.shininess = shininess;
        self
    }

    // Whether something that throws shadows sits between the point and the light. Surfaces
    // that don't throw shadows are stepped through.
    fn is_occluded(&self, scene: &dyn Scene, hit: &Intersection, ray: &Ray) -> bool {
        let mut shadow_ray = ray.branch(hit.p, self.position - hit.p, hit.time);
        let mut origin = hit.primitive;
        // The light is at t = 1 on every shadow ray:
        while let Some(blocker) = scene.next_intersection(&shadow_ray, Some(origin)) {
            if blocker.t >= 1. {
                return false;
            }
            if blocker.primitive.surface().casts_shadow() {
                return true;
            }
            shadow_ray = shadow_ray.branch(blocker.p, self.position - blocker.p, hit.time);
            origin = blocker.primitive;
        }
        false
    }
}

impl LightSource for PointLight {
    fn shade(
        &self,
        diffuse: Color,
        specular: Color,
        scene: &dyn Scene,
        hit: &Intersection,
        ray: &Ray,
        _: TraceBudget,
    ) -> TraceResult<Color> {
        let view = -ray.dir.normalize();
        // The side of the surface the viewer is on is the one that gets lit:
        let n = align(view, hit.normal());
        let l = (self.position - hit.p).normalize();
        let cos_theta = n.dot(l);
        if cos_theta <= 0. || self.is_occluded(scene, hit, ray) {
            return Ok(Color::black());
        }

        let highlight = reflect(-l, n).dot(view).max(0.).powf(self.shininess);
        Ok((diffuse.scale(cos_theta) + specular.scale(highlight)) * self.colour)
    }
}
