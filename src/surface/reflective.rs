use super::{trace_branch, SurfaceBehavior};
use crate::error::{check_coefficient, TraceResult};
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::reflect;
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;

/// A mirror. The colour seen in the mirror is scaled by the reflection coefficient.
#[derive(Clone, Copy, Debug)]
pub struct Reflective {
    coefficient: f64,
    shadow_throwing: bool,
}

impl Reflective {
    pub fn new(coefficient: f64) -> TraceResult<Self> {
        Ok(Reflective {
            coefficient: check_coefficient(coefficient)?,
            ..Reflective::perfect()
        })
    }

    /// A perfect mirror.
    pub fn perfect() -> Self {
        Reflective {
            coefficient: 1.,
            shadow_throwing: true,
        }
    }

    pub fn shadow_throwing(mut self, shadow_throwing: bool) -> Self {
        self.shadow_throwing = shadow_throwing;
        self
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }
}

impl SurfaceBehavior for Reflective {
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
        let dir = reflect(ray.dir.normalize(), hit.normal());
        Ok(trace_branch(ray, hit, dir, scene, light, budget)?.scale(self.coefficient))
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_throwing
    }
}
