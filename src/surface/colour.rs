// Leaf behaviours: surfaces with a colour of their own.

use super::{trace_branch, SurfaceBehavior};
use crate::error::TraceResult;
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;

/// A surface lit by the light source, with a diffuse and a specular colour.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceColour {
    diffuse: Color,
    specular: Color,
    shadow_throwing: bool,
}

impl SurfaceColour {
    pub fn new(diffuse: Color, specular: Color) -> Self {
        SurfaceColour {
            diffuse,
            specular,
            shadow_throwing: true,
        }
    }

    /// A matte surface.
    pub fn matte(diffuse: Color) -> Self {
        SurfaceColour::new(diffuse, Color::black())
    }

    pub fn shadow_throwing(mut self, shadow_throwing: bool) -> Self {
        self.shadow_throwing = shadow_throwing;
        self
    }
}

impl SurfaceBehavior for SurfaceColour {
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
        light.shade(self.diffuse, self.specular, scene, hit, ray, budget)
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_throwing
    }
}

/// A colour that does not depend on the lighting (a self-luminous surface).
#[derive(Clone, Copy, Debug)]
pub struct ConstantColour {
    colour: Color,
    shadow_throwing: bool,
}

impl ConstantColour {
    pub fn new(colour: Color) -> Self {
        ConstantColour {
            colour,
            shadow_throwing: true,
        }
    }

    pub fn shadow_throwing(mut self, shadow_throwing: bool) -> Self {
        self.shadow_throwing = shadow_throwing;
        self
    }
}

impl SurfaceBehavior for ConstantColour {
    fn interact(
        &self,
        _: &Ray,
        _: &Intersection,
        _: &dyn Scene,
        _: &dyn LightSource,
        budget: TraceBudget,
    ) -> TraceResult<Color> {
        if budget.is_exhausted() {
            return Ok(Color::black());
        }
        Ok(self.colour)
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_throwing
    }
}

/// Tinted glass: lets the ray through undeviated and multiplies what it sees by `filter`.
#[derive(Clone, Copy, Debug)]
pub struct ColourFilter {
    filter: Color,
    shadow_throwing: bool,
}

impl ColourFilter {
    pub fn new(filter: Color) -> Self {
        ColourFilter {
            filter,
            shadow_throwing: false,
        }
    }

    pub fn shadow_throwing(mut self, shadow_throwing: bool) -> Self {
        self.shadow_throwing = shadow_throwing;
        self
    }
}

impl SurfaceBehavior for ColourFilter {
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
        Ok(trace_branch(ray, hit, ray.dir, scene, light, budget)? * self.filter)
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_throwing
    }
}
