pub mod ambient;
pub mod point;

pub use ambient::AmbientLight;
pub use point::PointLight;

use crate::error::TraceResult;
use crate::interaction::Intersection;
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;

/// An interface for the light in the scene, as seen by surfaces that have a colour of
/// their own. The kernel never looks inside; it only forwards the capability.
pub trait LightSource: Send + Sync {
    /// The colour of a surface with the given diffuse and specular colours, lit by this
    /// light, seen along `ray` at `hit`.
    fn shade(
        &self,
        diffuse: Color,
        specular: Color,
        scene: &dyn Scene,
        hit: &Intersection,
        ray: &Ray,
        budget: TraceBudget,
    ) -> TraceResult<Color>;
}

/// Darkness. Surfaces that only forward rays still work without any light.
pub struct NoLight;

impl LightSource for NoLight {
    fn shade(
        &self,
        _: Color,
        _: Color,
        _: &dyn Scene,
        _: &Intersection,
        _: &Ray,
        _: TraceBudget,
    ) -> TraceResult<Color> {
        Ok(Color::black())
    }
}

/// Sums the contributions of all of its lights.
pub struct LightSourceContainer {
    lights: Vec<Box<dyn LightSource>>,
}

impl LightSourceContainer {
    pub fn new() -> Self {
        LightSourceContainer { lights: Vec::new() }
    }

    pub fn add<L: LightSource + 'static>(mut self, light: L) -> Self {
        self.lights.push(Box::new(light));
        self
    }
}

impl Default for LightSourceContainer {
    fn default() -> Self {
        LightSourceContainer::new()
    }
}

impl LightSource for LightSourceContainer {
    fn shade(
        &self,
        diffuse: Color,
        specular: Color,
        scene: &dyn Scene,
        hit: &Intersection,
        ray: &Ray,
        budget: TraceBudget,
    ) -> TraceResult<Color> {
        self.lights
            .iter()
            .try_fold(Color::black(), |sum, light| -> TraceResult<Color> {
                Ok(sum + light.shade(diffuse, specular, scene, hit, ray, budget)?)
            })
    }
}
