use crate::error::TraceResult;
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;

/// Light that reaches every point from every direction equally.
pub struct AmbientLight {
    colour: Color,
}

impl AmbientLight {
    pub fn new(colour: Color) -> Self {
        AmbientLight { colour }
    }
}

impl LightSource for AmbientLight {
    fn shade(
        &self,
        diffuse: Color,
        _: Color,
        _: &dyn Scene,
        _: &Intersection,
        _: &Ray,
        _: TraceBudget,
    ) -> TraceResult<Color> {
        Ok(diffuse * self.colour)
    }
}
