//! A stack of infinitesimally thin layers on one surface.
//!
//! A ray entering the surface meets layer 0 first, a ray exiting it meets layer N-1 first.
//! When a layer traces a branch ray, the ray does not go back into the scene but to the
//! neighbouring layer at the same point: the next one if the branch ray points inwards,
//! the previous one if it points outwards. Once the index leaves `[0, N)` the branch ray
//! carries on into the scene.
//!
//! The traversal state (the current index and the intersection that started it) lives in
//! a [`LayerTraversal`], a scene view that exists for one step of one descent.

use super::{trace_branch, SurfaceBehavior};
use crate::error::TraceResult;
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::Side;
use crate::ray::{Ray, TraceBudget};
use crate::scene::{Primitive, Scene};
use crate::spectrum::Color;
use log::trace;

pub struct LayerStack {
    layers: Vec<Box<dyn SurfaceBehavior>>,
}

impl LayerStack {
    pub fn new() -> Self {
        LayerStack { layers: Vec::new() }
    }

    /// Adds a layer on the inside of the existing ones.
    pub fn add<S: SurfaceBehavior + 'static>(mut self, layer: S) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        LayerStack::new()
    }
}

impl SurfaceBehavior for LayerStack {
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
        if self.layers.is_empty() {
            return trace_branch(ray, hit, ray.dir, scene, light, budget);
        }

        let index = match Side::of(ray.dir, hit.normal()) {
            Side::Entering => 0,
            Side::Exiting => self.layers.len() - 1,
        };
        LayerTraversal {
            stack: self,
            parent: scene,
            start: *hit,
            index,
        }
        .apply(ray, light, budget)
    }

    fn casts_shadow(&self) -> bool {
        self.layers.iter().any(|l| l.casts_shadow())
    }
}

/// One step of a descent through a [`LayerStack`].
#[derive(Clone, Copy)]
pub struct LayerTraversal<'a> {
    stack: &'a LayerStack,
    parent: &'a dyn Scene,
    start: Intersection<'a>,
    index: usize,
}

impl<'a> LayerTraversal<'a> {
    /// The layer this step is at.
    pub fn index(&self) -> usize {
        self.index
    }

    fn apply(&self, ray: &Ray, light: &dyn LightSource, budget: TraceBudget) -> TraceResult<Color> {
        let hit = self.start.at_time(ray.time);
        self.stack.layers[self.index].interact(ray, &hit, self, light, budget)
    }
}

impl<'a> Scene for LayerTraversal<'a> {
    fn next_intersection(
        &self,
        ray: &Ray,
        origin: Option<&dyn Primitive>,
    ) -> Option<Intersection<'_>> {
        self.parent.next_intersection(ray, origin)
    }

    fn trace(
        &self,
        ray: &Ray,
        origin: Option<&dyn Primitive>,
        light: &dyn LightSource,
        budget: TraceBudget,
    ) -> TraceResult<Color> {
        if budget.is_exhausted() {
            return Ok(Color::black());
        }
        let next = match Side::of(ray.dir, self.start.normal()) {
            Side::Entering => Some(self.index + 1),
            Side::Exiting => self.index.checked_sub(1),
        };
        match next {
            Some(index) if index < self.stack.layers.len() => {
                trace!(
                    "layer stack on \"{}\": layer {} -> {}",
                    self.start.primitive.name(),
                    self.index,
                    index
                );
                LayerTraversal { index, ..*self }.apply(ray, light, budget)
            }
            _ => self.parent.trace(ray, origin, light, budget),
        }
    }
}
