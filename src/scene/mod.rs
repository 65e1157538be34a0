//! The collaborators the kernel traces against.
//!
//! The kernel only ever talks to a scene through the [`Scene`] trait and to the objects in
//! it through [`Primitive`]. [`SceneObjectContainer`] is a deliberately plain
//! implementation (a list of primitives, no acceleration structure) so the surface
//! behaviours can be exercised end to end.

pub mod plane;
pub mod scene_builder;
pub mod sphere;

pub use plane::Plane;
pub use scene_builder::SceneBuilder;
pub use sphere::Sphere;

use crate::error::TraceResult;
use crate::interaction::{same_primitive, Intersection, SurfaceCoordinates};
use crate::light::LightSource;
use crate::ray::{Ray, TraceBudget};
use crate::spectrum::Color;
use crate::surface::SurfaceBehavior;
use pmath::vector::Vec3;

/// Intersections with the primitive a ray starts from are ignored when they are closer
/// than this. It keeps a branch ray from hitting the surface it was just spawned on while
/// still letting it reach the far side of the same object.
pub const MIN_ORIGIN_DISTANCE: f64 = 1e-8;

/// A geometric object with a surface behaviour attached to it.
pub trait Primitive: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// The smallest ray parameter `t > t_min` at which the ray hits the primitive.
    fn intersect(&self, ray: &Ray, t_min: f64) -> Option<f64>;

    /// The outward normal at a point on the surface (not necessarily normalized).
    fn normal(&self, p: Vec3<f64>) -> Vec3<f64>;

    /// The surface parameterisation at `p`, if the primitive has one.
    fn coordinates(&self, _p: Vec3<f64>) -> Option<SurfaceCoordinates> {
        None
    }

    fn surface(&self) -> &dyn SurfaceBehavior;
}

/// Anything a branch ray can be traced into.
pub trait Scene {
    /// The closest intersection along the ray. Intersections with `origin` (the primitive
    /// the ray leaves from) closer than [`MIN_ORIGIN_DISTANCE`] are skipped.
    fn next_intersection(
        &self,
        ray: &Ray,
        origin: Option<&dyn Primitive>,
    ) -> Option<Intersection<'_>>;

    /// Resolves the colour seen along `ray`.
    fn trace(
        &self,
        ray: &Ray,
        origin: Option<&dyn Primitive>,
        light: &dyn LightSource,
        budget: TraceBudget,
    ) -> TraceResult<Color>;
}

/// The usual way of tracing a ray through a scene: find the next intersection and let the
/// surface that was hit work out the colour.
pub fn resolve_colour(
    scene: &dyn Scene,
    ray: &Ray,
    origin: Option<&dyn Primitive>,
    light: &dyn LightSource,
    budget: TraceBudget,
    background: Color,
) -> TraceResult<Color> {
    if budget.is_exhausted() {
        return Ok(Color::black());
    }
    match scene.next_intersection(ray, origin) {
        Some(hit) => hit
            .primitive
            .surface()
            .interact(ray, &hit, scene, light, budget),
        None => Ok(background),
    }
}

/// A flat list of primitives.
pub struct SceneObjectContainer {
    objects: Vec<Box<dyn Primitive>>,
    background: Color,
    origin_epsilon: f64,
}

impl SceneObjectContainer {
    pub fn new() -> Self {
        SceneObjectContainer {
            objects: Vec::new(),
            background: Color::black(),
            origin_epsilon: MIN_ORIGIN_DISTANCE,
        }
    }

    /// The colour of rays that leave the scene without hitting anything.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_origin_epsilon(mut self, eps: f64) -> Self {
        self.origin_epsilon = eps;
        self
    }

    pub fn add<P: Primitive + 'static>(&mut self, primitive: P) {
        self.objects.push(Box::new(primitive));
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Primitive> {
        self.objects
            .iter()
            .find(|o| o.name() == name)
            .map(|o| o.as_ref())
    }
}

impl Default for SceneObjectContainer {
    fn default() -> Self {
        SceneObjectContainer::new()
    }
}

impl Scene for SceneObjectContainer {
    fn next_intersection(
        &self,
        ray: &Ray,
        origin: Option<&dyn Primitive>,
    ) -> Option<Intersection<'_>> {
        let mut closest: Option<(f64, &dyn Primitive)> = None;
        for object in &self.objects {
            let object = object.as_ref();
            let t_min = match origin {
                Some(o) if same_primitive(o, object) => self.origin_epsilon,
                _ => 0.,
            };
            if let Some(t) = object.intersect(ray, t_min) {
                if closest.map_or(true, |(best, _)| t < best) {
                    closest = Some((t, object));
                }
            }
        }

        closest.map(|(t, primitive)| Intersection {
            p: ray.point_at(t),
            t,
            time: ray.time,
            primitive,
        })
    }

    fn trace(
        &self,
        ray: &Ray,
        origin: Option<&dyn Primitive>,
        light: &dyn LightSource,
        budget: TraceBudget,
    ) -> TraceResult<Color> {
        resolve_colour(self, ray, origin, light, budget, self.background)
    }
}
