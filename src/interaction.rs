use crate::error::{TraceError, TraceResult};
use crate::scene::Primitive;
use pmath::vector::{Vec2, Vec3};

use std::fmt;

/// Parametric surface coordinates at a point, together with the tangent vectors
/// `dp/du` and `dp/dv`. Only primitives with a parameterisation provide these.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceCoordinates {
    pub uv: Vec2<f64>,
    pub dpdu: Vec3<f64>,
    pub dpdv: Vec3<f64>,
}

/// Where a ray hit a primitive.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    /// The intersection point.
    pub p: Vec3<f64>,
    /// The parametric parameter of the ray where the intersection happened.
    pub t: f64,
    /// The time when the intersection happened.
    pub time: f64,
    /// The primitive that was struck.
    pub primitive: &'a dyn Primitive,
}

impl<'a> Intersection<'a> {
    /// The outward unit normal of the struck primitive at the hit point.
    pub fn normal(&self) -> Vec3<f64> {
        self.primitive.normal(self.p).normalize()
    }

    pub fn coordinates(&self) -> Option<SurfaceCoordinates> {
        self.primitive.coordinates(self.p)
    }

    /// Like `coordinates`, but a surface without a parameterisation is a configuration error.
    pub fn require_coordinates(&self) -> TraceResult<SurfaceCoordinates> {
        self.coordinates()
            .ok_or_else(|| TraceError::MissingParameterisation(self.primitive.name().to_string()))
    }

    /// A copy of this intersection at a later time (used when a traversal re-enters the
    /// same point).
    pub fn at_time(&self, time: f64) -> Intersection<'a> {
        Intersection { time, ..*self }
    }
}

impl<'a> fmt::Debug for Intersection<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intersection")
            .field("p", &self.p)
            .field("t", &self.t)
            .field("time", &self.time)
            .field("primitive", &self.primitive.name())
            .finish()
    }
}

/// Whether two primitive references point at the same object.
pub fn same_primitive(a: &dyn Primitive, b: &dyn Primitive) -> bool {
    a as *const dyn Primitive as *const u8 == b as *const dyn Primitive as *const u8
}
