// Helpers shared by the unit tests.

use crate::error::TraceResult;
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::ray::{Ray, TraceBudget};
use crate::scene::{Plane, Primitive, Scene};
use crate::spectrum::Color;
use crate::surface::Transparent;
use pmath::vector::Vec3;

use std::cell::RefCell;

pub fn assert_close(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "{} != {} (eps = {})", a, b, eps);
}

pub fn assert_vec_close(a: Vec3<f64>, b: Vec3<f64>, eps: f64) {
    assert!(
        (a - b).length() <= eps,
        "({}, {}, {}) != ({}, {}, {}) (eps = {})",
        a.x,
        a.y,
        a.z,
        b.x,
        b.y,
        b.z,
        eps
    );
}

/// A scene that sees the same colour in every direction and remembers the rays it was
/// asked to trace.
pub struct RecordingScene {
    colour: Color,
    traced: RefCell<Vec<(Ray, TraceBudget)>>,
}

impl RecordingScene {
    pub fn new(colour: Color) -> Self {
        RecordingScene {
            colour,
            traced: RefCell::new(Vec::new()),
        }
    }

    pub fn traced(&self) -> Vec<Ray> {
        self.traced.borrow().iter().map(|(r, _)| *r).collect()
    }

    pub fn budgets(&self) -> Vec<TraceBudget> {
        self.traced.borrow().iter().map(|(_, b)| *b).collect()
    }
}

impl Scene for RecordingScene {
    fn next_intersection(&self, _: &Ray, _: Option<&dyn Primitive>) -> Option<Intersection<'_>> {
        None
    }

    fn trace(
        &self,
        ray: &Ray,
        _: Option<&dyn Primitive>,
        _: &dyn LightSource,
        budget: TraceBudget,
    ) -> TraceResult<Color> {
        self.traced.borrow_mut().push((*ray, budget));
        Ok(self.colour)
    }
}

/// The plane z = 0 with outward normal +z, parameterised by u = x and v = y.
pub struct TestPlane(pub Plane);

impl TestPlane {
    pub fn hit(&self, ray: &Ray) -> Intersection<'_> {
        let t = self.0.intersect(ray, 0.).expect("test ray misses the plane");
        Intersection {
            p: ray.point_at(t),
            t,
            time: ray.time,
            primitive: &self.0,
        }
    }
}

/// A test plane and a ray with direction `dir` that hits it at `at` (which should have
/// z = 0).
pub fn hit_on_plane_at(at: Vec3<f64>, dir: Vec3<f64>) -> (TestPlane, Ray) {
    let normal = Vec3::new(0., 0., 1.);
    let plane = Plane::new("test plane", Vec3::zero(), normal, Transparent::perfect())
        .with_parameterisation(Vec3::new(1., 0., 0.), Vec3::new(0., 1., 0.));
    (TestPlane(plane), Ray::new(at - dir, dir, 0.))
}

pub fn hit_on_plane(dir: Vec3<f64>) -> (TestPlane, Ray) {
    hit_on_plane_at(Vec3::zero(), dir)
}

/// Like [`hit_on_plane_at`], but the plane has no (u, v) parameterisation.
pub fn hit_on_bare_plane(dir: Vec3<f64>) -> (TestPlane, Ray) {
    let normal = Vec3::new(0., 0., 1.);
    let plane = Plane::new("bare plane", Vec3::zero(), normal, Transparent::perfect());
    (TestPlane(plane), Ray::new(-dir, dir, 0.))
}
