// Scene pieces shared by the end-to-end tests.
#![allow(dead_code)]

use pmath::vector::Vec3;
use refractor::error::TraceResult;
use refractor::interaction::Intersection;
use refractor::light::LightSource;
use refractor::ray::{Ray, TraceBudget};
use refractor::scene::{Plane, Scene, SceneBuilder, SceneObjectContainer};
use refractor::spectrum::Color;
use refractor::surface::{trace_branch, SurfaceBehavior};

use std::sync::{Arc, Mutex};

pub const SKY: Color = Color {
    r: 0.25,
    g: 0.5,
    b: 1.,
};

pub fn assert_close(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "{} != {} (eps = {})", a, b, eps);
}

pub fn assert_vec_close(a: Vec3<f64>, b: Vec3<f64>, eps: f64) {
    assert!(
        (a - b).length() <= eps,
        "({}, {}, {}) != ({}, {}, {})",
        a.x,
        a.y,
        a.z,
        b.x,
        b.y,
        b.z
    );
}

pub fn assert_colour_close(a: Color, b: Color, eps: f64) {
    assert!(a.max_difference(b) <= eps, "{:?} != {:?}", a, b);
}

/// A surface that absorbs every ray, remembering it, and shows a fixed colour.
pub struct Detector {
    colour: Color,
    seen: Arc<Mutex<Vec<Ray>>>,
}

impl Detector {
    pub fn new(colour: Color) -> (Detector, Arc<Mutex<Vec<Ray>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Detector {
                colour,
                seen: seen.clone(),
            },
            seen,
        )
    }
}

impl SurfaceBehavior for Detector {
    fn interact(
        &self,
        ray: &Ray,
        _: &Intersection,
        _: &dyn Scene,
        _: &dyn LightSource,
        _: TraceBudget,
    ) -> TraceResult<Color> {
        self.seen.lock().unwrap().push(*ray);
        Ok(self.colour)
    }

    fn casts_shadow(&self) -> bool {
        false
    }
}

/// A layer that writes its tag into a shared log and lets the ray through.
pub struct Tag {
    tag: usize,
    log: Arc<Mutex<Vec<usize>>>,
}

impl Tag {
    pub fn new(tag: usize, log: &Arc<Mutex<Vec<usize>>>) -> Tag {
        Tag {
            tag,
            log: log.clone(),
        }
    }
}

impl SurfaceBehavior for Tag {
    fn interact(
        &self,
        ray: &Ray,
        hit: &Intersection,
        scene: &dyn Scene,
        light: &dyn LightSource,
        budget: TraceBudget,
    ) -> TraceResult<Color> {
        self.log.lock().unwrap().push(self.tag);
        trace_branch(ray, hit, ray.dir, scene, light, budget)
    }

    fn casts_shadow(&self) -> bool {
        false
    }
}

/// The plane `z = height` with normal `normal_z * z`, parameterised by x and y.
pub fn z_plane<S>(name: &str, height: f64, normal_z: f64, surface: S) -> Plane
where
    S: SurfaceBehavior + 'static,
{
    Plane::new(name, Vec3::new(0., 0., height), Vec3::new(0., 0., normal_z), surface)
        .with_parameterisation(Vec3::new(1., 0., 0.), Vec3::new(0., 1., 0.))
}

pub fn scene_of(planes: Vec<Plane>) -> SceneObjectContainer {
    let mut builder = SceneBuilder::new().background(SKY);
    for plane in planes {
        builder.add(plane).unwrap();
    }
    builder.build()
}
