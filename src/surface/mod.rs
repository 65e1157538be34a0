//! Surface behaviours: what happens to a ray that hits a surface.
//!
//! Every behaviour implements [`SurfaceBehavior::interact`]. A behaviour works out the
//! branch ray(s) leaving the hit point, traces them back into the scene with a
//! decremented budget and combines the resulting colours. Composites hold their children
//! by value and dispatch to them.

pub mod angle_law;
pub mod boost;
pub mod colour;
pub mod composite;
pub mod graded_index;
pub mod hologram;
pub mod layer_stack;
pub mod metarefraction;
pub mod reflective;
pub mod refractive;
pub mod voxel;

pub use angle_law::{AngleLaw, GeneralisedRefraction};
pub use boost::{Beta, Boost, BoostKind};
pub use colour::{ColourFilter, ConstantColour, SurfaceColour};
pub use composite::{Average, StripeAxis, Striped, Tiled, TwoSided, WeightedAverage};
pub use graded_index::GradedIndexVolume;
pub use hologram::{PhaseGradient, PhaseHologram};
pub use layer_stack::LayerStack;
pub use metarefraction::{BasisSource, Metarefraction, TransverseTransform};
pub use reflective::Reflective;
pub use refractive::{FresnelRefractive, Refractive, Transparent};
pub use voxel::{PlaneFamily, VoxelBoundary, VoxellatedVolume};

use crate::error::TraceResult;
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::{reflect, Evanescent};
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;
use log::trace;
use pmath::vector::Vec3;

/// Defines how a surface interacts with a ray that hits it.
///
/// Implementations must return black without doing any geometry when the budget is
/// exhausted. They own their parameters and hold no per-ray state, so the same behaviour
/// can serve any number of rays.
pub trait SurfaceBehavior: Send + Sync {
    fn interact(
        &self,
        ray: &Ray,
        hit: &Intersection,
        scene: &dyn Scene,
        light: &dyn LightSource,
        budget: TraceBudget,
    ) -> TraceResult<Color>;

    /// Whether the surface blocks the light of light sources.
    fn casts_shadow(&self) -> bool;
}

impl<S: SurfaceBehavior + ?Sized> SurfaceBehavior for Box<S> {
    fn interact(
        &self,
        ray: &Ray,
        hit: &Intersection,
        scene: &dyn Scene,
        light: &dyn LightSource,
        budget: TraceBudget,
    ) -> TraceResult<Color> {
        (**self).interact(ray, hit, scene, light, budget)
    }

    fn casts_shadow(&self) -> bool {
        (**self).casts_shadow()
    }
}

/// Traces the branch ray that leaves the hit point in direction `dir`.
pub fn trace_branch(
    ray: &Ray,
    hit: &Intersection,
    dir: Vec3<f64>,
    scene: &dyn Scene,
    light: &dyn LightSource,
    budget: TraceBudget,
) -> TraceResult<Color> {
    let branch = ray.branch(hit.p, dir, hit.time);
    scene.trace(&branch, Some(hit.primitive), light, budget.decrement())
}

/// Traces the transmitted direction scaled by `coefficient`, or, if the transmitted
/// direction is evanescent, the mirror-reflected ray without any loss.
pub(crate) fn transmit_or_reflect(
    outgoing: Result<Vec3<f64>, Evanescent>,
    coefficient: f64,
    ray: &Ray,
    hit: &Intersection,
    scene: &dyn Scene,
    light: &dyn LightSource,
    budget: TraceBudget,
) -> TraceResult<Color> {
    match outgoing {
        Ok(dir) => Ok(trace_branch(ray, hit, dir, scene, light, budget)?.scale(coefficient)),
        Err(Evanescent) => {
            trace!(
                "evanescent at \"{}\" ({:?}), reflecting",
                hit.primitive.name(),
                hit.p
            );
            let dir = reflect(ray.dir.normalize(), hit.normal());
            trace_branch(ray, hit, dir, scene, light, budget)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrinSettings;
    use crate::grin::{IsotropicMedium, UniformIndex};
    use crate::light::NoLight;
    use crate::surface::angle_law::Offset;
    use crate::surface::hologram::ConstantGradient;
    use crate::surface::voxel::TransparentBoundaries;
    use crate::testing::{hit_on_plane, RecordingScene};
    use num_complex::Complex64;
    use test_log::test;

    fn boxed<S: SurfaceBehavior + 'static>(surface: S) -> Box<dyn SurfaceBehavior> {
        Box::new(surface)
    }

    fn every_behaviour() -> Vec<(&'static str, Box<dyn SurfaceBehavior>)> {
        let red = Color::new(1., 0., 0.);
        let clear = Transparent::perfect;
        let mirror = Reflective::perfect;

        let angle_law = GeneralisedRefraction::new(Offset(0.1), Offset(-0.1), 1.).unwrap();
        let metarefraction = Metarefraction::complex(Complex64::new(0., 1.), 1.).unwrap();
        let hologram = PhaseHologram::transmissive(ConstantGradient(Vec3::zero()), 1.).unwrap();
        let striped = Striped::new(1., StripeAxis::U, vec![boxed(clear()), boxed(mirror())]);
        let family = PlaneFamily::new(Vec3::new(1., 0., 0.), 0.1, 0.).unwrap();
        let voxels = VoxellatedVolume::new(TransparentBoundaries).add_family(family).unwrap();
        let grin = IsotropicMedium::new(UniformIndex(1.3));
        let graded = GradedIndexVolume::new(grin, &GrinSettings::default()).unwrap();

        vec![
            ("reflective", boxed(mirror())),
            ("transparent", boxed(clear())),
            ("refractive", boxed(Refractive::between(1., 1.5, 1.).unwrap())),
            ("fresnel", boxed(FresnelRefractive::new(1., 1.5, 1.).unwrap())),
            ("angle law", boxed(angle_law)),
            ("metarefraction", boxed(metarefraction)),
            ("boost", boxed(Boost::lorentz(Vec3::new(0., 0.5, 0.), 1.).unwrap())),
            ("hologram", boxed(hologram)),
            ("surface colour", boxed(SurfaceColour::matte(red))),
            ("constant colour", boxed(ConstantColour::new(red))),
            ("colour filter", boxed(ColourFilter::new(red))),
            ("average", boxed(Average::new().add(ConstantColour::new(red)).add(clear()))),
            ("weighted", boxed(WeightedAverage::new().add(2., clear()))),
            ("two sided", boxed(TwoSided::new(clear(), mirror()))),
            ("striped", boxed(striped.unwrap())),
            ("tiled", boxed(Tiled::new(1., 1., clear(), mirror()).unwrap())),
            ("layer stack", boxed(LayerStack::new().add(clear()).add(mirror()))),
            ("voxels", boxed(voxels)),
            ("graded index", boxed(graded)),
        ]
    }

    #[test]
    fn exhausted_budget_gives_black_without_tracing() {
        let (plane, ray) = hit_on_plane(Vec3::new(0.2, 0.1, -1.));
        let hit = plane.hit(&ray);
        for (name, behaviour) in every_behaviour() {
            for &levels in &[0, -1] {
                let scene = RecordingScene::new(Color::white());
                let c = behaviour
                    .interact(&ray, &hit, &scene, &NoLight, TraceBudget::new(levels))
                    .unwrap();
                assert!(c.is_black(), "{} with {} levels gave {:?}", name, levels, c);
                assert!(scene.traced().is_empty(), "{} traced a ray", name);
            }
        }
    }
}
