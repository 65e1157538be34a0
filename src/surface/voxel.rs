//! The volume inside a primitive, cut into voxels by families of parallel planes.
//!
//! A ray that enters the volume is followed from plane crossing to plane crossing. At each
//! crossing the [`VoxelBoundary`] decides what happens to it; once the ray reaches the
//! bounding surface again it leaves the volume and is traced on through the scene. The
//! number of crossings per descent is bounded; a ray that needs more resolves to the
//! fallback colour.

use super::hologram::thin_lens_deflection;
use super::{trace_branch, SurfaceBehavior};
use crate::config::VoxelSettings;
use crate::error::{check_coefficient, invalid, TraceResult};
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::{from_tangential, reflect, Side};
use crate::ray::{Ray, TraceBudget};
use crate::scene::{Scene, MIN_ORIGIN_DISTANCE};
use crate::spectrum::Color;
use arrayvec::ArrayVec;
use log::debug;
use pmath::vector::Vec3;

pub const MAX_PLANE_FAMILIES: usize = 4;

type VoxelIndex = ArrayVec<[i64; MAX_PLANE_FAMILIES]>;

/// The planes `normal . p = offset + k * spacing` for all integers `k`. Voxel index `k`
/// lies between plane `k` and plane `k + 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneFamily {
    normal: Vec3<f64>,
    spacing: f64,
    offset: f64,
}

impl PlaneFamily {
    pub fn new(normal: Vec3<f64>, spacing: f64, offset: f64) -> TraceResult<Self> {
        let normal = match normal.try_normalize() {
            Some(n) => n,
            None => return invalid("plane family normal must not be zero"),
        };
        if !(spacing > 0.) || !spacing.is_finite() {
            return invalid(format!("plane spacing must be positive, got {}", spacing));
        }
        Ok(PlaneFamily {
            normal,
            spacing,
            offset,
        })
    }

    pub fn normal(&self) -> Vec3<f64> {
        self.normal
    }

    pub fn index_of(&self, p: Vec3<f64>) -> i64 {
        ((self.normal.dot(p) - self.offset) / self.spacing).floor() as i64
    }

    /// The position of the centre of voxel `index` along the normal.
    pub fn centre_of(&self, index: i64) -> f64 {
        self.offset + (index as f64 + 0.5) * self.spacing
    }

    // The ray parameter of the next plane a ray from org in voxel `index` crosses, and
    // the voxel it crosses into.
    fn next_crossing(&self, org: Vec3<f64>, dir: Vec3<f64>, index: i64) -> Option<(f64, i64)> {
        let rate = self.normal.dot(dir);
        let (plane, next) = if rate > 0. {
            (index + 1, index + 1)
        } else if rate < 0. {
            (index, index - 1)
        } else {
            return None;
        };
        let position = self.offset + plane as f64 * self.spacing;
        let t = (position - self.normal.dot(org)) / rate;
        Some((t.max(0.), next))
    }
}

/// A ray about to cross from one voxel into the next.
#[derive(Clone, Copy, Debug)]
pub struct VoxelCrossing<'a> {
    pub point: Vec3<f64>,
    /// The unit ray direction.
    pub dir: Vec3<f64>,
    /// Which family the crossed plane belongs to.
    pub family: usize,
    pub families: &'a [PlaneFamily],
    /// The index of the voxel the ray is about to enter.
    pub voxel: &'a [i64],
}

impl<'a> VoxelCrossing<'a> {
    pub fn plane_normal(&self) -> Vec3<f64> {
        self.families[self.family].normal
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryOutcome {
    /// Carry on in direction `dir`. If `dir` points back, the ray stays in the voxel it
    /// came from. What is seen beyond is scaled by `transmission`; `emitted` is seen on
    /// top.
    Continue {
        dir: Vec3<f64>,
        transmission: f64,
        emitted: Color,
    },
    /// The ray ends here with this colour.
    Stop(Color),
}

pub trait VoxelBoundary: Send + Sync {
    fn cross(&self, crossing: &VoxelCrossing) -> TraceResult<BoundaryOutcome>;
}

/// Voxel boundaries that do nothing.
#[derive(Clone, Copy, Debug)]
pub struct TransparentBoundaries;

impl VoxelBoundary for TransparentBoundaries {
    fn cross(&self, crossing: &VoxelCrossing) -> TraceResult<BoundaryOutcome> {
        Ok(BoundaryOutcome::Continue {
            dir: crossing.dir,
            transmission: 1.,
            emitted: Color::black(),
        })
    }
}

/// Semi-transparent coloured sheets: each crossing adds `colour` and attenuates what lies
/// behind by `transmission`.
#[derive(Clone, Copy, Debug)]
pub struct ColouredBoundaries {
    pub colour: Color,
    pub transmission: f64,
}

impl VoxelBoundary for ColouredBoundaries {
    fn cross(&self, crossing: &VoxelCrossing) -> TraceResult<BoundaryOutcome> {
        Ok(BoundaryOutcome::Continue {
            dir: crossing.dir,
            transmission: self.transmission,
            emitted: self.colour,
        })
    }
}

/// Opaque boundaries of one colour.
#[derive(Clone, Copy, Debug)]
pub struct AbsorbingBoundaries {
    pub colour: Color,
}

impl VoxelBoundary for AbsorbingBoundaries {
    fn cross(&self, _: &VoxelCrossing) -> TraceResult<BoundaryOutcome> {
        Ok(BoundaryOutcome::Stop(self.colour))
    }
}

/// A thin lens on every voxel face, centred on the face centre of the voxel the ray
/// enters. Assumes the plane families are mutually orthogonal.
#[derive(Clone, Copy, Debug)]
pub struct VoxelLenslets {
    pub focal_length: f64,
}

impl VoxelBoundary for VoxelLenslets {
    fn cross(&self, crossing: &VoxelCrossing) -> TraceResult<BoundaryOutcome> {
        let n = crossing.plane_normal();
        let d = crossing.dir;

        // Offset from the lens centre, within the crossed plane:
        let mut r = Vec3::zero();
        for (j, family) in crossing.families.iter().enumerate() {
            if j != crossing.family {
                let centre = family.centre_of(crossing.voxel[j]);
                r += family.normal.scale(family.normal.dot(crossing.point) - centre);
            }
        }
        let t =
            d.perpendicular_to(n) + thin_lens_deflection(r.perpendicular_to(n), self.focal_length);
        let dir = match from_tangential(t, n, d.dot(n)) {
            Ok(dir) => dir,
            Err(_) => reflect(d, n),
        };
        Ok(BoundaryOutcome::Continue {
            dir,
            transmission: 1.,
            emitted: Color::black(),
        })
    }
}

pub struct VoxellatedVolume {
    families: ArrayVec<[PlaneFamily; MAX_PLANE_FAMILIES]>,
    boundary: Box<dyn VoxelBoundary>,
    surface_coefficient: f64,
    max_steps: usize,
    fallback: Color,
    shadow_throwing: bool,
}

impl VoxellatedVolume {
    pub fn new<B: VoxelBoundary + 'static>(boundary: B) -> Self {
        let settings = VoxelSettings::default();
        VoxellatedVolume {
            families: ArrayVec::new(),
            boundary: Box::new(boundary),
            surface_coefficient: 1.,
            max_steps: settings.max_steps,
            fallback: settings.fallback,
            shadow_throwing: false,
        }
    }

    pub fn add_family(mut self, family: PlaneFamily) -> TraceResult<Self> {
        if self.families.try_push(family).is_err() {
            return invalid(format!(
                "a voxellated volume takes at most {} plane families",
                MAX_PLANE_FAMILIES
            ));
        }
        Ok(self)
    }

    /// Takes the step limit and the fallback colour from the settings.
    pub fn with_settings(mut self, settings: &VoxelSettings) -> Self {
        self.max_steps = settings.max_steps;
        self.fallback = settings.fallback;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_fallback(mut self, fallback: Color) -> Self {
        self.fallback = fallback;
        self
    }

    /// Transmission coefficient of the bounding surface, applied when the ray leaves.
    pub fn with_surface_coefficient(mut self, coefficient: f64) -> TraceResult<Self> {
        self.surface_coefficient = check_coefficient(coefficient)?;
        Ok(self)
    }

    pub fn shadow_throwing(mut self, shadow_throwing: bool) -> Self {
        self.shadow_throwing = shadow_throwing;
        self
    }

    // The closest plane crossing: (ray parameter, family, new index).
    fn next_crossing(
        &self,
        org: Vec3<f64>,
        dir: Vec3<f64>,
        voxel: &VoxelIndex,
    ) -> Option<(f64, usize, i64)> {
        self.families
            .iter()
            .zip(voxel.iter())
            .enumerate()
            .filter_map(|(i, (family, &index))| {
                family
                    .next_crossing(org, dir, index)
                    .map(|(t, next)| (t, i, next))
            })
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
    }
}

impl SurfaceBehavior for VoxellatedVolume {
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
        if Side::of(ray.dir, hit.normal()) == Side::Exiting {
            // Only rays from outside get traced through the voxels.
            return trace_branch(ray, hit, ray.dir, scene, light, budget);
        }

        let mut pos = hit.p;
        let mut dir = ray.dir.normalize();
        let mut voxel: VoxelIndex = self.families.iter().map(|f| f.index_of(pos)).collect();
        let mut throughput = 1.;
        let mut seen = Color::black();
        let mut steps = 0;

        loop {
            let segment = ray.branch(pos, dir, hit.time);
            let exit = hit.primitive.intersect(&segment, MIN_ORIGIN_DISTANCE);
            let crossing = self.next_crossing(pos, dir, &voxel);

            match (crossing, exit) {
                (Some((t, family, next)), exit) if exit.map_or(true, |t_exit| t < t_exit) => {
                    if steps >= self.max_steps {
                        debug!(
                            "voxellated volume \"{}\": over {} crossings, using fallback colour",
                            hit.primitive.name(),
                            self.max_steps
                        );
                        return Ok(seen + self.fallback.scale(throughput));
                    }
                    steps += 1;
                    pos = segment.point_at(t);

                    let mut entered = voxel.clone();
                    entered[family] = next;
                    let outcome = self.boundary.cross(&VoxelCrossing {
                        point: pos,
                        dir,
                        family,
                        families: &self.families,
                        voxel: &entered,
                    })?;
                    match outcome {
                        BoundaryOutcome::Stop(colour) => return Ok(seen + colour.scale(throughput)),
                        BoundaryOutcome::Continue {
                            dir: new_dir,
                            transmission,
                            emitted,
                        } => {
                            seen += emitted.scale(throughput);
                            throughput *= transmission;
                            let n = self.families[family].normal;
                            if Side::of(new_dir, n) == Side::of(dir, n) {
                                voxel = entered;
                            }
                            dir = new_dir.normalize();
                        }
                    }
                    if throughput == 0. {
                        return Ok(seen);
                    }
                }
                (_, Some(t_exit)) => {
                    let exit_hit = Intersection {
                        p: segment.point_at(t_exit),
                        t: t_exit,
                        time: hit.time,
                        primitive: hit.primitive,
                    };
                    let beyond = trace_branch(&segment, &exit_hit, dir, scene, light, budget)?;
                    return Ok(seen + beyond.scale(throughput * self.surface_coefficient));
                }
                (_, None) => {
                    // The ray never leaves (an unbounded volume, or the ray runs parallel
                    // to every family inside one):
                    debug!(
                        "voxellated volume \"{}\": ray does not leave, using fallback colour",
                        hit.primitive.name()
                    );
                    return Ok(seen + self.fallback.scale(throughput));
                }
            }
        }
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_throwing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::NoLight;
    use crate::scene::{Plane, Primitive, Sphere};
    use crate::surface::Transparent;
    use crate::testing::{assert_close, assert_vec_close, RecordingScene};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use test_log::test;

    struct Counting(Arc<AtomicUsize>);

    impl VoxelBoundary for Counting {
        fn cross(&self, crossing: &VoxelCrossing) -> TraceResult<BoundaryOutcome> {
            self.0.fetch_add(1, Ordering::SeqCst);
            TransparentBoundaries.cross(crossing)
        }
    }

    fn axis_families() -> Vec<PlaneFamily> {
        vec![
            PlaneFamily::new(Vec3::new(1., 0., 0.), 1., 0.).unwrap(),
            PlaneFamily::new(Vec3::new(0., 1., 0.), 1., 0.).unwrap(),
            PlaneFamily::new(Vec3::new(0., 0., 1.), 1., 0.).unwrap(),
        ]
    }

    fn volume<B: VoxelBoundary + 'static>(boundary: B) -> VoxellatedVolume {
        axis_families()
            .into_iter()
            .try_fold(VoxellatedVolume::new(boundary), |v, f| v.add_family(f))
            .unwrap()
    }

    fn hit<'a>(primitive: &'a dyn Primitive, ray: &Ray) -> Intersection<'a> {
        let t = primitive.intersect(ray, 0.).unwrap();
        Intersection {
            p: ray.point_at(t),
            t,
            time: ray.time,
            primitive,
        }
    }

    #[test]
    fn plane_family_indices() {
        let family = PlaneFamily::new(Vec3::new(0., 0., 2.), 0.5, 0.1).unwrap();
        assert_eq!(family.index_of(Vec3::new(3., 3., 0.35)), 0);
        assert_eq!(family.index_of(Vec3::new(0., 0., 0.05)), -1);
        assert_close(family.centre_of(2), 1.35, 1e-12);
        assert!(PlaneFamily::new(Vec3::zero(), 1., 0.).is_err());
        assert!(PlaneFamily::new(Vec3::new(1., 0., 0.), 0., 0.).is_err());
    }

    #[test]
    fn step_count_is_bounded() {
        let count = Arc::new(AtomicUsize::new(0));
        let fallback = Color::new(0.2, 0.4, 0.6);
        let volume = volume(Counting(count.clone()))
            .with_max_steps(7)
            .with_fallback(fallback);
        // The half-space z < 0 goes on forever:
        let half_space =
            Plane::new("floor", Vec3::zero(), Vec3::new(0., 0., 1.), Transparent::perfect());
        let ray = Ray::new(Vec3::new(0.5, 0.5, 1.), Vec3::new(0., 0., -1.), 0.);
        let scene = RecordingScene::new(Color::white());
        let c = volume
            .interact(&ray, &hit(&half_space, &ray), &scene, &NoLight, TraceBudget::new(3))
            .unwrap();
        assert_eq!(c, fallback);
        assert_eq!(count.load(Ordering::SeqCst), 7);
        assert!(scene.traced().is_empty());
    }

    #[test]
    fn coloured_boundaries_accumulate_until_exit() {
        let volume = volume(ColouredBoundaries {
            colour: Color::new(0.1, 0., 0.),
            transmission: 0.5,
        });
        let ball = Sphere::new("ball", Vec3::zero(), 2., Transparent::perfect());
        let ray = Ray::new(Vec3::new(0.3, 0.2, 5.), Vec3::new(0., 0., -1.), 0.);
        let scene = RecordingScene::new(Color::white());
        let c = volume
            .interact(&ray, &hit(&ball, &ray), &scene, &NoLight, TraceBudget::new(3))
            .unwrap();

        // Three crossings (z = 1, 0, -1), then the far side of the ball:
        assert_close(c.r, 0.1 + 0.05 + 0.025 + 0.125, 1e-12);
        assert_close(c.g, 0.125, 1e-12);
        let traced = scene.traced();
        assert_eq!(traced.len(), 1);
        assert_vec_close(traced[0].org, Vec3::new(0.3, 0.2, -(4f64 - 0.13).sqrt()), 1e-9);
        assert_eq!(scene.budgets(), vec![TraceBudget::new(2)]);
    }

    #[test]
    fn absorbing_boundaries_stop_the_ray() {
        let volume = volume(AbsorbingBoundaries {
            colour: Color::new(0., 1., 0.),
        });
        let ball = Sphere::new("ball", Vec3::zero(), 2., Transparent::perfect());
        let ray = Ray::new(Vec3::new(0.3, 0.2, 5.), Vec3::new(0., 0., -1.), 0.);
        let scene = RecordingScene::new(Color::white());
        let c = volume
            .interact(&ray, &hit(&ball, &ray), &scene, &NoLight, TraceBudget::new(3))
            .unwrap();
        assert_eq!(c, Color::new(0., 1., 0.));
        assert!(scene.traced().is_empty());
    }

    #[test]
    fn rays_from_inside_pass_through() {
        let volume = volume(AbsorbingBoundaries {
            colour: Color::new(0., 1., 0.),
        });
        let ball = Sphere::new("ball", Vec3::zero(), 2., Transparent::perfect());
        let ray = Ray::new(Vec3::new(0.3, 0.2, 0.), Vec3::new(0., 0., 1.), 0.);
        let scene = RecordingScene::new(Color::white());
        let c = volume
            .interact(&ray, &hit(&ball, &ray), &scene, &NoLight, TraceBudget::new(3))
            .unwrap();
        assert_eq!(c, Color::white());
    }

    #[test]
    fn lenslets_focus_towards_the_face_centre() {
        let families = axis_families();
        let lenslets = VoxelLenslets { focal_length: 1. };
        let outcome = lenslets
            .cross(&VoxelCrossing {
                point: Vec3::new(0.75, 0.5, 1.),
                dir: Vec3::new(0., 0., -1.),
                family: 2,
                families: &families,
                voxel: &[0, 0, 0],
            })
            .unwrap();
        match outcome {
            BoundaryOutcome::Continue { dir, .. } => {
                assert_vec_close(dir, Vec3::new(-0.25, 0., -1.).normalize(), 1e-12)
            }
            BoundaryOutcome::Stop(_) => panic!("lenslets never stop a ray"),
        }
    }

    #[test]
    fn too_many_families() {
        let family = PlaneFamily::new(Vec3::new(1., 1., 0.), 1., 0.).unwrap();
        let result = (0..=MAX_PLANE_FAMILIES)
            .try_fold(VoxellatedVolume::new(TransparentBoundaries), |v, _| v.add_family(family));
        assert!(result.is_err());
    }
}
