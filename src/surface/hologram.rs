//! Holograms and other thin phase elements.
//!
//! A phase hologram adds the gradient of its phase profile to the tangential component of
//! the (normalized) ray direction: `t' = t + delta(p)`. A transmissive hologram keeps the
//! sign of the normal component, a reflective one flips it. If `|t'| > 1` the ray is
//! reflected instead.

use super::metarefraction::tangential_basis;
use super::{transmit_or_reflect, SurfaceBehavior};
use crate::error::{check_coefficient, invalid, TraceResult};
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::{from_tangential, Evanescent};
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;
use pmath::numbers::Float;
use pmath::vector::Vec3;

/// The tangential direction change a phase element imposes at the hit point.
///
/// `normal` is the outward unit normal at the hit point. Only the part of the result
/// perpendicular to it is used.
pub trait PhaseGradient: Send + Sync {
    fn tangential_change(&self, hit: &Intersection, normal: Vec3<f64>) -> TraceResult<Vec3<f64>>;
}

/// The direction change of an ideal thin lens of focal length `f` at transverse offset
/// `r` from its principal point. Exact for rays that arrive along the optical axis.
pub(crate) fn thin_lens_deflection(r: Vec3<f64>, f: f64) -> Vec3<f64> {
    r.scale(-f.sign_of() / (r.length2() + f * f).sqrt())
}

/// An ideal thin lens.
#[derive(Clone, Copy, Debug)]
pub struct IdealThinLens {
    pub principal_point: Vec3<f64>,
    pub focal_length: f64,
}

impl PhaseGradient for IdealThinLens {
    fn tangential_change(&self, hit: &Intersection, normal: Vec3<f64>) -> TraceResult<Vec3<f64>> {
        let r = (hit.p - self.principal_point).perpendicular_to(normal);
        Ok(thin_lens_deflection(r, self.focal_length))
    }
}

/// A cylindrical lens; it only focusses perpendicular to `axis`.
#[derive(Clone, Copy, Debug)]
pub struct CylindricalLens {
    pub principal_point: Vec3<f64>,
    pub axis: Vec3<f64>,
    pub focal_length: f64,
}

impl PhaseGradient for CylindricalLens {
    fn tangential_change(&self, hit: &Intersection, normal: Vec3<f64>) -> TraceResult<Vec3<f64>> {
        let axis = match self.axis.perpendicular_to(normal).try_normalize() {
            Some(axis) => axis,
            None => return invalid("cylindrical lens axis is parallel to the surface normal"),
        };
        let r = (hit.p - self.principal_point)
            .perpendicular_to(normal)
            .perpendicular_to(axis);
        Ok(thin_lens_deflection(r, self.focal_length))
    }
}

/// How a [`LenticularArray`] finds the cell a point lies in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellBasis {
    /// Cells laid out along two directions from `origin`.
    Global {
        origin: Vec3<f64>,
        u: Vec3<f64>,
        v: Vec3<f64>,
    },
    /// Cells laid out in the surface's (u, v) coordinates.
    SurfaceParameterisation,
}

/// An array of identical thin lenses, one per rectangular cell.
///
/// Without `period_v` the lenses are cylindrical (one row of lenses running along v).
#[derive(Clone, Copy, Debug)]
pub struct LenticularArray {
    pub cells: CellBasis,
    pub period_u: f64,
    pub period_v: Option<f64>,
    pub focal_length: f64,
}

fn offset_from_centre(x: f64, period: Option<f64>) -> f64 {
    match period {
        Some(period) => x - ((x / period).floor() + 0.5) * period,
        None => 0.,
    }
}

impl PhaseGradient for LenticularArray {
    fn tangential_change(&self, hit: &Intersection, normal: Vec3<f64>) -> TraceResult<Vec3<f64>> {
        if !(self.period_u > 0.) || !self.period_v.map_or(true, |p| p > 0.) {
            return invalid("lenticular array periods must be positive");
        }

        let (du, dv, a, b) = match self.cells {
            CellBasis::Global { origin, u, v } => {
                let (u, v) = tangential_basis(u, v, normal)?;
                let r = hit.p - origin;
                (u, v, r.dot(u), r.dot(v))
            }
            CellBasis::SurfaceParameterisation => {
                let c = hit.require_coordinates()?;
                (c.dpdu, c.dpdv, c.uv.x, c.uv.y)
            }
        };
        let r = du.scale(offset_from_centre(a, Some(self.period_u)))
            + dv.scale(offset_from_centre(b, self.period_v));
        Ok(thin_lens_deflection(r.perpendicular_to(normal), self.focal_length))
    }
}

/// A linear phase profile (a prism or a blazed grating).
#[derive(Clone, Copy, Debug)]
pub struct ConstantGradient(pub Vec3<f64>);

impl PhaseGradient for ConstantGradient {
    fn tangential_change(&self, _: &Intersection, normal: Vec3<f64>) -> TraceResult<Vec3<f64>> {
        Ok(self.0.perpendicular_to(normal))
    }
}

/// A phase gradient given by a closure of the intersection and the normal.
pub struct FnGradient<F>(F);

impl<F> FnGradient<F>
where
    F: Fn(&Intersection, Vec3<f64>) -> Vec3<f64> + Send + Sync,
{
    pub fn new(gradient: F) -> Self {
        FnGradient(gradient)
    }
}

impl<F> PhaseGradient for FnGradient<F>
where
    F: Fn(&Intersection, Vec3<f64>) -> Vec3<f64> + Send + Sync,
{
    fn tangential_change(&self, hit: &Intersection, normal: Vec3<f64>) -> TraceResult<Vec3<f64>> {
        Ok((self.0)(hit, normal))
    }
}

pub struct PhaseHologram {
    gradient: Box<dyn PhaseGradient>,
    reflective: bool,
    coefficient: f64,
    shadow_throwing: bool,
}

impl PhaseHologram {
    pub fn transmissive<G>(gradient: G, coefficient: f64) -> TraceResult<Self>
    where
        G: PhaseGradient + 'static,
    {
        Ok(PhaseHologram {
            gradient: Box::new(gradient),
            reflective: false,
            coefficient: check_coefficient(coefficient)?,
            shadow_throwing: false,
        })
    }

    pub fn reflective<G>(gradient: G, coefficient: f64) -> TraceResult<Self>
    where
        G: PhaseGradient + 'static,
    {
        Ok(PhaseHologram {
            reflective: true,
            ..PhaseHologram::transmissive(gradient, coefficient)?
        })
    }

    pub fn shadow_throwing(mut self, shadow_throwing: bool) -> Self {
        self.shadow_throwing = shadow_throwing;
        self
    }

    pub fn outgoing_direction(
        &self,
        d: Vec3<f64>,
        hit: &Intersection,
    ) -> TraceResult<Result<Vec3<f64>, Evanescent>> {
        let n = hit.normal();
        let d = d.normalize();
        let delta = self.gradient.tangential_change(hit, n)?.perpendicular_to(n);
        let t = d.perpendicular_to(n) + delta;
        let normal_sign = if self.reflective {
            -d.dot(n).sign_of()
        } else {
            d.dot(n).sign_of()
        };
        Ok(from_tangential(t, n, normal_sign))
    }
}

impl SurfaceBehavior for PhaseHologram {
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
        let outgoing = self.outgoing_direction(ray.dir, hit)?;
        transmit_or_reflect(outgoing, self.coefficient, ray, hit, scene, light, budget)
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_throwing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::NoLight;
    use crate::testing::{
        assert_close, assert_vec_close, hit_on_plane, hit_on_plane_at, RecordingScene,
    };
    use test_log::test;

    fn lens(f: f64) -> IdealThinLens {
        IdealThinLens {
            principal_point: Vec3::zero(),
            focal_length: f,
        }
    }

    #[test]
    fn thin_lens_focuses_axial_rays() {
        let surface = PhaseHologram::transmissive(lens(2.), 1.).unwrap();
        let at = Vec3::new(0.3, -0.4, 0.);
        let (plane, ray) = hit_on_plane_at(at, Vec3::new(0., 0., -1.));
        let out = surface.outgoing_direction(ray.dir, &plane.hit(&ray)).unwrap().unwrap();
        // The ray goes through the focal point (0, 0, -2):
        assert_vec_close(out, (Vec3::new(0., 0., -2.) - at).normalize(), 1e-12);

        // A diverging lens makes it look like it came from (0, 0, 2):
        let surface = PhaseHologram::transmissive(lens(-2.), 1.).unwrap();
        let out = surface.outgoing_direction(ray.dir, &plane.hit(&ray)).unwrap().unwrap();
        assert_vec_close(out, (at - Vec3::new(0., 0., 2.)).normalize(), 1e-12);
    }

    #[test]
    fn reflective_hologram_flips_normal_component() {
        let gradient = ConstantGradient(Vec3::new(0.1, 0., 0.3));
        let surface = PhaseHologram::reflective(gradient, 1.).unwrap();
        let (plane, ray) = hit_on_plane(Vec3::new(0.2, 0., -1.));
        let d = ray.dir.normalize();
        let out = surface.outgoing_direction(ray.dir, &plane.hit(&ray)).unwrap().unwrap();
        assert_close(out.x, d.x + 0.1, 1e-12);
        assert!(out.z > 0.);
    }

    #[test]
    fn cylindrical_lens_ignores_the_axis_direction() {
        let surface = PhaseHologram::transmissive(
            CylindricalLens {
                principal_point: Vec3::zero(),
                axis: Vec3::new(0., 1., 0.),
                focal_length: 1.,
            },
            1.,
        )
        .unwrap();
        let (plane, ray) = hit_on_plane_at(Vec3::new(0.5, 3., 0.), Vec3::new(0., 0., -1.));
        let out = surface.outgoing_direction(ray.dir, &plane.hit(&ray)).unwrap().unwrap();
        assert_close(out.y, 0., 1e-15);
        assert_close(out.x / -out.z, -0.5, 1e-12);
    }

    #[test]
    fn lenticular_array_centres_each_cell() {
        let array = LenticularArray {
            cells: CellBasis::SurfaceParameterisation,
            period_u: 1.,
            period_v: Some(1.),
            focal_length: 1.,
        };
        let surface = PhaseHologram::transmissive(array, 1.).unwrap();
        // 0.25 from the centre (2.5, -0.5) of its cell in u, on the centre in v:
        let (plane, ray) = hit_on_plane_at(Vec3::new(2.75, -0.5, 0.), Vec3::new(0., 0., -1.));
        let out = surface.outgoing_direction(ray.dir, &plane.hit(&ray)).unwrap().unwrap();
        assert_vec_close(out, Vec3::new(-0.25, 0., -1.).normalize(), 1e-12);
    }

    #[test]
    fn strong_gradient_reflects() {
        let scene = RecordingScene::new(Color::white());
        let gradient = ConstantGradient(Vec3::new(1.5, 0., 0.));
        let surface = PhaseHologram::transmissive(gradient, 0.5).unwrap();
        assert!(PhaseHologram::transmissive(gradient, -0.5).is_err());
        let (plane, ray) = hit_on_plane(Vec3::new(0., 0., -1.));
        let c = surface
            .interact(&ray, &plane.hit(&ray), &scene, &NoLight, TraceBudget::new(2))
            .unwrap();
        assert_eq!(c, Color::white());
        assert_vec_close(scene.traced()[0].dir, Vec3::new(0., 0., 1.), 1e-12);
    }

    #[test]
    fn closure_gradient() {
        let gradient = FnGradient::new(|hit, _| hit.p.scale(-0.1));
        let surface = PhaseHologram::transmissive(gradient, 1.).unwrap();
        let (plane, ray) = hit_on_plane_at(Vec3::new(1., 0., 0.), Vec3::new(0., 0., -1.));
        let out = surface.outgoing_direction(ray.dir, &plane.hit(&ray)).unwrap().unwrap();
        assert_close(out.x, -0.1, 1e-12);
    }
}
