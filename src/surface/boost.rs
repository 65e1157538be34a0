//! Surfaces that change the ray direction the way a change of inertial frame does.
//!
//! Velocities are in units of the speed of light. Inward rays are boosted by `beta` and
//! outward rays by `-beta`.

use super::metarefraction::tangential_basis;
use super::{transmit_or_reflect, SurfaceBehavior};
use crate::error::{check_coefficient, invalid, TraceResult};
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::{Evanescent, Side};
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;
use pmath::vector::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoostKind {
    /// Galilean velocity addition, `d' = d + beta`.
    Galileo,
    /// Relativistic aberration of light.
    Lorentz,
}

/// The frame velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Beta {
    Global(Vec3<f64>),
    /// Components along the surface's orthonormalized `(dp/du, dp/dv)` and its outward
    /// normal, in that order.
    Surface(Vec3<f64>),
}

impl Beta {
    fn at(&self, hit: &Intersection, n: Vec3<f64>) -> TraceResult<Vec3<f64>> {
        let beta = match *self {
            Beta::Global(beta) => beta,
            Beta::Surface(components) => {
                let c = hit.require_coordinates()?;
                let (u, v) = tangential_basis(c.dpdu, c.dpdv, n)?;
                u.scale(components.x) + v.scale(components.y) + n.scale(components.z)
            }
        };
        check_speed(beta)?;
        Ok(beta)
    }

    fn components(&self) -> Vec3<f64> {
        match *self {
            Beta::Global(beta) | Beta::Surface(beta) => beta,
        }
    }
}

fn check_speed(beta: Vec3<f64>) -> TraceResult<()> {
    let speed2 = beta.length2();
    if !(speed2 < 1.) {
        return invalid(format!(
            "frame speed must be below the speed of light, got beta^2 = {}",
            speed2
        ));
    }
    Ok(())
}

/// Adds the velocity `beta` to the unit direction `d`.
pub fn boost_direction(kind: BoostKind, d: Vec3<f64>, beta: Vec3<f64>) -> Vec3<f64> {
    match kind {
        BoostKind::Galileo => d + beta,
        BoostKind::Lorentz => {
            let beta2 = beta.length2();
            if beta2 == 0. {
                return d;
            }
            let gamma = 1. / (1. - beta2).sqrt();
            d + beta.scale((gamma - 1.) * beta.dot(d) / beta2 + gamma * d.length())
        }
    }
}

pub struct Boost {
    kind: BoostKind,
    beta: Beta,
    coefficient: f64,
    shadow_throwing: bool,
}

impl Boost {
    pub fn new(kind: BoostKind, beta: Beta, coefficient: f64) -> TraceResult<Self> {
        check_speed(beta.components())?;
        Ok(Boost {
            kind,
            beta,
            coefficient: check_coefficient(coefficient)?,
            shadow_throwing: false,
        })
    }

    pub fn galileo(beta: Vec3<f64>, coefficient: f64) -> TraceResult<Self> {
        Boost::new(BoostKind::Galileo, Beta::Global(beta), coefficient)
    }

    pub fn lorentz(beta: Vec3<f64>, coefficient: f64) -> TraceResult<Self> {
        Boost::new(BoostKind::Lorentz, Beta::Global(beta), coefficient)
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
        let beta = self.beta.at(hit, n)?;
        let side = Side::of(d, n);
        let beta = match side {
            Side::Entering => beta,
            Side::Exiting => -beta,
        };

        // The boosted ray has to carry on through the surface:
        let boosted = boost_direction(self.kind, d, beta);
        Ok(match boosted.try_normalize() {
            Some(out) if Side::of(out, n) == side && out.dot(n) != 0. => Ok(out),
            _ => Err(Evanescent),
        })
    }
}

impl SurfaceBehavior for Boost {
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
