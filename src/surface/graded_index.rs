//! The volume inside a primitive filled with a graded-index medium.
//!
//! A ray entering the primitive is integrated through the medium until one of its steps
//! crosses the bounding surface. From the crossing it carries on into the scene, in the
//! direction it had there. The surface itself does not refract; the medium is assumed to
//! be index-matched to its surroundings at the boundary (as a Luneburg lens is).

use super::{trace_branch, SurfaceBehavior};
use crate::config::GrinSettings;
use crate::error::{check_coefficient, TraceResult};
use crate::grin::{Hamiltonian, Integrator, PhaseSpacePoint};
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::Side;
use crate::ray::{Ray, TraceBudget, TRAJECTORY_TARGET};
use crate::scene::{Scene, MIN_ORIGIN_DISTANCE};
use crate::spectrum::Color;
use log::{debug, trace};

pub struct GradedIndexVolume {
    medium: Box<dyn Hamiltonian>,
    integrator: Integrator,
    max_steps: usize,
    fallback: Color,
    surface_coefficient: f64,
    shadow_throwing: bool,
}

impl GradedIndexVolume {
    pub fn new<H: Hamiltonian + 'static>(medium: H, settings: &GrinSettings) -> TraceResult<Self> {
        Ok(GradedIndexVolume {
            medium: Box::new(medium),
            integrator: Integrator::from_settings(settings)?,
            max_steps: settings.max_steps,
            fallback: settings.fallback,
            surface_coefficient: 1.,
            shadow_throwing: false,
        })
    }

    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
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
}

impl SurfaceBehavior for GradedIndexVolume {
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
            return trace_branch(ray, hit, ray.dir, scene, light, budget);
        }

        let medium = self.medium.as_ref();
        let mut p = PhaseSpacePoint {
            x: hit.p,
            k: medium.initial_wavevector(hit.p, ray.dir)?,
        };

        for step in 0..self.max_steps {
            let next = self.integrator.step(medium, p)?;
            if ray.is_reporting() {
                trace!(
                    target: TRAJECTORY_TARGET,
                    "\"{}\" step {}: x=({:.6}, {:.6}, {:.6}) k=({:.6}, {:.6}, {:.6})",
                    hit.primitive.name(),
                    step,
                    next.x.x,
                    next.x.y,
                    next.x.z,
                    next.k.x,
                    next.k.y,
                    next.k.z
                );
            }

            // Does this step leave the volume? The segment runs from t = 0 to t = 1.
            let chord = Ray::new(p.x, next.x - p.x, hit.time);
            let length = chord.dir.length();
            if let Some(t) = hit.primitive.intersect(&chord, MIN_ORIGIN_DISTANCE / length) {
                if t <= 1. {
                    let exit_p = chord.point_at(t);
                    let exit_k = p.k.lerp(next.k, t);
                    let dir = medium.dh_dk(exit_p, exit_k).normalize();
                    let exit_hit = Intersection {
                        p: exit_p,
                        t,
                        time: hit.time,
                        primitive: hit.primitive,
                    };
                    let beyond = trace_branch(ray, &exit_hit, dir, scene, light, budget)?;
                    return Ok(beyond.scale(self.surface_coefficient));
                }
            }
            p = next;
        }

        debug!(
            "graded-index volume \"{}\": ray still inside after {} steps, using fallback colour",
            hit.primitive.name(),
            self.max_steps
        );
        Ok(self.fallback)
    }

    fn casts_shadow(&self) -> bool {
        self.shadow_throwing
    }
}
