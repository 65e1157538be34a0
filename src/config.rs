// Settings that are not part of any one surface: recursion depth, step limits and the
// numerical parameters of the traversals. Loaded from JSON; every field has a default.

use crate::grin::IntegrationScheme;
use crate::ray::TraceBudget;
use crate::spectrum::Color;
use log::warn;
use serde::{Deserialize, Serialize};
use simple_error::{bail, try_with, SimpleResult};

use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// The trace budget of root rays.
    pub max_trace_level: i32,
    /// Branch rays ignore intersections with the surface they start on closer than this.
    pub self_intersection_epsilon: f64,
    pub voxel: VoxelSettings,
    pub grin: GrinSettings,
}

impl Default for TraceSettings {
    fn default() -> Self {
        TraceSettings {
            max_trace_level: 10,
            self_intersection_epsilon: 1e-6,
            voxel: VoxelSettings::default(),
            grin: GrinSettings::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelSettings {
    /// The most plane crossings a ray may make inside one voxellated volume.
    pub max_steps: usize,
    /// The colour of rays that exceed `max_steps`.
    pub fallback: Color,
}

impl Default for VoxelSettings {
    fn default() -> Self {
        VoxelSettings {
            max_steps: 100,
            fallback: Color::black(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrinSettings {
    pub scheme: IntegrationScheme,
    /// The largest distance a ray may travel in one integration step.
    pub delta_x_max: f64,
    pub max_steps: usize,
    /// Error tolerance of the adaptive scheme.
    pub tolerance: f64,
    /// The colour of rays that exceed `max_steps`.
    pub fallback: Color,
}

impl Default for GrinSettings {
    fn default() -> Self {
        GrinSettings {
            scheme: IntegrationScheme::RungeKutta4,
            delta_x_max: 0.01,
            max_steps: 10_000,
            tolerance: 1e-6,
            fallback: Color::black(),
        }
    }
}

impl TraceSettings {
    pub fn from_json_str(json: &str) -> SimpleResult<Self> {
        let settings: TraceSettings = try_with!(serde_json::from_str(json), "ill-formed settings");
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> SimpleResult<Self> {
        let path = path.as_ref();
        let json = try_with!(
            fs::read_to_string(path),
            "problem when reading settings file: {}",
            path.display()
        );
        TraceSettings::from_json_str(&json)
    }

    pub fn validate(&self) -> SimpleResult<()> {
        if self.max_trace_level < 0 {
            bail!("max_trace_level must not be negative");
        }
        if self.max_trace_level == 0 {
            warn!("max_trace_level is 0, every root ray will come back black");
        }
        if !(self.self_intersection_epsilon >= 0.) {
            bail!("self_intersection_epsilon must not be negative");
        }
        if !(self.grin.delta_x_max > 0.) {
            bail!("grin.delta_x_max must be positive");
        }
        if !(self.grin.tolerance > 0.) {
            bail!("grin.tolerance must be positive");
        }
        if self.grin.max_steps == 0 {
            bail!("grin.max_steps must be positive");
        }
        Ok(())
    }

    /// The budget root rays start with.
    pub fn budget(&self) -> TraceBudget {
        TraceBudget::new(self.max_trace_level)
    }
}
