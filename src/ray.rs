use log::trace;
use pmath::vector::Vec3;

/// Log target used for trajectory reports of rays that have reporting switched on.
pub const TRAJECTORY_TARGET: &str = "refractor::trajectory";

/// A ray travelling through the scene.
///
/// Rays are never modified once built: every surface interaction produces a fresh branch
/// ray through [`Ray::branch`], which carries the reporting flag of its parent along.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// The origin point of the ray.
    pub org: Vec3<f64>,
    /// The direction vector of the ray, not necessarily normalized.
    pub dir: Vec3<f64>,
    /// The current time in the scene of the ray.
    pub time: f64,
    reporting: bool,
}

impl Ray {
    /// Constructs a root ray (one that is emitted by a camera or a light).
    pub fn new(org: Vec3<f64>, dir: Vec3<f64>, time: f64) -> Self {
        Ray {
            org,
            dir,
            time,
            reporting: false,
        }
    }

    /// Constructs a root ray whose whole family of branch rays gets logged.
    pub fn new_reporting(org: Vec3<f64>, dir: Vec3<f64>, time: f64) -> Self {
        let ray = Ray {
            org,
            dir,
            time,
            reporting: true,
        };
        ray.report();
        ray
    }

    pub fn is_reporting(&self) -> bool {
        self.reporting
    }

    /// Creates the ray that continues from a surface interaction.
    pub fn branch(&self, org: Vec3<f64>, dir: Vec3<f64>, time: f64) -> Ray {
        let ray = Ray {
            org,
            dir,
            time,
            reporting: self.reporting,
        };
        ray.report();
        ray
    }

    /// Calculates a point along the ray given a parametric parameter.
    pub fn point_at(&self, t: f64) -> Vec3<f64> {
        self.org + self.dir.scale(t)
    }

    /// The same ray with its origin moved `eps` along the (normalized) direction. Used to
    /// step off a surface the ray starts on.
    pub fn advance(&self, eps: f64) -> Ray {
        Ray {
            org: self.org + self.dir.normalize().scale(eps),
            ..*self
        }
    }

    fn report(&self) {
        if self.reporting {
            trace!(
                target: TRAJECTORY_TARGET,
                "ray org=({:.6}, {:.6}, {:.6}) dir=({:.6}, {:.6}, {:.6}) t={}",
                self.org.x,
                self.org.y,
                self.org.z,
                self.dir.x,
                self.dir.y,
                self.dir.z,
                self.time
            );
        }
    }
}

/// The remaining recursion depth of a ray.
///
/// Each recursive trace call hands on `budget.decrement()`. Every surface behaviour checks
/// [`TraceBudget::is_exhausted`] before doing any geometry and returns black when it is;
/// this is the only thing stopping two facing mirrors from recursing forever.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TraceBudget(i32);

impl TraceBudget {
    pub fn new(levels: i32) -> Self {
        TraceBudget(levels)
    }

    pub fn levels(self) -> i32 {
        self.0
    }

    pub fn is_exhausted(self) -> bool {
        self.0 <= 0
    }

    pub fn decrement(self) -> Self {
        TraceBudget(self.0 - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_rays_inherit_reporting() {
        let root = Ray::new_reporting(Vec3::zero(), Vec3::new(0., 0., 1.), 0.);
        let branch = root.branch(Vec3::new(0., 0., 1.), Vec3::new(1., 0., 0.), 2.);
        assert!(branch.is_reporting());
        assert_eq!(branch.time, 2.);

        let quiet = Ray::new(Vec3::zero(), Vec3::new(0., 0., 1.), 0.);
        assert!(!quiet.branch(Vec3::zero(), Vec3::new(0., 1., 0.), 0.).is_reporting());
    }

    #[test]
    fn budget_runs_out_at_zero() {
        let budget = TraceBudget::new(2);
        assert!(!budget.is_exhausted());
        assert!(!budget.decrement().is_exhausted());
        assert!(budget.decrement().decrement().is_exhausted());
        assert!(TraceBudget::new(-3).is_exhausted());
    }

    #[test]
    fn advance_moves_along_unit_direction() {
        let ray = Ray::new(Vec3::zero(), Vec3::new(0., 0., 4.), 0.);
        assert!((ray.advance(0.5).org.z - 0.5).abs() < 1e-12);
    }
}
