//! Behaviours made of other behaviours.
//!
//! A composite casts a shadow if any of its children does.

use super::SurfaceBehavior;
use crate::error::{invalid, TraceResult};
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::Side;
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;

/// The sum of the colours of all of its children, each invoked on the same intersection.
/// Nothing is divided by the number of children; scale the children to taste.
pub struct Average {
    children: Vec<Box<dyn SurfaceBehavior>>,
}

impl Average {
    pub fn new() -> Self {
        Average {
            children: Vec::new(),
        }
    }

    pub fn add<S: SurfaceBehavior + 'static>(mut self, child: S) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Default for Average {
    fn default() -> Self {
        Average::new()
    }
}

impl SurfaceBehavior for Average {
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
        let mut sum = Color::black();
        for child in &self.children {
            sum += child.interact(ray, hit, scene, light, budget)?;
        }
        Ok(sum)
    }

    fn casts_shadow(&self) -> bool {
        self.children.iter().any(|c| c.casts_shadow())
    }
}

/// The weighted sum of the colours of its children. The weights are used as given.
pub struct WeightedAverage {
    children: Vec<(f64, Box<dyn SurfaceBehavior>)>,
}

impl WeightedAverage {
    pub fn new() -> Self {
        WeightedAverage {
            children: Vec::new(),
        }
    }

    pub fn add<S: SurfaceBehavior + 'static>(mut self, weight: f64, child: S) -> Self {
        self.children.push((weight, Box::new(child)));
        self
    }
}

impl Default for WeightedAverage {
    fn default() -> Self {
        WeightedAverage::new()
    }
}

impl SurfaceBehavior for WeightedAverage {
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
        let mut sum = Color::black();
        for (weight, child) in &self.children {
            // Zero-weight children would only waste rays:
            if *weight != 0. {
                sum += child.interact(ray, hit, scene, light, budget)?.scale(*weight);
            }
        }
        Ok(sum)
    }

    fn casts_shadow(&self) -> bool {
        self.children.iter().any(|(_, c)| c.casts_shadow())
    }
}

/// Different behaviours for rays arriving from outside and from inside.
pub struct TwoSided {
    outside: Box<dyn SurfaceBehavior>,
    inside: Box<dyn SurfaceBehavior>,
}

impl TwoSided {
    pub fn new<O, I>(outside: O, inside: I) -> Self
    where
        O: SurfaceBehavior + 'static,
        I: SurfaceBehavior + 'static,
    {
        TwoSided {
            outside: Box::new(outside),
            inside: Box::new(inside),
        }
    }
}

impl SurfaceBehavior for TwoSided {
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
        match Side::of(ray.dir, hit.normal()) {
            Side::Entering => self.outside.interact(ray, hit, scene, light, budget),
            Side::Exiting => self.inside.interact(ray, hit, scene, light, budget),
        }
    }

    fn casts_shadow(&self) -> bool {
        self.outside.casts_shadow() || self.inside.casts_shadow()
    }
}

/// The surface coordinate a [`Striped`] surface is striped along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StripeAxis {
    U,
    V,
}

/// Stripes of equal width, cycling through the given behaviours.
///
/// Stripe `i` covers `i * width <= u < (i + 1) * width` (or `v`); it uses behaviour
/// `i mod len`.
pub struct Striped {
    width: f64,
    axis: StripeAxis,
    stripes: Vec<Box<dyn SurfaceBehavior>>,
}

impl Striped {
    pub fn new(
        width: f64,
        axis: StripeAxis,
        stripes: Vec<Box<dyn SurfaceBehavior>>,
    ) -> TraceResult<Self> {
        if !(width > 0.) {
            return invalid(format!("stripe width must be positive, got {}", width));
        }
        if stripes.is_empty() {
            return invalid("a striped surface needs at least one stripe");
        }
        Ok(Striped {
            width,
            axis,
            stripes,
        })
    }

    fn stripe_at(&self, coordinate: f64) -> &dyn SurfaceBehavior {
        let i = (coordinate / self.width).floor() as i64;
        self.stripes[i.rem_euclid(self.stripes.len() as i64) as usize].as_ref()
    }
}

impl SurfaceBehavior for Striped {
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
        let uv = hit.require_coordinates()?.uv;
        let coordinate = match self.axis {
            StripeAxis::U => uv.x,
            StripeAxis::V => uv.y,
        };
        self.stripe_at(coordinate)
            .interact(ray, hit, scene, light, budget)
    }

    fn casts_shadow(&self) -> bool {
        self.stripes.iter().any(|s| s.casts_shadow())
    }
}

/// A checkerboard of two behaviours with tiles of size `width_u` by `width_v`.
pub struct Tiled {
    width_u: f64,
    width_v: f64,
    tile1: Box<dyn SurfaceBehavior>,
    tile2: Box<dyn SurfaceBehavior>,
}

impl Tiled {
    pub fn new<A, B>(width_u: f64, width_v: f64, tile1: A, tile2: B) -> TraceResult<Self>
    where
        A: SurfaceBehavior + 'static,
        B: SurfaceBehavior + 'static,
    {
        if !(width_u > 0.) || !(width_v > 0.) {
            return invalid(format!(
                "tile widths must be positive, got {} and {}",
                width_u, width_v
            ));
        }
        Ok(Tiled {
            width_u,
            width_v,
            tile1: Box::new(tile1),
            tile2: Box::new(tile2),
        })
    }
}

impl SurfaceBehavior for Tiled {
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
        let uv = hit.require_coordinates()?.uv;
        let i = (uv.x / self.width_u).floor() as i64 + (uv.y / self.width_v).floor() as i64;
        let tile = if i.rem_euclid(2) == 0 {
            &self.tile1
        } else {
            &self.tile2
        };
        tile.interact(ray, hit, scene, light, budget)
    }

    fn casts_shadow(&self) -> bool {
        self.tile1.casts_shadow() || self.tile2.casts_shadow()
    }
}
