use super::Primitive;
use crate::interaction::SurfaceCoordinates;
use crate::ray::Ray;
use crate::surface::SurfaceBehavior;
use pmath::vector::{Vec2, Vec3};

/// An infinite plane through `point` with outward normal `normal`. Optionally carries a
/// linear (u, v) parameterisation spanned by two tangent vectors.
pub struct Plane {
    name: String,
    point: Vec3<f64>,
    normal: Vec3<f64>,
    // (dp/du, dp/dv)
    axes: Option<(Vec3<f64>, Vec3<f64>)>,
    surface: Box<dyn SurfaceBehavior>,
}

impl Plane {
    pub fn new<S: SurfaceBehavior + 'static>(
        name: &str,
        point: Vec3<f64>,
        normal: Vec3<f64>,
        surface: S,
    ) -> Self {
        Plane {
            name: name.to_string(),
            point,
            normal: normal.normalize(),
            axes: None,
            surface: Box::new(surface),
        }
    }

    /// Gives the plane the parameterisation `p = point + u * u_axis + v * v_axis`. The axes
    /// should lie in the plane and must not be parallel.
    pub fn with_parameterisation(mut self, u_axis: Vec3<f64>, v_axis: Vec3<f64>) -> Self {
        self.axes = Some((u_axis, v_axis));
        self
    }
}

impl Primitive for Plane {
    fn name(&self) -> &str {
        &self.name
    }

    fn intersect(&self, ray: &Ray, t_min: f64) -> Option<f64> {
        let denom = ray.dir.dot(self.normal);
        if denom.abs() < 1e-15 {
            return None;
        }
        let t = (self.point - ray.org).dot(self.normal) / denom;
        if t > t_min {
            Some(t)
        } else {
            None
        }
    }

    fn normal(&self, _p: Vec3<f64>) -> Vec3<f64> {
        self.normal
    }

    fn coordinates(&self, p: Vec3<f64>) -> Option<SurfaceCoordinates> {
        let (u_axis, v_axis) = self.axes?;
        // Solve r = u * a + v * b in the least squares sense (the 2x2 Gram system):
        let r = p - self.point;
        let (aa, ab, bb) = (u_axis.dot(u_axis), u_axis.dot(v_axis), v_axis.dot(v_axis));
        let det = aa * bb - ab * ab;
        if det.abs() < 1e-300 {
            return None;
        }
        let (ra, rb) = (r.dot(u_axis), r.dot(v_axis));
        Some(SurfaceCoordinates {
            uv: Vec2 {
                x: (ra * bb - rb * ab) / det,
                y: (rb * aa - ra * ab) / det,
            },
            dpdu: u_axis,
            dpdv: v_axis,
        })
    }

    fn surface(&self) -> &dyn SurfaceBehavior {
        self.surface.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Transparent;

    #[test]
    fn hits_in_front_only() {
        let plane = Plane::new("p", Vec3::zero(), Vec3::new(0., 0., 1.), Transparent::perfect());
        let ray = Ray::new(Vec3::new(0., 0., 2.), Vec3::new(0., 0., -1.), 0.);
        assert_eq!(plane.intersect(&ray, 0.), Some(2.));
        let away = Ray::new(Vec3::new(0., 0., 2.), Vec3::new(0., 0., 1.), 0.);
        assert_eq!(plane.intersect(&away, 0.), None);
    }

    #[test]
    fn coordinates_follow_axes() {
        let plane = Plane::new("p", Vec3::zero(), Vec3::new(0., 0., 1.), Transparent::perfect())
            .with_parameterisation(Vec3::new(2., 0., 0.), Vec3::new(0., 0.5, 0.));
        let c = plane.coordinates(Vec3::new(3., 1., 0.)).unwrap();
        assert!((c.uv.x - 1.5).abs() < 1e-12);
        assert!((c.uv.y - 2.).abs() < 1e-12);
    }
}
