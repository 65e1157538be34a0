//! Metarefraction: the components of the ray direction tangential to the surface are
//! treated as one complex number and transformed in the complex plane.
//!
//! With an orthonormal tangential basis `(u, v)` and the outward normal `n`, the normalized
//! direction `d` becomes `z = (d.u) + i (d.v)`. The transform gives `z'`, and the outgoing
//! direction is `u Re z' + v Im z' + n s sqrt(1 - |z'|^2)`, where `s` is the sign of `d.n`.
//! If `|z'| > 1` there is no outgoing ray and the surface reflects instead.
//!
//! Outward rays see the basis `(u, -v)`, which is right-handed around the reversed normal.
//! A transform is therefore always read looking along the ray, and two sheets with
//! opposite-facing normals whose transforms are inverses of each other cancel.

use super::{transmit_or_reflect, SurfaceBehavior};
use crate::error::{check_coefficient, invalid, TraceResult};
use crate::interaction::Intersection;
use crate::light::LightSource;
use crate::optics::{from_tangential, Evanescent, Side};
use crate::ray::{Ray, TraceBudget};
use crate::scene::Scene;
use crate::spectrum::Color;
use num_complex::Complex64;
use pmath::util::coord_system;
use pmath::vector::Vec3;

/// A linear map of the transverse direction components, written in complex form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransverseTransform {
    Identity,
    /// `z' = e^(i theta) z`: rotation by `theta` around the normal.
    Rotation(f64),
    /// `z' = e^(2 i phi) conj(z)`: mirroring about the line at angle `phi` to `u`.
    Flip(f64),
    /// `z' = c z`.
    ComplexMultiply(Complex64),
}

impl TransverseTransform {
    pub fn apply(&self, z: Complex64) -> Complex64 {
        match *self {
            TransverseTransform::Identity => z,
            TransverseTransform::Rotation(theta) => Complex64::from_polar(1., theta) * z,
            TransverseTransform::Flip(phi) => Complex64::from_polar(1., 2. * phi) * z.conj(),
            TransverseTransform::ComplexMultiply(c) => c * z,
        }
    }

    /// The transform that undoes this one, if there is one.
    pub fn inverse(&self) -> Option<TransverseTransform> {
        match *self {
            TransverseTransform::Identity => Some(TransverseTransform::Identity),
            TransverseTransform::Rotation(theta) => Some(TransverseTransform::Rotation(-theta)),
            TransverseTransform::Flip(phi) => Some(TransverseTransform::Flip(phi)),
            TransverseTransform::ComplexMultiply(c) if c.norm_sqr() > 0. => {
                Some(TransverseTransform::ComplexMultiply(c.inv()))
            }
            TransverseTransform::ComplexMultiply(_) => None,
        }
    }
}

/// Where the tangential basis `(u, v)` comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BasisSource {
    /// Any right-handed basis around the normal. Only suitable for transforms that commute
    /// with rotations (rotations and complex multiplications).
    AroundNormal,
    /// Two fixed directions, projected into the tangent plane at the hit point.
    Global { u: Vec3<f64>, v: Vec3<f64> },
    /// The surface's own `(dp/du, dp/dv)`.
    SurfaceParameterisation,
}

/// Orthonormalizes `(u, v)` against the unit normal `n` (Gram-Schmidt in the order n, u, v).
pub(crate) fn tangential_basis(
    u: Vec3<f64>,
    v: Vec3<f64>,
    n: Vec3<f64>,
) -> TraceResult<(Vec3<f64>, Vec3<f64>)> {
    let u_hat = match u.perpendicular_to(n).try_normalize() {
        Some(u) => u,
        None => return invalid("tangential basis vector u is parallel to the surface normal"),
    };
    match v.perpendicular_to(n).perpendicular_to(u_hat).try_normalize() {
        Some(v_hat) => Ok((u_hat, v_hat)),
        None => invalid("tangential basis vectors are degenerate at the hit point"),
    }
}

impl BasisSource {
    fn basis_at(&self, hit: &Intersection, n: Vec3<f64>) -> TraceResult<(Vec3<f64>, Vec3<f64>)> {
        match *self {
            BasisSource::AroundNormal => Ok(coord_system(n)),
            BasisSource::Global { u, v } => tangential_basis(u, v, n),
            BasisSource::SurfaceParameterisation => {
                let c = hit.require_coordinates()?;
                tangential_basis(c.dpdu, c.dpdv, n)
            }
        }
    }
}

/// A surface that applies one transverse transform to inward rays and another to outward
/// rays.
pub struct Metarefraction {
    inward: TransverseTransform,
    outward: TransverseTransform,
    basis: BasisSource,
    coefficient: f64,
    shadow_throwing: bool,
}

impl Metarefraction {
    pub fn new(
        inward: TransverseTransform,
        outward: TransverseTransform,
        basis: BasisSource,
        coefficient: f64,
    ) -> TraceResult<Self> {
        Ok(Metarefraction {
            inward,
            outward,
            basis,
            coefficient: check_coefficient(coefficient)?,
            shadow_throwing: false,
        })
    }

    /// Rotates the ray direction by `theta` around the outward normal, from either side. A
    /// ray crossing two such sheets with opposite-facing normals keeps its direction.
    pub fn ray_rotation(theta: f64, coefficient: f64) -> TraceResult<Self> {
        Metarefraction::new(
            TransverseTransform::Rotation(theta),
            TransverseTransform::Rotation(-theta),
            BasisSource::AroundNormal,
            coefficient,
        )
    }

    /// Mirrors the transverse direction about the line at angle `phi` to the basis's `u`,
    /// from either side.
    pub fn ray_flipping(phi: f64, basis: BasisSource, coefficient: f64) -> TraceResult<Self> {
        Metarefraction::new(
            TransverseTransform::Flip(phi),
            TransverseTransform::Flip(-phi),
            basis,
            coefficient,
        )
    }

    /// Multiplies inward rays by `c` and outward rays by `1 / c`.
    pub fn complex(c: Complex64, coefficient: f64) -> TraceResult<Self> {
        let inward = TransverseTransform::ComplexMultiply(c);
        match inward.inverse() {
            Some(outward) => {
                Metarefraction::new(inward, outward, BasisSource::AroundNormal, coefficient)
            }
            None => invalid("complex metarefraction factor must not be zero"),
        }
    }

    /// Snell refraction with `ratio = n_outside / n_inside`, as a metarefraction.
    pub fn refraction(ratio: f64, coefficient: f64) -> TraceResult<Self> {
        Metarefraction::complex(Complex64::new(ratio, 0.), coefficient)
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
        let (u, v) = self.basis.basis_at(hit, n)?;

        let (transform, v) = match Side::of(d, n) {
            Side::Entering => (&self.inward, v),
            Side::Exiting => (&self.outward, -v),
        };
        let z = transform.apply(Complex64::new(d.dot(u), d.dot(v)));
        Ok(from_tangential(u.scale(z.re) + v.scale(z.im), n, d.dot(n)))
    }
}

impl SurfaceBehavior for Metarefraction {
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
