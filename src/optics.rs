//! Reflection and refraction of ray directions at a surface.
//!
//! All functions take the outward unit normal `n` of the surface and a ray direction `d`
//! pointing *towards* the surface (the direction the ray travels in). A refraction that
//! has no real solution returns [`Evanescent`]; the caller decides what to do instead
//! (almost always: reflect).

use pmath::numbers::Float;
use pmath::util::clamp;
use pmath::vector::Vec3;
use thiserror::Error;

/// The requested outgoing direction does not exist (total internal reflection, or a
/// generalised law driven outside its domain).
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("evanescent: the outgoing ray has no real direction")]
pub struct Evanescent;

/// Which way a ray crosses a surface relative to its outward normal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// `d·n < 0`: the ray arrives from outside.
    Entering,
    /// `d·n >= 0`: the ray arrives from inside.
    Exiting,
}

impl Side {
    pub fn of(d: Vec3<f64>, n: Vec3<f64>) -> Self {
        if d.dot(n) < 0. {
            Side::Entering
        } else {
            Side::Exiting
        }
    }
}

/// Mirror reflection, `d' = d - 2(d·n)n`. Keeps the length of `d`.
pub fn reflect(d: Vec3<f64>, n: Vec3<f64>) -> Vec3<f64> {
    d - n.scale(2. * d.dot(n))
}

/// The (non-negative) angle between the ray and the surface normal.
pub fn angle_of_incidence(d: Vec3<f64>, n: Vec3<f64>) -> f64 {
    clamp(d.normalize().dot(n).abs(), 0., 1.).acos()
}

/// Builds a unit direction from its tangential component `t` (with `|t| <= 1`) and the
/// sign of the normal component. Fails if `|t| > 1`.
pub fn from_tangential(
    t: Vec3<f64>,
    n: Vec3<f64>,
    normal_sign: f64,
) -> Result<Vec3<f64>, Evanescent> {
    let s = t.length2();
    if s > 1. {
        return Err(Evanescent);
    }
    let normal = n.scale(normal_sign.sign_of() * (1. - s).sqrt());
    Ok((t + normal).normalize())
}

/// Vector form of Snell's law with ratio `r = n_incident / n_transmitted`.
///
/// The tangential component of the normalized direction is scaled by `r`; the normal
/// component is rebuilt with length `sqrt(1 - |t'|^2)` and the sign of the original
/// propagation direction.
pub fn refract(d: Vec3<f64>, n: Vec3<f64>, r: f64) -> Result<Vec3<f64>, Evanescent> {
    let d = d.normalize();
    let t = d.perpendicular_to(n).scale(r);
    from_tangential(t, n, d.dot(n))
}

/// Refraction through an interface with `ratio = n_outside / n_inside`. The side the ray
/// arrives from decides whether `ratio` or `1 / ratio` applies.
pub fn refract_through(d: Vec3<f64>, n: Vec3<f64>, ratio: f64) -> Result<Vec3<f64>, Evanescent> {
    match Side::of(d, n) {
        Side::Entering => refract(d, n, ratio),
        Side::Exiting => refract(d, n, 1. / ratio),
    }
}

/// The Fresnel reflectance of a dielectric for unpolarised light.
///
/// `cos_theta_i` is the cosine of the angle of incidence measured on the side of the
/// incident medium; `eta_i` and `eta_t` are the refractive indices of the incident and
/// transmitted media. Returns 1 under total internal reflection.
pub fn fresnel_dielectric(cos_theta_i: f64, eta_i: f64, eta_t: f64) -> f64 {
    let cos_theta_i = clamp(cos_theta_i.abs(), 0., 1.);

    let sin_theta_i = (1. - cos_theta_i * cos_theta_i).max(0.).sqrt();
    let sin_theta_t = eta_i / eta_t * sin_theta_i;
    if sin_theta_t > 1. {
        return 1.;
    }
    let cos_theta_t = (1. - sin_theta_t * sin_theta_t).max(0.).sqrt();

    // s- and p-polarised amplitudes:
    let refl_parl = ((eta_t * cos_theta_i) - (eta_i * cos_theta_t))
        / ((eta_t * cos_theta_i) + (eta_i * cos_theta_t));
    let refl_perp = ((eta_i * cos_theta_i) - (eta_t * cos_theta_t))
        / ((eta_i * cos_theta_i) + (eta_t * cos_theta_t));

    (refl_parl * refl_parl + refl_perp * refl_perp) / 2.
}

/// The critical angle for the ratio `r = n_incident / n_transmitted`, if there is one.
pub fn critical_angle(r: f64) -> Option<f64> {
    if r > 1. {
        Some((1. / r).asin())
    } else {
        None
    }
}
