//! A recursive light-transport kernel for unusual optical surfaces.
//!
//! A ray that hits a primitive hands itself to the primitive's [`surface::SurfaceBehavior`],
//! which computes the outgoing direction(s) and recurses back into the scene with a
//! smaller [`ray::TraceBudget`]. Besides mirrors and glass there are generalised
//! refraction laws, metarefracting sheets, relativistic boosts, phase holograms, stacks
//! of surfaces, voxellated volumes and graded-index media.

pub mod config;
pub mod error;
pub mod grin;
pub mod interaction;
pub mod light;
pub mod logger;
pub mod optics;
pub mod ray;
pub mod scene;
pub mod spectrum;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;
