use crate::numbers::Float;
use crate::vector::Vec3;

use std::cmp::PartialOrd;

// This is used so that we can have efficient comparisons
// with PartialOrd types:

pub fn min<T: PartialOrd>(v0: T, v1: T) -> T {
    if v0 < v1 {
        v0
    } else {
        v1
    }
}

pub fn max<T: PartialOrd>(v0: T, v1: T) -> T {
    if v0 > v1 {
        v0
    } else {
        v1
    }
}

pub fn clamp<T: PartialOrd>(v: T, low: T, high: T) -> T {
    max(low, min(v, high))
}

// This creates a coordinate system given only a single (unit) vector.
pub fn coord_system<T: Float>(v1: Vec3<T>) -> (Vec3<T>, Vec3<T>) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vec3 {
            x: -v1.z,
            y: T::zero(),
            z: v1.x,
        }
    } else {
        Vec3 {
            x: T::zero(),
            y: v1.z,
            z: -v1.y,
        }
    }
    .normalize();

    let v3 = v1.cross(v2);

    (v2, v3)
}

// Aligns a vector vec so that it faces the same direction as the refv vector
// by negating or not negating it.
pub fn align<T: Float>(refv: Vec3<T>, vec: Vec3<T>) -> Vec3<T> {
    if refv.dot(vec) < T::zero() {
        -vec
    } else {
        vec
    }
}

// Solves the quadratic equation robustly, returns the roots in ascending order:
pub fn quadratic<T: Float>(a: T, b: T, c: T) -> Option<(T, T)> {
    let four = T::two() * T::two();
    let disc = b * b - four * a * c;
    if disc < T::zero() {
        return None;
    }
    let root_disc = disc.sqrt();

    let q = if b < T::zero() {
        -T::half() * (b - root_disc)
    } else {
        -T::half() * (b + root_disc)
    };

    if q == T::zero() {
        // Both b and the discriminant vanish, so c does too:
        return Some((T::zero(), T::zero()));
    }

    let t0 = q / a;
    let t1 = c / q;

    Some((t0.min(t1), t0.max(t1)))
}
