use crate::numbers::Float;
use crate::vector::Vec3;

use std::ops::{Add, Index, Mul};

/// A 3x3 matrix stored as rows. Used for the metric tensors of graded media.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat3<T: Float> {
    m: [Vec3<T>; 3],
}

impl<T: Float> Mat3<T> {
    pub fn from_rows(r0: Vec3<T>, r1: Vec3<T>, r2: Vec3<T>) -> Self {
        Mat3 { m: [r0, r1, r2] }
    }

    pub fn identity() -> Self {
        Mat3::diagonal(Vec3::new(T::one(), T::one(), T::one()))
    }

    pub fn diagonal(d: Vec3<T>) -> Self {
        let z = T::zero();
        Mat3 {
            m: [
                Vec3::new(d.x, z, z),
                Vec3::new(z, d.y, z),
                Vec3::new(z, z, d.z),
            ],
        }
    }

    pub fn row(&self, i: usize) -> Vec3<T> {
        self.m[i]
    }

    pub fn transpose(&self) -> Self {
        let r0 = Vec3::new(self.m[0].x, self.m[1].x, self.m[2].x);
        let r1 = Vec3::new(self.m[0].y, self.m[1].y, self.m[2].y);
        let r2 = Vec3::new(self.m[0].z, self.m[1].z, self.m[2].z);
        Mat3 { m: [r0, r1, r2] }
    }

    pub fn determinant(&self) -> T {
        // Expansion along the first row, the rows' cross product gives the cofactors:
        self.m[0].dot(self.m[1].cross(self.m[2]))
    }

    pub fn scale(&self, s: T) -> Self {
        Mat3 {
            m: [self.m[0].scale(s), self.m[1].scale(s), self.m[2].scale(s)],
        }
    }

    /// Performs a matrix multiplication with a vector.
    pub fn vec_mul(&self, v: Vec3<T>) -> Vec3<T> {
        Vec3::new(self.m[0].dot(v), self.m[1].dot(v), self.m[2].dot(v))
    }

    /// The quadratic form `vᵀ M v`.
    pub fn quadratic_form(&self, v: Vec3<T>) -> T {
        v.dot(self.vec_mul(v))
    }

    pub fn is_symmetric(&self, tolerance: T) -> bool {
        (self.m[0].y - self.m[1].x).abs() <= tolerance
            && (self.m[0].z - self.m[2].x).abs() <= tolerance
            && (self.m[1].z - self.m[2].y).abs() <= tolerance
    }
}

impl<T: Float> Add for Mat3<T> {
    type Output = Mat3<T>;

    fn add(self, o: Mat3<T>) -> Self {
        Mat3 {
            m: [self.m[0] + o.m[0], self.m[1] + o.m[1], self.m[2] + o.m[2]],
        }
    }
}

impl<T: Float> Mul for Mat3<T> {
    type Output = Mat3<T>;

    fn mul(self, o: Mat3<T>) -> Self {
        let ot = o.transpose();
        let row = |r: Vec3<T>| Vec3::new(r.dot(ot.m[0]), r.dot(ot.m[1]), r.dot(ot.m[2]));
        Mat3 {
            m: [row(self.m[0]), row(self.m[1]), row(self.m[2])],
        }
    }
}

impl<T: Float> Index<usize> for Mat3<T> {
    type Output = Vec3<T>;

    fn index(&self, i: usize) -> &Vec3<T> {
        &self.m[i]
    }
}
