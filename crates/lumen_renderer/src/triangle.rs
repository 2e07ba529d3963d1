//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{gen_f32, Material, Object};
use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;

/// A single-sided-normal triangle.
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    material: Material,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// The normal follows counter-clockwise winding.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Material) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self {
            v0,
            v1,
            v2,
            normal,
            material,
        }
    }
}

impl Object for Triangle {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Vec3> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(ray.at(t))
    }

    fn normal_at(&self, _point: Vec3) -> Vec3 {
        self.normal
    }

    fn random_surface_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        // Uniform barycentric sample
        let su = gen_f32(rng).sqrt();
        let b0 = 1.0 - su;
        let b1 = gen_f32(rng) * su;
        b0 * self.v0 + b1 * self.v1 + (1.0 - b0 - b1) * self.v2
    }

    fn center(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// Flat emitters shine along their face normal.
    fn emission_direction(&self, _point: Vec3) -> Vec3 {
        self.normal
    }
}
