//! Sphere primitive.

use crate::{gen_f32, Material, Object};
use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Material,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }
}

impl Object for Sphere {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Vec3> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        Some(ray.at(root))
    }

    fn normal_at(&self, point: Vec3) -> Vec3 {
        ((point - self.center) / self.radius).normalize_or_zero()
    }

    fn random_surface_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        let z = 1.0 - 2.0 * gen_f32(rng);
        let r = (1.0 - z * z).max(0.0).sqrt();
        let phi = 2.0 * PI * gen_f32(rng);
        self.center + self.radius * Vec3::new(r * phi.cos(), r * phi.sin(), z)
    }

    fn center(&self) -> Vec3 {
        self.center
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }
}
