//! Infinite plane primitive.

use crate::{Material, Object};
use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;

/// An infinite plane through `point` with a fixed normal.
///
/// Planes have no finite area to sample, so surface samples always return
/// the anchor point.
pub struct Plane {
    point: Vec3,
    normal: Vec3,
    material: Material,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3, material: Material) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
            material,
        }
    }
}

impl Object for Plane {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Vec3> {
        let denom = ray.direction().dot(self.normal);
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.point - ray.origin()).dot(self.normal) / denom;
        ray_t.surrounds(t).then(|| ray.at(t))
    }

    fn normal_at(&self, _point: Vec3) -> Vec3 {
        self.normal
    }

    fn random_surface_point(&self, _rng: &mut dyn RngCore) -> Vec3 {
        self.point
    }

    fn center(&self) -> Vec3 {
        self.point
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    fn emission_direction(&self, _point: Vec3) -> Vec3 {
        self.normal
    }
}
