//! Object trait: the geometric and shading capabilities the scene consumes.

use crate::{reflect, Color, LightRay, Material, RenderConfig, Scene};
use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;

/// Trait for objects that can be placed in a [`Scene`].
///
/// Objects do not keep a pointer back to their scene. Capabilities that
/// need the rest of the world receive the scene as a parameter.
pub trait Object: Send + Sync {
    /// Intersect a ray with this object.
    ///
    /// Returns the hit position for the nearest intersection whose ray
    /// parameter lies strictly inside `ray_t`.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Vec3>;

    /// Geometric (outward) unit normal at a point on the surface.
    fn normal_at(&self, point: Vec3) -> Vec3;

    /// Uniformly sample a point on the surface.
    fn random_surface_point(&self, rng: &mut dyn RngCore) -> Vec3;

    /// Reference point light paths are emitted away from.
    fn center(&self) -> Vec3;

    fn material(&self) -> &Material;

    fn material_mut(&mut self) -> &mut Material;

    /// Initial direction of a light path leaving `point`.
    fn emission_direction(&self, point: Vec3) -> Vec3 {
        (point - self.center()).normalize_or_zero()
    }

    /// True if the object's current material emits light.
    fn is_light(&self) -> bool {
        self.material().is_emissive()
    }

    /// Direct illumination at `point` seen along `incoming`.
    ///
    /// Sums the material's self-lit and emitted terms with the Phong
    /// response to every scene light whose center is visible from the point.
    fn local_shade(&self, scene: &Scene, point: Vec3, incoming: Vec3) -> Color {
        let material = self.material();
        let normal = self.normal_at(point);
        let view = -incoming;

        let mut color = material.luminosity + material.emitted();
        for &light_id in scene.lights() {
            let Some(light) = scene.object(light_id) else {
                continue;
            };

            let shadow_ray = Ray::towards(point, light.center());
            let visible = scene
                .ray_cast(&shadow_ray)
                .is_some_and(|hit| hit.obj_id == light_id);
            if !visible {
                continue;
            }

            let light_ray = LightRay {
                direction: shadow_ray.direction,
                color: light.material().emitted(),
            };
            color += material.calc_illumination(normal, &light_ray, view);
        }
        color
    }

    /// Color seen in the mirror direction at `point`.
    ///
    /// `depth` is the remaining recursion budget; when it is exhausted or
    /// the reflected ray escapes, the configured background is returned.
    fn trace_reflection(
        &self,
        scene: &Scene,
        point: Vec3,
        incoming: Vec3,
        config: &RenderConfig,
        depth: u32,
    ) -> Color {
        if depth == 0 {
            return config.background;
        }

        let normal = self.normal_at(point);
        let direction = reflect(incoming, normal).normalize_or_zero();
        let reflected = Ray::new(point, direction);

        scene
            .shaded_cast(&reflected, config, depth - 1)
            .map_or(config.background, |hit| hit.color)
    }
}
