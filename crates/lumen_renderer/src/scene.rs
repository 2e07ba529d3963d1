//! Scene: object ownership, ray casting and the bidirectional estimator.
//!
//! The scene owns every object; an object's identifier is its index in
//! insertion order. Lights are a derived list of identifiers, computed
//! once when an object is added.

use crate::{Color, Normalization, Object, RayHit, RenderConfig, RenderMode};
use lumen_math::{Interval, Ray};
use rand::RngCore;

/// A collection of objects plus the estimators that trace through them.
#[derive(Default)]
pub struct Scene {
    objects: Vec<Box<dyn Object>>,
    lights: Vec<usize>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return its identifier.
    ///
    /// Identifiers are dense and follow insertion order. Light membership
    /// is decided here from the object's current material and is never
    /// revisited: changing a material's emission later through
    /// [`Scene::object_mut`] does not add or remove the object from
    /// [`Scene::lights`].
    pub fn add_object(&mut self, object: Box<dyn Object>) -> usize {
        let id = self.objects.len();
        let is_light = object.material().is_emissive();
        if is_light {
            self.lights.push(id);
        }
        self.objects.push(object);

        log::debug!("Added object {} (light: {})", id, is_light);
        id
    }

    pub fn object(&self, id: usize) -> Option<&dyn Object> {
        self.objects.get(id).map(|object| object.as_ref())
    }

    pub fn object_mut(&mut self, id: usize) -> Option<&mut (dyn Object + 'static)> {
        self.objects.get_mut(id).map(|object| object.as_mut())
    }

    /// Identifiers of the objects registered as lights.
    pub fn lights(&self) -> &[usize] {
        &self.lights
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Find the nearest intersection along a ray.
    ///
    /// A later object only replaces the current candidate when it is
    /// strictly closer, so the first registered object wins exact ties.
    /// A hit at exactly zero distance is reported as a miss.
    pub fn ray_cast(&self, ray: &Ray) -> Option<RayHit<'_>> {
        let mut candidate = None;
        let mut rolling_distance = 0.0_f32;

        for (id, object) in self.objects.iter().enumerate() {
            let Some(position) = object.intersect(ray, Interval::FORWARD) else {
                continue;
            };

            let distance = ray.origin.distance(position);
            if candidate.is_none() || distance < rolling_distance {
                rolling_distance = distance;
                candidate = Some(RayHit::new(position, id, object.material(), distance));
            }
        }

        if rolling_distance > 0.0 {
            candidate
        } else {
            None
        }
    }

    /// Cast a primary ray and shade its first hit.
    ///
    /// The returned vertex carries the final color in [`RayHit::color`].
    pub fn final_ray_cast(&self, ray: &Ray, config: &RenderConfig) -> Option<RayHit<'_>> {
        self.shaded_cast(ray, config, config.max_reflection_depth)
    }

    /// Shaded cast with an explicit reflection budget.
    pub(crate) fn shaded_cast(
        &self,
        ray: &Ray,
        config: &RenderConfig,
        depth: u32,
    ) -> Option<RayHit<'_>> {
        let mut hit = self.ray_cast(ray)?;
        let object = &self.objects[hit.obj_id];

        let local = object.local_shade(self, hit.position, ray.direction);
        let reflected = if hit.material.reflectiveness > 0.0 {
            object.trace_reflection(self, hit.position, ray.direction, config, depth)
        } else {
            Color::ZERO
        };

        hit.color = hit.material.combine_colors(local, reflected);
        Some(hit)
    }

    /// Estimate the radiance seen along a primary ray using the configured mode.
    pub fn path_cast(&self, ray: &Ray, config: &RenderConfig, rng: &mut dyn RngCore) -> Color {
        match config.mode {
            RenderMode::Bidirectional => self.bidirectional_path_cast(ray, config, rng),
            RenderMode::Direct => self
                .final_ray_cast(ray, config)
                .map_or(config.background, |hit| hit.color),
        }
    }

    /// Trace a path from the camera.
    ///
    /// The path stops early when a ray leaves the scene. Each vertex's
    /// `geo_term` is the product of its own cosine-weighted BRDF (or its
    /// emitted radiance, for lights) with the previous vertex's `geo_term`.
    pub fn camera_path<'a>(
        &'a self,
        primary: &Ray,
        bounces: u32,
        rng: &mut dyn RngCore,
    ) -> Vec<RayHit<'a>> {
        let mut path: Vec<RayHit<'a>> = Vec::new();
        let mut ray = *primary;

        for _ in 0..bounces {
            let Some(mut hit) = self.ray_cast(&ray) else {
                break;
            };
            let object = &self.objects[hit.obj_id];

            hit.in_direction = ray.direction;
            // Camera paths work with the flipped normal
            let normal = -object.normal_at(hit.position);
            let outgoing = hit
                .material
                .sample_reflection_direction(normal, ray.direction, rng);

            let cos_theta = normal.dot(outgoing).abs();
            hit.brdf = hit.material.brdf(hit.in_direction, outgoing, normal);
            hit.geo_term = if object.is_light() {
                hit.material.emitted()
            } else {
                cos_theta * hit.brdf
            };

            if let Some(previous) = path.last() {
                hit.geo_term *= previous.geo_term;
            }

            ray = Ray::new(hit.position, outgoing);
            path.push(hit);
        }

        path
    }

    /// Start a light path on the surface of light `light_id`.
    ///
    /// Returns the path with its emitting vertex appended. Returns an empty
    /// path if `light_id` is not an object of this scene.
    pub fn light_path<'a>(
        &'a self,
        light_id: usize,
        bounces: u32,
        rng: &mut dyn RngCore,
    ) -> Vec<RayHit<'a>> {
        let Some(light) = self.objects.get(light_id) else {
            return Vec::new();
        };
        let material = light.material();

        let position = light.random_surface_point(rng);
        let mut origin = RayHit::new(position, light_id, material, 0.0);
        origin.incoming_radiance = material.emittance;
        origin.irradiance = material.emittance;

        let mut path = vec![origin];

        let ray = Ray::new(position, light.emission_direction(position));
        self.extend_light_path(&ray, &mut path, bounces, rng);
        path
    }

    /// Continue a light path from `ray`.
    ///
    /// `path` must already hold the vertex `ray` leaves from. Each new
    /// vertex receives the radiance transported from the previous one and
    /// is appended before its own outgoing direction is sampled.
    pub fn extend_light_path<'a>(
        &'a self,
        ray: &Ray,
        path: &mut Vec<RayHit<'a>>,
        bounces: u32,
        rng: &mut dyn RngCore,
    ) {
        let mut ray = *ray;

        for _ in 0..bounces {
            let Some(previous) = path.last().copied() else {
                log::debug!("Light path has no emitting vertex, nothing to extend");
                return;
            };
            let Some(mut hit) = self.ray_cast(&ray) else {
                break;
            };
            let object = &self.objects[hit.obj_id];

            hit.in_direction = ray.direction;
            let geometric_normal = object.normal_at(hit.position);
            let normal = -geometric_normal;
            let cos_theta = ray.direction.dot(normal).max(0.0);

            let transported = previous
                .material
                .brdf(previous.in_direction, ray.direction, normal)
                * previous.incoming_radiance
                + previous.material.emitted();
            hit.incoming_radiance = cos_theta * transported;

            path.push(hit);

            let outgoing = hit
                .material
                .sample_reflection_direction(geometric_normal, ray.direction, rng);
            ray = Ray::new(hit.position, outgoing);
        }
    }

    /// Check that `target` is the first thing a shadow ray meets.
    pub fn shadow_ray_reaches(&self, shadow_ray: &Ray, target: &RayHit<'_>) -> bool {
        self.ray_cast(shadow_ray)
            .is_some_and(|hit| hit.obj_id == target.obj_id)
    }

    /// Bidirectional estimate of the radiance along a primary ray.
    ///
    /// Every camera vertex is connected to every vertex of every light
    /// path. The sum of contributions is divided channel-wise by the sum of
    /// the camera vertices' BRDF values; channels whose sum is zero give 0.
    /// Without lights, or when the primary ray misses, the background is
    /// returned.
    pub fn bidirectional_path_cast(
        &self,
        ray: &Ray,
        config: &RenderConfig,
        rng: &mut dyn RngCore,
    ) -> Color {
        if self.lights.is_empty() {
            return config.background;
        }

        let mut light_paths = Vec::with_capacity(self.lights.len());
        for &light_id in &self.lights {
            for _ in 0..config.light_paths_per_light {
                light_paths.push(self.light_path(light_id, config.light_bounces, rng));
            }
        }

        let camera_path = self.camera_path(ray, config.camera_bounces, rng);
        if camera_path.is_empty() {
            return config.background;
        }

        self.connect_paths(&camera_path, &light_paths, config.normalization)
    }

    /// Connect a camera path to a set of light paths and normalize the sum.
    pub fn connect_paths(
        &self,
        camera_path: &[RayHit<'_>],
        light_paths: &[Vec<RayHit<'_>>],
        normalization: Normalization,
    ) -> Color {
        let mut radiance = Color::ZERO;
        let mut factors = Color::ZERO;
        let mut shadow_ray = Ray::default();

        for camera_hit in camera_path {
            let normal = self.objects[camera_hit.obj_id].normal_at(camera_hit.position);

            for light_hit in light_paths.iter().flatten() {
                let next_shadow_ray = Ray::towards(camera_hit.position, light_hit.position);

                let factor_direction = match normalization {
                    Normalization::Legacy => shadow_ray.direction,
                    Normalization::CurrentDirection => next_shadow_ray.direction,
                };
                factors += camera_hit
                    .material
                    .brdf(camera_hit.in_direction, factor_direction, normal);

                shadow_ray = next_shadow_ray;
                if self.shadow_ray_reaches(&shadow_ray, light_hit) {
                    let cos_theta = shadow_ray.direction.dot(normal).max(0.0);
                    radiance += light_hit
                        .material
                        .brdf(light_hit.in_direction, shadow_ray.direction, normal)
                        * camera_hit.geo_term
                        * cos_theta
                        * light_hit.incoming_radiance;
                }
            }
        }

        divide_channels(radiance, factors)
    }
}

/// Channel-wise division where a zero divisor yields zero.
fn divide_channels(numerator: Color, denominator: Color) -> Color {
    let div = |n: f32, d: f32| if d == 0.0 { 0.0 } else { n / d };
    Color::new(
        div(numerator.x, denominator.x),
        div(numerator.y, denominator.y),
        div(numerator.z, denominator.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, Plane, Sphere};
    use lumen_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const LIGHT_CENTER: Vec3 = Vec3::new(0.0, 4.0, 3.0);

    fn camera_ray() -> Ray {
        Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z)
    }

    /// A diffuse unit sphere at the origin lit by a small sphere light
    /// above and in front of it.
    fn lit_sphere_scene() -> (Scene, usize, usize) {
        let mut scene = Scene::new();
        let sphere = scene.add_object(Box::new(Sphere::new(
            Vec3::ZERO,
            1.0,
            Material::diffuse(Color::splat(0.8)),
        )));
        let light = scene.add_object(Box::new(Sphere::new(
            LIGHT_CENTER,
            0.5,
            Material::light(Color::ONE, 1.0),
        )));
        (scene, sphere, light)
    }

    fn add_blocker(scene: &mut Scene) -> usize {
        // Sits on the axis between the sphere's front point and the light
        scene.add_object(Box::new(Sphere::new(
            Vec3::new(0.0, 2.0, 2.0),
            0.8,
            Material::diffuse(Color::splat(0.5)),
        )))
    }

    fn direct_connection_config() -> RenderConfig {
        RenderConfig {
            camera_bounces: 1,
            light_bounces: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_ids_are_dense_and_ordered() {
        let mut scene = Scene::new();
        let ids: Vec<usize> = (0..5)
            .map(|i| {
                scene.add_object(Box::new(Sphere::new(
                    Vec3::new(i as f32 * 3.0, 0.0, 0.0),
                    1.0,
                    Material::diffuse(Color::ONE),
                )))
            })
            .collect();

        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(scene.len(), 5);
        assert!(scene.object(4).is_some());
        assert!(scene.object(5).is_none());
    }

    #[test]
    fn test_light_list_membership() {
        let (scene, sphere, light) = lit_sphere_scene();
        assert_eq!(scene.lights(), &[light]);
        assert!(!scene.lights().contains(&sphere));
    }

    #[test]
    fn test_light_list_ignores_later_material_changes() {
        let (mut scene, sphere, light) = lit_sphere_scene();

        scene.object_mut(sphere).unwrap().material_mut().emittance = Color::ONE;
        scene.object_mut(light).unwrap().material_mut().emittance = Color::ZERO;

        assert_eq!(scene.lights(), &[light]);
        assert!(scene.object(sphere).unwrap().is_light());
        assert!(!scene.object(light).unwrap().is_light());
    }

    #[test]
    fn test_miss_gives_no_hit_and_empty_paths() {
        let (scene, _, light) = lit_sphere_scene();
        let mut rng = StdRng::seed_from_u64(1);
        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);

        assert!(scene.ray_cast(&away).is_none());
        assert!(scene.camera_path(&away, 4, &mut rng).is_empty());

        let mut path = scene.light_path(light, 0, &mut rng);
        assert_eq!(path.len(), 1);
        scene.extend_light_path(&away, &mut path, 4, &mut rng);
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::new();
        let mut rng = StdRng::seed_from_u64(1);
        let config = RenderConfig::default();

        assert!(scene.is_empty());
        assert!(scene.ray_cast(&camera_ray()).is_none());
        assert_eq!(
            scene.bidirectional_path_cast(&camera_ray(), &config, &mut rng),
            config.background
        );
    }

    #[test]
    fn test_nearest_hit_independent_of_insertion_order() {
        let mut scene = Scene::new();
        scene.add_object(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -10.0),
            1.0,
            Material::diffuse(Color::ONE),
        )));
        let near = scene.add_object(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Material::diffuse(Color::ONE),
        )));

        let hit = scene.ray_cast(&Ray::new(Vec3::ZERO, -Vec3::Z)).unwrap();
        assert_eq!(hit.obj_id, near);
        assert!((hit.distance - 2.0).abs() < 1e-4);
        assert!((hit.position - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-4);
    }

    #[test]
    fn test_equidistant_tie_goes_to_first_registered() {
        let mut scene = Scene::new();
        let first = scene.add_object(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Material::diffuse(Color::new(1.0, 0.0, 0.0)),
        )));
        scene.add_object(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Material::diffuse(Color::new(0.0, 1.0, 0.0)),
        )));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        for _ in 0..10 {
            let hit = scene.ray_cast(&ray).unwrap();
            assert_eq!(hit.obj_id, first);
            assert_eq!(hit.material.diffuse_color, Color::new(1.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_zero_bounces_returns_background() {
        let (scene, _, _) = lit_sphere_scene();
        let mut rng = StdRng::seed_from_u64(5);
        let config = RenderConfig {
            camera_bounces: 0,
            background: Color::new(0.1, 0.2, 0.3),
            ..Default::default()
        };

        assert!(scene.camera_path(&camera_ray(), 0, &mut rng).is_empty());
        let color = scene.bidirectional_path_cast(&camera_ray(), &config, &mut rng);
        assert_eq!(color, config.background);
    }

    #[test]
    fn test_no_lights_returns_background() {
        let mut scene = Scene::new();
        scene.add_object(Box::new(Sphere::new(
            Vec3::ZERO,
            1.0,
            Material::diffuse(Color::ONE),
        )));
        let mut rng = StdRng::seed_from_u64(5);
        let config = RenderConfig::default();

        let color = scene.bidirectional_path_cast(&camera_ray(), &config, &mut rng);
        assert_eq!(color, Color::ZERO);
        assert!(color.is_finite());
    }

    #[test]
    fn test_camera_path_geo_term_accumulates() {
        let mut scene = Scene::new();
        let floor = scene.add_object(Box::new(Plane::new(
            Vec3::ZERO,
            Vec3::Y,
            Material::diffuse(Color::splat(0.5)),
        )));
        // Encloses the camera, so every bounce off the floor reaches it
        let dome = scene.add_object(Box::new(Sphere::new(
            Vec3::ZERO,
            100.0,
            Material::light(Color::new(1.0, 0.5, 0.25), 2.0),
        )));
        let mut rng = StdRng::seed_from_u64(9);

        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y);
        let path = scene.camera_path(&ray, 2, &mut rng);
        assert_eq!(path.len(), 2);

        let first = &path[0];
        assert_eq!(first.obj_id, floor);
        assert_eq!(first.in_direction, -Vec3::Y);
        assert!((first.brdf.x - 0.5 / std::f32::consts::PI).abs() < 1e-6);
        assert!(first.geo_term.x > 0.0);
        assert!(first.geo_term.x <= first.brdf.x + 1e-6);

        let second = &path[1];
        assert_eq!(second.obj_id, dome);
        let expected = Color::new(2.0, 1.0, 0.5) * first.geo_term;
        assert!((second.geo_term - expected).length() < 1e-5);
    }

    #[test]
    fn test_light_path_transports_emission() {
        let mut scene = Scene::new();
        scene.add_object(Box::new(Plane::new(
            Vec3::ZERO,
            Vec3::Y,
            Material::diffuse(Color::splat(0.5)),
        )));
        let light = scene.add_object(Box::new(Sphere::new(
            Vec3::new(0.0, 5.0, 0.0),
            1.0,
            Material::light(Color::ONE, 3.0),
        )));
        let mut rng = StdRng::seed_from_u64(2);

        let mut path = scene.light_path(light, 0, &mut rng);
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].obj_id, light);
        assert_eq!(path[0].incoming_radiance, Color::ONE);

        // Straight down onto the floor: cosine of one
        let down = Ray::new(Vec3::new(0.0, 3.0, 0.0), -Vec3::Y);
        scene.extend_light_path(&down, &mut path, 1, &mut rng);
        assert_eq!(path.len(), 2);

        let expected = 1.0 / std::f32::consts::PI + 3.0;
        let radiance = path[1].incoming_radiance;
        assert!((radiance.x - expected).abs() < 1e-5, "{radiance:?}");
        assert_eq!(path[1].in_direction, -Vec3::Y);
    }

    #[test]
    fn test_light_path_grazing_side_gets_no_radiance() {
        let mut scene = Scene::new();
        scene.add_object(Box::new(Plane::new(
            Vec3::ZERO,
            Vec3::Y,
            Material::diffuse(Color::splat(0.5)),
        )));
        let light = scene.add_object(Box::new(Sphere::new(
            Vec3::new(0.0, -5.0, 0.0),
            1.0,
            Material::light(Color::ONE, 1.0),
        )));
        let mut rng = StdRng::seed_from_u64(2);

        // Hitting the plane from below: the flipped normal faces away from travel
        let mut path = scene.light_path(light, 0, &mut rng);
        let up = Ray::new(Vec3::new(0.0, -3.0, 0.0), Vec3::Y);
        scene.extend_light_path(&up, &mut path, 1, &mut rng);

        assert_eq!(path.len(), 2);
        assert_eq!(path[1].incoming_radiance, Color::ZERO);
    }

    #[test]
    fn test_visible_light_gives_positive_estimate() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (scene, _, _) = lit_sphere_scene();
        let config = direct_connection_config();

        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let color = scene.bidirectional_path_cast(&camera_ray(), &config, &mut rng);
            assert!(color.x > 0.0 && color.y > 0.0 && color.z > 0.0, "{color:?}");
        }
    }

    #[test]
    fn test_occluder_blocks_light_vertex() {
        let (mut scene, sphere, light) = lit_sphere_scene();
        let blocker = add_blocker(&mut scene);
        let config = direct_connection_config();
        let mut rng = StdRng::seed_from_u64(4);

        let camera_path = scene.camera_path(&camera_ray(), 1, &mut rng);
        assert_eq!(camera_path[0].obj_id, sphere);
        let light_path = scene.light_path(light, 0, &mut rng);

        let shadow_ray = Ray::towards(camera_path[0].position, light_path[0].position);
        assert!(!scene.shadow_ray_reaches(&shadow_ray, &light_path[0]));
        assert_eq!(scene.ray_cast(&shadow_ray).unwrap().obj_id, blocker);

        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let color = scene.bidirectional_path_cast(&camera_ray(), &config, &mut rng);
            assert_eq!(color, Color::ZERO);
        }
    }

    #[test]
    fn test_estimate_is_non_negative_with_bounces() {
        let (mut scene, _, _) = lit_sphere_scene();
        add_blocker(&mut scene);
        scene.add_object(Box::new(Plane::new(
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::Y,
            Material::diffuse(Color::splat(0.6)),
        )));
        let config = RenderConfig {
            camera_bounces: 3,
            light_bounces: 3,
            light_paths_per_light: 2,
            ..Default::default()
        };

        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let color = scene.bidirectional_path_cast(&camera_ray(), &config, &mut rng);
            assert!(color.is_finite());
            assert!(color.min_element() >= 0.0, "{color:?}");
        }
    }

    #[test]
    fn test_normalization_modes_agree_for_diffuse_scene() {
        let (scene, _, _) = lit_sphere_scene();
        let legacy = RenderConfig {
            normalization: Normalization::Legacy,
            ..Default::default()
        };
        let current = RenderConfig {
            normalization: Normalization::CurrentDirection,
            ..legacy.clone()
        };

        let a = scene.bidirectional_path_cast(&camera_ray(), &legacy, &mut StdRng::seed_from_u64(12));
        let b = scene.bidirectional_path_cast(&camera_ray(), &current, &mut StdRng::seed_from_u64(12));
        assert!((a - b).length() < 1e-6);
    }

    #[test]
    fn test_huge_bounce_count_stops_at_first_miss() {
        let (scene, _, light) = lit_sphere_scene();
        let mut rng = StdRng::seed_from_u64(3);
        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);

        assert!(scene.camera_path(&away, u32::MAX, &mut rng).is_empty());

        let mut path = scene.light_path(light, 0, &mut rng);
        scene.extend_light_path(&away, &mut path, u32::MAX, &mut rng);
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_legacy_normalization_uses_previous_shadow_direction() {
        let mut scene = Scene::new();
        let glossy = scene.add_object(Box::new(Sphere::new(
            Vec3::ZERO,
            1.0,
            Material::glossy(Color::splat(0.2), Color::ONE, 2.0),
        )));
        let light = scene.add_object(Box::new(Sphere::new(
            LIGHT_CENTER,
            0.5,
            Material::light(Color::ONE, 1.0),
        )));

        // Front of the glossy sphere, seen head-on from the camera
        let camera_point = Vec3::Z;
        let camera_material = scene.object(glossy).unwrap().material();
        let mut camera_hit = RayHit::new(camera_point, glossy, camera_material, 4.0);
        camera_hit.in_direction = -Vec3::Z;
        camera_hit.geo_term = Color::ONE;

        // Two points on the light, both in plain view of the camera point
        let light_material = scene.object(light).unwrap().material();
        let towards_light = (LIGHT_CENTER - camera_point).normalize();
        let light_points = [
            LIGHT_CENTER - 0.5 * towards_light,
            LIGHT_CENTER - Vec3::new(0.0, 0.5, 0.0),
        ];
        let light_path: Vec<RayHit<'_>> = light_points
            .iter()
            .map(|&point| {
                let mut hit = RayHit::new(point, light, light_material, 0.0);
                hit.incoming_radiance = Color::ONE;
                hit
            })
            .collect();
        let light_paths = vec![light_path];

        let normal = Vec3::Z;
        let dirs: Vec<Vec3> = light_points
            .iter()
            .map(|&point| (point - camera_point).normalize())
            .collect();
        for (dir, hit) in dirs.iter().zip(&light_paths[0]) {
            let shadow_ray = Ray::towards(camera_point, hit.position);
            assert!(scene.shadow_ray_reaches(&shadow_ray, hit), "{dir:?}");
        }

        let radiance: Color = dirs
            .iter()
            .map(|&dir| light_material.brdf(Vec3::ZERO, dir, normal) * dir.dot(normal).max(0.0))
            .sum();
        let brdf = |dir: Vec3| camera_material.brdf(-Vec3::Z, dir, normal);
        let legacy_factors = brdf(Vec3::ZERO) + brdf(dirs[0]);
        let current_factors = brdf(dirs[0]) + brdf(dirs[1]);

        let legacy = scene.connect_paths(&[camera_hit], &light_paths, Normalization::Legacy);
        let current =
            scene.connect_paths(&[camera_hit], &light_paths, Normalization::CurrentDirection);

        let expected_legacy = radiance / legacy_factors;
        let expected_current = radiance / current_factors;
        assert!((legacy - expected_legacy).length() < 1e-4, "{legacy:?} vs {expected_legacy:?}");
        assert!((current - expected_current).length() < 1e-4, "{current:?} vs {expected_current:?}");
        assert!((legacy - current).length() > 0.1, "{legacy:?} vs {current:?}");
    }

    #[test]
    fn test_final_ray_cast_shades_hit() {
        let (scene, sphere, _) = lit_sphere_scene();
        let config = RenderConfig::default();

        let hit = scene.final_ray_cast(&camera_ray(), &config).unwrap();
        assert_eq!(hit.obj_id, sphere);
        assert!(hit.color.x > 0.0);

        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(scene.final_ray_cast(&away, &config).is_none());
    }

    #[test]
    fn test_final_ray_cast_adds_reflection() {
        let mut scene = Scene::new();
        scene.add_object(Box::new(Sphere::new(
            Vec3::ZERO,
            1.0,
            Material {
                reflectiveness: 0.5,
                ..Default::default()
            },
        )));
        let config = RenderConfig {
            background: Color::new(0.2, 0.4, 0.8),
            ..Default::default()
        };

        // Head-on reflection escapes back towards the camera
        let hit = scene.final_ray_cast(&camera_ray(), &config).unwrap();
        assert!((hit.color - 0.5 * config.background).length() < 1e-6);
    }

    #[test]
    fn test_path_cast_direct_mode_miss() {
        let (scene, _, _) = lit_sphere_scene();
        let config = RenderConfig {
            mode: RenderMode::Direct,
            background: Color::new(0.3, 0.3, 0.3),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);

        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert_eq!(scene.path_cast(&away, &config, &mut rng), config.background);
    }

    #[test]
    fn test_divide_channels_guards_zero() {
        let result = divide_channels(Color::new(1.0, 0.0, 4.0), Color::new(2.0, 0.0, 0.0));
        assert_eq!(result, Color::new(0.5, 0.0, 0.0));
    }
}
