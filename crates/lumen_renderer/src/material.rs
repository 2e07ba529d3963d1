//! Surface materials: BRDF evaluation, reflection sampling and emission.

use crate::gen_f32;
use lumen_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// Color type alias (RGB values typically 0-1, unbounded for radiance)
pub type Color = Vec3;

/// Emission magnitude above which a material counts as a light source.
pub const EMISSION_EPSILON: f32 = 1e-4;

/// Reflectance model of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surface {
    /// Lambertian diffuse.
    #[default]
    Diffuse,
    /// Lambertian diffuse plus a normalized Phong lobe around the mirror direction.
    Glossy,
}

/// A light sample used by local shading.
#[derive(Debug, Clone, Copy)]
pub struct LightRay {
    /// Unit direction from the shaded point towards the light
    pub direction: Vec3,
    /// Radiance arriving from the light
    pub color: Color,
}

/// Material description shared by every vertex that hits its object.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub surface: Surface,
    pub diffuse_color: Color,
    pub specular_color: Color,
    /// Phong exponent
    pub shininess: f32,
    /// Weight of the traced mirror reflection in the direct shaded cast
    pub reflectiveness: f32,
    /// Self-lit term added by local shading, does not make the object a light
    pub luminosity: Color,
    /// Emitted radiance
    pub emittance: Color,
    /// Scale applied to `emittance`
    pub power: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            surface: Surface::Diffuse,
            diffuse_color: Color::ZERO,
            specular_color: Color::ONE,
            shininess: 5.0,
            reflectiveness: 0.1,
            luminosity: Color::ZERO,
            emittance: Color::ZERO,
            power: 1.0,
        }
    }
}

impl Material {
    /// A purely diffuse, non-reflective material.
    pub fn diffuse(albedo: Color) -> Self {
        Self {
            diffuse_color: albedo,
            reflectiveness: 0.0,
            ..Default::default()
        }
    }

    /// A diffuse base with a Phong highlight.
    pub fn glossy(albedo: Color, specular: Color, shininess: f32) -> Self {
        Self {
            surface: Surface::Glossy,
            diffuse_color: albedo,
            specular_color: specular,
            shininess: shininess.max(0.0),
            ..Default::default()
        }
    }

    /// An emitter. Its surface reflects like a diffuse material tinted by
    /// the emitted color.
    pub fn light(emittance: Color, power: f32) -> Self {
        Self {
            diffuse_color: emittance.clamp(Color::ZERO, Color::ONE),
            reflectiveness: 0.0,
            emittance,
            power,
            ..Default::default()
        }
    }

    pub fn with_reflectiveness(mut self, reflectiveness: f32) -> Self {
        self.reflectiveness = reflectiveness;
        self
    }

    pub fn with_luminosity(mut self, luminosity: Color) -> Self {
        self.luminosity = luminosity;
        self
    }

    /// True if the emission magnitude exceeds [`EMISSION_EPSILON`].
    pub fn is_emissive(&self) -> bool {
        self.emittance.length() > EMISSION_EPSILON
    }

    /// Emitted radiance scaled by power.
    #[inline]
    pub fn emitted(&self) -> Color {
        self.emittance * self.power
    }

    /// Evaluate the BRDF for light arriving along `incoming` and leaving along `outgoing`.
    ///
    /// Both directions point along the direction of travel. A zero
    /// `outgoing` is allowed and only removes the glossy lobe.
    pub fn brdf(&self, incoming: Vec3, outgoing: Vec3, normal: Vec3) -> Color {
        let diffuse = self.diffuse_color / PI;
        match self.surface {
            Surface::Diffuse => diffuse,
            Surface::Glossy => {
                let mirror = reflect(incoming, normal);
                let alignment = mirror.dot(outgoing).max(0.0);
                let normalization = (self.shininess + 2.0) / (2.0 * PI);
                diffuse + self.specular_color * normalization * alignment.powf(self.shininess)
            }
        }
    }

    /// Sample a new direction of travel after a bounce.
    ///
    /// The hemisphere is taken on the side of `normal` facing against
    /// `incoming`, so either normal orientation gives a reflected direction.
    pub fn sample_reflection_direction(
        &self,
        normal: Vec3,
        incoming: Vec3,
        rng: &mut dyn RngCore,
    ) -> Vec3 {
        let facing = if normal.dot(incoming) > 0.0 { -normal } else { normal };

        match self.surface {
            Surface::Diffuse => to_world(facing, cosine_hemisphere(rng)),
            Surface::Glossy => {
                let mirror = reflect(incoming, facing).normalize_or_zero();
                if mirror == Vec3::ZERO {
                    return to_world(facing, cosine_hemisphere(rng));
                }
                let lobe = to_world(mirror, phong_lobe(self.shininess, rng));
                if lobe.dot(facing) > 0.0 {
                    lobe
                } else {
                    mirror
                }
            }
        }
    }

    /// Blend local shading with a traced reflection. The result is not clamped.
    pub fn combine_colors(&self, local: Color, reflected: Color) -> Color {
        local + self.reflectiveness * reflected
    }

    /// Direct illumination of a point by a single light (Lambert + Phong), clamped to [0, 1].
    pub fn calc_illumination(&self, normal: Vec3, light: &LightRay, view: Vec3) -> Color {
        let lambert = light.direction.dot(normal).max(0.0);
        let mut result = lambert * self.diffuse_color * light.color;

        let light_reflect = reflect(-light.direction, normal);
        let reflect_factor = light_reflect.dot(view);
        if reflect_factor > 0.0 {
            result += reflect_factor.powf(self.shininess) * self.specular_color;
        }

        result.clamp(Color::ZERO, Color::ONE)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Map a direction expressed around +Z into the frame around `axis`.
fn to_world(axis: Vec3, local: Vec3) -> Vec3 {
    let (tangent, bitangent) = axis.any_orthonormal_pair();
    (tangent * local.x + bitangent * local.y + axis * local.z).normalize_or_zero()
}

/// Cosine-weighted direction in the +Z hemisphere.
fn cosine_hemisphere(rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);
    let phi = 2.0 * PI * r1;
    let r = r2.sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - r2).max(0.0).sqrt())
}

/// Direction around +Z distributed as cos^n.
fn phong_lobe(shininess: f32, rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);
    let phi = 2.0 * PI * r1;
    let cos_theta = r2.powf(1.0 / (shininess + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}
