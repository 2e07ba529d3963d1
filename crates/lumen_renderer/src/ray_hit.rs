//! Path vertex record.

use crate::{Color, Material};
use lumen_math::Vec3;

/// One vertex of a camera or light path.
///
/// The cumulative fields (`geo_term`, `incoming_radiance`) only make sense
/// relative to the previous vertex of the path that produced this record.
/// Mixing vertices from different paths gives meaningless values.
#[derive(Debug, Clone, Copy)]
pub struct RayHit<'a> {
    /// Point of intersection
    pub position: Vec3,
    /// Index of the hit object in the scene
    pub obj_id: usize,
    /// Material of the hit object
    pub material: &'a Material,
    /// Distance from the casting ray's origin
    pub distance: f32,
    /// Direction of the ray that arrived at this vertex
    pub in_direction: Vec3,
    /// Product of cosine and BRDF factors along the path up to this vertex
    pub geo_term: Color,
    /// BRDF for the sampled direction pair at this vertex
    pub brdf: Color,
    /// Radiance arriving at this vertex along a light path
    pub incoming_radiance: Color,
    /// Emitted radiance, set only on the emitting vertex of a light path.
    /// Nothing reads it back.
    pub irradiance: Color,
    /// Final shaded color, only filled by the top-level shaded cast
    pub color: Color,
}

impl<'a> RayHit<'a> {
    /// Create a vertex with all radiometric fields zeroed.
    pub fn new(position: Vec3, obj_id: usize, material: &'a Material, distance: f32) -> Self {
        Self {
            position,
            obj_id,
            material,
            distance,
            in_direction: Vec3::ZERO,
            geo_term: Color::ZERO,
            brdf: Color::ZERO,
            incoming_radiance: Color::ZERO,
            irradiance: Color::ZERO,
            color: Color::ZERO,
        }
    }
}
