//! Lumen renderer - bidirectional CPU path tracing
//!
//! Builds a camera path and one light path per light for every primary
//! ray, connects their vertices with shadow rays and normalizes the sum.
//! A direct mode (local Phong shading plus mirror reflections) is kept
//! alongside for comparison.

mod camera;
mod config;
mod image_writer;
mod material;
mod object;
mod plane;
mod ray_hit;
mod renderer;
mod scene;
mod sphere;
mod triangle;

pub use camera::Camera;
pub use config::{ConfigError, ConfigResult, Normalization, RenderConfig, RenderMode};
pub use image_writer::{ImageWriteError, ImageWriteResult, ImageWriter};
pub use material::{reflect, Color, LightRay, Material, Surface, EMISSION_EPSILON};
pub use object::Object;
pub use plane::Plane;
pub use ray_hit::RayHit;
pub use renderer::{render, render_pixel, sanitize_color, ImageBuffer};
pub use scene::Scene;
pub use sphere::Sphere;
pub use triangle::Triangle;

/// Re-export Vec3 and ray types from lumen_math
pub use lumen_math::{Interval, Ray, Vec3};

use rand::{Rng, RngCore};

/// Uniform sample in [0, 1).
#[inline]
pub(crate) fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}
