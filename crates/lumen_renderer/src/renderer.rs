//! Per-pixel render driver.
//!
//! Generates primary rays, averages the scene's estimates over the
//! configured number of samples and stores the result in an [`ImageBuffer`].

use crate::{Camera, Color, RenderConfig, Scene};
use rand::RngCore;
use std::time::Instant;

/// Replace NaN, infinite and negative channels with zero.
pub fn sanitize_color(color: Color) -> Color {
    let fix = |c: f32| if c.is_finite() && c > 0.0 { c } else { 0.0 };
    Color::new(fix(color.x), fix(color.y), fix(color.z))
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let ray = camera.get_ray(x, y, rng);
        let estimate = scene.path_cast(&ray, config, rng);
        let sanitized = sanitize_color(estimate);
        if sanitized != estimate {
            log::debug!("Replaced invalid estimate {:?} at ({}, {})", estimate, x, y);
        }
        pixel_color += sanitized;
    }

    pixel_color / samples as f32
}

/// Linear radiance image, row-major.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Iterate over rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        self.pixels.chunks(self.width.max(1) as usize)
    }
}

/// Render the entire scene to an image buffer.
///
/// Single-threaded; each pixel only reads the scene.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> ImageBuffer {
    log::info!(
        "Rendering {}x{} @ {} spp ({:?}, {} objects, {} lights)",
        camera.image_width,
        camera.image_height,
        config.samples_per_pixel,
        config.mode,
        scene.len(),
        scene.lights().len()
    );
    if scene.lights().is_empty() {
        log::warn!("Scene has no lights, estimates fall back to the background");
    }

    let start = Instant::now();
    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);

    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let color = render_pixel(camera, scene, x, y, config, rng);
            image.set(x, y, color);
        }
    }

    log::info!("Rendered in {:?}", start.elapsed());
    image
}
