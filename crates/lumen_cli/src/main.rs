//! Lumen command line renderer.
//!
//! Usage: `lumen [config.json] [output.ppm|output.png]`
//!
//! Renders the built-in demo scene with the given configuration (defaults
//! when omitted) and writes the result to `output.ppm`.

use anyhow::{Context, Result};
use lumen_math::Vec3;
use lumen_renderer::{
    render, Camera, Color, ImageWriter, Material, Plane, RenderConfig, Scene, Sphere, Triangle,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

const DEFAULT_OUTPUT: &str = "output.ppm";

/// A closed box with two spheres, a glossy pyramid face and a spherical lamp.
fn build_scene() -> Scene {
    let mut scene = Scene::new();

    let white = Material::diffuse(Color::new(0.75, 0.75, 0.75));
    let red = Material::diffuse(Color::new(0.75, 0.2, 0.2));
    let green = Material::diffuse(Color::new(0.2, 0.75, 0.2));

    // Walls
    scene.add_object(Box::new(Plane::new(Vec3::new(0.0, -2.0, 0.0), Vec3::Y, white.clone())));
    scene.add_object(Box::new(Plane::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, white.clone())));
    scene.add_object(Box::new(Plane::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z, white)));
    scene.add_object(Box::new(Plane::new(Vec3::new(-2.0, 0.0, 0.0), Vec3::X, red)));
    scene.add_object(Box::new(Plane::new(Vec3::new(2.0, 0.0, 0.0), -Vec3::X, green)));

    // Contents
    scene.add_object(Box::new(Sphere::new(
        Vec3::new(-0.8, -1.3, -1.5),
        0.7,
        Material::glossy(Color::new(0.6, 0.6, 0.8), Color::ONE, 40.0).with_reflectiveness(0.4),
    )));
    scene.add_object(Box::new(Sphere::new(
        Vec3::new(0.9, -1.4, -0.6),
        0.6,
        Material::diffuse(Color::new(0.8, 0.7, 0.3)),
    )));
    scene.add_object(Box::new(Triangle::new(
        Vec3::new(0.2, -2.0, -2.6),
        Vec3::new(1.8, -2.0, -2.6),
        Vec3::new(1.0, -0.4, -2.2),
        Material::glossy(Color::new(0.3, 0.3, 0.3), Color::splat(0.8), 12.0),
    )));

    // Lamp
    scene.add_object(Box::new(Sphere::new(
        Vec3::new(0.0, 1.6, -1.2),
        0.3,
        Material::light(Color::new(1.0, 0.95, 0.85), 4.0),
    )));

    scene
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => RenderConfig::load(&path)
            .with_context(|| format!("Failed to load render config {}", path))?,
        None => RenderConfig::default(),
    };
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    log::info!("Starting Lumen");

    let scene = build_scene();
    log::info!("Scene built: {} objects, {} lights", scene.len(), scene.lights().len());

    let mut camera = Camera::new()
        .with_resolution(config.width, config.height)
        .with_position(Vec3::new(0.0, 0.0, 4.5), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_fov(50.0);
    camera.initialize();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let image = render(&camera, &scene, &config, &mut rng);

    ImageWriter::new(&image)
        .with_color_gamut(config.color_gamut)
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(())
}
