//! Image output: ASCII PPM and PNG.

use crate::renderer::{sanitize_color, ImageBuffer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum ImageWriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Pixel buffer holds {actual} pixels, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

pub type ImageWriteResult<T> = Result<T, ImageWriteError>;

/// Writes a radiance buffer to disk.
///
/// Channels are scaled by the color gamut and truncated; NaN and negative
/// values are written as zero and anything above one saturates.
pub struct ImageWriter<'a> {
    image: &'a ImageBuffer,
    color_gamut: u32,
}

impl<'a> ImageWriter<'a> {
    pub fn new(image: &'a ImageBuffer) -> Self {
        Self {
            image,
            color_gamut: 255,
        }
    }

    /// Set the maximum channel value written to PPM files.
    pub fn with_color_gamut(mut self, color_gamut: u32) -> Self {
        self.color_gamut = color_gamut.max(1);
        self
    }

    /// Quantize one channel to `[0, gamut]`.
    fn quantize(channel: f32, gamut: u32) -> u32 {
        let scaled = channel * gamut as f32;
        if scaled.is_nan() || scaled <= 0.0 {
            0
        } else {
            (scaled as u32).min(gamut)
        }
    }

    fn check_size(&self) -> ImageWriteResult<()> {
        let expected = self.image.width as usize * self.image.height as usize;
        let actual = self.image.pixels.len();
        if expected != actual {
            return Err(ImageWriteError::SizeMismatch { expected, actual });
        }
        Ok(())
    }

    /// Write the image as ASCII PPM (`P3`), one image row per line.
    pub fn write_ppm<W: Write>(&self, writer: &mut W) -> ImageWriteResult<()> {
        self.check_size()?;

        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.image.width, self.image.height)?;
        writeln!(writer, "{}", self.color_gamut)?;

        for row in self.image.rows() {
            let line = row
                .iter()
                .map(|&color| {
                    let color = sanitize_color(color);
                    format!(
                        "{} {} {}",
                        Self::quantize(color.x, self.color_gamut),
                        Self::quantize(color.y, self.color_gamut),
                        Self::quantize(color.z, self.color_gamut)
                    )
                })
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "{}", line)?;
        }

        Ok(())
    }

    /// Save the image as a PPM file.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> ImageWriteResult<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut writer)?;
        writer.flush()?;

        log::info!("Wrote {}x{} PPM to {}", self.image.width, self.image.height, path.display());
        Ok(())
    }

    /// Save the image as an 8-bit PNG. The color gamut does not apply.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageWriteResult<()> {
        self.check_size()?;
        let path = path.as_ref();

        let buffer = image::RgbImage::from_fn(self.image.width, self.image.height, |x, y| {
            let color = sanitize_color(self.image.get(x, y));
            image::Rgb([
                Self::quantize(color.x, 255) as u8,
                Self::quantize(color.y, 255) as u8,
                Self::quantize(color.z, 255) as u8,
            ])
        });
        buffer.save(path)?;

        log::info!("Wrote {}x{} PNG to {}", self.image.width, self.image.height, path.display());
        Ok(())
    }

    /// Save as PNG when the extension is `png`, PPM otherwise.
    pub fn save(&self, path: impl AsRef<Path>) -> ImageWriteResult<()> {
        let path = path.as_ref();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png {
            self.save_png(path)
        } else {
            self.save_ppm(path)
        }
    }
}
