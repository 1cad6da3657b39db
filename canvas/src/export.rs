//! Encoded export of a surface.
//!
//! `export` refuses an empty surface, rasterizes through any [`Rasterizer`],
//! and encodes the bitmap with the `image` crate. JPEG has no alpha channel,
//! so the bitmap is flattened to RGB before encoding.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assets::AssetStore;
use crate::doc::{ObjectId, Surface};
use crate::render::Rasterizer;

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export: the surface is empty")]
    EmptySurface,
    #[error("cannot allocate a {width}x{height} raster")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("text object {id} cannot be drawn: no font could be loaded")]
    MissingFont { id: ObjectId },
    #[error("image encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Output encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    /// Quality is clamped to 1..=100.
    Jpeg { quality: u8 },
}

impl ExportFormat {
    #[must_use]
    pub fn jpeg() -> Self {
        Self::Jpeg { quality: DEFAULT_JPEG_QUALITY }
    }

    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
}

/// Encoded image ready for upload or disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// Rasterize `surface` at native size and encode it.
///
/// # Errors
///
/// [`ExportError::EmptySurface`] when the surface holds no objects, otherwise
/// whatever the rasterizer or the encoder reports.
pub fn export<R>(
    surface: &Surface,
    rasterizer: &R,
    assets: &AssetStore,
    options: ExportOptions,
) -> Result<ExportedImage, ExportError>
where
    R: Rasterizer + ?Sized,
{
    if surface.is_empty() {
        return Err(ExportError::EmptySurface);
    }

    let pixels = rasterizer.rasterize(surface, assets)?;
    let mut bytes = Vec::new();
    match options.format {
        ExportFormat::Png => {
            DynamicImage::ImageRgba8(pixels).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        }
        ExportFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(pixels).to_rgb8();
            DynamicImage::ImageRgb8(rgb)
                .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Jpeg(quality.clamp(1, 100)))?;
        }
    }

    debug!(objects = surface.len(), size = bytes.len(), mime = options.format.mime(), "exported surface");
    Ok(ExportedImage { bytes, mime: options.format.mime() })
}
