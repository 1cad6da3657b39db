//! Decoded raster assets referenced by `Shape::Image` objects.
//!
//! Image objects only carry a `src` key; the pixels are decoded once when the
//! host hands over the encoded bytes and are kept here for the lifetime of the
//! session. Snapshots therefore stay small and undo never re-decodes.

#[cfg(test)]
#[path = "assets_test.rs"]
mod assets_test;

use std::collections::HashMap;
use std::io::Cursor;

use image::io::Reader;
use image::{ImageError, RgbaImage};

use crate::consts::MAX_IMAGE_EDGE;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("image decode failed: {0}")]
    Decode(#[from] ImageError),
    #[error("image too large: {width}x{height} exceeds {max} per edge")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// Decoded images keyed by source URL.
#[derive(Debug, Default)]
pub struct AssetStore {
    images: HashMap<String, RgbaImage>,
}

impl AssetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes` (PNG, JPEG, ...) and register them under `src`.
    ///
    /// Returns the decoded `(width, height)`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Decode`] for unreadable data and
    /// [`AssetError::TooLarge`] when either edge exceeds the limit. The size
    /// is read from the header, so oversized images are never decoded.
    pub fn insert_encoded(&mut self, src: &str, bytes: &[u8]) -> Result<(u32, u32), AssetError> {
        let (width, height) = reader(bytes)?.into_dimensions()?;
        if width > MAX_IMAGE_EDGE || height > MAX_IMAGE_EDGE {
            return Err(AssetError::TooLarge { width, height, max: MAX_IMAGE_EDGE });
        }
        let decoded = reader(bytes)?.decode()?.to_rgba8();
        let (width, height) = decoded.dimensions();
        self.images.insert(src.to_owned(), decoded);
        Ok((width, height))
    }

    /// Register already-decoded pixels under `src`.
    pub fn insert(&mut self, src: &str, image: RgbaImage) {
        self.images.insert(src.to_owned(), image);
    }

    #[must_use]
    pub fn get(&self, src: &str) -> Option<&RgbaImage> {
        self.images.get(src)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn reader(bytes: &[u8]) -> Result<Reader<Cursor<&[u8]>>, ImageError> {
    Ok(Reader::new(Cursor::new(bytes)).with_guessed_format()?)
}
