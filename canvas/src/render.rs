//! Rendering adapters.
//!
//! The object model never touches a graphics API directly. Adapters read a
//! `Surface` and produce pixels:
//!
//! | Adapter | Target |
//! |---------|--------|
//! | [`raster::SkiaRasterizer`] | Offscreen RGBA bitmap at native resolution, used by export |
//! | `web::draw` (feature `web`) | Live view on an HTML canvas, camera and selection applied |

pub mod font;
pub mod raster;
#[cfg(feature = "web")]
pub mod web;

use image::RgbaImage;

use crate::assets::AssetStore;
use crate::doc::Surface;
use crate::export::ExportError;

/// Turns a surface into pixels at its native size, ignoring the camera.
pub trait Rasterizer {
    /// Paint the background and every object in z-order.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if the offscreen target cannot be created.
    fn rasterize(&self, surface: &Surface, assets: &AssetStore) -> Result<RgbaImage, ExportError>;
}
