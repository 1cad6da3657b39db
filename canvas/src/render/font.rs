//! TrueType glyph outlines for rasterized text.
//!
//! FONT RESOLUTION
//! ===============
//! A host may configure a font file. Without one, the rasterizer takes the
//! first readable sans face from the platform font directories, and failing
//! that the DejaVu Sans face compiled into the crate. Text only goes
//! unrendered when every source fails, and export reports it.

#[cfg(test)]
#[path = "font_test.rs"]
mod font_test;

use tiny_skia::{Path, PathBuilder};
use tracing::{debug, warn};
use ttf_parser::{Face, FaceParsingError, OutlineBuilder};

use crate::consts::{TEXT_AVG_ADVANCE, TEXT_LINE_HEIGHT};

/// DejaVu Sans (Bitstream Vera license, see `fonts/LICENSE-DejaVu.txt`).
const BUNDLED_FONT: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");

#[cfg(target_os = "linux")]
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
];

#[cfg(target_os = "macos")]
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Supplemental/DejaVuSans.ttf",
];

#[cfg(target_os = "windows")]
const SYSTEM_FONT_PATHS: &[&str] = &[
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\tahoma.ttf",
    "C:\\Windows\\Fonts\\DejaVuSans.ttf",
];

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const SYSTEM_FONT_PATHS: &[&str] = &[];

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("font parse failed: {0}")]
    Parse(#[from] FaceParsingError),
}

/// An owned font file, validated on load and re-parsed per draw.
#[derive(Debug, Clone)]
pub struct Font {
    data: Vec<u8>,
}

impl Font {
    /// Load a TrueType/OpenType font from raw file bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::Parse`] if the bytes are not a usable font face.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontError> {
        Face::parse(&data, 0)?;
        Ok(Self { data })
    }

    /// The face compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::Parse`] if the embedded bytes do not parse.
    pub fn bundled() -> Result<Self, FontError> {
        Self::from_bytes(BUNDLED_FONT.to_vec())
    }

    /// First parseable face among the platform's common sans fonts.
    #[must_use]
    pub fn system() -> Option<Self> {
        SYSTEM_FONT_PATHS.iter().find_map(|path| {
            let Ok(data) = std::fs::read(path) else {
                return None;
            };
            match Self::from_bytes(data) {
                Ok(font) => {
                    debug!(%path, "using system font");
                    Some(font)
                }
                Err(e) => {
                    debug!(%path, error = %e, "system font unusable");
                    None
                }
            }
        })
    }

    /// Font to draw text with when the host configured none: a system sans
    /// face, then the bundled one.
    #[must_use]
    pub fn fallback() -> Option<Self> {
        if let Some(font) = Self::system() {
            return Some(font);
        }
        match Self::bundled() {
            Ok(font) => Some(font),
            Err(e) => {
                warn!(error = %e, "bundled font unusable; text cannot be rasterized");
                None
            }
        }
    }

    /// Build a fill path for `content` with its top-left corner at `(x, y)`.
    ///
    /// Lines are split on `\n`. Characters missing from the font advance the
    /// pen by an average width so the remaining text keeps its position.
    /// Returns `None` when nothing has an outline (e.g. only spaces).
    #[must_use]
    pub fn text_path(&self, content: &str, x: f32, y: f32, font_size: f32) -> Option<Path> {
        let face = match Face::parse(&self.data, 0) {
            Ok(face) => face,
            Err(_) => return None,
        };
        let scale = font_size / f32::from(face.units_per_em().max(1));
        let ascent = f32::from(face.ascender()) * scale;
        let line_height = font_size * as_f32(TEXT_LINE_HEIGHT);
        let fallback_advance = font_size * as_f32(TEXT_AVG_ADVANCE);

        let mut builder = PathBuilder::new();
        let mut baseline = y + ascent;
        for line in content.split('\n') {
            let mut pen_x = x;
            for ch in line.chars() {
                let Some(glyph) = face.glyph_index(ch) else {
                    pen_x += fallback_advance;
                    continue;
                };
                let mut sink = GlyphSink { builder: &mut builder, scale, origin_x: pen_x, baseline };
                face.outline_glyph(glyph, &mut sink);
                pen_x += f32::from(face.glyph_hor_advance(glyph).unwrap_or(0)) * scale;
            }
            baseline += line_height;
        }
        builder.finish()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_f32(v: f64) -> f32 {
    v as f32
}

/// Maps font units (y up) into surface space (y down) at the pen position.
struct GlyphSink<'a> {
    builder: &'a mut PathBuilder,
    scale: f32,
    origin_x: f32,
    baseline: f32,
}

impl GlyphSink<'_> {
    fn tx(&self, x: f32) -> f32 {
        self.origin_x + x * self.scale
    }

    fn ty(&self, y: f32) -> f32 {
        self.baseline - y * self.scale
    }
}

impl OutlineBuilder for GlyphSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.tx(x), self.ty(y));
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.tx(x), self.ty(y));
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1, x, y) = (self.tx(x1), self.ty(y1), self.tx(x), self.ty(y));
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1, x2, y2, x, y) = (self.tx(x1), self.ty(y1), self.tx(x2), self.ty(y2), self.tx(x), self.ty(y));
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
