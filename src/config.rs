//! Host configuration parsed from environment variables.

use std::path::PathBuf;

use canvas::color::Color;
use canvas::export::{DEFAULT_JPEG_QUALITY, ExportFormat, ExportOptions};
use canvas::render::font::Font;
use canvas::session::SessionConfig;

pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: {reason}")]
    Parse { var: &'static str, value: String, reason: String },
    #[error("{var} names an unset environment variable")]
    MissingKey { var: String },
    #[error("font {}: {reason}", path.display())]
    Font { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtelierConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub format: ExportFormat,
    pub font_path: Option<PathBuf>,
    /// `None` when `ATELIER_UPLOAD_URL` is unset; only `save` needs it.
    pub upload: Option<UploadConfig>,
}

impl AtelierConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `ATELIER_CANVAS_WIDTH` / `ATELIER_CANVAS_HEIGHT`: default 800 / 600
    /// - `ATELIER_BACKGROUND`: hex color, default `#ffffff`
    /// - `ATELIER_EXPORT_FORMAT`: `png` (default) or `jpeg`
    /// - `ATELIER_EXPORT_QUALITY`: JPEG quality 1-100, default 90
    /// - `ATELIER_FONT_PATH`: TrueType font for rasterized text; unset uses
    ///   a system sans font, then the bundled one
    /// - `ATELIER_UPLOAD_URL`: image host endpoint
    /// - `ATELIER_UPLOAD_KEY_ENV`: names the env var holding the upload key
    /// - `ATELIER_UPLOAD_TIMEOUT_SECS`: default 30
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for any value that is present but malformed,
    /// [`ConfigError::MissingKey`] when the key variable it names is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let width = env_parse("ATELIER_CANVAS_WIDTH", DEFAULT_CANVAS_WIDTH)?;
        let height = env_parse("ATELIER_CANVAS_HEIGHT", DEFAULT_CANVAS_HEIGHT)?;
        for (var, v) in [("ATELIER_CANVAS_WIDTH", width), ("ATELIER_CANVAS_HEIGHT", height)] {
            if v == 0 {
                return Err(ConfigError::Parse { var, value: "0".into(), reason: "must be at least 1".into() });
            }
        }

        let background = env_parse("ATELIER_BACKGROUND", Color::WHITE)?;
        let quality = env_parse("ATELIER_EXPORT_QUALITY", DEFAULT_JPEG_QUALITY)?;
        if !(1..=100).contains(&quality) {
            return Err(ConfigError::Parse {
                var: "ATELIER_EXPORT_QUALITY",
                value: quality.to_string(),
                reason: "expected 1-100".into(),
            });
        }
        let format = parse_format(std::env::var("ATELIER_EXPORT_FORMAT").ok().as_deref(), quality)?;
        let font_path = std::env::var("ATELIER_FONT_PATH").ok().map(PathBuf::from);

        let upload = match std::env::var("ATELIER_UPLOAD_URL") {
            Ok(url) => Some(UploadConfig {
                url,
                api_key: api_key_from_env()?,
                timeout_secs: env_parse("ATELIER_UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS)?,
            }),
            Err(_) => None,
        };

        Ok(Self { width, height, background, format, font_path, upload })
    }

    /// Session settings, loading the configured font if any.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Font`] when the font file cannot be read or parsed.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let font = match &self.font_path {
            Some(path) => {
                let data = std::fs::read(path)
                    .map_err(|e| ConfigError::Font { path: path.clone(), reason: e.to_string() })?;
                let font =
                    Font::from_bytes(data).map_err(|e| ConfigError::Font { path: path.clone(), reason: e.to_string() })?;
                Some(font)
            }
            None => None,
        };
        Ok(SessionConfig {
            width: self.width,
            height: self.height,
            background: self.background,
            export: ExportOptions { format: self.format },
            font,
        })
    }
}

fn env_parse<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::Parse { var, reason: e.to_string(), value }),
        Err(_) => Ok(default),
    }
}

fn parse_format(raw: Option<&str>, quality: u8) -> Result<ExportFormat, ConfigError> {
    match raw.unwrap_or("png") {
        "png" => Ok(ExportFormat::Png),
        "jpeg" | "jpg" => Ok(ExportFormat::Jpeg { quality }),
        other => Err(ConfigError::Parse {
            var: "ATELIER_EXPORT_FORMAT",
            value: other.to_owned(),
            reason: "expected 'png' or 'jpeg'".into(),
        }),
    }
}

fn api_key_from_env() -> Result<Option<String>, ConfigError> {
    let Ok(key_var) = std::env::var("ATELIER_UPLOAD_KEY_ENV") else {
        return Ok(None);
    };
    std::env::var(&key_var).map(Some).map_err(|_| ConfigError::MissingKey { var: key_var })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
