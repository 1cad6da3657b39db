//! Editing session and its external collaborators.
//!
//! DESIGN
//! ======
//! A `Session` is everything one open editor owns: the engine (surface,
//! history, tool state), the decoded image assets, the rasterizer and the
//! save state. There is no global state; closing the session drops it all.
//!
//! Saving is split in two halves around the upload so the host can await the
//! upload without holding a borrow on the session. `begin_save` exports the
//! surface synchronously and marks a save as in flight; `finish_save` takes
//! the upload outcome, reports it and clears the flag. While a save is in
//! flight drawing, undo and redo keep working, and a second `begin_save` is
//! rejected. `save` chains the two halves for hosts that don't need that.
//!
//! ERROR HANDLING
//! ==============
//! Every save failure is reported through the `Notifier` and returned as a
//! `SaveError`. Surface and history are never modified by a failed save, so
//! the user can retry right away.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tracing::{info, warn};

use crate::assets::{AssetError, AssetStore};
use crate::color::Color;
use crate::doc::{Drawable, Shape, Surface};
use crate::engine::EngineCore;
use crate::error::ErrorCode;
use crate::export::{ExportError, ExportOptions, ExportedImage, export};
use crate::history::HistoryError;
use crate::render::font::Font;
use crate::render::raster::SkiaRasterizer;

// =============================================================================
// COLLABORATORS
// =============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Network(String),
    #[error("image host returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected image host response: {0}")]
    Response(String),
}

impl ErrorCode for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_UPLOAD_NETWORK",
            Self::Status { .. } => "E_UPLOAD_STATUS",
            Self::Response(_) => "E_UPLOAD_RESPONSE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Response(_) => false,
        }
    }
}

/// Stores an encoded image somewhere reachable and returns its public URL.
#[async_trait::async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, mime: &str) -> Result<String, UploadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing message (a toast in the dashboard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    fn new(severity: Severity, title: &str, description: impl Into<String>) -> Self {
        Self { title: title.to_owned(), description: description.into(), severity }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("a save is already in progress")]
    AlreadySaving,
    #[error("no save is in progress")]
    NotSaving,
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl ErrorCode for SaveError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadySaving => "E_ALREADY_SAVING",
            Self::NotSaving => "E_NOT_SAVING",
            Self::Export(e) => e.error_code(),
            Self::Upload(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Upload(e) if e.retryable())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("initial image: {0}")]
    Asset(#[from] AssetError),
    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error(transparent)]
    History(#[from] HistoryError),
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub export: ExportOptions,
    /// Font used to rasterize text on export; text is left out without one.
    pub font: Option<Font>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { width: 800, height: 600, background: Color::WHITE, export: ExportOptions::default(), font: None }
    }
}

/// Image the session opens with, already fetched by the host.
#[derive(Debug, Clone)]
pub struct InitialImage {
    pub url: String,
    pub bytes: Vec<u8>,
}

type SaveCallback = Box<dyn FnMut(&str) + Send>;

pub struct Session {
    engine: EngineCore,
    assets: AssetStore,
    rasterizer: SkiaRasterizer,
    export: ExportOptions,
    saving: bool,
    on_save: Option<SaveCallback>,
}

impl Session {
    /// Open a session, optionally seeded with an image scaled to fit the
    /// surface and centered on it. History starts with a single snapshot.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidDimensions`] for a zero-sized surface and
    /// [`SessionError::Asset`] if the initial image cannot be decoded.
    pub fn open(config: SessionConfig, initial: Option<InitialImage>) -> Result<Self, SessionError> {
        let SessionConfig { width, height, background, export, font } = config;
        if width == 0 || height == 0 {
            return Err(SessionError::InvalidDimensions { width, height });
        }

        let mut surface = Surface::new(width, height, background);
        let mut assets = AssetStore::new();
        if let Some(InitialImage { url, bytes }) = initial {
            let (img_w, img_h) = assets.insert_encoded(&url, &bytes)?;
            surface.push(Drawable::new(fit_image(url, img_w, img_h, width, height)));
        }

        let engine = EngineCore::from_surface(surface)?;
        let rasterizer = font.map_or_else(SkiaRasterizer::new, SkiaRasterizer::with_font);
        info!(width, height, seeded = !engine.surface.is_empty(), "session opened");
        Ok(Self { engine, assets, rasterizer, export, saving: false, on_save: None })
    }

    /// Tear the session down; history and assets are released.
    pub fn close(self) {
        info!(objects = self.engine.surface.len(), snapshots = self.engine.history.len(), "session closed");
    }

    /// Register the callback that receives the URL of every successful save.
    pub fn on_save<F>(&mut self, callback: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_save = Some(Box::new(callback));
    }

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut EngineCore {
        &mut self.engine
    }

    #[must_use]
    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Rasterize and encode the surface with the session's export options.
    ///
    /// # Errors
    ///
    /// See [`export`].
    pub fn export(&self) -> Result<ExportedImage, ExportError> {
        export(&self.engine.surface, &self.rasterizer, &self.assets, self.export)
    }

    /// First half of a save: export the surface and mark a save in flight.
    ///
    /// # Errors
    ///
    /// [`SaveError::AlreadySaving`] while another save is in flight, and
    /// [`SaveError::Export`] if the surface is empty or cannot be encoded.
    /// Both are also reported through `notifier`.
    pub fn begin_save(&mut self, notifier: &dyn Notifier) -> Result<ExportedImage, SaveError> {
        if self.saving {
            notifier.notify(Notification::new(Severity::Info, "Save in progress", "Please wait for the current save."));
            return Err(SaveError::AlreadySaving);
        }
        let image = match self.export() {
            Ok(image) => image,
            Err(ExportError::EmptySurface) => {
                notifier.notify(Notification::new(
                    Severity::Warning,
                    "Nothing to save",
                    "Draw something on the canvas before saving.",
                ));
                return Err(ExportError::EmptySurface.into());
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                notifier.notify(Notification::new(Severity::Error, "Save failed", e.to_string()));
                return Err(e.into());
            }
        };
        self.saving = true;
        Ok(image)
    }

    /// Second half of a save: report the upload outcome and clear the
    /// in-flight flag. On success the `on_save` callback receives the URL.
    ///
    /// # Errors
    ///
    /// [`SaveError::NotSaving`] without a matching [`Session::begin_save`];
    /// the outcome is dropped and nothing is reported. [`SaveError::Upload`]
    /// when the upload failed.
    pub fn finish_save(
        &mut self,
        outcome: Result<String, UploadError>,
        notifier: &dyn Notifier,
    ) -> Result<String, SaveError> {
        if !self.saving {
            warn!(succeeded = outcome.is_ok(), "upload outcome without a save in flight");
            return Err(SaveError::NotSaving);
        }
        self.saving = false;
        match outcome {
            Ok(url) => {
                info!(%url, "design saved");
                notifier.notify(Notification::new(Severity::Success, "Design saved", "The design was uploaded."));
                if let Some(callback) = self.on_save.as_mut() {
                    callback(&url);
                }
                Ok(url)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), retryable = e.retryable(), "upload failed");
                notifier.notify(Notification::new(Severity::Error, "Save failed", e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Export, upload and report in one call.
    ///
    /// Dropping the returned future mid-upload clears the in-flight flag, so
    /// a later save is not locked out.
    ///
    /// # Errors
    ///
    /// Any [`SaveError`]; see [`Session::begin_save`] and
    /// [`Session::finish_save`].
    pub async fn save(&mut self, uploader: &dyn ImageUploader, notifier: &dyn Notifier) -> Result<String, SaveError> {
        let image = self.begin_save(notifier)?;
        let in_flight = InFlight { saving: &mut self.saving, armed: true };
        let outcome = uploader.upload(image.bytes, image.mime).await;
        in_flight.disarm();
        self.finish_save(outcome, notifier)
    }
}

/// Clears the in-flight flag if the upload is abandoned before completing.
struct InFlight<'a> {
    saving: &'a mut bool,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("save abandoned mid-upload");
            *self.saving = false;
        }
    }
}

/// Image shape scaled to fit `width`×`height` keeping its aspect ratio, centered.
fn fit_image(src: String, img_w: u32, img_h: u32, width: u32, height: u32) -> Shape {
    let (iw, ih) = (f64::from(img_w.max(1)), f64::from(img_h.max(1)));
    let (sw, sh) = (f64::from(width), f64::from(height));
    let scale = (sw / iw).min(sh / ih);
    let (w, h) = (iw * scale, ih * scale);
    Shape::Image { x: (sw - w) / 2.0, y: (sh - h) / 2.0, width: w, height: h, src }
}
