//! Design canvas engine for the tailoring dashboard.
//!
//! Staff sketch garment ideas and annotate order reference images on a fixed
//! size surface: freehand pen and eraser, rectangles, circles and editable
//! text, with bounded undo/redo, zoom and pan, and export to PNG or JPEG. A
//! finished design is uploaded through a host-supplied image store and the
//! resulting URL is handed back to the order form.
//!
//! The object model and tool state machine are plain Rust and run natively.
//! The `web` feature adds a live 2D-canvas view for the browser build.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Editing session, save flow, uploader and notifier contracts |
//! | [`engine`] | Tool state machine; [`engine::EngineCore`] and the `web` `Engine` |
//! | [`doc`] | Surface and drawable object types |
//! | [`history`] | Bounded undo/redo snapshot history |
//! | [`camera`] | Zoom/pan camera and coordinate conversions |
//! | [`input`] | Tools, brush, input event types and the gesture state machine |
//! | [`hit`] | Hit-testing objects and resize handles |
//! | [`render`] | Rendering adapters: tiny-skia raster and the `web` live view |
//! | [`export`] | PNG/JPEG encoding of a rasterized surface |
//! | [`assets`] | Decoded image assets referenced by image objects |
//! | [`color`] | Colors and fills |
//! | [`error`] | Machine-readable error codes |
//! | [`consts`] | Shared constants (zoom limits, insertion defaults, etc.) |

pub mod assets;
pub mod camera;
pub mod color;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod export;
pub mod hit;
pub mod history;
pub mod input;
pub mod render;
pub mod session;
