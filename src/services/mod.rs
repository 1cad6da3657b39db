//! Host services wired around a canvas session.
//!
//! ARCHITECTURE
//! ============
//! The canvas crate defines the collaborator contracts; these modules are
//! the host's implementations of them plus the sketch-script driver that
//! stands in for a browser feeding pointer and keyboard events.

pub mod notify;
pub mod script;
pub mod upload;
