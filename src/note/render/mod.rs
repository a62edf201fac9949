//! Rendering layer: from decoded layers to page images and documents.
//!
//! - [`compositor`][]: Transparency and bottom-to-top flattening of layers
//! - [`pdf`][]: Writes flattened pages as one PDF document

pub mod compositor;
pub mod pdf;
