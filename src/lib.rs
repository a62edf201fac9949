//! # supernote-reader
//!
//! A reader for Supernote `.note` notebooks.
//! Parses the block-addressed container, decodes the run-length encoded
//! layer bitmaps and composites them into page images or a PDF document.
pub mod note;

// Re-export the main types for convenience
pub use note::{
    Notebook,
    NoteError,
    Result,
    iter::RenderedPages,
    types::models::{
        Footer,
        Header,
        Layer,
        LayerInfo,
        NoteMetadata,
        Orientation,
        Page,
        PageGeometry,
    },
    types::tags::TagMap,
};
