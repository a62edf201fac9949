//! Core notebook reader module
//!
//! ```text
//! BlockReader ──► container::parse ──► NoteMetadata (pages, layers, bitmaps)
//!                                            │
//!                      rle::decode ◄─────────┘
//!                           │
//!                 compositor::composite_page ──► pdf::write_pdf
//! ```

pub mod codec;
pub mod format;
pub mod iter;
pub mod reader;
pub mod render;
pub mod types;
mod utils;

pub use reader::Notebook;
pub use types::error::{NoteError, Result};
