//! Codec layer for layer bitmaps.
//!
//! # Submodules
//!
//! - [`colormap`][]: Color codes and their grayscale output values
//! - [`rle`][]: The run-length scheme layers are stored with

pub mod colormap;
pub mod rle;
