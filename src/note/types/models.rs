//! Core data structures for the notebook metadata tree.
//!
//! This module defines the fundamental types used throughout the library:
//! - Page geometry and orientation
//! - Footer, header, page and layer blocks
//! - Layer info records parsed from `LAYERINFO`
//!
//! Each block kind keeps its raw [`TagMap`] next to the typed fields so the
//! whole tree can be handed to a metadata consumer unchanged.

use serde::Serialize;

use super::error::{NoteError, Result};
use super::tags::TagMap;

/// Name of the fixed background layer.
pub const BACKGROUND_LAYER_NAME: &str = "BGLAYER";

/// Pixel dimensions of a page in its vertical (portrait) orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageGeometry {
    pub width: u32,
    pub height: u32,
}

impl PageGeometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the dimensions for a page drawn in `orientation`.
    ///
    /// Horizontal pages swap width and height.
    pub fn for_orientation(&self, orientation: Orientation) -> PageGeometry {
        match orientation {
            Orientation::Vertical => *self,
            Orientation::Horizontal => PageGeometry::new(self.height, self.width),
        }
    }

    /// Number of pixels on the page.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl Default for PageGeometry {
    /// The A5X panel: 1404 x 1872 pixels.
    fn default() -> Self {
        Self::new(1404, 1872)
    }
}

/// Page orientation as stored in the `ORIENTATION` tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

impl Orientation {
    pub const HORIZONTAL_CODE: &'static str = "1000";
    pub const VERTICAL_CODE: &'static str = "1090";
}

impl TryFrom<&str> for Orientation {
    type Error = NoteError;
    fn try_from(value: &str) -> Result<Self> {
        match value {
            Self::HORIZONTAL_CODE => Ok(Self::Horizontal),
            Self::VERTICAL_CODE => Ok(Self::Vertical),
            _ => Err(NoteError::MalformedFile(format!("Unknown page orientation: {}", value))),
        }
    }
}

/// A record extracted from one `{...}` group of a page's `LAYERINFO` field.
///
/// The schema is firmware dependent, so the fields stay an open map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayerInfo {
    pub fields: TagMap,
}

impl LayerInfo {
    /// The human readable layer name, e.g. `"Layer 1"`.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name")
    }

    /// The name with spaces removed and upper-cased, comparable to `LAYERNAME`.
    pub fn normalized_name(&self) -> Option<String> {
        self.name().map(|name| name.replace(' ', "").to_uppercase())
    }
}

/// A resolved block with no typed schema.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Header {
    #[serde(skip)]
    pub address: u64,
    pub tags: TagMap,
}

/// The root index block.
#[derive(Debug, Clone, Serialize)]
pub struct Footer {
    #[serde(skip)]
    pub address: u64,
    #[serde(skip)]
    pub header_address: u64,
    #[serde(skip)]
    pub page_addresses: Vec<u64>,
    #[serde(flatten)]
    pub tags: TagMap,
    #[serde(rename = "KEYWORDS")]
    pub keywords: Vec<TagMap>,
    #[serde(rename = "LINKS")]
    pub links: Vec<TagMap>,
}

/// One drawable bitmap of a page.
#[derive(Debug, Clone, Serialize)]
pub struct Layer {
    #[serde(skip)]
    pub address: u64,
    #[serde(skip)]
    pub name: String,
    #[serde(skip)]
    pub layer_type: Option<String>,
    #[serde(skip)]
    pub protocol: Option<String>,
    #[serde(skip)]
    pub bitmap_address: u64,
    #[serde(flatten)]
    pub tags: TagMap,
    #[serde(rename = "LAYERINFO", skip_serializing_if = "Option::is_none")]
    pub info: Option<LayerInfo>,
    /// Compressed bitmap bytes read from `bitmap_address`.
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl Layer {
    pub fn is_background(&self) -> bool {
        self.name == BACKGROUND_LAYER_NAME
    }
}

/// A notebook page and its layers in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    #[serde(skip)]
    pub address: u64,
    #[serde(skip)]
    pub orientation: Orientation,
    #[serde(skip)]
    pub layer_sequence: Option<String>,
    #[serde(skip)]
    pub page_id: Option<String>,
    #[serde(flatten)]
    pub tags: TagMap,
    #[serde(rename = "LAYERS")]
    pub layers: Vec<Layer>,
}

impl Page {
    pub fn is_horizontal(&self) -> bool {
        self.orientation == Orientation::Horizontal
    }

    pub fn total_layers(&self) -> usize {
        self.layers.len()
    }

    /// Indices into [`Page::layers`] in drawing order, bottom first.
    ///
    /// Background layers go to the bottom. The rest are drawn in reverse
    /// discovery order, which puts the main writing layer (always
    /// discovered first) on top.
    pub fn draw_order(&self) -> Vec<usize> {
        let (mut order, foreground): (Vec<usize>, Vec<usize>) =
            (0..self.layers.len()).partition(|&i| self.layers[i].is_background());
        order.extend(foreground.into_iter().rev());
        order
    }

    /// Layers in drawing order, bottom first.
    pub fn layers_bottom_up(&self) -> Vec<&Layer> {
        self.draw_order().into_iter().map(|i| &self.layers[i]).collect()
    }
}

/// The fully resolved metadata tree of a notebook.
#[derive(Debug, Clone, Serialize)]
pub struct NoteMetadata {
    #[serde(rename = "TYPE")]
    pub file_type: String,
    #[serde(rename = "SIGNATURE")]
    pub signature: String,
    #[serde(rename = "HEADER")]
    pub header: Header,
    #[serde(rename = "FOOTER")]
    pub footer: Footer,
    #[serde(rename = "PAGES")]
    pub pages: Vec<Page>,
}
