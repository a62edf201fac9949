//! Helpers that synthesise notebook files and layer streams for tests.

#![allow(dead_code)]

use supernote_reader::PageGeometry;

pub const SIGNATURE: &[u8; 20] = b"SN_FILE_VER_20230015";

/// Small page size so decoded layers stay tiny.
pub const GEOMETRY: PageGeometry = PageGeometry::new(4, 3);

/// Appends blocks to a notebook image and hands out their addresses.
pub struct NoteBuilder {
    buf: Vec<u8>,
}

impl NoteBuilder {
    pub fn new() -> Self {
        let mut buf = b"note".to_vec();
        buf.extend_from_slice(SIGNATURE);
        Self { buf }
    }

    /// Writes a raw block and returns its address.
    pub fn block(&mut self, payload: &[u8]) -> u64 {
        let address = self.buf.len() as u64;
        self.buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(payload);
        address
    }

    /// Writes a `<KEY:VALUE>` block and returns its address.
    pub fn tagged(&mut self, tags: &[(&str, String)]) -> u64 {
        let text: String = tags.iter().map(|(k, v)| format!("<{}:{}>", k, v)).collect();
        self.block(text.as_bytes())
    }

    /// Appends the trailing footer address.
    pub fn finish(mut self, footer: u64) -> Vec<u8> {
        self.buf.extend_from_slice(&(footer as u32).to_le_bytes());
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }
}

/// One layer of a synthetic page.
pub struct LayerSpec {
    pub name: &'static str,
    pub bitmap: Vec<u8>,
}

impl LayerSpec {
    pub fn new(name: &'static str, bitmap: Vec<u8>) -> Self {
        Self { name, bitmap }
    }
}

/// One synthetic page. Layers are listed in the order the page block names them.
pub struct PageSpec {
    pub orientation: &'static str,
    pub layers: Vec<LayerSpec>,
    pub layer_info: String,
    pub page_id: &'static str,
}

impl PageSpec {
    pub fn vertical(layers: Vec<LayerSpec>) -> Self {
        Self {
            orientation: "1090",
            layers,
            layer_info: String::new(),
            page_id: "P20240101000000000000",
        }
    }

    pub fn with_info(mut self, layer_info: &str) -> Self {
        self.layer_info = layer_info.to_string();
        self
    }

    pub fn with_orientation(mut self, orientation: &'static str) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Writes one layer block (and its bitmap) and returns the layer address.
pub fn write_layer(builder: &mut NoteBuilder, layer: &LayerSpec) -> u64 {
    let bitmap = builder.block(&layer.bitmap);
    builder.tagged(&[
        ("LAYERTYPE", "NOTE".to_string()),
        ("LAYERPROTOCOL", "RATTA_RLE".to_string()),
        ("LAYERNAME", layer.name.to_string()),
        ("LAYERPATH", "0".to_string()),
        ("LAYERBITMAP", bitmap.to_string()),
        ("LAYERVECTORGRAPH", "0".to_string()),
    ])
}

/// Writes a page block, its layers, and returns the page address.
pub fn write_page(builder: &mut NoteBuilder, page: &PageSpec) -> u64 {
    let mut tags = vec![("PAGESTYLE", "style_white".to_string())];
    if !page.layer_info.is_empty() {
        tags.push(("LAYERINFO", page.layer_info.clone()));
    }
    let seq: Vec<&str> = page.layers.iter().map(|l| l.name).collect();
    tags.push(("LAYERSEQ", seq.join(",")));
    for layer in &page.layers {
        let address = write_layer(builder, layer);
        tags.push((layer.name, address.to_string()));
    }
    // An absent layer is declared with address zero.
    if !page.layers.iter().any(|l| l.name == "LAYER3") {
        tags.push(("LAYER3", "0".to_string()));
    }
    tags.push(("ORIENTATION", page.orientation.to_string()));
    tags.push(("PAGEID", page.page_id.to_string()));
    builder.tagged(&tags)
}

/// Builds a complete notebook with the given pages, keywords and links.
pub fn build_notebook(pages: &[PageSpec], keywords: &[&str], links: &[&str]) -> Vec<u8> {
    let mut builder = NoteBuilder::new();
    let header = builder.tagged(&[
        ("MODULE_LABEL", "SNFILE_FEATURE".to_string()),
        ("FILE_TYPE", "NOTE".to_string()),
        ("APPLY_EQUIPMENT", "N5".to_string()),
    ]);

    let page_addresses: Vec<u64> = pages.iter().map(|p| write_page(&mut builder, p)).collect();
    let keyword_addresses: Vec<u64> = keywords
        .iter()
        .map(|k| builder.tagged(&[("KEYWORDSITE", "10,20,30,40".to_string()), ("KEYWORD", k.to_string())]))
        .collect();
    let link_addresses: Vec<u64> = links
        .iter()
        .map(|l| builder.tagged(&[("LINKTYPE", "0".to_string()), ("LINKFILE", l.to_string())]))
        .collect();

    let mut footer: Vec<(String, String)> = vec![("FILE_FEATURE".to_string(), header.to_string())];
    for (i, address) in page_addresses.iter().enumerate() {
        footer.push((format!("PAGE{}", i + 1), address.to_string()));
    }
    for address in &keyword_addresses {
        footer.push(("KEYWORD_0001".to_string(), address.to_string()));
    }
    for (i, address) in link_addresses.iter().enumerate() {
        footer.push((format!("LINKO_{:04}", i + 1), address.to_string()));
    }
    footer.push(("STYLE_style_white".to_string(), "0".to_string()));

    let footer_tags: Vec<(&str, String)> = footer.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
    let footer_address = builder.tagged(&footer_tags);
    builder.finish(footer_address)
}

/// Encodes runs with the direct tiers only: sentinel runs, then one short
/// or merged extended run for the remainder.
pub fn encode_runs(runs: &[(u8, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    for &(color, mut length) in runs {
        while length >= 0x4000 {
            out.extend_from_slice(&[color, 0xFF]);
            length -= 0x4000;
        }
        match length {
            0 => {}
            1..=128 => out.extend_from_slice(&[color, (length - 1) as u8]),
            _ => {
                let blocks = (length - 1) / 128;
                let rest = length - 1 - blocks * 128;
                out.extend_from_slice(&[color, 0x80 | (blocks - 1) as u8, color, rest as u8]);
            }
        }
    }
    out
}

/// A layer of one uniform color covering the whole page.
pub fn uniform_layer(color: u8, geometry: PageGeometry) -> Vec<u8> {
    encode_runs(&[(color, geometry.width * geometry.height)])
}
