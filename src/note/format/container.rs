//! # Container Parsing
//!
//! Walks the notebook from its trailing footer address down to every layer:
//!
//! ```text
//! ┌──────────────────────┐
//! │ "note" + signature   │ ← parse_preamble()
//! ├──────────────────────┤
//! │ blocks (any order)   │ ← header / pages / layers / keywords / links,
//! │                      │   reached only through addresses
//! ├──────────────────────┤
//! │ footer address (u32) │ ← parse_footer()
//! └──────────────────────┘
//! ```
//!
//! The stages are fixed; nothing branches on content beyond the addresses
//! the footer and pages declare.

use std::io::{Read, Seek};

use log::{debug, info, trace, warn};

use super::block::{BlockReader, WORD_SIZE};
use super::layer_info;
use crate::note::types::error::{NoteError, Result};
use crate::note::types::models::{Footer, Header, Layer, NoteMetadata, Orientation, Page};
use crate::note::types::tags::TagMap;
use crate::note::utils;

pub const FILE_TYPE_SIZE: u64 = 4;
pub const SIGNATURE_SIZE: u64 = 20;

/// Expected value of the 4-byte file type marker.
pub const NOTE_FILE_TYPE: &str = "note";

const KEY_FILE_FEATURE: &str = "FILE_FEATURE";
const KEY_LAYER_INFO: &str = "LAYERINFO";
const KEY_LAYER_NAME: &str = "LAYERNAME";
const KEY_LAYER_TYPE: &str = "LAYERTYPE";
const KEY_LAYER_PROTOCOL: &str = "LAYERPROTOCOL";
const KEY_LAYER_BITMAP: &str = "LAYERBITMAP";
const KEY_LAYER_SEQ: &str = "LAYERSEQ";
const KEY_ORIENTATION: &str = "ORIENTATION";
const KEY_PAGE_ID: &str = "PAGEID";

const PAGE_MARKER: &str = "PAGE";
const KEYWORD_MARKER: &str = "KEYWORD_";
const LINK_MARKER: &str = "LINKO_";
const LAYER_MARKER: &str = "LAYER";

/// Parses the complete metadata tree, including every layer's bitmap bytes.
pub fn parse<R: Read + Seek>(reader: &mut BlockReader<R>) -> Result<NoteMetadata> {
    info!("Parsing notebook container ({} bytes)", reader.len());

    // Step 1: File type and signature
    let (file_type, signature) = parse_preamble(reader)?;

    // Step 2: Footer, keywords and links
    let footer = parse_footer(reader)?;

    // Step 3: Header
    let header = Header {
        address: footer.header_address,
        tags: reader.read_tagged_block(footer.header_address)?,
    };
    debug!("Header at {}: {} tags", header.address, header.tags.len());

    // Step 4: Pages and their layers
    let pages = footer
        .page_addresses
        .iter()
        .map(|&address| parse_page(reader, address))
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Notebook parsed: type='{}', signature='{}', {} pages, {} keywords, {} links",
        file_type,
        signature,
        pages.len(),
        footer.keywords.len(),
        footer.links.len()
    );

    Ok(NoteMetadata {
        file_type,
        signature,
        header,
        footer,
        pages,
    })
}

/// Reads the file type marker and the fixed-size signature.
fn parse_preamble<R: Read + Seek>(reader: &mut BlockReader<R>) -> Result<(String, String)> {
    let min_len = FILE_TYPE_SIZE + SIGNATURE_SIZE + WORD_SIZE;
    if reader.len() < min_len {
        return Err(NoteError::MalformedFile(format!(
            "File too short: {} bytes, at least {} required",
            reader.len(),
            min_len
        )));
    }

    let file_type = decode_text(reader.read_exact_at(0, FILE_TYPE_SIZE)?, "file type")?;
    if file_type != NOTE_FILE_TYPE {
        warn!("Unexpected file type marker '{}', expected '{}'", file_type, NOTE_FILE_TYPE);
    }
    let signature = decode_text(reader.read_exact_at(FILE_TYPE_SIZE, SIGNATURE_SIZE)?, "signature")?;
    trace!("Preamble: type='{}', signature='{}'", file_type, signature);

    Ok((file_type, signature))
}

fn decode_text(bytes: Vec<u8>, what: &str) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| NoteError::MalformedFile(format!("Unreadable {}: {}", what, e)))
}

/// Resolves the footer through the trailing address word.
fn parse_footer<R: Read + Seek>(reader: &mut BlockReader<R>) -> Result<Footer> {
    let address = reader.read_word_at(reader.len() - WORD_SIZE)? as u64;
    let tags = reader.read_tagged_block(address)?;
    debug!("Footer at {}: {} tags", address, tags.len());

    let header_address = tags
        .get(KEY_FILE_FEATURE)
        .ok_or(NoteError::MissingField {
            key: KEY_FILE_FEATURE,
            address,
        })
        .and_then(|value| utils::parse_address(value, KEY_FILE_FEATURE, address))?;

    let page_addresses = collect_addresses(&tags, PAGE_MARKER, address)?;
    let keywords = resolve_all(reader, &collect_addresses(&tags, KEYWORD_MARKER, address)?)?;
    let links = resolve_all(reader, &collect_addresses(&tags, LINK_MARKER, address)?)?;

    debug!(
        "Footer lists {} pages, {} keywords, {} links",
        page_addresses.len(),
        keywords.len(),
        links.len()
    );

    Ok(Footer {
        address,
        header_address,
        page_addresses,
        tags,
        keywords,
        links,
    })
}

/// Gathers the addresses under every key containing `marker`.
///
/// Repeated keys contribute all their values, in order.
fn collect_addresses(tags: &TagMap, marker: &str, block: u64) -> Result<Vec<u64>> {
    tags.entries_containing(marker)
        .flat_map(|(key, values)| values.iter().map(move |value| (key, value)))
        .map(|(key, value)| utils::parse_address(value, key, block))
        .collect()
}

fn resolve_all<R: Read + Seek>(reader: &mut BlockReader<R>, addresses: &[u64]) -> Result<Vec<TagMap>> {
    addresses
        .iter()
        .map(|&address| reader.read_tagged_block(address))
        .collect()
}

/// Gathers layer addresses of a page.
///
/// Only numeric values count (this skips `LAYERSEQ` and `LAYERINFO`), and
/// zero marks an absent layer.
fn collect_layer_addresses(tags: &TagMap, block: u64) -> Result<Vec<u64>> {
    let mut addresses = Vec::new();
    for (key, values) in tags.entries_containing(LAYER_MARKER) {
        for value in values.iter().filter(|v| utils::is_numeric(v)) {
            let address = utils::parse_address(value, key, block)?;
            if address != 0 {
                addresses.push(address);
            }
        }
    }
    Ok(addresses)
}

fn parse_page<R: Read + Seek>(reader: &mut BlockReader<R>, address: u64) -> Result<Page> {
    let mut tags = reader.read_tagged_block(address)?;

    let orientation = match tags.get(KEY_ORIENTATION) {
        Some(value) => Orientation::try_from(value)?,
        None => {
            debug!("Page at {} has no orientation, assuming vertical", address);
            Orientation::Vertical
        }
    };

    let layer_addresses = collect_layer_addresses(&tags, address)?;
    let mut layers = layer_addresses
        .iter()
        .map(|&layer_address| parse_layer(reader, layer_address))
        .collect::<Result<Vec<_>>>()?;

    let raw_info = tags
        .remove(KEY_LAYER_INFO)
        .map(|values| values.concat())
        .unwrap_or_default();
    let records = layer_info::parse_records(&raw_info);
    layer_info::attach(&mut layers, &records);

    debug!(
        "Page at {}: {:?}, {} layers, {} info records",
        address,
        orientation,
        layers.len(),
        records.len()
    );

    Ok(Page {
        address,
        orientation,
        layer_sequence: tags.get(KEY_LAYER_SEQ).map(str::to_owned),
        page_id: tags.get(KEY_PAGE_ID).map(str::to_owned),
        tags,
        layers,
    })
}

/// Resolves a layer block and eagerly loads its bitmap content.
fn parse_layer<R: Read + Seek>(reader: &mut BlockReader<R>, address: u64) -> Result<Layer> {
    let tags = reader.read_tagged_block(address)?;

    let name = tags
        .get(KEY_LAYER_NAME)
        .ok_or(NoteError::MissingField {
            key: KEY_LAYER_NAME,
            address,
        })?
        .to_owned();
    let bitmap_address = tags
        .get(KEY_LAYER_BITMAP)
        .ok_or(NoteError::MissingField {
            key: KEY_LAYER_BITMAP,
            address,
        })
        .and_then(|value| utils::parse_address(value, KEY_LAYER_BITMAP, address))?;

    let content = reader.read_block(bitmap_address)?;
    trace!(
        "Layer '{}' at {}: bitmap at {} ({} bytes)",
        name,
        address,
        bitmap_address,
        content.len()
    );

    Ok(Layer {
        address,
        layer_type: tags.get(KEY_LAYER_TYPE).map(str::to_owned),
        protocol: tags.get(KEY_LAYER_PROTOCOL).map(str::to_owned),
        name,
        bitmap_address,
        tags,
        info: None,
        content,
    })
}
