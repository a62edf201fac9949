//! # Block Reader
//!
//! Every structure in a notebook lives in a length-prefixed block:
//!
//! ```text
//! [4 bytes] Payload length L (little-endian u32)
//! [L bytes] Payload: `<KEY:VALUE>` text, or raw layer bitmap bytes
//! ```
//!
//! Blocks are only reachable through addresses stored in other blocks, so
//! the reader is random access: any block can be read at any time, in any
//! order.

use std::io::{Cursor, Read, Seek, SeekFrom};
use std::sync::OnceLock;

use byteorder::{LittleEndian, ReadBytesExt};
use log::trace;
use regex::Regex;

use crate::note::types::error::{NoteError, Result};
use crate::note::types::tags::TagMap;
use crate::note::utils;

/// Size of the length prefix and of every address word.
pub const WORD_SIZE: u64 = 4;

static FIELD_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Matches `<KEY:VALUE>`; neither part may contain `<`, `>` or `:`.
fn field_regex() -> &'static Regex {
    FIELD_PATTERN.get_or_init(|| Regex::new(r"<([^:<>]+):([^:<>]*)>").expect("Invalid field regex pattern"))
}

/// Parses all `<KEY:VALUE>` pairs of a block payload.
///
/// Invalid UTF-8 is replaced rather than rejected: a payload without any
/// recognisable field simply yields an empty map.
pub fn parse_tags(payload: &[u8]) -> TagMap {
    let text = String::from_utf8_lossy(payload);
    utils::extract_pairs(field_regex(), &text)
}

/// Random-access reader over a seekable byte source.
#[derive(Debug)]
pub struct BlockReader<R> {
    source: R,
    len: u64,
}

impl BlockReader<Cursor<Vec<u8>>> {
    /// Wraps an in-memory copy of a whole notebook file.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len() as u64;
        Self {
            source: Cursor::new(bytes),
            len,
        }
    }
}

impl<R: Read + Seek> BlockReader<R> {
    pub fn new(mut source: R) -> Result<Self> {
        let len = source.seek(SeekFrom::End(0))?;
        Ok(Self { source, len })
    }

    /// Total size of the underlying source in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads `size` raw bytes starting at `address`.
    pub fn read_exact_at(&mut self, address: u64, size: u64) -> Result<Vec<u8>> {
        let end = address.checked_add(size).ok_or(NoteError::InvalidAddress {
            address,
            file_len: self.len,
        })?;
        if end > self.len {
            return Err(NoteError::InvalidAddress {
                address,
                file_len: self.len,
            });
        }
        self.source.seek(SeekFrom::Start(address))?;
        let mut buf = vec![0u8; size as usize];
        self.source.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads a little-endian `u32` word at `address`.
    pub fn read_word_at(&mut self, address: u64) -> Result<u32> {
        if address.saturating_add(WORD_SIZE) > self.len {
            return Err(NoteError::InvalidAddress {
                address,
                file_len: self.len,
            });
        }
        self.source.seek(SeekFrom::Start(address))?;
        Ok(self.source.read_u32::<LittleEndian>()?)
    }

    /// Reads the payload of the block at `address`.
    ///
    /// # Errors
    /// - [`NoteError::InvalidAddress`] if the length word lies outside the file.
    /// - [`NoteError::TruncatedBlock`] if the declared length runs past the end of the file.
    pub fn read_block(&mut self, address: u64) -> Result<Vec<u8>> {
        let declared = self.read_word_at(address)? as u64;
        let start = address + WORD_SIZE;
        let available = self.len - start;
        if declared > available {
            return Err(NoteError::TruncatedBlock {
                address,
                declared,
                available,
            });
        }
        trace!("Reading block at {}: {} bytes", address, declared);

        let mut payload = vec![0u8; declared as usize];
        self.source.read_exact(&mut payload)?;
        Ok(payload)
    }

    /// Reads the block at `address` and parses its `<KEY:VALUE>` fields.
    pub fn read_tagged_block(&mut self, address: u64) -> Result<TagMap> {
        let payload = self.read_block(address)?;
        let tags = parse_tags(&payload);
        trace!("Block at {} holds {} tags", address, tags.len());
        Ok(tags)
    }
}
