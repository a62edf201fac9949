//! Run-length codec of layer bitmaps.
//!
//! A layer is a sequence of `(color_code, length_byte)` tuples. Each tuple
//! starts one run; the length byte selects one of three encodings:
//!
//! | length byte            | run length                                   | tuples |
//! |------------------------|----------------------------------------------|--------|
//! | `0xFF`                 | `0x4000`                                     | 1      |
//! | `1xxxxxxx`, same color next | `1 + next_length + ((x + 1) << 7)`      | 2      |
//! | `1xxxxxxx`, otherwise  | `(x + 1) << 7`                               | 1      |
//! | `0xxxxxxx`             | `x + 1`                                      | 1      |
//!
//! Decoding is strict: the runs must cover the page exactly.

use log::trace;

use super::colormap;
use crate::note::types::error::{NoteError, Result};

/// Length of a run encoded with the `0xFF` sentinel.
pub const SPECIAL_LENGTH: u32 = 0x4000;

const SPECIAL_LENGTH_BYTE: u8 = 0xFF;
const EXTENDED_FLAG: u8 = 0x80;

/// One decoded run: `length` pixels of `color_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub color_code: u8,
    pub length: u32,
}

/// Iterator over the runs of an encoded layer.
///
/// Created by [`runs`].
#[derive(Debug, Clone)]
pub struct Runs<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Runs<'_> {
    fn peek_tuple(&self) -> Option<(u8, u8)> {
        match self.data.get(self.pos..self.pos + 2)? {
            &[color_code, length_byte] => Some((color_code, length_byte)),
            _ => None,
        }
    }
}

impl Iterator for Runs<'_> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let (color_code, length_byte) = self.peek_tuple()?;
        self.pos += 2;

        let length = if length_byte == SPECIAL_LENGTH_BYTE {
            SPECIAL_LENGTH
        } else if length_byte & EXTENDED_FLAG != 0 {
            let base = ((length_byte & !EXTENDED_FLAG) as u32 + 1) << 7;
            match self.peek_tuple() {
                // The next tuple continues the same color: merge both.
                Some((next_color, next_length)) if next_color == color_code => {
                    self.pos += 2;
                    1 + next_length as u32 + base
                }
                _ => base,
            }
        } else {
            length_byte as u32 + 1
        };

        Some(Run { color_code, length })
    }
}

/// Splits an encoded layer into runs.
///
/// # Errors
/// Returns [`NoteError::MalformedFile`] if the stream is not made of whole tuples.
pub fn runs(content: &[u8]) -> Result<Runs<'_>> {
    if content.len() % 2 != 0 {
        return Err(NoteError::MalformedFile(format!(
            "Layer bitmap length {} is not a whole number of tuples",
            content.len()
        )));
    }
    Ok(Runs { data: content, pos: 0 })
}

/// Decodes a layer into a row-major grayscale buffer of `width * height` bytes.
pub fn decode(content: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    decode_into(&mut output, content, width, height)?;
    Ok(output)
}

/// Decodes a layer into `output`, replacing its previous contents.
///
/// The run lengths are validated before any pixel is written, so a corrupt
/// stream never allocates more than one page worth of memory.
///
/// # Errors
/// Returns [`NoteError::DecodeLengthMismatch`] if the runs do not cover the page exactly.
pub fn decode_into(output: &mut Vec<u8>, content: &[u8], width: u32, height: u32) -> Result<()> {
    let expected = width as u64 * height as u64;
    let actual: u64 = runs(content)?.map(|run| run.length as u64).sum();
    trace!(
        "Decoding layer: {} encoded bytes, {} pixels ({}x{})",
        content.len(),
        actual,
        width,
        height
    );
    if actual != expected {
        return Err(NoteError::DecodeLengthMismatch { expected, actual });
    }

    output.clear();
    output.reserve(expected as usize);
    for run in runs(content)? {
        output.extend(std::iter::repeat_n(colormap::resolve(run.color_code), run.length as usize));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(content: &[u8]) -> Vec<u32> {
        runs(content).unwrap().map(|run| run.length).collect()
    }

    #[test]
    fn short_runs() {
        assert_eq!(lengths(&[0x61, 0x00, 0x62, 0x7F]), vec![1, 128]);
    }

    #[test]
    fn extended_run_merges_with_same_color() {
        // ((0x01 + 1) << 7) + 1 + 0x05
        assert_eq!(lengths(&[0x62, 0x81, 0x62, 0x05]), vec![262]);
    }

    #[test]
    fn extended_run_stands_alone_before_other_color() {
        assert_eq!(lengths(&[0x62, 0x81, 0x61, 0x05]), vec![256, 6]);
    }

    #[test]
    fn trailing_extended_run_stands_alone() {
        assert_eq!(lengths(&[0x62, 0x80]), vec![128]);
    }

    #[test]
    fn sentinel_run() {
        assert_eq!(lengths(&[0x62, 0xFF, 0x62, 0xFF]), vec![SPECIAL_LENGTH, SPECIAL_LENGTH]);
    }
}
