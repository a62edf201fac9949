//! Color codes of the layer bitmap codec and their grayscale values.

pub const COLORCODE_BLACK: u8 = 0x61;
pub const COLORCODE_BACKGROUND: u8 = 0x62;
pub const COLORCODE_DARK_GRAY: u8 = 0x63;
pub const COLORCODE_GRAY: u8 = 0x64;
pub const COLORCODE_WHITE: u8 = 0x65;
pub const COLORCODE_MARKER_BLACK: u8 = 0x66;
pub const COLORCODE_MARKER_DARK_GRAY: u8 = 0x67;
pub const COLORCODE_MARKER_GRAY: u8 = 0x68;

/// Output value of transparent (background) pixels.
pub const BACKGROUND: u8 = 0xFF;
pub const BLACK: u8 = 0x00;
pub const DARK_GRAY: u8 = 0x9D;
pub const GRAY: u8 = 0xC9;
/// The device renders "white" ink with this value, distinct from the background.
pub const WHITE: u8 = 0x65;

/// Maps a color code to its grayscale byte.
///
/// Codes outside the table are antialiasing pixels that already carry their
/// gray level, and pass through unchanged.
pub fn resolve(color_code: u8) -> u8 {
    match color_code {
        COLORCODE_BLACK | COLORCODE_MARKER_BLACK => BLACK,
        COLORCODE_BACKGROUND => BACKGROUND,
        COLORCODE_DARK_GRAY | COLORCODE_MARKER_DARK_GRAY => DARK_GRAY,
        COLORCODE_GRAY | COLORCODE_MARKER_GRAY => GRAY,
        COLORCODE_WHITE => WHITE,
        other => other,
    }
}
