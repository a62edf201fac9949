//! Layer compositing.
//!
//! Every layer decodes to a full-page grayscale bitmap. Foreground layers
//! get an alpha channel in which background pixels are transparent, then
//! all layers of a page are painted bottom to top onto the first one.

use image::{DynamicImage, GrayImage, Rgba, RgbaImage};
use log::debug;

use crate::note::codec::{colormap, rle};
use crate::note::types::error::{NoteError, Result};
use crate::note::types::models::{Page, PageGeometry};

const TRANSPARENT: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0x00]);
const BLANK: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

/// Wraps a decoded bitmap as an image of the given page size.
///
/// Background layers stay single-channel; other layers become RGBA with
/// every [`colormap::BACKGROUND`] pixel transparent.
pub fn layer_image(bitmap: Vec<u8>, geometry: PageGeometry, background: bool) -> Result<DynamicImage> {
    let actual = bitmap.len() as u64;
    let gray = GrayImage::from_raw(geometry.width, geometry.height, bitmap).ok_or(
        NoteError::DecodeLengthMismatch {
            expected: geometry.area(),
            actual,
        },
    )?;

    if background {
        Ok(DynamicImage::ImageLuma8(gray))
    } else {
        Ok(DynamicImage::ImageRgba8(make_transparent(&gray)))
    }
}

/// Converts a grayscale layer to RGBA, masking out background pixels.
pub fn make_transparent(gray: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y).0[0];
        if value == colormap::BACKGROUND {
            TRANSPARENT
        } else {
            Rgba([value, value, value, 0xFF])
        }
    })
}

/// Paints `layer` over `canvas`, using the layer's own alpha as mask.
///
/// Layer alpha is binary, so painting is a masked copy.
fn paint_over(canvas: &mut RgbaImage, layer: &RgbaImage) {
    for (dst, src) in canvas.pixels_mut().zip(layer.pixels()) {
        if src.0[3] != 0 {
            *dst = *src;
        }
    }
}

/// Flattens layers given bottom first. Returns `None` for an empty slice.
pub fn flatten(layers: &[DynamicImage]) -> Option<RgbaImage> {
    let (base, rest) = layers.split_first()?;
    let mut canvas = base.to_rgba8();
    for layer in rest {
        paint_over(&mut canvas, &layer.to_rgba8());
    }
    Some(canvas)
}

/// Decodes and flattens every layer of `page`.
///
/// `geometry` is the portrait page size; it is swapped here for horizontal
/// pages. A page without layers renders blank.
pub fn composite_page(page: &Page, geometry: PageGeometry) -> Result<RgbaImage> {
    let geometry = geometry.for_orientation(page.orientation);

    let mut images = page
        .layers
        .iter()
        .map(|layer| {
            let bitmap = rle::decode(&layer.content, geometry.width, geometry.height)?;
            layer_image(bitmap, geometry, layer.is_background())
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .map(Some)
        .collect::<Vec<_>>();

    let ordered = page
        .draw_order()
        .into_iter()
        .filter_map(|i| images[i].take())
        .collect::<Vec<_>>();

    debug!(
        "Compositing page {:?}: {} layers at {}x{}",
        page.page_id,
        ordered.len(),
        geometry.width,
        geometry.height
    );

    Ok(flatten(&ordered)
        .unwrap_or_else(|| RgbaImage::from_pixel(geometry.width, geometry.height, BLANK)))
}

/// Drops the alpha channel of a flattened page.
///
/// All channels of a composited pixel hold the same gray level, and pixels
/// left transparent carry the background value, so they come out white.
pub fn to_page_raster(page: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(page.width(), page.height(), |x, y| {
        image::Luma([page.get_pixel(x, y).0[0]])
    })
}
