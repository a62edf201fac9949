//! Multi-page PDF output.
//!
//! Each page becomes one grayscale image XObject, Flate-compressed, drawn
//! over the full media box. The media box is the pixel size at
//! [`RESOLUTION_DPI`].

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::GrayImage;
use log::debug;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};

use crate::note::types::error::Result;

/// Pixels per inch used to size pages.
pub const RESOLUTION_DPI: f32 = 100.0;

const POINTS_PER_INCH: f32 = 72.0;
const COMPRESSION_LEVEL: u32 = 6;
const IMAGE_NAME: Name<'static> = Name(b"Im0");

/// Zlib-compresses `data` for a `FlateDecode` stream.
pub(crate) fn deflate_encode(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(COMPRESSION_LEVEL));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn to_points(pixels: u32) -> f32 {
    pixels as f32 * POINTS_PER_INCH / RESOLUTION_DPI
}

/// Writes `pages` as consecutive pages of one PDF document.
pub fn write_pdf(pages: &[GrayImage]) -> Result<Vec<u8>> {
    let mut pdf = Pdf::new();
    let mut next_ref = Ref::new(1);

    let catalog_id = next_ref.bump();
    let page_tree_id = next_ref.bump();
    pdf.catalog(catalog_id).pages(page_tree_id);

    let mut page_ids = Vec::with_capacity(pages.len());
    for raster in pages {
        let page_id = next_ref.bump();
        let image_id = next_ref.bump();
        let content_id = next_ref.bump();
        page_ids.push(page_id);

        let (width, height) = (to_points(raster.width()), to_points(raster.height()));

        let encoded = deflate_encode(raster.as_raw())?;
        let mut image = pdf.image_xobject(image_id, &encoded);
        image.filter(Filter::FlateDecode);
        image.width(raster.width() as i32);
        image.height(raster.height() as i32);
        image.color_space().device_gray();
        image.bits_per_component(8);
        image.finish();

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, width, height));
        page.parent(page_tree_id);
        page.contents(content_id);
        page.resources().x_objects().pair(IMAGE_NAME, image_id);
        page.finish();

        let mut content = Content::new();
        content.save_state();
        content.transform([width, 0.0, 0.0, height, 0.0, 0.0]);
        content.x_object(IMAGE_NAME);
        content.restore_state();
        pdf.stream(content_id, content.finish().as_slice());

        debug!(
            "PDF page {}: {}x{} px, {} compressed bytes",
            page_ids.len(),
            raster.width(),
            raster.height(),
            encoded.len()
        );
    }

    let count = page_ids.len() as i32;
    pdf.pages(page_tree_id).kids(page_ids).count(count);

    Ok(pdf.finish())
}
