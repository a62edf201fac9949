//! Lazy page rendering.
//!
//! Decoding a page allocates one full-page buffer per layer, so rendering
//! page by page keeps memory bounded by the largest page rather than the
//! whole notebook.
//!
//! # Example
//! ```no_run
//! # use supernote_reader::Notebook;
//! # let notebook = Notebook::open("journal.note").unwrap();
//! for (i, page) in notebook.iter_rendered_pages().enumerate() {
//!     let image = page.unwrap();
//!     println!("page {}: {}x{}", i + 1, image.width(), image.height());
//! }
//! ```

use image::RgbaImage;

use super::reader::Notebook;
use super::render::compositor;
use super::types::error::Result;

/// Iterator over flattened page images in file order.
///
/// Created by [`Notebook::iter_rendered_pages()`](crate::Notebook::iter_rendered_pages).
pub struct RenderedPages<'a> {
    notebook: &'a Notebook,
    page_idx: usize,
}

impl<'a> RenderedPages<'a> {
    pub(super) fn new(notebook: &'a Notebook) -> Self {
        Self {
            notebook,
            page_idx: 0,
        }
    }
}

impl Iterator for RenderedPages<'_> {
    type Item = Result<RgbaImage>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.notebook.pages().get(self.page_idx)?;
        self.page_idx += 1;
        Some(compositor::composite_page(page, self.notebook.page_geometry()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.notebook.pages().len() - self.page_idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RenderedPages<'_> {}
