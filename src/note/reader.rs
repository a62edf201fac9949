use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, RgbaImage};
use log::info;

use super::format::block::BlockReader;
use super::format::container;
use super::iter::RenderedPages;
use super::render::{compositor, pdf};
use super::types::error::{NoteError, Result};
use super::types::models::*;
use super::types::tags::TagMap;

/// File extension of notebook files.
pub const NOTE_EXTENSION: &str = "note";

/// A fully parsed notebook.
///
/// The whole metadata tree and every layer's compressed bitmap are loaded
/// when the notebook is opened; afterwards the notebook is read-only.
#[derive(Debug, Clone)]
pub struct Notebook {
    metadata: NoteMetadata,
    geometry: PageGeometry,
    file_stem: Option<String>,
}

impl Notebook {
    /// Opens a `.note` file with the default page geometry.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The path does not have a `.note` extension
    /// - The file cannot be read
    /// - Any block address is out of bounds or a required field is missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_geometry(path, PageGeometry::default())
    }

    /// Opens a `.note` file whose portrait pages measure `geometry`.
    pub fn open_with_geometry(path: impl AsRef<Path>, geometry: PageGeometry) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening notebook: {}", path.display());

        let extension = path.extension().and_then(|ext| ext.to_str());
        if extension != Some(NOTE_EXTENSION) {
            return Err(NoteError::MalformedFile(format!(
                "Incompatible file type {}, .{} expected",
                path.display(),
                NOTE_EXTENSION
            )));
        }

        let bytes = fs::read(path)?;
        let mut notebook = Self::from_bytes(bytes, geometry)?;
        notebook.file_stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
        Ok(notebook)
    }

    /// Parses a notebook already held in memory.
    pub fn from_bytes(bytes: Vec<u8>, geometry: PageGeometry) -> Result<Self> {
        let mut reader = BlockReader::from_bytes(bytes);
        let metadata = container::parse(&mut reader)?;
        Ok(Self {
            metadata,
            geometry,
            file_stem: None,
        })
    }

    /// The 4-byte file type marker, normally `note`.
    pub fn file_type(&self) -> &str {
        &self.metadata.file_type
    }

    pub fn signature(&self) -> &str {
        &self.metadata.signature
    }

    pub fn header(&self) -> &Header {
        &self.metadata.header
    }

    pub fn footer(&self) -> &Footer {
        &self.metadata.footer
    }

    pub fn keywords(&self) -> &[TagMap] {
        &self.metadata.footer.keywords
    }

    pub fn links(&self) -> &[TagMap] {
        &self.metadata.footer.links
    }

    pub fn metadata(&self) -> &NoteMetadata {
        &self.metadata
    }

    pub fn pages(&self) -> &[Page] {
        &self.metadata.pages
    }

    pub fn page(&self, index: usize) -> Result<&Page> {
        self.metadata.pages.get(index).ok_or(NoteError::PageOutOfRange {
            index,
            total: self.metadata.pages.len(),
        })
    }

    /// Portrait page size; horizontal pages swap it.
    pub fn page_geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn page_width(&self) -> u32 {
        self.geometry.width
    }

    pub fn page_height(&self) -> u32 {
        self.geometry.height
    }

    /// File name without extension, when opened from a path.
    pub fn file_stem(&self) -> Option<&str> {
        self.file_stem.as_deref()
    }

    /// Decodes and flattens one page.
    pub fn render_page(&self, index: usize) -> Result<RgbaImage> {
        compositor::composite_page(self.page(index)?, self.geometry)
    }

    /// Returns an iterator that renders pages one at a time, in file order.
    pub fn iter_rendered_pages(&self) -> RenderedPages<'_> {
        RenderedPages::new(self)
    }

    /// Renders every page to an opaque grayscale raster.
    pub fn render_pages(&self) -> Result<Vec<GrayImage>> {
        self.iter_rendered_pages()
            .map(|page| page.map(|image| compositor::to_page_raster(&image)))
            .collect()
    }

    /// Renders the notebook as a multi-page PDF document.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        let pages = self.render_pages()?;
        pdf::write_pdf(&pages)
    }

    pub fn export_pdf(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let document = self.to_pdf()?;
        fs::write(path, &document)?;
        info!(
            "Exported {} pages to {} ({} bytes)",
            self.metadata.pages.len(),
            path.display(),
            document.len()
        );
        Ok(())
    }

    /// Writes one PNG per page into `dir`, named `<stem>_<n>.png` from 1.
    ///
    /// Returns the written paths.
    pub fn export_png(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let stem = self.file_stem().unwrap_or("page");

        let mut written = Vec::with_capacity(self.metadata.pages.len());
        for (i, page) in self.iter_rendered_pages().enumerate() {
            let path = dir.join(format!("{}_{}.png", stem, i + 1));
            compositor::to_page_raster(&page?).save(&path)?;
            written.push(path);
        }
        info!("Exported {} PNG pages to {}", written.len(), dir.display());
        Ok(written)
    }

    /// Serializes the metadata tree as pretty-printed JSON.
    pub fn metadata_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.metadata)?)
    }

    pub fn export_metadata(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.metadata_json()?)?;
        Ok(())
    }
}
