use std::path::{Path, PathBuf};

use lopdf::content::Content;
use lopdf::{Document, ObjectId};
use tracing::debug;

use crate::extractor::ExtractError;
use crate::layout;

/// Anything that can hand out page text in document order.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text of the zero-based page `index`, one rendered line per text line.
    fn page_text(&self, index: usize) -> Result<String, ExtractError>;
}

pub struct PdfDocument {
    path: PathBuf,
    doc: Document,
    pages: Vec<ObjectId>,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let doc = Document::load(path).map_err(|source| ExtractError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        debug!(path = %path.display(), pages = pages.len(), "loaded pdf");
        Ok(PdfDocument {
            path: path.to_path_buf(),
            doc,
            pages,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Rows come out top to bottom; runs drawn apart on the page keep a gap
    /// of spaces proportional to their horizontal distance.
    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        let page = index + 1;
        let id = self
            .pages
            .get(index)
            .copied()
            .ok_or(ExtractError::NoSuchPage { page })?;
        let content = self
            .doc
            .get_page_content(id)
            .and_then(|raw| Content::decode(&raw))
            .map_err(|source| ExtractError::PageText { page, source })?;
        Ok(layout::render_page(&content))
    }
}

impl<S: AsRef<str>> PageSource for [S] {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        self.get(index)
            .map(|p| p.as_ref().to_string())
            .ok_or(ExtractError::NoSuchPage { page: index + 1 })
    }
}
