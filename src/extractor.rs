use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::parser::lines::ParseError;
use crate::parser::pipeline_lines;
use crate::parser::table::VocabTable;
use crate::parser::tokens::DEFAULT_FIELD_SEPARATOR;
use crate::pdf::{PageSource, PdfDocument};
use crate::settings::{EmptyPages, Settings};

/// Page numbers in these errors are 1-based, as printed in a PDF viewer.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to open {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
    #[error("failed to extract text from page {page}")]
    PageText {
        page: usize,
        #[source]
        source: lopdf::Error,
    },
    #[error("page {page} does not exist")]
    NoSuchPage { page: usize },
    #[error("page {page} has no numbered entries")]
    EmptyPage { page: usize },
    #[error("malformed entries on page {page}")]
    Parse {
        page: usize,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Clone)]
pub struct VocabExtractor {
    header: Option<String>,
    separator: String,
    empty_pages: EmptyPages,
}

impl VocabExtractor {
    pub fn new(settings: &Settings) -> Self {
        let separator = if settings.separator.is_empty() {
            warn!("empty field separator, using the default");
            DEFAULT_FIELD_SEPARATOR.to_string()
        } else {
            settings.separator.clone()
        };
        VocabExtractor {
            header: settings.header.clone().filter(|h| !h.is_empty()),
            separator,
            empty_pages: settings.empty_pages,
        }
    }

    pub fn extract_from_pdf(&self, path: &Path) -> Result<VocabTable, ExtractError> {
        let doc = PdfDocument::open(path)?;
        info!(path = %doc.path().display(), pages = doc.page_count(), "extracting vocabulary");
        self.extract_pages(&doc, |_| {})
    }

    /// Run every page through the pipeline in order, then drop the running
    /// header rows. `on_page` is called with the 1-based page number after
    /// each page.
    pub fn extract_pages<S, F>(&self, source: &S, mut on_page: F) -> Result<VocabTable, ExtractError>
    where
        S: PageSource + ?Sized,
        F: FnMut(usize),
    {
        let mut tables = Vec::with_capacity(source.page_count());
        for index in 0..source.page_count() {
            let page = index + 1;
            let text = source.page_text(index)?;
            match pipeline_lines(&text, &self.separator) {
                Ok(table) => {
                    debug!(page, rows = table.len(), "page parsed");
                    tables.push(table);
                }
                Err(ParseError::NoEntries) => match self.empty_pages {
                    EmptyPages::Fail => return Err(ExtractError::EmptyPage { page }),
                    EmptyPages::Skip => warn!(page, "no numbered entries, skipping page"),
                },
                Err(source) => return Err(ExtractError::Parse { page, source }),
            }
            on_page(page);
        }

        let mut table = VocabTable::concat(tables);
        if let Some(header) = &self.header {
            let dropped = table.drop_header(header);
            debug!(header = header.as_str(), dropped, "dropped running header rows");
        }
        info!(rows = table.len(), "extraction finished");
        Ok(table)
    }
}
