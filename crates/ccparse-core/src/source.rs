//! Text sources that turn a document on disk into raw text.

use std::fs;
use std::path::Path;

#[cfg(feature = "pdf")]
use tracing::debug;

use crate::error::SourceError;
use crate::models::config::SourceConfig;
#[cfg(feature = "pdf")]
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Result type for text source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Supplies raw, unnormalized text for a document.
pub trait TextSource: Send + Sync {
    /// Read the text of the document at `path`.
    fn document_text(&self, path: &Path) -> Result<String>;
}

/// Reads documents that already are plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn document_text(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }
}

/// Picks a text source by file extension.
#[derive(Debug, Clone, Default)]
pub struct FileTextSource {
    config: SourceConfig,
}

impl FileTextSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    #[cfg(feature = "pdf")]
    fn pdf_text(&self, path: &Path) -> Result<String> {
        let data = fs::read(path)?;
        let mut extractor = PdfExtractor::new()
            .with_empty_password(self.config.try_empty_password)
            .with_page_separator(self.config.page_separator.clone());
        extractor.load(&data)?;

        debug!("{} has {} pages", path.display(), extractor.page_count());
        extractor.extract_text()
    }

    #[cfg(not(feature = "pdf"))]
    fn pdf_text(&self, _path: &Path) -> Result<String> {
        Err(SourceError::UnsupportedFormat("pdf".to_string()))
    }
}

impl TextSource for FileTextSource {
    fn document_text(&self, path: &Path) -> Result<String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => self.pdf_text(path),
            "txt" | "text" => PlainTextSource.document_text(path),
            other => Err(SourceError::UnsupportedFormat(other.to_string())),
        }
    }
}
