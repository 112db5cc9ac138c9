//! PDF text extraction using lopdf and pdf-extract.

use std::any::Any;
use std::fmt::Display;
use std::panic::{self, UnwindSafe};

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::SourceError;

/// PDF text extractor.
///
/// lopdf validates the document and handles empty-password encryption;
/// pdf-extract produces the page text.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    try_empty_password: bool,
    page_separator: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            try_empty_password: true,
            page_separator: "\n".to_string(),
        }
    }

    /// Set whether encrypted PDFs are retried with an empty password.
    pub fn with_empty_password(mut self, enabled: bool) -> Self {
        self.try_empty_password = enabled;
        self
    }

    /// Set the text inserted between pages.
    pub fn with_page_separator(mut self, separator: impl Into<String>) -> Self {
        self.page_separator = separator.into();
        self
    }

    /// Extract text for every page, in page order.
    pub fn extract_pages(&self) -> Result<Vec<String>> {
        if self.document.is_none() {
            return Err(SourceError::Parse("No document loaded".to_string()));
        }

        let data = self.raw_data.as_slice();
        guarded(move || pdf_extract::extract_text_from_mem_by_pages(data))
    }

    /// Extract the whole document as one string.
    pub fn extract_document(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(SourceError::Parse("No document loaded".to_string()));
        }

        let data = self.raw_data.as_slice();
        guarded(move || pdf_extract::extract_text_from_mem(data))
    }
}

/// Run a pdf-extract call, turning both its errors and its panics into
/// [`SourceError::TextExtraction`].
///
/// pdf-extract panics on some documents lopdf loads fine (an unknown font
/// encoding name, for one).
fn guarded<T, E, F>(op: F) -> Result<T>
where
    E: Display,
    F: FnOnce() -> std::result::Result<T, E> + UnwindSafe,
{
    match panic::catch_unwind(op) {
        Ok(result) => result.map_err(|e| SourceError::TextExtraction(e.to_string())),
        Err(payload) => Err(SourceError::TextExtraction(format!(
            "pdf-extract panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| SourceError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if !self.try_empty_password || doc.decrypt("").is_err() {
                return Err(SourceError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the bytes again, so hand it the decrypted copy
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| SourceError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(SourceError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        match self.extract_pages() {
            Ok(pages) => Ok(pages.join(&self.page_separator)),
            Err(SourceError::TextExtraction(reason)) => {
                warn!("Per-page extraction failed ({}), extracting whole document", reason);
                self.extract_document()
            }
            Err(e) => Err(e),
        }
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let pages = self.extract_pages()?;
        let index = page
            .checked_sub(1)
            .ok_or(SourceError::InvalidPage(page))? as usize;

        pages
            .into_iter()
            .nth(index)
            .ok_or(SourceError::InvalidPage(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use lopdf::{dictionary, Object, ObjectId, Stream};
    use pretty_assertions::assert_eq;

    use crate::error::ExtractionIssue;
    use crate::models::record::FieldRecord;
    use crate::source::{FileTextSource, TextSource};
    use crate::statement::{BankRuleRegistry, BatchAggregator, StatementExtractor};

    /// Build a PDF with one page per entry, each line drawn in Helvetica.
    fn make_test_pdf(pages: &[&[&str]]) -> Vec<u8> {
        build_pdf(pages, None)
    }

    /// Same, with an `/Encoding` name on the font.
    fn build_pdf(pages: &[&[&str]], encoding: Option<&str>) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");

        let mut font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        };
        if let Some(encoding) = encoding {
            font.set("Encoding", Object::Name(encoding.as_bytes().to_vec()));
        }
        let font_id = doc.add_object(font);

        let page_ids: Vec<ObjectId> = pages
            .iter()
            .map(|lines| {
                let mut content = String::from("BT /F1 12 Tf 72 720 Td 14 TL");
                for line in lines.iter() {
                    content.push_str(&format!(" ({}) Tj T*", line));
                }
                content.push_str(" ET");
                let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                    "Contents" => content_id,
                    "Resources" => dictionary! {
                        "Font" => dictionary! { "F1" => font_id },
                    },
                })
            })
            .collect();

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|&id| id.into()).collect::<Vec<Object>>(),
            "Count" => page_ids.len() as i64,
        });

        for &page_id in &page_ids {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
                dict.set("Parent", pages_id);
            }
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.extract_text().is_err());
    }

    #[test]
    fn test_invalid_pdf_is_parse_error() {
        let mut extractor = PdfExtractor::new();
        let result = extractor.load(b"not a pdf");
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_extract_statement_text() {
        let data = make_test_pdf(&[&["HDFC Bank", "Card Holder: Jane Doe"]]);
        let mut extractor = PdfExtractor::new();
        extractor.load(&data).unwrap();

        assert_eq!(extractor.page_count(), 1);
        let text = extractor.extract_text().unwrap();
        assert!(text.contains("Bank"), "unexpected text: {text}");
    }

    #[test]
    fn test_page_zero_is_invalid() {
        let data = make_test_pdf(&[&["SBI Card"]]);
        let mut extractor = PdfExtractor::new();
        extractor.load(&data).unwrap();

        assert!(matches!(
            extractor.extract_page_text(0),
            Err(SourceError::InvalidPage(0))
        ));
        assert!(matches!(
            extractor.extract_page_text(2),
            Err(SourceError::InvalidPage(2))
        ));
    }

    #[test]
    fn test_unknown_encoding_is_extraction_error() {
        let data = build_pdf(&[&["HDFC Bank"]], Some("FooEncoding"));
        let mut extractor = PdfExtractor::new();
        extractor.load(&data).unwrap();

        assert!(matches!(
            extractor.extract_pages(),
            Err(SourceError::TextExtraction(_))
        ));
        // the whole-document fallback fails the same way
        assert!(matches!(
            extractor.extract_text(),
            Err(SourceError::TextExtraction(_))
        ));
    }

    #[test]
    fn test_value_split_across_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.pdf");
        let data = make_test_pdf(&[
            &["HDFC Bank", "Card Holder: Jane Doe", "Payment Due Date:"],
            &["25 Oct 2025", "Total Amount Due: 5,000.00"],
        ]);
        fs::write(&path, data).unwrap();

        let mut extractor = PdfExtractor::new();
        extractor.load(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(extractor.page_count(), 2);
        assert_eq!(extractor.extract_pages().unwrap().len(), 2);

        let raw = FileTextSource::default().document_text(&path).unwrap();
        let statements = StatementExtractor::new(BankRuleRegistry::builtin().unwrap());
        let record = statements.extract_text(&raw).record;

        assert_eq!(record.bank, "HDFC Bank");
        assert_eq!(record.payment_due_date.as_deref(), Some("25 Oct 2025"));
    }

    #[test]
    fn test_broken_pdf_keeps_its_row_in_batch() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.txt");
        let broken = dir.path().join("b.pdf");
        let last = dir.path().join("c.txt");
        fs::write(&first, "SBI Card Card Holder: Asha Rao Card Number: 1111").unwrap();
        fs::write(&broken, build_pdf(&[&["Axis Bank"]], Some("FooEncoding"))).unwrap();
        fs::write(&last, "Axis Bank Card Holder: Dev Shah Card Number: 2222").unwrap();
        let paths = [first, broken, last];

        let extractor = StatementExtractor::new(BankRuleRegistry::builtin().unwrap());
        for jobs in [1, 2] {
            let extractions = BatchAggregator::new(&extractor)
                .with_jobs(jobs)
                .process_all_with(&paths, |_, _| {});

            assert_eq!(extractions.len(), 3);
            assert_eq!(extractions[0].record.bank, "SBI Card");
            assert_eq!(extractions[1].record, FieldRecord::unknown());
            assert!(matches!(
                extractions[1].issues.as_slice(),
                [ExtractionIssue::SourceUnavailable(_)]
            ));
            assert_eq!(extractions[2].record.bank, "Axis Bank");
        }
    }
}
