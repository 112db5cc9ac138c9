//! Per-document statement extraction.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::normalize::normalize_text;
use super::registry::BankRuleRegistry;
use crate::error::ExtractionIssue;
use crate::models::record::FieldRecord;
use crate::source::{FileTextSource, TextSource};

/// Result of extracting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Extracted fields.
    pub record: FieldRecord,
    /// Problems met along the way, in the order they occurred.
    pub issues: Vec<ExtractionIssue>,
    /// Length of the normalized text in characters.
    pub text_length: usize,
}

impl Extraction {
    fn degraded(issue: ExtractionIssue) -> Self {
        Self {
            record: FieldRecord::unknown(),
            issues: vec![issue],
            text_length: 0,
        }
    }

    /// Whether the document should be looked at by a person.
    pub fn needs_review(&self) -> bool {
        !self.record.is_complete()
    }
}

/// Trait for statement parsing.
pub trait StatementParser {
    /// Parse the document at `path`. Never fails; problems degrade the record.
    fn parse(&self, path: &Path) -> FieldRecord;
}

/// Identifies the issuing bank and applies its patterns.
pub struct StatementExtractor<S = FileTextSource> {
    registry: BankRuleRegistry,
    source: S,
}

impl StatementExtractor<FileTextSource> {
    /// Create an extractor reading documents through [`FileTextSource`].
    pub fn new(registry: BankRuleRegistry) -> Self {
        Self::with_source(registry, FileTextSource::default())
    }
}

impl<S: TextSource> StatementExtractor<S> {
    /// Create an extractor with a custom text source.
    pub fn with_source(registry: BankRuleRegistry, source: S) -> Self {
        Self { registry, source }
    }

    pub fn registry(&self) -> &BankRuleRegistry {
        &self.registry
    }

    /// Read, normalize and extract one document.
    pub fn extract(&self, path: &Path) -> Extraction {
        let start = Instant::now();

        let raw = match self.source.document_text(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                return Extraction::degraded(ExtractionIssue::SourceUnavailable(e.to_string()));
            }
        };

        let extraction = self.extract_text(&raw);
        if extraction.issues.contains(&ExtractionIssue::BankUnidentified) {
            warn!("Could not detect bank in {}", path.display());
        }

        debug!(
            "Extracted {} in {}ms ({} issues)",
            path.display(),
            start.elapsed().as_millis(),
            extraction.issues.len()
        );
        extraction
    }

    /// Normalize raw text and extract a record from it.
    pub fn extract_text(&self, raw: &str) -> Extraction {
        let text = normalize_text(raw);
        if text.is_empty() {
            return Extraction::degraded(ExtractionIssue::EmptyText);
        }

        let text_length = text.chars().count();
        info!("Parsing statement from {} characters of text", text_length);

        let Some((bank, patterns)) = self.registry.lookup(&text) else {
            return Extraction {
                record: FieldRecord::unknown(),
                issues: vec![ExtractionIssue::BankUnidentified],
                text_length,
            };
        };

        let mut record = FieldRecord::for_bank(bank);
        let mut issues = Vec::new();

        for field in patterns.fields() {
            let value = patterns.extract(field, &text);
            if value.is_none() {
                debug!("{} pattern for {} did not match", bank, field);
                issues.push(ExtractionIssue::FieldUnmatched {
                    bank: bank.to_string(),
                    field: field.as_str().to_string(),
                });
            }
            record.set(field, value);
        }

        Extraction {
            record,
            issues,
            text_length,
        }
    }

    /// Bank identifier found in already normalized text.
    pub fn detect_bank(&self, text: &str) -> Option<&str> {
        self.registry.lookup(text).map(|(bank, _)| bank)
    }
}

impl<S: TextSource> StatementParser for StatementExtractor<S> {
    fn parse(&self, path: &Path) -> FieldRecord {
        self.extract(path).record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::models::record::FieldName;
    use pretty_assertions::assert_eq;

    const HDFC_SAMPLE: &str = "HDFC Bank Card Holder: Jane Doe Card Number: XXXX-XXXX-XXXX-1234 \
        Statement Period: 01 Sep 2025 Payment Due Date: 25 Oct 2025 Total Amount Due: INR 5,000.00";

    struct FailingSource;

    impl TextSource for FailingSource {
        fn document_text(&self, _path: &Path) -> crate::source::Result<String> {
            Err(SourceError::Encrypted)
        }
    }

    fn extractor() -> StatementExtractor {
        StatementExtractor::new(BankRuleRegistry::builtin().unwrap())
    }

    #[test]
    fn test_full_hdfc_statement() {
        let extraction = extractor().extract_text(HDFC_SAMPLE);

        let expected = FieldRecord {
            bank: "HDFC Bank".to_string(),
            card_holder: Some("Jane Doe".to_string()),
            last_4_digits: Some("1234".to_string()),
            billing_cycle: Some("01 Sep 2025".to_string()),
            payment_due_date: Some("25 Oct 2025".to_string()),
            total_outstanding_balance: Some("5,000.00".to_string()),
        };
        assert_eq!(extraction.record, expected);
        assert!(extraction.issues.is_empty());
        assert!(!extraction.needs_review());
    }

    #[test]
    fn test_multiline_layout() {
        let raw = "ICICI BANK\nCredit Card Statement\n\nCard Holder:\n  Ravi Kumar\nCard Number: 4321\n\
                   Billing Cycle - 5 Aug 2025 to 4 Sep 2025\nPayment Due Date 20 Sep 2025\n\
                   Total Amount Due: ₹ 12,345.67\n";
        let record = extractor().extract_text(raw).record;

        assert_eq!(record.bank, "ICICI Bank");
        assert_eq!(record.card_holder.as_deref(), Some("Ravi Kumar"));
        assert_eq!(record.last_4_digits.as_deref(), Some("4321"));
        assert_eq!(record.billing_cycle.as_deref(), Some("5 Aug 2025"));
        assert_eq!(record.payment_due_date.as_deref(), Some("20 Sep 2025"));
        assert_eq!(record.total_outstanding_balance.as_deref(), Some("12,345.67"));
    }

    #[test]
    fn test_missing_due_date_is_partial() {
        let text = HDFC_SAMPLE.replace("Payment Due Date: 25 Oct 2025 ", "");
        let extraction = extractor().extract_text(&text);

        assert_eq!(extraction.record.bank, "HDFC Bank");
        assert_eq!(extraction.record.payment_due_date, None);
        assert_eq!(extraction.record.card_holder.as_deref(), Some("Jane Doe"));
        assert_eq!(extraction.record.total_outstanding_balance.as_deref(), Some("5,000.00"));
        assert_eq!(extraction.record.missing_fields(), vec![FieldName::PaymentDueDate]);
        assert_eq!(
            extraction.issues,
            vec![ExtractionIssue::FieldUnmatched {
                bank: "HDFC Bank".to_string(),
                field: "payment_due_date".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_bank() {
        let extraction = extractor().extract_text("Kotak Mahindra Card Holder: A Card Number: 1111");
        assert_eq!(extraction.record, FieldRecord::unknown());
        assert_eq!(extraction.issues, vec![ExtractionIssue::BankUnidentified]);
    }

    #[test]
    fn test_empty_and_whitespace_text() {
        for raw in ["", "   \n\t  "] {
            let extraction = extractor().extract_text(raw);
            assert_eq!(extraction.record, FieldRecord::unknown());
            assert_eq!(extraction.issues, vec![ExtractionIssue::EmptyText]);
        }
    }

    #[test]
    fn test_text_length_counts_characters() {
        let extraction = extractor().extract_text("  SBI Card\n Total Amount Due: ₹ 10.00 ");
        assert_eq!(extraction.text_length, "SBI Card Total Amount Due: ₹ 10.00".chars().count());
        assert_eq!(extraction.text_length, 34);
        assert_eq!(extractor().extract_text(" \n ").text_length, 0);
    }

    #[test]
    fn test_empty_document_is_not_reported_as_unidentified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "\n\n").unwrap();

        let extraction = extractor().extract(&path);
        assert_eq!(extraction.issues, vec![ExtractionIssue::EmptyText]);
        assert!(!extraction.issues.contains(&ExtractionIssue::BankUnidentified));
    }

    #[test]
    fn test_tie_break_uses_registry_order() {
        let text = "Canara Bank statement. Autopay from SBI Card. Card Holder: X Y Card Number: 9999";
        assert_eq!(extractor().extract_text(text).record.bank, "SBI Card");
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let extractor = extractor();
        assert_eq!(extractor.extract_text(HDFC_SAMPLE), extractor.extract_text(HDFC_SAMPLE));
    }

    #[test]
    fn test_source_failure_degrades() {
        let extractor =
            StatementExtractor::with_source(BankRuleRegistry::builtin().unwrap(), FailingSource);
        let extraction = extractor.extract(Path::new("locked.pdf"));

        assert_eq!(extraction.record, FieldRecord::unknown());
        assert!(matches!(
            extraction.issues.as_slice(),
            [ExtractionIssue::SourceUnavailable(_)]
        ));
        assert_eq!(extractor.parse(Path::new("locked.pdf")), FieldRecord::unknown());
    }

    #[test]
    fn test_detect_bank() {
        let extractor = extractor();
        assert_eq!(extractor.detect_bank("axis bank ltd"), Some("Axis Bank"));
        assert_eq!(extractor.detect_bank("no issuer"), None);
    }
}
