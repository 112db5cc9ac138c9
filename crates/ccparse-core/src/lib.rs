//! Core library for credit card statement parsing.
//!
//! This crate provides:
//! - Text sources for PDF and plain-text statements
//! - An ordered, validated registry of per-bank field patterns
//! - Bank detection and field extraction into a [`FieldRecord`]
//! - Order-preserving batch processing

pub mod error;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod source;
pub mod statement;

pub use error::{CcparseError, ExtractionIssue, RegistryError, Result, SourceError};
pub use models::config::CcparseConfig;
pub use models::record::{FieldName, FieldRecord, RECORD_COLUMNS, UNKNOWN_BANK};
#[cfg(feature = "pdf")]
pub use pdf::{PdfExtractor, PdfProcessor};
pub use source::{FileTextSource, PlainTextSource, TextSource};
pub use statement::{
    BankRuleRegistry, BankSpec, BatchAggregator, Extraction, PatternSet, StatementExtractor,
    StatementParser,
};
