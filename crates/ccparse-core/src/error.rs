//! Error types for the ccparse-core library.

use std::fmt;

use thiserror::Error;

/// Main error type for the ccparse library.
#[derive(Error, Debug)]
pub enum CcparseError {
    /// Bank rule registry error.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by a text source while reading a document.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The document could not be read from disk.
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to open/parse the document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Failed to extract text from the document.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// No text source handles this kind of file.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
}

/// Errors detected while building and validating the bank rule registry.
///
/// These are the only fatal errors in the pipeline and surface before any
/// document is processed.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A field pattern failed to compile.
    #[error("invalid pattern for {bank}/{field}: {source}")]
    InvalidPattern {
        bank: String,
        field: String,
        #[source]
        source: regex::Error,
    },

    /// A field pattern has no capture group to take the value from.
    #[error("pattern for {bank}/{field} has no capture group")]
    NoCaptureGroup { bank: String, field: String },

    /// A bank entry does not define one of the required fields.
    #[error("bank {bank} is missing a pattern for {field}")]
    MissingField { bank: String, field: String },

    /// A bank entry defines a field outside the fixed schema.
    #[error("bank {bank} defines unknown field {field}")]
    UnknownField { bank: String, field: String },

    /// The same bank identifier appears twice.
    #[error("duplicate bank identifier: {0}")]
    DuplicateBank(String),

    /// A bank identifier is empty or whitespace.
    #[error("bank identifier must not be empty")]
    EmptyBankName,

    /// The registry contains no banks at all.
    #[error("registry contains no banks")]
    Empty,

    /// A rules file could not be read or decoded.
    #[error("failed to load rules file: {0}")]
    RulesFile(String),
}

/// Non-fatal problems reported while extracting a single document.
///
/// None of these abort a document or a batch; they degrade the record and
/// are surfaced so callers can flag documents for review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionIssue {
    /// The text source failed for this document.
    SourceUnavailable(String),
    /// The text was empty after normalization.
    EmptyText,
    /// No bank identifier was found in the text.
    BankUnidentified,
    /// A field pattern of the detected bank did not match.
    FieldUnmatched { bank: String, field: String },
}

impl fmt::Display for ExtractionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionIssue::SourceUnavailable(reason) => {
                write!(f, "text source unavailable: {}", reason)
            }
            ExtractionIssue::EmptyText => write!(f, "document text is empty"),
            ExtractionIssue::BankUnidentified => write!(f, "could not detect bank"),
            ExtractionIssue::FieldUnmatched { bank, field } => {
                write!(f, "{} pattern for {} did not match", bank, field)
            }
        }
    }
}

/// Result type for the ccparse library.
pub type Result<T> = std::result::Result<T, CcparseError>;
