//! Data models for statement records and configuration.

pub mod config;
pub mod record;

pub use config::CcparseConfig;
pub use record::{FieldName, FieldRecord, RECORD_COLUMNS, UNKNOWN_BANK};
