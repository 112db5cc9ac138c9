//! Credit card statement field extraction.

mod aggregator;
mod extractor;
pub mod normalize;
pub mod patterns;
pub mod registry;

pub use aggregator::BatchAggregator;
pub use extractor::{Extraction, StatementExtractor, StatementParser};
pub use normalize::normalize_text;
pub use registry::{BankRuleRegistry, BankSpec, PatternSet};
