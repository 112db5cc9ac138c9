//! Builtin bank identifiers and field patterns.
//!
//! Patterns are compiled case-insensitively by the registry. Each one must
//! carry the field value in capture group 1.

use lazy_static::lazy_static;
use regex::Regex;

/// Builtin banks, in detection order.
pub const BUILTIN_BANKS: [&str; 5] = [
    "HDFC Bank",
    "ICICI Bank",
    "SBI Card",
    "Axis Bank",
    "Canara Bank",
];

pub const CARD_HOLDER: &str = r"Card Holder\s*[:\-]?\s*([A-Za-z ]+?)\s*Card Number";

pub const LAST_4_DIGITS: &str = r"Card Number\s*[:\-]?\s*(?:XXXX-XXXX-XXXX-)?(\d{4})";

pub const BILLING_CYCLE: &str =
    r"(?:Statement Period|Billing Cycle)\s*[:\-]?\s*(\d{1,2}\s\w+\s\d{4})";

pub const PAYMENT_DUE_DATE: &str = r"Payment Due Date\s*[:\-]?\s*(\d{1,2}\s\w+\s\d{4})";

pub const TOTAL_OUTSTANDING_BALANCE: &str =
    r"Total Amount Due\s*[:\-]?\s*(?:INR|₹)?\s*([\d,]+\.\d{2})";

lazy_static! {
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}
