//! Structured result for one credit card statement.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bank label used when no registry entry matched the document.
pub const UNKNOWN_BANK: &str = "Unknown";

/// The fixed set of fields every bank rule set must extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    CardHolder,
    #[serde(rename = "last_4_digits")]
    Last4Digits,
    BillingCycle,
    PaymentDueDate,
    TotalOutstandingBalance,
}

impl FieldName {
    /// All fields, in export column order.
    pub const ALL: [FieldName; 5] = [
        FieldName::CardHolder,
        FieldName::Last4Digits,
        FieldName::BillingCycle,
        FieldName::PaymentDueDate,
        FieldName::TotalOutstandingBalance,
    ];

    /// Stable name used in rules files and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::CardHolder => "card_holder",
            FieldName::Last4Digits => "last_4_digits",
            FieldName::BillingCycle => "billing_cycle",
            FieldName::PaymentDueDate => "payment_due_date",
            FieldName::TotalOutstandingBalance => "total_outstanding_balance",
        }
    }

    /// Human-readable column title for reports.
    pub fn title(&self) -> &'static str {
        match self {
            FieldName::CardHolder => "Card Holder",
            FieldName::Last4Digits => "Last 4 Digits",
            FieldName::BillingCycle => "Billing Cycle",
            FieldName::PaymentDueDate => "Due Date",
            FieldName::TotalOutstandingBalance => "Total Due",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown field: {}", s))
    }
}

/// Column names of an exported record, in order.
pub const RECORD_COLUMNS: [&str; 6] = [
    "bank",
    "card_holder",
    "last_4_digits",
    "billing_cycle",
    "payment_due_date",
    "total_outstanding_balance",
];

/// Extracted fields for one statement.
///
/// Absent fields are `None`, which serializes as `null` in JSON and as an
/// empty cell in CSV. A present field may still be an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    /// Detected bank identifier, or [`UNKNOWN_BANK`].
    pub bank: String,
    pub card_holder: Option<String>,
    pub last_4_digits: Option<String>,
    pub billing_cycle: Option<String>,
    pub payment_due_date: Option<String>,
    pub total_outstanding_balance: Option<String>,
}

impl FieldRecord {
    /// A record for a document whose bank could not be identified.
    pub fn unknown() -> Self {
        Self::for_bank(UNKNOWN_BANK)
    }

    /// An empty record attributed to the given bank.
    pub fn for_bank(bank: impl Into<String>) -> Self {
        Self {
            bank: bank.into(),
            card_holder: None,
            last_4_digits: None,
            billing_cycle: None,
            payment_due_date: None,
            total_outstanding_balance: None,
        }
    }

    /// Whether the bank was identified.
    pub fn is_known_bank(&self) -> bool {
        self.bank != UNKNOWN_BANK
    }

    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: FieldName, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    /// Whether every field was extracted.
    pub fn is_complete(&self) -> bool {
        self.is_known_bank() && self.missing_fields().is_empty()
    }

    /// Fields that were not found, in column order.
    pub fn missing_fields(&self) -> Vec<FieldName> {
        FieldName::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    /// Outstanding balance as a decimal, with thousands separators removed.
    pub fn balance_amount(&self) -> Option<Decimal> {
        let raw = self.total_outstanding_balance.as_deref()?;
        raw.replace(',', "").trim().parse().ok()
    }

    /// Record values in [`RECORD_COLUMNS`] order.
    pub fn values(&self) -> [Option<&str>; 6] {
        [
            Some(self.bank.as_str()),
            self.card_holder.as_deref(),
            self.last_4_digits.as_deref(),
            self.billing_cycle.as_deref(),
            self.payment_due_date.as_deref(),
            self.total_outstanding_balance.as_deref(),
        ]
    }

    fn slot(&self, field: FieldName) -> &Option<String> {
        match field {
            FieldName::CardHolder => &self.card_holder,
            FieldName::Last4Digits => &self.last_4_digits,
            FieldName::BillingCycle => &self.billing_cycle,
            FieldName::PaymentDueDate => &self.payment_due_date,
            FieldName::TotalOutstandingBalance => &self.total_outstanding_balance,
        }
    }

    fn slot_mut(&mut self, field: FieldName) -> &mut Option<String> {
        match field {
            FieldName::CardHolder => &mut self.card_holder,
            FieldName::Last4Digits => &mut self.last_4_digits,
            FieldName::BillingCycle => &mut self.billing_cycle,
            FieldName::PaymentDueDate => &mut self.payment_due_date,
            FieldName::TotalOutstandingBalance => &mut self.total_outstanding_balance,
        }
    }
}

impl Default for FieldRecord {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_names_round_trip() {
        for field in FieldName::ALL {
            assert_eq!(field.as_str().parse::<FieldName>(), Ok(field));
        }
        assert!("due_date".parse::<FieldName>().is_err());
    }

    #[test]
    fn test_columns_match_fields() {
        let names: Vec<&str> = FieldName::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(&RECORD_COLUMNS[1..], names.as_slice());
    }

    #[test]
    fn test_absent_differs_from_empty() {
        let mut record = FieldRecord::for_bank("HDFC Bank");
        record.set(FieldName::CardHolder, Some(String::new()));

        assert_eq!(record.get(FieldName::CardHolder), Some(""));
        assert_eq!(record.get(FieldName::PaymentDueDate), None);
        assert!(!record.missing_fields().contains(&FieldName::CardHolder));
    }

    #[test]
    fn test_unknown_record() {
        let record = FieldRecord::unknown();
        assert!(!record.is_known_bank());
        assert!(!record.is_complete());
        assert_eq!(record.missing_fields().len(), 5);
    }

    #[test]
    fn test_balance_amount() {
        let mut record = FieldRecord::for_bank("SBI Card");
        record.total_outstanding_balance = Some("1,25,000.50".to_string());
        assert_eq!(record.balance_amount(), Some(Decimal::new(12500050, 2)));

        record.total_outstanding_balance = None;
        assert_eq!(record.balance_amount(), None);
    }

    #[test]
    fn test_json_keeps_null_fields() {
        let record = FieldRecord::unknown();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["bank"], "Unknown");
        assert!(json["payment_due_date"].is_null());
    }
}
