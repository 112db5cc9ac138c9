//! Ordered registry of per-bank field patterns.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patterns::{
    BILLING_CYCLE, BUILTIN_BANKS, CARD_HOLDER, LAST_4_DIGITS, PAYMENT_DUE_DATE,
    TOTAL_OUTSTANDING_BALANCE,
};
use crate::error::RegistryError;
use crate::models::record::FieldName;

/// Uncompiled rules for one bank, as read from a rules file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSpec {
    /// Bank identifier, also searched for literally during detection.
    pub bank: String,
    /// Field name to pattern source.
    pub patterns: BTreeMap<String, String>,
}

impl BankSpec {
    /// Rules for the builtin banks, in detection order.
    pub fn builtin() -> Vec<BankSpec> {
        BUILTIN_BANKS
            .iter()
            .map(|bank| BankSpec {
                bank: bank.to_string(),
                patterns: default_patterns(),
            })
            .collect()
    }

    /// Read an ordered list of bank rules from a JSON file.
    pub fn load_file(path: &Path) -> Result<Vec<BankSpec>, RegistryError> {
        let content = fs::read_to_string(path)
            .map_err(|e| RegistryError::RulesFile(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| RegistryError::RulesFile(format!("{}: {}", path.display(), e)))
    }
}

fn default_patterns() -> BTreeMap<String, String> {
    [
        (FieldName::CardHolder, CARD_HOLDER),
        (FieldName::Last4Digits, LAST_4_DIGITS),
        (FieldName::BillingCycle, BILLING_CYCLE),
        (FieldName::PaymentDueDate, PAYMENT_DUE_DATE),
        (FieldName::TotalOutstandingBalance, TOTAL_OUTSTANDING_BALANCE),
    ]
    .into_iter()
    .map(|(field, pattern)| (field.as_str().to_string(), pattern.to_string()))
    .collect()
}

/// Compiled patterns for the five fields of one bank.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<(FieldName, Regex)>,
}

impl PatternSet {
    fn compile(bank: &str, sources: &BTreeMap<String, String>) -> Result<Self, RegistryError> {
        for name in sources.keys() {
            if name.parse::<FieldName>().is_err() {
                return Err(RegistryError::UnknownField {
                    bank: bank.to_string(),
                    field: name.clone(),
                });
            }
        }

        let mut patterns = Vec::with_capacity(FieldName::ALL.len());
        for field in FieldName::ALL {
            let source = sources
                .get(field.as_str())
                .ok_or_else(|| RegistryError::MissingField {
                    bank: bank.to_string(),
                    field: field.as_str().to_string(),
                })?;

            let regex = RegexBuilder::new(source)
                .case_insensitive(true)
                .build()
                .map_err(|e| RegistryError::InvalidPattern {
                    bank: bank.to_string(),
                    field: field.as_str().to_string(),
                    source: e,
                })?;

            // Group 0 is the whole match
            if regex.captures_len() < 2 {
                return Err(RegistryError::NoCaptureGroup {
                    bank: bank.to_string(),
                    field: field.as_str().to_string(),
                });
            }

            patterns.push((field, regex));
        }

        Ok(Self { patterns })
    }

    /// Fields covered by this set, in column order.
    pub fn fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.patterns.iter().map(|(field, _)| *field)
    }

    /// Apply one field pattern, returning capture group 1 trimmed.
    pub fn extract(&self, field: FieldName, text: &str) -> Option<String> {
        let (_, regex) = self.patterns.iter().find(|(f, _)| *f == field)?;
        regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    /// Pattern source for a field.
    pub fn pattern(&self, field: FieldName) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, regex)| regex.as_str())
    }
}

#[derive(Debug, Clone)]
struct BankRule {
    id: String,
    detector: Regex,
    patterns: PatternSet,
}

/// Immutable, validated mapping from bank identifier to its patterns.
///
/// Detection walks the banks in insertion order and the first identifier
/// found in the text wins, so when two bank names occur in one document the
/// one registered earlier is chosen.
#[derive(Debug, Clone)]
pub struct BankRuleRegistry {
    banks: Vec<BankRule>,
}

impl BankRuleRegistry {
    /// Registry with the builtin banks.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_specs(BankSpec::builtin())
    }

    /// Compile and validate bank rules, keeping their order.
    pub fn from_specs(specs: Vec<BankSpec>) -> Result<Self, RegistryError> {
        if specs.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        let mut banks = Vec::with_capacity(specs.len());

        for spec in specs {
            let id = spec.bank.trim().to_string();
            if id.is_empty() {
                return Err(RegistryError::EmptyBankName);
            }
            if !seen.insert(id.to_lowercase()) {
                return Err(RegistryError::DuplicateBank(id));
            }

            let detector = RegexBuilder::new(&regex::escape(&id))
                .case_insensitive(true)
                .build()
                .map_err(|e| RegistryError::InvalidPattern {
                    bank: id.clone(),
                    field: "bank".to_string(),
                    source: e,
                })?;
            let patterns = PatternSet::compile(&id, &spec.patterns)?;

            debug!("Registered bank rules for {}", id);
            banks.push(BankRule {
                id,
                detector,
                patterns,
            });
        }

        Ok(Self { banks })
    }

    /// First bank whose identifier occurs in `text`, case-insensitively.
    pub fn lookup(&self, text: &str) -> Option<(&str, &PatternSet)> {
        self.banks
            .iter()
            .find(|rule| rule.detector.is_match(text))
            .map(|rule| (rule.id.as_str(), &rule.patterns))
    }

    /// Patterns registered for an exact bank identifier.
    pub fn get(&self, bank: &str) -> Option<&PatternSet> {
        self.banks
            .iter()
            .find(|rule| rule.id == bank)
            .map(|rule| &rule.patterns)
    }

    /// Bank identifiers in detection order.
    pub fn banks(&self) -> impl Iterator<Item = &str> {
        self.banks.iter().map(|rule| rule.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}
