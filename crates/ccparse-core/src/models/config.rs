//! Configuration structures for the statement parsing pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CcparseError, Result};
use crate::statement::registry::{BankRuleRegistry, BankSpec};

/// Main configuration for ccparse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CcparseConfig {
    /// Text source configuration.
    pub source: SourceConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,

    /// Output file configuration.
    pub output: OutputConfig,
}

/// Text source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Inserted between page texts before normalization.
    pub page_separator: String,

    /// Try an empty password on encrypted PDFs.
    pub try_empty_password: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            page_separator: "\n".to_string(),
            try_empty_password: true,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// JSON file with additional bank rules, appended after the builtins.
    pub rules_file: Option<PathBuf>,

    /// Keep the builtin banks ahead of the custom ones.
    pub include_builtin_banks: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            rules_file: None,
            include_builtin_banks: true,
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of worker threads (1 = sequential).
    pub jobs: usize,

    /// File extensions picked up by batch globbing.
    pub extensions: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 1,
            extensions: vec!["pdf".to_string(), "txt".to_string()],
        }
    }
}

/// Output file names used by the batch command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_file: String,
    pub json_file: String,
    pub report_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_file: "parsed_statements.csv".to_string(),
            json_file: "parsed_statements.json".to_string(),
            report_file: "parsed_statements.txt".to_string(),
        }
    }
}

impl CcparseConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CcparseError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| CcparseError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build and validate the bank rule registry described by this config.
    pub fn build_registry(&self) -> Result<BankRuleRegistry> {
        let mut specs = if self.extraction.include_builtin_banks {
            BankSpec::builtin()
        } else {
            Vec::new()
        };

        if let Some(path) = &self.extraction.rules_file {
            specs.extend(BankSpec::load_file(path)?);
        }

        Ok(BankRuleRegistry::from_specs(specs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;

    #[test]
    fn test_defaults_round_trip() {
        let config = CcparseConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CcparseConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.batch.jobs, 1);
        assert_eq!(parsed.output.csv_file, "parsed_statements.csv");
        assert!(parsed.extraction.include_builtin_banks);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: CcparseConfig = serde_json::from_str(r#"{"batch": {"jobs": 4}}"#).unwrap();
        assert_eq!(parsed.batch.jobs, 4);
        assert_eq!(parsed.batch.extensions, vec!["pdf", "txt"]);
        assert_eq!(parsed.source.page_separator, "\n");
    }

    #[test]
    fn test_build_registry_defaults() {
        let registry = CcparseConfig::default().build_registry().unwrap();
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_build_registry_without_banks_fails() {
        let mut config = CcparseConfig::default();
        config.extraction.include_builtin_banks = false;
        assert!(matches!(
            config.build_registry(),
            Err(CcparseError::Registry(RegistryError::Empty))
        ));
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = CcparseConfig::default();
        config.batch.jobs = 3;
        config.save(&path).unwrap();

        assert_eq!(CcparseConfig::from_file(&path).unwrap().batch.jobs, 3);
    }

    #[test]
    fn test_malformed_config_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"batch": {"jobs": "many"}}"#).unwrap();

        assert!(matches!(
            CcparseConfig::from_file(&path),
            Err(CcparseError::Config(_))
        ));
        assert!(matches!(
            CcparseConfig::from_file(&dir.path().join("missing.json")),
            Err(CcparseError::Io(_))
        ));
    }
}
