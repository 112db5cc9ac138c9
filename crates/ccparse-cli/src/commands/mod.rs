//! Subcommands.

pub mod banks;
pub mod batch;
pub mod config;
pub mod parse;

use std::path::{Path, PathBuf};

use ccparse_core::{BankRuleRegistry, CcparseConfig, FileTextSource, StatementExtractor};
use tracing::debug;

/// Load the config file given on the command line, or the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CcparseConfig> {
    match config_path {
        Some(path) => Ok(CcparseConfig::from_file(Path::new(path))?),
        None => Ok(CcparseConfig::default()),
    }
}

/// Build the validated registry, with an optional rules file override.
pub fn load_registry(
    config: &CcparseConfig,
    rules: Option<&PathBuf>,
) -> anyhow::Result<BankRuleRegistry> {
    let mut config = config.clone();
    if let Some(rules) = rules {
        config.extraction.rules_file = Some(rules.clone());
    }

    let registry = config
        .build_registry()
        .map_err(|e| anyhow::anyhow!("Invalid bank rules: {}", e))?;
    debug!("Loaded rules for {} banks", registry.len());
    Ok(registry)
}

/// Build an extractor reading files as configured.
pub fn build_extractor(
    config: &CcparseConfig,
    rules: Option<&PathBuf>,
) -> anyhow::Result<StatementExtractor> {
    let registry = load_registry(config, rules)?;
    let source = FileTextSource::new(config.source.clone());
    Ok(StatementExtractor::with_source(registry, source))
}
