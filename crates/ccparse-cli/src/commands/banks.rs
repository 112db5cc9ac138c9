//! Banks command - list and validate bank rules.

use std::path::PathBuf;

use clap::Args;
use console::style;

use ccparse_core::FieldName;

/// Arguments for the banks command.
#[derive(Args)]
pub struct BanksArgs {
    /// Additional bank rules file (JSON)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Print each bank's field patterns
    #[arg(long)]
    patterns: bool,
}

pub async fn run(args: BanksArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let registry = super::load_registry(&config, args.rules.as_ref())?;

    println!(
        "{} {} banks, in detection order:",
        style("✓").green(),
        registry.len()
    );

    for (position, bank) in registry.banks().enumerate() {
        println!("  {}. {}", position + 1, style(bank).bold());

        if args.patterns {
            if let Some(patterns) = registry.get(bank) {
                for field in FieldName::ALL {
                    println!(
                        "       {:<26} {}",
                        field.as_str(),
                        patterns.pattern(field).unwrap_or("")
                    );
                }
            }
        }
    }

    Ok(())
}
