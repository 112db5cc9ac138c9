//! Parse command - extract fields from a single statement file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use crate::output::{format_record, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file (PDF or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Additional bank rules file (JSON)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Report text length and fields that could not be extracted
    #[arg(long)]
    show_issues: bool,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    let extractor = super::build_extractor(&config, args.rules.as_ref())?;

    info!("Processing file: {}", args.input.display());
    let extraction = extractor.extract(&args.input);

    let output = format_record(&extraction.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_issues {
        eprintln!("Normalized text: {} characters", extraction.text_length);
        if !extraction.issues.is_empty() {
            eprintln!("{}", style("Extraction issues:").yellow());
            for issue in &extraction.issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
