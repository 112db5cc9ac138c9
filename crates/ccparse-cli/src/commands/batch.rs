//! Batch processing command for multiple statement files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use ccparse_core::{BatchAggregator, FieldRecord};

use crate::output::{read_csv, records_to_csv, records_to_json, render_report, ExportFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files glob pattern (e.g. "statements/*.pdf")
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Files to write
    #[arg(short, long, value_enum, value_delimiter = ',', default_value = "csv,json,report")]
    format: Vec<ExportFormat>,

    /// Append to rows already in the CSV output instead of replacing them
    #[arg(long)]
    append: bool,

    /// Number of parallel workers (default from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Additional bank rules file (JSON)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    // Rules are validated before any document is touched
    let extractor = super::build_extractor(&config, args.rules.as_ref())?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();
            config.batch.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let output_dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(files.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let jobs = args.jobs.unwrap_or(config.batch.jobs);
    let extractions = BatchAggregator::new(&extractor)
        .with_jobs(jobs)
        .process_all_with(&files, |index, _| {
            debug!("Finished {}", files[index].display());
            pb.inc(1);
        });

    pb.finish_with_message("Complete");

    let new_records: Vec<FieldRecord> = extractions.iter().map(|e| e.record.clone()).collect();

    let csv_path = output_dir.join(&config.output.csv_file);
    let mut records = Vec::new();
    if args.append && csv_path.exists() {
        records = read_csv(&csv_path)?;
        info!("Appending to {} existing rows", records.len());
    }
    records.extend(new_records);

    for format in &args.format {
        let (path, content) = match format {
            ExportFormat::Csv => (csv_path.clone(), records_to_csv(&records)?),
            ExportFormat::Json => (
                output_dir.join(&config.output.json_file),
                records_to_json(&records)?,
            ),
            ExportFormat::Report => (
                output_dir.join(&config.output.report_file),
                render_report(&records, Local::now()),
            ),
        };

        fs::write(&path, content)?;
        println!("{} Wrote {}", style("✓").green(), path.display());
    }

    let complete = extractions.iter().filter(|e| e.record.is_complete()).count();
    let unknown = extractions.iter().filter(|e| !e.record.is_known_bank()).count();
    let partial = extractions.len() - complete - unknown;

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        extractions.len(),
        start.elapsed()
    );
    println!(
        "   {} complete, {} partial, {} unknown",
        style(complete).green(),
        style(partial).yellow(),
        style(unknown).red()
    );

    let review: Vec<_> = files
        .iter()
        .zip(&extractions)
        .filter(|(_, extraction)| extraction.needs_review())
        .collect();

    if !review.is_empty() {
        println!();
        println!("{}", style("Needs review:").yellow());
        for (path, extraction) in review {
            let reasons: Vec<String> = extraction.issues.iter().map(|i| i.to_string()).collect();
            println!("  - {}: {}", path.display(), reasons.join("; "));
        }
    }

    Ok(())
}
