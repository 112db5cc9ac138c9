//! Exporters for parsed statement records.

use std::path::Path;

use ccparse_core::{FieldName, FieldRecord, RECORD_COLUMNS};
use chrono::{DateTime, Local};
use rust_decimal::Decimal;

/// Output format for a single statement.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// Files written by the batch command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// CSV table of all records
    Csv,
    /// JSON array of all records
    Json,
    /// Plain text report table
    Report,
}

const REPORT_TITLE: &str = "Credit Card Statement Parsing Report";
const ABSENT: &str = "-";

/// Format one record.
pub fn format_record(record: &FieldRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => records_to_csv(std::slice::from_ref(record)),
        OutputFormat::Text => Ok(format_record_text(record)),
    }
}

fn format_record_text(record: &FieldRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("{:<15} {}\n", "Bank:", record.bank));
    for field in FieldName::ALL {
        output.push_str(&format!(
            "{:<15} {}\n",
            format!("{}:", field.title()),
            record.get(field).unwrap_or(ABSENT)
        ));
    }

    output
}

/// CSV table with the stable column header. Absent fields are empty cells.
pub fn records_to_csv(records: &[FieldRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(RECORD_COLUMNS)?;
    for record in records {
        wtr.write_record(record.values().map(|v| v.unwrap_or("")))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// Read records back from a CSV file written by [`records_to_csv`].
pub fn read_csv(path: &Path) -> anyhow::Result<Vec<FieldRecord>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut records = Vec::new();

    for row in rdr.deserialize() {
        records.push(row?);
    }

    Ok(records)
}

/// Pretty JSON array. Absent fields are `null`.
pub fn records_to_json(records: &[FieldRecord]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Plain text table with a totals footer.
pub fn render_report(records: &[FieldRecord], generated_at: DateTime<Local>) -> String {
    let mut headers = vec!["Bank"];
    headers.extend(FieldName::ALL.iter().map(|f| f.title()));

    let rows: Vec<Vec<&str>> = records
        .iter()
        .map(|record| record.values().into_iter().map(|v| v.unwrap_or(ABSENT)).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[&str]| -> String {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        format!("| {} |", line.join(" | "))
    };
    let separator = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut output = String::new();
    output.push_str(REPORT_TITLE);
    output.push('\n');
    output.push_str(&format!("Generated: {}\n\n", generated_at.format("%Y-%m-%d %H:%M:%S")));

    output.push_str(&separator);
    output.push('\n');
    output.push_str(&format_row(&headers[..]));
    output.push('\n');
    output.push_str(&separator);
    output.push('\n');
    for row in &rows {
        output.push_str(&format_row(&row[..]));
        output.push('\n');
    }
    output.push_str(&separator);
    output.push('\n');

    let unknown = records.iter().filter(|r| !r.is_known_bank()).count();
    let partial = records
        .iter()
        .filter(|r| r.is_known_bank() && !r.is_complete())
        .count();
    let total: Decimal = records.iter().filter_map(|r| r.balance_amount()).sum();

    output.push('\n');
    output.push_str(&format!(
        "Statements: {}  Complete: {}  Partial: {}  Unknown: {}\n",
        records.len(),
        records.len() - unknown - partial,
        partial,
        unknown
    ));
    output.push_str(&format!("Total outstanding: {}\n", total));

    output
}
