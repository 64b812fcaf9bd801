// ==============================================================================
// report.rs - Constraint Report Output
// ==============================================================================
// Description: Operator-facing rendering of constraint check results
//              (JSON for tooling, TSV for spreadsheets, text for terminals)
// Author: Matt Barham
// Created: 2025-11-06
// Modified: 2025-11-21
// Version: 2.0.0
// ==============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::constraints::synthesizer::{FOREIGN_KEY_COLUMNS, UNIQUE_KEY_COLUMNS};
use crate::models::{ForeignKeyViolation, UniqueKeyViolation};
use crate::sql::Dialect;

/// Result of one constraint check run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintReport {
    pub checked_at: DateTime<Utc>,
    pub schema_version: String,
    pub dialect: Dialect,
    pub foreign_key_violations: Vec<ForeignKeyViolation>,
    pub unique_key_violations: Vec<UniqueKeyViolation>,
}

impl ConstraintReport {
    pub fn is_clean(&self) -> bool {
        self.total_violations() == 0
    }

    pub fn total_violations(&self) -> usize {
        self.foreign_key_violations.len() + self.unique_key_violations.len()
    }
}

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// JSON (CI checks and downstream tooling)
    Json,
    /// Tab-separated, one section per violation kind
    Tsv,
    /// Human-readable summary
    Text,
}

impl ReportFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Tsv => "tsv",
            ReportFormat::Text => "txt",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "tsv" => Ok(ReportFormat::Tsv),
            "text" | "txt" => Ok(ReportFormat::Text),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

/// Write `report` to `writer` in `format`
pub fn render<W: Write>(report: &ConstraintReport, format: ReportFormat, writer: W) -> Result<()> {
    match format {
        ReportFormat::Json => render_json(report, writer),
        ReportFormat::Tsv => render_tsv(report, writer),
        ReportFormat::Text => render_text(report, writer),
    }
}

/// Write `report` to a new file at `path`
pub fn write_report(report: &ConstraintReport, format: ReportFormat, path: &Path) -> Result<()> {
    info!("Writing {:?} constraint report: {:?}", format, path);

    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    render(report, format, &mut writer)?;
    writer.flush().context("Failed to flush report file")?;

    Ok(())
}

fn render_json<W: Write>(report: &ConstraintReport, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report).context("Failed to write JSON report")?;
    writeln!(writer)?;
    Ok(())
}

fn render_tsv<W: Write>(report: &ConstraintReport, writer: W) -> Result<()> {
    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    tsv.write_record(FOREIGN_KEY_COLUMNS)
        .context("Failed to write foreign key header")?;
    for violation in &report.foreign_key_violations {
        tsv.serialize(violation)
            .context("Failed to write foreign key violation")?;
    }

    tsv.write_record(UNIQUE_KEY_COLUMNS)
        .context("Failed to write unique key header")?;
    for violation in &report.unique_key_violations {
        tsv.serialize(violation)
            .context("Failed to write unique key violation")?;
    }

    tsv.flush().context("Failed to flush TSV report")?;
    Ok(())
}

fn render_text<W: Write>(report: &ConstraintReport, mut writer: W) -> Result<()> {
    writeln!(
        writer,
        "Constraint report for schema {} ({}) at {}",
        report.schema_version,
        report.dialect,
        report.checked_at.to_rfc3339()
    )?;

    writeln!(writer, "Foreign key violations: {}", report.foreign_key_violations.len())?;
    for v in &report.foreign_key_violations {
        writeln!(
            writer,
            "  {}({}) = {} -> {}({})",
            v.referring_table, v.referring_columns, v.referring_values, v.referenced_table, v.referenced_columns
        )?;
    }

    writeln!(writer, "Unique key violations: {}", report.unique_key_violations.len())?;
    for v in &report.unique_key_violations {
        writeln!(
            writer,
            "  {}({}) = {} x{}",
            v.table_name, v.key_columns, v.key_values, v.duplicate_count
        )?;
    }

    if report.is_clean() {
        writeln!(writer, "OK: no violations")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn report_with_violations() -> ConstraintReport {
        ConstraintReport {
            checked_at: Utc.with_ymd_and_hms(2025, 11, 21, 12, 0, 0).unwrap(),
            schema_version: "2.14.0".to_string(),
            dialect: Dialect::ClickHouse,
            foreign_key_violations: vec![ForeignKeyViolation {
                referring_table: "mutation".to_string(),
                referring_columns: "sample_id".to_string(),
                referring_values: "99".to_string(),
                referenced_table: "sample".to_string(),
                referenced_columns: "internal_id".to_string(),
            }],
            unique_key_violations: vec![UniqueKeyViolation {
                table_name: "patient".to_string(),
                key_columns: "stable_id,cancer_study_id".to_string(),
                key_values: "TCGA-A1|1".to_string(),
                duplicate_count: 3,
            }],
        }
    }

    fn render_to_string(report: &ConstraintReport, format: ReportFormat) -> String {
        let mut buffer = Vec::new();
        render(report, format, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_report_counts() {
        let report = report_with_violations();
        assert_eq!(report.total_violations(), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_json_uses_stable_field_names() {
        let json = render_to_string(&report_with_violations(), ReportFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["dialect"], "clickhouse");
        assert_eq!(value["foreign_key_violations"][0]["referring_values"], "99");
        assert_eq!(value["unique_key_violations"][0]["duplicate_count"], 3);
    }

    #[test]
    fn test_tsv_sections() {
        let tsv = render_to_string(&report_with_violations(), ReportFormat::Tsv);
        let lines: Vec<&str> = tsv.lines().collect();

        assert_eq!(
            lines,
            vec![
                "referring_table\treferring_columns\treferring_values\treferenced_table\treferenced_columns",
                "mutation\tsample_id\t99\tsample\tinternal_id",
                "table_name\tkey_columns\tkey_values\tduplicate_count",
                "patient\tstable_id,cancer_study_id\tTCGA-A1|1\t3",
            ]
        );
    }

    #[test]
    fn test_text_summary() {
        let text = render_to_string(&report_with_violations(), ReportFormat::Text);
        assert!(text.contains("Foreign key violations: 1"));
        assert!(text.contains("mutation(sample_id) = 99 -> sample(internal_id)"));
        assert!(text.contains("patient(stable_id,cancer_study_id) = TCGA-A1|1 x3"));
        assert!(!text.contains("OK: no violations"));

        let mut clean = report_with_violations();
        clean.foreign_key_violations.clear();
        clean.unique_key_violations.clear();
        assert!(render_to_string(&clean, ReportFormat::Text).contains("OK: no violations"));
    }

    #[test]
    fn test_write_report_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(format!("report.{}", ReportFormat::Json.extension()));

        write_report(&report_with_violations(), ReportFormat::Json, &path).unwrap();
        let parsed: ConstraintReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, report_with_violations());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("TSV".parse::<ReportFormat>(), Ok(ReportFormat::Tsv));
        assert_eq!("txt".parse::<ReportFormat>(), Ok(ReportFormat::Text));
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
