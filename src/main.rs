// ==============================================================================
// main.rs - Genomics Ingest Entry Point
// ==============================================================================
// Description: Command line front end for constraint checks, query synthesis,
//              TSV staging loads and id allocation
// Author: Matt Barham
// Created: 2025-10-31
// Modified: 2025-11-21
// Version: 2.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genomics_ingest::constraints::{genomics_catalog, ConstraintChecker, ConstraintQuerySynthesizer};
use genomics_ingest::db::SqliteProvider;
use genomics_ingest::report::{self, ReportFormat};
use genomics_ingest::sql::Dialect;
use genomics_ingest::{BulkLoadSession, IngestConfig, SequenceAllocator, SequenceRegistry};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report foreign and unique key violations in a database
    Check {
        /// SQLite database file
        #[arg(long, env = "GENOMICS_DATABASE")]
        database: PathBuf,

        /// Report format (json, tsv or text)
        #[arg(long, default_value = "text")]
        format: ReportFormat,

        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the synthesized violation queries
    Sql {
        #[arg(long, default_value = "clickhouse")]
        dialect: Dialect,

        /// Only print one of the two queries
        #[arg(long)]
        kind: Option<QueryKind>,
    },

    /// Bulk load a tab-separated file (header row = column names)
    Load {
        #[arg(long, env = "GENOMICS_DATABASE")]
        database: PathBuf,

        /// Target table
        #[arg(long)]
        table: String,

        /// Warn instead of failing on row count mismatches
        #[arg(long)]
        relaxed: bool,

        file: PathBuf,
    },

    /// Allocate one id from a named sequence
    NextId {
        #[arg(long, env = "GENOMICS_DATABASE")]
        database: PathBuf,

        sequence: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QueryKind {
    Foreign,
    Unique,
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genomics_ingest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Check { database, format, output } => check(database, format, output),
        Command::Sql { dialect, kind } => print_queries(dialect, kind),
        Command::Load { database, table, relaxed, file } => {
            let inserted = load_tsv(&database, &table, relaxed, &file)?;
            info!("Loaded {} rows into {} from {:?}", inserted, table, file);
            Ok(ExitCode::SUCCESS)
        }
        Command::NextId { database, sequence } => {
            println!("{}", allocate_id(&database, &sequence)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check(database: PathBuf, format: ReportFormat, output: Option<PathBuf>) -> Result<ExitCode> {
    info!("Checking constraints in {:?}", database);

    let catalog = Arc::new(genomics_catalog().context("Invalid constraint catalog")?);
    let checker = ConstraintChecker::new(SqliteProvider::new(&database), catalog);
    let report = checker.report().context("Constraint check failed")?;

    match output {
        Some(path) => report::write_report(&report, format, &path)?,
        None => report::render(&report, format, io::stdout().lock())?,
    }

    if report.is_clean() {
        info!("No constraint violations");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("{} constraint violations found", report.total_violations());
        Ok(ExitCode::FAILURE)
    }
}

fn print_queries(dialect: Dialect, kind: Option<QueryKind>) -> Result<ExitCode> {
    let catalog = Arc::new(genomics_catalog().context("Invalid constraint catalog")?);
    let synthesizer = ConstraintQuerySynthesizer::new(catalog, dialect);

    let mut out = io::stdout().lock();
    if !matches!(kind, Some(QueryKind::Unique)) {
        writeln!(out, "{};", synthesizer.foreign_key_query())?;
    }
    if !matches!(kind, Some(QueryKind::Foreign)) {
        writeln!(out, "{};", synthesizer.unique_key_query())?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Stage every record of a headed TSV file and flush it into `table`
fn load_tsv(database: &Path, table: &str, relaxed: bool, file: &Path) -> Result<u64> {
    let mut config = IngestConfig::from_env();
    config.relaxed_mode |= relaxed;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .from_path(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let headers = reader.headers().context("Failed to read header row")?.clone();
    let names: Vec<&str> = headers.iter().collect();

    let mut session = BulkLoadSession::new(SqliteProvider::new(database), config);
    session.set_field_names(table, &names)?;

    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Bad record at line {}", idx + 2))?;
        let fields: Vec<Option<&str>> = record.iter().map(Some).collect();
        session.insert_record(table, &fields)?;
    }

    session.flush_all().context("Bulk load failed")
}

fn allocate_id(database: &Path, sequence: &str) -> Result<i64> {
    let allocator = SequenceAllocator::new(SqliteProvider::new(database), SequenceRegistry::genomics_default());
    Ok(allocator.next_id(sequence)?)
}
