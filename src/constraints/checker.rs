// ==============================================================================
// constraints/checker.rs - Constraint Violation Checker
// ==============================================================================
// Description: Runs the synthesized master queries and maps result rows to
//              violation records
// Author: Matt Barham
// Created: 2025-11-15
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================
// Read-only diagnostic: failures are reported, never retried. Violations are
// data, only a failure to run the check is an error.
// ==============================================================================

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::schema::ConstraintCatalog;
use super::synthesizer::ConstraintQuerySynthesizer;
use crate::db::{ConnectionProvider, Database, DbError, SqlValue};
use crate::models::{ForeignKeyViolation, UniqueKeyViolation};
use crate::report::ConstraintReport;

#[derive(Error, Debug)]
pub enum ConstraintCheckError {
    #[error("Failed to acquire connection for constraint check: {0}")]
    Connection(#[source] DbError),

    #[error("{kind} constraint query failed: {source}")]
    Query {
        kind: &'static str,
        #[source]
        source: DbError,
    },
}

fn text_cell(row: &[SqlValue], idx: usize, name: &str) -> Result<String, DbError> {
    row.get(idx)
        .and_then(SqlValue::as_text)
        .ok_or_else(|| DbError::Decode(format!("column {} ({}) is missing or NULL", idx, name)))
}

fn foreign_key_violation(row: &[SqlValue]) -> Result<ForeignKeyViolation, DbError> {
    Ok(ForeignKeyViolation {
        referring_table: text_cell(row, 0, "referring_table")?,
        referring_columns: text_cell(row, 1, "referring_columns")?,
        referring_values: text_cell(row, 2, "referring_values")?,
        referenced_table: text_cell(row, 3, "referenced_table")?,
        referenced_columns: text_cell(row, 4, "referenced_columns")?,
    })
}

fn unique_key_violation(row: &[SqlValue]) -> Result<UniqueKeyViolation, DbError> {
    let duplicate_count = row
        .get(3)
        .and_then(SqlValue::as_i64)
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| DbError::Decode("column 3 (duplicate_count) is not a count".to_string()))?;

    Ok(UniqueKeyViolation {
        table_name: text_cell(row, 0, "table_name")?,
        key_columns: text_cell(row, 1, "key_columns")?,
        key_values: text_cell(row, 2, "key_values")?,
        duplicate_count,
    })
}

/// Finds orphaned references and duplicate keys across a whole schema.
///
/// Safe to share between threads: each check acquires its own connection.
pub struct ConstraintChecker<P> {
    provider: P,
    synthesizer: ConstraintQuerySynthesizer,
}

impl<P: ConnectionProvider> ConstraintChecker<P> {
    pub fn new(provider: P, catalog: Arc<ConstraintCatalog>) -> Self {
        let synthesizer = ConstraintQuerySynthesizer::new(catalog, provider.dialect());
        Self { provider, synthesizer }
    }

    pub fn synthesizer(&self) -> &ConstraintQuerySynthesizer {
        &self.synthesizer
    }

    pub fn find_foreign_key_violations(&self) -> Result<Vec<ForeignKeyViolation>, ConstraintCheckError> {
        let violations = self.run(
            "Foreign key",
            self.synthesizer.foreign_key_query(),
            foreign_key_violation,
        )?;
        info!("Foreign key check found {} violations", violations.len());
        Ok(violations)
    }

    pub fn find_unique_key_violations(&self) -> Result<Vec<UniqueKeyViolation>, ConstraintCheckError> {
        let violations = self.run(
            "Unique key",
            self.synthesizer.unique_key_query(),
            unique_key_violation,
        )?;
        info!("Unique key check found {} violations", violations.len());
        Ok(violations)
    }

    /// Both checks, stamped with the catalog's schema version
    pub fn report(&self) -> Result<ConstraintReport, ConstraintCheckError> {
        let foreign_key_violations = self.find_foreign_key_violations()?;
        let unique_key_violations = self.find_unique_key_violations()?;

        Ok(ConstraintReport {
            checked_at: Utc::now(),
            schema_version: self.synthesizer.catalog().schema_version().to_string(),
            dialect: self.synthesizer.dialect(),
            foreign_key_violations,
            unique_key_violations,
        })
    }

    fn run<T>(
        &self,
        kind: &'static str,
        sql: &str,
        map_row: fn(&[SqlValue]) -> Result<T, DbError>,
    ) -> Result<Vec<T>, ConstraintCheckError> {
        if sql.trim().is_empty() {
            debug!("{} catalog is empty, skipping query", kind);
            return Ok(Vec::new());
        }

        let mut conn = self.provider.acquire().map_err(ConstraintCheckError::Connection)?;

        let mut records = Vec::new();
        conn.query_each(sql, &mut |row| {
            records.push(map_row(row)?);
            Ok(())
        })
        .map_err(|source| ConstraintCheckError::Query { kind, source })?;

        Ok(records)
    }
}
