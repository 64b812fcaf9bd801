// ==============================================================================
// bulk_load.rs - Buffered Multi-Table Bulk Loader
// ==============================================================================
// Description: Accumulates rows per destination table and flushes them as
//              batched parameterized INSERTs with row-count verification
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================
// Usage: one session per unit of work, staged and flushed from one thread.
// Concurrent ingestion needs one session per worker.
// ==============================================================================

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::IngestConfig;
use crate::db::{ConnectionProvider, Database, DbError, Dialect, UpdateCount};
use crate::sql::{Ident, Insert};

#[derive(Error, Debug)]
pub enum BulkLoadError {
    #[error("bulk load into table '{table}' inserted {actual} of {expected} rows")]
    RowCountMismatch {
        table: String,
        expected: u64,
        actual: u64,
    },

    #[error("Table '{table}' has {pending} pending rows staged with a different column set")]
    ColumnSetConflict { table: String, pending: usize },

    #[error("Row for table '{table}' has {actual} fields, expected {expected}")]
    ArityMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("Field names for table '{0}' must not be empty")]
    EmptyFieldNames(String),

    #[error("Failed to flush table '{table}': {source}")]
    Database {
        table: String,
        #[source]
        source: DbError,
    },

    #[error("Failed to acquire connection for bulk load: {0}")]
    Connection(#[source] DbError),
}

/// Pending rows of one destination table
#[derive(Debug, Clone)]
pub struct TableLoadBuffer {
    table: Ident,
    field_names: Option<Vec<Ident>>,
    rows: Vec<Vec<Option<String>>>,

    /// Direct writes that failed verification; never sent again by the session
    held_back: Vec<Vec<Option<String>>>,
}

impl TableLoadBuffer {
    fn new(table: Ident) -> Self {
        Self {
            table,
            field_names: None,
            rows: Vec::new(),
            held_back: Vec::new(),
        }
    }

    pub fn table(&self) -> &Ident {
        &self.table
    }

    pub fn field_names(&self) -> Option<&[Ident]> {
        self.field_names.as_deref()
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn held_back(&self) -> &[Vec<Option<String>>] {
        &self.held_back
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Arity every staged row must have, if already fixed
    fn expected_arity(&self) -> Option<usize> {
        match &self.field_names {
            Some(names) => Some(names.len()),
            None => self.rows.first().or(self.held_back.first()).map(Vec::len),
        }
    }

    fn insert_statement(&self, dialect: Dialect, arity: usize) -> String {
        match &self.field_names {
            Some(names) => Insert::with_columns(&self.table, names).render(dialect),
            None => Insert::positional(&self.table, arity).render(dialect),
        }
    }
}

/// Bulk-load state of one unit of work.
///
/// Replaces process-wide buffers and mode switches: the orchestrator owns
/// the session, toggles its modes and calls [`BulkLoadSession::flush_all`]
/// when the unit of work is complete.
pub struct BulkLoadSession<P> {
    provider: P,
    config: IngestConfig,
    buffers: Vec<TableLoadBuffer>,
    index: HashMap<Ident, usize>,
}

impl<P: ConnectionProvider> BulkLoadSession<P> {
    pub fn new(provider: P, config: IngestConfig) -> Self {
        Self {
            provider,
            config,
            buffers: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn set_bulk_load(&mut self, enabled: bool) {
        self.config.bulk_load = enabled;
    }

    pub fn set_relaxed_mode(&mut self, relaxed: bool) {
        self.config.relaxed_mode = relaxed;
    }

    /// Fix the column list used for subsequent rows of `table`.
    ///
    /// Rejected while rows staged under a different column set are pending.
    pub fn set_field_names(&mut self, table: &str, names: &[&str]) -> Result<(), BulkLoadError> {
        let table = Ident::new(table);
        if names.is_empty() {
            return Err(BulkLoadError::EmptyFieldNames(table.to_string()));
        }
        let names: Vec<Ident> = names.iter().map(|n| Ident::new(n)).collect();

        let idx = self.buffer_index(&table);
        let buffer = &mut self.buffers[idx];
        if !buffer.is_empty() && buffer.field_names.as_ref() != Some(&names) {
            return Err(BulkLoadError::ColumnSetConflict {
                table: table.to_string(),
                pending: buffer.len(),
            });
        }

        buffer.field_names = Some(names);
        Ok(())
    }

    /// Stage one row for `table`.
    ///
    /// `None` and the configured NULL sentinel bind as SQL NULL. An empty
    /// field list is ignored. With bulk mode off the row alone is written
    /// immediately through the same verified batch path; if that write fails
    /// the row is held back (see [`BulkLoadSession::take_held_back`]) and no
    /// later write sends it again.
    pub fn insert_record(&mut self, table: &str, fields: &[Option<&str>]) -> Result<(), BulkLoadError> {
        let table = Ident::new(table);
        if fields.is_empty() {
            debug!("Ignoring empty record for table {}", table);
            return Ok(());
        }

        let row: Vec<Option<String>> = fields
            .iter()
            .map(|field| match field {
                Some(value) if *value != self.config.null_sentinel => Some(value.to_string()),
                _ => None,
            })
            .collect();

        let idx = self.buffer_index(&table);
        let buffer = &mut self.buffers[idx];
        if let Some(expected) = buffer.expected_arity() {
            if expected != row.len() {
                return Err(BulkLoadError::ArityMismatch {
                    table: table.to_string(),
                    expected,
                    actual: row.len(),
                });
            }
        }

        if !self.config.bulk_load {
            return self.write_direct(idx, row);
        }

        buffer.rows.push(row);
        Ok(())
    }

    /// Write every pending row, table by table in registration order.
    ///
    /// Returns the number of rows inserted. On success the registry is
    /// cleared, field names included; only tables with held-back direct
    /// writes stay registered. Held-back rows are never sent. A strict-mode
    /// mismatch or database error stops the flush and leaves the failing
    /// table's rows pending.
    pub fn flush_all(&mut self) -> Result<u64, BulkLoadError> {
        if self.buffers.iter().all(TableLoadBuffer::is_empty) {
            self.clear();
            return Ok(0);
        }

        let dialect = self.provider.dialect();
        let relaxed = self.config.relaxed_mode;
        let mut conn = self.provider.acquire().map_err(BulkLoadError::Connection)?;

        let mut total = 0;
        for buffer in self.buffers.iter_mut().filter(|b| !b.is_empty()) {
            total += flush_buffer(&mut conn, buffer, dialect, relaxed)?;
        }

        self.clear();
        info!("Bulk load flushed {} rows", total);
        Ok(total)
    }

    /// Rows of `table` not yet written: staged rows plus held-back direct writes
    pub fn pending_rows(&self, table: &str) -> usize {
        self.buffer(table)
            .map_or(0, |buffer| buffer.len() + buffer.held_back.len())
    }

    /// Hand the held-back direct writes of `table` to the caller, who decides
    /// whether they were applied before staging them again
    pub fn take_held_back(&mut self, table: &str) -> Vec<Vec<Option<String>>> {
        match self.index.get(&Ident::new(table)) {
            Some(&idx) => std::mem::take(&mut self.buffers[idx].held_back),
            None => Vec::new(),
        }
    }

    pub fn buffer(&self, table: &str) -> Option<&TableLoadBuffer> {
        self.index
            .get(&Ident::new(table))
            .map(|&idx| &self.buffers[idx])
    }

    /// Registered tables in registration order
    pub fn tables(&self) -> impl Iterator<Item = &Ident> {
        self.buffers.iter().map(TableLoadBuffer::table)
    }

    fn buffer_index(&mut self, table: &Ident) -> usize {
        if let Some(&idx) = self.index.get(table) {
            return idx;
        }
        self.buffers.push(TableLoadBuffer::new(table.clone()));
        let idx = self.buffers.len() - 1;
        self.index.insert(table.clone(), idx);
        idx
    }

    fn write_direct(&mut self, idx: usize, row: Vec<Option<String>>) -> Result<(), BulkLoadError> {
        let dialect = self.provider.dialect();
        let relaxed = self.config.relaxed_mode;
        let buffer = &mut self.buffers[idx];
        let sql = buffer.insert_statement(dialect, row.len());
        let batch = [row];

        let outcome = self
            .provider
            .acquire()
            .map_err(BulkLoadError::Connection)
            .and_then(|mut conn| write_rows(&mut conn, &buffer.table, &sql, &batch, relaxed));

        match outcome {
            Ok(_) => {
                debug!("Direct write into {}", buffer.table);
                Ok(())
            }
            Err(err) => {
                let [row] = batch;
                buffer.held_back.push(row);
                warn!(
                    "Direct write into {} failed, {} rows held back",
                    buffer.table,
                    buffer.held_back.len()
                );
                Err(err)
            }
        }
    }

    /// Drop every table except those still holding back direct writes
    fn clear(&mut self) {
        self.buffers.retain(|buffer| !buffer.held_back.is_empty());
        for buffer in &mut self.buffers {
            buffer.rows.clear();
        }
        self.index = self
            .buffers
            .iter()
            .enumerate()
            .map(|(idx, buffer)| (buffer.table.clone(), idx))
            .collect();
    }
}

fn flush_buffer<D: Database>(
    conn: &mut D,
    buffer: &mut TableLoadBuffer,
    dialect: Dialect,
    relaxed: bool,
) -> Result<u64, BulkLoadError> {
    let sql = buffer.insert_statement(dialect, buffer.expected_arity().unwrap_or(0));
    let actual = write_rows(conn, &buffer.table, &sql, &buffer.rows, relaxed)?;

    info!("Flushed {} rows into {}", actual, buffer.table);
    buffer.rows.clear();
    Ok(actual)
}

/// Execute one verified batch
fn write_rows<D: Database>(
    conn: &mut D,
    table: &Ident,
    sql: &str,
    rows: &[Vec<Option<String>>],
    relaxed: bool,
) -> Result<u64, BulkLoadError> {
    let expected = rows.len() as u64;

    let counts = conn
        .execute_batch(sql, rows)
        .map_err(|source| BulkLoadError::Database {
            table: table.to_string(),
            source,
        })?;
    let actual = inserted_rows(&counts, expected);

    if actual != expected {
        if !relaxed {
            return Err(BulkLoadError::RowCountMismatch {
                table: table.to_string(),
                expected,
                actual,
            });
        }
        warn!(
            "Relaxed mode: table {} inserted {} of {} rows",
            table, actual, expected
        );
    }
    Ok(actual)
}

/// Rows inserted according to the batch counts; a backend that answers
/// `SuccessNoInfo` for any statement is taken to have inserted everything.
fn inserted_rows(counts: &[UpdateCount], expected: u64) -> u64 {
    if counts.iter().any(|c| *c == UpdateCount::SuccessNoInfo) {
        return expected;
    }
    counts
        .iter()
        .map(|c| match c {
            UpdateCount::Rows(n) => *n,
            UpdateCount::SuccessNoInfo => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{SqlValue, SqliteProvider};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn sqlite_with_sample_table() -> (tempfile::TempDir, SqliteProvider) {
        let dir = tempdir().unwrap();
        let provider = SqliteProvider::new(dir.path().join("bulk.db"));
        provider
            .acquire()
            .unwrap()
            .connection()
            .execute_batch(
                "CREATE TABLE sample (internal_id INTEGER, stable_id TEXT, sample_type TEXT, patient_id INTEGER)",
            )
            .unwrap();
        (dir, provider)
    }

    #[derive(Default)]
    struct Recorded {
        statements: Vec<String>,
        batch_sizes: Vec<usize>,
        acquisitions: usize,
    }

    /// Backend that drops `short_by` rows of every batch, or only of the
    /// first `healthy_after` batches when set
    struct ScriptedDb {
        recorded: Arc<Mutex<Recorded>>,
        short_by: u64,
        healthy_after: Option<usize>,
        no_info: bool,
        fail: bool,
    }

    impl Database for ScriptedDb {
        fn execute_batch(
            &mut self,
            sql: &str,
            rows: &[Vec<Option<String>>],
        ) -> Result<Vec<UpdateCount>, DbError> {
            let sent = {
                let mut recorded = self.recorded.lock().unwrap();
                recorded.statements.push(sql.to_string());
                recorded.batch_sizes.push(rows.len());
                recorded.batch_sizes.len()
            };
            if self.fail {
                return Err(DbError::Backend("connection reset".to_string()));
            }
            if self.no_info {
                return Ok(vec![UpdateCount::SuccessNoInfo; rows.len()]);
            }
            let short_by = match self.healthy_after {
                Some(batches) if sent > batches => 0,
                _ => self.short_by,
            };
            let dropped = short_by.min(rows.len() as u64) as usize;
            let mut counts = vec![UpdateCount::Rows(1); rows.len() - dropped];
            counts.extend(vec![UpdateCount::Rows(0); dropped]);
            Ok(counts)
        }

        fn query_each(
            &mut self,
            _sql: &str,
            _visitor: &mut dyn FnMut(&[SqlValue]) -> Result<(), DbError>,
        ) -> Result<(), DbError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct ScriptedProvider {
        recorded: Arc<Mutex<Recorded>>,
        short_by: u64,
        healthy_after: Option<usize>,
        no_info: bool,
        fail: bool,
    }

    impl ConnectionProvider for ScriptedProvider {
        type Connection = ScriptedDb;

        fn dialect(&self) -> Dialect {
            Dialect::ClickHouse
        }

        fn acquire(&self) -> Result<ScriptedDb, DbError> {
            self.recorded.lock().unwrap().acquisitions += 1;
            Ok(ScriptedDb {
                recorded: Arc::clone(&self.recorded),
                short_by: self.short_by,
                healthy_after: self.healthy_after,
                no_info: self.no_info,
                fail: self.fail,
            })
        }
    }

    fn stage_three_mutations<P: ConnectionProvider>(session: &mut BulkLoadSession<P>) {
        for id in ["1", "2", "3"] {
            session
                .insert_record("mutation", &[Some(id), Some("101"), Some("7")])
                .unwrap();
        }
    }

    #[test]
    fn test_flush_round_trip_with_nulls() {
        let (_dir, provider) = sqlite_with_sample_table();
        let mut session = BulkLoadSession::new(&provider, IngestConfig::default());

        session
            .set_field_names("SAMPLE", &["internal_id", "stable_id", "sample_type"])
            .unwrap();
        session
            .insert_record("sample", &[Some("1"), Some("TCGA-A1-01"), Some("Primary")])
            .unwrap();
        session
            .insert_record("sample", &[Some("2"), Some("TCGA-A1-02"), Some("\\N")])
            .unwrap();
        session
            .insert_record("sample", &[Some("3"), None, Some("Metastasis")])
            .unwrap();
        assert_eq!(session.pending_rows("sample"), 3);

        assert_eq!(session.flush_all().unwrap(), 3);
        assert_eq!(session.pending_rows("sample"), 0);
        assert!(session.buffer("sample").is_none());

        let db = provider.acquire().unwrap();
        let conn = db.connection();
        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM sample", [], |r| r.get(0))
            .unwrap();
        assert_eq!(total, 3);
        let null_types: i64 = conn
            .query_row("SELECT COUNT(*) FROM sample WHERE sample_type IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(null_types, 1);
        let null_ids: i64 = conn
            .query_row("SELECT COUNT(*) FROM sample WHERE stable_id IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(null_ids, 1);
        // Column not in the field list stays NULL too
        let patients: i64 = conn
            .query_row("SELECT COUNT(*) FROM sample WHERE patient_id IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(patients, 3);
    }

    #[test]
    fn test_positional_insert() {
        let (_dir, provider) = sqlite_with_sample_table();
        let mut session = BulkLoadSession::new(&provider, IngestConfig::default());

        session
            .insert_record("sample", &[Some("5"), Some("S5"), Some("Primary"), Some("9")])
            .unwrap();
        assert_eq!(session.flush_all().unwrap(), 1);

        let db = provider.acquire().unwrap();
        let patient: i64 = db
            .connection()
            .query_row("SELECT patient_id FROM sample WHERE internal_id = 5", [], |r| r.get(0))
            .unwrap();
        assert_eq!(patient, 9);
    }

    #[test]
    fn test_strict_mode_mismatch_keeps_rows() {
        let provider = ScriptedProvider {
            short_by: 1,
            ..Default::default()
        };
        let mut session = BulkLoadSession::new(&provider, IngestConfig::default());
        stage_three_mutations(&mut session);

        let err = session.flush_all().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("mutation"), "{}", message);
        assert!(message.contains('2') && message.contains('3'), "{}", message);
        assert!(matches!(
            err,
            BulkLoadError::RowCountMismatch { expected: 3, actual: 2, .. }
        ));
        assert_eq!(session.pending_rows("mutation"), 3);
    }

    #[test]
    fn test_relaxed_mode_tolerates_mismatch() {
        let provider = ScriptedProvider {
            short_by: 1,
            ..Default::default()
        };
        let mut session = BulkLoadSession::new(&provider, IngestConfig::default());
        session.set_relaxed_mode(true);
        stage_three_mutations(&mut session);

        assert_eq!(session.flush_all().unwrap(), 2);
        assert_eq!(session.pending_rows("mutation"), 0);
    }

    #[test]
    fn test_success_no_info_counts_as_complete() {
        let provider = ScriptedProvider {
            no_info: true,
            ..Default::default()
        };
        let mut session = BulkLoadSession::new(&provider, IngestConfig::default());
        stage_three_mutations(&mut session);

        assert_eq!(session.flush_all().unwrap(), 3);
    }

    #[test]
    fn test_database_error_keeps_rows() {
        let provider = ScriptedProvider {
            fail: true,
            ..Default::default()
        };
        let mut session = BulkLoadSession::new(&provider, IngestConfig::default());
        stage_three_mutations(&mut session);

        let err = session.flush_all().unwrap_err();
        assert!(matches!(err, BulkLoadError::Database { ref table, .. } if table == "mutation"));
        assert_eq!(session.pending_rows("mutation"), 3);
    }

    #[test]
    fn test_tables_flush_in_registration_order() {
        let provider = ScriptedProvider::default();
        let mut session = BulkLoadSession::new(&provider, IngestConfig::default());

        session.insert_record("patient", &[Some("1"), Some("P1")]).unwrap();
        session
            .set_field_names("sample", &["internal_id", "patient_id"])
            .unwrap();
        session.insert_record("sample", &[Some("1"), Some("1")]).unwrap();
        session.insert_record("patient", &[Some("2"), Some("P2")]).unwrap();

        assert_eq!(session.flush_all().unwrap(), 3);

        let recorded = provider.recorded.lock().unwrap();
        assert_eq!(recorded.acquisitions, 1);
        assert_eq!(
            recorded.statements,
            vec![
                "INSERT INTO `patient` VALUES (?, ?)".to_string(),
                "INSERT INTO `sample` (`internal_id`, `patient_id`) VALUES (?, ?)".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_flush_skips_database() {
        let provider = ScriptedProvider::default();
        let mut session = BulkLoadSession::new(&provider, IngestConfig::default());
        session.insert_record("sample", &[]).unwrap();

        assert_eq!(session.pending_rows("sample"), 0);
        assert_eq!(session.flush_all().unwrap(), 0);
        assert_eq!(provider.recorded.lock().unwrap().acquisitions, 0);
    }

    #[test]
    fn test_changing_field_names_with_pending_rows_rejected() {
        let provider = ScriptedProvider::default();
        let mut session = BulkLoadSession::new(&provider, IngestConfig::default());

        session.insert_record("sample", &[Some("1"), Some("S1")]).unwrap();
        let err = session
            .set_field_names("sample", &["internal_id", "stable_id"])
            .unwrap_err();
        assert!(matches!(err, BulkLoadError::ColumnSetConflict { pending: 1, .. }));

        let err = session.set_field_names("patient", &[]).unwrap_err();
        assert!(matches!(err, BulkLoadError::EmptyFieldNames(_)));
    }

    #[test]
    fn test_same_field_names_can_be_reapplied() {
        let provider = ScriptedProvider::default();
        let mut session = BulkLoadSession::new(&provider, IngestConfig::default());

        session.set_field_names("sample", &["internal_id", "stable_id"]).unwrap();
        session.insert_record("sample", &[Some("1"), Some("S1")]).unwrap();
        session.set_field_names("Sample", &["INTERNAL_ID", "stable_id"]).unwrap();
        assert_eq!(session.pending_rows("sample"), 1);
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let provider = ScriptedProvider::default();
        let mut session = BulkLoadSession::new(&provider, IngestConfig::default());

        session.set_field_names("sample", &["internal_id", "stable_id"]).unwrap();
        let err = session
            .insert_record("sample", &[Some("1"), Some("S1"), Some("extra")])
            .unwrap_err();
        assert!(matches!(
            err,
            BulkLoadError::ArityMismatch { expected: 2, actual: 3, .. }
        ));

        session.insert_record("patient", &[Some("1")]).unwrap();
        assert!(session.insert_record("patient", &[Some("2"), Some("P2")]).is_err());
    }

    #[test]
    fn test_direct_mode_writes_immediately() {
        let (_dir, provider) = sqlite_with_sample_table();
        let mut config = IngestConfig::default();
        config.bulk_load = false;
        let mut session = BulkLoadSession::new(&provider, config);

        session.set_field_names("sample", &["internal_id", "stable_id"]).unwrap();
        session.insert_record("sample", &[Some("1"), Some("S1")]).unwrap();
        assert_eq!(session.pending_rows("sample"), 0);

        let db = provider.acquire().unwrap();
        let total: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM sample", [], |r| r.get(0))
            .unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_failed_direct_write_is_never_resent() {
        let provider = ScriptedProvider {
            short_by: 1,
            healthy_after: Some(1),
            ..Default::default()
        };
        let mut config = IngestConfig::default();
        config.bulk_load = false;
        let mut session = BulkLoadSession::new(&provider, config);

        let err = session
            .insert_record("sample", &[Some("1"), Some("S1")])
            .unwrap_err();
        assert_eq!(err.to_string(), "bulk load into table 'sample' inserted 0 of 1 rows");
        assert_eq!(session.pending_rows("sample"), 1);

        session.insert_record("sample", &[Some("2"), Some("S2")]).unwrap();
        assert_eq!(session.flush_all().unwrap(), 0);
        assert_eq!(provider.recorded.lock().unwrap().batch_sizes, vec![1, 1]);

        // Held-back rows survive the flush until the caller takes them
        assert_eq!(session.pending_rows("sample"), 1);
        let held = session.take_held_back("sample");
        assert_eq!(held, vec![vec![Some("1".to_string()), Some("S1".to_string())]]);
        assert_eq!(session.pending_rows("sample"), 0);
    }

    #[test]
    fn test_direct_write_connection_failure_holds_row() {
        let provider = ScriptedProvider {
            fail: true,
            ..Default::default()
        };
        let mut config = IngestConfig::default();
        config.bulk_load = false;
        let mut session = BulkLoadSession::new(&provider, config);

        let err = session.insert_record("patient", &[Some("1"), Some("P1")]).unwrap_err();
        assert!(matches!(err, BulkLoadError::Database { .. }));
        assert_eq!(session.buffer("patient").unwrap().held_back().len(), 1);
        assert!(session.buffer("patient").unwrap().is_empty());

        // Arity is still fixed by the held-back row
        assert!(matches!(
            session.insert_record("patient", &[Some("2")]),
            Err(BulkLoadError::ArityMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_custom_null_sentinel() {
        let provider = ScriptedProvider::default();
        let mut config = IngestConfig::default();
        config.null_sentinel = "NA".to_string();
        let mut session = BulkLoadSession::new(&provider, config);

        session.insert_record("gene", &[Some("672"), Some("NA"), Some("\\N")]).unwrap();
        let buffer = session.buffer("gene").unwrap();
        assert_eq!(
            buffer.rows()[0],
            vec![Some("672".to_string()), None, Some("\\N".to_string())]
        );
    }
}
