// ==============================================================================
// db/sqlite.rs - SQLite Backend
// ==============================================================================
// Description: rusqlite implementation of the database boundary
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-20
// Version: 1.1.0
// ==============================================================================

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::{ConnectionProvider, Database, DbError, Dialect, SqlValue, UpdateCount};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens one SQLite connection per acquisition
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    path: PathBuf,
}

impl SqliteProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionProvider for SqliteProvider {
    type Connection = SqliteDatabase;

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn acquire(&self) -> Result<SqliteDatabase, DbError> {
        SqliteDatabase::open(&self.path)
    }
}

/// Borrowed SQLite connection, closed on drop
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        debug!("Opening SQLite connection: {:?}", path.as_ref());
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Database for SqliteDatabase {
    fn execute_batch(
        &mut self,
        sql: &str,
        rows: &[Vec<Option<String>>],
    ) -> Result<Vec<UpdateCount>, DbError> {
        // One transaction per batch: a failing row rolls back the whole batch
        let tx = self.conn.transaction()?;
        let mut counts = Vec::with_capacity(rows.len());
        {
            let mut stmt = tx.prepare(sql)?;
            for row in rows {
                let changed = stmt.execute(params_from_iter(row.iter()))?;
                counts.push(UpdateCount::Rows(changed as u64));
            }
        }
        tx.commit()?;
        Ok(counts)
    }

    fn query_each(
        &mut self,
        sql: &str,
        visitor: &mut dyn FnMut(&[SqlValue]) -> Result<(), DbError>,
    ) -> Result<(), DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query([])?;
        let mut cells = Vec::with_capacity(column_count);

        while let Some(row) = rows.next()? {
            cells.clear();
            for idx in 0..column_count {
                cells.push(match row.get_ref(idx)? {
                    ValueRef::Null => SqlValue::Null,
                    ValueRef::Integer(v) => SqlValue::Integer(v),
                    ValueRef::Real(v) => SqlValue::Real(v),
                    ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                        SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
                    }
                });
            }
            visitor(&cells)?;
        }
        Ok(())
    }
}
