// ==============================================================================
// db/mod.rs - Database Boundary
// ==============================================================================
// Description: Borrowed-connection traits shared by the sequence allocator,
//              the bulk loader and the constraint checker
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-20
// Version: 1.1.0
// ==============================================================================

pub mod sqlite;

use thiserror::Error;

pub use crate::sql::Dialect;
pub use sqlite::{SqliteDatabase, SqliteProvider};

/// Errors raised by a database backend
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Failed to decode result row: {0}")]
    Decode(String),
}

/// Single result cell
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Text rendering of the cell, `None` for NULL
    pub fn as_text(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Integer(v) => Some(v.to_string()),
            SqlValue::Real(v) => Some(v.to_string()),
            SqlValue::Text(v) => Some(v.clone()),
        }
    }

    /// Integer value of the cell, parsing text when needed.
    /// Reals convert only when integral and in range.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Null => None,
            SqlValue::Integer(v) => Some(*v),
            SqlValue::Real(v) if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 => {
                Some(*v as i64)
            }
            SqlValue::Real(_) => None,
            SqlValue::Text(v) => v.trim().parse().ok(),
        }
    }
}

/// Per-statement outcome of a batched execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateCount {
    Rows(u64),
    /// Backend executed the statement but cannot say how many rows it touched
    SuccessNoInfo,
}

/// One borrowed connection
pub trait Database {
    /// Execute `sql` once per parameter set and report one count per set.
    /// `None` fields bind as SQL NULL.
    fn execute_batch(
        &mut self,
        sql: &str,
        rows: &[Vec<Option<String>>],
    ) -> Result<Vec<UpdateCount>, DbError>;

    /// Run a query and hand each row to `visitor` as it is read
    fn query_each(
        &mut self,
        sql: &str,
        visitor: &mut dyn FnMut(&[SqlValue]) -> Result<(), DbError>,
    ) -> Result<(), DbError>;
}

/// Source of connections.
///
/// Acquired connections are released when dropped, so every caller scopes a
/// connection to a single operation and error paths cannot leak it.
pub trait ConnectionProvider {
    type Connection: Database;

    fn dialect(&self) -> Dialect;

    fn acquire(&self) -> Result<Self::Connection, DbError>;
}

impl<T: ConnectionProvider + ?Sized> ConnectionProvider for &T {
    type Connection = T::Connection;

    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn acquire(&self) -> Result<Self::Connection, DbError> {
        (**self).acquire()
    }
}
