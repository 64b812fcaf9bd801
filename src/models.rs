// ==============================================================================
// models.rs - Constraint Violation Records
// ==============================================================================
// Description: Read-only projections of the violation queries, created per
//              check and never persisted
// Author: Matt Barham
// Created: 2025-11-12
// Modified: 2025-11-21
// Version: 3.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};

/// Child row whose key has no matching parent row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyViolation {
    /// Child table (e.g., "mutation")
    pub referring_table: String,

    /// Comma-joined child key columns
    pub referring_columns: String,

    /// Pipe-joined key values of the orphaned row
    pub referring_values: String,

    /// Parent table the key should resolve to
    pub referenced_table: String,

    /// Comma-joined parent key columns
    pub referenced_columns: String,
}

/// Key value shared by more than one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueKeyViolation {
    pub table_name: String,

    /// Comma-joined key columns
    pub key_columns: String,

    /// Pipe-joined duplicated key value
    pub key_values: String,

    /// Number of rows sharing the key (always > 1)
    pub duplicate_count: u64,
}
