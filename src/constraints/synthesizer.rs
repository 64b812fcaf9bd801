// ==============================================================================
// constraints/synthesizer.rs - Violation Query Synthesis
// ==============================================================================
// Description: Builds one foreign-key and one unique-key master query from a
//              constraint catalog, grouped per table and joined by UNION ALL
// Author: Matt Barham
// Created: 2025-11-15
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================

use std::sync::{Arc, OnceLock};
use tracing::debug;

use super::schema::{ConstraintCatalog, ForeignKeyConstraint, UniqueKeyConstraint};
use crate::sql::{Dialect, Expr, Ident, Select};

/// Result columns of the foreign-key master query, in order
pub const FOREIGN_KEY_COLUMNS: [&str; 5] = [
    "referring_table",
    "referring_columns",
    "referring_values",
    "referenced_table",
    "referenced_columns",
];

/// Result columns of the unique-key master query, in order
pub const UNIQUE_KEY_COLUMNS: [&str; 4] = ["table_name", "key_columns", "key_values", "duplicate_count"];

const CHILD_ALIAS: &str = "c";
const PARENT_ALIAS: &str = "p";
const TABLE_ALIAS: &str = "t";

/// Orphaned child rows of one foreign key.
///
/// Rows with any NULL key column are skipped: partial keys are not
/// violations.
pub fn foreign_key_fragment(fk: &ForeignKeyConstraint) -> Select {
    let on = fk
        .child_columns()
        .iter()
        .zip(fk.parent_columns())
        .map(|(child, parent)| Expr::column(CHILD_ALIAS, child).equals(Expr::column(PARENT_ALIAS, parent)))
        .collect();

    let mut select = Select::from(fk.child_table(), Some(CHILD_ALIAS))
        .project(Expr::literal(fk.child_table().as_str()), FOREIGN_KEY_COLUMNS[0])
        .project(Expr::literal(fk.child_columns_csv()), FOREIGN_KEY_COLUMNS[1])
        .project(Expr::pipe_joined(CHILD_ALIAS, fk.child_columns()), FOREIGN_KEY_COLUMNS[2])
        .project(Expr::literal(fk.parent_table().as_str()), FOREIGN_KEY_COLUMNS[3])
        .project(Expr::literal(fk.parent_columns_csv()), FOREIGN_KEY_COLUMNS[4])
        .left_join(fk.parent_table(), PARENT_ALIAS, on);

    for column in fk.child_columns() {
        select = select.filter(Expr::column(CHILD_ALIAS, column).is_not_null());
    }
    for column in fk.parent_columns() {
        select = select.filter(Expr::column(PARENT_ALIAS, column).is_null());
    }
    select
}

/// Non-null key values occurring more than once
pub fn unique_key_fragment(uk: &UniqueKeyConstraint) -> Select {
    let mut select = Select::from(uk.table(), Some(TABLE_ALIAS))
        .project(Expr::literal(uk.table().as_str()), UNIQUE_KEY_COLUMNS[0])
        .project(Expr::literal(uk.columns_csv()), UNIQUE_KEY_COLUMNS[1])
        .project(Expr::pipe_joined(TABLE_ALIAS, uk.columns()), UNIQUE_KEY_COLUMNS[2])
        .project(Expr::CountRows, UNIQUE_KEY_COLUMNS[3]);

    for column in uk.columns() {
        select = select.filter(Expr::column(TABLE_ALIAS, column).is_not_null());
    }
    for column in uk.columns() {
        select = select.group_by(Expr::column(TABLE_ALIAS, column));
    }
    select.having(Expr::CountRows.greater_than(Expr::Integer(1)))
}

fn union_groups<T>(
    groups: Vec<(&Ident, Vec<&T>)>,
    kind: &str,
    fragment: fn(&T) -> Select,
    dialect: Dialect,
) -> String {
    groups
        .into_iter()
        .map(|(table, members)| {
            let body = members
                .into_iter()
                .map(|member| fragment(member).render(dialect))
                .collect::<Vec<_>>()
                .join("\nUNION ALL\n");
            format!("-- {} of table {}\n{}", kind, table, body)
        })
        .collect::<Vec<_>>()
        .join("\nUNION ALL\n")
}

/// Compiles a catalog into its two master queries, once.
///
/// The catalog never changes after construction, so the cached strings are
/// never invalidated.
pub struct ConstraintQuerySynthesizer {
    catalog: Arc<ConstraintCatalog>,
    dialect: Dialect,
    foreign_key_query: OnceLock<String>,
    unique_key_query: OnceLock<String>,
}

impl ConstraintQuerySynthesizer {
    pub fn new(catalog: Arc<ConstraintCatalog>, dialect: Dialect) -> Self {
        Self {
            catalog,
            dialect,
            foreign_key_query: OnceLock::new(),
            unique_key_query: OnceLock::new(),
        }
    }

    pub fn catalog(&self) -> &ConstraintCatalog {
        &self.catalog
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Foreign-key master query; empty when the catalog has no foreign keys.
    ///
    /// On ClickHouse the union is wrapped in `SELECT * FROM (...)` carrying a
    /// query-level `SETTINGS join_use_nulls = 1` (ClickHouse 22.3 or newer).
    pub fn foreign_key_query(&self) -> &str {
        self.foreign_key_query.get_or_init(|| {
            let groups = self.catalog.foreign_keys_by_table();
            if groups.is_empty() {
                return String::new();
            }
            let mut sql = union_groups(groups, "foreign keys", foreign_key_fragment, self.dialect);
            if self.dialect == Dialect::ClickHouse {
                // Unmatched LEFT JOIN columns are defaults, not NULL, without
                // join_use_nulls. The outer SELECT makes it cover every branch.
                sql = format!("SELECT *\nFROM (\n{}\n)\nSETTINGS join_use_nulls = 1", sql);
            }
            debug!(
                "Synthesized foreign key query for {} constraints ({} bytes)",
                self.catalog.foreign_keys().len(),
                sql.len()
            );
            sql
        })
    }

    /// Unique-key master query; empty when the catalog has no unique keys
    pub fn unique_key_query(&self) -> &str {
        self.unique_key_query.get_or_init(|| {
            let groups = self.catalog.unique_keys_by_table();
            if groups.is_empty() {
                return String::new();
            }
            let sql = union_groups(groups, "unique keys", unique_key_fragment, self.dialect);
            debug!(
                "Synthesized unique key query for {} constraints ({} bytes)",
                self.catalog.unique_keys().len(),
                sql.len()
            );
            sql
        })
    }
}
