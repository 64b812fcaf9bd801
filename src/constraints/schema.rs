// ==============================================================================
// constraints/schema.rs - Declarative Constraint Catalog
// ==============================================================================
// Description: Foreign-key and unique-key definitions the warehouse does not
//              enforce, normalized to lower case at construction
// Author: Matt Barham
// Created: 2025-11-15
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================

use std::fmt;
use thiserror::Error;

use crate::sql::Ident;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Constraint has an empty table name")]
    EmptyTable,

    #[error("Constraint on table '{0}' has no columns")]
    NoColumns(String),

    #[error("Constraint on table '{0}' has an empty column name")]
    EmptyColumnName(String),

    #[error("Foreign key {child_table} -> {parent_table} maps {child_arity} columns onto {parent_arity}")]
    ArityMismatch {
        child_table: String,
        parent_table: String,
        child_arity: usize,
        parent_arity: usize,
    },
}

fn table_ident(name: &str) -> Result<Ident, ConstraintError> {
    let ident = Ident::new(name);
    if ident.is_empty() {
        return Err(ConstraintError::EmptyTable);
    }
    Ok(ident)
}

fn column_idents(table: &Ident, columns: &[&str]) -> Result<Vec<Ident>, ConstraintError> {
    if columns.is_empty() {
        return Err(ConstraintError::NoColumns(table.to_string()));
    }
    columns
        .iter()
        .map(|c| {
            let ident = Ident::new(c);
            if ident.is_empty() {
                Err(ConstraintError::EmptyColumnName(table.to_string()))
            } else {
                Ok(ident)
            }
        })
        .collect()
}

fn csv(columns: &[Ident]) -> String {
    columns
        .iter()
        .map(Ident::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Child columns that must match a row of the parent table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    child_table: Ident,
    child_columns: Vec<Ident>,
    parent_table: Ident,
    parent_columns: Vec<Ident>,
}

impl ForeignKeyConstraint {
    pub fn new(
        child_table: &str,
        child_columns: &[&str],
        parent_table: &str,
        parent_columns: &[&str],
    ) -> Result<Self, ConstraintError> {
        let child_table = table_ident(child_table)?;
        let parent_table = table_ident(parent_table)?;
        let child_columns = column_idents(&child_table, child_columns)?;
        let parent_columns = column_idents(&parent_table, parent_columns)?;

        if child_columns.len() != parent_columns.len() {
            return Err(ConstraintError::ArityMismatch {
                child_table: child_table.to_string(),
                parent_table: parent_table.to_string(),
                child_arity: child_columns.len(),
                parent_arity: parent_columns.len(),
            });
        }

        Ok(Self {
            child_table,
            child_columns,
            parent_table,
            parent_columns,
        })
    }

    pub fn child_table(&self) -> &Ident {
        &self.child_table
    }

    pub fn child_columns(&self) -> &[Ident] {
        &self.child_columns
    }

    pub fn parent_table(&self) -> &Ident {
        &self.parent_table
    }

    pub fn parent_columns(&self) -> &[Ident] {
        &self.parent_columns
    }

    /// Comma-joined child columns, as reported in violations
    pub fn child_columns_csv(&self) -> String {
        csv(&self.child_columns)
    }

    pub fn parent_columns_csv(&self) -> String {
        csv(&self.parent_columns)
    }
}

impl fmt::Display for ForeignKeyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) -> {}({})",
            self.child_table,
            self.child_columns_csv(),
            self.parent_table,
            self.parent_columns_csv()
        )
    }
}

/// Column set whose non-null values must not repeat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKeyConstraint {
    table: Ident,
    columns: Vec<Ident>,
}

impl UniqueKeyConstraint {
    pub fn new(table: &str, columns: &[&str]) -> Result<Self, ConstraintError> {
        let table = table_ident(table)?;
        let columns = column_idents(&table, columns)?;
        Ok(Self { table, columns })
    }

    pub fn table(&self) -> &Ident {
        &self.table
    }

    pub fn columns(&self) -> &[Ident] {
        &self.columns
    }

    pub fn columns_csv(&self) -> String {
        csv(&self.columns)
    }
}

impl fmt::Display for UniqueKeyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.table, self.columns_csv())
    }
}

/// Immutable set of constraints mirroring one schema version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintCatalog {
    schema_version: String,
    foreign_keys: Vec<ForeignKeyConstraint>,
    unique_keys: Vec<UniqueKeyConstraint>,
}

impl ConstraintCatalog {
    pub fn new(
        schema_version: impl Into<String>,
        foreign_keys: Vec<ForeignKeyConstraint>,
        unique_keys: Vec<UniqueKeyConstraint>,
    ) -> Self {
        Self {
            schema_version: schema_version.into(),
            foreign_keys,
            unique_keys,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyConstraint] {
        &self.foreign_keys
    }

    pub fn unique_keys(&self) -> &[UniqueKeyConstraint] {
        &self.unique_keys
    }

    pub fn is_empty(&self) -> bool {
        self.foreign_keys.is_empty() && self.unique_keys.is_empty()
    }

    /// Foreign keys grouped by child table, tables in first-appearance order
    pub fn foreign_keys_by_table(&self) -> Vec<(&Ident, Vec<&ForeignKeyConstraint>)> {
        group_by_table(&self.foreign_keys, ForeignKeyConstraint::child_table)
    }

    /// Unique keys grouped by table, tables in first-appearance order
    pub fn unique_keys_by_table(&self) -> Vec<(&Ident, Vec<&UniqueKeyConstraint>)> {
        group_by_table(&self.unique_keys, UniqueKeyConstraint::table)
    }
}

fn group_by_table<'a, T>(items: &'a [T], table: fn(&T) -> &Ident) -> Vec<(&'a Ident, Vec<&'a T>)> {
    let mut groups: Vec<(&Ident, Vec<&T>)> = Vec::new();
    for item in items {
        let name = table(item);
        match groups.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, members)) => members.push(item),
            None => groups.push((name, vec![item])),
        }
    }
    groups
}
