// ==============================================================================
// sequence.rs - In-Process Sequence Allocator
// ==============================================================================
// Description: Monotonic identifier allocation for tables the warehouse
//              cannot auto-increment, seeded from MAX(column)
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================
// SINGLE WRITER: counters live in this process only. Two processes loading
// the same database will mint the same identifiers. Run exactly one ingest
// process per target database, or coordinate writers externally.
// ==============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use thiserror::Error;
use tracing::debug;

use crate::db::{ConnectionProvider, Database, DbError, SqlValue};
use crate::sql::{max_value_query, Ident};

#[derive(Error, Debug)]
pub enum SequenceError {
    #[error("Unknown sequence: {0}")]
    UnknownSequence(String),

    #[error("Sequence {0} is already registered")]
    DuplicateSequence(String),

    #[error("Failed to bootstrap sequence {sequence}: {source}")]
    Bootstrap {
        sequence: String,
        #[source]
        source: DbError,
    },

    #[error("Sequence {sequence} is exhausted")]
    Exhausted { sequence: String },
}

/// Backing table/column of a sequence, read only at bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSource {
    pub table: Ident,
    pub column: Ident,
}

/// Static name -> (table, column) registration table
#[derive(Debug, Clone, Default)]
pub struct SequenceRegistry {
    entries: Vec<(String, SequenceSource)>,
}

impl SequenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, table: &str, column: &str) -> Result<(), SequenceError> {
        if self.entries.iter().any(|(existing, _)| existing == name) {
            return Err(SequenceError::DuplicateSequence(name.to_string()));
        }
        self.entries.push((
            name.to_string(),
            SequenceSource {
                table: Ident::new(table),
                column: Ident::new(column),
            },
        ));
        Ok(())
    }

    /// Sequences of the genomics warehouse schema
    pub fn genomics_default() -> Self {
        const SEQUENCES: &[(&str, &str, &str)] = &[
            ("cancer_study", "cancer_study", "cancer_study_id"),
            ("patient", "patient", "internal_id"),
            ("sample", "sample", "internal_id"),
            ("sample_list", "sample_list", "list_id"),
            ("genetic_profile", "genetic_profile", "genetic_profile_id"),
            ("genetic_entity", "genetic_entity", "id"),
            ("gene_panel", "gene_panel", "internal_id"),
            ("mutation_event", "mutation_event", "mutation_event_id"),
            ("cna_event", "cna_event", "cna_event_id"),
            ("structural_variant", "structural_variant", "internal_id"),
            ("clinical_event", "clinical_event", "clinical_event_id"),
        ];

        Self {
            entries: SEQUENCES
                .iter()
                .map(|(name, table, column)| {
                    (
                        name.to_string(),
                        SequenceSource {
                            table: Ident::new(table),
                            column: Ident::new(column),
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SequenceSource> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, source)| source)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

struct SequenceSlot {
    source: SequenceSource,
    counter: OnceLock<AtomicI64>,
    bootstrap: Mutex<()>,
}

/// Hands out strictly increasing ids per sequence.
///
/// The first call for a name runs `SELECT max(column)` under that name's
/// bootstrap lock; afterwards ids come from a lock-free atomic increment.
/// See the module header for the single-writer constraint.
pub struct SequenceAllocator<P> {
    provider: P,
    slots: HashMap<String, SequenceSlot>,
}

impl<P: ConnectionProvider> SequenceAllocator<P> {
    pub fn new(provider: P, registry: SequenceRegistry) -> Self {
        let slots = registry
            .entries
            .into_iter()
            .map(|(name, source)| {
                (
                    name,
                    SequenceSlot {
                        source,
                        counter: OnceLock::new(),
                        bootstrap: Mutex::new(()),
                    },
                )
            })
            .collect();

        Self { provider, slots }
    }

    /// Next id for `name`; the first id after bootstrap is `max + 1`
    pub fn next_id(&self, name: &str) -> Result<i64, SequenceError> {
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| SequenceError::UnknownSequence(name.to_string()))?;

        let counter = match slot.counter.get() {
            Some(counter) => counter,
            None => self.bootstrap(name, slot)?,
        };

        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map(|last| last + 1)
            .map_err(|_| SequenceError::Exhausted {
                sequence: name.to_string(),
            })
    }

    /// Last id handed out (or the seed), `None` before bootstrap
    pub fn current(&self, name: &str) -> Result<Option<i64>, SequenceError> {
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| SequenceError::UnknownSequence(name.to_string()))?;

        Ok(slot.counter.get().map(|c| c.load(Ordering::SeqCst)))
    }

    fn bootstrap<'s>(&self, name: &str, slot: &'s SequenceSlot) -> Result<&'s AtomicI64, SequenceError> {
        // The guard protects no data, so a poisoned lock is still usable
        let _guard = slot.bootstrap.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(counter) = slot.counter.get() {
            return Ok(counter);
        }

        let seed = self
            .load_max(&slot.source)
            .map_err(|source| SequenceError::Bootstrap {
                sequence: name.to_string(),
                source,
            })?;

        debug!(
            "Bootstrapped sequence {} from {}.{} at {}",
            name, slot.source.table, slot.source.column, seed
        );

        Ok(slot.counter.get_or_init(|| AtomicI64::new(seed)))
    }

    fn load_max(&self, source: &SequenceSource) -> Result<i64, DbError> {
        let sql = max_value_query(&source.table, &source.column, self.provider.dialect());
        let mut conn = self.provider.acquire()?;

        let mut first_row: Option<Vec<SqlValue>> = None;
        conn.query_each(&sql, &mut |row| {
            if first_row.is_none() {
                first_row = Some(row.to_vec());
            }
            Ok(())
        })?;

        // Only an empty result or a NULL max seeds zero
        let cell = match first_row.as_deref() {
            None | Some([SqlValue::Null, ..]) => return Ok(0),
            Some([cell, ..]) => cell,
            Some([]) => {
                return Err(DbError::Decode(format!(
                    "max({}) of {} returned no columns",
                    source.column, source.table
                )))
            }
        };

        cell.as_i64().ok_or_else(|| {
            DbError::Decode(format!(
                "max({}) of {} is not an integer: {:?}",
                source.column, source.table, cell
            ))
        })
    }
}
