// ==============================================================================
// lib.rs - Genomics Ingest Library
// ==============================================================================
// Description: Loader-side plumbing for the genomics warehouse: id sequences,
//              buffered bulk inserts and constraint verification
// Author: Matt Barham
// Created: 2025-11-03
// Modified: 2025-11-21
// Version: 2.0.0
// ==============================================================================

pub mod bulk_load;
pub mod config;
pub mod constraints;
pub mod db;
pub mod models;
pub mod report;
pub mod sequence;
pub mod sql;

pub use bulk_load::{BulkLoadError, BulkLoadSession};
pub use config::IngestConfig;
pub use constraints::{ConstraintCatalog, ConstraintChecker};
pub use report::{ConstraintReport, ReportFormat};
pub use sequence::{SequenceAllocator, SequenceRegistry};
