// ==============================================================================
// constraints/mod.rs - Constraint Violation Engine
// ==============================================================================
// Description: Declarative catalog of warehouse keys, query synthesis and the
//              read-only checker that reports violations
// Author: Matt Barham
// Created: 2025-11-15
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================

pub mod catalog;
pub mod checker;
pub mod schema;
pub mod synthesizer;

pub use catalog::{genomics_catalog, GENOMICS_SCHEMA_VERSION};
pub use checker::{ConstraintCheckError, ConstraintChecker};
pub use schema::{ConstraintCatalog, ConstraintError, ForeignKeyConstraint, UniqueKeyConstraint};
pub use synthesizer::ConstraintQuerySynthesizer;
