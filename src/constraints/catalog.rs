// ==============================================================================
// constraints/catalog.rs - Genomics Warehouse Constraint Catalog
// ==============================================================================
// Description: Relationships and keys of the genomics warehouse schema that
//              the columnar engine stores but never enforces
// Author: Matt Barham
// Created: 2025-11-15
// Modified: 2025-11-21
// Version: 1.1.0
// ==============================================================================
// Keep in sync with the schema migrations: there is no introspection, a new
// table or key has to be added here by hand.
// ==============================================================================

use super::schema::{ConstraintCatalog, ConstraintError, ForeignKeyConstraint, UniqueKeyConstraint};

pub const GENOMICS_SCHEMA_VERSION: &str = "2.14.0";

type ForeignKeyDef = (&'static str, &'static [&'static str], &'static str, &'static [&'static str]);
type UniqueKeyDef = (&'static str, &'static [&'static str]);

const FOREIGN_KEYS: &[ForeignKeyDef] = &[
    ("cancer_study", &["type_of_cancer_id"], "type_of_cancer", &["type_of_cancer_id"]),
    ("cancer_study", &["reference_genome_id"], "reference_genome", &["reference_genome_id"]),
    ("patient", &["cancer_study_id"], "cancer_study", &["cancer_study_id"]),
    ("sample", &["patient_id"], "patient", &["internal_id"]),
    ("sample_list", &["cancer_study_id"], "cancer_study", &["cancer_study_id"]),
    ("sample_list_list", &["list_id"], "sample_list", &["list_id"]),
    ("sample_list_list", &["sample_id"], "sample", &["internal_id"]),
    ("gene", &["genetic_entity_id"], "genetic_entity", &["id"]),
    ("genetic_profile", &["cancer_study_id"], "cancer_study", &["cancer_study_id"]),
    ("genetic_alteration", &["genetic_profile_id"], "genetic_profile", &["genetic_profile_id"]),
    ("genetic_alteration", &["genetic_entity_id"], "genetic_entity", &["id"]),
    ("gene_panel_list", &["internal_id"], "gene_panel", &["internal_id"]),
    ("gene_panel_list", &["gene_id"], "gene", &["entrez_gene_id"]),
    ("sample_profile", &["sample_id"], "sample", &["internal_id"]),
    ("sample_profile", &["genetic_profile_id"], "genetic_profile", &["genetic_profile_id"]),
    ("sample_profile", &["panel_id"], "gene_panel", &["internal_id"]),
    ("mutation_event", &["entrez_gene_id"], "gene", &["entrez_gene_id"]),
    ("mutation", &["mutation_event_id"], "mutation_event", &["mutation_event_id"]),
    ("mutation", &["genetic_profile_id"], "genetic_profile", &["genetic_profile_id"]),
    ("mutation", &["sample_id"], "sample", &["internal_id"]),
    ("mutation", &["entrez_gene_id"], "gene", &["entrez_gene_id"]),
    (
        "alteration_driver_annotation",
        &["genetic_profile_id", "sample_id"],
        "sample_profile",
        &["genetic_profile_id", "sample_id"],
    ),
    ("cna_event", &["entrez_gene_id"], "gene", &["entrez_gene_id"]),
    ("sample_cna_event", &["cna_event_id"], "cna_event", &["cna_event_id"]),
    ("sample_cna_event", &["sample_id"], "sample", &["internal_id"]),
    ("sample_cna_event", &["genetic_profile_id"], "genetic_profile", &["genetic_profile_id"]),
    ("structural_variant", &["genetic_profile_id"], "genetic_profile", &["genetic_profile_id"]),
    ("structural_variant", &["sample_id"], "sample", &["internal_id"]),
    ("structural_variant", &["site1_entrez_gene_id"], "gene", &["entrez_gene_id"]),
    ("structural_variant", &["site2_entrez_gene_id"], "gene", &["entrez_gene_id"]),
    ("clinical_patient", &["internal_id"], "patient", &["internal_id"]),
    ("clinical_sample", &["internal_id"], "sample", &["internal_id"]),
    ("clinical_attribute_meta", &["cancer_study_id"], "cancer_study", &["cancer_study_id"]),
    ("clinical_event", &["patient_id"], "patient", &["internal_id"]),
    ("clinical_event_data", &["clinical_event_id"], "clinical_event", &["clinical_event_id"]),
];

const UNIQUE_KEYS: &[UniqueKeyDef] = &[
    ("type_of_cancer", &["type_of_cancer_id"]),
    ("reference_genome", &["reference_genome_id"]),
    ("cancer_study", &["cancer_study_id"]),
    ("cancer_study", &["cancer_study_identifier"]),
    ("patient", &["internal_id"]),
    ("patient", &["stable_id", "cancer_study_id"]),
    ("sample", &["internal_id"]),
    ("sample", &["stable_id", "patient_id"]),
    ("sample_list", &["list_id"]),
    ("sample_list", &["stable_id"]),
    ("sample_list_list", &["list_id", "sample_id"]),
    ("genetic_entity", &["id"]),
    ("gene", &["entrez_gene_id"]),
    ("gene", &["genetic_entity_id"]),
    ("genetic_profile", &["genetic_profile_id"]),
    ("genetic_profile", &["stable_id"]),
    ("genetic_alteration", &["genetic_profile_id", "genetic_entity_id"]),
    ("gene_panel", &["internal_id"]),
    ("gene_panel", &["stable_id"]),
    ("gene_panel_list", &["internal_id", "gene_id"]),
    ("sample_profile", &["sample_id", "genetic_profile_id"]),
    ("mutation_event", &["mutation_event_id"]),
    ("mutation", &["mutation_event_id", "genetic_profile_id", "sample_id"]),
    (
        "alteration_driver_annotation",
        &["alteration_event_id", "genetic_profile_id", "sample_id"],
    ),
    ("cna_event", &["cna_event_id"]),
    ("cna_event", &["entrez_gene_id", "alteration"]),
    ("sample_cna_event", &["cna_event_id", "sample_id", "genetic_profile_id"]),
    ("structural_variant", &["internal_id"]),
    ("clinical_patient", &["internal_id", "attr_id"]),
    ("clinical_sample", &["internal_id", "attr_id"]),
    ("clinical_attribute_meta", &["attr_id", "cancer_study_id"]),
    ("clinical_event", &["clinical_event_id"]),
    ("clinical_event_data", &["clinical_event_id", "key"]),
];

/// Constraint catalog of schema version [`GENOMICS_SCHEMA_VERSION`]
pub fn genomics_catalog() -> Result<ConstraintCatalog, ConstraintError> {
    let foreign_keys = FOREIGN_KEYS
        .iter()
        .map(|(child, child_cols, parent, parent_cols)| {
            ForeignKeyConstraint::new(child, child_cols, parent, parent_cols)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let unique_keys = UNIQUE_KEYS
        .iter()
        .map(|(table, columns)| UniqueKeyConstraint::new(table, columns))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ConstraintCatalog::new(GENOMICS_SCHEMA_VERSION, foreign_keys, unique_keys))
}
