// ==============================================================================
// config.rs - Ingest Session Configuration
// ==============================================================================
// Description: Switches toggled by the ingestion orchestrator around a unit
//              of work (bulk mode, relaxed row-count checks, NULL sentinel)
// Author: Matt Barham
// Created: 2025-11-14
// Modified: 2025-11-20
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Historical NULL marker of tab-delimited bulk files
pub const DEFAULT_NULL_SENTINEL: &str = "\\N";

const ENV_BULK_LOAD: &str = "GENOMICS_BULK_LOAD";
const ENV_RELAXED_MODE: &str = "GENOMICS_RELAXED_MODE";
const ENV_NULL_SENTINEL: &str = "GENOMICS_NULL_SENTINEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Buffer rows until `flush_all` (otherwise every row is written at once)
    pub bulk_load: bool,

    /// Tolerate flushes that insert fewer rows than were staged
    pub relaxed_mode: bool,

    /// Field value that is bound as SQL NULL
    pub null_sentinel: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bulk_load: true,
            relaxed_mode: false,
            null_sentinel: DEFAULT_NULL_SENTINEL.to_string(),
        }
    }
}

impl IngestConfig {
    /// Defaults overridden by `GENOMICS_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BULK_LOAD) {
            config.bulk_load = parse_flag(ENV_BULK_LOAD, &value, config.bulk_load);
        }
        if let Some(value) = lookup(ENV_RELAXED_MODE) {
            config.relaxed_mode = parse_flag(ENV_RELAXED_MODE, &value, config.relaxed_mode);
        }
        if let Some(value) = lookup(ENV_NULL_SENTINEL) {
            config.null_sentinel = value;
        }

        config
    }
}

fn parse_flag(key: &str, value: &str, fallback: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!("Invalid boolean '{}' for {}, keeping {}", value, key, fallback);
            fallback
        }
    }
}
