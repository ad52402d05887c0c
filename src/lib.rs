// Synthetic Ledgers - Core Library
// Seeded generators for airline, banking and insurance datasets

pub mod config;
pub mod error;
pub mod random;
pub mod table;
pub mod identity;
pub mod manifest;
pub mod quality;
pub mod pipeline;

pub mod airline;
pub mod banking;
pub mod insurance;

// Re-export commonly used types
pub use config::{GeneratorConfig, SeedPolicy, VolumeBounds};
pub use error::GenError;
pub use random::Sampler;
pub use table::{read_or_empty, read_table, write_table, DataLayout, Domain};
pub use manifest::{Event, RunRecord};
pub use quality::{
    BatchSummary, DatasetQualityEngine, QualityIssue, QualityReport, Severity, ValidationResult,
};
pub use pipeline::{
    find_generator, recorded_runs, run_generator, run_pipeline, validate, verify, RunOutcome, Verification,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
