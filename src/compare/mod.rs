//! Comparison Engine - structural and enrichment-guided schema diffs
//!
//! Modes:
//! - `structural`: objects matched by type and name, diffed member by member
//! - `guided`: enrichment escalates or downgrades change severities
//! - `enriched`: guided, plus enrichment change records and an enrichment
//!   similarity folded into the overall score
//!
//! Scores and the migration complexity ladder live in [`scoring`].

pub mod change;
pub mod engine;
pub mod enrichment;
pub mod options;
pub mod scoring;
pub mod structural;
pub mod types;

pub use change::{
    ChangeType, ComparisonSummary, EnrichmentChange, EnrichmentChangeType, Severity, StructuralChange,
};
pub use engine::{ComparisonEngine, ComparisonResult};
pub use enrichment::Snapshot;
pub use options::{ComparisonMode, ComparisonOptions, EnrichmentCategory, ObjectFilter};
