//! # Schemabridge - Cross-database migration planning
//!
//! Paradigm-agnostic schema planning for relational, document, graph,
//! vector and streaming databases.
//!
//! Schemabridge provides:
//! - A capability registry for object types and data types
//! - Conversion matrix generation between database technologies
//! - Structural and enrichment-guided schema comparison
//! - User conversion contexts that bias conversion decisions
//! - A resource navigator resolving typed addresses into a unified model
//!
//! Nothing in this crate talks to a live database. Models, enrichments and
//! registries are handed in as values; every engine is a pure function of
//! its inputs.

pub mod model;
pub mod capability;
pub mod registry;
pub mod matrix;
pub mod compare;
pub mod context;
pub mod address;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use model::{ObjectType, Paradigm, SelectorKind, UnifiedModel, UnifiedModelEnrichment};
pub use capability::{DataTypeCapability, ObjectCapability};
pub use registry::{DatabaseFeatureSupport, FeatureRegistry, RegistryHandle, SupportLevel};
pub use matrix::{ComplexityClass, ConversionMatrix, MatrixGenerator, ObjectConversionRule};
pub use compare::{ComparisonEngine, ComparisonOptions, ComparisonResult};
pub use context::{ContextManager, UserConversionContext};
pub use address::{Navigator, ResourceAddress, ResourceLocation};

/// Result type alias for Schemabridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Schemabridge operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Cannot navigate '{path}': expected {expected}, found {actual}")]
    UnsupportedNavigation {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Technology '{technology}' unavailable for conversion: {detail}")]
    RegistryMissing { technology: String, detail: String },

    #[error("Context #{index} targets {actual}, expected {expected}")]
    IncompatibleContexts {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_navigation(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Error::UnsupportedNavigation {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn registry_missing(technology: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::RegistryMissing {
            technology: technology.into(),
            detail: detail.into(),
        }
    }
}
