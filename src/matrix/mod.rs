//! Conversion Matrix - how one technology's schema becomes another's
//!
//! A [`ConversionMatrix`] is computed per (source, target) pair and is not
//! symmetric: (A → B) and (B → A) are generated independently.
//!
//! Rule kinds:
//! - `Direct`: same object type on both sides
//! - `Split`: one source type becomes several target types
//! - `Merge`: folded into a target type other rules already produce
//! - `Transform`: converted into a different target type
//! - `Emulate`: target imitates the type through alternatives
//! - `Drop`: no target equivalent

pub mod cache;
pub mod generator;
pub mod paradigm;

pub use cache::MatrixCache;
pub use generator::MatrixGenerator;
pub use paradigm::ParadigmCompatibility;

use crate::model::ObjectType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overall conversion difficulty, ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityClass {
    Trivial,
    Simple,
    Moderate,
    Complex,
    Impossible,
}

impl ComplexityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityClass::Trivial => "trivial",
            ComplexityClass::Simple => "simple",
            ComplexityClass::Moderate => "moderate",
            ComplexityClass::Complex => "complex",
            ComplexityClass::Impossible => "impossible",
        }
    }

    /// Multiplier applied to similarity when scoring compatibility
    pub fn compatibility_factor(&self) -> f64 {
        match self {
            ComplexityClass::Trivial => 1.0,
            ComplexityClass::Simple => 0.95,
            ComplexityClass::Moderate => 0.85,
            ComplexityClass::Complex => 0.7,
            ComplexityClass::Impossible => 0.0,
        }
    }
}

impl std::fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionKind {
    Direct,
    Split,
    Merge,
    Transform,
    Emulate,
    Drop,
}

impl ConversionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionKind::Direct => "direct",
            ConversionKind::Split => "split",
            ConversionKind::Merge => "merge",
            ConversionKind::Transform => "transform",
            ConversionKind::Emulate => "emulate",
            ConversionKind::Drop => "drop",
        }
    }
}

impl std::fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationLevel {
    Full,
    Partial,
    Manual,
    None,
}

impl AutomationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationLevel::Full => "full",
            AutomationLevel::Partial => "partial",
            AutomationLevel::Manual => "manual",
            AutomationLevel::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyTag {
    Direct,
    Normalization,
    Denormalization,
    Decomposition,
    Aggregation,
    Hybrid,
}

impl StrategyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyTag::Direct => "direct",
            StrategyTag::Normalization => "normalization",
            StrategyTag::Denormalization => "denormalization",
            StrategyTag::Decomposition => "decomposition",
            StrategyTag::Aggregation => "aggregation",
            StrategyTag::Hybrid => "hybrid",
        }
    }
}

/// Facts a rule needs before it can be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKey {
    PrimaryKey,
    PartitionKey,
    RelationshipCardinality,
    AccessPatterns,
    DataClassification,
    NestingDepth,
    EmbeddingDimensions,
}

impl ContextKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKey::PrimaryKey => "primary_key",
            ContextKey::PartitionKey => "partition_key",
            ContextKey::RelationshipCardinality => "relationship_cardinality",
            ContextKey::AccessPatterns => "access_patterns",
            ContextKey::DataClassification => "data_classification",
            ContextKey::NestingDepth => "nesting_depth",
            ContextKey::EmbeddingDimensions => "embedding_dimensions",
        }
    }

    /// Facts only an enrichment analysis can supply
    pub fn is_enrichment_derived(&self) -> bool {
        matches!(
            self,
            ContextKey::RelationshipCardinality | ContextKey::AccessPatterns | ContextKey::DataClassification
        )
    }
}

/// A choice a user has to make before a rule can run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDecision {
    /// Stable key, e.g. `table.partition_key`
    pub key: String,
    pub question: String,
    pub options: Vec<String>,
    pub recommended: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl UserDecision {
    pub fn new(key: impl Into<String>, question: impl Into<String>, options: &[&str], recommended: &str) -> Self {
        Self {
            key: key.into(),
            question: question.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            recommended: recommended.to_string(),
            answer: None,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectConversionRule {
    pub source_type: ObjectType,
    pub target_types: Vec<ObjectType>,
    pub kind: ConversionKind,
    #[serde(default)]
    pub required_context: Vec<ContextKey>,
    #[serde(default)]
    pub decisions: Vec<UserDecision>,
    pub automation: AutomationLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub limitations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ObjectConversionRule {
    pub fn has_decisions(&self) -> bool {
        !self.decisions.is_empty()
    }

    pub fn needs_enrichment(&self) -> bool {
        self.required_context.iter().any(ContextKey::is_enrichment_derived)
    }
}

/// Conversion plan for one (source, target) technology pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionMatrix {
    pub source: String,
    pub target: String,
    pub complexity: ComplexityClass,
    pub paradigm_compatibility: ParadigmCompatibility,
    pub rules: Vec<ObjectConversionRule>,
    pub unsupported_features: Vec<ObjectType>,
    pub requires_user_input: bool,
    pub requires_enrichment: bool,
    pub strategies: Vec<StrategyTag>,
}

impl ConversionMatrix {
    pub fn rule_for(&self, object_type: ObjectType) -> Option<&ObjectConversionRule> {
        self.rules.iter().find(|r| r.source_type == object_type)
    }

    /// Number of rules per conversion kind
    pub fn kind_counts(&self) -> BTreeMap<ConversionKind, usize> {
        let mut counts = BTreeMap::new();
        for rule in &self.rules {
            *counts.entry(rule.kind).or_default() += 1;
        }
        counts
    }

    /// Decisions that still lack an answer
    pub fn open_decisions(&self) -> impl Iterator<Item = &UserDecision> {
        self.rules
            .iter()
            .flat_map(|r| r.decisions.iter())
            .filter(|d| !d.is_answered())
    }

    /// BLAKE3 hex digest of the canonical JSON form
    pub fn fingerprint(&self) -> crate::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}
