//! Enrichment - analysis-derived metadata attached to a unified model
//!
//! Enrichment is keyed by object name (and `object.member` for members) and
//! versioned independently of the schema structure. Keys that no longer
//! reference a structural object are tolerated; consumers simply skip them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Privacy risk levels, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Observed access pattern of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPattern {
    ReadHeavy,
    WriteHeavy,
    Balanced,
    Archival,
    Unused,
}

impl AccessPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessPattern::ReadHeavy => "read_heavy",
            AccessPattern::WriteHeavy => "write_heavy",
            AccessPattern::Balanced => "balanced",
            AccessPattern::Archival => "archival",
            AccessPattern::Unused => "unused",
        }
    }

    /// Changes on objects with this pattern matter less
    pub fn is_cold(&self) -> bool {
        matches!(self, AccessPattern::Archival | AccessPattern::Unused)
    }
}

/// Enrichment for a table or collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectEnrichment {
    /// e.g. `transactional`, `reference`, `audit_log`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default)]
    pub classification_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_pattern: Option<AccessPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_rows: Option<u64>,
}

/// Enrichment for a column, field or property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberEnrichment {
    #[serde(default)]
    pub is_privileged_data: bool,
    /// e.g. `email`, `credit_card`, `health`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_category: Option<String>,
    #[serde(default)]
    pub risk_level: RiskLevel,
    /// Privacy weight in [0, 1]
    #[serde(default)]
    pub privacy_weight: f64,
    #[serde(default)]
    pub confidence: f64,
}

impl MemberEnrichment {
    pub fn privileged(category: impl Into<String>, risk_level: RiskLevel, privacy_weight: f64) -> Self {
        Self {
            is_privileged_data: true,
            data_category: Some(category.into()),
            risk_level,
            privacy_weight: privacy_weight.clamp(0.0, 1.0),
            confidence: 1.0,
        }
    }
}

/// Enrichment for graph nodes and relationships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphEnrichment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default)]
    pub classification_score: f64,
}

/// Derived analysis for one schema, versioned apart from its structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedModelEnrichment {
    #[serde(default)]
    pub schema_id: String,
    #[serde(default)]
    pub enrichment_version: String,
    /// Tables and collections by name
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectEnrichment>,
    /// Columns, fields and properties keyed `object.member`
    #[serde(default)]
    pub members: BTreeMap<String, MemberEnrichment>,
    #[serde(default)]
    pub nodes: BTreeMap<String, GraphEnrichment>,
    #[serde(default)]
    pub relationships: BTreeMap<String, GraphEnrichment>,
}

/// Key under which member enrichment is stored
pub fn member_key(object: &str, member: &str) -> String {
    format!("{}.{}", object, member)
}

impl UnifiedModelEnrichment {
    pub fn new(schema_id: impl Into<String>, enrichment_version: impl Into<String>) -> Self {
        Self {
            schema_id: schema_id.into(),
            enrichment_version: enrichment_version.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_object(mut self, name: impl Into<String>, enrichment: ObjectEnrichment) -> Self {
        self.objects.insert(name.into(), enrichment);
        self
    }

    pub fn with_member(mut self, object: &str, member: &str, enrichment: MemberEnrichment) -> Self {
        self.members.insert(member_key(object, member), enrichment);
        self
    }

    pub fn with_node(mut self, label: impl Into<String>, enrichment: GraphEnrichment) -> Self {
        self.nodes.insert(label.into(), enrichment);
        self
    }

    pub fn with_relationship(mut self, name: impl Into<String>, enrichment: GraphEnrichment) -> Self {
        self.relationships.insert(name.into(), enrichment);
        self
    }

    pub fn object(&self, name: &str) -> Option<&ObjectEnrichment> {
        self.objects.get(name)
    }

    pub fn member(&self, object: &str, member: &str) -> Option<&MemberEnrichment> {
        self.members.get(&member_key(object, member))
    }
}
