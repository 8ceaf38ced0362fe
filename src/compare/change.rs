//! Change records produced by a comparison

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ObjectType;

/// Change severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        }
    }

    /// One level lower, bottoming out at minor
    pub fn downgrade(self) -> Self {
        match self {
            Severity::Critical => Severity::Major,
            Severity::Major | Severity::Minor => Severity::Minor,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    ObjectAdded,
    ObjectRemoved,
    FieldAdded,
    FieldRemoved,
    TypeChanged,
    NullabilityChanged,
    DefaultChanged,
    FieldReordered,
    CommentChanged,
    AttributeChanged,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::ObjectAdded => "object_added",
            ChangeType::ObjectRemoved => "object_removed",
            ChangeType::FieldAdded => "field_added",
            ChangeType::FieldRemoved => "field_removed",
            ChangeType::TypeChanged => "type_changed",
            ChangeType::NullabilityChanged => "nullability_changed",
            ChangeType::DefaultChanged => "default_changed",
            ChangeType::FieldReordered => "field_reordered",
            ChangeType::CommentChanged => "comment_changed",
            ChangeType::AttributeChanged => "attribute_changed",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single structural difference between two models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralChange {
    pub change_type: ChangeType,
    pub object_type: ObjectType,
    pub object: String,
    /// Member name for member-level changes, attribute name for attribute changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    /// Severity after enrichment adjustments
    pub severity: Severity,
    /// Severity from structure alone
    pub raw_severity: Severity,
    pub breaking: bool,
    pub description: String,
}

impl StructuralChange {
    pub fn new(
        change_type: ChangeType,
        object_type: ObjectType,
        object: impl Into<String>,
        severity: Severity,
        breaking: bool,
    ) -> Self {
        let object = object.into();
        Self {
            change_type,
            object_type,
            description: format!("{} {} {}", object_type, object, change_type),
            object,
            member: None,
            old_value: None,
            new_value: None,
            severity,
            raw_severity: severity,
            breaking,
        }
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    pub fn with_values(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old_value = old;
        self.new_value = new;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Changes that concern a single column, field or property
    pub fn is_member_change(&self) -> bool {
        matches!(
            self.change_type,
            ChangeType::FieldAdded
                | ChangeType::FieldRemoved
                | ChangeType::TypeChanged
                | ChangeType::NullabilityChanged
                | ChangeType::DefaultChanged
                | ChangeType::FieldReordered
        ) || (self.change_type == ChangeType::CommentChanged && self.member.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentChangeType {
    PrivilegedFlagChanged,
    RiskLevelChanged,
    PrivacyWeightChanged,
    ClassificationChanged,
    ClassificationScoreChanged,
    AccessPatternChanged,
}

impl EnrichmentChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentChangeType::PrivilegedFlagChanged => "privileged_flag_changed",
            EnrichmentChangeType::RiskLevelChanged => "risk_level_changed",
            EnrichmentChangeType::PrivacyWeightChanged => "privacy_weight_changed",
            EnrichmentChangeType::ClassificationChanged => "classification_changed",
            EnrichmentChangeType::ClassificationScoreChanged => "classification_score_changed",
            EnrichmentChangeType::AccessPatternChanged => "access_pattern_changed",
        }
    }
}

impl std::fmt::Display for EnrichmentChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A difference between two enrichment documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentChange {
    pub change_type: EnrichmentChangeType,
    /// Enrichment key: object name or `object.member`
    pub key: String,
    pub old_value: String,
    pub new_value: String,
    pub severity: Severity,
}

/// Counts over a comparison's change records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub objects_added: usize,
    pub objects_removed: usize,
    pub objects_matched: usize,
    pub total_changes: usize,
    pub breaking_changes: usize,
    pub enrichment_changes: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_change_type: BTreeMap<ChangeType, usize>,
}

impl ComparisonSummary {
    pub fn from_changes(
        changes: &[StructuralChange],
        enrichment_changes: &[EnrichmentChange],
        objects_matched: usize,
    ) -> Self {
        let mut summary = Self {
            objects_matched,
            total_changes: changes.len(),
            enrichment_changes: enrichment_changes.len(),
            ..Self::default()
        };

        for change in changes {
            match change.change_type {
                ChangeType::ObjectAdded => summary.objects_added += 1,
                ChangeType::ObjectRemoved => summary.objects_removed += 1,
                _ => {}
            }
            if change.breaking {
                summary.breaking_changes += 1;
            }
            *summary.by_severity.entry(change.severity).or_default() += 1;
            *summary.by_change_type.entry(change.change_type).or_default() += 1;
        }

        summary
    }
}
