//! User conversion context documents

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ObjectType;

/// What a conversion should optimize for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationGoal {
    #[default]
    Performance,
    Storage,
    Compatibility,
    Simplicity,
}

impl OptimizationGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationGoal::Performance => "performance",
            OptimizationGoal::Storage => "storage",
            OptimizationGoal::Compatibility => "compatibility",
            OptimizationGoal::Simplicity => "simplicity",
        }
    }
}

impl std::str::FromStr for OptimizationGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "performance" | "perf" | "speed" => Ok(OptimizationGoal::Performance),
            "storage" | "size" => Ok(OptimizationGoal::Storage),
            "compatibility" | "compat" => Ok(OptimizationGoal::Compatibility),
            "simplicity" | "simple" => Ok(OptimizationGoal::Simplicity),
            _ => Err(format!("Unknown optimization goal: {}", s)),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionPreferences {
    #[serde(default)]
    pub accept_data_loss: bool,
    #[serde(default)]
    pub optimize_for: OptimizationGoal,
    #[serde(default = "default_true")]
    pub preserve_relationships: bool,
    #[serde(default = "default_true")]
    pub include_metadata: bool,
}

impl Default for ConversionPreferences {
    fn default() -> Self {
        Self {
            accept_data_loss: false,
            optimize_for: OptimizationGoal::Performance,
            preserve_relationships: true,
            include_metadata: true,
        }
    }
}

/// How one source object should be converted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<ObjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<ObjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
}

impl ObjectMapping {
    pub fn new(source_type: ObjectType, target_type: ObjectType) -> Self {
        Self {
            source_type: Some(source_type),
            target_type: Some(target_type),
            target_name: None,
        }
    }

    pub fn renamed(mut self, target_name: impl Into<String>) -> Self {
        self.target_name = Some(target_name.into());
        self
    }
}

/// How one source member should be converted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default)]
    pub source_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_data_type: Option<String>,
    /// Free-form expression applied during conversion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,
}

impl FieldMapping {
    pub fn new(source_name: impl Into<String>, source_data_type: impl Into<String>, target_data_type: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            target_name: None,
            source_data_type: Some(source_data_type.into()),
            target_data_type: Some(target_data_type.into()),
            transformation: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRule {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredValidation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A user's conversion preferences for one (source, target) technology pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConversionContext {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub source_technology: String,
    #[serde(default)]
    pub target_technology: String,
    #[serde(default)]
    pub preferences: ConversionPreferences,
    /// Keyed by source object name
    #[serde(default)]
    pub object_mappings: BTreeMap<String, ObjectMapping>,
    /// Keyed `object.member`
    #[serde(default)]
    pub field_mappings: BTreeMap<String, FieldMapping>,
    #[serde(default)]
    pub custom_rules: Vec<CustomRule>,
    #[serde(default)]
    pub ignored_objects: Vec<String>,
    #[serde(default)]
    pub required_validations: Vec<RequiredValidation>,
    /// Answers to conversion decisions, keyed by decision key
    #[serde(default)]
    pub decision_answers: BTreeMap<String, String>,
    #[serde(default)]
    pub business_context: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl UserConversionContext {
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_preferences(mut self, preferences: ConversionPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_object_mapping(mut self, object: impl Into<String>, mapping: ObjectMapping) -> Self {
        self.object_mappings.insert(object.into(), mapping);
        self
    }

    pub fn with_field_mapping(mut self, key: impl Into<String>, mapping: FieldMapping) -> Self {
        self.field_mappings.insert(key.into(), mapping);
        self
    }

    pub fn with_custom_rule(mut self, rule: CustomRule) -> Self {
        self.custom_rules.push(rule);
        self
    }

    pub fn ignore(mut self, object: impl Into<String>) -> Self {
        self.ignored_objects.push(object.into());
        self
    }

    pub fn with_required_validation(mut self, validation: RequiredValidation) -> Self {
        self.required_validations.push(validation);
        self
    }

    pub fn answer(mut self, decision: impl Into<String>, answer: impl Into<String>) -> Self {
        self.decision_answers.insert(decision.into(), answer.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// The (source, target) pair this context applies to
    pub fn technology_pair(&self) -> (&str, &str) {
        (&self.source_technology, &self.target_technology)
    }
}
