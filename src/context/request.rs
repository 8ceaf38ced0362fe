//! Conversion requests shaped by a user context

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ConversionPreferences, FieldMapping, ObjectMapping};

/// A request handed to migration planning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub source_technology: String,
    pub target_technology: String,
    #[serde(default)]
    pub preferences: ConversionPreferences,
    /// Object names left out of the conversion
    #[serde(default)]
    pub excluded_objects: Vec<String>,
    #[serde(default)]
    pub object_mappings: BTreeMap<String, ObjectMapping>,
    #[serde(default)]
    pub field_mappings: BTreeMap<String, FieldMapping>,
}

impl ConversionRequest {
    pub fn new(source_technology: impl Into<String>, target_technology: impl Into<String>) -> Self {
        Self {
            source_technology: source_technology.into(),
            target_technology: target_technology.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn exclude(mut self, object: impl Into<String>) -> Self {
        self.excluded_objects.push(object.into());
        self
    }

    pub fn is_excluded(&self, object: &str) -> bool {
        self.excluded_objects.iter().any(|o| o == object)
    }
}
