//! Comparison configuration

use std::collections::BTreeSet;
use std::str::FromStr;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::model::ObjectType;
use crate::{Error, Result};

/// How much enrichment participates in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// Structure only
    #[default]
    Structural,
    /// Enrichment adjusts severities
    Guided,
    /// Guided, plus enrichment change records and similarity
    Enriched,
}

impl ComparisonMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::Structural => "structural",
            ComparisonMode::Guided => "guided",
            ComparisonMode::Enriched => "enriched",
        }
    }

    pub fn all() -> &'static [ComparisonMode] {
        &[
            ComparisonMode::Structural,
            ComparisonMode::Guided,
            ComparisonMode::Enriched,
        ]
    }

    pub fn uses_enrichment(&self) -> bool {
        !matches!(self, ComparisonMode::Structural)
    }
}

impl FromStr for ComparisonMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "structural" | "structure" => Ok(ComparisonMode::Structural),
            "guided" => Ok(ComparisonMode::Guided),
            "enriched" | "enrichment" | "full" => Ok(ComparisonMode::Enriched),
            _ => Err(format!("Unknown comparison mode: {}", s)),
        }
    }
}

impl std::fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentCategory {
    Classification,
    Privacy,
    Performance,
}

impl EnrichmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentCategory::Classification => "classification",
            EnrichmentCategory::Privacy => "privacy",
            EnrichmentCategory::Performance => "performance",
        }
    }

    pub fn all() -> &'static [EnrichmentCategory] {
        &[
            EnrichmentCategory::Classification,
            EnrichmentCategory::Privacy,
            EnrichmentCategory::Performance,
        ]
    }
}

impl FromStr for EnrichmentCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classification" | "class" => Ok(EnrichmentCategory::Classification),
            "privacy" | "pii" => Ok(EnrichmentCategory::Privacy),
            "performance" | "perf" => Ok(EnrichmentCategory::Performance),
            _ => Err(format!("Unknown enrichment category: {}", s)),
        }
    }
}

fn all_categories() -> BTreeSet<EnrichmentCategory> {
    EnrichmentCategory::all().iter().copied().collect()
}

fn default_privacy_threshold() -> f64 {
    0.7
}

fn default_score_tolerance() -> f64 {
    0.1
}

/// Options controlling a comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonOptions {
    pub mode: ComparisonMode,
    pub categories: BTreeSet<EnrichmentCategory>,
    pub case_sensitive: bool,
    pub whitespace_sensitive: bool,
    pub comment_sensitive: bool,
    pub order_sensitive: bool,
    pub include_types: Vec<ObjectType>,
    pub exclude_types: Vec<ObjectType>,
    /// Glob patterns an object name must match
    pub include_names: Vec<String>,
    /// Glob patterns that exclude an object name
    pub exclude_names: Vec<String>,
    /// Privacy weight at or above which privileged members are critical
    pub privacy_threshold: f64,
    /// Smallest score change worth reporting
    pub score_tolerance: f64,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            mode: ComparisonMode::Structural,
            categories: all_categories(),
            case_sensitive: false,
            whitespace_sensitive: false,
            comment_sensitive: false,
            order_sensitive: false,
            include_types: Vec::new(),
            exclude_types: Vec::new(),
            include_names: Vec::new(),
            exclude_names: Vec::new(),
            privacy_threshold: default_privacy_threshold(),
            score_tolerance: default_score_tolerance(),
        }
    }
}

impl ComparisonOptions {
    pub fn new(mode: ComparisonMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_categories(mut self, categories: &[EnrichmentCategory]) -> Self {
        self.categories = categories.iter().copied().collect();
        self
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn whitespace_sensitive(mut self, yes: bool) -> Self {
        self.whitespace_sensitive = yes;
        self
    }

    pub fn comment_sensitive(mut self, yes: bool) -> Self {
        self.comment_sensitive = yes;
        self
    }

    pub fn order_sensitive(mut self, yes: bool) -> Self {
        self.order_sensitive = yes;
        self
    }

    pub fn include_type(mut self, object_type: ObjectType) -> Self {
        self.include_types.push(object_type);
        self
    }

    pub fn exclude_type(mut self, object_type: ObjectType) -> Self {
        self.exclude_types.push(object_type);
        self
    }

    pub fn include_name(mut self, pattern: impl Into<String>) -> Self {
        self.include_names.push(pattern.into());
        self
    }

    pub fn exclude_name(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_names.push(pattern.into());
        self
    }

    pub fn with_privacy_threshold(mut self, threshold: f64) -> Self {
        self.privacy_threshold = threshold;
        self
    }

    pub fn with_score_tolerance(mut self, tolerance: f64) -> Self {
        self.score_tolerance = tolerance;
        self
    }

    pub fn category_enabled(&self, category: EnrichmentCategory) -> bool {
        self.mode.uses_enrichment() && self.categories.contains(&category)
    }

    /// Check thresholds and compile name filters
    pub fn validate(&self) -> Result<ObjectFilter> {
        for (name, value) in [
            ("privacy_threshold", self.privacy_threshold),
            ("score_tolerance", self.score_tolerance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidInput(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        ObjectFilter::new(self)
    }
}

/// Compiled object-type and name filters.
#[derive(Debug, Clone)]
pub struct ObjectFilter {
    include_types: Vec<ObjectType>,
    exclude_types: Vec<ObjectType>,
    include_names: Vec<Pattern>,
    exclude_names: Vec<Pattern>,
    match_options: MatchOptions,
}

impl ObjectFilter {
    fn new(options: &ComparisonOptions) -> Result<Self> {
        let compile = |patterns: &[String]| -> Result<Vec<Pattern>> {
            patterns
                .iter()
                .map(|p| {
                    Pattern::new(p)
                        .map_err(|e| Error::InvalidInput(format!("Invalid name pattern '{}': {}", p, e)))
                })
                .collect()
        };

        Ok(Self {
            include_types: options.include_types.clone(),
            exclude_types: options.exclude_types.clone(),
            include_names: compile(&options.include_names)?,
            exclude_names: compile(&options.exclude_names)?,
            match_options: MatchOptions {
                case_sensitive: options.case_sensitive,
                ..MatchOptions::new()
            },
        })
    }

    /// Whether an object takes part in the comparison
    pub fn accepts(&self, object_type: ObjectType, name: &str) -> bool {
        if !self.include_types.is_empty() && !self.include_types.contains(&object_type) {
            return false;
        }
        if self.exclude_types.contains(&object_type) {
            return false;
        }
        if !self.include_names.is_empty()
            && !self
                .include_names
                .iter()
                .any(|p| p.matches_with(name, self.match_options))
        {
            return false;
        }
        !self
            .exclude_names
            .iter()
            .any(|p| p.matches_with(name, self.match_options))
    }
}
