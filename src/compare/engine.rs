//! Comparison engine

use serde::{Deserialize, Serialize};

use super::change::{ComparisonSummary, EnrichmentChange, StructuralChange};
use super::enrichment::{self, Snapshot};
use super::options::{ComparisonMode, ComparisonOptions, ObjectFilter};
use super::scoring;
use super::structural;
use crate::matrix::{ComplexityClass, MatrixCache, MatrixGenerator};
use crate::model::UnifiedModel;
use crate::Result;

/// Outcome of comparing two schema snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub mode: ComparisonMode,
    pub source_technology: String,
    pub target_technology: String,
    pub structural_changes: Vec<StructuralChange>,
    #[serde(default)]
    pub enrichment_changes: Vec<EnrichmentChange>,
    pub structural_similarity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_similarity: Option<f64>,
    pub overall_similarity: f64,
    pub compatibility_score: f64,
    pub migration_complexity: ComplexityClass,
    /// Conversion matrix complexity for the technology pair, when one was available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_complexity: Option<ComplexityClass>,
    pub summary: ComparisonSummary,
}

impl ComparisonResult {
    pub fn has_breaking_changes(&self) -> bool {
        self.summary.breaking_changes > 0
    }

    pub fn breaking_changes(&self) -> impl Iterator<Item = &StructuralChange> {
        self.structural_changes.iter().filter(|c| c.breaking)
    }

    pub fn is_identical(&self) -> bool {
        self.structural_changes.is_empty() && self.enrichment_changes.is_empty()
    }
}

/// Compares unified models under fixed options.
pub struct ComparisonEngine {
    options: ComparisonOptions,
    filter: ObjectFilter,
    generator: Option<MatrixGenerator>,
    matrices: MatrixCache,
}

impl ComparisonEngine {
    /// Validate the options and build an engine
    pub fn new(options: ComparisonOptions) -> Result<Self> {
        let filter = options.validate()?;
        Ok(Self {
            options,
            filter,
            generator: None,
            matrices: MatrixCache::new(),
        })
    }

    /// Fold conversion-matrix complexity into compatibility scores
    pub fn with_generator(mut self, generator: MatrixGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn options(&self) -> &ComparisonOptions {
        &self.options
    }

    /// Compare two models without enrichment
    pub fn compare_models(&self, old: &UnifiedModel, new: &UnifiedModel) -> ComparisonResult {
        self.compare(Snapshot::new(old), Snapshot::new(new))
    }

    pub fn compare(&self, old: Snapshot<'_>, new: Snapshot<'_>) -> ComparisonResult {
        let options = &self.options;
        let mut diff = structural::diff(old.model, new.model, options, &self.filter);
        let structural_similarity = diff.similarity();

        if options.mode.uses_enrichment() {
            enrichment::adjust_severities(&mut diff.changes, &diff.matched, old, new, options);
        }

        let (enrichment_changes, enrichment_similarity) = if options.mode == ComparisonMode::Enriched {
            let enriched = enrichment::diff_enrichment(old, new, options);
            let similarity = enriched.similarity();
            (enriched.changes, similarity)
        } else {
            (Vec::new(), None)
        };

        let summary = ComparisonSummary::from_changes(&diff.changes, &enrichment_changes, diff.matched.len());
        let matrix_complexity = self.matrix_complexity(&old.model.database_type, &new.model.database_type);

        let overall_similarity = scoring::overall_similarity(structural_similarity, enrichment_similarity);
        let compatibility_score =
            scoring::compatibility_score(overall_similarity, summary.breaking_changes, matrix_complexity);
        let migration_complexity =
            scoring::migration_complexity(compatibility_score, summary.breaking_changes, matrix_complexity);

        tracing::info!(
            "Compared {} -> {}: {} changes ({} breaking), compatibility {:.2}, {}",
            old.model.database_type,
            new.model.database_type,
            summary.total_changes,
            summary.breaking_changes,
            compatibility_score,
            migration_complexity
        );

        ComparisonResult {
            mode: options.mode,
            source_technology: old.model.database_type.clone(),
            target_technology: new.model.database_type.clone(),
            structural_changes: diff.changes,
            enrichment_changes,
            structural_similarity,
            enrichment_similarity,
            overall_similarity,
            compatibility_score,
            migration_complexity,
            matrix_complexity,
            summary,
        }
    }

    fn matrix_complexity(&self, source: &str, target: &str) -> Option<ComplexityClass> {
        let generator = self.generator.as_ref()?;
        if source.is_empty() || target.is_empty() {
            return None;
        }
        match self.matrices.get_or_generate(generator, source, target) {
            Ok(matrix) => Some(matrix.complexity),
            Err(e) => {
                tracing::debug!("No conversion matrix for {} -> {}: {}", source, target, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::change::{ChangeType, Severity};
    use crate::model::{Column, MemberEnrichment, RiskLevel, Table, UnifiedModelEnrichment};
    use crate::registry::FeatureRegistry;
    use std::sync::Arc;

    fn model(technology: &str, email_type: &str) -> UnifiedModel {
        UnifiedModel::new(technology).with_table(Table::new(
            "users",
            vec![
                Column::new("id", "bigint").primary_key(),
                Column::new("email", email_type),
            ],
        ))
    }

    #[test]
    fn test_identical_snapshots() {
        let engine = ComparisonEngine::new(ComparisonOptions::default()).unwrap();
        let m = model("postgres", "varchar(50)");
        let result = engine.compare_models(&m, &m.clone());

        assert!(result.is_identical());
        assert_eq!(result.structural_similarity, 1.0);
        assert_eq!(result.overall_similarity, 1.0);
        assert_eq!(result.compatibility_score, 1.0);
        assert_eq!(result.migration_complexity, ComplexityClass::Trivial);
        assert!(result.matrix_complexity.is_none());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = ComparisonOptions::default().with_privacy_threshold(2.0);
        assert!(ComparisonEngine::new(options).is_err());
    }

    #[test]
    fn test_privileged_widening_escalated_in_enriched_mode() {
        let old = model("postgres", "varchar(50)");
        let new = model("postgres", "varchar(100)");
        let e = UnifiedModelEnrichment::new("users", "1").with_member(
            "users",
            "email",
            MemberEnrichment::privileged("email", RiskLevel::Critical, 0.5),
        );

        let structural = ComparisonEngine::new(ComparisonOptions::default()).unwrap();
        let plain = structural.compare(
            Snapshot::new(&old).with_enrichment(&e),
            Snapshot::new(&new).with_enrichment(&e),
        );
        assert_eq!(plain.structural_changes[0].severity, Severity::Minor);

        let enriched = ComparisonEngine::new(ComparisonOptions::new(ComparisonMode::Enriched)).unwrap();
        let result = enriched.compare(
            Snapshot::new(&old).with_enrichment(&e),
            Snapshot::new(&new).with_enrichment(&e),
        );
        let change = &result.structural_changes[0];
        assert_eq!(change.change_type, ChangeType::TypeChanged);
        assert_eq!(change.raw_severity, Severity::Minor);
        assert_eq!(change.severity, Severity::Critical);
        // Similarity is computed from raw severity
        assert_eq!(result.structural_similarity, 1.0);
        assert_eq!(result.enrichment_similarity, Some(1.0));
        assert_eq!(result.summary.by_severity[&Severity::Critical], 1);
    }

    #[test]
    fn test_matrix_complexity_folds_in() {
        let generator = MatrixGenerator::new(Arc::new(FeatureRegistry::builtin()));
        let engine = ComparisonEngine::new(ComparisonOptions::default())
            .unwrap()
            .with_generator(generator);

        let old = model("postgres", "text");
        let new = model("mongodb", "text");
        let result = engine.compare_models(&old, &new);
        assert_eq!(result.matrix_complexity, Some(ComplexityClass::Moderate));
        assert!((result.compatibility_score - 0.85).abs() < 1e-9);
        assert_eq!(result.migration_complexity, ComplexityClass::Simple);

        let unknown = engine.compare_models(&model("oracle", "text"), &new);
        assert!(unknown.matrix_complexity.is_none());
        assert_eq!(unknown.compatibility_score, 1.0);
    }

    #[test]
    fn test_repeated_comparisons_reuse_the_matrix() {
        let generator = MatrixGenerator::new(Arc::new(FeatureRegistry::builtin()));
        let engine = ComparisonEngine::new(ComparisonOptions::default())
            .unwrap()
            .with_generator(generator);

        let old = model("postgres", "text");
        let first = engine.compare_models(&old, &model("mongodb", "text"));
        let second = engine.compare_models(&old, &model("MongoDB", "varchar(20)"));
        assert_eq!(first.matrix_complexity, second.matrix_complexity);
        assert_eq!(engine.matrices.len(), 1);

        engine.compare_models(&old, &model("neo4j", "text"));
        assert_eq!(engine.matrices.len(), 2);
    }

    #[test]
    fn test_breaking_changes_lower_compatibility() {
        let engine = ComparisonEngine::new(ComparisonOptions::default()).unwrap();
        let old = model("postgres", "text");
        let new = UnifiedModel::new("postgres");
        let result = engine.compare_models(&old, &new);

        assert_eq!(result.summary.objects_removed, 1);
        assert!(result.has_breaking_changes());
        assert_eq!(result.structural_similarity, 0.0);
        assert_eq!(result.compatibility_score, 0.0);
        assert_eq!(result.migration_complexity, ComplexityClass::Complex);
        assert_eq!(result.breaking_changes().count(), 1);
    }
}
