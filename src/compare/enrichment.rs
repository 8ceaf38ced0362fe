//! Enrichment-guided severity adjustment and enrichment diffs

use std::collections::BTreeSet;

use super::change::{EnrichmentChange, EnrichmentChangeType, Severity, StructuralChange};
use super::options::{ComparisonOptions, EnrichmentCategory};
use super::structural::MatchedObject;
use crate::model::{
    GraphEnrichment, MemberEnrichment, ObjectEnrichment, ObjectType, RiskLevel, UnifiedModel,
    UnifiedModelEnrichment,
};

/// One side of a comparison: a model and its optional enrichment
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub model: &'a UnifiedModel,
    pub enrichment: Option<&'a UnifiedModelEnrichment>,
}

impl<'a> Snapshot<'a> {
    pub fn new(model: &'a UnifiedModel) -> Self {
        Self { model, enrichment: None }
    }

    pub fn with_enrichment(mut self, enrichment: &'a UnifiedModelEnrichment) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    fn member(&self, object: &str, member: &str) -> Option<&'a MemberEnrichment> {
        self.enrichment.and_then(|e| e.member(object, member))
    }

    fn object(&self, object: &str) -> Option<&'a ObjectEnrichment> {
        self.enrichment.and_then(|e| e.object(object))
    }
}

/// Apply privacy escalation and cold-object downgrades to structural changes.
///
/// The new side's enrichment wins; the old side covers removed members.
pub fn adjust_severities(
    changes: &mut [StructuralChange],
    matched: &[MatchedObject<'_>],
    old: Snapshot<'_>,
    new: Snapshot<'_>,
    options: &ComparisonOptions,
) {
    let privacy = options.category_enabled(EnrichmentCategory::Privacy);
    let performance = options.category_enabled(EnrichmentCategory::Performance);
    if !privacy && !performance {
        return;
    }

    for change in changes.iter_mut() {
        // Changes carry the new object name; the old name may differ in case
        let old_object = matched
            .iter()
            .find(|m| m.new.object_type == change.object_type && m.new.name == change.object)
            .map_or(change.object.as_str(), |m| m.old.name);

        let mut escalated = false;

        if privacy && change.is_member_change() {
            if let Some(member) = &change.member {
                let enrichment = new
                    .member(&change.object, member)
                    .or_else(|| old.member(old_object, member))
                    .or_else(|| old.member(&change.object, member));
                if let Some(e) = enrichment.filter(|e| e.is_privileged_data) {
                    if e.risk_level == RiskLevel::Critical || e.privacy_weight >= options.privacy_threshold {
                        change.severity = Severity::Critical;
                        escalated = true;
                    } else if e.risk_level == RiskLevel::High && change.severity < Severity::Major {
                        change.severity = Severity::Major;
                        escalated = true;
                    }
                }
            }
        }

        if performance && !escalated {
            let cold = new
                .object(&change.object)
                .or_else(|| old.object(old_object))
                .and_then(|o| o.access_pattern)
                .is_some_and(|p| p.is_cold());
            if cold {
                change.severity = change.severity.downgrade();
            }
        }

        if change.severity != change.raw_severity {
            tracing::debug!(
                "Adjusted {} from {} to {}",
                change.description,
                change.raw_severity,
                change.severity
            );
        }
    }
}

/// Enrichment change records plus the number of comparable entries
pub struct EnrichmentDiff {
    pub changes: Vec<EnrichmentChange>,
    pub comparable: usize,
    pub unchanged: usize,
}

impl EnrichmentDiff {
    /// `None` when nothing was comparable
    pub fn similarity(&self) -> Option<f64> {
        (self.comparable > 0).then(|| self.unchanged as f64 / self.comparable as f64)
    }
}

/// Diff enrichment entries whose keys resolve to objects present in both models.
///
/// Entries are matched by exact key. Keys that reference missing objects or
/// members are skipped.
pub fn diff_enrichment(old: Snapshot<'_>, new: Snapshot<'_>, options: &ComparisonOptions) -> EnrichmentDiff {
    let mut diff = EnrichmentDiff {
        changes: Vec::new(),
        comparable: 0,
        unchanged: 0,
    };

    let (Some(old_e), Some(new_e)) = (old.enrichment, new.enrichment) else {
        return diff;
    };

    let privacy = options.category_enabled(EnrichmentCategory::Privacy);
    let classification = options.category_enabled(EnrichmentCategory::Classification);
    let performance = options.category_enabled(EnrichmentCategory::Performance);

    if privacy {
        let keys: BTreeSet<&String> = old_e.members.keys().chain(new_e.members.keys()).collect();
        for key in keys {
            if !member_exists(old.model, key) || !member_exists(new.model, key) {
                continue;
            }
            let before = old_e.members.get(key).cloned().unwrap_or_default();
            let after = new_e.members.get(key).cloned().unwrap_or_default();
            let changes = diff_member(key, &before, &after, options);
            diff.record(changes);
        }
    }

    if classification || performance {
        let keys: BTreeSet<&String> = old_e.objects.keys().chain(new_e.objects.keys()).collect();
        for key in keys {
            if !object_exists(old.model, key) || !object_exists(new.model, key) {
                continue;
            }
            let before = old_e.objects.get(key).cloned().unwrap_or_default();
            let after = new_e.objects.get(key).cloned().unwrap_or_default();
            let mut changes = Vec::new();
            if classification {
                changes.extend(diff_classification(
                    key,
                    (&before.classification, before.classification_score),
                    (&after.classification, after.classification_score),
                    options,
                ));
            }
            if performance && before.access_pattern != after.access_pattern {
                changes.push(EnrichmentChange {
                    change_type: EnrichmentChangeType::AccessPatternChanged,
                    key: key.clone(),
                    old_value: before.access_pattern.map_or("none", |p| p.as_str()).to_string(),
                    new_value: after.access_pattern.map_or("none", |p| p.as_str()).to_string(),
                    severity: Severity::Minor,
                });
            }
            diff.record(changes);
        }
    }

    if classification {
        let graph = [
            (ObjectType::Node, &old_e.nodes, &new_e.nodes),
            (ObjectType::Relationship, &old_e.relationships, &new_e.relationships),
        ];
        for (object_type, before_map, after_map) in graph {
            let keys: BTreeSet<&String> = before_map.keys().chain(after_map.keys()).collect();
            for key in keys {
                if !old.model.contains(object_type, key) || !new.model.contains(object_type, key) {
                    continue;
                }
                let before = before_map.get(key).cloned().unwrap_or_default();
                let after = after_map.get(key).cloned().unwrap_or_default();
                diff.record(diff_graph(key, &before, &after, options));
            }
        }
    }

    tracing::debug!(
        "Enrichment diff: {} comparable, {} changed entries, {} records",
        diff.comparable,
        diff.comparable - diff.unchanged,
        diff.changes.len()
    );

    diff
}

impl EnrichmentDiff {
    fn record(&mut self, changes: Vec<EnrichmentChange>) {
        self.comparable += 1;
        if changes.is_empty() {
            self.unchanged += 1;
        }
        self.changes.extend(changes);
    }
}

fn diff_member(
    key: &str,
    before: &MemberEnrichment,
    after: &MemberEnrichment,
    options: &ComparisonOptions,
) -> Vec<EnrichmentChange> {
    let mut changes = Vec::new();

    if before.is_privileged_data != after.is_privileged_data {
        changes.push(EnrichmentChange {
            change_type: EnrichmentChangeType::PrivilegedFlagChanged,
            key: key.to_string(),
            old_value: before.is_privileged_data.to_string(),
            new_value: after.is_privileged_data.to_string(),
            severity: Severity::Major,
        });
    }

    if before.risk_level != after.risk_level {
        let highest = before.risk_level.max(after.risk_level);
        let severity = match highest {
            RiskLevel::Critical => Severity::Critical,
            RiskLevel::High => Severity::Major,
            RiskLevel::Medium | RiskLevel::Low => Severity::Minor,
        };
        changes.push(EnrichmentChange {
            change_type: EnrichmentChangeType::RiskLevelChanged,
            key: key.to_string(),
            old_value: before.risk_level.as_str().to_string(),
            new_value: after.risk_level.as_str().to_string(),
            severity,
        });
    }

    // Only crossings of the privacy threshold are reported
    let threshold = options.privacy_threshold;
    if (before.privacy_weight >= threshold) != (after.privacy_weight >= threshold) {
        changes.push(EnrichmentChange {
            change_type: EnrichmentChangeType::PrivacyWeightChanged,
            key: key.to_string(),
            old_value: format!("{:.2}", before.privacy_weight),
            new_value: format!("{:.2}", after.privacy_weight),
            severity: Severity::Major,
        });
    }

    changes
}

fn diff_classification(
    key: &str,
    before: (&Option<String>, f64),
    after: (&Option<String>, f64),
    options: &ComparisonOptions,
) -> Vec<EnrichmentChange> {
    let mut changes = Vec::new();

    if before.0 != after.0 {
        changes.push(EnrichmentChange {
            change_type: EnrichmentChangeType::ClassificationChanged,
            key: key.to_string(),
            old_value: before.0.clone().unwrap_or_else(|| "none".to_string()),
            new_value: after.0.clone().unwrap_or_else(|| "none".to_string()),
            severity: Severity::Major,
        });
    } else if (before.1 - after.1).abs() > options.score_tolerance {
        changes.push(EnrichmentChange {
            change_type: EnrichmentChangeType::ClassificationScoreChanged,
            key: key.to_string(),
            old_value: format!("{:.2}", before.1),
            new_value: format!("{:.2}", after.1),
            severity: Severity::Minor,
        });
    }

    changes
}

fn diff_graph(
    key: &str,
    before: &GraphEnrichment,
    after: &GraphEnrichment,
    options: &ComparisonOptions,
) -> Vec<EnrichmentChange> {
    diff_classification(
        key,
        (&before.classification, before.classification_score),
        (&after.classification, after.classification_score),
        options,
    )
}

/// Tables and collections carry object enrichment
fn object_exists(model: &UnifiedModel, name: &str) -> bool {
    model.contains(ObjectType::Table, name) || model.contains(ObjectType::Collection, name)
}

/// Whether an `object.member` key names a member of some object in the model
fn member_exists(model: &UnifiedModel, key: &str) -> bool {
    const HOLDERS: &[ObjectType] = &[
        ObjectType::Table,
        ObjectType::View,
        ObjectType::MaterializedView,
        ObjectType::Collection,
        ObjectType::Node,
        ObjectType::Relationship,
        ObjectType::Topic,
    ];

    // Object names may themselves contain dots; try every split point
    key.match_indices('.').any(|(i, _)| {
        let (object, member) = (&key[..i], &key[i + 1..]);
        HOLDERS.iter().any(|t| {
            model
                .members(*t, object)
                .is_some_and(|members| members.iter().any(|m| m.name == member))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::change::ChangeType;
    use crate::compare::options::ComparisonMode;
    use crate::model::{AccessPattern, Column, Table};

    fn model() -> UnifiedModel {
        UnifiedModel::new("postgres").with_table(Table::new(
            "users",
            vec![Column::new("id", "bigint").primary_key(), Column::new("ssn", "varchar(11)")],
        ))
    }

    fn type_change(severity: Severity) -> StructuralChange {
        StructuralChange::new(ChangeType::TypeChanged, ObjectType::Table, "users", severity, false).with_member("ssn")
    }

    #[test]
    fn test_critical_risk_escalates() {
        let m = model();
        let e = UnifiedModelEnrichment::new("s", "1").with_member(
            "users",
            "ssn",
            MemberEnrichment::privileged("national_id", RiskLevel::Critical, 0.2),
        );
        let mut changes = vec![type_change(Severity::Minor)];
        let options = ComparisonOptions::new(ComparisonMode::Guided);
        adjust_severities(
            &mut changes,
            &[],
            Snapshot::new(&m),
            Snapshot::new(&m).with_enrichment(&e),
            &options,
        );
        assert_eq!(changes[0].severity, Severity::Critical);
        assert_eq!(changes[0].raw_severity, Severity::Minor);
    }

    #[test]
    fn test_privacy_weight_threshold_escalates() {
        let m = model();
        let e = UnifiedModelEnrichment::new("s", "1").with_member(
            "users",
            "ssn",
            MemberEnrichment::privileged("national_id", RiskLevel::Low, 0.8),
        );
        let options = ComparisonOptions::new(ComparisonMode::Guided);
        let mut changes = vec![type_change(Severity::Minor)];
        adjust_severities(&mut changes, &[], Snapshot::new(&m), Snapshot::new(&m).with_enrichment(&e), &options);
        assert_eq!(changes[0].severity, Severity::Critical);

        let lenient = options.with_privacy_threshold(0.9);
        let mut changes = vec![type_change(Severity::Minor)];
        adjust_severities(&mut changes, &[], Snapshot::new(&m), Snapshot::new(&m).with_enrichment(&e), &lenient);
        assert_eq!(changes[0].severity, Severity::Minor);
    }

    #[test]
    fn test_high_risk_raises_to_major() {
        let m = model();
        let e = UnifiedModelEnrichment::new("s", "1").with_member(
            "users",
            "ssn",
            MemberEnrichment::privileged("national_id", RiskLevel::High, 0.1),
        );
        let mut changes = vec![type_change(Severity::Minor)];
        adjust_severities(
            &mut changes,
            &[],
            Snapshot::new(&m),
            Snapshot::new(&m).with_enrichment(&e),
            &ComparisonOptions::new(ComparisonMode::Enriched),
        );
        assert_eq!(changes[0].severity, Severity::Major);
    }

    #[test]
    fn test_structural_mode_ignores_enrichment() {
        let m = model();
        let e = UnifiedModelEnrichment::new("s", "1").with_member(
            "users",
            "ssn",
            MemberEnrichment::privileged("national_id", RiskLevel::Critical, 1.0),
        );
        let mut changes = vec![type_change(Severity::Minor)];
        adjust_severities(
            &mut changes,
            &[],
            Snapshot::new(&m),
            Snapshot::new(&m).with_enrichment(&e),
            &ComparisonOptions::default(),
        );
        assert_eq!(changes[0].severity, Severity::Minor);
    }

    #[test]
    fn test_cold_objects_downgrade() {
        let m = model();
        let e = UnifiedModelEnrichment::new("s", "1").with_object(
            "users",
            ObjectEnrichment {
                access_pattern: Some(AccessPattern::Archival),
                ..ObjectEnrichment::default()
            },
        );
        let mut changes = vec![type_change(Severity::Major)];
        adjust_severities(
            &mut changes,
            &[],
            Snapshot::new(&m),
            Snapshot::new(&m).with_enrichment(&e),
            &ComparisonOptions::new(ComparisonMode::Guided)
                .with_categories(&[EnrichmentCategory::Performance]),
        );
        assert_eq!(changes[0].severity, Severity::Minor);
    }

    #[test]
    fn test_member_enrichment_changes() {
        let m = model();
        let before = UnifiedModelEnrichment::new("s", "1").with_member(
            "users",
            "ssn",
            MemberEnrichment::privileged("national_id", RiskLevel::High, 0.5),
        );
        let after = UnifiedModelEnrichment::new("s", "2")
            .with_member(
                "users",
                "ssn",
                MemberEnrichment::privileged("national_id", RiskLevel::Critical, 0.9),
            )
            .with_member("users", "ghost", MemberEnrichment::default())
            .with_member("orders", "total", MemberEnrichment::default());

        let diff = diff_enrichment(
            Snapshot::new(&m).with_enrichment(&before),
            Snapshot::new(&m).with_enrichment(&after),
            &ComparisonOptions::new(ComparisonMode::Enriched),
        );

        // Keys without a structural counterpart are skipped
        assert_eq!(diff.comparable, 1);
        let kinds: Vec<_> = diff.changes.iter().map(|c| c.change_type).collect();
        assert_eq!(
            kinds,
            vec![
                EnrichmentChangeType::RiskLevelChanged,
                EnrichmentChangeType::PrivacyWeightChanged
            ]
        );
        assert_eq!(diff.changes[0].severity, Severity::Critical);
        assert_eq!(diff.similarity(), Some(0.0));
    }

    #[test]
    fn test_score_tolerance_gates_classification() {
        let m = model();
        let object = |score: f64| ObjectEnrichment {
            classification: Some("transactional".into()),
            classification_score: score,
            ..ObjectEnrichment::default()
        };
        let before = UnifiedModelEnrichment::new("s", "1").with_object("users", object(0.80));
        let small = UnifiedModelEnrichment::new("s", "2").with_object("users", object(0.85));
        let large = UnifiedModelEnrichment::new("s", "2").with_object("users", object(0.50));
        let options = ComparisonOptions::new(ComparisonMode::Enriched);

        let diff = diff_enrichment(
            Snapshot::new(&m).with_enrichment(&before),
            Snapshot::new(&m).with_enrichment(&small),
            &options,
        );
        assert!(diff.changes.is_empty());
        assert_eq!(diff.similarity(), Some(1.0));

        let diff = diff_enrichment(
            Snapshot::new(&m).with_enrichment(&before),
            Snapshot::new(&m).with_enrichment(&large),
            &options,
        );
        assert_eq!(diff.changes[0].change_type, EnrichmentChangeType::ClassificationScoreChanged);
    }

    #[test]
    fn test_dotted_object_names() {
        let m = UnifiedModel::new("postgres")
            .with_table(Table::new("public.users", vec![Column::new("email", "text")]));
        assert!(member_exists(&m, "public.users.email"));
        assert!(!member_exists(&m, "public.users.phone"));
    }
}
