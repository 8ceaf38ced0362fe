//! Builds a [`ConversionMatrix`] from two registry entries

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::paradigm;
use super::{
    AutomationLevel, ComplexityClass, ContextKey, ConversionKind, ConversionMatrix, ObjectConversionRule,
    ParadigmCompatibility, StrategyTag, UserDecision,
};
use crate::model::{ObjectType, Paradigm};
use crate::registry::{DatabaseFeatureSupport, FeatureRegistry, RegistryHandle, SupportLevel};
use crate::{Error, Result};

/// Generates conversion matrices against one registry snapshot.
#[derive(Debug, Clone)]
pub struct MatrixGenerator {
    registry: Arc<FeatureRegistry>,
}

impl MatrixGenerator {
    pub fn new(registry: Arc<FeatureRegistry>) -> Self {
        Self { registry }
    }

    /// Generator bound to the handle's current snapshot
    pub fn from_handle(handle: &RegistryHandle) -> Self {
        Self::new(handle.snapshot())
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> &Arc<FeatureRegistry> {
        &self.registry
    }

    /// Compute the matrix for converting `source` into `target`
    pub fn generate(&self, source: &str, target: &str) -> Result<ConversionMatrix> {
        let src = self.registry.require(source)?;
        let tgt = self.registry.require(target)?;

        if !src.can_be_source {
            return Err(Error::registry_missing(source, "not eligible as a conversion source"));
        }
        if !tgt.can_be_target {
            return Err(Error::registry_missing(target, "not eligible as a conversion target"));
        }

        let compatibility = paradigm::classify(&src.paradigms, &tgt.paradigms);

        let mut rules: Vec<ObjectConversionRule> = src
            .supported_types()
            .map(|t| build_rule(t, tgt))
            .collect();
        note_shared_targets(&mut rules);

        let unsupported_features = rules
            .iter()
            .filter(|r| r.kind == ConversionKind::Drop)
            .map(|r| r.source_type)
            .collect();
        let requires_user_input = rules.iter().any(ObjectConversionRule::has_decisions);
        let requires_enrichment = rules.iter().any(ObjectConversionRule::needs_enrichment);
        let complexity = aggregate_complexity(compatibility, &rules);
        let strategies = select_strategies(&rules, &src.paradigms, &tgt.paradigms);

        tracing::debug!(
            "Generated {} -> {} matrix: {} rules, {} ({})",
            src.technology,
            tgt.technology,
            rules.len(),
            complexity,
            compatibility
        );

        Ok(ConversionMatrix {
            source: src.technology.clone(),
            target: tgt.technology.clone(),
            complexity,
            paradigm_compatibility: compatibility,
            rules,
            unsupported_features,
            requires_user_input,
            requires_enrichment,
            strategies,
        })
    }
}

fn build_rule(source_type: ObjectType, target: &DatabaseFeatureSupport) -> ObjectConversionRule {
    let mut rule = ObjectConversionRule {
        source_type,
        target_types: Vec::new(),
        kind: ConversionKind::Drop,
        required_context: Vec::new(),
        decisions: Vec::new(),
        automation: AutomationLevel::None,
        limitations: Vec::new(),
        notes: Vec::new(),
    };

    let Some(support) = target.support(source_type) else {
        rule.notes.push(format!(
            "{} declares nothing for {}",
            target.technology, source_type
        ));
        return rule;
    };

    match support.level {
        SupportLevel::Full => {
            rule.kind = ConversionKind::Direct;
            rule.target_types = vec![source_type];
            rule.automation = AutomationLevel::Full;
        }
        SupportLevel::Partial => {
            rule.kind = ConversionKind::Direct;
            rule.target_types = vec![source_type];
            rule.automation = AutomationLevel::Partial;
            rule.limitations = support.limitations.clone();
        }
        SupportLevel::Emulated => {
            rule.kind = ConversionKind::Emulate;
            rule.target_types = if support.alternatives.is_empty() {
                vec![source_type]
            } else {
                support.alternatives.clone()
            };
            rule.automation = AutomationLevel::Partial;
            rule.limitations = support.limitations.clone();
        }
        SupportLevel::Unsupported if !support.alternatives.is_empty() => {
            rule.kind = if support.alternatives.len() > 1 {
                ConversionKind::Split
            } else {
                ConversionKind::Transform
            };
            rule.target_types = support.alternatives.clone();
            rule.decisions = decisions_for(source_type, &support.alternatives);
            rule.automation = AutomationLevel::Partial;
            rule.limitations = support.limitations.clone();
        }
        SupportLevel::Unsupported => {
            rule.notes
                .push(format!("{} has no equivalent for {}", target.technology, source_type));
        }
    }

    rule.required_context = required_context(source_type, &rule.target_types, rule.kind);
    rule
}

fn decisions_for(source_type: ObjectType, alternatives: &[ObjectType]) -> Vec<UserDecision> {
    let mut decisions = Vec::new();

    if let [first, _, ..] = alternatives {
        let options: Vec<&str> = alternatives.iter().map(|t| t.as_str()).collect();
        decisions.push(UserDecision::new(
            format!("{}.target_type", source_type),
            format!("Which object type should each {} become?", source_type),
            &options,
            first.as_str(),
        ));
    }

    if alternatives
        .iter()
        .any(|t| matches!(t, ObjectType::Topic | ObjectType::Stream))
    {
        decisions.push(UserDecision::new(
            format!("{}.partition_key", source_type),
            "Which member should be used as the partition key?",
            &["primary_key", "natural_key", "round_robin"],
            "primary_key",
        ));
    }

    if source_type == ObjectType::Relationship {
        let recommended = if alternatives.contains(&ObjectType::Table) {
            Some("join_table")
        } else if alternatives.contains(&ObjectType::Collection) {
            Some("embedded_reference")
        } else {
            None
        };
        if let Some(recommended) = recommended {
            decisions.push(UserDecision::new(
                "relationship.representation",
                "How should relationships be represented?",
                &["join_table", "embedded_reference"],
                recommended,
            ));
        }
    }

    if matches!(source_type, ObjectType::Collection | ObjectType::Document)
        && alternatives.contains(&ObjectType::Table)
    {
        decisions.push(UserDecision::new(
            format!("{}.nested_documents", source_type),
            "How should nested documents be stored?",
            &["child_tables", "json_column"],
            "json_column",
        ));
    }

    decisions
}

fn required_context(source_type: ObjectType, targets: &[ObjectType], kind: ConversionKind) -> Vec<ContextKey> {
    if matches!(kind, ConversionKind::Direct | ConversionKind::Drop) {
        return Vec::new();
    }

    let tabular = matches!(
        source_type,
        ObjectType::Table | ObjectType::View | ObjectType::MaterializedView
    );
    let documents = matches!(source_type, ObjectType::Collection | ObjectType::Document);
    let graph = matches!(source_type, ObjectType::Node | ObjectType::Relationship);
    let vector = matches!(
        source_type,
        ObjectType::Vector | ObjectType::VectorIndex | ObjectType::Embedding
    );

    let mut keys = BTreeSet::new();
    for target in targets {
        match target {
            ObjectType::Topic | ObjectType::Stream => {
                keys.insert(ContextKey::PartitionKey);
                keys.insert(ContextKey::DataClassification);
            }
            ObjectType::Node | ObjectType::Relationship if !graph => {
                keys.insert(ContextKey::PrimaryKey);
                keys.insert(ContextKey::RelationshipCardinality);
            }
            ObjectType::Table if graph => {
                keys.insert(ContextKey::RelationshipCardinality);
            }
            ObjectType::Table if documents => {
                keys.insert(ContextKey::NestingDepth);
            }
            ObjectType::Collection | ObjectType::Document if tabular || graph => {
                keys.insert(ContextKey::AccessPatterns);
            }
            ObjectType::Vector | ObjectType::VectorIndex | ObjectType::Embedding if !vector => {
                keys.insert(ContextKey::EmbeddingDimensions);
            }
            _ => {}
        }
    }
    keys.into_iter().collect()
}

/// Note non-direct rules that land on a type another rule already fills directly
fn note_shared_targets(rules: &mut [ObjectConversionRule]) {
    let direct: BTreeSet<ObjectType> = rules
        .iter()
        .filter(|r| r.kind == ConversionKind::Direct)
        .flat_map(|r| r.target_types.iter().copied())
        .collect();

    for rule in rules.iter_mut() {
        if matches!(rule.kind, ConversionKind::Direct | ConversionKind::Drop) {
            continue;
        }
        let shared: Vec<ObjectType> = rule
            .target_types
            .iter()
            .copied()
            .filter(|t| direct.contains(t))
            .collect();
        for target in shared {
            rule.notes
                .push(format!("shares {} objects with a direct conversion", target));
        }
    }
}

fn aggregate_complexity(compatibility: ParadigmCompatibility, rules: &[ObjectConversionRule]) -> ComplexityClass {
    let by_rules = if !rules.is_empty() && rules.iter().all(|r| r.kind == ConversionKind::Drop) {
        ComplexityClass::Impossible
    } else if rules.iter().any(ObjectConversionRule::has_decisions) {
        ComplexityClass::Complex
    } else if rules.iter().any(|r| r.kind != ConversionKind::Direct) {
        ComplexityClass::Moderate
    } else if rules.iter().all(|r| r.automation == AutomationLevel::Full) {
        ComplexityClass::Trivial
    } else {
        ComplexityClass::Simple
    };

    by_rules.max(compatibility.complexity_floor())
}

fn select_strategies(
    rules: &[ObjectConversionRule],
    source: &BTreeSet<Paradigm>,
    target: &BTreeSet<Paradigm>,
) -> Vec<StrategyTag> {
    let source_relational = source.contains(&Paradigm::Relational);
    let target_relational = target.contains(&Paradigm::Relational);

    let mut votes: BTreeMap<StrategyTag, usize> = BTreeMap::new();
    for rule in rules {
        let tag = match rule.kind {
            ConversionKind::Drop => continue,
            ConversionKind::Direct => StrategyTag::Direct,
            ConversionKind::Split => StrategyTag::Decomposition,
            ConversionKind::Merge => StrategyTag::Aggregation,
            ConversionKind::Transform | ConversionKind::Emulate => {
                if target_relational && !source_relational {
                    StrategyTag::Normalization
                } else if source_relational && !target_relational {
                    StrategyTag::Denormalization
                } else {
                    StrategyTag::Hybrid
                }
            }
        };
        *votes.entry(tag).or_default() += 1;
    }

    let Some(max) = votes.values().copied().max() else {
        return vec![StrategyTag::Hybrid];
    };

    let mut tags: Vec<StrategyTag> = votes
        .into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(tag, _)| tag)
        .collect();
    if tags.len() > 1 && !tags.contains(&StrategyTag::Hybrid) {
        tags.push(StrategyTag::Hybrid);
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> MatrixGenerator {
        MatrixGenerator::new(Arc::new(FeatureRegistry::builtin()))
    }

    fn custom(entries: Vec<DatabaseFeatureSupport>) -> MatrixGenerator {
        MatrixGenerator::new(Arc::new(FeatureRegistry::new(entries)))
    }

    #[test]
    fn test_missing_technology() {
        let err = generator().generate("postgres", "oracle").unwrap_err();
        assert!(matches!(err, Error::RegistryMissing { ref technology, .. } if technology == "oracle"));
    }

    #[test]
    fn test_eligibility() {
        let generator = custom(vec![
            DatabaseFeatureSupport::builder("legacy", &[Paradigm::Relational])
                .full(&[ObjectType::Table])
                .source_only()
                .build(),
            DatabaseFeatureSupport::builder("modern", &[Paradigm::Relational])
                .full(&[ObjectType::Table])
                .target_only()
                .build(),
        ]);
        assert!(generator.generate("legacy", "modern").is_ok());
        assert!(matches!(generator.generate("modern", "legacy"), Err(Error::RegistryMissing { .. })));
    }

    #[test]
    fn test_identical_technologies_are_trivial() {
        let generator = custom(vec![
            DatabaseFeatureSupport::builder("a", &[Paradigm::Relational])
                .full(&[ObjectType::Table, ObjectType::View])
                .build(),
            DatabaseFeatureSupport::builder("b", &[Paradigm::Relational])
                .full(&[ObjectType::Table, ObjectType::View, ObjectType::Index])
                .build(),
        ]);
        let matrix = generator.generate("a", "b").unwrap();
        assert_eq!(matrix.paradigm_compatibility, ParadigmCompatibility::Identical);
        assert_eq!(matrix.complexity, ComplexityClass::Trivial);
        assert_eq!(matrix.strategies, vec![StrategyTag::Direct]);
        assert!(!matrix.requires_user_input);
    }

    #[test]
    fn test_partial_support_is_simple() {
        let generator = custom(vec![
            DatabaseFeatureSupport::builder("a", &[Paradigm::Relational])
                .full(&[ObjectType::Table])
                .build(),
            DatabaseFeatureSupport::builder("b", &[Paradigm::Relational])
                .partial(ObjectType::Table, "no tablespaces")
                .build(),
        ]);
        let matrix = generator.generate("a", "b").unwrap();
        let rule = matrix.rule_for(ObjectType::Table).unwrap();
        assert_eq!(rule.kind, ConversionKind::Direct);
        assert_eq!(rule.automation, AutomationLevel::Partial);
        assert_eq!(rule.limitations, vec!["no tablespaces".to_string()]);
        assert_eq!(matrix.complexity, ComplexityClass::Simple);
    }

    #[test]
    fn test_table_to_collection_transform() {
        let matrix = generator().generate("postgres", "mongodb").unwrap();
        let rule = matrix.rule_for(ObjectType::Table).unwrap();
        assert_eq!(rule.kind, ConversionKind::Transform);
        assert_eq!(rule.target_types, vec![ObjectType::Collection]);
        assert_eq!(rule.automation, AutomationLevel::Partial);
        assert!(rule.decisions.is_empty());
        assert!(rule.required_context.contains(&ContextKey::AccessPatterns));
        assert!(matrix.requires_enrichment);
        assert_eq!(matrix.paradigm_compatibility, ParadigmCompatibility::Compatible);
    }

    #[test]
    fn test_collection_to_table_needs_decision() {
        let matrix = generator().generate("mongodb", "postgres").unwrap();
        let rule = matrix.rule_for(ObjectType::Collection).unwrap();
        assert_eq!(rule.kind, ConversionKind::Transform);
        assert_eq!(rule.automation, AutomationLevel::Partial);
        assert_eq!(rule.decisions[0].key, "collection.nested_documents");
        assert_eq!(rule.decisions[0].recommended, "json_column");
        assert!(matrix.requires_user_input);
        assert_eq!(matrix.complexity, ComplexityClass::Complex);
    }

    #[test]
    fn test_shared_target_keeps_kind() {
        let matrix = generator().generate("pinecone", "mongodb").unwrap();
        assert_eq!(matrix.rule_for(ObjectType::Vector).unwrap().kind, ConversionKind::Direct);
        let rule = matrix.rule_for(ObjectType::Embedding).unwrap();
        assert_ne!(rule.kind, ConversionKind::Merge);
        assert_eq!(rule.target_types, vec![ObjectType::Vector]);
        assert!(rule.notes.iter().any(|n| n.contains("shares vector objects")));
    }

    #[test]
    fn test_emulated_type_stays_emulate() {
        let matrix = generator().generate("postgres", "mysql").unwrap();
        assert_eq!(matrix.rule_for(ObjectType::Table).unwrap().kind, ConversionKind::Direct);
        let rule = matrix.rule_for(ObjectType::MaterializedView).unwrap();
        assert_eq!(rule.kind, ConversionKind::Emulate);
        assert_eq!(rule.automation, AutomationLevel::Partial);
        assert!(matrix.rules.iter().all(|r| r.kind != ConversionKind::Merge));
    }

    #[test]
    fn test_transform_beside_direct_target_stays_transform() {
        let generator = custom(vec![
            DatabaseFeatureSupport::builder("multi", &[Paradigm::Relational, Paradigm::Document])
                .full(&[ObjectType::Table, ObjectType::Collection])
                .build(),
            DatabaseFeatureSupport::builder("docs", &[Paradigm::Document])
                .full(&[ObjectType::Collection])
                .instead(ObjectType::Table, &[ObjectType::Collection])
                .build(),
        ]);
        let matrix = generator.generate("multi", "docs").unwrap();
        assert_eq!(matrix.rule_for(ObjectType::Collection).unwrap().kind, ConversionKind::Direct);
        let rule = matrix.rule_for(ObjectType::Table).unwrap();
        assert_eq!(rule.kind, ConversionKind::Transform);
        assert_eq!(rule.automation, AutomationLevel::Partial);
    }

    #[test]
    fn test_decision_does_not_lower_automation() {
        let generator = custom(vec![
            DatabaseFeatureSupport::builder("rel", &[Paradigm::Relational])
                .full(&[ObjectType::Table])
                .build(),
            DatabaseFeatureSupport::builder("log", &[Paradigm::Streaming])
                .full(&[ObjectType::Topic])
                .instead(ObjectType::Table, &[ObjectType::Topic])
                .build(),
        ]);
        let matrix = generator.generate("rel", "log").unwrap();
        let rule = matrix.rule_for(ObjectType::Table).unwrap();
        assert_eq!(rule.decisions.len(), 1);
        assert_eq!(rule.automation, AutomationLevel::Partial);
        assert_eq!(matrix.complexity, ComplexityClass::Complex);
    }

    #[test]
    fn test_split_and_partition_decisions() {
        let generator = custom(vec![
            DatabaseFeatureSupport::builder("src", &[Paradigm::Relational])
                .full(&[ObjectType::Table])
                .build(),
            DatabaseFeatureSupport::builder("dst", &[Paradigm::Streaming])
                .full(&[ObjectType::Topic, ObjectType::Stream])
                .instead(ObjectType::Table, &[ObjectType::Topic, ObjectType::Stream])
                .build(),
        ]);
        let matrix = generator.generate("src", "dst").unwrap();
        let rule = matrix.rule_for(ObjectType::Table).unwrap();
        assert_eq!(rule.kind, ConversionKind::Split);
        let keys: Vec<&str> = rule.decisions.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["table.target_type", "table.partition_key"]);
        assert_eq!(matrix.strategies, vec![StrategyTag::Decomposition]);
        assert_eq!(
            rule.required_context,
            vec![ContextKey::PartitionKey, ContextKey::DataClassification]
        );
    }

    #[test]
    fn test_relationship_to_table_decision() {
        let matrix = generator().generate("neo4j", "postgres").unwrap();
        let rule = matrix.rule_for(ObjectType::Relationship).unwrap();
        assert_eq!(rule.decisions.len(), 1);
        assert_eq!(rule.decisions[0].key, "relationship.representation");
        assert_eq!(rule.decisions[0].recommended, "join_table");
        assert!(rule.required_context.contains(&ContextKey::RelationshipCardinality));
    }

    #[test]
    fn test_drops() {
        let generator = custom(vec![
            DatabaseFeatureSupport::builder("src", &[Paradigm::Relational])
                .full(&[ObjectType::Table, ObjectType::Trigger])
                .build(),
            DatabaseFeatureSupport::builder("dst", &[Paradigm::Relational])
                .full(&[ObjectType::Table])
                .build(),
        ]);
        let matrix = generator.generate("src", "dst").unwrap();
        assert_eq!(matrix.unsupported_features, vec![ObjectType::Trigger]);
        assert_eq!(matrix.rule_for(ObjectType::Trigger).unwrap().automation, AutomationLevel::None);
        assert_eq!(matrix.complexity, ComplexityClass::Moderate);
    }

    #[test]
    fn test_type_missing_from_target_drops_with_note() {
        let mut dst = DatabaseFeatureSupport::builder("dst", &[Paradigm::Relational])
            .full(&[ObjectType::Table])
            .build();
        dst.objects.remove(&ObjectType::View);
        let generator = custom(vec![
            DatabaseFeatureSupport::builder("src", &[Paradigm::Relational])
                .full(&[ObjectType::Table, ObjectType::View])
                .build(),
            dst,
        ]);
        let matrix = generator.generate("src", "dst").unwrap();
        let rule = matrix.rule_for(ObjectType::View).unwrap();
        assert_eq!(rule.kind, ConversionKind::Drop);
        assert!(rule.notes[0].contains("declares nothing"));
    }

    #[test]
    fn test_every_rule_dropping_is_impossible() {
        let generator = custom(vec![
            DatabaseFeatureSupport::builder("src", &[Paradigm::Relational])
                .full(&[ObjectType::Trigger])
                .build(),
            DatabaseFeatureSupport::builder("dst", &[Paradigm::Relational])
                .full(&[ObjectType::Table])
                .build(),
        ]);
        let matrix = generator.generate("src", "dst").unwrap();
        assert_eq!(matrix.complexity, ComplexityClass::Impossible);
        assert_eq!(matrix.strategies, vec![StrategyTag::Hybrid]);
    }

    #[test]
    fn test_incompatible_paradigms_are_impossible() {
        let matrix = generator().generate("neo4j", "kafka").unwrap();
        assert_eq!(matrix.paradigm_compatibility, ParadigmCompatibility::Incompatible);
        assert_eq!(matrix.complexity, ComplexityClass::Impossible);
    }

    #[test]
    fn test_strategy_ties_add_hybrid() {
        let generator = custom(vec![
            DatabaseFeatureSupport::builder("src", &[Paradigm::Relational])
                .full(&[ObjectType::Table, ObjectType::Index])
                .build(),
            DatabaseFeatureSupport::builder("dst", &[Paradigm::Document])
                .full(&[ObjectType::Collection, ObjectType::Index])
                .instead(ObjectType::Table, &[ObjectType::Collection])
                .build(),
        ]);
        let matrix = generator.generate("src", "dst").unwrap();
        assert_eq!(
            matrix.strategies,
            vec![StrategyTag::Direct, StrategyTag::Denormalization, StrategyTag::Hybrid]
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = generator();
        let a = generator.generate("postgres", "neo4j").unwrap();
        let b = generator.generate("POSTGRES", "neo4j").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_not_symmetric() {
        let generator = generator();
        let forward = generator.generate("postgres", "mongodb").unwrap();
        let backward = generator.generate("mongodb", "postgres").unwrap();
        assert_ne!(forward.complexity, backward.complexity);
        assert_ne!(forward.fingerprint().unwrap(), backward.fingerprint().unwrap());
    }
}
