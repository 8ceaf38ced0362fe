//! Structural diff of two unified models

use std::collections::{BTreeMap, BTreeSet};

use super::change::{ChangeType, Severity, StructuralChange};
use super::options::{ComparisonOptions, ObjectFilter};
use super::types::{self, TypeChange};
use crate::model::{Member, ObjectType, ObjectView, UnifiedModel};

/// Attribute changes that break existing readers or writers
const BREAKING_ATTRIBUTES: &[&str] = &["unique", "kind", "from", "to", "partitions"];

/// Attributes holding free text rather than identifiers
const TEXT_ATTRIBUTES: &[&str] = &["definition", "refresh"];

/// Name and text normalization according to the sensitivity toggles
#[derive(Debug, Clone, Copy)]
pub(crate) struct Normalizer {
    case_sensitive: bool,
    whitespace_sensitive: bool,
}

impl Normalizer {
    pub(crate) fn new(options: &ComparisonOptions) -> Self {
        Self {
            case_sensitive: options.case_sensitive,
            whitespace_sensitive: options.whitespace_sensitive,
        }
    }

    pub(crate) fn text(&self, value: &str) -> String {
        if self.whitespace_sensitive {
            value.to_string()
        } else {
            value.split_whitespace().collect::<Vec<_>>().join(" ")
        }
    }

    pub(crate) fn name(&self, value: &str) -> String {
        let value = self.text(value);
        if self.case_sensitive {
            value
        } else {
            value.to_lowercase()
        }
    }
}

/// An object present on both sides
#[derive(Debug, Clone)]
pub struct MatchedObject<'a> {
    pub old: ObjectView<'a>,
    pub new: ObjectView<'a>,
}

#[derive(Debug, Default)]
pub struct StructuralDiff<'a> {
    pub changes: Vec<StructuralChange>,
    pub matched: Vec<MatchedObject<'a>>,
    pub added: usize,
    pub removed: usize,
    /// Members present on either side of a matched object
    pub comparable_members: usize,
    /// Comparable members whose raw changes are all minor
    pub stable_members: usize,
}

impl StructuralDiff<'_> {
    /// Ratio of stable to comparable members
    pub fn similarity(&self) -> f64 {
        if self.comparable_members == 0 {
            if self.added == 0 && self.removed == 0 {
                1.0
            } else {
                0.0
            }
        } else {
            self.stable_members as f64 / self.comparable_members as f64
        }
    }
}

pub fn diff<'a>(
    old: &'a UnifiedModel,
    new: &'a UnifiedModel,
    options: &ComparisonOptions,
    filter: &ObjectFilter,
) -> StructuralDiff<'a> {
    let norm = Normalizer::new(options);
    let mut result = StructuralDiff::default();

    let mut remaining: BTreeMap<(ObjectType, String), ObjectView<'a>> = BTreeMap::new();
    for view in new.object_views() {
        if filter.accepts(view.object_type, view.name) {
            remaining
                .entry((view.object_type, norm.name(view.name)))
                .or_insert(view);
        }
    }

    let mut seen_old = BTreeSet::new();
    for view in old.object_views() {
        if !filter.accepts(view.object_type, view.name) {
            continue;
        }
        let key = (view.object_type, norm.name(view.name));
        if !seen_old.insert(key.clone()) {
            continue;
        }
        match remaining.remove(&key) {
            Some(new_view) => {
                let pair = MatchedObject { old: view, new: new_view };
                diff_object(&pair, options, norm, &mut result);
                result.matched.push(pair);
            }
            None => {
                result.removed += 1;
                result.changes.push(
                    StructuralChange::new(
                        ChangeType::ObjectRemoved,
                        view.object_type,
                        view.name,
                        Severity::Critical,
                        true,
                    )
                    .with_values(Some(view.name.to_string()), None)
                    .with_description(format!("{} {} removed", view.object_type, view.name)),
                );
            }
        }
    }

    for view in remaining.into_values() {
        result.added += 1;
        result.changes.push(
            StructuralChange::new(ChangeType::ObjectAdded, view.object_type, view.name, Severity::Minor, false)
                .with_values(None, Some(view.name.to_string()))
                .with_description(format!("{} {} added", view.object_type, view.name)),
        );
    }

    tracing::debug!(
        "Structural diff: {} matched, {} added, {} removed, {} changes",
        result.matched.len(),
        result.added,
        result.removed,
        result.changes.len()
    );

    result
}

fn diff_object(pair: &MatchedObject<'_>, options: &ComparisonOptions, norm: Normalizer, result: &mut StructuralDiff<'_>) {
    let (old, new) = (&pair.old, &pair.new);

    if options.comment_sensitive {
        let before = old.comment.map(|c| norm.text(c));
        let after = new.comment.map(|c| norm.text(c));
        if before != after {
            result.changes.push(
                StructuralChange::new(ChangeType::CommentChanged, new.object_type, new.name, Severity::Minor, false)
                    .with_values(before, after)
                    .with_description(format!("{} {} comment changed", new.object_type, new.name)),
            );
        }
    }

    let keys: BTreeSet<&str> = old.attributes.keys().chain(new.attributes.keys()).copied().collect();
    for key in keys {
        let normalize = |v: &String| {
            if TEXT_ATTRIBUTES.contains(&key) {
                norm.text(v)
            } else {
                norm.name(v)
            }
        };
        let before = old.attributes.get(key).map(normalize);
        let after = new.attributes.get(key).map(normalize);
        if before == after {
            continue;
        }
        result.changes.push(
            StructuralChange::new(
                ChangeType::AttributeChanged,
                new.object_type,
                new.name,
                Severity::Major,
                BREAKING_ATTRIBUTES.contains(&key),
            )
            .with_member(key)
            .with_values(old.attributes.get(key).cloned(), new.attributes.get(key).cloned())
            .with_description(format!("{} {} {} changed", new.object_type, new.name, key)),
        );
    }

    diff_members(pair, options, norm, result);
}

fn index_members<'m>(members: &'m [Member], norm: Normalizer) -> BTreeMap<String, &'m Member> {
    let mut index = BTreeMap::new();
    for member in members {
        index.entry(norm.name(&member.name)).or_insert(member);
    }
    index
}

fn diff_members(pair: &MatchedObject<'_>, options: &ComparisonOptions, norm: Normalizer, result: &mut StructuralDiff<'_>) {
    let object_type = pair.new.object_type;
    let object = pair.new.name;
    let kind = object_type.child_selector().map_or("member", |k| k.as_str());

    let old_members = index_members(pair.old.members, norm);
    let new_members = index_members(pair.new.members, norm);

    // Worst raw severity per member; `None` marks an unchanged member
    let mut worst: BTreeMap<String, Option<Severity>> = BTreeMap::new();

    for (key, member) in &old_members {
        if new_members.contains_key(key) {
            continue;
        }
        let severity = if member.primary_key {
            Severity::Critical
        } else {
            Severity::Major
        };
        record(
            &mut worst,
            key,
            StructuralChange::new(ChangeType::FieldRemoved, object_type, object, severity, true)
                .with_member(&member.name)
                .with_values(Some(member.data_type.clone()), None)
                .with_description(format!("{} {}.{} removed", kind, object, member.name)),
            &mut result.changes,
        );
    }

    for (key, member) in &new_members {
        if old_members.contains_key(key) {
            continue;
        }
        let required = !member.nullable && member.default.is_none();
        let severity = if required { Severity::Major } else { Severity::Minor };
        record(
            &mut worst,
            key,
            StructuralChange::new(ChangeType::FieldAdded, object_type, object, severity, required)
                .with_member(&member.name)
                .with_values(None, Some(member.data_type.clone()))
                .with_description(format!("{} {}.{} added", kind, object, member.name)),
            &mut result.changes,
        );
    }

    for (key, before) in &old_members {
        let Some(after) = new_members.get(key) else {
            continue;
        };
        worst.entry(key.clone()).or_insert(None);

        if !types::same_type(&before.data_type, &after.data_type) {
            let (severity, breaking, label) = match types::classify(&before.data_type, &after.data_type) {
                TypeChange::Widening => (Severity::Minor, false, "widening"),
                TypeChange::Narrowing => (Severity::Major, true, "narrowing"),
                TypeChange::Incompatible => (Severity::Major, true, "incompatible"),
            };
            record(
                &mut worst,
                key,
                StructuralChange::new(ChangeType::TypeChanged, object_type, object, severity, breaking)
                    .with_member(&after.name)
                    .with_values(Some(before.data_type.clone()), Some(after.data_type.clone()))
                    .with_description(format!(
                        "{} {}.{} type {} -> {} ({})",
                        kind, object, after.name, before.data_type, after.data_type, label
                    )),
                &mut result.changes,
            );
        }

        if before.nullable != after.nullable {
            let tightened = before.nullable && !after.nullable;
            let severity = if tightened { Severity::Major } else { Severity::Minor };
            record(
                &mut worst,
                key,
                StructuralChange::new(ChangeType::NullabilityChanged, object_type, object, severity, tightened)
                    .with_member(&after.name)
                    .with_values(Some(nullability(before)), Some(nullability(after)))
                    .with_description(format!(
                        "{} {}.{} {}",
                        kind,
                        object,
                        after.name,
                        if tightened { "became NOT NULL" } else { "became nullable" }
                    )),
                &mut result.changes,
            );
        }

        let old_default = before.default.as_deref().map(|d| norm.text(d));
        let new_default = after.default.as_deref().map(|d| norm.text(d));
        if old_default != new_default {
            record(
                &mut worst,
                key,
                StructuralChange::new(ChangeType::DefaultChanged, object_type, object, Severity::Minor, false)
                    .with_member(&after.name)
                    .with_values(before.default.clone(), after.default.clone())
                    .with_description(format!("{} {}.{} default changed", kind, object, after.name)),
                &mut result.changes,
            );
        }

        if options.comment_sensitive {
            let old_comment = before.comment.as_deref().map(|c| norm.text(c));
            let new_comment = after.comment.as_deref().map(|c| norm.text(c));
            if old_comment != new_comment {
                record(
                    &mut worst,
                    key,
                    StructuralChange::new(ChangeType::CommentChanged, object_type, object, Severity::Minor, false)
                        .with_member(&after.name)
                        .with_values(before.comment.clone(), after.comment.clone())
                        .with_description(format!("{} {}.{} comment changed", kind, object, after.name)),
                    &mut result.changes,
                );
            }
        }
    }

    if options.order_sensitive {
        let common = |members: &[Member]| -> Vec<String> {
            let mut seen = BTreeSet::new();
            members
                .iter()
                .map(|m| norm.name(&m.name))
                .filter(|k| old_members.contains_key(k) && new_members.contains_key(k))
                .filter(|k| seen.insert(k.clone()))
                .collect()
        };
        let old_order = common(pair.old.members);
        let new_order = common(pair.new.members);
        let old_positions: BTreeMap<&str, usize> = old_order
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i))
            .collect();

        for (position, key) in new_order.iter().enumerate() {
            let Some(&previous) = old_positions.get(key.as_str()) else {
                continue;
            };
            if previous == position {
                continue;
            }
            let name = new_members.get(key).map_or(key.as_str(), |m| m.name.as_str());
            record(
                &mut worst,
                key,
                StructuralChange::new(ChangeType::FieldReordered, object_type, object, Severity::Minor, false)
                    .with_member(name)
                    .with_values(Some(previous.to_string()), Some(position.to_string()))
                    .with_description(format!(
                        "{} {}.{} moved from position {} to {}",
                        kind, object, name, previous, position
                    )),
                &mut result.changes,
            );
        }
    }

    result.comparable_members += worst.len();
    result.stable_members += worst
        .values()
        .filter(|s| s.is_none_or(|s| s == Severity::Minor))
        .count();
}

fn record(
    worst: &mut BTreeMap<String, Option<Severity>>,
    key: &str,
    change: StructuralChange,
    changes: &mut Vec<StructuralChange>,
) {
    let slot = worst.entry(key.to_string()).or_insert(None);
    *slot = (*slot).max(Some(change.raw_severity));
    changes.push(change);
}

fn nullability(member: &Member) -> String {
    if member.nullable {
        "nullable".to_string()
    } else {
        "not null".to_string()
    }
}
