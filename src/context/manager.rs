//! Context Manager - create, validate, merge and apply user contexts
//!
//! Every operation borrows its inputs and returns fresh values; nothing
//! passed in is modified.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::request::ConversionRequest;
use super::validation::{self, ValidationReport};
use super::{ConversionPreferences, UserConversionContext};
use crate::matrix::ConversionMatrix;
use crate::{Error, Result};

fn normalize(technology: &str) -> String {
    technology.trim().to_lowercase()
}

fn same_pair(a: (&str, &str), b: (&str, &str)) -> bool {
    normalize(a.0) == normalize(b.0) && normalize(a.1) == normalize(b.1)
}

fn describe_pair((source, target): (&str, &str)) -> String {
    format!("{} -> {}", source, target)
}

/// Append items not seen yet, keeping first-seen order
fn union_into(target: &mut Vec<String>, seen: &mut BTreeSet<String>, items: &[String]) {
    for item in items {
        if seen.insert(item.clone()) {
            target.push(item.clone());
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ContextManager;

impl ContextManager {
    pub fn new() -> Self {
        Self
    }

    /// A fresh context with default preferences and empty collections
    pub fn create(&self, user_id: &str, source: &str, target: &str) -> UserConversionContext {
        let context = UserConversionContext {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            source_technology: source.to_string(),
            target_technology: target.to_string(),
            preferences: ConversionPreferences::default(),
            ..UserConversionContext::default()
        };
        tracing::debug!("Created context {} for {}", context.id, user_id);
        context
    }

    pub fn validate(&self, context: &UserConversionContext) -> ValidationReport {
        validation::validate(context)
    }

    /// Merge contexts for one technology pair, later contexts winning.
    ///
    /// Fails with [`Error::IncompatibleContexts`] naming the first context
    /// whose pair differs from the first one's.
    pub fn merge(&self, contexts: &[UserConversionContext]) -> Result<UserConversionContext> {
        let Some(first) = contexts.first() else {
            return Err(Error::InvalidInput("cannot merge an empty list of contexts".into()));
        };

        let expected = first.technology_pair();
        if let Some((index, other)) = contexts
            .iter()
            .enumerate()
            .find(|(_, c)| !same_pair(c.technology_pair(), expected))
        {
            return Err(Error::IncompatibleContexts {
                index,
                expected: describe_pair(expected),
                actual: describe_pair(other.technology_pair()),
            });
        }

        let mut merged = UserConversionContext {
            id: Uuid::new_v4().to_string(),
            source_technology: first.source_technology.clone(),
            target_technology: first.target_technology.clone(),
            ..UserConversionContext::default()
        };
        let mut ignored = BTreeSet::new();
        let mut tags = BTreeSet::new();

        for context in contexts {
            if !context.user_id.trim().is_empty() {
                merged.user_id = context.user_id.clone();
            }
            merged.preferences = context.preferences.clone();
            merged
                .object_mappings
                .extend(context.object_mappings.iter().map(|(k, v)| (k.clone(), v.clone())));
            merged
                .field_mappings
                .extend(context.field_mappings.iter().map(|(k, v)| (k.clone(), v.clone())));
            merged.custom_rules.extend(context.custom_rules.iter().cloned());
            merged
                .required_validations
                .extend(context.required_validations.iter().cloned());
            merged
                .decision_answers
                .extend(context.decision_answers.iter().map(|(k, v)| (k.clone(), v.clone())));
            merged
                .business_context
                .extend(context.business_context.iter().map(|(k, v)| (k.clone(), v.clone())));
            union_into(&mut merged.ignored_objects, &mut ignored, &context.ignored_objects);
            union_into(&mut merged.tags, &mut tags, &context.tags);
        }

        tracing::debug!("Merged {} contexts into {}", contexts.len(), merged.id);
        Ok(merged)
    }

    /// A copy of `request` with the context's preferences, exclusions and mappings applied
    pub fn apply_to_request(
        &self,
        request: &ConversionRequest,
        context: &UserConversionContext,
    ) -> Result<ConversionRequest> {
        let pair = (request.source_technology.as_str(), request.target_technology.as_str());
        if !pair.0.is_empty() && !pair.1.is_empty() && !same_pair(pair, context.technology_pair()) {
            return Err(Error::InvalidInput(format!(
                "context {} targets {}, request is {}",
                context.id,
                describe_pair(context.technology_pair()),
                describe_pair(pair)
            )));
        }

        let mut applied = request.clone();
        if applied.source_technology.is_empty() {
            applied.source_technology = context.source_technology.clone();
        }
        if applied.target_technology.is_empty() {
            applied.target_technology = context.target_technology.clone();
        }
        applied.preferences = context.preferences.clone();

        let mut seen: BTreeSet<String> = BTreeSet::new();
        let excluded = std::mem::take(&mut applied.excluded_objects);
        union_into(&mut applied.excluded_objects, &mut seen, &excluded);
        union_into(&mut applied.excluded_objects, &mut seen, &context.ignored_objects);

        applied
            .object_mappings
            .extend(context.object_mappings.iter().map(|(k, v)| (k.clone(), v.clone())));
        applied
            .field_mappings
            .extend(context.field_mappings.iter().map(|(k, v)| (k.clone(), v.clone())));

        Ok(applied)
    }

    /// A copy of `matrix` with decision answers taken from the context.
    ///
    /// Answers outside a decision's options are ignored.
    pub fn apply_to_matrix(
        &self,
        matrix: &ConversionMatrix,
        context: &UserConversionContext,
    ) -> Result<ConversionMatrix> {
        let pair = (matrix.source.as_str(), matrix.target.as_str());
        if !same_pair(pair, context.technology_pair()) {
            return Err(Error::InvalidInput(format!(
                "context {} targets {}, matrix is {}",
                context.id,
                describe_pair(context.technology_pair()),
                describe_pair(pair)
            )));
        }

        let mut applied = matrix.clone();
        for decision in applied.rules.iter_mut().flat_map(|r| r.decisions.iter_mut()) {
            let Some(answer) = context.decision_answers.get(&decision.key) else {
                continue;
            };
            if decision.options.contains(answer) {
                decision.answer = Some(answer.clone());
            } else {
                tracing::warn!(
                    "Ignoring answer '{}' for {}: expected one of {}",
                    answer,
                    decision.key,
                    decision.options.join(", ")
                );
            }
        }
        let open = applied.open_decisions().next().is_some();
        applied.requires_user_input = open;

        Ok(applied)
    }
}
