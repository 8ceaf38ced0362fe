//! Accumulating context validation

use serde::{Deserialize, Serialize};

use super::UserConversionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Warning,
    Critical,
}

impl FindingSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingSeverity::Warning => "warning",
            FindingSeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub severity: FindingSeverity,
    /// Path of the offending field, e.g. `object_mappings.users.target_type`
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    fn critical(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(FindingSeverity::Critical, field.into(), message.into());
    }

    fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(FindingSeverity::Warning, field.into(), message.into());
    }

    fn push(&mut self, severity: FindingSeverity, field: String, message: String) {
        self.findings.push(ValidationFinding {
            severity,
            field,
            message,
        });
    }

    /// No critical findings
    pub fn is_valid(&self) -> bool {
        !self
            .findings
            .iter()
            .any(|f| f.severity == FindingSeverity::Critical)
    }

    pub fn criticals(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings
            .iter()
            .filter(|f| f.severity == FindingSeverity::Critical)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings
            .iter()
            .filter(|f| f.severity == FindingSeverity::Warning)
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn blank_opt(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(blank)
}

/// Check a context, collecting every finding
pub fn validate(context: &UserConversionContext) -> ValidationReport {
    let mut report = ValidationReport::default();

    if blank(&context.user_id) {
        report.critical("user_id", "user id is required");
    }
    if blank(&context.source_technology) {
        report.critical("source_technology", "source technology is required");
    }
    if blank(&context.target_technology) {
        report.critical("target_technology", "target technology is required");
    }

    for (object, mapping) in &context.object_mappings {
        if mapping.source_type.is_none() {
            report.critical(
                format!("object_mappings.{}.source_type", object),
                "object mapping needs a source object type",
            );
        }
        if mapping.target_type.is_none() {
            report.critical(
                format!("object_mappings.{}.target_type", object),
                "object mapping needs a target object type",
            );
        }
    }

    for (key, mapping) in &context.field_mappings {
        if blank(&mapping.source_name) {
            report.critical(
                format!("field_mappings.{}.source_name", key),
                "field mapping needs a source name",
            );
        }
        if blank_opt(&mapping.source_data_type) {
            report.critical(
                format!("field_mappings.{}.source_data_type", key),
                "field mapping needs a source data type",
            );
        }
        if blank_opt(&mapping.target_data_type) {
            report.critical(
                format!("field_mappings.{}.target_data_type", key),
                "field mapping needs a target data type",
            );
        }
    }

    for (i, rule) in context.custom_rules.iter().enumerate() {
        if blank(&rule.name) {
            report.warning(format!("custom_rules[{}].name", i), "custom rule has no name");
        }
        if rule.conditions.is_empty() {
            report.warning(format!("custom_rules[{}].conditions", i), "custom rule has no conditions");
        }
        if rule.actions.is_empty() {
            report.warning(format!("custom_rules[{}].actions", i), "custom rule has no actions");
        }
    }

    tracing::debug!(
        "Validated context {}: {} findings",
        context.id,
        report.findings.len()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CustomRule, FieldMapping, ObjectMapping};
    use crate::model::ObjectType;

    fn context() -> UserConversionContext {
        UserConversionContext {
            id: "ctx".into(),
            user_id: "alice".into(),
            source_technology: "postgres".into(),
            target_technology: "mongodb".into(),
            ..UserConversionContext::default()
        }
    }

    #[test]
    fn test_valid_context() {
        let ctx = context()
            .with_object_mapping("users", ObjectMapping::new(ObjectType::Table, ObjectType::Collection))
            .with_field_mapping("users.id", FieldMapping::new("id", "bigint", "objectId"));
        let report = validate(&ctx);
        assert!(report.is_valid());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_findings_accumulate() {
        let mut ctx = context()
            .with_object_mapping("users", ObjectMapping::default())
            .with_field_mapping(
                "users.email",
                FieldMapping {
                    source_name: " ".into(),
                    ..FieldMapping::default()
                },
            )
            .with_custom_rule(CustomRule::default());
        ctx.user_id.clear();
        ctx.target_technology.clear();

        let report = validate(&ctx);
        assert!(!report.is_valid());

        let fields: Vec<&str> = report.criticals().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "user_id",
                "target_technology",
                "object_mappings.users.source_type",
                "object_mappings.users.target_type",
                "field_mappings.users.email.source_name",
                "field_mappings.users.email.source_data_type",
                "field_mappings.users.email.target_data_type",
            ]
        );
        assert_eq!(report.warnings().count(), 3);
    }

    #[test]
    fn test_rule_warnings_do_not_invalidate() {
        let ctx = context().with_custom_rule(CustomRule {
            name: "keep audit".into(),
            conditions: vec!["object = audit_log".into()],
            ..CustomRule::default()
        });
        let report = validate(&ctx);
        assert!(report.is_valid());
        assert_eq!(report.warnings().next().unwrap().field, "custom_rules[0].actions");
    }
}
