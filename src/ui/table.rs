use tabled::{settings::Style, Table, Tabled};

use crate::capability::CapabilityTable;
use crate::compare::{EnrichmentChange, StructuralChange};
use crate::matrix::ConversionMatrix;
use crate::model::ObjectType;
use crate::registry::FeatureRegistry;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct TechnologyRow {
    #[tabled(rename = "Technology")]
    technology: String,
    #[tabled(rename = "Paradigms")]
    paradigms: String,
    #[tabled(rename = "Source")]
    source: &'static str,
    #[tabled(rename = "Target")]
    target: &'static str,
    #[tabled(rename = "Object types")]
    object_types: usize,
}

#[derive(Tabled)]
struct CapabilityRow {
    #[tabled(rename = "Type")]
    object_type: &'static str,
    #[tabled(rename = "Stores data")]
    stores_data: &'static str,
    #[tabled(rename = "Nesting")]
    nesting: &'static str,
    #[tabled(rename = "Streaming")]
    streaming: &'static str,
    #[tabled(rename = "Selectors")]
    selectors: String,
}

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Source")]
    source: &'static str,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Automation")]
    automation: &'static str,
    #[tabled(rename = "Context")]
    context: String,
}

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Severity")]
    severity: &'static str,
    #[tabled(rename = "Change")]
    change: &'static str,
    #[tabled(rename = "Object")]
    object: String,
    #[tabled(rename = "Breaking")]
    breaking: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

#[derive(Tabled)]
struct EnrichmentRow {
    #[tabled(rename = "Severity")]
    severity: &'static str,
    #[tabled(rename = "Change")]
    change: &'static str,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Old")]
    old: String,
    #[tabled(rename = "New")]
    new: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        render(&self.rows)
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn join<T: std::fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

pub fn technologies_table(registry: &FeatureRegistry) -> String {
    let rows: Vec<TechnologyRow> = registry
        .technologies()
        .map(|t| TechnologyRow {
            technology: t.technology.clone(),
            paradigms: join(&t.paradigms),
            source: yes_no(t.can_be_source),
            target: yes_no(t.can_be_target),
            object_types: t.supported_types().count(),
        })
        .collect();
    render(&rows)
}

pub fn capabilities_table(table: &CapabilityTable) -> String {
    let rows: Vec<CapabilityRow> = ObjectType::all()
        .iter()
        .map(|&object_type| {
            let capability = table.get(object_type);
            CapabilityRow {
                object_type: object_type.as_str(),
                stores_data: yes_no(capability.can_store_data),
                nesting: yes_no(capability.supports_nesting),
                streaming: yes_no(capability.is_streaming),
                selectors: join(&capability.selectors),
            }
        })
        .collect();
    render(&rows)
}

pub fn rules_table(matrix: &ConversionMatrix) -> String {
    let rows: Vec<RuleRow> = matrix
        .rules
        .iter()
        .map(|rule| RuleRow {
            source: rule.source_type.as_str(),
            target: if rule.target_types.is_empty() {
                "-".to_string()
            } else {
                join(&rule.target_types)
            },
            kind: rule.kind.as_str(),
            automation: rule.automation.as_str(),
            context: join(rule.required_context.iter().map(|k| k.as_str())),
        })
        .collect();
    render(&rows)
}

pub fn changes_table(changes: &[StructuralChange]) -> String {
    let rows: Vec<ChangeRow> = changes
        .iter()
        .map(|c| ChangeRow {
            severity: c.severity.as_str(),
            change: c.change_type.as_str(),
            object: match &c.member {
                Some(member) => format!("{} {}.{}", c.object_type, c.object, member),
                None => format!("{} {}", c.object_type, c.object),
            },
            breaking: yes_no(c.breaking),
            detail: c.description.clone(),
        })
        .collect();
    render(&rows)
}

pub fn enrichment_table(changes: &[EnrichmentChange]) -> String {
    let rows: Vec<EnrichmentRow> = changes
        .iter()
        .map(|c| EnrichmentRow {
            severity: c.severity.as_str(),
            change: c.change_type.as_str(),
            key: c.key.clone(),
            old: c.old_value.clone(),
            new: c.new_value.clone(),
        })
        .collect();
    render(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder_renders_nothing() {
        assert!(TableBuilder::new().build().is_empty());
        assert!(changes_table(&[]).is_empty());
    }

    #[test]
    fn test_stats_table_contains_rows() {
        let table = stats_table(&[("Rules", "7"), ("Complexity", "moderate")]);
        assert!(table.contains("Metric"));
        assert!(table.contains("moderate"));
    }

    #[test]
    fn test_technologies_table_lists_builtin() {
        let table = technologies_table(&FeatureRegistry::builtin());
        assert!(table.contains("postgres"));
        assert!(table.contains("kafka"));
    }

    #[test]
    fn test_rules_table_marks_drops() {
        let generator = crate::MatrixGenerator::new(std::sync::Arc::new(FeatureRegistry::builtin()));
        let matrix = generator.generate("neo4j", "kafka").unwrap();
        let table = rules_table(&matrix);
        assert!(table.contains("drop"));
    }
}
