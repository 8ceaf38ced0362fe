//! Unified model - canonical, paradigm-agnostic schema snapshot
//!
//! A [`UnifiedModel`] is produced by a discovery collaborator and handed to
//! the engines as a read-only value. Every object collection is keyed by
//! object name; iteration order is therefore stable.

use crate::model::ObjectType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A typed member of a schema object: a table column, a collection field,
/// or a node/relationship property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn default_nullable() -> bool {
    true
}

pub type Column = Member;
pub type Field = Member;
pub type Property = Member;

impl Member {
    /// Create a nullable member with no default
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default: None,
            primary_key: false,
            comment: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark as primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub name: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterializedView {
    pub name: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Collection {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub label: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Node {
    pub fn new(label: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            label: label.into(),
            properties,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship type, e.g. `PURCHASED`
    pub name: String,
    pub from_label: String,
    pub to_label: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    /// Name of the indexed object
    pub object: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub object: String,
    /// primary_key, foreign_key, unique, check, ...
    pub kind: String,
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    #[serde(default = "default_partitions")]
    pub partitions: u32,
    /// Value schema fields
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn default_partitions() -> u32 {
    1
}

/// Canonical snapshot of one database's schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedModel {
    /// Database technology tag, e.g. `postgres`
    pub database_type: String,
    #[serde(default)]
    pub tables: BTreeMap<String, Table>,
    #[serde(default)]
    pub views: BTreeMap<String, View>,
    #[serde(default)]
    pub materialized_views: BTreeMap<String, MaterializedView>,
    #[serde(default)]
    pub collections: BTreeMap<String, Collection>,
    #[serde(default)]
    pub nodes: BTreeMap<String, Node>,
    #[serde(default)]
    pub relationships: BTreeMap<String, Relationship>,
    #[serde(default)]
    pub indexes: BTreeMap<String, Index>,
    #[serde(default)]
    pub constraints: BTreeMap<String, Constraint>,
    #[serde(default)]
    pub topics: BTreeMap<String, Topic>,
}

/// Uniform, borrowed view of one schema object used by the comparison engine.
#[derive(Debug, Clone)]
pub struct ObjectView<'a> {
    pub object_type: ObjectType,
    pub name: &'a str,
    pub comment: Option<&'a str>,
    /// Scalar, non-member properties that participate in diffs
    pub attributes: BTreeMap<&'static str, String>,
    pub members: &'a [Member],
}

impl UnifiedModel {
    /// Create an empty model for a technology
    pub fn new(database_type: impl Into<String>) -> Self {
        Self {
            database_type: database_type.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.views.insert(view.name.clone(), view);
        self
    }

    pub fn with_materialized_view(mut self, view: MaterializedView) -> Self {
        self.materialized_views.insert(view.name.clone(), view);
        self
    }

    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collections.insert(collection.name.clone(), collection);
        self
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.insert(node.label.clone(), node);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.insert(relationship.name.clone(), relationship);
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.insert(index.name.clone(), index);
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.insert(constraint.name.clone(), constraint);
        self
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topics.insert(topic.name.clone(), topic);
        self
    }

    /// Whether the model holds an object of this type and name
    pub fn contains(&self, object_type: ObjectType, name: &str) -> bool {
        match object_type {
            ObjectType::Table => self.tables.contains_key(name),
            ObjectType::View => self.views.contains_key(name),
            ObjectType::MaterializedView => self.materialized_views.contains_key(name),
            ObjectType::Collection => self.collections.contains_key(name),
            ObjectType::Node => self.nodes.contains_key(name),
            ObjectType::Relationship => self.relationships.contains_key(name),
            ObjectType::Index => self.indexes.contains_key(name),
            ObjectType::Constraint => self.constraints.contains_key(name),
            ObjectType::Topic => self.topics.contains_key(name),
            _ => false,
        }
    }

    /// Typed members of a named object, or `None` if the object is absent.
    ///
    /// Objects without members (indexes, constraints) yield an empty slice.
    pub fn members(&self, object_type: ObjectType, name: &str) -> Option<&[Member]> {
        match object_type {
            ObjectType::Table => self.tables.get(name).map(|t| t.columns.as_slice()),
            ObjectType::View => self.views.get(name).map(|v| v.columns.as_slice()),
            ObjectType::MaterializedView => {
                self.materialized_views.get(name).map(|v| v.columns.as_slice())
            }
            ObjectType::Collection => self.collections.get(name).map(|c| c.fields.as_slice()),
            ObjectType::Node => self.nodes.get(name).map(|n| n.properties.as_slice()),
            ObjectType::Relationship => {
                self.relationships.get(name).map(|r| r.properties.as_slice())
            }
            ObjectType::Topic => self.topics.get(name).map(|t| t.fields.as_slice()),
            ObjectType::Index | ObjectType::Constraint => {
                self.contains(object_type, name).then_some(&[][..])
            }
            _ => None,
        }
    }

    /// Names of all objects of a type, in key order
    pub fn object_names(&self, object_type: ObjectType) -> Vec<&str> {
        fn keys<V>(map: &BTreeMap<String, V>) -> Vec<&str> {
            map.keys().map(String::as_str).collect()
        }

        match object_type {
            ObjectType::Table => keys(&self.tables),
            ObjectType::View => keys(&self.views),
            ObjectType::MaterializedView => keys(&self.materialized_views),
            ObjectType::Collection => keys(&self.collections),
            ObjectType::Node => keys(&self.nodes),
            ObjectType::Relationship => keys(&self.relationships),
            ObjectType::Index => keys(&self.indexes),
            ObjectType::Constraint => keys(&self.constraints),
            ObjectType::Topic => keys(&self.topics),
            _ => Vec::new(),
        }
    }

    /// Total number of objects across every collection
    pub fn object_count(&self) -> usize {
        self.tables.len()
            + self.views.len()
            + self.materialized_views.len()
            + self.collections.len()
            + self.nodes.len()
            + self.relationships.len()
            + self.indexes.len()
            + self.constraints.len()
            + self.topics.len()
    }

    /// Every object as a uniform view, grouped by type in [`ObjectType`] order
    pub fn object_views(&self) -> Vec<ObjectView<'_>> {
        let mut views = Vec::with_capacity(self.object_count());

        for t in self.tables.values() {
            views.push(ObjectView {
                object_type: ObjectType::Table,
                name: &t.name,
                comment: t.comment.as_deref(),
                attributes: BTreeMap::new(),
                members: &t.columns,
            });
        }
        for v in self.views.values() {
            views.push(ObjectView {
                object_type: ObjectType::View,
                name: &v.name,
                comment: v.comment.as_deref(),
                attributes: BTreeMap::from([("definition", v.definition.clone())]),
                members: &v.columns,
            });
        }
        for v in self.materialized_views.values() {
            let mut attributes = BTreeMap::from([("definition", v.definition.clone())]);
            if let Some(refresh) = &v.refresh {
                attributes.insert("refresh", refresh.clone());
            }
            views.push(ObjectView {
                object_type: ObjectType::MaterializedView,
                name: &v.name,
                comment: v.comment.as_deref(),
                attributes,
                members: &v.columns,
            });
        }
        for i in self.indexes.values() {
            views.push(ObjectView {
                object_type: ObjectType::Index,
                name: &i.name,
                comment: None,
                attributes: BTreeMap::from([
                    ("object", i.object.clone()),
                    ("columns", i.columns.join(",")),
                    ("unique", i.unique.to_string()),
                ]),
                members: &[],
            });
        }
        for c in self.constraints.values() {
            views.push(ObjectView {
                object_type: ObjectType::Constraint,
                name: &c.name,
                comment: None,
                attributes: BTreeMap::from([
                    ("object", c.object.clone()),
                    ("kind", c.kind.clone()),
                    ("columns", c.columns.join(",")),
                ]),
                members: &[],
            });
        }
        for c in self.collections.values() {
            views.push(ObjectView {
                object_type: ObjectType::Collection,
                name: &c.name,
                comment: c.comment.as_deref(),
                attributes: BTreeMap::new(),
                members: &c.fields,
            });
        }
        for n in self.nodes.values() {
            views.push(ObjectView {
                object_type: ObjectType::Node,
                name: &n.label,
                comment: n.comment.as_deref(),
                attributes: BTreeMap::new(),
                members: &n.properties,
            });
        }
        for r in self.relationships.values() {
            views.push(ObjectView {
                object_type: ObjectType::Relationship,
                name: &r.name,
                comment: r.comment.as_deref(),
                attributes: BTreeMap::from([
                    ("from", r.from_label.clone()),
                    ("to", r.to_label.clone()),
                ]),
                members: &r.properties,
            });
        }
        for t in self.topics.values() {
            views.push(ObjectView {
                object_type: ObjectType::Topic,
                name: &t.name,
                comment: t.comment.as_deref(),
                attributes: BTreeMap::from([("partitions", t.partitions.to_string())]),
                members: &t.fields,
            });
        }

        views
    }
}
