//! Object types - the schema object taxonomy
//!
//! Every lookup table in the crate is keyed by [`ObjectType`]. Object types
//! group into families by paradigm:
//! - Relational: table, view, materialized view, index, constraint, sequence,
//!   function, procedure, trigger, custom type, schema
//! - Document: collection, document
//! - Graph: node, relationship
//! - Vector: vector, vector index, embedding
//! - Streaming: topic, stream
//! - Endpoints: webhook

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Schema object kinds spanning every supported paradigm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Table,
    View,
    MaterializedView,
    Index,
    Constraint,
    Sequence,
    Function,
    Procedure,
    Trigger,
    CustomType,
    Schema,
    Collection,
    Document,
    Node,
    Relationship,
    Vector,
    VectorIndex,
    Embedding,
    Topic,
    Stream,
    Webhook,
}

impl ObjectType {
    /// Get the string representation of the object type
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Table => "table",
            ObjectType::View => "view",
            ObjectType::MaterializedView => "materialized_view",
            ObjectType::Index => "index",
            ObjectType::Constraint => "constraint",
            ObjectType::Sequence => "sequence",
            ObjectType::Function => "function",
            ObjectType::Procedure => "procedure",
            ObjectType::Trigger => "trigger",
            ObjectType::CustomType => "custom_type",
            ObjectType::Schema => "schema",
            ObjectType::Collection => "collection",
            ObjectType::Document => "document",
            ObjectType::Node => "node",
            ObjectType::Relationship => "relationship",
            ObjectType::Vector => "vector",
            ObjectType::VectorIndex => "vector_index",
            ObjectType::Embedding => "embedding",
            ObjectType::Topic => "topic",
            ObjectType::Stream => "stream",
            ObjectType::Webhook => "webhook",
        }
    }

    /// Get all object types, in key order
    pub fn all() -> &'static [ObjectType] {
        &[
            ObjectType::Table,
            ObjectType::View,
            ObjectType::MaterializedView,
            ObjectType::Index,
            ObjectType::Constraint,
            ObjectType::Sequence,
            ObjectType::Function,
            ObjectType::Procedure,
            ObjectType::Trigger,
            ObjectType::CustomType,
            ObjectType::Schema,
            ObjectType::Collection,
            ObjectType::Document,
            ObjectType::Node,
            ObjectType::Relationship,
            ObjectType::Vector,
            ObjectType::VectorIndex,
            ObjectType::Embedding,
            ObjectType::Topic,
            ObjectType::Stream,
            ObjectType::Webhook,
        ]
    }

    /// Protocol under which objects of this type are addressed
    pub fn protocol(&self) -> Protocol {
        match self {
            ObjectType::Topic | ObjectType::Stream => Protocol::Stream,
            ObjectType::Webhook => Protocol::Webhook,
            _ => Protocol::Database,
        }
    }

    /// Kind of child a path's first segment must name inside this object, if any
    pub fn child_selector(&self) -> Option<SelectorKind> {
        match self {
            ObjectType::Table | ObjectType::View | ObjectType::MaterializedView => {
                Some(SelectorKind::Column)
            }
            ObjectType::Collection => Some(SelectorKind::Field),
            ObjectType::Node | ObjectType::Relationship => Some(SelectorKind::Property),
            _ => None,
        }
    }
}

impl FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "table" | "relation" => Ok(ObjectType::Table),
            "view" => Ok(ObjectType::View),
            "materialized_view" | "matview" | "mview" => Ok(ObjectType::MaterializedView),
            "index" => Ok(ObjectType::Index),
            "constraint" => Ok(ObjectType::Constraint),
            "sequence" => Ok(ObjectType::Sequence),
            "function" | "fn" => Ok(ObjectType::Function),
            "procedure" | "proc" => Ok(ObjectType::Procedure),
            "trigger" => Ok(ObjectType::Trigger),
            "custom_type" | "type" | "udt" => Ok(ObjectType::CustomType),
            "schema" | "namespace" => Ok(ObjectType::Schema),
            "collection" => Ok(ObjectType::Collection),
            "document" | "doc" => Ok(ObjectType::Document),
            "node" | "vertex" | "label" => Ok(ObjectType::Node),
            "relationship" | "edge" | "rel" => Ok(ObjectType::Relationship),
            "vector" => Ok(ObjectType::Vector),
            "vector_index" => Ok(ObjectType::VectorIndex),
            "embedding" => Ok(ObjectType::Embedding),
            "topic" => Ok(ObjectType::Topic),
            "stream" => Ok(ObjectType::Stream),
            "webhook" | "endpoint" => Ok(ObjectType::Webhook),
            _ => Err(Error::InvalidInput(format!("Unknown object type: {}", s))),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Broad data-model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Paradigm {
    Relational,
    Document,
    Graph,
    Vector,
    Streaming,
    KeyValue,
}

impl Paradigm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Paradigm::Relational => "relational",
            Paradigm::Document => "document",
            Paradigm::Graph => "graph",
            Paradigm::Vector => "vector",
            Paradigm::Streaming => "streaming",
            Paradigm::KeyValue => "key_value",
        }
    }
}

impl std::fmt::Display for Paradigm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Addressing selector kinds, also used as path segment kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Column,
    Field,
    Property,
    Element,
    Key,
    Body,
    Parameter,
    Header,
    Partition,
    Metadata,
}

impl SelectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorKind::Column => "column",
            SelectorKind::Field => "field",
            SelectorKind::Property => "property",
            SelectorKind::Element => "element",
            SelectorKind::Key => "key",
            SelectorKind::Body => "body",
            SelectorKind::Parameter => "parameter",
            SelectorKind::Header => "header",
            SelectorKind::Partition => "partition",
            SelectorKind::Metadata => "metadata",
        }
    }

    /// Whether a segment of this kind names a location that holds values
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            SelectorKind::Column
                | SelectorKind::Field
                | SelectorKind::Property
                | SelectorKind::Element
                | SelectorKind::Key
                | SelectorKind::Body
                | SelectorKind::Parameter
        )
    }
}

impl FromStr for SelectorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "column" | "col" => Ok(SelectorKind::Column),
            "field" => Ok(SelectorKind::Field),
            "property" | "prop" => Ok(SelectorKind::Property),
            "element" | "elem" | "item" => Ok(SelectorKind::Element),
            "key" => Ok(SelectorKind::Key),
            "body" | "value" | "payload" => Ok(SelectorKind::Body),
            "parameter" | "param" => Ok(SelectorKind::Parameter),
            "header" => Ok(SelectorKind::Header),
            "partition" => Ok(SelectorKind::Partition),
            "metadata" | "meta" => Ok(SelectorKind::Metadata),
            _ => Err(Error::InvalidInput(format!("Unknown selector kind: {}", s))),
        }
    }
}

impl std::fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Addressing protocol families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Database,
    Stream,
    Webhook,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Database => "database",
            Protocol::Stream => "stream",
            Protocol::Webhook => "webhook",
        }
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "database" | "db" => Ok(Protocol::Database),
            "stream" => Ok(Protocol::Stream),
            "webhook" | "http" => Ok(Protocol::Webhook),
            _ => Err(Error::InvalidInput(format!("Unknown protocol: {}", s))),
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_object_type_roundtrip() {
        for kind in ObjectType::all() {
            let parsed: ObjectType = kind.as_str().parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_object_types_are_unique_keys() {
        let unique: HashSet<_> = ObjectType::all().iter().collect();
        assert_eq!(unique.len(), ObjectType::all().len());
    }

    #[test]
    fn test_object_type_aliases() {
        assert_eq!(ObjectType::from_str("edge").unwrap(), ObjectType::Relationship);
        assert_eq!(ObjectType::from_str("Materialized-View").unwrap(), ObjectType::MaterializedView);
        assert_eq!(ObjectType::from_str("vertex").unwrap(), ObjectType::Node);
        assert!(ObjectType::from_str("spreadsheet").is_err());
    }

    #[test]
    fn test_child_selectors() {
        assert_eq!(ObjectType::Table.child_selector(), Some(SelectorKind::Column));
        assert_eq!(ObjectType::Collection.child_selector(), Some(SelectorKind::Field));
        assert_eq!(ObjectType::Relationship.child_selector(), Some(SelectorKind::Property));
        assert_eq!(ObjectType::Index.child_selector(), None);
    }

    #[test]
    fn test_storage_selectors() {
        assert!(SelectorKind::Column.is_storage());
        assert!(SelectorKind::Body.is_storage());
        assert!(!SelectorKind::Header.is_storage());
        assert!(!SelectorKind::Partition.is_storage());
    }

    #[test]
    fn test_protocols() {
        assert_eq!(ObjectType::Topic.protocol(), Protocol::Stream);
        assert_eq!(ObjectType::Webhook.protocol(), Protocol::Webhook);
        assert_eq!(ObjectType::Node.protocol(), Protocol::Database);
        assert_eq!(Protocol::from_str("db").unwrap(), Protocol::Database);
    }
}
