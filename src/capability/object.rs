//! Object capabilities - structural properties per object type
//!
//! The table is built once and never mutated. Lookups are total: any type
//! without an entry gets the conservative default (no data storage, has
//! metadata, no nesting, no selectors).

use crate::address::PathSegment;
use crate::model::{ObjectType, SelectorKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::LazyLock;

/// Declared structural properties of an object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCapability {
    pub can_store_data: bool,
    pub has_metadata: bool,
    pub supports_nesting: bool,
    pub selectors: BTreeSet<SelectorKind>,
    pub is_streaming: bool,
    pub is_stateless: bool,
    pub requires_schema_registration: bool,
}

impl ObjectCapability {
    /// The fallback for unknown or unregistered types
    pub fn conservative() -> Self {
        Self {
            can_store_data: false,
            has_metadata: true,
            supports_nesting: false,
            selectors: BTreeSet::new(),
            is_streaming: false,
            is_stateless: false,
            requires_schema_registration: false,
        }
    }

    /// A data-holding object addressable through the given selectors
    fn storage(selectors: &[SelectorKind]) -> Self {
        Self {
            can_store_data: true,
            selectors: selectors.iter().copied().collect(),
            ..Self::conservative()
        }
    }

    /// A metadata-only object addressable through the given selectors
    fn metadata(selectors: &[SelectorKind]) -> Self {
        Self {
            selectors: selectors.iter().copied().collect(),
            ..Self::conservative()
        }
    }

    fn nested(mut self) -> Self {
        self.supports_nesting = true;
        self
    }

    fn streaming(mut self) -> Self {
        self.is_streaming = true;
        self
    }

    fn stateless(mut self) -> Self {
        self.is_stateless = true;
        self
    }

    fn registered_schema(mut self) -> Self {
        self.requires_schema_registration = true;
        self
    }

    pub fn supports_selector(&self, selector: SelectorKind) -> bool {
        self.selectors.contains(&selector)
    }
}

impl Default for ObjectCapability {
    fn default() -> Self {
        Self::conservative()
    }
}

/// Immutable object-type → capability table.
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    entries: HashMap<ObjectType, ObjectCapability>,
    fallback: ObjectCapability,
}

impl CapabilityTable {
    /// Build a table from explicit entries; missing types fall back to the default
    pub fn from_entries(entries: impl IntoIterator<Item = (ObjectType, ObjectCapability)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            fallback: ObjectCapability::conservative(),
        }
    }

    /// The built-in capability table
    pub fn builtin() -> Self {
        use SelectorKind::*;

        Self::from_entries([
            (ObjectType::Table, ObjectCapability::storage(&[Column])),
            (ObjectType::View, ObjectCapability::metadata(&[Column])),
            (ObjectType::MaterializedView, ObjectCapability::storage(&[Column])),
            (ObjectType::Index, ObjectCapability::metadata(&[])),
            (ObjectType::Constraint, ObjectCapability::metadata(&[])),
            (ObjectType::Sequence, ObjectCapability::metadata(&[])),
            (ObjectType::Function, ObjectCapability::metadata(&[Parameter]).stateless()),
            (ObjectType::Procedure, ObjectCapability::metadata(&[Parameter]).stateless()),
            (ObjectType::Trigger, ObjectCapability::metadata(&[])),
            (ObjectType::CustomType, ObjectCapability::metadata(&[Field]).nested()),
            (ObjectType::Schema, ObjectCapability::metadata(&[])),
            (ObjectType::Collection, ObjectCapability::storage(&[Field]).nested()),
            (ObjectType::Document, ObjectCapability::storage(&[Field, Element, Key]).nested()),
            (ObjectType::Node, ObjectCapability::storage(&[Property])),
            (ObjectType::Relationship, ObjectCapability::storage(&[Property])),
            (ObjectType::Vector, ObjectCapability::storage(&[Element, Metadata])),
            (ObjectType::VectorIndex, ObjectCapability::metadata(&[Metadata])),
            (ObjectType::Embedding, ObjectCapability::storage(&[Element])),
            (
                ObjectType::Topic,
                ObjectCapability::storage(&[Key, Body, Header, Partition])
                    .streaming()
                    .registered_schema(),
            ),
            (ObjectType::Stream, ObjectCapability::storage(&[Key, Body, Header]).streaming()),
            (
                ObjectType::Webhook,
                ObjectCapability::metadata(&[Body, Header, Parameter]).stateless(),
            ),
        ])
    }

    /// Capability of an object type; never fails
    pub fn get(&self, object_type: ObjectType) -> &ObjectCapability {
        self.entries.get(&object_type).unwrap_or(&self.fallback)
    }

    /// Capability for a raw type tag; unrecognized tags get the default
    pub fn get_tag(&self, tag: &str) -> &ObjectCapability {
        match ObjectType::from_str(tag) {
            Ok(object_type) => self.get(object_type),
            Err(_) => &self.fallback,
        }
    }

    pub fn supports_selector(&self, object_type: ObjectType, selector: SelectorKind) -> bool {
        self.get(object_type).supports_selector(selector)
    }

    /// Whether a location inside an object can hold values.
    ///
    /// Returns false without looking at `path` when the type stores no data.
    /// Only the final segment's kind is inspected; intermediate segments are
    /// not validated here.
    pub fn can_store_values(&self, object_type: ObjectType, path: &[PathSegment]) -> bool {
        if !self.get(object_type).can_store_data {
            return false;
        }
        match path.last() {
            None => true,
            Some(segment) => segment.kind.is_storage(),
        }
    }
}

static BUILTIN: LazyLock<CapabilityTable> = LazyLock::new(CapabilityTable::builtin);

/// The process-wide built-in table
pub fn builtin_table() -> &'static CapabilityTable {
    &BUILTIN
}

pub fn object_capability(object_type: ObjectType) -> &'static ObjectCapability {
    BUILTIN.get(object_type)
}

pub fn capability_for_tag(tag: &str) -> &'static ObjectCapability {
    BUILTIN.get_tag(tag)
}

pub fn supports_selector(object_type: ObjectType, selector: SelectorKind) -> bool {
    BUILTIN.supports_selector(object_type, selector)
}

pub fn can_store_values(object_type: ObjectType, path: &[PathSegment]) -> bool {
    BUILTIN.can_store_values(object_type, path)
}

const METADATA_PROPERTIES: &[&str] = &[
    "name",
    "description",
    "comment",
    "owner",
    "created_at",
    "updated_at",
    "tags",
    "labels",
    "schema",
    "version",
    "definition",
    "options",
];

/// Whether a property name is descriptive metadata rather than data
pub fn is_metadata_property(name: &str) -> bool {
    METADATA_PROPERTIES.contains(&name.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_total() {
        for object_type in ObjectType::all() {
            let _ = object_capability(*object_type);
        }
        let unknown = capability_for_tag("hypercube");
        assert_eq!(*unknown, ObjectCapability::conservative());
        assert!(!unknown.can_store_data);
        assert!(unknown.has_metadata);
        assert!(!unknown.supports_nesting);
    }

    #[test]
    fn test_custom_table_falls_back() {
        let table = CapabilityTable::from_entries([(
            ObjectType::Table,
            ObjectCapability::storage(&[SelectorKind::Column]),
        )]);
        assert!(table.get(ObjectType::Table).can_store_data);
        assert_eq!(*table.get(ObjectType::Node), ObjectCapability::conservative());
    }

    #[test]
    fn test_tag_lookup_uses_aliases() {
        assert!(capability_for_tag("vertex").supports_selector(SelectorKind::Property));
        assert!(capability_for_tag("TOPIC").is_streaming);
    }

    #[test]
    fn test_selectors() {
        assert!(supports_selector(ObjectType::Table, SelectorKind::Column));
        assert!(!supports_selector(ObjectType::Table, SelectorKind::Field));
        assert!(supports_selector(ObjectType::Topic, SelectorKind::Partition));
        assert!(!supports_selector(ObjectType::Index, SelectorKind::Column));
    }

    #[test]
    fn test_can_store_values_skips_path_for_non_storage_types() {
        let path = vec![PathSegment::new(SelectorKind::Column, "email")];
        assert!(!can_store_values(ObjectType::View, &path));
        assert!(!can_store_values(ObjectType::View, &[]));
        assert!(!can_store_values(ObjectType::Webhook, &[PathSegment::new(SelectorKind::Body, "x")]));
    }

    #[test]
    fn test_can_store_values_inspects_final_segment() {
        assert!(can_store_values(ObjectType::Table, &[]));
        let to_header = vec![
            PathSegment::new(SelectorKind::Body, "order"),
            PathSegment::new(SelectorKind::Header, "trace-id"),
        ];
        assert!(!can_store_values(ObjectType::Topic, &to_header));
        // Intermediate segments are not validated
        let odd = vec![
            PathSegment::new(SelectorKind::Partition, "3"),
            PathSegment::new(SelectorKind::Key, "id"),
        ];
        assert!(can_store_values(ObjectType::Topic, &odd));
    }

    #[test]
    fn test_metadata_properties() {
        assert!(is_metadata_property("description"));
        assert!(is_metadata_property("Owner"));
        assert!(!is_metadata_property("email"));
    }

    #[test]
    fn test_streaming_flags() {
        let topic = object_capability(ObjectType::Topic);
        assert!(topic.is_streaming && topic.requires_schema_registration);
        assert!(object_capability(ObjectType::Webhook).is_stateless);
        assert!(object_capability(ObjectType::Document).supports_nesting);
    }
}
