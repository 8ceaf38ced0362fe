//! Data-type capabilities - heuristic classification of type names
//!
//! Classification runs ordered substring predicates over the lowercased type
//! name; the first match wins:
//!
//! 1. `json` (covers `jsonb`) - structured, navigable, JSON schema format
//! 2. `xml` - structured, navigable, XML schema format
//! 3. `array`, `list` or a `[]` suffix - array, navigable
//! 4. `avro`, `protobuf` - structured, navigable, named schema format
//! 5. `map`, `dict`, `hstore`, `composite`, `struct`, `record` - structured, navigable
//! 6. `blob`, `binary`, `bytea` - opaque, not navigable
//! 7. anything else - scalar, not navigable
//!
//! A name can satisfy several predicates (`binary_json`, `struct_list`,
//! `bitmap`); the order above decides and is pinned by regression tests.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Declared schema format of a structured type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    Json,
    Xml,
    Avro,
    Protobuf,
}

/// Which classification predicate matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    Json,
    Xml,
    Array,
    NamedSchema,
    Composite,
    Binary,
    Scalar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTypeCapability {
    pub class: TypeClass,
    pub is_structured: bool,
    pub is_array: bool,
    pub is_navigable: bool,
    pub element_type: Option<String>,
    pub schema_format: Option<SchemaFormat>,
}

impl DataTypeCapability {
    fn structured(class: TypeClass, schema_format: Option<SchemaFormat>) -> Self {
        Self {
            class,
            is_structured: true,
            is_array: false,
            is_navigable: true,
            element_type: None,
            schema_format,
        }
    }

    fn opaque(class: TypeClass) -> Self {
        Self {
            class,
            is_structured: false,
            is_array: false,
            is_navigable: false,
            element_type: None,
            schema_format: None,
        }
    }
}

static BRACKET_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\[\s*\d*\s*\]$").expect("valid regex"));

static GENERIC_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:array|list)\s*<\s*(.+?)\s*>$").expect("valid regex"));

static SQL_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+array$").expect("valid regex"));

/// Classify a data-type name
pub fn data_type_capability(type_name: &str) -> DataTypeCapability {
    let name = type_name.trim().to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

    if has(&["json"]) {
        return DataTypeCapability::structured(TypeClass::Json, Some(SchemaFormat::Json));
    }
    if has(&["xml"]) {
        return DataTypeCapability::structured(TypeClass::Xml, Some(SchemaFormat::Xml));
    }
    if has(&["array", "list"]) || BRACKET_SUFFIX.is_match(&name) {
        return DataTypeCapability {
            class: TypeClass::Array,
            is_structured: false,
            is_array: true,
            is_navigable: true,
            element_type: element_type(&name),
            schema_format: None,
        };
    }
    if has(&["avro", "protobuf"]) {
        let format = if name.contains("avro") {
            SchemaFormat::Avro
        } else {
            SchemaFormat::Protobuf
        };
        return DataTypeCapability::structured(TypeClass::NamedSchema, Some(format));
    }
    if has(&["map", "dict", "hstore", "composite", "struct", "record"]) {
        return DataTypeCapability::structured(TypeClass::Composite, None);
    }
    if has(&["blob", "binary", "bytea"]) {
        return DataTypeCapability::opaque(TypeClass::Binary);
    }
    DataTypeCapability::opaque(TypeClass::Scalar)
}

fn element_type(name: &str) -> Option<String> {
    [&*GENERIC_ARRAY, &*BRACKET_SUFFIX, &*SQL_ARRAY]
        .iter()
        .find_map(|re| re.captures(name))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_classes() {
        let jsonb = data_type_capability("JSONB");
        assert!(jsonb.is_structured && jsonb.is_navigable);
        assert_eq!(jsonb.schema_format, Some(SchemaFormat::Json));

        assert_eq!(data_type_capability("xml").schema_format, Some(SchemaFormat::Xml));
        assert_eq!(data_type_capability("avro_record").schema_format, Some(SchemaFormat::Avro));
        assert_eq!(data_type_capability("protobuf").schema_format, Some(SchemaFormat::Protobuf));

        let hstore = data_type_capability("hstore");
        assert!(hstore.is_structured && hstore.is_navigable);
        assert_eq!(hstore.schema_format, None);

        let bytea = data_type_capability("bytea");
        assert!(!bytea.is_navigable && !bytea.is_structured);

        let int = data_type_capability("integer");
        assert_eq!(int.class, TypeClass::Scalar);
        assert!(!int.is_navigable);
    }

    #[test]
    fn test_arrays_and_element_types() {
        let pg = data_type_capability("integer[]");
        assert!(pg.is_array && pg.is_navigable && !pg.is_structured);
        assert_eq!(pg.element_type.as_deref(), Some("integer"));

        assert_eq!(data_type_capability("array<string>").element_type.as_deref(), Some("string"));
        assert_eq!(data_type_capability("LIST<int>").element_type.as_deref(), Some("int"));
        assert_eq!(data_type_capability("text ARRAY").element_type.as_deref(), Some("text"));
        assert_eq!(data_type_capability("varchar(20)[3]").element_type.as_deref(), Some("varchar(20)"));
        assert_eq!(data_type_capability("array").element_type, None);
    }

    /// Names that satisfy more than one predicate; the first predicate wins.
    #[test]
    fn test_ambiguous_names_follow_predicate_order() {
        let cases = [
            ("binary_json", TypeClass::Json),
            ("json_array", TypeClass::Json),
            ("jsonb[]", TypeClass::Json),
            ("xml_list", TypeClass::Xml),
            ("struct_list", TypeClass::Array),
            ("blob_array", TypeClass::Array),
            ("bytea[]", TypeClass::Array),
            ("map<string,int>[]", TypeClass::Array),
            ("protobuf_map", TypeClass::NamedSchema),
            ("avro_binary", TypeClass::NamedSchema),
            ("record_blob", TypeClass::Composite),
            ("bitmap", TypeClass::Composite),
            ("binary_struct", TypeClass::Composite),
            ("varbinary", TypeClass::Binary),
        ];
        for (name, expected) in cases {
            assert_eq!(data_type_capability(name).class, expected, "type name {}", name);
        }
    }
}
