//! Resource addresses - typed locators into a schema or external resource
//!
//! Format: `<protocol>://<scope>/<object_type>/<name>[/<kind>:<segment>]*`
//!
//! Examples:
//! - `database://data/table/users`
//! - `database://data/table/users/column:profile/key:address`
//! - `stream://schema/topic/orders/body:total`

pub mod navigator;

pub use navigator::{ExternalResolver, Navigator, ResourceLocation, StubResolver};

use crate::capability::CapabilityTable;
use crate::model::{ObjectType, Protocol, SelectorKind};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What part of a resource an address points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Data,
    Metadata,
    Schema,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Data => "data",
            Scope::Metadata => "metadata",
            Scope::Schema => "schema",
        }
    }

    /// Whether values read at this scope can be written to `target`
    pub fn is_compatible_with(&self, target: Scope) -> bool {
        matches!(
            (self, target),
            (Scope::Data, Scope::Data) | (Scope::Metadata, Scope::Data) | (Scope::Schema, Scope::Schema)
        )
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "data" => Ok(Scope::Data),
            "metadata" | "meta" => Ok(Scope::Metadata),
            "schema" => Ok(Scope::Schema),
            _ => Err(Error::InvalidInput(format!("Unknown scope: {}", s))),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One step of an address path, e.g. `column:email`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    pub kind: SelectorKind,
    pub name: String,
}

impl PathSegment {
    pub fn new(kind: SelectorKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// Typed locator for a point inside a schema or external resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceAddress {
    pub protocol: Protocol,
    pub scope: Scope,
    pub object_type: ObjectType,
    /// Top-level object name
    pub name: String,
    /// Ordered path below the object
    pub path: Vec<PathSegment>,
}

impl ResourceAddress {
    /// Create an address with an empty path
    pub fn new(protocol: Protocol, scope: Scope, object_type: ObjectType, name: impl Into<String>) -> Self {
        Self {
            protocol,
            scope,
            object_type,
            name: name.into(),
            path: Vec::new(),
        }
    }

    /// Shorthand for a data-scope database address
    pub fn database(object_type: ObjectType, name: impl Into<String>) -> Self {
        Self::new(Protocol::Database, Scope::Data, object_type, name)
    }

    /// Append a path segment
    pub fn segment(mut self, kind: SelectorKind, name: impl Into<String>) -> Self {
        self.path.push(PathSegment::new(kind, name));
        self
    }

    /// Parse an address string
    ///
    /// Expected format: `<protocol>://<scope>/<object_type>/<name>[/<kind>:<segment>]*`
    pub fn parse(address: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::invalid_address(address, reason);

        let (protocol_str, rest) = address
            .split_once("://")
            .ok_or_else(|| invalid("address must start with <protocol>://"))?;
        let protocol = Protocol::from_str(protocol_str).map_err(|e| invalid(&e.to_string()))?;

        let mut parts = rest.split('/');
        let scope = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("missing scope"))
            .and_then(|s| Scope::from_str(s).map_err(|e| invalid(&e.to_string())))?;
        let object_type = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("missing object type"))
            .and_then(|s| ObjectType::from_str(s).map_err(|e| invalid(&e.to_string())))?;
        let name = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("missing object name"))?
            .to_string();

        let mut path = Vec::new();
        for part in parts {
            let (kind_str, segment) = part
                .split_once(':')
                .ok_or_else(|| invalid(&format!("path segment '{}' must be kind:name", part)))?;
            let kind = SelectorKind::from_str(kind_str).map_err(|e| invalid(&e.to_string()))?;
            path.push(PathSegment::new(kind, segment));
        }

        Ok(Self {
            protocol,
            scope,
            object_type,
            name,
            path,
        })
    }

    /// Convert to address string
    pub fn to_address_string(&self) -> String {
        let mut s = format!(
            "{}://{}/{}/{}",
            self.protocol, self.scope, self.object_type, self.name
        );
        for segment in &self.path {
            s.push('/');
            s.push_str(&segment.to_string());
        }
        s
    }

    /// Check that scope, object type and path are consistent with the protocol
    pub fn validate(&self, capabilities: &CapabilityTable) -> Result<()> {
        let invalid = |reason: String| Error::invalid_address(self.to_address_string(), reason);

        if self.name.trim().is_empty() {
            return Err(invalid("object name is empty".into()));
        }
        if let Some(segment) = self.path.iter().find(|s| s.name.trim().is_empty()) {
            return Err(invalid(format!("empty {} segment", segment.kind)));
        }
        if self.object_type.protocol() != self.protocol {
            return Err(invalid(format!(
                "{} objects are addressed over {}, not {}",
                self.object_type,
                self.object_type.protocol(),
                self.protocol
            )));
        }

        match (self.protocol, self.scope) {
            (Protocol::Webhook, Scope::Schema) => {
                Err(invalid("webhook endpoints have no schema scope".into()))
            }
            (Protocol::Stream, Scope::Schema)
                if !capabilities.get(self.object_type).requires_schema_registration =>
            {
                Err(invalid(format!("{} has no registered schema", self.object_type)))
            }
            _ => Ok(()),
        }
    }

    /// Whether data at this address may be mapped onto `target`
    pub fn is_compatible_with(&self, target: &ResourceAddress) -> bool {
        self.scope.is_compatible_with(target.scope)
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_address_string())
    }
}

impl FromStr for ResourceAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ResourceAddress {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_address_string())
    }
}

impl<'de> Deserialize<'de> for ResourceAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::builtin_table;

    #[test]
    fn test_address_roundtrip() {
        let address = ResourceAddress::database(ObjectType::Table, "users")
            .segment(SelectorKind::Column, "profile")
            .segment(SelectorKind::Key, "city");
        let text = address.to_address_string();
        assert_eq!(text, "database://data/table/users/column:profile/key:city");
        assert_eq!(ResourceAddress::parse(&text).unwrap(), address);
    }

    #[test]
    fn test_address_parse_aliases() {
        let address = ResourceAddress::parse("db://metadata/vertex/Person/prop:name").unwrap();
        assert_eq!(address.protocol, Protocol::Database);
        assert_eq!(address.scope, Scope::Metadata);
        assert_eq!(address.object_type, ObjectType::Node);
        assert_eq!(address.path, vec![PathSegment::new(SelectorKind::Property, "name")]);
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(ResourceAddress::parse("users").is_err());
        assert!(ResourceAddress::parse("ftp://data/table/users").is_err());
        assert!(ResourceAddress::parse("database://data/table").is_err());
        assert!(ResourceAddress::parse("database://data/table/users/email").is_err());
        assert!(ResourceAddress::parse("database://everything/table/users").is_err());
    }

    #[test]
    fn test_protocol_consistency() {
        let table = builtin_table();
        let bad = ResourceAddress::new(Protocol::Stream, Scope::Data, ObjectType::Table, "users");
        assert!(matches!(bad.validate(table), Err(Error::InvalidAddress { .. })));

        let hook = ResourceAddress::new(Protocol::Webhook, Scope::Schema, ObjectType::Webhook, "orders");
        assert!(hook.validate(table).is_err());

        let topic = ResourceAddress::new(Protocol::Stream, Scope::Schema, ObjectType::Topic, "orders");
        assert!(topic.validate(table).is_ok());
        let stream = ResourceAddress::new(Protocol::Stream, Scope::Schema, ObjectType::Stream, "clicks");
        assert!(stream.validate(table).is_err());

        let empty_segment = ResourceAddress::database(ObjectType::Table, "users").segment(SelectorKind::Column, " ");
        assert!(empty_segment.validate(table).is_err());
    }

    #[test]
    fn test_scope_compatibility() {
        assert!(Scope::Data.is_compatible_with(Scope::Data));
        assert!(Scope::Metadata.is_compatible_with(Scope::Data));
        assert!(Scope::Schema.is_compatible_with(Scope::Schema));
        assert!(!Scope::Data.is_compatible_with(Scope::Metadata));
        assert!(!Scope::Data.is_compatible_with(Scope::Schema));
        assert!(!Scope::Schema.is_compatible_with(Scope::Data));
        assert!(!Scope::Metadata.is_compatible_with(Scope::Metadata));
    }

    #[test]
    fn test_serde_as_string() {
        let address = ResourceAddress::database(ObjectType::Collection, "orders");
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"database://data/collection/orders\"");
        let back: ResourceAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
