//! Resource Navigator - resolves addresses into concrete schema positions
//!
//! Resolution order for the database protocol:
//! 1. Validate address well-formedness
//! 2. Look up the top-level object in the matching model collection
//! 3. Match the first path segment against the object's child kind
//! 4. Accept deeper segments only below a navigable data type
//!
//! Other protocols are handed to a registered [`ExternalResolver`].

use std::collections::HashMap;

use super::{PathSegment, ResourceAddress};
use crate::capability::{builtin_table, data_type_capability, CapabilityTable, DataTypeCapability};
use crate::model::{ObjectType, Protocol, SelectorKind, UnifiedModel};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Resolved target of an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLocation {
    pub address: ResourceAddress,
    pub object_type: ObjectType,
    /// Name of the top-level object
    pub parent: String,
    /// Child named by the first path segment
    pub child: Option<String>,
    pub child_kind: Option<SelectorKind>,
    /// Declared data type of the child
    pub data_type: Option<String>,
    pub data_type_capability: Option<DataTypeCapability>,
    /// Segments below the child, recorded verbatim
    pub nested_path: Vec<PathSegment>,
    pub can_store_values: bool,
    /// Resolved by an external collaborator rather than the model
    pub external: bool,
}

/// Resolver for non-database protocols.
///
/// Receives the navigator's capability table so storage checks agree with
/// database resolution.
pub trait ExternalResolver: Send + Sync {
    fn resolve(&self, address: &ResourceAddress, capabilities: &CapabilityTable) -> Result<ResourceLocation>;
}

/// Placeholder resolver that echoes the address back as an external location.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubResolver;

impl ExternalResolver for StubResolver {
    fn resolve(&self, address: &ResourceAddress, capabilities: &CapabilityTable) -> Result<ResourceLocation> {
        Ok(ResourceLocation {
            address: address.clone(),
            object_type: address.object_type,
            parent: address.name.clone(),
            child: address.path.first().map(|s| s.name.clone()),
            child_kind: address.path.first().map(|s| s.kind),
            data_type: None,
            data_type_capability: None,
            nested_path: address.path.iter().skip(1).cloned().collect(),
            can_store_values: capabilities.can_store_values(address.object_type, &address.path),
            external: true,
        })
    }
}

/// Navigator over one unified model
pub struct Navigator<'a> {
    model: &'a UnifiedModel,
    capabilities: &'a CapabilityTable,
    resolvers: HashMap<Protocol, Box<dyn ExternalResolver + 'a>>,
}

impl<'a> Navigator<'a> {
    /// Create a navigator using the built-in capability table
    pub fn new(model: &'a UnifiedModel) -> Self {
        Self {
            model,
            capabilities: builtin_table(),
            resolvers: HashMap::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: &'a CapabilityTable) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Register a resolver for a non-database protocol
    pub fn with_resolver(mut self, protocol: Protocol, resolver: impl ExternalResolver + 'a) -> Self {
        self.resolvers.insert(protocol, Box::new(resolver));
        self
    }

    /// Parse and resolve an address string
    pub fn resolve_str(&self, address: &str) -> Result<ResourceLocation> {
        self.resolve(&ResourceAddress::parse(address)?)
    }

    /// Resolve an address into a location
    pub fn resolve(&self, address: &ResourceAddress) -> Result<ResourceLocation> {
        address.validate(self.capabilities)?;

        match address.protocol {
            Protocol::Database => self.resolve_database(address),
            protocol => match self.resolvers.get(&protocol) {
                Some(resolver) => {
                    tracing::debug!("Delegating {} to {} resolver", address, protocol);
                    resolver.resolve(address, self.capabilities)
                }
                None => Err(Error::unsupported_navigation(
                    address.to_address_string(),
                    format!("a registered {} resolver", protocol),
                    "none",
                )),
            },
        }
    }

    fn resolve_database(&self, address: &ResourceAddress) -> Result<ResourceLocation> {
        let members = self
            .model
            .members(address.object_type, &address.name)
            .ok_or_else(|| Error::not_found(address.object_type.as_str(), &address.name))?;

        let mut location = ResourceLocation {
            address: address.clone(),
            object_type: address.object_type,
            parent: address.name.clone(),
            child: None,
            child_kind: None,
            data_type: None,
            data_type_capability: None,
            nested_path: Vec::new(),
            can_store_values: self.capabilities.can_store_values(address.object_type, &address.path),
            external: false,
        };

        let Some((first, rest)) = address.path.split_first() else {
            return Ok(location);
        };

        let expected = address.object_type.child_selector().ok_or_else(|| {
            Error::unsupported_navigation(
                address.to_address_string(),
                format!("no path below a {}", address.object_type),
                first.kind.as_str(),
            )
        })?;
        if first.kind != expected {
            return Err(Error::unsupported_navigation(
                address.to_address_string(),
                expected.as_str(),
                first.kind.as_str(),
            ));
        }

        let member = members
            .iter()
            .find(|m| m.name == first.name)
            .ok_or_else(|| Error::not_found(expected.as_str(), format!("{}.{}", address.name, first.name)))?;

        let capability = data_type_capability(&member.data_type);
        if !rest.is_empty() && !capability.is_navigable {
            return Err(Error::unsupported_navigation(
                address.to_address_string(),
                "a navigable data type",
                member.data_type.as_str(),
            ));
        }

        tracing::debug!(
            "Resolved {} to {}.{} ({})",
            address,
            address.name,
            member.name,
            member.data_type
        );

        location.child = Some(member.name.clone());
        location.child_kind = Some(expected);
        location.data_type = Some(member.data_type.clone());
        location.data_type_capability = Some(capability);
        location.nested_path = rest.to_vec();
        Ok(location)
    }
}
