//! Capability Registry - structural capabilities per object type and data type
//!
//! Generic code asks "can this store values?" or "is this navigable?" instead
//! of special-casing type names.

pub mod data_type;
pub mod object;

pub use data_type::{data_type_capability, DataTypeCapability, SchemaFormat, TypeClass};
pub use object::{
    builtin_table, can_store_values, capability_for_tag, is_metadata_property, object_capability,
    supports_selector, CapabilityTable, ObjectCapability,
};
