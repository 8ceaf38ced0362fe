//! Unified model - object taxonomy, schema snapshot and enrichment
//!
//! These are the value types every engine consumes. None of them is mutated
//! by the planning core.

pub mod enrichment;
pub mod object_type;
pub mod unified;

pub use enrichment::{
    member_key, AccessPattern, GraphEnrichment, MemberEnrichment, ObjectEnrichment, RiskLevel,
    UnifiedModelEnrichment,
};
pub use object_type::{ObjectType, Paradigm, Protocol, SelectorKind};
pub use unified::{
    Collection, Column, Constraint, Field, Index, MaterializedView, Member, Node, ObjectView,
    Property, Relationship, Table, Topic, UnifiedModel, View,
};
