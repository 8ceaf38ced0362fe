//! User conversion contexts
//!
//! A context records one user's preferences for converting between a
//! (source, target) technology pair: object and field mappings, custom
//! rules, ignored objects and answers to conversion decisions.

pub mod manager;
pub mod request;
pub mod types;
pub mod validation;

pub use manager::ContextManager;
pub use request::ConversionRequest;
pub use types::{
    ConversionPreferences, CustomRule, FieldMapping, ObjectMapping, OptimizationGoal, RequiredValidation,
    UserConversionContext,
};
pub use validation::{FindingSeverity, ValidationFinding, ValidationReport};
