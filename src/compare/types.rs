//! Data type change classification
//!
//! Type names are compared case-insensitively. A change is:
//! - widening when every old value fits the new type
//! - narrowing when the families match but values may not fit
//! - incompatible otherwise

use std::sync::LazyLock;

use regex::Regex;

/// `varchar(255)`, `numeric(10, 2)`, `double precision`
static TYPE_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z][a-z0-9_ ]*?)\s*(?:\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?$").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeChange {
    Widening,
    Narrowing,
    Incompatible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Integer(u8),
    Float(u8),
    Decimal,
    Text,
    Json,
    Date,
    Timestamp,
    Boolean,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Signature {
    base: String,
    family: Family,
    /// Length or precision
    size: Option<u32>,
    scale: Option<u32>,
}

fn family_of(base: &str) -> Family {
    match base {
        "tinyint" | "int1" => Family::Integer(1),
        "smallint" | "int2" | "smallserial" => Family::Integer(2),
        "int" | "integer" | "int4" | "mediumint" | "serial" => Family::Integer(4),
        "bigint" | "int8" | "bigserial" | "long" => Family::Integer(8),
        "real" | "float4" => Family::Float(4),
        "float" | "float8" | "double" | "double precision" => Family::Float(8),
        "decimal" | "numeric" | "number" => Family::Decimal,
        "char" | "character" | "nchar" | "varchar" | "character varying" | "nvarchar" | "text"
        | "string" | "clob" | "mediumtext" | "longtext" => Family::Text,
        "json" | "jsonb" => Family::Json,
        "date" => Family::Date,
        "timestamp" | "timestamptz" | "datetime" | "timestamp with time zone"
        | "timestamp without time zone" => Family::Timestamp,
        "bool" | "boolean" => Family::Boolean,
        _ => Family::Other,
    }
}

fn parse(type_name: &str) -> Signature {
    let normalized = type_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if let Some(caps) = TYPE_SIGNATURE.captures(&normalized) {
        let base = caps[1].to_string();
        let size = caps.get(2).and_then(|m| m.as_str().parse().ok());
        let scale = caps.get(3).and_then(|m| m.as_str().parse().ok());
        return Signature {
            family: family_of(&base),
            base,
            size,
            scale,
        };
    }

    Signature {
        family: family_of(&normalized),
        base: normalized,
        size: None,
        scale: None,
    }
}

/// Whether two type names denote the same type
pub fn same_type(old: &str, new: &str) -> bool {
    parse(old) == parse(new)
}

/// Classify the change from `old` to `new`. Callers check [`same_type`] first.
pub fn classify(old: &str, new: &str) -> TypeChange {
    let old = parse(old);
    let new = parse(new);

    match (old.family, new.family) {
        (Family::Integer(a), Family::Integer(b)) => ordered(a <= b),
        (Family::Float(a), Family::Float(b)) => ordered(a <= b),
        (Family::Integer(_), Family::Float(_) | Family::Decimal) => TypeChange::Widening,
        (Family::Float(_) | Family::Decimal, Family::Integer(_)) => TypeChange::Narrowing,
        (Family::Decimal, Family::Float(_)) | (Family::Float(_), Family::Decimal) => TypeChange::Narrowing,
        (Family::Decimal, Family::Decimal) => decimal_change(&old, &new),
        (Family::Text, Family::Text) => text_change(&old, &new),
        (Family::Json, Family::Json) => TypeChange::Widening,
        (Family::Date, Family::Timestamp) => TypeChange::Widening,
        (Family::Timestamp, Family::Date) => TypeChange::Narrowing,
        (Family::Timestamp, Family::Timestamp) => TypeChange::Widening,
        (Family::Integer(_) | Family::Float(_) | Family::Decimal | Family::Boolean, Family::Text) => {
            if new.size.is_none() {
                TypeChange::Widening
            } else {
                TypeChange::Narrowing
            }
        }
        (Family::Date | Family::Timestamp, Family::Text) => TypeChange::Widening,
        (Family::Text, Family::Integer(_) | Family::Float(_) | Family::Decimal | Family::Boolean) => {
            TypeChange::Narrowing
        }
        (Family::Text, Family::Json) => TypeChange::Narrowing,
        (Family::Json, Family::Text) => TypeChange::Widening,
        (Family::Boolean, Family::Integer(_)) => TypeChange::Widening,
        (Family::Other, Family::Other) if old.base == new.base => ordered(fits(old.size, new.size)),
        _ => TypeChange::Incompatible,
    }
}

fn ordered(widening: bool) -> TypeChange {
    if widening {
        TypeChange::Widening
    } else {
        TypeChange::Narrowing
    }
}

/// An unbounded new size always fits; a bounded one must be at least the old
fn fits(old: Option<u32>, new: Option<u32>) -> bool {
    match (old, new) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(a), Some(b)) => a <= b,
    }
}

/// Both the integer digits (precision minus scale) and the scale must fit
fn decimal_change(old: &Signature, new: &Signature) -> TypeChange {
    let (Some(old_precision), Some(new_precision)) = (old.size, new.size) else {
        return ordered(fits(old.size, new.size));
    };
    let old_scale = old.scale.unwrap_or(0);
    let new_scale = new.scale.unwrap_or(0);
    let integer_digits_fit = old_precision.saturating_sub(old_scale) <= new_precision.saturating_sub(new_scale);
    ordered(integer_digits_fit && old_scale <= new_scale)
}

fn text_change(old: &Signature, new: &Signature) -> TypeChange {
    let unbounded = |s: &Signature| {
        matches!(
            s.base.as_str(),
            "text" | "string" | "clob" | "mediumtext" | "longtext"
        ) || s.size.is_none() && !matches!(s.base.as_str(), "char" | "character" | "nchar")
    };

    match (unbounded(old), unbounded(new)) {
        (_, true) => TypeChange::Widening,
        (true, false) => TypeChange::Narrowing,
        (false, false) => ordered(fits(old.size.or(Some(1)), new.size.or(Some(1)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_type_ignores_case_and_spacing() {
        assert!(same_type("VARCHAR(50)", "varchar( 50 )"));
        assert!(same_type("double  precision", "DOUBLE PRECISION"));
        assert!(!same_type("varchar(50)", "varchar(60)"));
    }

    #[test]
    fn test_numeric_widening() {
        assert_eq!(classify("int", "bigint"), TypeChange::Widening);
        assert_eq!(classify("bigint", "integer"), TypeChange::Narrowing);
        assert_eq!(classify("real", "double precision"), TypeChange::Widening);
        assert_eq!(classify("integer", "numeric(12,2)"), TypeChange::Widening);
        assert_eq!(classify("numeric(10,2)", "numeric(12,4)"), TypeChange::Widening);
        assert_eq!(classify("numeric(10,2)", "numeric(8,2)"), TypeChange::Narrowing);
        assert_eq!(classify("numeric(10)", "numeric(12,2)"), TypeChange::Widening);
        assert_eq!(classify("numeric(10,2)", "numeric"), TypeChange::Widening);
        assert_eq!(classify("numeric", "numeric(10,2)"), TypeChange::Narrowing);
        assert_eq!(classify("float", "int"), TypeChange::Narrowing);
    }

    #[test]
    fn test_decimal_scale_growth_can_lose_integer_digits() {
        // 8 integer digits become 7
        assert_eq!(classify("numeric(10,2)", "numeric(11,4)"), TypeChange::Narrowing);
        assert_eq!(classify("decimal(10,2)", "decimal(12,4)"), TypeChange::Widening);
        assert_eq!(classify("numeric(10,4)", "numeric(10,2)"), TypeChange::Narrowing);
    }

    #[test]
    fn test_text_widening() {
        assert_eq!(classify("varchar(50)", "varchar(100)"), TypeChange::Widening);
        assert_eq!(classify("varchar(100)", "varchar(50)"), TypeChange::Narrowing);
        assert_eq!(classify("varchar(100)", "text"), TypeChange::Widening);
        assert_eq!(classify("text", "varchar(255)"), TypeChange::Narrowing);
        assert_eq!(classify("char(2)", "varchar(10)"), TypeChange::Widening);
        assert_eq!(classify("int", "text"), TypeChange::Widening);
        assert_eq!(classify("text", "int"), TypeChange::Narrowing);
    }

    #[test]
    fn test_temporal_and_json() {
        assert_eq!(classify("date", "timestamp"), TypeChange::Widening);
        assert_eq!(classify("timestamptz", "date"), TypeChange::Narrowing);
        assert_eq!(classify("json", "jsonb"), TypeChange::Widening);
    }

    #[test]
    fn test_incompatible() {
        assert_eq!(classify("bytea", "integer"), TypeChange::Incompatible);
        assert_eq!(classify("uuid", "date"), TypeChange::Incompatible);
        assert_eq!(classify("boolean", "timestamp"), TypeChange::Incompatible);
    }
}
