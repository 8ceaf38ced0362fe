//! Paradigm compatibility between technologies

use crate::matrix::ComplexityClass;
use crate::model::Paradigm;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParadigmCompatibility {
    Identical,
    Compatible,
    Partial,
    Incompatible,
}

impl ParadigmCompatibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParadigmCompatibility::Identical => "identical",
            ParadigmCompatibility::Compatible => "compatible",
            ParadigmCompatibility::Partial => "partial",
            ParadigmCompatibility::Incompatible => "incompatible",
        }
    }

    /// Lowest complexity a conversion across this gap can have
    pub fn complexity_floor(&self) -> ComplexityClass {
        match self {
            ParadigmCompatibility::Identical => ComplexityClass::Trivial,
            ParadigmCompatibility::Compatible => ComplexityClass::Simple,
            ParadigmCompatibility::Partial => ComplexityClass::Moderate,
            ParadigmCompatibility::Incompatible => ComplexityClass::Impossible,
        }
    }
}

impl std::fmt::Display for ParadigmCompatibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Known paradigm bridges; each pair works in both directions
const BRIDGES: &[(Paradigm, Paradigm)] = &[
    (Paradigm::Relational, Paradigm::Document),
    (Paradigm::Relational, Paradigm::Graph),
    (Paradigm::Document, Paradigm::Graph),
    (Paradigm::Relational, Paradigm::KeyValue),
    (Paradigm::Document, Paradigm::KeyValue),
    (Paradigm::Relational, Paradigm::Vector),
    (Paradigm::Document, Paradigm::Vector),
    (Paradigm::Streaming, Paradigm::Document),
    (Paradigm::Streaming, Paradigm::Relational),
    (Paradigm::Streaming, Paradigm::KeyValue),
];

/// Whether data in paradigm `a` has a known representation in `b`
pub fn bridged(a: Paradigm, b: Paradigm) -> bool {
    a == b || BRIDGES.iter().any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Classify how the source paradigms map onto the target paradigms.
///
/// A source paradigm is reachable when the target declares it or a bridge
/// leads to one of the target's paradigms.
pub fn classify(source: &BTreeSet<Paradigm>, target: &BTreeSet<Paradigm>) -> ParadigmCompatibility {
    if source == target {
        return ParadigmCompatibility::Identical;
    }

    let reachable = source
        .iter()
        .filter(|s| target.iter().any(|t| bridged(**s, *t)))
        .count();

    if reachable == 0 {
        ParadigmCompatibility::Incompatible
    } else if reachable == source.len() {
        ParadigmCompatibility::Compatible
    } else {
        ParadigmCompatibility::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(paradigms: &[Paradigm]) -> BTreeSet<Paradigm> {
        paradigms.iter().copied().collect()
    }

    #[test]
    fn test_identical() {
        let rel = set(&[Paradigm::Relational]);
        assert_eq!(classify(&rel, &rel), ParadigmCompatibility::Identical);
    }

    #[test]
    fn test_bridged_is_compatible() {
        assert_eq!(
            classify(&set(&[Paradigm::Relational]), &set(&[Paradigm::Document])),
            ParadigmCompatibility::Compatible
        );
        assert_eq!(
            classify(&set(&[Paradigm::Graph]), &set(&[Paradigm::Relational])),
            ParadigmCompatibility::Compatible
        );
    }

    #[test]
    fn test_partial_overlap() {
        assert_eq!(
            classify(
                &set(&[Paradigm::Relational, Paradigm::Graph]),
                &set(&[Paradigm::Streaming])
            ),
            ParadigmCompatibility::Partial
        );
    }

    #[test]
    fn test_no_bridge_is_incompatible() {
        assert_eq!(
            classify(&set(&[Paradigm::Graph]), &set(&[Paradigm::Streaming])),
            ParadigmCompatibility::Incompatible
        );
        assert_eq!(
            classify(&set(&[Paradigm::Vector]), &set(&[Paradigm::Graph])),
            ParadigmCompatibility::Incompatible
        );
    }

    #[test]
    fn test_bridges_are_symmetric() {
        assert!(bridged(Paradigm::Document, Paradigm::Streaming));
        assert!(bridged(Paradigm::Streaming, Paradigm::Document));
        assert!(!bridged(Paradigm::Graph, Paradigm::Vector));
    }
}
