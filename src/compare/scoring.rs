//! Similarity, compatibility and migration complexity scores
//!
//! - overall = 0.7 * structural + 0.3 * enrichment (structural alone without enrichment)
//! - compatibility = (overall - min(0.05 * breaking, 0.5)) * complexity factor, clamped to [0, 1]
//!
//! Migration complexity ladder:
//!
//! | class      | compatibility | breaking changes |
//! |------------|---------------|------------------|
//! | trivial    | >= 0.95       | 0                |
//! | simple     | >= 0.80       | <= 2             |
//! | moderate   | >= 0.60       | <= 10            |
//! | complex    | otherwise     |                  |
//!
//! A conversion matrix that reports `impossible` overrides the ladder.

use crate::matrix::ComplexityClass;

pub const STRUCTURAL_WEIGHT: f64 = 0.7;
pub const ENRICHMENT_WEIGHT: f64 = 0.3;
pub const BREAKING_PENALTY: f64 = 0.05;
pub const MAX_BREAKING_PENALTY: f64 = 0.5;

pub fn overall_similarity(structural: f64, enrichment: Option<f64>) -> f64 {
    match enrichment {
        Some(enrichment) => STRUCTURAL_WEIGHT * structural + ENRICHMENT_WEIGHT * enrichment,
        None => structural,
    }
}

/// Compatibility score; `matrix` is the conversion complexity for the technology pair, if known
pub fn compatibility_score(overall: f64, breaking: usize, matrix: Option<ComplexityClass>) -> f64 {
    let penalty = (BREAKING_PENALTY * breaking as f64).min(MAX_BREAKING_PENALTY);
    let factor = matrix.map_or(1.0, |c| c.compatibility_factor());
    ((overall - penalty) * factor).clamp(0.0, 1.0)
}

pub fn migration_complexity(compatibility: f64, breaking: usize, matrix: Option<ComplexityClass>) -> ComplexityClass {
    if matrix == Some(ComplexityClass::Impossible) {
        return ComplexityClass::Impossible;
    }

    if compatibility >= 0.95 && breaking == 0 {
        ComplexityClass::Trivial
    } else if compatibility >= 0.80 && breaking <= 2 {
        ComplexityClass::Simple
    } else if compatibility >= 0.60 && breaking <= 10 {
        ComplexityClass::Moderate
    } else {
        ComplexityClass::Complex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_overall_weights() {
        assert_eq!(overall_similarity(0.8, None), 0.8);
        assert!(close(overall_similarity(1.0, Some(0.0)), 0.7));
        assert!(close(overall_similarity(0.5, Some(1.0)), 0.65));
    }

    #[test]
    fn test_breaking_penalty_caps() {
        assert!(close(compatibility_score(1.0, 2, None), 0.9));
        assert!(close(compatibility_score(1.0, 10, None), 0.5));
        assert!(close(compatibility_score(1.0, 40, None), 0.5));
        assert_eq!(compatibility_score(0.3, 10, None), 0.0);
    }

    #[test]
    fn test_matrix_factor() {
        assert!(close(compatibility_score(1.0, 0, Some(ComplexityClass::Trivial)), 1.0));
        assert!(close(compatibility_score(1.0, 0, Some(ComplexityClass::Simple)), 0.95));
        assert!(close(compatibility_score(1.0, 0, Some(ComplexityClass::Moderate)), 0.85));
        assert!(close(compatibility_score(1.0, 0, Some(ComplexityClass::Complex)), 0.7));
        assert_eq!(compatibility_score(1.0, 0, Some(ComplexityClass::Impossible)), 0.0);
    }

    #[test]
    fn test_ladder_boundaries() {
        use ComplexityClass::*;

        assert_eq!(migration_complexity(0.95, 0, None), Trivial);
        assert_eq!(migration_complexity(0.9499, 0, None), Simple);
        assert_eq!(migration_complexity(1.0, 1, None), Simple);

        assert_eq!(migration_complexity(0.80, 2, None), Simple);
        assert_eq!(migration_complexity(0.7999, 2, None), Moderate);
        assert_eq!(migration_complexity(0.90, 3, None), Moderate);

        assert_eq!(migration_complexity(0.60, 10, None), Moderate);
        assert_eq!(migration_complexity(0.5999, 0, None), Complex);
        assert_eq!(migration_complexity(0.90, 11, None), Complex);
    }

    #[test]
    fn test_impossible_matrix_overrides() {
        assert_eq!(
            migration_complexity(1.0, 0, Some(ComplexityClass::Impossible)),
            ComplexityClass::Impossible
        );
        assert_eq!(
            migration_complexity(1.0, 0, Some(ComplexityClass::Complex)),
            ComplexityClass::Trivial
        );
    }
}
