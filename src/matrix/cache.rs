//! Memoized conversion matrices

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{ConversionMatrix, MatrixGenerator};
use crate::registry::FeatureRegistry;
use crate::Result;

#[derive(Debug, Default)]
struct Slot {
    registry: Option<Arc<FeatureRegistry>>,
    matrices: HashMap<(String, String), Arc<ConversionMatrix>>,
}

impl Slot {
    fn holds(&self, registry: &Arc<FeatureRegistry>) -> bool {
        self.registry.as_ref().is_some_and(|r| Arc::ptr_eq(r, registry))
    }
}

/// Matrices for one registry snapshot, keyed by (source, target).
///
/// A generator bound to a different snapshot replaces every cached entry, so
/// two registries never share results even when their generations match.
#[derive(Debug, Default)]
pub struct MatrixCache {
    slot: RwLock<Slot>,
}

impl MatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached matrix for the pair, generating it on a miss
    pub fn get_or_generate(
        &self,
        generator: &MatrixGenerator,
        source: &str,
        target: &str,
    ) -> Result<Arc<ConversionMatrix>> {
        let registry = generator.shared_registry();
        let key = (source.trim().to_lowercase(), target.trim().to_lowercase());

        {
            let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            if slot.holds(registry)
                && let Some(hit) = slot.matrices.get(&key)
            {
                return Ok(Arc::clone(hit));
            }
        }

        let matrix = Arc::new(generator.generate(source, target)?);

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if !slot.holds(registry) {
            if !slot.matrices.is_empty() {
                tracing::debug!(
                    "Evicted {} matrices for registry generation {}",
                    slot.matrices.len(),
                    slot.registry.as_ref().map_or(0, |r| r.generation())
                );
            }
            slot.matrices.clear();
            slot.registry = Some(Arc::clone(registry));
        }
        let cached = slot.matrices.entry(key).or_insert(matrix);
        Ok(Arc::clone(cached))
    }

    pub fn len(&self) -> usize {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Slot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectType, Paradigm};
    use crate::registry::{DatabaseFeatureSupport, RegistryHandle};

    #[test]
    fn test_hits_share_the_same_matrix() {
        let cache = MatrixCache::new();
        let generator = MatrixGenerator::new(Arc::new(FeatureRegistry::builtin()));

        let first = cache.get_or_generate(&generator, "postgres", "mongodb").unwrap();
        let second = cache.get_or_generate(&generator, "Postgres", "MongoDB").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = MatrixCache::new();
        let generator = MatrixGenerator::new(Arc::new(FeatureRegistry::builtin()));
        assert!(cache.get_or_generate(&generator, "postgres", "oracle").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_new_generation_evicts_stale_entries() {
        let handle = RegistryHandle::default();
        let cache = MatrixCache::new();

        let old = cache
            .get_or_generate(&MatrixGenerator::from_handle(&handle), "postgres", "mongodb")
            .unwrap();
        handle.publish(FeatureRegistry::builtin());
        let new = cache
            .get_or_generate(&MatrixGenerator::from_handle(&handle), "postgres", "mongodb")
            .unwrap();

        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(*old, *new);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unrelated_registries_do_not_share_entries() {
        let cache = MatrixCache::new();
        let builtin = MatrixGenerator::new(Arc::new(FeatureRegistry::builtin()));
        let custom = MatrixGenerator::new(Arc::new(FeatureRegistry::new([
            DatabaseFeatureSupport::builder("postgres", &[Paradigm::Relational])
                .full(&[ObjectType::Table])
                .build(),
            DatabaseFeatureSupport::builder("mongodb", &[Paradigm::Document])
                .full(&[ObjectType::Collection])
                .instead(ObjectType::Table, &[ObjectType::Collection])
                .build(),
        ])));
        assert_eq!(builtin.registry().generation(), custom.registry().generation());

        let wide = cache.get_or_generate(&builtin, "postgres", "mongodb").unwrap();
        let narrow = cache.get_or_generate(&custom, "postgres", "mongodb").unwrap();

        assert!(wide.rules.len() > 1);
        assert_eq!(narrow.rules.len(), 1);
        assert_eq!(*narrow, custom.generate("postgres", "mongodb").unwrap());
        assert_eq!(cache.len(), 1);
    }
}
