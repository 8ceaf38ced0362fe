//! Feature Registry - per-technology object support
//!
//! A [`FeatureRegistry`] is an immutable snapshot. Reloading builds a fresh
//! registry and publishes it through a [`RegistryHandle`], which swaps a
//! single `Arc` under a write lock. Readers holding an older snapshot keep
//! seeing it unchanged.

pub mod builtin;

use crate::model::{ObjectType, Paradigm};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// How well a technology supports an object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportLevel {
    Full,
    Partial,
    Emulated,
    Unsupported,
}

impl SupportLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportLevel::Full => "full",
            SupportLevel::Partial => "partial",
            SupportLevel::Emulated => "emulated",
            SupportLevel::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSupport {
    pub level: SupportLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub limitations: Vec<String>,
    /// Object types used in place of this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<ObjectType>,
}

impl ObjectSupport {
    pub fn new(level: SupportLevel) -> Self {
        Self {
            level,
            limitations: Vec::new(),
            alternatives: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Object support declared by one database technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseFeatureSupport {
    pub technology: String,
    pub paradigms: BTreeSet<Paradigm>,
    #[serde(default)]
    pub objects: BTreeMap<ObjectType, ObjectSupport>,
    #[serde(default = "default_true")]
    pub can_be_source: bool,
    #[serde(default = "default_true")]
    pub can_be_target: bool,
    #[serde(default)]
    pub preferred_targets: Vec<String>,
}

impl DatabaseFeatureSupport {
    pub fn builder(technology: &str, paradigms: &[Paradigm]) -> FeatureSupportBuilder {
        FeatureSupportBuilder {
            inner: DatabaseFeatureSupport {
                technology: normalize(technology),
                paradigms: paradigms.iter().copied().collect(),
                objects: BTreeMap::new(),
                can_be_source: true,
                can_be_target: true,
                preferred_targets: Vec::new(),
            },
        }
    }

    /// Declared support for an object type, if the technology lists it at all
    pub fn support(&self, object_type: ObjectType) -> Option<&ObjectSupport> {
        self.objects.get(&object_type)
    }

    pub fn supports(&self, object_type: ObjectType) -> bool {
        self.support(object_type)
            .is_some_and(|s| s.level != SupportLevel::Unsupported)
    }

    /// Object types this technology can hold, in key order
    pub fn supported_types(&self) -> impl Iterator<Item = ObjectType> + '_ {
        self.objects
            .iter()
            .filter(|(_, s)| s.level != SupportLevel::Unsupported)
            .map(|(t, _)| *t)
    }
}

/// Fluent construction of a [`DatabaseFeatureSupport`] entry
pub struct FeatureSupportBuilder {
    inner: DatabaseFeatureSupport,
}

impl FeatureSupportBuilder {
    pub fn full(mut self, types: &[ObjectType]) -> Self {
        for t in types {
            self.inner.objects.insert(*t, ObjectSupport::new(SupportLevel::Full));
        }
        self
    }

    pub fn partial(mut self, object_type: ObjectType, limitation: &str) -> Self {
        let mut support = ObjectSupport::new(SupportLevel::Partial);
        support.limitations.push(limitation.to_string());
        self.inner.objects.insert(object_type, support);
        self
    }

    pub fn emulated(mut self, object_type: ObjectType, alternatives: &[ObjectType], limitation: &str) -> Self {
        let mut support = ObjectSupport::new(SupportLevel::Emulated);
        support.alternatives = alternatives.to_vec();
        support.limitations.push(limitation.to_string());
        self.inner.objects.insert(object_type, support);
        self
    }

    /// Mark a type unsupported, converted into the given alternatives
    pub fn instead(mut self, object_type: ObjectType, alternatives: &[ObjectType]) -> Self {
        let mut support = ObjectSupport::new(SupportLevel::Unsupported);
        support.alternatives = alternatives.to_vec();
        self.inner.objects.insert(object_type, support);
        self
    }

    pub fn source_only(mut self) -> Self {
        self.inner.can_be_target = false;
        self
    }

    pub fn target_only(mut self) -> Self {
        self.inner.can_be_source = false;
        self
    }

    pub fn prefer(mut self, targets: &[&str]) -> Self {
        self.inner.preferred_targets = targets.iter().map(|t| normalize(t)).collect();
        self
    }

    /// Finish the entry; every unlisted type becomes unsupported without alternatives
    pub fn build(mut self) -> DatabaseFeatureSupport {
        for t in ObjectType::all() {
            self.inner
                .objects
                .entry(*t)
                .or_insert_with(|| ObjectSupport::new(SupportLevel::Unsupported));
        }
        self.inner
    }
}

fn normalize(technology: &str) -> String {
    technology.trim().to_lowercase()
}

#[derive(Debug, Deserialize, Serialize)]
struct RegistryFile {
    #[serde(rename = "technology", default)]
    technologies: Vec<DatabaseFeatureSupport>,
}

/// Immutable snapshot of every registered technology.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRegistry {
    generation: u64,
    technologies: BTreeMap<String, DatabaseFeatureSupport>,
}

impl FeatureRegistry {
    pub fn new(entries: impl IntoIterator<Item = DatabaseFeatureSupport>) -> Self {
        Self {
            generation: 0,
            technologies: entries
                .into_iter()
                .map(|mut e| {
                    e.technology = normalize(&e.technology);
                    (e.technology.clone(), e)
                })
                .collect(),
        }
    }

    /// The registry shipped with the crate
    pub fn builtin() -> Self {
        Self::new(builtin::technologies())
    }

    /// Parse `[[technology]]` entries from TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(contents)?;
        Ok(Self::new(file.technologies))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let file = RegistryFile {
            technologies: self.technologies.values().cloned().collect(),
        };
        toml::to_string_pretty(&file).map_err(|e| Error::InvalidInput(e.to_string()))
    }

    /// A new registry with `overrides` replacing entries of the same technology
    pub fn overlay(&self, overrides: FeatureRegistry) -> Self {
        let mut technologies = self.technologies.clone();
        technologies.extend(overrides.technologies);
        Self {
            generation: self.generation,
            technologies,
        }
    }

    /// Publication counter assigned by [`RegistryHandle::publish`]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, technology: &str) -> Option<&DatabaseFeatureSupport> {
        self.technologies.get(&normalize(technology))
    }

    /// Look up a technology, failing with [`Error::RegistryMissing`]
    pub fn require(&self, technology: &str) -> Result<&DatabaseFeatureSupport> {
        self.get(technology)
            .ok_or_else(|| Error::registry_missing(technology, "no feature support registered"))
    }

    pub fn technologies(&self) -> impl Iterator<Item = &DatabaseFeatureSupport> {
        self.technologies.values()
    }

    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }
}

/// Shared, hot-swappable reference to the current registry snapshot.
///
/// The `Arc<RwLock<Arc<T>>>` shape gives shared ownership of the slot, a
/// write lock for replacement, and cheap clones of the snapshot for readers.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    current: Arc<RwLock<Arc<FeatureRegistry>>>,
}

impl RegistryHandle {
    pub fn new(registry: FeatureRegistry) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// The registry in effect right now
    pub fn snapshot(&self) -> Arc<FeatureRegistry> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current registry, returning its generation
    pub fn publish(&self, mut registry: FeatureRegistry) -> u64 {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        registry.generation = slot.generation + 1;
        let generation = registry.generation;
        *slot = Arc::new(registry);
        tracing::info!("Published feature registry generation {}", generation);
        generation
    }
}

impl Default for RegistryHandle {
    fn default() -> Self {
        Self::new(FeatureRegistry::builtin())
    }
}
