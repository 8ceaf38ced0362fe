use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::compare::ComparisonOptions;
use crate::registry::FeatureRegistry;

/// Contents of `schemabridge.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlannerConfig {
    /// TOML registry file overlaid on the built-in registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    /// Defaults for `compare`
    #[serde(default)]
    pub compare: ComparisonOptions,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("schemabridge.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<PlannerConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: PlannerConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &PlannerConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// The built-in registry, overlaid with the configured registry file.
///
/// A relative registry path is resolved against `base`, the directory
/// holding the config file.
pub fn load_registry(config: Option<&PlannerConfig>, base: &Path) -> anyhow::Result<FeatureRegistry> {
    let builtin = FeatureRegistry::builtin();
    let Some(file) = config.and_then(|c| c.registry.as_deref()) else {
        return Ok(builtin);
    };

    let path = base.join(file);
    let overrides = FeatureRegistry::load(&path)
        .map_err(|e| anyhow::anyhow!("failed to load registry {}: {}", path.display(), e))?;
    tracing::info!(
        "Overlaying {} technologies from {}",
        overrides.len(),
        path.display()
    );
    Ok(builtin.overlay(overrides))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::ComparisonMode;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded = load_config(Some(&dir.path().join("schemabridge.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schemabridge.toml");
        let config = PlannerConfig {
            registry: Some("registry.toml".into()),
            compare: ComparisonOptions::new(ComparisonMode::Guided)
                .exclude_name("tmp_*")
                .with_privacy_threshold(0.5),
        };
        write_config(&path, &config, false).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.registry.as_deref(), Some("registry.toml"));
        assert_eq!(loaded.compare, config.compare);
    }

    #[test]
    fn test_write_refuses_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schemabridge.toml");
        write_config(&path, &PlannerConfig::default(), false).unwrap();

        let err = write_config(&path, &PlannerConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        write_config(&path, &PlannerConfig::default(), true).unwrap();
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schemabridge.toml");
        std::fs::write(&path, "[compare]\nmode = \"enriched\"\n").unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert!(loaded.registry.is_none());
        assert_eq!(loaded.compare.mode, ComparisonMode::Enriched);
        assert_eq!(loaded.compare.privacy_threshold, 0.7);
    }

    #[test]
    fn test_registry_without_file_is_builtin() {
        let dir = TempDir::new().unwrap();
        let registry = load_registry(None, dir.path()).unwrap();
        assert_eq!(registry.len(), FeatureRegistry::builtin().len());
    }

    #[test]
    fn test_registry_overlay_from_file() {
        let dir = TempDir::new().unwrap();
        let overlay = FeatureRegistry::new([crate::registry::DatabaseFeatureSupport::builder(
            "duckdb",
            &[crate::Paradigm::Relational],
        )
        .full(&[crate::ObjectType::Table, crate::ObjectType::View])
        .build()]);
        std::fs::write(dir.path().join("extra.toml"), overlay.to_toml_string().unwrap()).unwrap();

        let config = PlannerConfig {
            registry: Some("extra.toml".into()),
            ..PlannerConfig::default()
        };
        let registry = load_registry(Some(&config), dir.path()).unwrap();
        assert!(registry.get("duckdb").is_some());
        assert!(registry.get("postgres").is_some());
    }

    #[test]
    fn test_registry_file_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let config = PlannerConfig {
            registry: Some("nope.toml".into()),
            ..PlannerConfig::default()
        };
        assert!(load_registry(Some(&config), dir.path()).is_err());
    }
}
