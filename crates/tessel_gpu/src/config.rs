//! Geometry system configuration
//!
//! Values come from defaults, an optional TOML file and `TESSEL_*`
//! environment variables, in that order.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tessel_paint::MAX_BEZIER_SMOOTHNESS;

/// Tunables for [`GraphicsContextSystem`](crate::GraphicsContextSystem)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Smoothness given to contexts created by the system
    pub bezier_smoothness: f32,
    /// Distinct textures a single draw batch may bind
    pub max_batchable_textures: usize,
    /// Vertices the batcher reserves up front
    pub initial_vertex_capacity: usize,
    /// Indices the batcher reserves up front
    pub initial_index_capacity: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            bezier_smoothness: 0.5,
            max_batchable_textures: 16,
            initial_vertex_capacity: 4096,
            initial_index_capacity: 6144,
        }
    }
}

fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

fn parse_f32(value: &str) -> Option<f32> {
    value.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

impl SystemConfig {
    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SystemConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TESSEL_*` environment overrides; unparseable values are ignored
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("TESSEL_BEZIER_SMOOTHNESS").as_deref().and_then(parse_f32) {
            tracing::info!("config override: bezier_smoothness={}", v);
            self.bezier_smoothness = v;
        }
        if let Some(v) = lookup("TESSEL_MAX_BATCHABLE_TEXTURES")
            .as_deref()
            .and_then(parse_usize)
        {
            tracing::info!("config override: max_batchable_textures={}", v);
            self.max_batchable_textures = v;
        }
        if let Some(v) = lookup("TESSEL_INITIAL_VERTEX_CAPACITY")
            .as_deref()
            .and_then(parse_usize)
        {
            tracing::info!("config override: initial_vertex_capacity={}", v);
            self.initial_vertex_capacity = v;
        }
        if let Some(v) = lookup("TESSEL_INITIAL_INDEX_CAPACITY")
            .as_deref()
            .and_then(parse_usize)
        {
            tracing::info!("config override: initial_index_capacity={}", v);
            self.initial_index_capacity = v;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.bezier_smoothness) {
            return Err(ConfigError::InvalidValue {
                key: "bezier_smoothness",
                reason: format!("{} is not in [0, 1)", self.bezier_smoothness),
            });
        }
        if self.max_batchable_textures == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_batchable_textures",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Smoothness as contexts use it
    pub fn effective_smoothness(&self) -> f32 {
        self.bezier_smoothness.clamp(0.0, MAX_BEZIER_SMOOTHNESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SystemConfig::from_toml_str("max_batchable_textures = 8\n").unwrap();
        assert_eq!(config.max_batchable_textures, 8);
        assert_eq!(config.bezier_smoothness, 0.5);
        assert_eq!(config.initial_index_capacity, 6144);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = SystemConfig::from_toml_str("bezier_smoothness = 1.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "bezier_smoothness",
                ..
            }
        ));
        let err = SystemConfig::from_toml_str("max_batchable_textures = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        let err = SystemConfig::from_toml_str("bezier_smoothness = \"high\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_overrides_ignore_garbage() {
        let config = SystemConfig::default().with_overrides_from(|name| match name {
            "TESSEL_MAX_BATCHABLE_TEXTURES" => Some(" 4 ".to_string()),
            "TESSEL_BEZIER_SMOOTHNESS" => Some("smooth".to_string()),
            "TESSEL_INITIAL_VERTEX_CAPACITY" => Some("-3".to_string()),
            _ => None,
        });
        assert_eq!(config.max_batchable_textures, 4);
        assert_eq!(config.bezier_smoothness, 0.5);
        assert_eq!(config.initial_vertex_capacity, 4096);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SystemConfig::load("/nonexistent/tessel.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SystemConfig {
            max_batchable_textures: 2,
            ..SystemConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
