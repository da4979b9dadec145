//! Unified configuration for a comparison run.
//!
//! Loads from a single YAML file with sensible defaults; every field may be
//! omitted.
//!
//! ## Example YAML
//!
//! ```yaml
//! octree:
//!   max_depth: 9
//!
//! matching:
//!   min_normal_dot: 0.86   # axes within ~30 degrees
//!   max_radius_ratio: 2.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::matching::MatchingConfig;
use crate::octree::DEFAULT_MAX_DEPTH;

/// Config load error
#[derive(Debug, Clone)]
pub enum ConfigLoadError {
    /// I/O error
    Io(String),
    /// Parse error
    Parse(String),
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadError::Io(msg) => write!(f, "IO error: {}", msg),
            ConfigLoadError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigLoadError {}

/// Octree settings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeSection {
    /// Maximum subdivision depth below the root.
    pub max_depth: u8,
}

impl Default for OctreeSection {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Full configuration loaded from YAML.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TulanaConfig {
    /// Octree settings
    #[serde(default)]
    pub octree: OctreeSection,

    /// Correspondence matching thresholds
    #[serde(default)]
    pub matching: MatchingConfig,
}

impl TulanaConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from the default config path (configs/tulana.yaml), falling
    /// back to built-in defaults when the file does not exist.
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/tulana.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TulanaConfig::default();
        assert_eq!(config.octree.max_depth, DEFAULT_MAX_DEPTH);
        assert!((config.matching.min_normal_dot - 0.86).abs() < 1e-6);
        assert!((config.matching.max_radius_ratio - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = TulanaConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = TulanaConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.octree.max_depth, config.octree.max_depth);
    }

    #[test]
    fn test_partial_yaml() {
        let config = TulanaConfig::from_yaml("matching:\n  max_radius_ratio: 3.0\n").unwrap();
        assert!((config.matching.max_radius_ratio - 3.0).abs() < 1e-6);
        // Unspecified sections keep their defaults.
        assert_eq!(config.octree.max_depth, DEFAULT_MAX_DEPTH);
        assert!((config.matching.min_normal_dot - 0.86).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let result = TulanaConfig::from_yaml("octree: [not a map]");
        assert!(matches!(result, Err(ConfigLoadError::Parse(_))));
    }
}
