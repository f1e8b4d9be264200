// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Resolver configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::catalog::error::{CatalogError, CatalogResult};

/// How the autocast registry treats two functions with the same signature pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The function scanned later replaces the earlier one
    #[default]
    LastWins,
    /// Rebuilding fails on the first duplicate
    Reject,
}

/// Struct names used by hard-coded intrinsic conversions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellKnownTypes {
    pub rotator: String,
    pub transform: String,
}

impl Default for WellKnownTypes {
    fn default() -> Self {
        Self {
            rotator: "Rotator".to_string(),
            transform: "Transform".to_string(),
        }
    }
}

/// Configuration for the compatibility resolver and autocast registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Offer a runtime-checked cast when an object output is narrower than the input
    pub auto_cast_object_connections: bool,

    /// Duplicate conversion signature handling
    pub duplicate_autocast_policy: DuplicatePolicy,

    pub well_known_types: WellKnownTypes,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            auto_cast_object_connections: true,
            duplicate_autocast_policy: DuplicatePolicy::default(),
            well_known_types: WellKnownTypes::default(),
        }
    }
}

impl ResolverConfig {
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::IoError(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json_str(&contents)?;
        log::debug!("Loaded resolver config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert!(config.auto_cast_object_connections);
        assert_eq!(config.duplicate_autocast_policy, DuplicatePolicy::LastWins);
        assert_eq!(config.well_known_types.rotator, "Rotator");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ResolverConfig::from_json_str(r#"{"duplicate_autocast_policy":"reject"}"#).unwrap();
        assert_eq!(config.duplicate_autocast_policy, DuplicatePolicy::Reject);
        assert!(config.auto_cast_object_connections);
        assert_eq!(config.well_known_types, WellKnownTypes::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ResolverConfig::from_json_str("{not json"),
            Err(CatalogError::DeserializationError(_))
        ));
    }
}
