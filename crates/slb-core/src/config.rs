//! Run configuration
//!
//! ```toml
//! enabled_services = ["AudioSrv", "RpcSs"]
//! individual_disabled_services = ["WSearch"]
//! rename_binaries = ['\Windows\System32\mobsync.exe']
//!
//! [engine]
//! user_mode_types = [16, 32, 80, 96, 272, 288]
//! expected_publisher = "Microsoft Corporation"
//! system_drive = "C:"
//! path_aliases = [{ prefix = '\systemroot\', replacement = 'c:\windows\' }]
//!
//! [engine.environment]
//! SystemRoot = 'C:\Windows'
//! ```
//!
//! Every key is optional.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use slb_catalog::{ServiceTypeTable, DEFAULT_USER_MODE_TYPES};
use slb_plan::{RenameTarget, DEFAULT_SYSTEM_DRIVE};
use slb_vendor::{
    default_aliases, default_environment, ImagePathResolver, PathAlias, DEFAULT_EXPECTED_PUBLISHER,
};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Operator's lists plus engine settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Allow-list; empty means only explicit disables apply
    pub enabled_services: Vec<String>,

    /// Services to disable regardless of the allow-list
    pub individual_disabled_services: Vec<String>,

    /// Drive-relative binaries to hide by renaming
    pub rename_binaries: Vec<String>,

    /// Engine settings
    pub engine: EngineConfig,
}

impl RunConfig {
    /// Load and validate a config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        raw.parse()
    }

    /// Check engine values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.drive_letter()?;

        if self.engine.user_mode_types.is_empty() {
            return Err(ConfigError::invalid("engine.user_mode_types must not be empty"));
        }

        Ok(())
    }

    /// Rename targets in config order, skipping blank and repeated entries
    #[must_use]
    pub fn rename_targets(&self) -> Vec<RenameTarget> {
        let mut seen = HashSet::new();
        self.rename_binaries
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty() && seen.insert(b.to_lowercase()))
            .map(RenameTarget::from)
            .collect()
    }
}

impl std::str::FromStr for RunConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

/// Values that used to be hard-coded in the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Raw `Type` codes classified as user-mode
    pub user_mode_types: Vec<u32>,

    /// Publisher of first-party binaries
    pub expected_publisher: String,

    /// Drive the target installation lives on, e.g. `C:`
    pub system_drive: String,

    /// Image path prefix rewrites, applied in order
    pub path_aliases: Vec<PathAlias>,

    /// Variables for `%VAR%` expansion in image paths
    pub environment: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_mode_types: DEFAULT_USER_MODE_TYPES.to_vec(),
            expected_publisher: DEFAULT_EXPECTED_PUBLISHER.to_string(),
            system_drive: DEFAULT_SYSTEM_DRIVE.to_string(),
            path_aliases: default_aliases(),
            environment: default_environment(),
        }
    }
}

impl EngineConfig {
    /// Type table for catalog loading
    #[must_use]
    pub fn type_table(&self) -> ServiceTypeTable {
        ServiceTypeTable::new(self.user_mode_types.iter().copied())
    }

    /// Image path resolver for vendor classification
    #[must_use]
    pub fn path_resolver(&self) -> ImagePathResolver {
        ImagePathResolver::new(self.path_aliases.clone(), self.environment.clone())
    }

    /// Drive letter of `system_drive`
    pub fn drive_letter(&self) -> Result<char, ConfigError> {
        let mut chars = self.system_drive.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(letter), Some(':'), None) if letter.is_ascii_alphabetic() => {
                Ok(letter.to_ascii_uppercase())
            }
            _ => Err(ConfigError::invalid(format!(
                "engine.system_drive must look like \"C:\", got {:?}",
                self.system_drive
            ))),
        }
    }
}
