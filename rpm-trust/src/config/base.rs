// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors

//! Scanner configuration
//!
//! Options are read from the `[scanner]` table. Sources are applied in
//! order, later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. Configuration files (TOML)
//! 3. Environment variables `RPM_TRUST_SCANNER__<OPTION>`
//! 4. The `LEAPP_DEVEL_RPMS_ALL_SIGNED` development override
//! 5. Command line overrides
//!
//! ```toml
//! [scanner]
//! source_version = "8.10"
//! target_version = "9.4"
//! cloud_map = "/etc/rpm-trust/rhui_cloud_map.json"
//! ```

use crate::error;
use crate::rhui::upgrade_path_from_versions;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use super::{ScannerConfigBuilder, ScannerConfigError};

pub static DEFAULT_CONFIG: &str = "/etc/rpm-trust/scanner.conf";
pub static DEFAULT_CONFIG_SNIPPETS_DIR: &str = "/etc/rpm-trust/scanner.conf.d";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Upgrade path identifier, e.g. `8to9`. Derived from the versions when
    /// not set.
    #[serde(default)]
    pub upgrade_path: Option<String>,
    #[serde(default)]
    pub source_version: Option<String>,
    #[serde(default)]
    pub target_version: Option<String>,
    /// Path of the JSON cloud package map
    #[serde(default)]
    pub cloud_map: Option<String>,
    /// Trust every `gpg-pubkey` record, whatever its packager
    #[serde(default)]
    pub all_signed: bool,
}

/// Values given on the command line. Set fields replace the configured ones.
#[derive(Clone, Debug, Default)]
pub struct ScannerOverrides {
    pub upgrade_path: Option<String>,
    pub source_version: Option<String>,
    pub target_version: Option<String>,
    pub cloud_map: Option<String>,
}

impl ScannerConfig {
    /// Load the configuration from the default locations, or only from
    /// `config_path` when given, then apply the environment.
    ///
    /// An explicit `config_path` is preferred over 'RPM_TRUST_CONFIG'.
    pub fn load(
        config_path: Option<&Path>,
    ) -> Result<ScannerConfig, ScannerConfigError> {
        let mut builder = ScannerConfigBuilder::new();
        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ScannerConfigError::MissingConfigFile {
                        file: path.display().to_string(),
                    });
                }
                let _ = builder.explicit_file(path);
            }
            None => {
                let _ = builder.load_default_locations();
            }
        }
        builder.build()
    }

    pub fn with_overrides(mut self, overrides: &ScannerOverrides) -> Self {
        if let Some(ref upgrade_path) = overrides.upgrade_path {
            self.upgrade_path = Some(upgrade_path.clone());
        }
        if let Some(ref version) = overrides.source_version {
            self.source_version = Some(version.clone());
        }
        if let Some(ref version) = overrides.target_version {
            self.target_version = Some(version.clone());
        }
        if let Some(ref cloud_map) = overrides.cloud_map {
            self.cloud_map = Some(cloud_map.clone());
        }
        self
    }

    /// The upgrade path to use for cloud packages.
    ///
    /// An explicit `upgrade_path` wins. Otherwise it is derived from the
    /// source and target versions, when both are known.
    pub fn resolve_upgrade_path(&self) -> error::Result<Option<String>> {
        if let Some(path) =
            self.upgrade_path.as_deref().filter(|p| !p.is_empty())
        {
            return Ok(Some(path.to_string()));
        }

        match (self.source_version.as_deref(), self.target_version.as_deref())
        {
            (Some(source), Some(target)) => {
                upgrade_path_from_versions(source, target).map(Some)
            }
            _ => Ok(None),
        }
    }
}
