// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors
use config::{ConfigError, Environment, Map, Source, Value};
use log::*;
use std::env;

pub static ENV_PREFIX: &str = "RPM_TRUST";

/// When set to `1`, every `gpg-pubkey` record is trusted.
pub static ALL_SIGNED_ENV_VAR: &str = "LEAPP_DEVEL_RPMS_ALL_SIGNED";

/// Environment source for the options, e.g.
/// `RPM_TRUST_SCANNER__UPGRADE_PATH=8to9`
pub fn scanner_environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Source translating the development override variable into the
/// `scanner.all_signed` option.
#[derive(Clone, Debug, Default)]
pub struct DevelEnvConfig {
    all_signed: Option<bool>,
}

impl DevelEnvConfig {
    pub fn new() -> Self {
        Self::from_value(env::var(ALL_SIGNED_ENV_VAR).ok().as_deref())
    }

    /// Only the exact value `1` enables the override. Any other value
    /// disables it; an unset variable leaves the option alone.
    pub fn from_value(value: Option<&str>) -> Self {
        let all_signed = value.map(|v| v == "1");
        if all_signed == Some(true) {
            warn!("{ALL_SIGNED_ENV_VAR}=1: all gpg-pubkey packages are considered signed");
        }
        DevelEnvConfig { all_signed }
    }

    pub fn all_signed(&self) -> Option<bool> {
        self.all_signed
    }
}

impl Source for DevelEnvConfig {
    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let mut map = Map::new();
        if let Some(all_signed) = self.all_signed {
            debug!("Environment configuration scanner.all_signed={all_signed}");
            let _ = map
                .insert("scanner.all_signed".to_string(), Value::from(all_signed));
        }
        Ok(map)
    }

    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }
}
