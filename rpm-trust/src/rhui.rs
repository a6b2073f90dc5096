// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors

//! Cloud (RHUI) integration packages.
//!
//! Cloud images ship provider-specific client packages to reach the update
//! infrastructure of that provider. Some providers build these packages
//! themselves, without a vendor signature, so they need to be allowed
//! explicitly. Which packages exist depends on the upgrade path, and is
//! described by a map resolved from the cloud metadata:
//!
//! ```json
//! {
//!   "8to9": {
//!     "azure": {
//!       "src_pkg": "rhui-azure-rhel8",
//!       "target_pkg": "rhui-azure-rhel9",
//!       "leapp_pkg": "leapp-rhui-azure"
//!     }
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use crate::package::PackageRecord;
use log::*;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::io::Read;

/// Cloud flavours whose integration packages are not vendor signed.
///
/// AWS is missing on purpose: its client packages are signed by the vendor
/// and need no allowance.
pub const ALLOWED_CLOUD_FLAVOURS: &[&str] = &[
    "azure",
    "azure-eus",
    "azure-sap-ha",
    "azure-sap-apps",
    "google",
    "google-sap",
    "alibaba",
];

/// Client packages of one cloud flavour on one upgrade path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudFlavourPackages {
    /// Package installed on the source system
    #[serde(default, alias = "source_package")]
    pub src_pkg: Option<String>,
    /// Package replacing it on the target system
    #[serde(default, alias = "target_package")]
    pub target_pkg: Option<String>,
    /// Package carrying the upgrade tooling for the flavour
    #[serde(default, alias = "leapp_package")]
    pub leapp_pkg: Option<String>,
}

impl CloudFlavourPackages {
    /// Iterate over the package names that are set.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        [&self.src_pkg, &self.target_pkg, &self.leapp_pkg]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
    }
}

/// Upgrade path -> cloud flavour -> client packages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CloudFlavourMap {
    paths: HashMap<String, HashMap<String, CloudFlavourPackages>>,
}

impl CloudFlavourMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        upgrade_path: impl Into<String>,
        flavour: impl Into<String>,
        packages: CloudFlavourPackages,
    ) -> &mut Self {
        let _ = self
            .paths
            .entry(upgrade_path.into())
            .or_default()
            .insert(flavour.into(), packages);
        self
    }

    /// Decode the map from JSON.
    ///
    /// Input that is not valid JSON is an error. Entries with an unexpected
    /// shape are dropped with a warning, so that one bad flavour does not
    /// take the rest of the map with it.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value =
            serde_json::from_reader(reader).map_err(Error::CloudMapFormat)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        let mut map = CloudFlavourMap::new();

        let Value::Object(paths) = value else {
            warn!("Cloud package map is not an object, ignoring it");
            return map;
        };

        for (path, flavours) in paths {
            let Value::Object(flavours) = flavours else {
                warn!("Ignoring malformed cloud package map entry for upgrade path {path}");
                continue;
            };
            for (flavour, packages) in flavours {
                match serde_json::from_value::<CloudFlavourPackages>(packages)
                {
                    Ok(packages) => {
                        let _ = map.insert(path.clone(), flavour, packages);
                    }
                    Err(e) => {
                        warn!("Ignoring malformed cloud package map entry {path}/{flavour}: {e}");
                    }
                }
            }
        }

        map
    }

    pub fn has_upgrade_path(&self, upgrade_path: &str) -> bool {
        self.paths.contains_key(upgrade_path)
    }

    /// Look up the packages of a flavour on an upgrade path.
    pub fn flavour(
        &self,
        upgrade_path: &str,
        flavour: &str,
    ) -> Option<&CloudFlavourPackages> {
        self.paths.get(upgrade_path)?.get(flavour)
    }
}

/// Names of the cloud client packages trusted on the active upgrade path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CloudPackageAllowList {
    packages: HashSet<String>,
}

impl CloudPackageAllowList {
    /// Collect the packages of every allowed flavour for `upgrade_path`.
    ///
    /// Unknown upgrade paths and flavours missing from the map contribute
    /// nothing.
    pub fn for_upgrade_path(map: &CloudFlavourMap, upgrade_path: &str) -> Self {
        if !map.has_upgrade_path(upgrade_path) {
            warn!("No cloud packages known for upgrade path {upgrade_path}");
            return Self::default();
        }

        let mut packages = HashSet::new();
        for flavour in ALLOWED_CLOUD_FLAVOURS {
            match map.flavour(upgrade_path, flavour) {
                Some(entry) => {
                    packages.extend(entry.names().map(String::from));
                }
                None => {
                    debug!("No {flavour} cloud packages for upgrade path {upgrade_path}");
                }
            }
        }

        debug!(
            "Allowing {} cloud packages for upgrade path {upgrade_path}",
            packages.len()
        );
        CloudPackageAllowList { packages }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains(name)
    }

    pub fn is_cloud_allowed(&self, pkg: &PackageRecord) -> bool {
        self.contains(&pkg.name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CloudPackageAllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        CloudPackageAllowList {
            packages: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn major_version(version: &str) -> Result<u32> {
    version
        .trim()
        .split('.')
        .next()
        .and_then(|major| major.parse().ok())
        .ok_or_else(|| Error::InvalidVersion(version.to_string()))
}

/// Build the upgrade path identifier from the source and target OS
/// versions, e.g. `8.10` and `9.4` give `8to9`.
pub fn upgrade_path_from_versions(
    source: &str,
    target: &str,
) -> Result<String> {
    Ok(format!(
        "{}to{}",
        major_version(source)?,
        major_version(target)?
    ))
}
