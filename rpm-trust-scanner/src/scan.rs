// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors

//! One scanner run: read the inputs, classify once.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rpm_trust::config::ScannerConfig;
use rpm_trust::{
    ClassificationResult, Classifier, CloudFlavourMap, CloudPackageAllowList,
    Inventory,
};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Read the inventory from a file, or from stdin when `path` is `-`.
pub fn read_inventory(path: &Path) -> Result<Inventory> {
    if path == Path::new("-") {
        debug!("Reading inventory from stdin");
        return Inventory::from_reader(io::stdin().lock())
            .context("Failed to read inventory from stdin");
    }

    let file = File::open(path).with_context(|| {
        format!("Failed to open inventory {}", path.display())
    })?;
    Inventory::from_reader(BufReader::new(file)).with_context(|| {
        format!("Failed to read inventory {}", path.display())
    })
}

pub fn read_cloud_map(path: &Path) -> Result<CloudFlavourMap> {
    let file = File::open(path).with_context(|| {
        format!("Failed to open cloud package map {}", path.display())
    })?;
    CloudFlavourMap::from_reader(BufReader::new(file)).with_context(|| {
        format!("Failed to read cloud package map {}", path.display())
    })
}

/// Build the cloud allow list for the configured upgrade path.
///
/// Without an upgrade path or a cloud map no cloud package is allowed.
pub fn cloud_packages(
    config: &ScannerConfig,
) -> Result<CloudPackageAllowList> {
    let upgrade_path = config
        .resolve_upgrade_path()
        .context("Failed to determine the upgrade path")?;

    let (Some(upgrade_path), Some(map_path)) =
        (upgrade_path, config.cloud_map.as_deref())
    else {
        warn!(
            "Upgrade path or cloud package map not configured, \
             no cloud packages allowed"
        );
        return Ok(CloudPackageAllowList::default());
    };

    let map = read_cloud_map(Path::new(map_path))?;
    Ok(CloudPackageAllowList::for_upgrade_path(&map, &upgrade_path))
}

pub fn run(
    config: &ScannerConfig,
    inventory: Inventory,
) -> Result<ClassificationResult> {
    let cloud = cloud_packages(config)?;
    info!(
        "Classifying {} installed packages ({} cloud packages allowed)",
        inventory.len(),
        cloud.len()
    );

    let classifier = Classifier::new(config.all_signed, &cloud);
    let result = classifier.classify(inventory.into_packages());

    info!(
        "{} signed and {} unsigned packages",
        result.signed.len(),
        result.unsigned.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cloud_packages_unconfigured() {
        let config = ScannerConfig {
            upgrade_path: Some("8to9".into()),
            ..Default::default()
        };
        let cloud = cloud_packages(&config).unwrap(); //#[allow_ci]
        assert!(cloud.is_empty());
    }

    #[test]
    fn test_cloud_packages_from_versions() {
        let dir = tempfile::tempdir().unwrap(); //#[allow_ci]
        let map_path = dir.path().join("map.json");
        let mut file = File::create(&map_path).unwrap(); //#[allow_ci]
        write!(
            file,
            r#"{{"7to8": {{"alibaba": {{"src_pkg": "client-rhel7"}}}}}}"#
        )
        .unwrap(); //#[allow_ci]

        let config = ScannerConfig {
            source_version: Some("7.9".into()),
            target_version: Some("8.10".into()),
            cloud_map: Some(map_path.display().to_string()),
            ..Default::default()
        };
        let cloud = cloud_packages(&config).unwrap(); //#[allow_ci]
        assert!(cloud.contains("client-rhel7"));
    }

    #[test]
    fn test_cloud_map_missing_file() {
        let dir = tempfile::tempdir().unwrap(); //#[allow_ci]
        let config = ScannerConfig {
            upgrade_path: Some("8to9".into()),
            cloud_map: Some(dir.path().join("nope.json").display().to_string()),
            ..Default::default()
        };
        assert!(cloud_packages(&config).is_err());
    }

    #[test]
    fn test_invalid_version() {
        let config = ScannerConfig {
            source_version: Some("seven".into()),
            target_version: Some("8".into()),
            ..Default::default()
        };
        assert!(cloud_packages(&config).is_err());
    }
}
