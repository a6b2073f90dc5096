// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors
use crate::package::PackageRecord;

/// Name prefixes of vendor-integration packages that are never signed but
/// are trusted anyway. The Satellite consumer CA package is generated per
/// organization, e.g. `katello-ca-consumer-satellite.example.com`.
pub const ALLOWED_NAME_PREFIXES: &[&str] = &["katello-ca-consumer"];

pub fn has_allowed_prefix(pkg: &PackageRecord) -> bool {
    ALLOWED_NAME_PREFIXES
        .iter()
        .any(|prefix| pkg.name.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_allowed_prefix() {
        let pkg = PackageRecord::new("katello-ca-consumer-myorg", "", "");
        assert!(has_allowed_prefix(&pkg));

        let pkg = PackageRecord::new("katello-ca-consumer", "junk", "Me");
        assert!(has_allowed_prefix(&pkg));

        let pkg = PackageRecord::new("my-katello-ca-consumer", "", "");
        assert!(!has_allowed_prefix(&pkg));

        let pkg = PackageRecord::new("katello-agent", "", "");
        assert!(!has_allowed_prefix(&pkg));
    }
}
