// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors

//! Recognition of the root-of-trust `gpg-pubkey` records.
//!
//! Imported vendor keys show up in the rpm database as `gpg-pubkey`
//! packages. They cannot carry a signature made with the key they install,
//! so they are recognized from their packager metadata instead.

use crate::package::PackageRecord;

pub const BOOTSTRAP_KEY_PACKAGE: &str = "gpg-pubkey";

/// Packager prefixes of the vendors whose keys are trusted.
pub const BOOTSTRAP_KEY_PACKAGERS: &[&str] = &[
    "Red Hat, Inc.",
    "CentOS",
    "AlmaLinux",
    "infrastructure@rockylinux.org",
    "EuroLinux",
    "Scientific Linux",
];

/// Returns true if `pkg` is a trusted `gpg-pubkey` record.
///
/// With `all_signed` set, every `gpg-pubkey` record is trusted regardless of
/// its packager. The flag has no effect on packages with any other name.
pub fn is_bootstrap_key(pkg: &PackageRecord, all_signed: bool) -> bool {
    pkg.name == BOOTSTRAP_KEY_PACKAGE
        && (all_signed
            || BOOTSTRAP_KEY_PACKAGERS
                .iter()
                .any(|vendor| pkg.packager.starts_with(vendor)))
}
