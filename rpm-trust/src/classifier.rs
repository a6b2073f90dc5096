// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors

//! Split the installed packages into vendor signed and unsigned ones.
//!
//! A package is signed when any of these rules holds:
//!
//! * its signature descriptor carries a trusted vendor key ID
//! * it is the `gpg-pubkey` record of a trusted vendor
//! * its name starts with an allowed vendor-integration prefix
//! * it is an allowed cloud client package for the upgrade path
//!
//! The rules are independent; the order in which they are checked never
//! changes the result.

use crate::bootstrap::is_bootstrap_key;
use crate::keys::{TrustedKeyRegistry, TRUSTED_KEYS};
use crate::package::PackageRecord;
use crate::prefix::has_allowed_prefix;
use crate::rhui::CloudPackageAllowList;
use log::*;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// The rule that made a package trusted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrustReason {
    Signature,
    BootstrapKey,
    NamePrefix,
    CloudPackage,
}

impl fmt::Display for TrustReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self {
            TrustReason::Signature => "vendor signature",
            TrustReason::BootstrapKey => "vendor gpg-pubkey",
            TrustReason::NamePrefix => "allowed name prefix",
            TrustReason::CloudPackage => "allowed cloud package",
        };
        write!(f, "{value}")
    }
}

/// Both sides of the partition, each in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub signed: Vec<PackageRecord>,
    pub unsigned: Vec<PackageRecord>,
}

impl ClassificationResult {
    pub fn len(&self) -> usize {
        self.signed.len() + self.unsigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signed.is_empty() && self.unsigned.is_empty()
    }
}

/// Trust decision with every input resolved up front.
#[derive(Debug)]
pub struct Classifier<'a> {
    keys: &'a TrustedKeyRegistry,
    all_signed: bool,
    cloud_packages: &'a CloudPackageAllowList,
}

impl<'a> Classifier<'a> {
    /// Classifier using the built-in vendor keys.
    pub fn new(
        all_signed: bool,
        cloud_packages: &'a CloudPackageAllowList,
    ) -> Self {
        Self::with_keys(&TRUSTED_KEYS, all_signed, cloud_packages)
    }

    pub fn with_keys(
        keys: &'a TrustedKeyRegistry,
        all_signed: bool,
        cloud_packages: &'a CloudPackageAllowList,
    ) -> Self {
        Classifier {
            keys,
            all_signed,
            cloud_packages,
        }
    }

    /// The first rule, in the order listed in the module documentation,
    /// that trusts `pkg`.
    pub fn trust_reason(&self, pkg: &PackageRecord) -> Option<TrustReason> {
        if self.keys.matches(&pkg.signature) {
            Some(TrustReason::Signature)
        } else if is_bootstrap_key(pkg, self.all_signed) {
            Some(TrustReason::BootstrapKey)
        } else if has_allowed_prefix(pkg) {
            Some(TrustReason::NamePrefix)
        } else if self.cloud_packages.is_cloud_allowed(pkg) {
            Some(TrustReason::CloudPackage)
        } else {
            None
        }
    }

    pub fn is_trusted(&self, pkg: &PackageRecord) -> bool {
        self.trust_reason(pkg).is_some()
    }

    /// Partition `packages` in a single pass.
    pub fn classify<I>(&self, packages: I) -> ClassificationResult
    where
        I: IntoIterator<Item = PackageRecord>,
    {
        let mut result = ClassificationResult::default();

        for pkg in packages {
            match self.trust_reason(&pkg) {
                Some(reason) => {
                    let family = match reason {
                        TrustReason::Signature if log_enabled!(Level::Trace) => {
                            self.keys.matching_family(&pkg.signature)
                        }
                        _ => None,
                    };
                    match family {
                        Some(family) => trace!(
                            "{} is signed: {reason} ({family} key)",
                            pkg.name
                        ),
                        None => trace!("{} is signed: {reason}", pkg.name),
                    }
                    result.signed.push(pkg);
                }
                None => {
                    trace!("{} is unsigned", pkg.name);
                    result.unsigned.push(pkg);
                }
            }
        }

        debug!(
            "Classified {} packages: {} signed, {} unsigned",
            result.len(),
            result.signed.len(),
            result.unsigned.len()
        );
        result
    }
}

/// Partition `packages` into signed and unsigned ones.
pub fn classify<I>(
    packages: I,
    keys: &TrustedKeyRegistry,
    all_signed: bool,
    cloud_packages: &CloudPackageAllowList,
) -> ClassificationResult
where
    I: IntoIterator<Item = PackageRecord>,
{
    Classifier::with_keys(keys, all_signed, cloud_packages).classify(packages)
}
