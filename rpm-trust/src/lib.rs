// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors

//! Trust classification of installed RPM packages.
//!
//! Before an OS major version upgrade, the installed packages are split in
//! two groups: packages signed by a known vendor, which the upgrade can
//! handle, and everything else, which needs a closer look. See
//! [`classifier`] for the rules.

pub mod bootstrap;
pub mod classifier;
pub mod config;
pub mod error;
pub mod keys;
pub mod package;
pub mod prefix;
pub mod rhui;

pub use classifier::{classify, ClassificationResult, Classifier, TrustReason};
pub use error::{Error, Result};
pub use keys::{TrustedKeyRegistry, TRUSTED_KEYS};
pub use package::{InstalledPackages, Inventory, PackageRecord};
pub use rhui::{CloudFlavourMap, CloudFlavourPackages, CloudPackageAllowList};
