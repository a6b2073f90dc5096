// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors

//! Known vendor GPG key IDs.
//!
//! rpm reports the signature of an installed package as a descriptor like
//! `RSA/SHA256, Tue 14 Jun 2022 09:12:49 AM UTC, Key ID 199e2f91fd431d51`, so
//! a package is considered vendor signed when any of the key IDs below
//! appears in that text. No cryptographic verification is performed here.

use serde_derive::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    Rhel,
    Centos,
    AlmaLinux,
    RockyLinux,
    Ol,
    EuroLinux,
    Scientific,
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self {
            Distribution::Rhel => "rhel",
            Distribution::Centos => "centos",
            Distribution::AlmaLinux => "almalinux",
            Distribution::RockyLinux => "rockylinux",
            Distribution::Ol => "ol",
            Distribution::EuroLinux => "eurolinux",
            Distribution::Scientific => "scientific",
        };
        write!(f, "{value}")
    }
}

/// The signing keys of one distribution family.
#[derive(Debug)]
pub struct KeyFamily {
    pub distribution: Distribution,
    pub key_ids: &'static [&'static str],
}

#[derive(Debug)]
pub struct TrustedKeyRegistry {
    families: &'static [KeyFamily],
}

pub static TRUSTED_KEYS: TrustedKeyRegistry = TrustedKeyRegistry {
    families: &[
        KeyFamily {
            distribution: Distribution::Rhel,
            key_ids: &[
                "199e2f91fd431d51",
                "5326810137017186",
                "938a80caf21541eb",
                "fd372689897da07a",
                "45689c882fa658e0",
            ],
        },
        KeyFamily {
            distribution: Distribution::Centos,
            key_ids: &[
                "24c6a8a7f4a80eb5",
                "05b555b38483c65d",
                "4eb84e71f2ee9d55",
                "a963bbdbf533f4fa",
                "6c7cb6ef305d49d6",
            ],
        },
        KeyFamily {
            distribution: Distribution::AlmaLinux,
            key_ids: &[
                "51d6647ec21ad6ea",
                "d36cb86cb86b3716",
                "2ae81e8aced7258b",
            ],
        },
        KeyFamily {
            distribution: Distribution::RockyLinux,
            key_ids: &["15af5dac6d745a60", "702d426d350d275d"],
        },
        KeyFamily {
            distribution: Distribution::Ol,
            key_ids: &[
                "72f97b74ec551f03",
                "82562ea9ad986da3",
                "bc4d06a08d8b756f",
            ],
        },
        KeyFamily {
            distribution: Distribution::EuroLinux,
            key_ids: &["75c333f418cd4a9e", "b413acad6275f250"],
        },
        KeyFamily {
            distribution: Distribution::Scientific,
            key_ids: &["f7ad3e5a1c9fd080", "b0b4183f192a7d7d"],
        },
    ],
};

impl TrustedKeyRegistry {
    pub fn families(&self) -> impl Iterator<Item = &KeyFamily> {
        self.families.iter()
    }

    pub fn key_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.families.iter().flat_map(|f| f.key_ids.iter().copied())
    }

    /// Returns true if the signature descriptor embeds any trusted key ID.
    ///
    /// Empty or malformed descriptors simply do not match.
    pub fn matches(&self, signature: &str) -> bool {
        self.matching_family(signature).is_some()
    }

    /// Returns the distribution whose key ID appears in the descriptor, if
    /// any.
    pub fn matching_family(&self, signature: &str) -> Option<Distribution> {
        if signature.is_empty() {
            return None;
        }
        self.families
            .iter()
            .find(|f| f.key_ids.iter().any(|k| signature.contains(k)))
            .map(|f| f.distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_is_well_formed() {
        let ids: Vec<&str> = TRUSTED_KEYS.key_ids().collect();
        assert_eq!(ids.len(), 22);

        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len(), "duplicated key ID");

        for id in ids {
            let raw = hex::decode(id).expect("key ID is not hex");
            assert_eq!(raw.len(), 8, "key ID {id} is not 64 bits long");
        }

        assert_eq!(TRUSTED_KEYS.families().count(), 7);
    }

    #[test]
    fn test_matches_embedded_key_id() {
        assert!(TRUSTED_KEYS.matches(
            "RSA/SHA256, Tue 14 Jun 2022 09:12:49 AM UTC, Key ID 199e2f91fd431d51"
        ));
        assert!(TRUSTED_KEYS.matches("Key ID 15af5dac6d745a60"));
        assert!(TRUSTED_KEYS.matches("b0b4183f192a7d7d"));
    }

    #[test]
    fn test_no_match() {
        assert!(!TRUSTED_KEYS.matches(""));
        assert!(!TRUSTED_KEYS.matches("(none)"));
        assert!(!TRUSTED_KEYS.matches(
            "RSA/SHA256, Tue 14 Jun 2022 09:12:49 AM UTC, Key ID 0123456789abcdef"
        ));
        // A truncated key ID is not enough
        assert!(!TRUSTED_KEYS.matches("Key ID 199e2f91fd431d5"));
    }

    #[test]
    fn test_matching_family() {
        assert_eq!(
            TRUSTED_KEYS.matching_family("Key ID 05b555b38483c65d"),
            Some(Distribution::Centos)
        );
        assert_eq!(
            TRUSTED_KEYS.matching_family("Key ID 82562ea9ad986da3"),
            Some(Distribution::Ol)
        );
        assert_eq!(TRUSTED_KEYS.matching_family("unsigned"), None);
    }

    #[test]
    fn test_distribution_display() {
        assert_eq!(Distribution::AlmaLinux.to_string(), "almalinux");
        assert_eq!(Distribution::RockyLinux.to_string(), "rockylinux");
        assert_eq!(
            serde_json::to_string(&Distribution::EuroLinux).unwrap(), //#[allow_ci]
            "\"eurolinux\""
        );
    }
}
