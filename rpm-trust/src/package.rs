// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors

//! Installed package records, as produced by the inventory collector.

use crate::error::{Error, Result};
use serde::de::Error as _;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;

/// A single installed RPM package.
///
/// Only `name`, `signature` and `packager` take part in the trust decision.
/// The remaining fields are carried through untouched so that the output can
/// be handed to downstream consumers without losing information.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    /// Signature descriptor as reported by rpm, e.g.
    /// `RSA/SHA256, Mon 01 Jan 2024 00:00:00 AM UTC, Key ID 199e2f91fd431d51`
    #[serde(rename = "pgpsig", alias = "signature", default)]
    pub signature: String,
    #[serde(default)]
    pub packager: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
}

impl PackageRecord {
    pub fn new(
        name: impl Into<String>,
        signature: impl Into<String>,
        packager: impl Into<String>,
    ) -> Self {
        PackageRecord {
            name: name.into(),
            signature: signature.into(),
            packager: packager.into(),
            ..Default::default()
        }
    }
}

/// One inventory message: a batch of installed packages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackages {
    #[serde(default)]
    pub items: Vec<PackageRecord>,
}

/// The full installed-package inventory for a run.
///
/// The collector may split the inventory over several messages. Packages are
/// kept in message order, then in item order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    messages: Vec<InstalledPackages>,
}

impl Inventory {
    /// Decode an inventory from JSON.
    ///
    /// Accepts either a single `{"items": [...]}` message or an array of
    /// such messages.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let document: Value =
            serde_json::from_reader(reader).map_err(Error::InventoryFormat)?;
        let messages = match document {
            Value::Array(messages) => messages
                .into_iter()
                .map(decode_message)
                .collect::<Result<Vec<_>>>()?,
            message => vec![decode_message(message)?],
        };
        Ok(Inventory { messages })
    }

    pub fn len(&self) -> usize {
        self.messages.iter().map(|m| m.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageRecord> {
        self.messages.iter().flat_map(|m| m.items.iter())
    }

    pub fn into_packages(self) -> impl Iterator<Item = PackageRecord> {
        self.messages.into_iter().flat_map(|m| m.items.into_iter())
    }
}

// Messages must be JSON objects. Serde would also accept a struct written
// as a sequence, so that is rejected before decoding.
fn decode_message(value: Value) -> Result<InstalledPackages> {
    if !value.is_object() {
        return Err(Error::InventoryFormat(serde_json::Error::custom(
            "inventory message is not an object",
        )));
    }
    serde_json::from_value(value).map_err(Error::InventoryFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_message() {
        let json = r#"{"items": [
            {"name": "bash", "pgpsig": "RSA/SHA256, Key ID 199e2f91fd431d51",
             "packager": "Red Hat, Inc.", "version": "5.1.8", "arch": "x86_64"},
            {"name": "custom-tool"}
        ]}"#;

        let inventory = Inventory::from_reader(json.as_bytes())
            .expect("failed to decode inventory");
        assert_eq!(inventory.len(), 2);

        let packages: Vec<&PackageRecord> = inventory.packages().collect();
        assert_eq!(packages[0].name, "bash");
        assert_eq!(
            packages[0].signature,
            "RSA/SHA256, Key ID 199e2f91fd431d51"
        );
        assert_eq!(packages[0].version.as_deref(), Some("5.1.8"));
        assert_eq!(packages[1].name, "custom-tool");
        assert!(packages[1].signature.is_empty());
        assert!(packages[1].packager.is_empty());
    }

    #[test]
    fn test_decode_many_messages_keeps_order() {
        let json = r#"[
            {"items": [{"name": "a"}, {"name": "b"}]},
            {"items": []},
            {"items": [{"name": "c"}]}
        ]"#;

        let inventory = Inventory::from_reader(json.as_bytes())
            .expect("failed to decode inventory");
        let names: Vec<String> =
            inventory.into_packages().map(|p| p.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_signature_alias() {
        let json = r#"{"items": [{"name": "a", "signature": "sig"}]}"#;
        let inventory = Inventory::from_reader(json.as_bytes()).unwrap(); //#[allow_ci]
        assert_eq!(inventory.packages().next().unwrap().signature, "sig"); //#[allow_ci]
    }

    #[test]
    fn test_decode_invalid() {
        let r = Inventory::from_reader("{\"items\": 3}".as_bytes());
        assert!(matches!(r, Err(Error::InventoryFormat(_))));

        let r = Inventory::from_reader("not json".as_bytes());
        assert!(r.is_err());
    }

    #[test]
    fn test_decode_rejects_non_object_messages() {
        let documents =
            [r#"[[{"name": "a"}]]"#, r#"[{"items": []}, 3]"#, r#""a""#];
        for json in documents {
            let r = Inventory::from_reader(json.as_bytes());
            assert!(
                matches!(r, Err(Error::InventoryFormat(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_serialize_skips_missing_fields() {
        let pkg = PackageRecord::new("gpg-pubkey", "", "CentOS");
        let value = serde_json::to_value(&pkg).unwrap(); //#[allow_ci]
        assert_eq!(
            value,
            serde_json::json!({
                "name": "gpg-pubkey",
                "pgpsig": "",
                "packager": "CentOS"
            })
        );
    }
}
