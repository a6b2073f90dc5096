// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid inventory: {0}")]
    InventoryFormat(#[source] serde_json::Error),
    #[error("Invalid cloud package map: {0}")]
    CloudMapFormat(#[source] serde_json::Error),
    #[error("Cannot derive upgrade path from version '{0}'")]
    InvalidVersion(String),
}

pub type Result<T> = std::result::Result<T, Error>;
