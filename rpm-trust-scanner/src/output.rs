// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors

//! Output formatting: results go to stdout, everything else to stderr.

use rpm_trust::{ClassificationResult, PackageRecord};
use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// JSON document with the `signed` and `unsigned` lists
    Json,
    /// Human-readable summary of the unsigned packages
    Table,
}

#[derive(Debug)]
pub struct OutputHandler {
    format: Format,
    pretty: bool,
}

impl OutputHandler {
    pub fn new(format: Format, pretty: bool) -> Self {
        Self { format, pretty }
    }

    pub fn render(
        &self,
        result: &ClassificationResult,
    ) -> serde_json::Result<String> {
        match self.format {
            Format::Json if self.pretty => serde_json::to_string_pretty(result),
            Format::Json => serde_json::to_string(result),
            Format::Table => Ok(format_table(result)),
        }
    }

    pub fn success(
        &self,
        result: &ClassificationResult,
    ) -> serde_json::Result<()> {
        println!("{}", self.render(result)?);
        Ok(())
    }
}

fn nevra(pkg: &PackageRecord) -> String {
    let mut s = pkg.name.clone();
    if let (Some(version), Some(release)) = (&pkg.version, &pkg.release) {
        let _ = write!(s, "-{version}-{release}");
    }
    if let Some(arch) = &pkg.arch {
        let _ = write!(s, ".{arch}");
    }
    s
}

fn format_table(result: &ClassificationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Signed packages:   {}", result.signed.len());
    let _ = writeln!(out, "Unsigned packages: {}", result.unsigned.len());
    for pkg in &result.unsigned {
        let packager = if pkg.packager.is_empty() {
            "unknown packager"
        } else {
            pkg.packager.as_str()
        };
        let _ = writeln!(out, "  {} ({packager})", nevra(pkg));
    }
    out.trim_end().to_string()
}
