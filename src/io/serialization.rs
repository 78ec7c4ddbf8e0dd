// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Area document serialization and deserialization.
//!
//! This module handles exporting and importing area documents in YAML
//! and JSON formats.

use crate::models::document::AreaDocument;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// On-disk encoding of an area document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            other => bail!("Unsupported file extension: {:?}", other),
        }
    }

    fn encode(self, data: &AreaDocument) -> Result<String> {
        Ok(match self {
            Format::Yaml => serde_yaml::to_string(data)?,
            Format::Json => serde_json::to_string_pretty(data)?,
        })
    }

    fn decode(self, text: &str) -> Result<AreaDocument> {
        Ok(match self {
            Format::Yaml => serde_yaml::from_str(text)?,
            Format::Json => serde_json::from_str(text)?,
        })
    }
}

/// Export an area document, in the format named by its extension.
pub fn export_document(data: &AreaDocument, path: &Path) -> Result<()> {
    let text = Format::from_path(path)?.encode(data)?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// Import an area document, in the format named by its extension.
pub fn import_document(path: &Path) -> Result<AreaDocument> {
    let format = Format::from_path(path)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    format
        .decode(&text)
        .with_context(|| format!("Invalid area document {}", path.display()))
}
