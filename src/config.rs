// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Console configuration.
//!
//! Settings are read from a YAML file: the path in `SIGROI_CONFIG` if set,
//! otherwise `sigroi.yaml` in the working directory when present. Missing
//! fields fall back to defaults.

use crate::capture::flow::{PersistFailurePolicy, VideoSources};
use crate::io::store::{AreaStore, FileAreaStore, HttpAreaStore};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SIGROI_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sigroi.yaml";

/// Where finished areas are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// The traffic backend's area endpoints.
    #[default]
    Http,
    /// A local YAML/JSON document.
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub backend_url: String,
    pub store: StoreKind,
    pub area_file: PathBuf,
    pub request_timeout_secs: u64,
    pub on_persist_failure: PersistFailurePolicy,
    pub video_sources: VideoSources,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8000".to_string(),
            store: StoreKind::Http,
            area_file: PathBuf::from("areas.yaml"),
            request_timeout_secs: 10,
            on_persist_failure: PersistFailurePolicy::Advance,
            video_sources: VideoSources::new(),
        }
    }
}

impl ConsoleConfig {
    /// Load the configuration from the usual locations.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_path(local);
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load the configuration from a YAML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&yaml)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build the configured area store.
    pub fn build_store(&self) -> Rc<dyn AreaStore> {
        match self.store {
            StoreKind::Http => Rc::new(HttpAreaStore::new(&self.backend_url, self.request_timeout())),
            StoreKind::File => Rc::new(FileAreaStore::new(self.area_file.clone())),
        }
    }
}
