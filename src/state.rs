//! Persisted state
//!
//! Each managed resource is stored as its remote identifier plus a flat
//! attribute table, grouped by kind and keyed by manifest address.

use crate::resource::{Attributes, Managed};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResource {
    pub id: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl StoredResource {
    pub fn from_record<R: Managed>(record: &R) -> Self {
        Self {
            id: record.id().to_string(),
            attributes: record.to_attributes(),
        }
    }

    pub fn to_record<R: Managed>(&self) -> crate::Result<R> {
        R::from_attributes(&self.id, &self.attributes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub addons: BTreeMap<String, StoredResource>,
    #[serde(default)]
    pub drains: BTreeMap<String, StoredResource>,
}

impl State {
    /// Load state from disk; a missing file is an empty state
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Corrupt state file {:?}", path))
    }

    /// Write state to disk, replacing the previous file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content).with_context(|| format!("Failed to write {:?}", tmp))?;
        std::fs::rename(&tmp, path).with_context(|| format!("Failed to replace {:?}", path))?;

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.addons.is_empty() && self.drains.is_empty()
    }
}
