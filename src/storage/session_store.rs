use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::storage_context;

/// File-based keyed JSON store for in-progress game snapshots
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Write a snapshot, replacing any previous one under the same key
    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let path = self.build_path(key);
        let temp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(data)
            .with_context(|| storage_context("serialize", key))?;
        fs::write(&temp_path, json).with_context(|| storage_context("write", key))?;
        fs::rename(&temp_path, &path).with_context(|| storage_context("replace", key))?;

        debug!("Saved snapshot {}", path.display());
        Ok(())
    }

    /// Read a snapshot, `Ok(None)` when nothing is stored under `key`
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.build_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).with_context(|| storage_context("read", key))?;
        let data = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse snapshot {}. First 200 chars: {}",
                path.display(),
                json.chars().take(200).collect::<String>()
            )
        })?;

        info!("Restored snapshot {}", path.display());
        Ok(Some(data))
    }

    /// Delete a snapshot; deleting a missing one is not an error
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.build_path(key);
        if path.exists() {
            fs::remove_file(&path).with_context(|| storage_context("remove", key))?;
            debug!("Removed snapshot {}", path.display());
        }
        Ok(())
    }

    fn build_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}
