//! # State File
//!
//! JSON persistence of a single resource's state for the `smenctl` driver.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use uuid::Uuid;

use crate::constants::STATE_FILE_VERSION;

/// On-disk record of one managed resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    /// Identifies one line of state history; survives across writes
    pub lineage: Uuid,
    /// Incremented on every write
    pub serial: u64,
    pub resource_type: String,
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    pub updated_at: DateTime<Utc>,
}

impl StateFile {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            version: STATE_FILE_VERSION,
            lineage: Uuid::new_v4(),
            serial: 0,
            resource_type: resource_type.into(),
            id: String::new(),
            attributes: Map::new(),
            updated_at: Utc::now(),
        }
    }

    /// Load state, returning `None` when the file does not exist
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or was written
    /// by an unsupported format version
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {}", path.display()))?;
        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file {}", path.display()))?;
        if state.version != STATE_FILE_VERSION {
            return Err(anyhow::anyhow!(
                "State file {} has version {}, expected {}",
                path.display(),
                state.version,
                STATE_FILE_VERSION
            ));
        }
        Ok(Some(state))
    }

    /// Record new id and attributes, bumping the serial
    pub fn record(&mut self, id: &str, attributes: Map<String, Value>) {
        self.id = id.to_string();
        self.attributes = attributes;
        self.serial += 1;
        self.updated_at = Utc::now();
    }

    pub fn exists(&self) -> bool {
        !self.id.is_empty()
    }

    /// Write state to a temporary file and rename it into place
    ///
    /// # Errors
    /// Returns an error if serialisation or any filesystem step fails
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize state")?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write state file {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move state file into {}", path.display()))?;
        Ok(())
    }

    /// Remove the state file if present
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed
    pub fn remove(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove state file {}", path.display()))?;
        }
        Ok(())
    }
}
