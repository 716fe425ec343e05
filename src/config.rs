use crate::error::{CountError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub name: String,
    pub release_date: String,
    pub start_date: String,
    #[serde(default)]
    pub stable_branch: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub release_name: String,
    #[serde(default, rename = "ignored_users")]
    pub ignored_user_ids: HashSet<u64>,
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

impl RunConfig {
    /// Read and parse the YAML run description at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CountError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_yaml(&text)
            .map_err(|e| CountError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    pub fn from_yaml(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn is_ignored(&self, account_id: u64) -> bool {
        self.ignored_user_ids.contains(&account_id)
    }
}
