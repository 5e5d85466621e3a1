//! Experience configuration: typed structure, defaults, and validation.
//!
//! A config document is authored JSON stored under `config:{experience}`.
//! Deserialization applies field defaults; [`ExperienceConfig::validate`]
//! enforces the semantic rules that serde cannot express (id/key match,
//! state-model constraints, version format). A config is immutable for the
//! process lifetime once it validates — see [`ConfigCache`].

mod loader;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use loader::ConfigCache;

use crate::error::StateError;

/// Which coordination model an experience runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateModel {
    /// One authoritative world document, concurrently writable, lock-protected.
    Shared,
    /// Each player owns a private copy of the world seeded from a template.
    Isolated,
}

/// Validated per-experience configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceConfig {
    pub id: String,
    pub name: String,
    /// Semantic version string, `major.minor.patch`.
    pub version: String,
    pub state: StateConfig,
    #[serde(default)]
    pub multiplayer: MultiplayerConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub content: ContentConfig,
    /// Free-form capability flags.
    #[serde(default)]
    pub capabilities: BTreeMap<String, bool>,
}

/// State model and coordination settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateConfig {
    pub model: StateModel,
    #[serde(default)]
    pub coordination: CoordinationConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationConfig {
    /// Whether shared-document writes go through the locked path.
    /// `model = shared` rejects an explicit `false` here.
    #[serde(default = "default_true")]
    pub locking_enabled: bool,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// Parsed and defaulted, but versioning stays a pure change counter:
    /// there is no compare-and-swap against a caller-supplied version.
    #[serde(default = "default_true")]
    pub optimistic_versioning: bool,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            locking_enabled: true,
            lock_timeout_ms: default_lock_timeout_ms(),
            optimistic_versioning: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_true")]
    pub auto_save: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { auto_save: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiplayerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub max_players: Option<u32>,
}

/// Initial state for freshly bootstrapped players.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub starting_location: Option<String>,
    #[serde(default)]
    pub starting_inventory: Vec<String>,
    /// Storage key of the world template (isolated model). Defaults to
    /// `template:{experience}` when unset.
    #[serde(default)]
    pub world_template_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub state_path: Option<String>,
    #[serde(default = "default_true")]
    pub markdown: bool,
    #[serde(default = "default_true")]
    pub hierarchical: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            state_path: None,
            markdown: true,
            hierarchical: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_lock_timeout_ms() -> u64 {
    5000
}

impl ExperienceConfig {
    /// Semantic validation beyond what deserialization enforces.
    pub fn validate(&self, expected_id: &str) -> Result<(), StateError> {
        if self.id != expected_id {
            return Err(StateError::ConfigValidation(format!(
                "config id '{}' does not match storage key '{}'",
                self.id, expected_id
            )));
        }
        if self.version.split('.').count() != 3 {
            return Err(StateError::ConfigValidation(format!(
                "version '{}' is not of the form major.minor.patch",
                self.version
            )));
        }
        if self.state.model == StateModel::Shared && !self.state.coordination.locking_enabled {
            return Err(StateError::ConfigValidation(
                "shared state model requires locking_enabled".to_string(),
            ));
        }
        Ok(())
    }
}
