//! Command implementations
//!
//! Every command opens a [`Session`], which loads configuration and persisted
//! state, runs against the decision core, and persists again on close.

pub mod analyze;
pub mod feedback;
pub mod status;

use anyhow::{Context, Result};
use devroute_core::{CoreConfig, DecisionCore, JsonFileStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration read when `--config` is not given
const DEFAULT_CONFIG_PATH: &str = ".devroute/config.toml";

pub struct Session {
    pub core: DecisionCore,
    store: JsonFileStore,
    pub json: bool,
}

impl Session {
    pub async fn open(config_path: Option<&Path>, json: bool) -> Result<Self> {
        let config = load_config(config_path)?;
        let store = JsonFileStore::new(config.state_dir());
        debug!("Using state directory {}", store.dir().display());

        let core = DecisionCore::new(config);
        core.load(&store).await;
        Ok(Self { core, store, json })
    }

    pub async fn close(self) {
        self.core.persist(&self.store).await;
    }

    /// Print `value` as pretty JSON when `--json` was given, else run `human`
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<CoreConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(CoreConfig::default());
            }
            default
        }
    };

    info!("Loading configuration from {}", path.display());
    CoreConfig::from_file(&path).with_context(|| format!("Failed to load config {}", path.display()))
}

/// Read a source file; a file that does not exist yet reads as empty
pub async fn read_source(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(code) => Ok(code),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("{} does not exist, treating it as empty", path.display());
            Ok(String::new())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "orchestration_enabled = false\n[anchors]\nprimary = \"quick-fixer\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(!config.orchestration_enabled());
        assert_eq!(config.anchors.primary, "quick-fixer");
        assert_eq!(config.anchors.secondary, "auto-fixer");
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[tokio::test]
    async fn test_read_source_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_source(&dir.path().join("New.tsx")).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_session_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let state_dir = dir.path().join("state");
        std::fs::write(&config_path, format!("state_dir = {:?}\n", state_dir.to_string_lossy())).unwrap();

        let session = Session::open(Some(&config_path), false).await.unwrap();
        assert!(!session.core.toggle_learning().await);
        session.close().await;

        let session = Session::open(Some(&config_path), false).await.unwrap();
        assert!(!session.core.stats().await.learning_enabled);
        assert!(state_dir.join("learningState.json").exists());
    }
}
