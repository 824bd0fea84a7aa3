//! Versioned key-value persistence
//!
//! Snapshots are stored as `{ "version": N, "data": ... }` envelopes. Payloads
//! written before envelopes existed are treated as version 0 and migrated on
//! read; versions newer than this build understands are refused.

pub mod json_file;
pub mod memory;

use crate::error::{CoreError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

pub const LEARNING_PATTERNS_KEY: &str = "learningPatterns";
pub const LEARNING_STATE_KEY: &str = "learningState";
pub const ORCHESTRATION_DATA_KEY: &str = "orchestrationData";

/// Envelope version written by this build
pub const SCHEMA_VERSION: u32 = 1;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub data: Value,
}

/// Read a stored value as an envelope at the current version
pub fn migrate(key: &str, raw: Value) -> Result<Envelope> {
    let envelope = match as_envelope(&raw) {
        Some(envelope) => envelope,
        None => Envelope { version: 0, data: raw },
    };

    match envelope.version {
        SCHEMA_VERSION => Ok(envelope),
        0 => {
            debug!("Migrating unversioned payload under {}", key);
            Ok(Envelope { version: SCHEMA_VERSION, data: envelope.data })
        }
        found => Err(CoreError::UnsupportedVersion { key: key.to_string(), found, supported: SCHEMA_VERSION }),
    }
}

fn as_envelope(raw: &Value) -> Option<Envelope> {
    let object = raw.as_object()?;
    if object.len() != 2 {
        return None;
    }
    let version = u32::try_from(object.get("version")?.as_u64()?).ok()?;
    let data = object.get("data")?.clone();
    Some(Envelope { version, data })
}

pub async fn load_snapshot<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    let envelope = migrate(key, raw)?;
    serde_json::from_value(envelope.data)
        .map(Some)
        .map_err(|e| CoreError::CorruptPayload { key: key.to_string(), message: e.to_string() })
}

pub async fn save_snapshot<T: Serialize>(store: &dyn KeyValueStore, key: &str, data: &T) -> Result<()> {
    let envelope = Envelope { version: SCHEMA_VERSION, data: serde_json::to_value(data)? };
    store.set(key, serde_json::to_value(envelope)?).await
}
