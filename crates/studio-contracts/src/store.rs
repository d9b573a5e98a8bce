//! String key-value persistence shared by the reference list and the panel settings.
//!
//! Every backend takes `&self` so one handle can be shared between the
//! [`ReferenceManager`](crate::references::ReferenceManager) and
//! [`Settings`](crate::settings::Settings).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

pub const REFERENCES_KEY: &str = "gemini.references";
pub const PROMPT_KEY: &str = "gemini.prompt";
pub const API_KEY_KEY: &str = "gemini.apiKey";
pub const LOCALE_KEY: &str = "gemini.locale";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

/// Volatile store for tests and hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable store backed by a single JSON object on disk.
///
/// Reads always go to disk so separate handles on the same path observe each
/// other's writes. A write merges the one key into the current on-disk object
/// rather than overwriting it with a stale snapshot.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        let payload = read_json_object(&self.path)?;
        payload.get(key).and_then(Value::as_str).map(str::to_string)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("storage lock poisoned"))?;
        let mut on_disk = read_json_object(&self.path).unwrap_or_default();
        if on_disk.get(key).and_then(Value::as_str) == Some(value) {
            return Ok(());
        }
        on_disk.insert(key.to_string(), Value::String(value.to_string()));
        write_json_object(&self.path, &on_disk)
    }
}

fn read_json_object(path: &Path) -> Option<Map<String, Value>> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            log::warn!("ignoring non-object storage file {}", path.display());
            None
        }
        Err(err) => {
            log::warn!("ignoring unreadable storage file {}: {err}", path.display());
            None
        }
    }
}

fn write_json_object(path: &Path, payload: &Map<String, Value>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(
        path,
        serde_json::to_string_pretty(&Value::Object(payload.clone()))?,
    )?;
    Ok(())
}
