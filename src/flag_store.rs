use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

/// String value a flag holds once it has been raised.
pub const FLAG_SET: &str = "true";

/// Persistent key/value storage for small UI flags.
pub trait FlagStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error>;

    fn set(&self, key: &str, value: &str) -> Result<(), anyhow::Error>;

    fn is_set(&self, key: &str) -> Result<bool, anyhow::Error> {
        Ok(self.get(key)?.as_deref() == Some(FLAG_SET))
    }

    fn raise(&self, key: &str) -> Result<(), anyhow::Error> {
        self.set(key, FLAG_SET)
    }
}

/// Flags kept in a JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, anyhow::Error> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read flag file {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Flag file {} is not a JSON object", self.path.display()))
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        Ok(self.load()?.remove(key))
    }

    #[tracing::instrument(name = "Persisting flag", skip(self))]
    fn set(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        let mut flags = self.load()?;
        flags.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(&flags).context("Failed to serialize flags")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write flag file {}", self.path.display()))
    }
}

/// Process-local flags, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: Mutex<BTreeMap<String, String>>,
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        let flags = self
            .flags
            .lock()
            .map_err(|_| anyhow::anyhow!("Flag store lock poisoned"))?;
        Ok(flags.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        let mut flags = self
            .flags
            .lock()
            .map_err(|_| anyhow::anyhow!("Flag store lock poisoned"))?;
        flags.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
