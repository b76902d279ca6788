use crate::config::Settings;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::RwLock;

/// The two secrets the dashboard needs. Absence is a valid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiKeyKind {
    NewsProvider,
    CompletionProvider,
}

impl ApiKeyKind {
    pub const ALL: [ApiKeyKind; 2] = [ApiKeyKind::NewsProvider, ApiKeyKind::CompletionProvider];

    pub fn as_str(self) -> &'static str {
        match self {
            ApiKeyKind::NewsProvider => "news-provider",
            ApiKeyKind::CompletionProvider => "completion-provider",
        }
    }

    /// Name of the slot in the persistent store.
    pub fn storage_key(self) -> &'static str {
        match self {
            ApiKeyKind::NewsProvider => "alpha_vantage_api_key",
            ApiKeyKind::CompletionProvider => "openai_api_key",
        }
    }
}

impl fmt::Display for ApiKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiKeyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiKeyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.storage_key() == s)
            .with_context(|| format!("unknown api key kind: {s}"))
    }
}

/// Accessor over the persisted API keys. `get` returns an empty string when unset.
pub trait KeyStore: Send + Sync {
    fn get(&self, kind: ApiKeyKind) -> String;

    fn set(&self, kind: ApiKeyKind, value: &str);

    fn clear(&self, kind: ApiKeyKind);

    fn is_set(&self, kind: ApiKeyKind) -> bool {
        !self.get(kind).is_empty()
    }
}

/// Configuration error raised by operations that cannot run without a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingApiKey {
    pub kind: ApiKeyKind,
}

impl fmt::Display for MissingApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} API key is not set", self.kind)
    }
}

impl std::error::Error for MissingApiKey {}

pub fn require_key(store: &dyn KeyStore, kind: ApiKeyKind) -> Result<String, MissingApiKey> {
    let key = store.get(kind);
    if key.is_empty() {
        return Err(MissingApiKey { kind });
    }
    Ok(key)
}

/// Copies keys from the environment into slots that are still empty.
pub fn seed_from_settings(store: &dyn KeyStore, settings: &Settings) {
    let seeds = [
        (ApiKeyKind::NewsProvider, settings.alpha_vantage_api_key.as_deref()),
        (ApiKeyKind::CompletionProvider, settings.openai_api_key.as_deref()),
    ];
    for (kind, value) in seeds {
        if let Some(value) = value {
            if !store.is_set(kind) {
                tracing::debug!(%kind, "seeding api key from environment");
                store.set(kind, value);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    slots: RwLock<BTreeMap<ApiKeyKind, String>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(self, kind: ApiKeyKind, value: &str) -> Self {
        self.set(kind, value);
        self
    }
}

impl KeyStore for MemoryKeyStore {
    fn get(&self, kind: ApiKeyKind) -> String {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.get(&kind).cloned().unwrap_or_default()
    }

    fn set(&self, kind: ApiKeyKind, value: &str) {
        let value = value.trim();
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        if value.is_empty() {
            slots.remove(&kind);
        } else {
            slots.insert(kind, value.to_string());
        }
    }

    fn clear(&self, kind: ApiKeyKind) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.remove(&kind);
    }
}

/// JSON-file backed store. The whole file is rewritten on every change.
#[derive(Debug)]
pub struct FileKeyStore {
    path: PathBuf,
    slots: RwLock<BTreeMap<String, String>>,
}

impl FileKeyStore {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let slots = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str::<BTreeMap<String, String>>(&text)
                .with_context(|| format!("key store is not a JSON object of strings: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read key store {}", path.display()))
            }
        };

        Ok(Self {
            path,
            slots: RwLock::new(slots),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, slots: &BTreeMap<String, String>) {
        if let Err(err) = write_atomically(&self.path, slots) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to persist key store");
        }
    }
}

fn write_atomically(path: &Path, slots: &BTreeMap<String, String>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(slots).context("failed to encode key store")?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, body).with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

impl KeyStore for FileKeyStore {
    fn get(&self, kind: ApiKeyKind) -> String {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.get(kind.storage_key()).cloned().unwrap_or_default()
    }

    fn set(&self, kind: ApiKeyKind, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return self.clear(kind);
        }
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.insert(kind.storage_key().to_string(), value.to_string());
        self.persist(&slots);
    }

    fn clear(&self, kind: ApiKeyKind) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        if slots.remove(kind.storage_key()).is_some() {
            self.persist(&slots);
        }
    }
}
