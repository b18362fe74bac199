//! Preferred-quality persistence
//!
//! The preference lives in an injected key-value store so the controller can
//! run without a browser storage backend. [`CookieJar`] mirrors cookie
//! semantics in memory; [`FileStore`] persists the same jar as JSON.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Key under which the preferred quality is stored
pub const QUALITY_KEY: &str = "H5PVideoQuality";

/// Injected persistence capability
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Single `key=value` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieEntry {
    pub key: String,
    pub value: String,
}

/// Ordered cookie-style entry list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieEntries(Vec<CookieEntry>);

impl CookieEntries {
    /// Parse a `k=v; k2=v2` header string. Segments without `=` are kept
    /// with an empty value.
    pub fn parse(header: &str) -> Self {
        let entries = header
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => CookieEntry {
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                },
                None => CookieEntry {
                    key: segment.to_string(),
                    value: String::new(),
                },
            })
            .collect();
        Self(entries)
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Overwrite the first entry under `key`, or prepend a new one
    pub fn set(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.value = value.to_string(),
            None => self.0.insert(
                0,
                CookieEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                },
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render back to a header string
    pub fn to_header(&self) -> String {
        self.0
            .iter()
            .map(|entry| format!("{}={}", entry.key, entry.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// In-memory cookie jar
#[derive(Debug, Default)]
pub struct CookieJar {
    entries: Mutex<CookieEntries>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar seeded from a cookie header string
    pub fn from_header(header: &str) -> Self {
        Self {
            entries: Mutex::new(CookieEntries::parse(header)),
        }
    }

    pub fn header(&self) -> Result<String> {
        let entries = self.entries.lock().map_err(|e| Error::storage(e.to_string()))?;
        Ok(entries.to_header())
    }
}

impl KeyValueStore for CookieJar {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|e| Error::storage(e.to_string()))?;
        Ok(entries.get(key).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|e| Error::storage(e.to_string()))?;
        entries.set(key, value);
        Ok(())
    }
}

/// Cookie jar persisted as a JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<CookieEntries> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(CookieEntries::default()),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| Error::MalformedEntry(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CookieEntries::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &CookieEntries) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|e| Error::storage(e.to_string()))?;
        Ok(self.load()?.get(key).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|e| Error::storage(e.to_string()))?;
        let mut entries = self.load()?;
        entries.set(key, value);
        self.save(&entries)
    }
}

/// The user's last chosen quality
#[derive(Clone)]
pub struct QualityStore {
    backend: Arc<dyn KeyValueStore>,
}

impl QualityStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store backed by a fresh in-memory jar
    pub fn in_memory() -> Self {
        Self::new(Arc::new(CookieJar::new()))
    }

    /// Stored preference. Storage failures read as no preference.
    pub fn get(&self) -> Option<String> {
        match self.backend.get(QUALITY_KEY) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Failed to read quality preference");
                None
            }
        }
    }

    /// Persist a preference. Failures are logged, never propagated.
    pub fn set(&self, name: &str) {
        match self.backend.set(QUALITY_KEY, name) {
            Ok(()) => debug!(quality = name, "Quality preference stored"),
            Err(e) => warn!(error = %e, code = e.error_code(), "Failed to store quality preference"),
        }
    }
}

impl std::fmt::Debug for QualityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityStore").finish_non_exhaustive()
    }
}
