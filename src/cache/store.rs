//! Single-file JSON cache store
//!
//! Provides a `CacheStore` that keeps every cached response in memory and
//! mirrors it to one JSON file on disk.

use directories::ProjectDirs;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the cache inside the platform cache directory
const CACHE_FILE_NAME: &str = "cache.json";

/// Fallback cache path used when no platform cache directory exists
const FALLBACK_CACHE_FILE: &str = "nps_cache.json";

/// Mapping from request key to cached response body
///
/// HTML pages are stored as JSON strings, API responses as the decoded value.
pub type CacheEntries = BTreeMap<String, Value>;

/// In-memory cache backed by a single JSON file
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Location of the persisted cache file
    path: PathBuf,
    /// Every entry currently known, loaded in full at open
    entries: CacheEntries,
}

impl CacheStore {
    /// Opens the cache at `path`, loading whatever it already contains
    ///
    /// A missing or unreadable file yields an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path);
        debug!(path = %path.display(), entries = entries.len(), "opened cache");
        Self { path, entries }
    }

    /// Returns the default cache location
    ///
    /// Uses `~/.cache/npsfind/cache.json` on Linux, or the equivalent XDG path on
    /// other platforms. Falls back to `nps_cache.json` in the working directory
    /// when no home directory can be determined.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "npsfind")
            .map(|dirs| dirs.cache_dir().join(CACHE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_FILE))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up a cached value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Whether `key` has been cached
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores a new entry in memory and rewrites the backing file
    ///
    /// The in-memory entry is kept even when persisting fails, so the rest of
    /// the run still sees it.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> io::Result<()> {
        self.entries.insert(key.into(), value);
        save(&self.path, &self.entries)
    }
}

/// Reads the cache file at `path`
///
/// Any failure (missing file, unreadable file, invalid JSON, JSON that is not
/// an object) is treated as an empty cache.
pub fn load(path: &Path) -> CacheEntries {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no readable cache file, starting empty");
            return CacheEntries::new();
        }
    };

    match serde_json::from_str::<CacheEntries>(&content) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring corrupt cache file");
            CacheEntries::new()
        }
    }
}

/// Writes `entries` to `path`, replacing any previous content
///
/// The JSON is written to a sibling temporary file first and then renamed over
/// the target, so an interrupted write never truncates the previous cache.
pub fn save(path: &Path, entries: &CacheEntries) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let tmp_path = temp_path(path);
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)
}

/// Sibling path used while writing the cache
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| FALLBACK_CACHE_FILE.into());
    name.push(".tmp");
    path.with_file_name(name)
}
