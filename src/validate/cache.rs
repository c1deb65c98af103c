//! validate::cache
//!
//! Persisted lint verdicts keyed by issue.
//!
//! # Layout
//!
//! A single JSON object. Top-level keys are issue keys; values hold, for
//! each reviewed field, the hash of the last text sent to the reviewer and
//! the verdict it returned:
//!
//! ```json
//! {
//!   "AAP-1": {
//!     "summary_hash": "5d41...",
//!     "last_ai_summary": "OK",
//!     "description_hash": "7c21...",
//!     "last_ai_description": "Too vague"
//!   }
//! }
//! ```
//!
//! # Concurrency
//!
//! [`JsonFileCache::flush`] holds an exclusive lock on `<file>.lock`,
//! re-reads the file, overlays only the entries written by this process and
//! replaces the file atomically. Two processes linting different issues
//! therefore keep each other's entries. Two processes writing the same
//! issue still resolve last-writer-wins.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::fields::ContentField;
use crate::core::paths::lock_path_for;

/// How long `flush` waits for another process to release the lock.
const LOCK_TIMEOUT: Duration = Duration::from_secs(10);

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors from cache I/O.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read cache '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write cache '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to lock cache '{path}': {message}")]
    Lock { path: PathBuf, message: String },

    #[error("failed to serialize cache: {0}")]
    Serialize(String),
}

/// Cached review state for one issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ai_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ai_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ai_acceptance_criteria: Option<String>,
}

impl CacheEntry {
    fn slots(&mut self, field: ContentField) -> (&mut Option<String>, &mut Option<String>) {
        match field {
            ContentField::Summary => (&mut self.summary_hash, &mut self.last_ai_summary),
            ContentField::Description => {
                (&mut self.description_hash, &mut self.last_ai_description)
            }
            ContentField::AcceptanceCriteria => (
                &mut self.acceptance_criteria_hash,
                &mut self.last_ai_acceptance_criteria,
            ),
        }
    }

    /// Hash of the last text reviewed for `field`.
    pub fn hash(&self, field: ContentField) -> Option<&str> {
        match field {
            ContentField::Summary => self.summary_hash.as_deref(),
            ContentField::Description => self.description_hash.as_deref(),
            ContentField::AcceptanceCriteria => self.acceptance_criteria_hash.as_deref(),
        }
    }

    /// Last verdict for `field`.
    pub fn verdict(&self, field: ContentField) -> Option<&str> {
        match field {
            ContentField::Summary => self.last_ai_summary.as_deref(),
            ContentField::Description => self.last_ai_description.as_deref(),
            ContentField::AcceptanceCriteria => self.last_ai_acceptance_criteria.as_deref(),
        }
    }

    /// Record a review of `field`.
    pub fn record(&mut self, field: ContentField, hash: String, verdict: String) {
        let (h, v) = self.slots(field);
        *h = Some(hash);
        *v = Some(verdict);
    }
}

/// Key-value store of cache entries.
pub trait VerdictStore: Send {
    /// Entry for `issue_key`, if any.
    fn get(&self, issue_key: &str) -> Option<CacheEntry>;

    /// Replace the entry for `issue_key`.
    fn put(&mut self, issue_key: &str, entry: CacheEntry);

    /// Persist pending writes.
    fn flush(&mut self) -> Result<(), CacheError>;
}

/// Cache that lives only in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: BTreeMap<String, CacheEntry>,
    flushes: usize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `flush` calls.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VerdictStore for MemoryCache {
    fn get(&self, issue_key: &str) -> Option<CacheEntry> {
        self.entries.get(issue_key).cloned()
    }

    fn put(&mut self, issue_key: &str, entry: CacheEntry) {
        self.entries.insert(issue_key.to_string(), entry);
    }

    fn flush(&mut self) -> Result<(), CacheError> {
        self.flushes += 1;
        Ok(())
    }
}

/// Cache backed by a JSON file.
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
    /// Keys written since the last flush.
    dirty: BTreeSet<String>,
}

impl JsonFileCache {
    /// Open the cache at `path`.
    ///
    /// A missing file is an empty cache. Content that does not parse is
    /// logged and treated as empty; it is replaced on the next flush.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        debug!(path = %path.display(), entries = entries.len(), "opened lint cache");
        Ok(Self {
            path,
            entries,
            dirty: BTreeSet::new(),
        })
    }

    /// Location of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VerdictStore for JsonFileCache {
    fn get(&self, issue_key: &str) -> Option<CacheEntry> {
        self.entries.get(issue_key).cloned()
    }

    fn put(&mut self, issue_key: &str, entry: CacheEntry) {
        self.entries.insert(issue_key.to_string(), entry);
        self.dirty.insert(issue_key.to_string());
    }

    fn flush(&mut self) -> Result<(), CacheError> {
        if self.dirty.is_empty() && self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CacheError::Write {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let _lock = CacheLock::acquire(&lock_path_for(&self.path), LOCK_TIMEOUT)?;

        // Another process may have flushed since we opened.
        let mut merged = read_entries(&self.path)?;
        for key in &self.dirty {
            if let Some(entry) = self.entries.get(key) {
                merged.insert(key.clone(), entry.clone());
            }
        }

        write_atomic(&self.path, &merged)?;

        debug!(
            path = %self.path.display(),
            written = self.dirty.len(),
            total = merged.len(),
            "flushed lint cache"
        );
        self.entries = merged;
        self.dirty.clear();
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, CacheEntry>, CacheError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let contents = fs::read_to_string(path).map_err(|e| CacheError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    match serde_json::from_str(&contents) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "lint cache is corrupt, starting empty");
            Ok(BTreeMap::new())
        }
    }
}

/// Write via temp file + rename so readers never see a partial file.
fn write_atomic(path: &Path, entries: &BTreeMap<String, CacheEntry>) -> Result<(), CacheError> {
    let contents =
        serde_json::to_string_pretty(entries).map_err(|e| CacheError::Serialize(e.to_string()))?;

    let temp_path = path.with_extension("json.tmp");
    let write_err = |p: &Path| {
        let p = p.to_path_buf();
        move |e: std::io::Error| CacheError::Write { path: p, source: e }
    };

    let mut file = File::create(&temp_path).map_err(write_err(&temp_path))?;
    file.write_all(contents.as_bytes())
        .map_err(write_err(&temp_path))?;
    file.sync_all().map_err(write_err(&temp_path))?;

    fs::rename(&temp_path, path).map_err(write_err(path))?;
    Ok(())
}

/// Exclusive lock on a sidecar file, released on drop.
#[derive(Debug)]
struct CacheLock {
    file: Option<File>,
}

impl CacheLock {
    fn acquire(path: &Path, timeout: Duration) -> Result<Self, CacheError> {
        let deadline = Instant::now() + timeout;
        let lock_err = |message: String| CacheError::Lock {
            path: path.to_path_buf(),
            message,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| lock_err(format!("cannot open: {}", e)))?;

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file: Some(file) }),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Err(lock_err("timed out waiting for lock".to_string()));
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => return Err(lock_err(format!("lock failed: {}", e))),
            }
        }
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}
