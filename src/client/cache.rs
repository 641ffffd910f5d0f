//! Client-side document caching.
//!
//! [`DocumentCache`] is the short-lived in-memory cache the public site
//! reads through; entries expire after a fixed TTL measured against an
//! injectable [`Clock`]. [`OfflineStore`] is the longer-lived file-backed
//! fallback consulted when the network call fails.

use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::debug;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    inserted_at: Instant,
}

pub struct DocumentCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

/// Cache shared between the admin controller (which invalidates on
/// write) and the public site.
pub type SharedCache = Arc<Mutex<DocumentCache>>;

impl DocumentCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn shared(ttl: Duration) -> SharedCache {
        Arc::new(Mutex::new(Self::new(ttl)))
    }

    pub fn get(&mut self, filename: &str) -> Option<Value> {
        let now = self.clock.now();
        match self.entries.get(filename) {
            Some(entry) if now.duration_since(entry.inserted_at) < self.ttl => {
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("cache entry for {} expired", filename);
                self.entries.remove(filename);
                None
            }
            None => None,
        }
    }

    pub fn set(&mut self, filename: &str, value: Value) {
        let entry = CacheEntry {
            value,
            inserted_at: self.clock.now(),
        };
        self.entries.insert(filename.to_string(), entry);
    }

    pub fn invalidate(&mut self, filename: &str) {
        self.entries.remove(filename);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// File-backed last-known-good copies of the documents, with a much longer
/// expiry than the in-memory cache. Failures to read or write it are
/// swallowed: a broken fallback must never break the live path.
#[derive(Debug, Clone)]
pub struct OfflineStore {
    path: PathBuf,
    max_age: Duration,
}

impl OfflineStore {
    pub fn new(path: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            path: path.into(),
            max_age,
        }
    }

    pub fn get(&self, filename: &str) -> Option<Value> {
        let entries = self.read_entries();
        let entry = entries.get(filename)?;
        let saved_at = entry.get("saved_at").and_then(Value::as_u64)?;
        if unix_now().saturating_sub(saved_at) > self.max_age.as_secs() {
            return None;
        }
        entry.get("value").cloned()
    }

    pub fn set(&self, filename: &str, value: &Value) {
        let mut entries = self.read_entries();
        entries.insert(
            filename.to_string(),
            json!({ "saved_at": unix_now(), "value": value }),
        );
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&Value::Object(entries)) {
            Ok(text) => {
                if let Err(err) = std::fs::write(&self.path, text) {
                    debug!("offline store write failed: {}", err);
                }
            }
            Err(err) => debug!("offline store serialize failed: {}", err),
        }
    }

    fn read_entries(&self) -> Map<String, Value> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| serde_json::from_str::<Value>(&text).ok())
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
