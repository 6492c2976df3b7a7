// ABOUTME: Time-to-live key/value caches used by lookup tools.
// ABOUTME: File-backed (one file per key, expiry by mtime) and in-memory variants.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// A key/value store whose entries stop being visible after a fixed TTL.
///
/// Expired entries behave exactly like missing ones.
#[async_trait]
pub trait TtlCache: Send + Sync {
    /// Fetch a live entry.
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error>;

    /// Store an entry, replacing any previous value and restarting its TTL.
    async fn put(&self, key: &str, value: &str) -> Result<(), anyhow::Error>;
}

/// Cache storing each entry as `<dir>/<prefix><key>`.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    prefix: String,
    ttl: Duration,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`. Path separators in keys are flattened.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(format!("{}{}", self.prefix, safe))
    }
}

#[async_trait]
impl TtlCache for FileCache {
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        let path = self.path_for(key);

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // A modification time in the future counts as fresh.
        let age = metadata
            .modified()?
            .elapsed()
            .unwrap_or(Duration::ZERO);

        if age >= self.ttl {
            debug!(key, ?age, "cache entry expired");
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            return Ok(None);
        }

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(key), value).await?;
        debug!(key, "cache entry stored");
        Ok(())
    }
}

/// In-process cache keyed by insertion instant.
pub struct MemoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, String)>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new cache wrapped in Arc for sharing.
    pub fn shared(ttl: Duration) -> Arc<Self> {
        Arc::new(Self::new(ttl))
    }
}

#[async_trait]
impl TtlCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some((stored, value)) if stored.elapsed() < self.ttl => {
                    return Ok(Some(value.clone()));
                }
                Some(_) => {}
            }
        }
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|(stored, _)| stored.elapsed() >= self.ttl)
        {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        let mut entries = self.entries.write().await;
        entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
        entries.insert(key.to_string(), (Instant::now(), value.to_string()));
        Ok(())
    }
}
