//! Local snapshot cache.
//!
//! One snapshot per collection, overwritten wholesale on every write.
//! There are no transactional guarantees across collections; each key is
//! its own little world, mirroring browser-style key/value storage.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prodir_engine::{CollectionKind, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Device-local persistence for collection snapshots.
#[async_trait]
pub trait LocalCache: Send + Sync {
    /// Read the snapshot for a collection, `None` if never written.
    async fn get(&self, kind: CollectionKind) -> Result<Option<Vec<Record>>>;

    /// Overwrite the snapshot for a collection.
    async fn set(&self, kind: CollectionKind, records: &[Record]) -> Result<()>;

    /// Drop the snapshot for a collection.
    async fn remove(&self, kind: CollectionKind) -> Result<()>;
}

/// In-memory cache for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CollectionKind, Vec<Record>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalCache for MemoryCache {
    async fn get(&self, kind: CollectionKind) -> Result<Option<Vec<Record>>> {
        Ok(self.entries.read().await.get(&kind).cloned())
    }

    async fn set(&self, kind: CollectionKind, records: &[Record]) -> Result<()> {
        self.entries.write().await.insert(kind, records.to_vec());
        Ok(())
    }

    async fn remove(&self, kind: CollectionKind) -> Result<()> {
        self.entries.write().await.remove(&kind);
        Ok(())
    }
}

/// On-disk envelope for one collection snapshot.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    /// When the snapshot was written.
    stored_at: DateTime<Utc>,
    records: Vec<Record>,
}

/// File-backed cache: one JSON snapshot file per collection under a cache
/// directory. Writes go through a temp file and a rename so a crash never
/// leaves a half-written snapshot behind.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, kind: CollectionKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.as_str()))
    }
}

#[async_trait]
impl LocalCache for FileCache {
    async fn get(&self, kind: CollectionKind) -> Result<Option<Vec<Record>>> {
        let bytes = match tokio::fs::read(self.path(kind)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let snapshot: SnapshotFile = serde_json::from_slice(&bytes)?;
        Ok(Some(snapshot.records))
    }

    async fn set(&self, kind: CollectionKind, records: &[Record]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let snapshot = SnapshotFile {
            stored_at: Utc::now(),
            records: records.to_vec(),
        };
        let bytes = serde_json::to_vec(&snapshot)?;

        let path = self.path(kind);
        let tmp = self.dir.join(format!("{}.json.tmp", kind.as_str()));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        Ok(())
    }

    async fn remove(&self, kind: CollectionKind) -> Result<()> {
        match tokio::fs::remove_file(self.path(kind)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
