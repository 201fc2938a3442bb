//! Postgres-backed remote store client.
//!
//! The hosted database keeps one table per shared collection, each shaped
//! `(id TEXT PRIMARY KEY, data JSONB, inserted_at TIMESTAMPTZ)`. Records
//! are stored as their full JSON value, so the remote schema never has to
//! chase the application's record shape.
//!
//! Availability combines three things: credentials configured (a database
//! URL was supplied), the client initialized (the pool exists), and the
//! last connectivity check succeeded. Any failed round-trip drops the
//! health flag; [`PgRemoteStore::check_connectivity`] restores it and
//! replays pushes that failed while the remote was down.

use crate::error::{Result, StoreError};
use crate::remote::RemoteStore;
use async_trait::async_trait;
use prodir_engine::{CollectionKind, Record};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// A save-time push that failed and is waiting for the remote to come back.
#[derive(Debug, Clone)]
struct QueuedPush {
    id: Uuid,
    kind: CollectionKind,
    record: Record,
}

/// Remote store client speaking to the hosted Postgres database.
pub struct PgRemoteStore {
    pool: Option<PgPool>,
    healthy: AtomicBool,
    pending: Mutex<Vec<QueuedPush>>,
}

impl PgRemoteStore {
    /// A client with no credentials; never available. Lets the rest of the
    /// stack run in local-only mode without special-casing.
    pub fn disconnected() -> Self {
        Self {
            pool: None,
            healthy: AtomicBool::new(false),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Connect to the remote database and make sure the collection tables
    /// exist.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        ensure_schema(&pool).await?;

        Ok(Self {
            pool: Some(pool),
            healthy: AtomicBool::new(true),
            pending: Mutex::new(Vec::new()),
        })
    }

    /// Ping the remote and update the health flag. On recovery, replays
    /// pushes queued while the remote was down. Returns the new health
    /// state.
    pub async fn check_connectivity(&self) -> bool {
        let Some(pool) = &self.pool else {
            return false;
        };

        match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => {
                let was_healthy = self.healthy.swap(true, Ordering::Relaxed);
                if !was_healthy {
                    tracing::info!("remote store reachable again");
                }
                self.replay_pending(pool).await;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "remote store connectivity check failed");
                self.healthy.store(false, Ordering::Relaxed);
                false
            }
        }
    }

    /// Number of pushes waiting for the remote to come back.
    pub fn queued_pushes(&self) -> usize {
        self.pending.lock().map(|q| q.len()).unwrap_or(0)
    }

    fn table(kind: CollectionKind) -> &'static str {
        // Table names come from a closed enum, never from input.
        kind.as_str()
    }

    fn pool(&self) -> Result<&PgPool> {
        self.pool.as_ref().ok_or(StoreError::RemoteUnavailable)
    }

    fn mark(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }

    fn enqueue(&self, kind: CollectionKind, record: &Record) {
        let push = QueuedPush {
            id: Uuid::new_v4(),
            kind,
            record: record.clone(),
        };
        tracing::debug!(push_id = %push.id, collection = %kind, record = %record.id, "queued push for replay");
        if let Ok(mut queue) = self.pending.lock() {
            queue.push(push);
        }
    }

    async fn replay_pending(&self, pool: &PgPool) {
        let queued = match self.pending.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => return,
        };
        if queued.is_empty() {
            return;
        }

        tracing::info!(count = queued.len(), "replaying queued pushes");
        for push in queued {
            match upsert_row(pool, push.kind, &push.record).await {
                Ok(()) => {
                    tracing::debug!(push_id = %push.id, record = %push.record.id, "replayed queued push");
                }
                Err(err) => {
                    tracing::warn!(push_id = %push.id, record = %push.record.id, error = %err, "replay failed, keeping in queue");
                    if let Ok(mut queue) = self.pending.lock() {
                        queue.push(push);
                    }
                }
            }
        }
    }
}

#[async_trait]
impl RemoteStore for PgRemoteStore {
    async fn is_available(&self) -> bool {
        self.pool.is_some() && self.healthy.load(Ordering::Relaxed)
    }

    async fn fetch_all(&self, kind: CollectionKind) -> Result<Vec<Record>> {
        let pool = self.pool()?;

        let sql = format!(
            "SELECT data FROM {} ORDER BY inserted_at, id",
            Self::table(kind)
        );
        let rows = match sqlx::query(&sql).fetch_all(pool).await {
            Ok(rows) => rows,
            Err(err) => {
                self.mark(false);
                return Err(err.into());
            }
        };
        self.mark(true);

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let data: serde_json::Value = row.try_get("data")?;
            records.push(Record::from_value(data)?);
        }

        Ok(records)
    }

    async fn upsert(&self, kind: CollectionKind, record: &Record) -> Result<()> {
        let pool = self.pool()?;

        match upsert_row(pool, kind, record).await {
            Ok(()) => {
                self.mark(true);
                Ok(())
            }
            Err(err) => {
                self.mark(false);
                self.enqueue(kind, record);
                Err(err.into())
            }
        }
    }

    async fn delete(&self, kind: CollectionKind, id: &str) -> Result<()> {
        let pool = self.pool()?;

        let sql = format!("DELETE FROM {} WHERE id = $1", Self::table(kind));
        match sqlx::query(&sql).bind(id).execute(pool).await {
            Ok(_) => {
                self.mark(true);
                Ok(())
            }
            Err(err) => {
                self.mark(false);
                Err(err.into())
            }
        }
    }
}

async fn upsert_row(pool: &PgPool, kind: CollectionKind, record: &Record) -> sqlx::Result<()> {
    let sql = format!(
        "INSERT INTO {} (id, data) VALUES ($1, $2) \
         ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data",
        PgRemoteStore::table(kind)
    );
    let data = serde_json::to_value(record).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    sqlx::query(&sql)
        .bind(&record.id)
        .bind(data)
        .execute(pool)
        .await?;

    Ok(())
}

async fn ensure_schema(pool: &PgPool) -> sqlx::Result<()> {
    for kind in CollectionKind::shared() {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
                 id TEXT PRIMARY KEY, \
                 data JSONB NOT NULL, \
                 inserted_at TIMESTAMPTZ NOT NULL DEFAULT now()\
             )",
            PgRemoteStore::table(kind)
        );
        sqlx::query(&sql).execute(pool).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_match_collection_keys() {
        assert_eq!(PgRemoteStore::table(CollectionKind::Contractors), "contractors");
        assert_eq!(PgRemoteStore::table(CollectionKind::UserFeedback), "user_feedback");
    }

    #[tokio::test]
    async fn disconnected_client_is_never_available() {
        let store = PgRemoteStore::disconnected();
        assert!(!store.is_available().await);
        assert!(!store.check_connectivity().await);
        assert_eq!(store.queued_pushes(), 0);
    }

    #[tokio::test]
    async fn disconnected_client_refuses_round_trips() {
        let store = PgRemoteStore::disconnected();

        let fetched = store.fetch_all(CollectionKind::Contractors).await;
        assert!(matches!(fetched, Err(StoreError::RemoteUnavailable)));

        let record = Record::new("c-1");
        let upserted = store.upsert(CollectionKind::Contractors, &record).await;
        assert!(matches!(upserted, Err(StoreError::RemoteUnavailable)));

        // Nothing queued: there is no remote to ever replay against.
        assert_eq!(store.queued_pushes(), 0);
    }
}
