//! Remote store client interface.

use crate::error::Result;
use async_trait::async_trait;
use prodir_engine::{CollectionKind, Record};

/// Client for the shared remote store.
///
/// The sync layer treats `is_available() == false` and an `Err` from any
/// call identically: fall back to the local snapshot. Implementations are
/// free to surface connectivity problems either way.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Whether the client is configured, initialized, and last known
    /// healthy. A cheap check, consulted before every remote round-trip.
    async fn is_available(&self) -> bool;

    /// Fetch the full remote snapshot of a collection, in the remote
    /// store's insertion order. An explicitly empty collection is valid
    /// authoritative state, not an error.
    async fn fetch_all(&self, kind: CollectionKind) -> Result<Vec<Record>>;

    /// Insert or update a single record. Must be idempotent: replaying the
    /// same upsert leaves the remote unchanged.
    async fn upsert(&self, kind: CollectionKind, record: &Record) -> Result<()>;

    /// Delete a single record by id. Deleting an absent id is not an error.
    async fn delete(&self, kind: CollectionKind, id: &str) -> Result<()>;
}
