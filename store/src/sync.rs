//! The sync layer: remote-as-source-of-truth with graceful degradation.
//!
//! [`SyncStore::load`] asks the remote for a fresh snapshot whenever the
//! remote is reachable; a successful fetch overwrites the local snapshot
//! (after the pending-preservation merge, where it applies) and is
//! returned. Any failure degrades silently to the local snapshot — callers
//! never see an error from `load`.
//!
//! [`SyncStore::save`] writes the local snapshot unconditionally, then
//! pushes to the remote best-effort. Push failures are reported in the
//! returned outcome but never roll back the local write.
//!
//! At most one operation is in flight per collection at a time, enforced
//! with an async mutex per collection kind. A later call for the same
//! collection waits instead of interleaving its snapshot overwrite.

use crate::cache::LocalCache;
use crate::error::Result;
use crate::remote::RemoteStore;
use dashmap::DashMap;
use prodir_engine::{merge_pending, plan_push, CollectionKind, Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Options for [`SyncStore::load`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Request a fresh remote read even if a read-side short-circuit is
    /// ever introduced. Every load already performs a fresh remote read
    /// when the remote is reachable, so today this only affects logging;
    /// it is accepted for call-site symmetry with
    /// [`SyncStore::force_refresh_all`].
    pub force_refresh: bool,
}

/// Options for [`SyncStore::save`].
#[derive(Debug, Clone, Copy)]
pub struct SaveOptions {
    /// Push the snapshot to the remote store after the local write.
    pub sync_to_remote: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            sync_to_remote: true,
        }
    }
}

/// Outcome of a [`SyncStore::save`] call.
///
/// The local write and the remote push succeed or fail independently; a
/// failed push never rolls back the local write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    /// Whether the local snapshot overwrite succeeded.
    pub local_ok: bool,
    /// Whether the remote now matches the snapshot as far as this call is
    /// concerned: every attempted remote operation succeeded, or no push
    /// was requested. `false` when the remote was unavailable or any
    /// record failed.
    pub remote_ok: bool,
    /// Ids whose upsert or delete failed. Empty when no push was attempted.
    pub failed_record_ids: Vec<RecordId>,
}

impl SaveOutcome {
    fn local_only(local_ok: bool, remote_ok: bool) -> Self {
        Self {
            local_ok,
            remote_ok,
            failed_record_ids: Vec::new(),
        }
    }
}

/// Keeps the local snapshot cache consistent with the remote store.
pub struct SyncStore {
    remote: Arc<dyn RemoteStore>,
    cache: Arc<dyn LocalCache>,
    /// One in-flight operation per collection.
    flight: DashMap<CollectionKind, Arc<Mutex<()>>>,
}

impl SyncStore {
    pub fn new(remote: Arc<dyn RemoteStore>, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            remote,
            cache,
            flight: DashMap::new(),
        }
    }

    /// Load a collection.
    ///
    /// Device-private collections are served from the local cache only
    /// (empty if never written). Shared collections prefer a fresh remote
    /// snapshot and fall back to the local one; `None` means the remote
    /// was unreachable and nothing was cached either. Never errors.
    pub async fn load(&self, kind: CollectionKind, options: LoadOptions) -> Option<Vec<Record>> {
        let lock = self.flight_lock(kind);
        let _guard = lock.lock().await;

        if kind.is_device_private() {
            return Some(self.cached(kind).await.unwrap_or_default());
        }

        if options.force_refresh {
            tracing::debug!(collection = %kind, "forced refresh requested");
        }

        if !self.remote.is_available().await {
            tracing::debug!(collection = %kind, "remote unavailable, serving local snapshot");
            return self.cached(kind).await;
        }

        match self.remote.fetch_all(kind).await {
            Ok(remote_records) => {
                let finalized = if kind.preserves_pending() {
                    self.merge_with_local(kind, remote_records, None).await
                } else {
                    remote_records
                };
                // A failed cache write is logged inside store_local; the
                // fresh remote data is still the right thing to return.
                self.store_local(kind, &finalized).await;
                Some(finalized)
            }
            Err(err) => {
                tracing::warn!(collection = %kind, error = %err, "remote fetch failed, serving local snapshot");
                self.cached(kind).await
            }
        }
    }

    /// Save a collection snapshot.
    ///
    /// The local snapshot is overwritten first, unconditionally. If
    /// `sync_to_remote` is set and the collection is shared, the snapshot
    /// is then pushed best-effort: an upsert per record, preceded by
    /// explicit deletes for collections whose removals must be inferred
    /// from the prior snapshot.
    pub async fn save(
        &self,
        kind: CollectionKind,
        records: Vec<Record>,
        options: SaveOptions,
    ) -> SaveOutcome {
        let lock = self.flight_lock(kind);
        let _guard = lock.lock().await;

        // Prior snapshot, read before the overwrite; it feeds deletion
        // diffing for the push plan.
        let prev = self.cached(kind).await;

        let local_ok = self.store_local(kind, &records).await;

        if !options.sync_to_remote || kind.is_device_private() {
            return SaveOutcome::local_only(local_ok, true);
        }

        if !self.remote.is_available().await {
            tracing::debug!(collection = %kind, "remote unavailable, snapshot kept local only");
            return SaveOutcome::local_only(local_ok, false);
        }

        let plan = plan_push(kind, prev.as_deref(), &records);
        let mut failed = Vec::new();

        for id in &plan.deletes {
            if let Err(err) = self.remote.delete(kind, id).await {
                tracing::warn!(collection = %kind, id = %id, error = %err, "remote delete failed");
                failed.push(id.clone());
            }
        }
        for record in &plan.upserts {
            if let Err(err) = self.remote.upsert(kind, record).await {
                tracing::warn!(collection = %kind, id = %record.id, error = %err, "remote upsert failed");
                failed.push(record.id.clone());
            }
        }

        SaveOutcome {
            local_ok,
            remote_ok: failed.is_empty(),
            failed_record_ids: failed,
        }
    }

    /// Refetch every shared collection from the remote, overwriting the
    /// local snapshots.
    ///
    /// Unlike [`SyncStore::load`] this propagates the first error: it
    /// backs explicit refresh actions that expect feedback. Contractors
    /// are refreshed first so the authoritative contractor id set is in
    /// hand when the recommendations merge runs.
    pub async fn force_refresh_all(&self) -> Result<()> {
        let mut contractor_ids: Option<HashSet<String>> = None;

        for kind in CollectionKind::shared() {
            let lock = self.flight_lock(kind);
            let _guard = lock.lock().await;

            let remote_records = self.remote.fetch_all(kind).await?;

            if kind == CollectionKind::Contractors {
                contractor_ids = Some(remote_records.iter().map(|r| r.id.clone()).collect());
            }

            let finalized = if kind.preserves_pending() {
                self.merge_with_local(kind, remote_records, contractor_ids.as_ref())
                    .await
            } else {
                remote_records
            };

            self.cache.set(kind, &finalized).await?;
        }

        Ok(())
    }

    fn flight_lock(&self, kind: CollectionKind) -> Arc<Mutex<()>> {
        self.flight
            .entry(kind)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Read the local snapshot, treating cache errors as a missing
    /// snapshot.
    async fn cached(&self, kind: CollectionKind) -> Option<Vec<Record>> {
        match self.cache.get(kind).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!(collection = %kind, error = %err, "local cache read failed");
                None
            }
        }
    }

    /// Overwrite the local snapshot, reporting success.
    async fn store_local(&self, kind: CollectionKind, records: &[Record]) -> bool {
        match self.cache.set(kind, records).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(collection = %kind, error = %err, "local cache write failed");
                false
            }
        }
    }

    /// Run the pending-preservation merge against the local snapshot.
    ///
    /// `known_contractors` short-circuits the contractor fetch when the
    /// caller already holds the authoritative id set from the same pass.
    /// When the contractor list cannot be obtained the remote snapshot
    /// wins entirely: without it there is no way to tell an in-flight
    /// submission from an orphan.
    async fn merge_with_local(
        &self,
        kind: CollectionKind,
        remote_records: Vec<Record>,
        known_contractors: Option<&HashSet<String>>,
    ) -> Vec<Record> {
        let local = match self.cached(kind).await {
            Some(local) if !local.is_empty() => local,
            _ => return remote_records,
        };

        let fetched;
        let valid_ids = match known_contractors {
            Some(ids) => ids,
            None => match self.valid_contractor_ids().await {
                Some(ids) => {
                    fetched = ids;
                    &fetched
                }
                None => return remote_records,
            },
        };

        let outcome = merge_pending(remote_records, local, valid_ids);

        if !outcome.preserved.is_empty() {
            tracing::debug!(
                collection = %kind,
                preserved = outcome.preserved.len(),
                "kept local pending submissions"
            );
        }
        for discard in &outcome.discarded {
            tracing::debug!(
                collection = %kind,
                id = %discard.id,
                reason = ?discard.reason,
                "dropped local-only record"
            );
        }

        outcome.records
    }

    /// The authoritative contractor id set, fetched fresh from the remote.
    async fn valid_contractor_ids(&self) -> Option<HashSet<String>> {
        match self.remote.fetch_all(CollectionKind::Contractors).await {
            Ok(contractors) => Some(contractors.into_iter().map(|r| r.id).collect()),
            Err(err) => {
                tracing::warn!(error = %err, "contractor fetch failed during merge");
                None
            }
        }
    }
}
