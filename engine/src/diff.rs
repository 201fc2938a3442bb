//! Push planning: turning a snapshot overwrite into remote operations.
//!
//! Saves replace a collection's snapshot wholesale, but the remote store is
//! written record by record. For collections of independent entities the
//! push is an upsert per record. For collections managed as a closed set
//! (categories), records missing from the new snapshot must be deleted
//! remotely, so the planner diffs against the prior snapshot — supplied
//! explicitly by the caller, never tracked inside the engine.

use crate::{CollectionKind, Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The remote operations required to realize a snapshot overwrite.
///
/// Deletes are issued before upserts so a re-added id cannot be removed by
/// its own push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPlan {
    /// Every record of the new snapshot, upserted idempotently.
    pub upserts: Vec<Record>,
    /// Ids present in the prior snapshot but absent from the new one.
    pub deletes: Vec<RecordId>,
}

impl PushPlan {
    /// Whether the plan contains no remote work at all.
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }
}

/// Ids present in `prev` but absent from `next`, in `prev` order.
pub fn deleted_ids(prev: &[Record], next: &[Record]) -> Vec<RecordId> {
    let next_ids: HashSet<&str> = next.iter().map(|r| r.id.as_str()).collect();
    prev.iter()
        .filter(|r| !next_ids.contains(r.id.as_str()))
        .map(|r| r.id.clone())
        .collect()
}

/// Plan the remote push for a snapshot overwrite of `kind`.
///
/// `prev` is the last known snapshot before the overwrite; `None` when the
/// collection had never been stored. Deletion diffing only applies to
/// collections that track deletions.
pub fn plan_push(kind: CollectionKind, prev: Option<&[Record]>, next: &[Record]) -> PushPlan {
    let deletes = match prev {
        Some(prev) if kind.tracks_deletions() => deleted_ids(prev, next),
        _ => Vec::new(),
    };

    PushPlan {
        upserts: next.to_vec(),
        deletes,
    }
}
