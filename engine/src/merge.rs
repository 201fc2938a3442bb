//! Pending-preservation merge for user-submitted collections.
//!
//! When a remote fetch succeeds, the remote snapshot is authoritative. The
//! one exception is records a user created on this device that have not
//! reached the remote yet: discarding those would silently drop an
//! in-flight submission. The merge keeps exactly the local records that are
//! still awaiting moderation and still reference a contractor present in
//! the authoritative contractor set; every other local-only record is
//! stale (deleted, rejected, or orphaned upstream) and must not resurrect.
//!
//! # Algorithm
//!
//! For each local record:
//! 1. Id already present remotely: drop it, the remote copy wins
//! 2. Pending and referencing a known contractor: keep it
//! 3. Anything else: drop it
//!
//! The result is the remote snapshot followed by the kept subset, in that
//! order. Callers that cannot supply the authoritative contractor set must
//! not call the merge at all; without it there is no way to tell an
//! in-flight submission from an orphan.

use crate::{Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Why a local-only record was dropped during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscardReason {
    /// The remote snapshot already contains this id; the remote copy wins.
    SupersededByRemote,
    /// Missing from the remote and not pending: deleted or rejected
    /// upstream.
    NotPending,
    /// References a contractor absent from the authoritative set.
    OrphanedContractor,
}

/// A local record dropped by the merge, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardedRecord {
    pub id: RecordId,
    pub reason: DiscardReason,
}

/// Result of a pending-preservation merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// The remote snapshot followed by the preserved local subset.
    pub records: Vec<Record>,
    /// Ids of local records carried over.
    pub preserved: Vec<RecordId>,
    /// Local records dropped, with reasons.
    pub discarded: Vec<DiscardedRecord>,
}

/// Merge a freshly fetched remote snapshot with the local one, preserving
/// in-flight pending submissions.
///
/// `valid_contractor_ids` is the authoritative contractor id set, fetched
/// in the same reconciliation pass as `remote`.
pub fn merge_pending(
    remote: Vec<Record>,
    local: Vec<Record>,
    valid_contractor_ids: &HashSet<String>,
) -> MergeOutcome {
    let remote_ids: HashSet<&str> = remote.iter().map(|r| r.id.as_str()).collect();

    let mut preserved = Vec::new();
    let mut discarded = Vec::new();
    let mut kept = Vec::new();

    for record in local {
        if remote_ids.contains(record.id.as_str()) {
            discarded.push(DiscardedRecord {
                id: record.id,
                reason: DiscardReason::SupersededByRemote,
            });
        } else if !record.is_pending() {
            discarded.push(DiscardedRecord {
                id: record.id,
                reason: DiscardReason::NotPending,
            });
        } else if record
            .contractor_id()
            .is_some_and(|c| valid_contractor_ids.contains(c))
        {
            preserved.push(record.id.clone());
            kept.push(record);
        } else {
            discarded.push(DiscardedRecord {
                id: record.id,
                reason: DiscardReason::OrphanedContractor,
            });
        }
    }

    let mut records = remote;
    records.extend(kept);

    MergeOutcome {
        records,
        preserved,
        discarded,
    }
}
