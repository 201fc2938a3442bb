//! # Prodir Engine
//!
//! Deterministic reconciliation logic for a local-first directory of
//! service contractors.
//!
//! The directory mirrors a handful of collections (contractors, categories,
//! recommendations, user feedback, favorites) between a device-local cache
//! and a shared remote store. The remote store is authoritative; this crate
//! holds the pure decision logic for resolving the two sides into one
//! result.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of files, network, or platform
//! - **Deterministic**: same inputs always produce same outputs
//! - **Testable**: pure logic, no mocks needed
//! - **Observable**: merge and push decisions are returned as data, never
//!   hidden in internal state
//!
//! ## Core Concepts
//!
//! ### Collections
//!
//! Each collection is identified by a [`CollectionKind`]. Collections are
//! reconciled as whole snapshots, not as individually addressed records;
//! removing a record means writing a snapshot that omits it.
//!
//! ### Records
//!
//! A [`Record`] is an opaque JSON object with a mandatory `id`. The engine
//! only ever inspects `id`, the contractor foreign key, and the moderation
//! status; every other field rides along untouched.
//!
//! ### Pending-preservation merge
//!
//! [`merge_pending`] resolves a freshly fetched remote snapshot against the
//! local one. The remote wins, with one carve-out: local records still
//! awaiting moderation that reference a live contractor are in-flight user
//! submissions and are carried over instead of discarded.
//!
//! ### Push planning
//!
//! [`plan_push`] turns a snapshot overwrite into the remote operations that
//! realize it: upserts for every record, plus explicit deletes (diffed
//! against the prior snapshot) for collections whose remote removals must
//! be inferred.
//!
//! ## Quick Start
//!
//! ```rust
//! use prodir_engine::{merge_pending, Record};
//! use serde_json::json;
//! use std::collections::HashSet;
//!
//! let remote = vec![];
//! let local = vec![Record::from_value(json!({
//!     "id": "rec-1",
//!     "contractor_id": "c-1",
//!     "moderationStatus": "pending",
//! }))
//! .unwrap()];
//! let contractors: HashSet<String> = ["c-1".to_string()].into();
//!
//! let outcome = merge_pending(remote, local, &contractors);
//! assert_eq!(outcome.records.len(), 1);
//! assert_eq!(outcome.preserved, vec!["rec-1".to_string()]);
//! ```

pub mod collection;
pub mod diff;
pub mod error;
pub mod merge;
pub mod record;

// Re-export main types at crate root
pub use collection::CollectionKind;
pub use diff::{deleted_ids, plan_push, PushPlan};
pub use error::Error;
pub use merge::{merge_pending, DiscardReason, DiscardedRecord, MergeOutcome};
pub use record::{ModerationStatus, Record};

/// Type aliases for clarity
pub type RecordId = String;
pub type ContractorId = String;
