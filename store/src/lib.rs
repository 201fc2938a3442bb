//! # Prodir Store
//!
//! Local-first persistence for the prodir directory: a local snapshot
//! cache, a remote store client, and the sync layer that keeps the two
//! consistent while tolerating an unreachable remote.
//!
//! The remote store is the source of truth. [`SyncStore::load`] serves a
//! fresh remote snapshot whenever it can get one (overwriting the local
//! copy) and degrades silently to the local snapshot when it cannot.
//! [`SyncStore::save`] always lands locally first, then pushes to the
//! remote best-effort. Reconciliation decisions themselves live in
//! `prodir-engine`; this crate owns all IO.

pub mod cache;
pub mod config;
pub mod error;
pub mod postgres;
pub mod remote;
pub mod sync;

pub use cache::{FileCache, LocalCache, MemoryCache};
pub use config::{Config, ConfigError};
pub use error::{Result, StoreError};
pub use postgres::PgRemoteStore;
pub use remote::RemoteStore;
pub use sync::{LoadOptions, SaveOptions, SaveOutcome, SyncStore};
