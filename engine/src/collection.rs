//! Collection identifiers for the directory data set.
//!
//! Every collection maps to exactly one remote table and one local cache
//! key of the same name. The enum also carries the per-collection sync
//! rules the reconciliation layer dispatches on.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The collections mirrored between local and remote storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Contractors,
    Categories,
    Recommendations,
    UserFeedback,
    Favorites,
}

impl CollectionKind {
    /// All collections, in reconciliation order. Contractors come first so
    /// the authoritative contractor id set is known before collections that
    /// reference it.
    pub const ALL: [CollectionKind; 5] = [
        CollectionKind::Contractors,
        CollectionKind::Categories,
        CollectionKind::Recommendations,
        CollectionKind::UserFeedback,
        CollectionKind::Favorites,
    ];

    /// The string key used for the remote table and the local cache entry.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Contractors => "contractors",
            CollectionKind::Categories => "categories",
            CollectionKind::Recommendations => "recommendations",
            CollectionKind::UserFeedback => "user_feedback",
            CollectionKind::Favorites => "favorites",
        }
    }

    /// Device-private collections have no shared authoritative copy and are
    /// never read from or written to the remote store.
    pub fn is_device_private(&self) -> bool {
        matches!(self, CollectionKind::Favorites)
    }

    /// Whether a remote push must infer deletions by diffing the new
    /// snapshot against the prior one. Only categories are managed as a
    /// closed set; every other collection models independent entities.
    pub fn tracks_deletions(&self) -> bool {
        matches!(self, CollectionKind::Categories)
    }

    /// Whether local-only records awaiting moderation survive a remote
    /// overwrite. Applies to user-submitted recommendations, whose
    /// contractor reference can be validated against the authoritative
    /// contractor set.
    pub fn preserves_pending(&self) -> bool {
        matches!(self, CollectionKind::Recommendations)
    }

    /// Collections with a shared remote copy, in reconciliation order.
    pub fn shared() -> impl Iterator<Item = CollectionKind> {
        Self::ALL.into_iter().filter(|k| !k.is_device_private())
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::UnknownCollection(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_roundtrip() {
        for kind in CollectionKind::ALL {
            assert_eq!(kind.as_str().parse::<CollectionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_key_rejected() {
        let result = "reviews".parse::<CollectionKind>();
        assert!(matches!(result, Err(Error::UnknownCollection(_))));
    }

    #[test]
    fn favorites_is_the_only_private_collection() {
        let private: Vec<_> = CollectionKind::ALL
            .into_iter()
            .filter(|k| k.is_device_private())
            .collect();
        assert_eq!(private, vec![CollectionKind::Favorites]);
    }

    #[test]
    fn shared_excludes_favorites_and_leads_with_contractors() {
        let shared: Vec<_> = CollectionKind::shared().collect();
        assert_eq!(shared.len(), 4);
        assert_eq!(shared[0], CollectionKind::Contractors);
        assert!(!shared.contains(&CollectionKind::Favorites));
    }

    #[test]
    fn sync_rules() {
        assert!(CollectionKind::Categories.tracks_deletions());
        assert!(!CollectionKind::Contractors.tracks_deletions());
        assert!(CollectionKind::Recommendations.preserves_pending());
        assert!(!CollectionKind::UserFeedback.preserves_pending());
    }

    #[test]
    fn serde_uses_snake_case_keys() {
        let json = serde_json::to_string(&CollectionKind::UserFeedback).unwrap();
        assert_eq!(json, "\"user_feedback\"");

        let parsed: CollectionKind = serde_json::from_str("\"recommendations\"").unwrap();
        assert_eq!(parsed, CollectionKind::Recommendations);
    }
}
