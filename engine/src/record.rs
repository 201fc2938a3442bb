//! The record model shared by the local cache and the remote store.
//!
//! Records are opaque JSON objects. The reconciliation logic inspects only
//! the `id`, the contractor foreign key, and the moderation status; all
//! other fields round-trip unmodified.

use crate::error::{Error, Result};
use crate::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Keys checked, in order, for the moderation status of a record.
const STATUS_KEYS: [&str; 2] = ["moderationStatus", "status"];

/// Keys checked, in order, for the contractor foreign key. Remote rows use
/// the column name; locally drafted records may carry the camelCase form.
const CONTRACTOR_KEYS: [&str; 2] = ["contractor_id", "contractorId"];

/// Moderation state of a user-submitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    /// Submitted, awaiting moderation.
    Pending,
    /// Accepted by a moderator.
    Approved,
    /// Refused by a moderator.
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// A single directory record.
///
/// `id` is mandatory and unique within a collection; every other field is
/// carried opaquely in `fields` and serializes flattened, so the JSON shape
/// is exactly the object the application submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a record with no fields beyond its id.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Parse a record out of a raw JSON value.
    ///
    /// The value must be an object with a string `id`.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut obj = match value {
            Value::Object(obj) => obj,
            _ => return Err(Error::RecordNotObject),
        };

        let id = match obj.remove("id") {
            Some(Value::String(id)) => id,
            _ => return Err(Error::MissingRecordId),
        };

        Ok(Self { id, fields: obj })
    }

    /// Turn the record back into the raw JSON object it was parsed from.
    pub fn into_value(self) -> Value {
        let mut obj = self.fields;
        obj.insert("id".to_string(), Value::String(self.id));
        Value::Object(obj)
    }

    /// Look up an opaque field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The contractor this record refers to, if any.
    pub fn contractor_id(&self) -> Option<&str> {
        CONTRACTOR_KEYS
            .iter()
            .find_map(|key| self.fields.get(*key))
            .and_then(Value::as_str)
    }

    /// The moderation status of this record, if present and recognized.
    pub fn moderation_status(&self) -> Option<ModerationStatus> {
        STATUS_KEYS
            .iter()
            .find_map(|key| self.fields.get(*key))
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    /// Whether this record is awaiting moderation.
    pub fn is_pending(&self) -> bool {
        self.moderation_status() == Some(ModerationStatus::Pending)
    }
}
