//! Todo records, local and on the wire.
//!
//! # Design
//! `Todo` is the record the store hands to the presentation layer. The
//! `Remote*` / `NewTodo` / `UpdateTodo` types mirror the document store's
//! JSON schema and are defined independently from the mock-server crate;
//! integration tests catch schema drift between the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// A todo item as held in the store's local list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub owner: Option<String>,
}

impl TryFrom<RemoteTodo> for Todo {
    type Error = ApiError;

    fn try_from(remote: RemoteTodo) -> Result<Self, Self::Error> {
        Ok(Self {
            id: remote.id,
            text: remote.text,
            completed: remote.completed,
            created_at: remote.created_at.to_datetime()?,
            owner: remote.owner,
        })
    }
}

/// Document-store timestamp: whole seconds since the Unix epoch plus a
/// sub-second nanosecond part.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl Timestamp {
    /// Convert to a local time value. Fails for out-of-range values and for
    /// `nanoseconds` outside `0..1_000_000_000`.
    pub fn to_datetime(self) -> Result<DateTime<Utc>, ApiError> {
        if self.nanoseconds >= NANOS_PER_SECOND {
            return Err(self.invalid());
        }
        DateTime::from_timestamp(self.seconds, self.nanoseconds).ok_or_else(|| self.invalid())
    }

    fn invalid(self) -> ApiError {
        ApiError::InvalidTimestamp {
            seconds: self.seconds,
            nanoseconds: self.nanoseconds,
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanoseconds: value.timestamp_subsec_nanos(),
        }
    }
}

/// A document as returned by the collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTodo {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Request payload for inserting a new document. The collection assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl NewTodo {
    /// Attach the id assigned by the collection.
    pub fn into_remote(self, id: Uuid) -> RemoteTodo {
        RemoteTodo {
            id,
            text: self.text,
            completed: self.completed,
            created_at: self.created_at,
            owner: self.owner,
        }
    }
}

/// Partial update payload. Only the fields present in the JSON are applied;
/// text is not updatable once created.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
        }
    }
}

/// Response body of an insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsertedId {
    pub id: Uuid,
}
