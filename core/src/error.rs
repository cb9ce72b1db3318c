//! Error types for the todo sync core.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers distinguish "the
//! document does not exist" from "the server returned an unexpected status"
//! (the store treats a missing document on delete as already deleted). All
//! other non-2xx responses land in `HttpError` with the raw status code and
//! body for debugging.

use thiserror::Error;

/// Errors raised while talking to the remote collection.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested document does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The host transport failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A fetched document carried a timestamp that is not a valid point in time.
    #[error("invalid timestamp: {seconds}s {nanoseconds}ns")]
    InvalidTimestamp { seconds: i64, nanoseconds: u32 },
}

/// Errors raised while loading a `StoreConfig`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}` (expected {expected})")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{key} cannot be empty")]
    Empty { key: &'static str },
}
