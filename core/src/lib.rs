//! Todo list state kept in sync with a remote document collection.
//!
//! # Overview
//! `TodoStore` holds the list a presentation layer renders and exposes five
//! operations: load, create, toggle, delete, and the completed-items filter.
//! Remote access goes through the `Collection` trait, injected at
//! construction.
//!
//! # Design
//! - `TodoClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern). A host
//!   `Transport` executes the round-trip; `HttpCollection` wires the two.
//! - `MemoryCollection` provides the same primitives in process.
//! - Wire DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod http;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use collection::{Collection, HttpCollection, MemoryCollection, OrderBy, Query, Transport};
pub use config::StoreConfig;
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use store::{Outcome, Reconcile, Scope, SkipReason, TodoStore, Visibility};
pub use types::{InsertedId, NewTodo, RemoteTodo, Timestamp, Todo, UpdateTodo};
