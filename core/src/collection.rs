//! The remote collection the store synchronizes against.
//!
//! # Design
//! `Collection` is the seam between the store and the document store: one
//! query value plus four calls (fetch, insert, update, delete). The store
//! receives a collection at construction and never reaches for a global
//! handle.
//!
//! Two implementations ship with the crate:
//! - `HttpCollection` pairs a `TodoClient` with a host-supplied `Transport`.
//! - `MemoryCollection` keeps documents in process, in insertion order.

use log::debug;
use uuid::Uuid;

use crate::client::TodoClient;
use crate::config::StoreConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{NewTodo, RemoteTodo, UpdateTodo};

/// Sort key understood by the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    /// Ascending by creation time.
    CreatedAtAsc,
}

impl OrderBy {
    pub fn as_param(self) -> &'static str {
        match self {
            OrderBy::CreatedAtAsc => "created_at",
        }
    }
}

/// A filter-and-order query over the collection.
///
/// `Query::all()` matches every document in whatever order the collection
/// returns them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    owner: Option<String>,
    order: Option<OrderBy>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn where_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn order(&self) -> Option<OrderBy> {
        self.order
    }

    pub fn matches(&self, doc: &RemoteTodo) -> bool {
        match &self.owner {
            Some(owner) => doc.owner.as_ref() == Some(owner),
            None => true,
        }
    }
}

/// Document-store primitives the store depends on.
pub trait Collection {
    /// Fetch every document matching `query`.
    fn fetch(&mut self, query: &Query) -> Result<Vec<RemoteTodo>, ApiError>;

    /// Insert one document and return the id the collection assigned.
    fn insert(&mut self, input: &NewTodo) -> Result<Uuid, ApiError>;

    /// Apply a partial update to the document with `id`.
    fn update(&mut self, id: Uuid, patch: &UpdateTodo) -> Result<(), ApiError>;

    fn delete(&mut self, id: Uuid) -> Result<(), ApiError>;
}

/// Executes an `HttpRequest` on behalf of the core.
///
/// Implementations must return non-2xx responses as data rather than as
/// errors; `ApiError::Transport` is reserved for failures where no response
/// was received at all.
pub trait Transport {
    fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<F> Transport for F
where
    F: FnMut(HttpRequest) -> Result<HttpResponse, ApiError>,
{
    fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}

/// A collection reached over HTTP through a host transport.
#[derive(Debug, Clone)]
pub struct HttpCollection<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> HttpCollection<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }

    /// Target the collection at `config.base_url`.
    pub fn from_config(config: &StoreConfig, transport: T) -> Self {
        Self::new(TodoClient::new(&config.base_url), transport)
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    fn send(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(
            "event=remote_request module=collection method={} path={}",
            request.method.as_str(),
            request.path
        );
        let response = self.transport.execute(request)?;
        debug!(
            "event=remote_response module=collection status={}",
            response.status
        );
        Ok(response)
    }
}

impl<T: Transport> Collection for HttpCollection<T> {
    fn fetch(&mut self, query: &Query) -> Result<Vec<RemoteTodo>, ApiError> {
        let request = self.client.build_fetch_todos(query);
        let response = self.send(request)?;
        self.client.parse_fetch_todos(response)
    }

    fn insert(&mut self, input: &NewTodo) -> Result<Uuid, ApiError> {
        let request = self.client.build_insert_todo(input)?;
        let response = self.send(request)?;
        self.client.parse_insert_todo(response)
    }

    fn update(&mut self, id: Uuid, patch: &UpdateTodo) -> Result<(), ApiError> {
        let request = self.client.build_update_todo(id, patch)?;
        let response = self.send(request)?;
        self.client.parse_update_todo(response).map(|_| ())
    }

    fn delete(&mut self, id: Uuid) -> Result<(), ApiError> {
        let request = self.client.build_delete_todo(id);
        let response = self.send(request)?;
        self.client.parse_delete_todo(response)
    }
}

/// In-process collection. Unordered fetches return insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    documents: Vec<RemoteTodo>,
    writes: usize,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a document directly, as if another writer had inserted it.
    /// Not counted as a write.
    pub fn seed(&mut self, doc: RemoteTodo) {
        self.documents.push(doc);
    }

    pub fn documents(&self) -> &[RemoteTodo] {
        &self.documents
    }

    /// Number of insert, update, and delete calls received so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn position(&self, id: Uuid) -> Result<usize, ApiError> {
        self.documents
            .iter()
            .position(|doc| doc.id == id)
            .ok_or(ApiError::NotFound)
    }
}

impl Collection for MemoryCollection {
    fn fetch(&mut self, query: &Query) -> Result<Vec<RemoteTodo>, ApiError> {
        let mut matching: Vec<RemoteTodo> = self
            .documents
            .iter()
            .filter(|doc| query.matches(doc))
            .cloned()
            .collect();
        if let Some(OrderBy::CreatedAtAsc) = query.order() {
            matching.sort_by_key(|doc| doc.created_at);
        }
        Ok(matching)
    }

    fn insert(&mut self, input: &NewTodo) -> Result<Uuid, ApiError> {
        self.writes += 1;
        let id = Uuid::new_v4();
        self.documents.push(input.clone().into_remote(id));
        Ok(id)
    }

    fn update(&mut self, id: Uuid, patch: &UpdateTodo) -> Result<(), ApiError> {
        self.writes += 1;
        let index = self.position(id)?;
        if let Some(completed) = patch.completed {
            self.documents[index].completed = completed;
        }
        Ok(())
    }

    fn delete(&mut self, id: Uuid) -> Result<(), ApiError> {
        self.writes += 1;
        let index = self.position(id)?;
        self.documents.remove(index);
        Ok(())
    }
}
