//! In-memory todo list kept in sync with a remote collection.
//!
//! # Design
//! `TodoStore` owns the local list and an injected `Collection`. Every
//! operation is explicit: nothing polls or subscribes in the background.
//!
//! Toggle and delete apply the local change first and then the remote one.
//! The two steps are not transactional; when the remote step fails the
//! configured `Reconcile` policy decides whether the local view is refreshed
//! from the collection. The error is returned either way.
//!
//! Create is the exception: the id only exists once the collection assigns
//! it, so the local append follows a successful insert.
//!
//! # Invariants
//! - With `Scope::Owner`, a record is only toggled or deleted when its owner
//!   equals the bound identity. Mismatches are skipped, never errors.
//! - `load` replaces the whole list; it never merges.
//! - Hiding completed records is local only. Showing them again re-fetches.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::collection::{Collection, OrderBy, Query};
use crate::config::StoreConfig;
use crate::error::ApiError;
use crate::types::{NewTodo, Todo, UpdateTodo};

/// Who may see and modify records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// No identity scoping. Every record is visible and mutable.
    Shared,
    /// Only records whose owner equals the bound identity are loaded and
    /// mutable. `None` means no identity is bound yet.
    Owner(Option<String>),
}

/// What to do when a remote write fails after the local list was changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Reconcile {
    /// Re-load from the collection so the local list matches it again.
    #[default]
    Reload,
    /// Leave the local list as it is until the next explicit load.
    KeepLocal,
}

/// Why an operation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyText,
    NoIdentity,
    NotFound,
    NotOwner,
}

impl SkipReason {
    fn as_str(self) -> &'static str {
        match self {
            SkipReason::EmptyText => "empty_text",
            SkipReason::NoIdentity => "no_identity",
            SkipReason::NotFound => "not_found",
            SkipReason::NotOwner => "not_owner",
        }
    }
}

/// Result of a store operation that may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Skipped(SkipReason),
}

/// Result of toggling the completed-items filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Completed records were dropped from the local list.
    HidingCompleted,
    /// The full list was re-loaded from the collection.
    ShowingAll,
}

#[derive(Debug)]
pub struct TodoStore<C> {
    collection: C,
    scope: Scope,
    reconcile: Reconcile,
    clock: fn() -> DateTime<Utc>,
    todos: Vec<Todo>,
}

impl<C: Collection> TodoStore<C> {
    pub fn new(collection: C, scope: Scope) -> Self {
        Self {
            collection,
            scope,
            reconcile: Reconcile::default(),
            clock: Utc::now,
            todos: Vec::new(),
        }
    }

    pub fn from_config(collection: C, config: &StoreConfig) -> Self {
        Self::new(collection, config.scope()).with_reconcile(config.reconcile)
    }

    pub fn with_reconcile(mut self, reconcile: Reconcile) -> Self {
        self.reconcile = reconcile;
        self
    }

    /// Replace the source of `createdAt` values for new records.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// The records currently visible, in display order.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: Uuid) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn identity(&self) -> Option<&str> {
        match &self.scope {
            Scope::Owner(identity) => identity.as_deref(),
            Scope::Shared => None,
        }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut C {
        &mut self.collection
    }

    /// Bind the acting identity of an owner-scoped store. Switching to a
    /// different identity drops the previous one's records from the local
    /// list. Returns `false` on a shared store and for a blank identity,
    /// leaving the store unchanged.
    pub fn bind_identity(&mut self, identity: impl Into<String>) -> bool {
        let identity = identity.into().trim().to_string();
        if identity.is_empty() {
            debug!("event=identity_bind module=store status=skipped reason=blank_identity");
            return false;
        }
        match &mut self.scope {
            Scope::Owner(current) => {
                if current.as_deref() != Some(identity.as_str()) {
                    self.todos.clear();
                }
                *current = Some(identity);
                true
            }
            Scope::Shared => false,
        }
    }

    /// Unbind the identity and drop the records that belonged to it.
    pub fn clear_identity(&mut self) -> bool {
        match &mut self.scope {
            Scope::Owner(current) => {
                *current = None;
                self.todos.clear();
                true
            }
            Scope::Shared => false,
        }
    }

    /// Replace the local list with the collection's current contents.
    pub fn load(&mut self) -> Result<Outcome, ApiError> {
        let query = match &self.scope {
            Scope::Shared => Query::all(),
            Scope::Owner(Some(identity)) => Query::all()
                .where_owner(identity.as_str())
                .order_by(OrderBy::CreatedAtAsc),
            Scope::Owner(None) => return Ok(skip("load", SkipReason::NoIdentity)),
        };

        let fetched = self.collection.fetch(&query)?;
        let todos = fetched
            .into_iter()
            .map(Todo::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        info!("event=todo_load module=store status=ok count={}", todos.len());
        self.todos = todos;
        Ok(Outcome::Applied)
    }

    /// Insert a new incomplete record and append it once the collection has
    /// assigned its id.
    pub fn create(&mut self, text: &str) -> Result<Outcome, ApiError> {
        if text.trim().is_empty() {
            return Ok(skip("create", SkipReason::EmptyText));
        }
        let owner = match &self.scope {
            Scope::Shared => None,
            Scope::Owner(Some(identity)) => Some(identity.clone()),
            Scope::Owner(None) => return Ok(skip("create", SkipReason::NoIdentity)),
        };

        let created_at = (self.clock)();
        let input = NewTodo {
            text: text.to_string(),
            completed: false,
            created_at: created_at.into(),
            owner: owner.clone(),
        };
        let id = self.collection.insert(&input).map_err(|err| {
            warn!("event=todo_create module=store status=error error={err}");
            err
        })?;

        self.todos.push(Todo {
            id,
            text: input.text,
            completed: false,
            created_at,
            owner,
        });
        info!("event=todo_create module=store status=ok id={id}");
        Ok(Outcome::Applied)
    }

    /// Flip `completed` on one record, locally and then remotely.
    pub fn toggle(&mut self, id: Uuid) -> Result<Outcome, ApiError> {
        let index = match self.writable_index(id) {
            Ok(index) => index,
            Err(reason) => return Ok(skip("toggle", reason)),
        };

        let completed = !self.todos[index].completed;
        self.todos[index].completed = completed;

        if let Err(err) = self.collection.update(id, &UpdateTodo::completed(completed)) {
            return Err(self.reconcile_after("toggle", err));
        }
        info!("event=todo_toggle module=store status=ok id={id} completed={completed}");
        Ok(Outcome::Applied)
    }

    /// Remove one record, locally and then remotely. A record that is
    /// already gone from the collection counts as deleted.
    pub fn delete(&mut self, id: Uuid) -> Result<Outcome, ApiError> {
        let index = match self.writable_index(id) {
            Ok(index) => index,
            Err(reason) => return Ok(skip("delete", reason)),
        };

        self.todos.remove(index);

        match self.collection.delete(id) {
            Ok(()) => {}
            Err(ApiError::NotFound) => {
                warn!("event=todo_delete module=store status=ok id={id} remote=already_deleted");
            }
            Err(err) => return Err(self.reconcile_after("delete", err)),
        }
        info!("event=todo_delete module=store status=ok id={id}");
        Ok(Outcome::Applied)
    }

    /// Hide completed records if any are visible; otherwise re-load the
    /// full list from the collection.
    pub fn toggle_completed_filter(&mut self) -> Result<Visibility, ApiError> {
        if self.todos.iter().any(|todo| todo.completed) {
            self.todos.retain(|todo| !todo.completed);
            debug!(
                "event=todo_filter module=store status=ok visibility=hiding_completed count={}",
                self.todos.len()
            );
            return Ok(Visibility::HidingCompleted);
        }
        self.load()?;
        Ok(Visibility::ShowingAll)
    }

    /// Index of the record `id` if the acting identity may modify it.
    fn writable_index(&self, id: Uuid) -> Result<usize, SkipReason> {
        let index = self
            .todos
            .iter()
            .position(|todo| todo.id == id)
            .ok_or(SkipReason::NotFound)?;
        match &self.scope {
            Scope::Shared => Ok(index),
            Scope::Owner(None) => Err(SkipReason::NoIdentity),
            Scope::Owner(Some(identity)) => {
                if self.todos[index].owner.as_ref() == Some(identity) {
                    Ok(index)
                } else {
                    Err(SkipReason::NotOwner)
                }
            }
        }
    }

    fn reconcile_after(&mut self, op: &str, err: ApiError) -> ApiError {
        warn!("event=todo_{op} module=store status=error error={err}");
        if self.reconcile == Reconcile::Reload {
            match self.load() {
                Ok(_) => info!("event=todo_reconcile module=store status=ok op={op}"),
                Err(reload_err) => {
                    warn!("event=todo_reconcile module=store status=error op={op} error={reload_err}")
                }
            }
        }
        err
    }
}

fn skip(op: &str, reason: SkipReason) -> Outcome {
    debug!(
        "event=todo_{op} module=store status=skipped reason={}",
        reason.as_str()
    );
    Outcome::Skipped(reason)
}
