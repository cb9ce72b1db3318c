//! In-process document store serving the `todos` collection over HTTP.
//!
//! Stands in for the remote collection the client core talks to. Documents
//! live in a `HashMap`, so an unordered list request returns them in no
//! particular order; callers that need ordering ask for `order_by=created_at`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Point in time as stored by the collection.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: Timestamp,
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateDocument {
    pub completed: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct InsertedId {
    pub id: Uuid,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub owner: Option<String>,
    pub order_by: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Document>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/todos", get(list_todos).post(insert_todo))
        .route("/todos/{id}", patch(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("event=server_start module=server status=ok addr={addr}");
    }
    axum::serve(listener, app()).await
}

async fn list_todos(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Document>>, StatusCode> {
    let ordered = match params.order_by.as_deref() {
        None => false,
        Some("created_at") => true,
        Some(other) => {
            warn!("event=todo_list module=server status=rejected order_by={other}");
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    let todos = db.read().await;
    let mut matching: Vec<Document> = todos
        .values()
        .filter(|doc| match &params.owner {
            Some(owner) => doc.owner.as_ref() == Some(owner),
            None => true,
        })
        .cloned()
        .collect();
    if ordered {
        matching.sort_by_key(|doc| doc.created_at);
    }
    debug!("event=todo_list module=server status=ok count={}", matching.len());
    Ok(Json(matching))
}

async fn insert_todo(
    State(db): State<Db>,
    Json(input): Json<NewDocument>,
) -> Result<(StatusCode, Json<InsertedId>), StatusCode> {
    if input.text.trim().is_empty() {
        warn!("event=todo_insert module=server status=rejected reason=empty_text");
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let doc = Document {
        id: Uuid::new_v4(),
        text: input.text,
        completed: input.completed,
        created_at: input.created_at,
        owner: input.owner,
    };
    let id = doc.id;
    db.write().await.insert(id, doc);
    info!("event=todo_insert module=server status=ok id={id}");
    Ok((StatusCode::CREATED, Json(InsertedId { id })))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateDocument>,
) -> Result<Json<Document>, StatusCode> {
    let mut todos = db.write().await;
    let doc = todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(completed) = input.completed {
        doc.completed = completed;
    }
    info!("event=todo_update module=server status=ok id={id} completed={}", doc.completed);
    Ok(Json(doc.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let mut todos = db.write().await;
    match todos.remove(&id) {
        Some(_) => {
            info!("event=todo_delete module=server status=ok id={id}");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(StatusCode::NOT_FOUND),
    }
}
