use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Document, InsertedId};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn insert_body(text: &str, seconds: i64, owner: Option<&str>) -> String {
    let mut body = serde_json::json!({
        "text": text,
        "completed": false,
        "createdAt": { "seconds": seconds, "nanoseconds": 0 },
    });
    if let Some(owner) = owner {
        body["owner"] = serde_json::Value::String(owner.to_string());
    }
    body.to_string()
}

/// Send one request through a long-lived router so state persists between calls.
async fn send(app: &mut axum::Router, request: Request<String>) -> axum::response::Response {
    use tower::Service;

    ServiceExt::<Request<String>>::ready(app)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let app = app();
    let resp = app.oneshot(get_request("/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Document> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn list_todos_unknown_order_returns_400() {
    let app = app();
    let resp = app
        .oneshot(get_request("/todos?order_by=text"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_todos_filters_by_owner_and_orders_by_created_at() {
    let mut app = app();

    for (text, seconds, owner) in [
        ("alice late", 300, "alice"),
        ("bob", 100, "bob"),
        ("alice early", 200, "alice"),
    ] {
        let resp = send(
            &mut app,
            json_request("POST", "/todos", &insert_body(text, seconds, Some(owner))),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = send(&mut app, get_request("/todos?owner=alice&order_by=created_at")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Document> = body_json(resp).await;
    let texts: Vec<&str> = todos.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["alice early", "alice late"]);

    let resp = send(&mut app, get_request("/todos")).await;
    let todos: Vec<Document> = body_json(resp).await;
    assert_eq!(todos.len(), 3);
}

#[tokio::test]
async fn list_todos_decodes_percent_encoded_owner() {
    let mut app = app();
    let resp = send(
        &mut app,
        json_request("POST", "/todos", &insert_body("spaced", 1, Some("alice smith"))),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&mut app, get_request("/todos?owner=alice%20smith")).await;
    let todos: Vec<Document> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].owner.as_deref(), Some("alice smith"));
}

// --- insert ---

#[tokio::test]
async fn insert_todo_returns_201_with_id() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/todos", &insert_body("Buy milk", 1, None)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let inserted: InsertedId = body_json(resp).await;
    assert!(!inserted.id.is_nil());
}

#[tokio::test]
async fn insert_todo_empty_text_returns_422() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/todos", &insert_body("   ", 1, None)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn insert_todo_malformed_json_returns_422() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/todos", r#"{"not_text":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- update ---

#[tokio::test]
async fn update_todo_not_found() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "PATCH",
            "/todos/00000000-0000-0000-0000-000000000000",
            r#"{"completed":true}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_todo_bad_uuid_returns_400() {
    let app = app();
    let resp = app
        .oneshot(json_request("PATCH", "/todos/not-a-uuid", r#"{"completed":true}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_todo_not_found() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/todos/00000000-0000-0000-0000-000000000000")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn document_lifecycle() {
    let mut app = app();

    // insert
    let resp = send(
        &mut app,
        json_request("POST", "/todos", &insert_body("Walk dog", 42, Some("alice"))),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let InsertedId { id } = body_json(resp).await;

    // list
    let resp = send(&mut app, get_request("/todos?owner=alice")).await;
    let todos: Vec<Document> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, id);
    assert_eq!(todos[0].text, "Walk dog");
    assert_eq!(todos[0].created_at.seconds, 42);
    assert!(!todos[0].completed);

    // partial update of completed only
    let resp = send(
        &mut app,
        json_request("PATCH", &format!("/todos/{id}"), r#"{"completed":true}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Document = body_json(resp).await;
    assert_eq!(updated.text, "Walk dog"); // unchanged
    assert!(updated.completed);

    // empty patch leaves the document alone
    let resp = send(&mut app, json_request("PATCH", &format!("/todos/{id}"), "{}")).await;
    let updated: Document = body_json(resp).await;
    assert!(updated.completed);

    // delete
    let resp = send(
        &mut app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/todos/{id}"))
            .body(String::new())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // list after delete
    let resp = send(&mut app, get_request("/todos")).await;
    let todos: Vec<Document> = body_json(resp).await;
    assert!(todos.is_empty());
}
