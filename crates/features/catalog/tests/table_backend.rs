use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use folio_catalog::repository::{ProjectRepository, TableProjectRepository};
use folio_catalog::{CatalogError, ErrorKind};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;

const ACCOUNT: &str = "devstoreaccount1";

/// In-memory stand-in for the table service, one entity per page.
#[derive(Clone)]
struct FakeTable {
    entities: Arc<Vec<Value>>,
    create_calls: Arc<AtomicUsize>,
    table_exists: bool,
}

fn entities() -> Vec<Value> {
    vec![
        json!({
            "PartitionKey": "projects",
            "RowKey": "alpha",
            "Timestamp": "2024-05-01T10:00:00Z",
            "title": "Alpha",
            "repo_url": "https://example.com/alpha.git",
            "description": "Column layout",
            "demo_url": "https://alpha.example.com",
            "exclude_paths": "[\"x\",\"y\"]",
        }),
        json!({
            "PartitionKey": "projects",
            "RowKey": "beta",
            "data": json!({
                "id": "beta",
                "title": "Beta",
                "image": "beta.png",
                "repo_url": "https://example.com/beta.git",
                "description": "Blob layout",
                "demo_url": "https://beta.example.com",
            }).to_string(),
        }),
        json!({
            "PartitionKey": "projects",
            "RowKey": "gamma",
            "title": "Gamma",
            "repo_url": "https://example.com/gamma.git",
            "description": "Broken exclusions",
            "demo_url": "https://gamma.example.com",
            "exclude_paths": "not-json",
        }),
    ]
}

async fn create_table(State(fake): State<FakeTable>, body: axum::Json<Value>) -> StatusCode {
    fake.create_calls.fetch_add(1, Ordering::SeqCst);
    assert_eq!(body.0["TableName"], "projects");
    if fake.table_exists { StatusCode::CONFLICT } else { StatusCode::NO_CONTENT }
}

fn not_found() -> Response {
    let body = json!({ "odata.error": { "code": "ResourceNotFound", "message": { "value": "missing" } } });
    (StatusCode::NOT_FOUND, axum::Json(body)).into_response()
}

async fn resource(
    State(fake): State<FakeTable>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if resource == "projects()" {
        if query.get("$filter").map(String::as_str) != Some("PartitionKey eq 'projects'") {
            return StatusCode::BAD_REQUEST.into_response();
        }
        let index = query.get("NextRowKey").and_then(|k| k.parse::<usize>().ok()).unwrap_or(0);
        let page: Vec<Value> = fake.entities.get(index).cloned().into_iter().collect();

        let mut headers = HeaderMap::new();
        if index + 1 < fake.entities.len() {
            headers.insert("x-ms-continuation-NextPartitionKey", HeaderValue::from_static("projects"));
            headers.insert(
                "x-ms-continuation-NextRowKey",
                HeaderValue::from_str(&(index + 1).to_string()).expect("header"),
            );
        }
        return (headers, axum::Json(json!({ "value": page }))).into_response();
    }

    let Some(row_key) = resource
        .strip_prefix("projects(PartitionKey='projects',RowKey='")
        .and_then(|rest| rest.strip_suffix("')"))
    else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let row_key = row_key.replace("''", "'");

    fake.entities
        .iter()
        .find(|entity| entity["RowKey"] == row_key.as_str())
        .map_or_else(not_found, |entity| axum::Json(entity.clone()).into_response())
}

async fn serve(fake: FakeTable) -> SocketAddr {
    let app = Router::new()
        .route(&format!("/{ACCOUNT}/Tables"), post(create_table))
        .route(&format!("/{ACCOUNT}/{{resource}}"), get(resource))
        .with_state(fake);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake table server");
    });
    addr
}

async fn repository(table_exists: bool) -> (TableProjectRepository, Arc<AtomicUsize>) {
    repository_with(entities(), table_exists).await
}

async fn repository_with(
    entities: Vec<Value>,
    table_exists: bool,
) -> (TableProjectRepository, Arc<AtomicUsize>) {
    let create_calls = Arc::new(AtomicUsize::new(0));
    let fake = FakeTable { entities: Arc::new(entities), create_calls: create_calls.clone(), table_exists };
    let addr = serve(fake).await;

    let endpoint = format!("http://{addr}/{ACCOUNT}");
    let repository = TableProjectRepository::connect(&endpoint, "projects", "projects", None)
        .await
        .expect("connect");
    (repository, create_calls)
}

#[tokio::test]
async fn lists_every_page_and_both_layouts() {
    let (repository, create_calls) = repository(false).await;
    assert_eq!(create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(repository.backend(), "table");

    let projects = repository.list_projects().await.expect("list");
    let ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["alpha", "beta", "gamma"]);

    assert_eq!(projects[0].exclude_paths(), ["x", "y"]);
    assert_eq!(projects[1].image.as_deref(), Some("beta.png"));
    assert!(projects[2].exclude_paths().is_empty());
}

#[tokio::test]
async fn existing_table_is_not_an_error() {
    let (repository, create_calls) = repository(true).await;
    assert_eq!(create_calls.load(Ordering::SeqCst), 1);
    assert!(repository.get_project("alpha").await.expect("get").is_some());
}

#[tokio::test]
async fn get_decodes_and_reports_missing() {
    let (repository, _) = repository(false).await;

    let alpha = repository.get_project("alpha").await.expect("get").expect("present");
    assert_eq!(alpha.title, "Alpha");
    assert_eq!(alpha.exclude_paths(), ["x", "y"]);

    let gamma = repository.get_project("gamma").await.expect("lenient").expect("present");
    assert_eq!(gamma.exclude_paths, Some(Vec::new()));

    assert!(repository.get_project("zeta").await.expect("get").is_none());
    assert!(repository.get_project("o'brien").await.expect("get").is_none());
}

#[tokio::test]
async fn service_failures_are_storage_errors() {
    let app = Router::new().fallback(|| async {
        let body = json!({ "odata.error": { "code": "AuthorizationFailure" } });
        (StatusCode::FORBIDDEN, axum::Json(body))
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake table server");
    });

    let err = TableProjectRepository::connect(&format!("http://{addr}/{ACCOUNT}"), "projects", "projects", None)
        .await
        .expect_err("forbidden");
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(err.to_string().contains("AuthorizationFailure"));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_storage_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = TableProjectRepository::connect(&format!("http://{addr}/{ACCOUNT}"), "projects", "projects", None)
        .await
        .expect_err("connection refused");
    assert!(matches!(err, CatalogError::Http { .. }));
    assert_eq!(err.kind(), ErrorKind::Storage);
}

#[tokio::test]
async fn missing_title_fails_list_and_get() {
    let untitled = json!({
        "PartitionKey": "projects",
        "RowKey": "delta",
        "repo_url": "https://example.com/delta.git",
        "description": "No title column",
        "demo_url": "https://delta.example.com",
    });
    let (repository, _) = repository_with(vec![untitled], false).await;

    let err = repository.list_projects().await.expect_err("invalid entity");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("title"));

    let err = repository.get_project("delta").await.expect_err("invalid entity");
    assert!(matches!(err, CatalogError::Validation { .. }));
}

/// A table service whose table was dropped after startup.
async fn dropped_table(Path(resource): Path<String>) -> Response {
    if resource.contains("RowKey='bare'") {
        return StatusCode::NOT_FOUND.into_response();
    }
    let body = json!({ "odata.error": { "code": "TableNotFound", "message": { "value": "gone" } } });
    (StatusCode::NOT_FOUND, axum::Json(body)).into_response()
}

#[tokio::test]
async fn only_a_missing_entity_reads_as_absent() {
    let app = Router::new()
        .route(&format!("/{ACCOUNT}/Tables"), post(|| async { StatusCode::NO_CONTENT }))
        .route(&format!("/{ACCOUNT}/{{resource}}"), get(dropped_table));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake table server");
    });

    let repository =
        TableProjectRepository::connect(&format!("http://{addr}/{ACCOUNT}"), "projects", "projects", None)
            .await
            .expect("connect");

    let err = repository.get_project("alpha").await.expect_err("table is gone");
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(err.to_string().contains("TableNotFound"));

    let err = repository.list_projects().await.expect_err("table is gone");
    assert!(err.to_string().contains("TableNotFound"));

    assert!(repository.get_project("bare").await.expect("empty 404 body").is_none());
}
