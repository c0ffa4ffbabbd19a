#![cfg(feature = "server")]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use folio_catalog::{Catalog, api, init};
use folio_kernel::domain::config::{ApiConfig, BackendConfig, CatalogConfig};
use folio_kernel::server::ApiState;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app(store: &std::path::Path) -> Router {
    let projects = store.join("projects");
    std::fs::create_dir(&projects).expect("mkdir");
    std::fs::write(
        projects.join("b.json"),
        json!({
            "id": "b",
            "title": "B",
            "repo_url": "https://example.com/b.git",
            "description": "Second",
            "demo_url": "https://b.example.com",
            "exclude_paths": ["img/"],
        })
        .to_string(),
    )
    .expect("write");
    std::fs::write(store.join("omit.json"), r#"["secret/"]"#).expect("write");

    let config = CatalogConfig {
        backend: BackendConfig::Files { dir: projects },
        omissions_path: Some(store.join("omit.json")),
    };
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .register_slice(init(&config).await.expect("catalog slice"))
        .build()
        .expect("state");
    assert!(state.get_slice::<Catalog>().is_some());

    let (router, _api) = api::router().with_state(state).split_for_parts();
    router
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("infallible");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&body).expect("json body"))
}

#[tokio::test]
async fn list_returns_effective_exclusions() {
    let store = tempfile::tempdir().expect("tempdir");
    let (status, body) = get(app(store.path()).await, "/api/projects").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "b");
    assert_eq!(body[0]["exclude_paths"], json!(["img/"]));
    assert_eq!(body[0]["effective_exclude_paths"], json!(["img/", "secret/"]));
}

#[tokio::test]
async fn unknown_project_is_404() {
    let store = tempfile::tempdir().expect("tempdir");
    let (status, body) = get(app(store.path()).await, "/api/projects/zzz").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn single_project_and_global_omissions() {
    let store = tempfile::tempdir().expect("tempdir");
    let router = app(store.path()).await;

    let (status, body) = get(router.clone(), "/api/projects/b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "B");

    let (status, body) = get(router, "/api/global-omissions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["secret/"]));
}

#[tokio::test]
async fn invalid_record_is_500() {
    let store = tempfile::tempdir().expect("tempdir");
    let router = app(store.path()).await;
    std::fs::write(store.path().join("projects").join("bad.json"), r#"{"id": "bad"}"#).expect("write");

    let (status, body) = get(router, "/api/projects/bad").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INVALID_RECORD");
}
