#![cfg(feature = "server")]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use folio_kernel::domain::config::{ApiConfig, ImagesConfig};
use folio_kernel::server::ApiState;
use folio_media::{api, init};
use tower::ServiceExt;

fn app(dir: &std::path::Path) -> Router {
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .register_slice(init(&ImagesConfig::Local { dir: dir.to_path_buf() }).expect("media slice"))
        .build()
        .expect("state");
    let (router, _api) = api::router().with_state(state).split_for_parts();
    router
}

async fn get(router: Router, uri: &str) -> axum::response::Response {
    router.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request")).await.expect("infallible")
}

#[tokio::test]
async fn serves_nested_images() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join("alpha")).expect("mkdir");
    std::fs::write(dir.path().join("alpha").join("cover.gif"), b"GIF89a").expect("write");

    let response = get(app(dir.path()), "/api/images/alpha/cover.gif").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/gif")
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    assert_eq!(&body[..], b"GIF89a");
}

#[tokio::test]
async fn missing_image_is_404() {
    let dir = tempfile::tempdir().expect("tempdir");
    let response = get(app(dir.path()), "/api/images/none.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(json["code"], "NOT_FOUND");
}
