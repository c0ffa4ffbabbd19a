//! HTTP handlers for the catalog.

use crate::Catalog;
use crate::error::{CatalogError, ErrorKind};
use crate::model::ProjectView;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use folio_derive::api_handler;
use folio_kernel::domain::constants::CATALOG_TAG;
use folio_kernel::server::{ApiError, ApiErrorBody, ApiResult, ApiState};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Catalog routes, mounted under `/api`.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(list_projects))
        .routes(routes!(get_project))
        .routes(routes!(global_omissions))
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err.kind() {
            ErrorKind::Validation => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INVALID_RECORD", err.to_string())
            },
            ErrorKind::Storage => Self::service_unavailable("STORAGE_UNAVAILABLE", err.to_string()),
        }
    }
}

#[api_handler(
    get,
    path = "/api/projects",
    responses(
        (status = OK, description = "All projects ordered by id", body = [ProjectView]),
        (status = INTERNAL_SERVER_ERROR, description = "A stored record is invalid", body = ApiErrorBody),
        (status = SERVICE_UNAVAILABLE, description = "Project storage unavailable", body = ApiErrorBody),
    ),
    tag = CATALOG_TAG,
)]
pub(crate) async fn list_projects(State(state): State<ApiState>) -> ApiResult<Json<Vec<ProjectView>>> {
    let catalog = state.try_get_slice::<Catalog>()?;
    Ok(Json(catalog.service.list_projects().await?))
}

#[api_handler(
    get,
    path = "/api/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = OK, description = "The project", body = ProjectView),
        (status = NOT_FOUND, description = "Unknown project id", body = ApiErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "The stored record is invalid", body = ApiErrorBody),
        (status = SERVICE_UNAVAILABLE, description = "Project storage unavailable", body = ApiErrorBody),
    ),
    tag = CATALOG_TAG,
)]
pub(crate) async fn get_project(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProjectView>> {
    let catalog = state.try_get_slice::<Catalog>()?;
    catalog
        .service
        .get_project(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Project '{id}' not found")))
}

#[api_handler(
    get,
    path = "/api/global-omissions",
    responses(
        (status = OK, description = "Paths hidden from every project", body = [String]),
        (status = INTERNAL_SERVER_ERROR, description = "The omissions file is invalid", body = ApiErrorBody),
        (status = SERVICE_UNAVAILABLE, description = "The omissions file is unreadable", body = ApiErrorBody),
    ),
    tag = CATALOG_TAG,
)]
pub(crate) async fn global_omissions(State(state): State<ApiState>) -> ApiResult<Json<Vec<String>>> {
    let catalog = state.try_get_slice::<Catalog>()?;
    Ok(Json(catalog.service.global_omissions().await?))
}
