//! Image route.

use crate::Media;
use crate::error::MediaError;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use folio_derive::api_handler;
use folio_kernel::domain::constants::MEDIA_TAG;
use folio_kernel::server::{ApiError, ApiErrorBody, ApiResult, ApiState};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(get_image))
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Remote { .. } | MediaError::Http { .. } => Self::bad_gateway(err.to_string()),
            MediaError::Io { .. } | MediaError::Internal { .. } => Self::internal(err.to_string()),
        }
    }
}

#[api_handler(
    get,
    path = "/api/images/{*name}",
    params(("name" = String, Path, description = "Image path relative to the image store")),
    responses(
        (status = OK, description = "Image bytes", content_type = "application/octet-stream", body = Vec<u8>),
        (status = NOT_FOUND, description = "No such image", body = ApiErrorBody),
        (status = BAD_GATEWAY, description = "Blob storage failed", body = ApiErrorBody),
    ),
    tag = MEDIA_TAG,
)]
pub(crate) async fn get_image(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let media = state.try_get_slice::<Media>()?;
    let image = media
        .store
        .fetch(&name)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Image '{name}' not found")))?;

    Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes))
}
