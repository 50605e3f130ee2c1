//! Local previews of images selected in the editor but not yet uploaded

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// Serve a preview's bytes
#[utoipa::path(
    get,
    path = "/previews/{token}",
    tag = "admin",
    params(("token" = Uuid, Path, description = "Preview token")),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "Preview released or unknown")
    )
)]
pub async fn get_preview(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let preview = state
        .services
        .previews
        .get(token)
        .ok_or_else(|| AppError::NotFound(format!("Preview {} not found", token)))?;

    Ok(([(header::CONTENT_TYPE, preview.content_type)], preview.bytes))
}
