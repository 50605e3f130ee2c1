//! Admin endpoints: machine table and the machine editor form

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use axum_extra::extract::Multipart;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        views::{AdminMachineRow, EditorView},
        DraftPatch, ImageUpload, MachineRecord,
    },
    AppState,
};

use super::page_response;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    /// Must be `true`; the browser asks the user first
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OpenDraftRequest {
    /// Machine to edit; a new machine when absent
    pub machine_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SubmitResponse {
    pub machine: MachineRecord,
    pub editor: EditorView,
}

/// Rows of the admin machines table
#[utoipa::path(
    get,
    path = "/admin/machines",
    tag = "admin",
    responses(
        (status = 200, description = "Machine rows", body = [AdminMachineRow]),
        (status = 404, description = "Machines could not be fetched")
    )
)]
pub async fn list_machines(State(state): State<AppState>) -> Response {
    page_response(state.services.catalog.admin_rows().await)
}

/// Delete a machine
#[utoipa::path(
    delete,
    path = "/admin/machines/{id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "Machine ID"),
        DeleteQuery
    ),
    responses(
        (status = 204, description = "Machine deleted"),
        (status = 400, description = "Deletion not confirmed"),
        (status = 502, description = "Backend refused the deletion")
    )
)]
pub async fn delete_machine(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete(&id, query.confirm).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Open an editor session, empty or seeded from an existing machine
#[utoipa::path(
    post,
    path = "/admin/drafts",
    tag = "admin",
    request_body = OpenDraftRequest,
    responses(
        (status = 201, description = "Editor opened", body = EditorView),
        (status = 404, description = "Machine not found")
    )
)]
pub async fn open_draft(
    State(state): State<AppState>,
    Json(request): Json<OpenDraftRequest>,
) -> AppResult<(StatusCode, Json<EditorView>)> {
    let view = state
        .services
        .drafts
        .open(request.machine_id.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Current state of an editor session
#[utoipa::path(
    get,
    path = "/admin/drafts/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Editor session ID")),
    responses(
        (status = 200, description = "Editor state", body = EditorView),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Save in progress")
    )
)]
pub async fn get_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EditorView>> {
    Ok(Json(state.services.drafts.view(id).await?))
}

/// Edit form fields
#[utoipa::path(
    patch,
    path = "/admin/drafts/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Editor session ID")),
    request_body = DraftPatch,
    responses(
        (status = 200, description = "Editor state", body = EditorView),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Save in progress")
    )
)]
pub async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<DraftPatch>,
) -> AppResult<Json<EditorView>> {
    Ok(Json(state.services.drafts.update(id, patch).await?))
}

/// Close an editor session and release its previews
#[utoipa::path(
    delete,
    path = "/admin/drafts/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Editor session ID")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn close_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.drafts.close(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add selected image files to the form
#[utoipa::path(
    post,
    path = "/admin/drafts/{id}/images",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Editor session ID")),
    request_body(content_type = "multipart/form-data", description = "One `images` part per file"),
    responses(
        (status = 200, description = "Editor state", body = EditorView),
        (status = 400, description = "Too many images or malformed upload"),
        (status = 409, description = "Save in progress")
    )
)]
pub async fn add_images(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<EditorView>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some("images") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;

        files.push(ImageUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    Ok(Json(state.services.drafts.select_files(id, files).await?))
}

/// Remove an image by its position in the form
#[utoipa::path(
    delete,
    path = "/admin/drafts/{id}/images/{index}",
    tag = "admin",
    params(
        ("id" = Uuid, Path, description = "Editor session ID"),
        ("index" = usize, Path, description = "Position in display order")
    ),
    responses(
        (status = 200, description = "Editor state", body = EditorView),
        (status = 400, description = "No image at that position"),
        (status = 409, description = "Save in progress")
    )
)]
pub async fn remove_image(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> AppResult<Json<EditorView>> {
    Ok(Json(state.services.drafts.remove_image(id, index).await?))
}

/// Dismiss the form's banner
#[utoipa::path(
    delete,
    path = "/admin/drafts/{id}/message",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Editor session ID")),
    responses(
        (status = 200, description = "Editor state", body = EditorView),
        (status = 409, description = "Save in progress")
    )
)]
pub async fn dismiss_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EditorView>> {
    Ok(Json(state.services.drafts.dismiss_message(id).await?))
}

/// Upload pending images and save the machine
#[utoipa::path(
    post,
    path = "/admin/drafts/{id}/submit",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Editor session ID")),
    responses(
        (status = 200, description = "Machine saved", body = SubmitResponse),
        (status = 409, description = "Save already in progress"),
        (status = 422, description = "Form is invalid"),
        (status = 502, description = "Backend refused the save")
    )
)]
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SubmitResponse>> {
    let (machine, editor) = state.services.drafts.submit(id).await?;
    Ok(Json(SubmitResponse { machine, editor }))
}

/// Abandon the edit and reset the form
#[utoipa::path(
    post,
    path = "/admin/drafts/{id}/cancel",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Editor session ID")),
    responses(
        (status = 200, description = "Editor state", body = EditorView),
        (status = 409, description = "Save in progress")
    )
)]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EditorView>> {
    Ok(Json(state.services.drafts.cancel(id).await?))
}
