//! API handlers for Heavy Horizon REST endpoints

pub mod admin;
pub mod health;
pub mod machines;
pub mod openapi;
pub mod previews;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{models::views::PageState, AppState};

/// Render a fetched page; anything but a loaded page answers 404
pub fn page_response<T: Serialize>(page: PageState<T>) -> Response {
    let status = if page.is_loaded() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Json(page)).into_response()
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = state.config.editor.max_upload_mb * 1024 * 1024;

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/machines", get(machines::list_all))
        .route("/categories", get(machines::categories))
        .route("/:section/machines", get(machines::list_section))
        .route("/:section/machines/:id", get(machines::detail))
        .route("/:section/machines/:id/enquiry", get(machines::enquiry))
        // Admin
        .route("/admin/machines", get(admin::list_machines))
        .route("/admin/machines/:id", delete(admin::delete_machine))
        .route("/admin/drafts", post(admin::open_draft))
        .route(
            "/admin/drafts/:id",
            get(admin::get_draft)
                .patch(admin::update_draft)
                .delete(admin::close_draft),
        )
        .route(
            "/admin/drafts/:id/images",
            post(admin::add_images).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/admin/drafts/:id/images/:index", delete(admin::remove_image))
        .route("/admin/drafts/:id/message", delete(admin::dismiss_message))
        .route("/admin/drafts/:id/submit", post(admin::submit))
        .route("/admin/drafts/:id/cancel", post(admin::cancel))
        // Previews
        .route("/previews/:token", get(previews::get_preview))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
