//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, health, machines, previews};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Heavy Horizon API",
        version = "1.0.0",
        description = "Heavy equipment catalog and admin editor view API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        machines::list_all,
        machines::list_section,
        machines::categories,
        machines::detail,
        machines::enquiry,
        // Admin
        admin::list_machines,
        admin::delete_machine,
        admin::open_draft,
        admin::get_draft,
        admin::update_draft,
        admin::close_draft,
        admin::add_images,
        admin::remove_image,
        admin::dismiss_message,
        admin::submit,
        admin::cancel,
        previews::get_preview,
    ),
    components(
        schemas(
            // Records
            crate::models::MachineRecord,
            crate::models::MachineDraft,
            crate::models::DraftPatch,
            crate::models::MachinePayload,
            crate::models::NumericInput,
            crate::models::Purpose,
            crate::models::Section,
            crate::models::MachineStatus,
            // Views
            crate::models::views::GallerySlot,
            crate::models::views::GalleryControls,
            crate::models::views::GalleryView,
            crate::models::views::MachineCardView,
            crate::models::views::SpecEntry,
            crate::models::views::BackLink,
            crate::models::views::MachineDetailView,
            crate::models::views::CategoryCardView,
            crate::models::views::EnquiryModalSeed,
            crate::models::views::EnquiryActions,
            crate::models::views::AdminMachineRow,
            crate::models::views::EditorStatus,
            crate::models::views::MessageKind,
            crate::models::views::EditorMessage,
            crate::models::views::EditorImage,
            crate::models::views::EditorView,
            // Admin
            admin::OpenDraftRequest,
            admin::SubmitResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Public machine catalog"),
        (name = "admin", description = "Machine administration and editor")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
