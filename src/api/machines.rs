//! Public catalog endpoints

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{
        views::{CategoryCardView, EnquiryActions, MachineCardView, MachineDetailView},
        Purpose, Section,
    },
    services::catalog::GalleryRequest,
    AppState,
};

use super::page_response;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Category key, e.g. `excavators`
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoriesQuery {
    /// `Rental` or `Sales`
    pub purpose: Option<Purpose>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DetailQuery {
    /// Gallery position to show
    pub image: Option<usize>,
    /// Comma separated gallery positions that failed to load
    pub failed: Option<String>,
    /// Page URL quoted in the enquiry message
    pub page_url: Option<String>,
}

impl DetailQuery {
    /// Gallery request; unparseable entries of `failed` are ignored
    fn gallery(&self) -> GalleryRequest {
        GalleryRequest {
            image: self.image,
            failed: self
                .failed
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect(),
        }
    }
}

/// Every machine, with availability badges
#[utoipa::path(
    get,
    path = "/machines",
    tag = "catalog",
    responses(
        (status = 200, description = "Machine cards", body = [MachineCardView]),
        (status = 404, description = "Machines could not be fetched")
    )
)]
pub async fn list_all(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.catalog.list(None, None).await?;
    Ok(page_response(page))
}

/// Machines of one section, optionally limited to a category
#[utoipa::path(
    get,
    path = "/{section}/machines",
    tag = "catalog",
    params(
        ("section" = Section, Path, description = "`services` or `sales`"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Machine cards", body = [MachineCardView]),
        (status = 400, description = "Unknown category"),
        (status = 404, description = "Machines could not be fetched")
    )
)]
pub async fn list_section(
    State(state): State<AppState>,
    Path(section): Path<Section>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let page = state
        .services
        .catalog
        .list(Some(section), query.category.as_deref())
        .await?;
    Ok(page_response(page))
}

/// Category tiles with per-category machine counts
#[utoipa::path(
    get,
    path = "/categories",
    tag = "catalog",
    params(CategoriesQuery),
    responses(
        (status = 200, description = "Category tiles", body = [CategoryCardView]),
        (status = 404, description = "Machines could not be fetched")
    )
)]
pub async fn categories(
    State(state): State<AppState>,
    Query(query): Query<CategoriesQuery>,
) -> Response {
    let section = Section::from(query.purpose.unwrap_or_default());
    page_response(state.services.catalog.categories(section).await)
}

/// Detail page of one machine
#[utoipa::path(
    get,
    path = "/{section}/machines/{id}",
    tag = "catalog",
    params(
        ("section" = Section, Path, description = "`services` or `sales`"),
        ("id" = String, Path, description = "Machine ID"),
        DetailQuery
    ),
    responses(
        (status = 200, description = "Machine detail", body = MachineDetailView),
        (status = 404, description = "Machine not found")
    )
)]
pub async fn detail(
    State(state): State<AppState>,
    Path((section, id)): Path<(Section, String)>,
    Query(query): Query<DetailQuery>,
) -> Response {
    let page = state
        .services
        .catalog
        .detail(section, &id, &query.gallery(), query.page_url.as_deref())
        .await;
    page_response(page)
}

/// Enquiry modal seed and contact links for a machine
#[utoipa::path(
    get,
    path = "/{section}/machines/{id}/enquiry",
    tag = "catalog",
    params(
        ("section" = Section, Path, description = "`services` or `sales`"),
        ("id" = String, Path, description = "Machine ID"),
        DetailQuery
    ),
    responses(
        (status = 200, description = "Enquiry actions", body = EnquiryActions),
        (status = 404, description = "Machine not found")
    )
)]
pub async fn enquiry(
    State(state): State<AppState>,
    Path((section, id)): Path<(Section, String)>,
    Query(query): Query<DetailQuery>,
) -> AppResult<Json<EnquiryActions>> {
    let actions = state
        .services
        .catalog
        .enquiry(section, &id, query.page_url.as_deref())
        .await?;
    Ok(Json(actions))
}
