//! Heavy Horizon catalog server
//!
//! Serves the public machine catalog (rental and sales listings, detail pages
//! with image galleries, enquiry links) and the admin machine editor as a JSON
//! view API, on top of the backend REST service that owns the records.

use std::sync::Arc;

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod gallery;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
