//! Business logic services

pub mod catalog;
pub mod drafts;
pub mod editor;
pub mod enquiry;
pub mod previews;

use std::{sync::Arc, time::Duration};

use crate::{backend::MachineBackend, config::AppConfig};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub drafts: drafts::DraftsService,
    pub previews: Arc<previews::PreviewStore>,
}

impl Services {
    /// Create all services on top of the given backend
    pub fn new(backend: Arc<dyn MachineBackend>, config: &AppConfig) -> Self {
        let enquiry = enquiry::EnquiryService::new(config.enquiry.clone());
        let previews = Arc::new(previews::PreviewStore::new(&config.editor.preview_base_path));

        Self {
            catalog: catalog::CatalogService::new(
                backend.clone(),
                config.catalog.clone(),
                enquiry,
            ),
            drafts: drafts::DraftsService::new(
                backend,
                previews.clone(),
                config.editor.max_images,
                Duration::from_secs(config.editor.session_ttl_seconds),
            ),
            previews,
        }
    }
}
