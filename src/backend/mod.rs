//! Backend collaborator for machine persistence and image hosting

pub mod http;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{ImageUpload, MachinePayload, MachineRecord},
};

pub use http::HttpBackend;

/// Operations the site consumes from the backend REST API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MachineBackend: Send + Sync {
    /// List every machine, in backend order
    async fn list_machines(&self) -> AppResult<Vec<MachineRecord>>;

    /// Fetch a single machine; `None` when the backend does not know it
    async fn get_machine(&self, id: &str) -> AppResult<Option<MachineRecord>>;

    async fn create_machine(&self, payload: &MachinePayload) -> AppResult<MachineRecord>;

    /// Replace a machine record entirely
    async fn update_machine(&self, id: &str, payload: &MachinePayload) -> AppResult<MachineRecord>;

    async fn delete_machine(&self, id: &str) -> AppResult<()>;

    /// Upload a batch of images, returning hosted URLs in input order
    async fn upload_images(&self, files: Vec<ImageUpload>) -> AppResult<Vec<String>>;
}
