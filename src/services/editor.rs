//! Admin record editor
//!
//! Holds the draft of one machine together with the images already persisted
//! and the files picked locally but not yet uploaded. Submitting uploads the
//! pending files in one batch and saves the whole record.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use tokio::sync::watch;
use uuid::Uuid;
use validator::Validate;

use crate::{
    backend::MachineBackend,
    error::{AppError, AppResult},
    models::{
        views::{EditorImage, EditorMessage, EditorStatus, EditorView},
        DraftPatch, ImageUpload, MachineDraft, MachinePayload, MachineRecord,
    },
    services::previews::{PreviewHandle, PreviewRegistry},
};

/// Markup the rich-text widget produces when the user clears it
const EMPTY_MARKUP: &str = "<p><br></p>";

pub const DESCRIPTION_REQUIRED: &str = "Description is mandatory";
pub const LOCATION_REQUIRED: &str = "Location is mandatory (min 2 characters)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { id: String },
}

#[derive(Debug)]
struct PendingImage {
    upload: ImageUpload,
    preview: PreviewHandle,
}

pub struct AdminEditor {
    mode: EditorMode,
    draft: MachineDraft,
    existing_image_urls: Vec<String>,
    pending: Vec<PendingImage>,
    status: watch::Sender<EditorStatus>,
    message: Option<EditorMessage>,
    previews: Arc<dyn PreviewRegistry>,
    max_images: usize,
}

fn is_description_empty(condition: &str) -> bool {
    let trimmed = condition.trim();
    trimmed.is_empty() || trimmed == EMPTY_MARKUP
}

fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid machine data".to_string())
}

impl AdminEditor {
    /// Editor for a new machine
    pub fn new(previews: Arc<dyn PreviewRegistry>, max_images: usize) -> Self {
        Self {
            mode: EditorMode::Create,
            draft: MachineDraft::default(),
            existing_image_urls: Vec::new(),
            pending: Vec::new(),
            status: watch::Sender::new(EditorStatus::Idle),
            message: None,
            previews,
            max_images,
        }
    }

    /// Editor seeded from a persisted machine
    pub fn edit(record: &MachineRecord, previews: Arc<dyn PreviewRegistry>, max_images: usize) -> Self {
        let mut editor = Self::new(previews, max_images);
        editor.begin_edit(record);
        editor
    }

    /// Switch to editing `record`, dropping any pending selection
    pub fn begin_edit(&mut self, record: &MachineRecord) {
        self.pending.clear();
        self.mode = EditorMode::Edit { id: record.id.clone() };
        self.draft = MachineDraft::from(record);
        self.existing_image_urls = record.images.clone();
        if self.existing_image_urls.len() > self.max_images {
            tracing::warn!(
                "Machine {} has {} images; keeping the first {}",
                record.id,
                self.existing_image_urls.len(),
                self.max_images
            );
            self.existing_image_urls.truncate(self.max_images);
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn draft(&self) -> &MachineDraft {
        &self.draft
    }

    pub fn existing_image_urls(&self) -> &[String] {
        &self.existing_image_urls
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn status(&self) -> EditorStatus {
        *self.status.borrow()
    }

    /// Follow the save progress without holding the editor
    pub fn watch_status(&self) -> watch::Receiver<EditorStatus> {
        self.status.subscribe()
    }

    fn set_status(&self, status: EditorStatus) {
        self.status.send_replace(status);
    }

    pub fn message(&self) -> Option<&EditorMessage> {
        self.message.as_ref()
    }

    /// Images in display order: persisted first, then pending
    pub fn images(&self) -> Vec<EditorImage> {
        let persisted = self.existing_image_urls.iter().map(|url| (url.as_str(), false));
        let pending = self.pending.iter().map(|p| (p.preview.url(), true));

        persisted
            .chain(pending)
            .enumerate()
            .map(|(index, (url, pending))| EditorImage {
                index,
                url: url.to_string(),
                pending,
            })
            .collect()
    }

    pub fn image_count(&self) -> usize {
        self.existing_image_urls.len() + self.pending.len()
    }

    pub fn update_draft(&mut self, patch: DraftPatch) {
        self.draft.apply(patch);
    }

    pub fn dismiss_message(&mut self) {
        self.message = None;
    }

    fn fail(&mut self, error: AppError) -> AppError {
        self.message = Some(EditorMessage::error(error.user_message()));
        error
    }

    /// Queue files for upload, generating a local preview for each.
    ///
    /// Rejected as a whole when the total would exceed the image limit.
    pub fn select_files(&mut self, files: Vec<ImageUpload>) -> AppResult<()> {
        if files.is_empty() {
            return Ok(());
        }

        if self.image_count() + files.len() > self.max_images {
            return Err(self.fail(AppError::Validation(format!(
                "Maximum {} images allowed",
                self.max_images
            ))));
        }

        for upload in files {
            let preview = PreviewHandle::create(&self.previews, &upload);
            tracing::debug!("Selected {} as {}", upload.file_name, preview.url());
            self.pending.push(PendingImage { upload, preview });
        }
        self.message = None;
        Ok(())
    }

    /// Remove the image at `index` in display order
    pub fn remove_image(&mut self, index: usize) -> AppResult<()> {
        let persisted = self.existing_image_urls.len();

        if index < persisted {
            self.existing_image_urls.remove(index);
        } else if index - persisted < self.pending.len() {
            // Dropping the entry releases its preview
            self.pending.remove(index - persisted);
        } else {
            return Err(AppError::BadRequest(format!("No image at position {}", index)));
        }
        Ok(())
    }

    /// Check the mandatory fields, reporting the first failure
    pub fn validate(&self) -> AppResult<()> {
        if is_description_empty(&self.draft.condition) {
            return Err(AppError::Validation(DESCRIPTION_REQUIRED.to_string()));
        }
        if self.draft.location.trim().chars().count() < 2 {
            return Err(AppError::Validation(LOCATION_REQUIRED.to_string()));
        }
        Ok(())
    }

    /// Build the backend payload from the draft and the persisted images
    pub fn build_payload(&self) -> AppResult<MachinePayload> {
        let current_year = i64::from(Utc::now().year());

        let year = self
            .draft
            .year
            .to_i64()
            .ok_or_else(|| AppError::Validation("Year must be a number".to_string()))?;
        if year > current_year {
            return Err(AppError::Validation(format!(
                "Year cannot be later than {}",
                current_year
            )));
        }

        let hours = self
            .draft
            .hours
            .to_i64()
            .ok_or_else(|| AppError::Validation("Hours must be a number".to_string()))?;
        let hours = u64::try_from(hours)
            .map_err(|_| AppError::Validation("Hours cannot be negative".to_string()))?;

        let payload = MachinePayload {
            title: self.draft.title.clone(),
            model: self.draft.model.clone(),
            category: self.draft.category.clone(),
            purpose: self.draft.purpose,
            year: i32::try_from(year)
                .map_err(|_| AppError::Validation("Year is out of range".to_string()))?,
            hours,
            condition: self.draft.condition.trim().to_string(),
            description: self.draft.description.clone(),
            location: self.draft.location.trim().to_string(),
            images: self.existing_image_urls.clone(),
            status: self.draft.status,
            specifications: self.draft.specifications.clone(),
        };

        payload
            .validate()
            .map_err(|e| AppError::Validation(first_validation_message(&e)))?;

        Ok(payload)
    }

    /// Validate, upload pending files and save the record.
    ///
    /// On success the editor returns to an empty create form. On failure the
    /// draft is kept as is so the user can retry; images uploaded before the
    /// failure stay on the image host.
    pub async fn submit(&mut self, backend: &dyn MachineBackend) -> AppResult<MachineRecord> {
        if self.status() != EditorStatus::Idle {
            return Err(AppError::Conflict("Save already in progress".to_string()));
        }

        let payload = match self.validate().and_then(|_| self.build_payload()) {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(e)),
        };

        self.message = None;
        let result = self.persist(backend, payload).await;
        self.set_status(EditorStatus::Idle);

        match result {
            Ok(saved) => {
                let text = match self.mode {
                    EditorMode::Create => "Machine added successfully",
                    EditorMode::Edit { .. } => "Machine updated successfully",
                };
                tracing::info!("Saved machine {} ({})", saved.id, saved.title);
                self.reset();
                self.message = Some(EditorMessage::success(text));
                Ok(saved)
            }
            Err(e) => {
                tracing::error!("Error saving machine: {}", e);
                Err(self.fail(e))
            }
        }
    }

    async fn persist(
        &mut self,
        backend: &dyn MachineBackend,
        mut payload: MachinePayload,
    ) -> AppResult<MachineRecord> {
        if !self.pending.is_empty() {
            self.set_status(EditorStatus::Uploading);
            let files = self.pending.iter().map(|p| p.upload.clone()).collect();
            let uploaded = backend.upload_images(files).await?;
            payload.images.extend(uploaded);
        }

        self.set_status(EditorStatus::Saving);
        match &self.mode {
            EditorMode::Create => backend.create_machine(&payload).await,
            EditorMode::Edit { id } => backend.update_machine(id, &payload).await,
        }
    }

    fn reset(&mut self) {
        self.mode = EditorMode::Create;
        self.draft = MachineDraft::default();
        self.existing_image_urls.clear();
        self.pending.clear();
    }

    /// Discard the draft and every pending selection
    pub fn cancel(&mut self) {
        self.reset();
        self.message = None;
    }

    pub fn view(&self, session_id: Uuid) -> EditorView {
        let (heading, editing_id) = match &self.mode {
            EditorMode::Create => ("Add New Machine", None),
            EditorMode::Edit { id } => ("Edit Machine", Some(id.clone())),
        };

        EditorView {
            session_id,
            heading: heading.to_string(),
            editing_id,
            draft: self.draft.clone(),
            images: self.images(),
            remaining_slots: self.max_images.saturating_sub(self.image_count()),
            status: self.status(),
            message: self.message.clone(),
        }
    }
}
