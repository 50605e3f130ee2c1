//! Local previews of images selected in the admin editor
//!
//! A preview URL is handed out for every selected file before it is uploaded.
//! Each one is owned by a [`PreviewHandle`] and released exactly once, when
//! the handle is dropped.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock,
    },
};

use axum::body::Bytes;
use uuid::Uuid;

use crate::models::ImageUpload;

/// Issues and releases local preview URLs
pub trait PreviewRegistry: Send + Sync {
    fn create(&self, upload: &ImageUpload) -> String;
    fn release(&self, url: &str);
}

/// Owner of one preview URL; releases it on drop
pub struct PreviewHandle {
    url: String,
    registry: Arc<dyn PreviewRegistry>,
}

impl PreviewHandle {
    pub fn create(registry: &Arc<dyn PreviewRegistry>, upload: &ImageUpload) -> Self {
        Self {
            url: registry.create(upload),
            registry: Arc::clone(registry),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(&self.url);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle").field("url", &self.url).finish()
    }
}

#[derive(Debug, Clone)]
pub struct StoredPreview {
    pub content_type: String,
    pub bytes: Bytes,
}

/// In-memory preview store served under `base_path`
pub struct PreviewStore {
    base_path: String,
    entries: RwLock<HashMap<Uuid, StoredPreview>>,
    created: AtomicUsize,
    released: AtomicUsize,
}

impl PreviewStore {
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
            entries: RwLock::new(HashMap::new()),
            created: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, token: Uuid) -> Option<StoredPreview> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&token)
            .cloned()
    }

    /// Number of previews currently held
    pub fn live(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::Relaxed)
    }

    fn token_of(&self, url: &str) -> Option<Uuid> {
        url.strip_prefix(&self.base_path)?
            .trim_start_matches('/')
            .parse()
            .ok()
    }
}

impl PreviewRegistry for PreviewStore {
    fn create(&self, upload: &ImageUpload) -> String {
        let token = Uuid::new_v4();
        self.entries.write().unwrap_or_else(|e| e.into_inner()).insert(
            token,
            StoredPreview {
                content_type: upload.content_type.clone(),
                bytes: upload.bytes.clone(),
            },
        );
        self.created.fetch_add(1, Ordering::Relaxed);
        format!("{}/{}", self.base_path, token)
    }

    fn release(&self, url: &str) {
        let removed = self
            .token_of(url)
            .and_then(|token| {
                self.entries
                    .write()
                    .unwrap_or_else(|e| e.into_inner())
                    .remove(&token)
            })
            .is_some();

        if removed {
            self.released.fetch_add(1, Ordering::Relaxed);
        } else {
            tracing::warn!("Released unknown preview {}", url);
        }
    }
}
