//! View models returned to the browser shell
//!
//! Each page of the site is a projection of backend records into one of these
//! types. They are render-ready: the shell does no further computation.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    enums::{MachineStatus, Purpose},
    machine::MachineDraft,
};

/// Renderable state of a page backed by a fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum PageState<T> {
    Loading,
    NotFound,
    Loaded(T),
}

impl<T> PageState<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, PageState::Loaded(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            PageState::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Gallery
// ---------------------------------------------------------------------------

/// One navigable position of a gallery (dot or thumbnail)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GallerySlot {
    pub index: usize,
    pub src: String,
    pub active: bool,
    pub label: String,
}

/// Navigation offered when a gallery holds more than one image
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GalleryControls {
    /// Cursor after "previous"
    pub previous: usize,
    /// Cursor after "next"
    pub next: usize,
    /// "2 / 5"
    pub counter: String,
    pub slots: Vec<GallerySlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GalleryView {
    pub index: usize,
    pub total: usize,
    /// Source to render for the current slot
    pub src: String,
    /// Source to swap in if `src` fails to load
    pub fallback_src: String,
    pub alt: String,
    pub controls: Option<GalleryControls>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MachineCardView {
    pub id: String,
    pub title: String,
    pub category: String,
    pub model: String,
    pub year: Option<i32>,
    /// Hours with thousands separators
    pub hours: String,
    pub condition_label: String,
    /// Only present on listings that show availability
    pub status: Option<MachineStatus>,
    pub sold: bool,
    pub purpose: Purpose,
    pub detail_path: String,
    pub gallery: GalleryView,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SpecEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BackLink {
    pub path: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MachineDetailView {
    pub id: String,
    pub title: String,
    pub category: String,
    pub status: MachineStatus,
    pub location: String,
    /// "3DX • 2020 Model • 5,200 Hours"
    pub summary: String,
    pub description: String,
    pub specs: Vec<SpecEntry>,
    pub gallery: GalleryView,
    pub purpose: Purpose,
    pub back: BackLink,
    pub enquiry: EnquiryActions,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryCardView {
    pub key: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub count: usize,
    pub path: String,
}

// ---------------------------------------------------------------------------
// Enquiry
// ---------------------------------------------------------------------------

/// What the enquiry modal is opened with
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EnquiryModalSeed {
    pub machine_id: String,
    pub machine_title: String,
    pub category: String,
    pub enquiry_type: Purpose,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EnquiryActions {
    pub modal: EnquiryModalSeed,
    pub whatsapp_url: String,
    pub call_url: String,
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AdminMachineRow {
    pub id: String,
    pub machine_code: Option<String>,
    pub title: String,
    pub model: String,
    pub category: String,
    pub purpose: Purpose,
    pub year: Option<i32>,
    pub status: MachineStatus,
    pub thumbnail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EditorStatus {
    Idle,
    Uploading,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Success,
    Error,
}

/// Dismissible banner shown above the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EditorMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl EditorMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Error, text: text.into() }
    }
}

/// An image in the editor's display order (persisted first, then pending)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EditorImage {
    pub index: usize,
    pub url: String,
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EditorView {
    pub session_id: Uuid,
    /// "Add New Machine" or "Edit Machine"
    pub heading: String,
    pub editing_id: Option<String>,
    pub draft: MachineDraft,
    pub images: Vec<EditorImage>,
    pub remaining_slots: usize,
    pub status: EditorStatus,
    pub message: Option<EditorMessage>,
}
