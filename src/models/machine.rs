//! Machine model

use axum::body::Bytes;
use chrono::{Datelike, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{MachineStatus, Purpose};
use crate::gallery::normalize_images;

/// Default category of a freshly created draft
pub const DEFAULT_CATEGORY: &str = "Backhoe Loader";

/// Image field as stored by the backend.
///
/// Older records carry a single string, newer ones a list; anything else is
/// kept as `Malformed` so that a bad record never fails deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageField {
    Single(String),
    List(Vec<String>),
    Malformed(serde_json::Value),
}

/// Machine record as it travels on the wire from the backend
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MachineWire {
    #[serde(rename = "_id")]
    id: String,
    machine_code: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    category: String,
    #[serde(rename = "type", default)]
    purpose: Purpose,
    year: Option<i32>,
    hours: Option<u64>,
    #[serde(default)]
    condition: String,
    description: Option<String>,
    #[serde(default)]
    location: String,
    images: Option<ImageField>,
    image: Option<ImageField>,
    status: Option<MachineStatus>,
    #[serde(default)]
    specifications: Option<IndexMap<String, serde_json::Value>>,
}

/// Render a specification value as text; `null` entries are dropped
fn spec_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Machine record owned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(from = "MachineWire", rename_all = "camelCase")]
pub struct MachineRecord {
    #[serde(rename = "_id")]
    pub id: String,
    /// Server generated human-readable code
    pub machine_code: Option<String>,
    pub title: String,
    pub model: String,
    pub category: String,
    #[serde(rename = "type")]
    pub purpose: Purpose,
    pub year: Option<i32>,
    /// Meter reading
    pub hours: Option<u64>,
    /// Rich-text description (markup)
    pub condition: String,
    pub description: Option<String>,
    pub location: String,
    /// Ordered image URLs, first is the thumbnail
    pub images: Vec<String>,
    pub status: MachineStatus,
    #[schema(value_type = Object)]
    pub specifications: IndexMap<String, String>,
}

impl From<MachineWire> for MachineRecord {
    fn from(w: MachineWire) -> Self {
        // `images` wins; the legacy `image` field is only consulted when it is empty
        let images = Some(normalize_images(w.images.as_ref()))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| normalize_images(w.image.as_ref()));

        Self {
            id: w.id,
            machine_code: w.machine_code,
            title: w.title,
            model: w.model,
            category: w.category,
            purpose: w.purpose,
            year: w.year,
            hours: w.hours,
            condition: w.condition,
            description: w.description,
            location: w.location,
            images,
            status: w.status.unwrap_or_default(),
            specifications: w
                .specifications
                .unwrap_or_default()
                .into_iter()
                .filter_map(|(key, value)| spec_text(value).map(|text| (key, text)))
                .collect(),
        }
    }
}

/// A numeric form field, as typed by the user or sent as a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum NumericInput {
    Number(i64),
    Text(String),
}

impl NumericInput {
    /// Coerce to an integer; blank or non-numeric text yields `None`
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            NumericInput::Number(n) => Some(*n),
            NumericInput::Text(t) => t.trim().parse().ok(),
        }
    }
}

impl From<i64> for NumericInput {
    fn from(n: i64) -> Self {
        NumericInput::Number(n)
    }
}

/// In-progress copy of a machine record held by the admin editor
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MachineDraft {
    /// Present when editing; never sent back to the backend
    pub id: Option<String>,
    /// Present when editing; never sent back to the backend
    pub machine_code: Option<String>,
    pub title: String,
    pub model: String,
    pub category: String,
    pub purpose: Purpose,
    pub year: NumericInput,
    pub hours: NumericInput,
    pub condition: String,
    pub description: Option<String>,
    pub location: String,
    pub status: MachineStatus,
    #[schema(value_type = Object)]
    pub specifications: IndexMap<String, String>,
}

impl Default for MachineDraft {
    fn default() -> Self {
        Self {
            id: None,
            machine_code: None,
            title: String::new(),
            model: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            purpose: Purpose::Rental,
            year: NumericInput::Number(i64::from(Utc::now().year())),
            hours: NumericInput::Number(0),
            condition: String::new(),
            description: None,
            location: String::new(),
            status: MachineStatus::Available,
            specifications: IndexMap::new(),
        }
    }
}

impl From<&MachineRecord> for MachineDraft {
    fn from(m: &MachineRecord) -> Self {
        let defaults = MachineDraft::default();
        Self {
            id: Some(m.id.clone()),
            machine_code: m.machine_code.clone(),
            title: m.title.clone(),
            model: m.model.clone(),
            category: m.category.clone(),
            purpose: m.purpose,
            year: m.year.map(|y| NumericInput::Number(y.into())).unwrap_or(defaults.year),
            hours: m.hours.map(|h| NumericInput::Number(h as i64)).unwrap_or(defaults.hours),
            condition: m.condition.clone(),
            description: m.description.clone(),
            location: m.location.clone(),
            status: m.status,
            specifications: m.specifications.clone(),
        }
    }
}

/// Partial update of a draft, as sent by the admin form
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type", alias = "purpose")]
    pub purpose: Option<Purpose>,
    pub year: Option<NumericInput>,
    pub hours: Option<NumericInput>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<MachineStatus>,
    #[schema(value_type = Option<Object>)]
    pub specifications: Option<IndexMap<String, String>>,
}

impl MachineDraft {
    pub fn apply(&mut self, patch: DraftPatch) {
        macro_rules! set_field {
            ($name:ident) => {
                if let Some(value) = patch.$name {
                    self.$name = value;
                }
            };
        }

        set_field!(title);
        set_field!(model);
        set_field!(category);
        set_field!(purpose);
        set_field!(year);
        set_field!(hours);
        set_field!(condition);
        set_field!(location);
        set_field!(status);
        set_field!(specifications);

        if let Some(description) = patch.description {
            self.description = Some(description);
        }
    }
}

/// Body of a create/update call to the backend.
///
/// Carries no identifier or machine code: those belong to the backend.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Validate, ToSchema)]
pub struct MachinePayload {
    pub title: String,
    pub model: String,
    pub category: String,
    #[serde(rename = "type")]
    pub purpose: Purpose,
    #[validate(range(min = 2000, message = "Year must be 2000 or later"))]
    pub year: i32,
    pub hours: u64,
    #[validate(length(min = 1, message = "Description is mandatory"))]
    pub condition: String,
    pub description: Option<String>,
    #[validate(length(min = 2, message = "Location is mandatory (min 2 characters)"))]
    pub location: String,
    pub images: Vec<String>,
    pub status: MachineStatus,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[schema(value_type = Object)]
    pub specifications: IndexMap<String, String>,
}

/// An image file picked by the admin, not yet uploaded
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}
