//! Machine catalog: fetching records and projecting them into page views

use std::sync::Arc;

use crate::{
    backend::MachineBackend,
    config::CatalogConfig,
    error::{AppError, AppResult},
    gallery::{thumbnail, Carousel},
    models::{
        views::{
            AdminMachineRow, BackLink, CategoryCardView, EnquiryActions, MachineCardView,
            MachineDetailView, PageState, SpecEntry,
        },
        MachineRecord, MachineStatus, Section,
    },
    services::enquiry::EnquiryService,
};

const EARTHWORK_CONDITION: &str = "Pure Earthwork Condition";

const DEFAULT_DESCRIPTION: &str = "Comprehensive data for this machine is being compiled. \
Please contact us for a detailed inspection report and more performance specifications.";

/// Specification keys already shown as fixed fields
const RESERVED_SPEC_KEYS: [&str; 4] = ["model", "year", "hours", "condition"];

/// Specifications shown with a default value when a machine lacks them
const DEFAULT_SPECS: [(&str, &str); 2] = [("engine", "Diesel 4-cylinder"), ("power", "76 HP")];

/// Equipment categories offered on the site
pub struct CategoryInfo {
    pub key: &'static str,
    /// Value of `MachineRecord::category`
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub static CATEGORIES: [CategoryInfo; 3] = [
    CategoryInfo {
        key: "backhoe-loaders",
        name: "Backhoe Loader",
        title: "Backhoe Loaders",
        description: "Versatile loaders for digging, trenching and material handling.",
    },
    CategoryInfo {
        key: "excavators",
        name: "Excavator",
        title: "Excavators",
        description: "Tracked excavators for earthwork, demolition and site preparation.",
    },
    CategoryInfo {
        key: "backhoe-breakers",
        name: "Backhoe Loader with Breaker",
        title: "Backhoe Breakers",
        description: "Backhoe loaders fitted with hydraulic breakers for rock and concrete.",
    },
];

pub fn category_by_key(key: &str) -> Option<&'static CategoryInfo> {
    CATEGORIES.iter().find(|c| c.key == key)
}

/// Format an integer with comma thousands separators
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn condition_label(condition: &str) -> &'static str {
    if condition == EARTHWORK_CONDITION {
        "Earthwork"
    } else {
        "Good"
    }
}

fn year_text(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_default()
}

fn hours_text(hours: Option<u64>) -> String {
    hours.map(format_thousands).unwrap_or_default()
}

/// A detail page bound to one machine at a time.
///
/// Loading a different machine replaces the previous state wholesale and
/// puts the gallery back on its first image.
#[derive(Debug, Clone)]
pub struct MachinePage {
    machine_id: Option<String>,
    state: PageState<MachineRecord>,
    carousel: Carousel,
}

impl Default for MachinePage {
    fn default() -> Self {
        Self {
            machine_id: None,
            state: PageState::Loading,
            carousel: Carousel::default(),
        }
    }
}

impl MachinePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, backend: &dyn MachineBackend, id: &str) {
        self.machine_id = Some(id.to_string());
        self.state = PageState::Loading;
        self.carousel.bind(Vec::new());

        self.state = match backend.get_machine(id).await {
            Ok(Some(machine)) => {
                self.carousel.bind(machine.images.clone());
                PageState::Loaded(machine)
            }
            Ok(None) => PageState::NotFound,
            Err(e) => {
                tracing::warn!("Error fetching machine {}: {}", id, e);
                PageState::NotFound
            }
        };
    }

    pub fn machine_id(&self) -> Option<&str> {
        self.machine_id.as_deref()
    }

    pub fn state(&self) -> &PageState<MachineRecord> {
        &self.state
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn carousel_mut(&mut self) -> &mut Carousel {
        &mut self.carousel
    }
}

/// Gallery position requested by the browser
#[derive(Debug, Clone, Default)]
pub struct GalleryRequest {
    pub image: Option<usize>,
    pub failed: Vec<usize>,
}

impl GalleryRequest {
    fn apply(&self, carousel: &mut Carousel) {
        if let Some(index) = self.image {
            carousel.jump_to(index);
        }
        for &index in &self.failed {
            carousel.mark_failed(index);
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    backend: Arc<dyn MachineBackend>,
    config: CatalogConfig,
    enquiry: EnquiryService,
}

impl CatalogService {
    pub fn new(backend: Arc<dyn MachineBackend>, config: CatalogConfig, enquiry: EnquiryService) -> Self {
        Self {
            backend,
            config,
            enquiry,
        }
    }

    /// Fetch every machine; failures are logged and reported as not found
    async fn fetch_all(&self) -> PageState<Vec<MachineRecord>> {
        match self.backend.list_machines().await {
            Ok(machines) => PageState::Loaded(machines),
            Err(e) => {
                tracing::warn!("Failed to fetch machines: {}", e);
                PageState::NotFound
            }
        }
    }

    /// Whether the backend currently answers listing requests
    pub async fn backend_reachable(&self) -> bool {
        self.fetch_all().await.is_loaded()
    }

    pub fn card(&self, machine: &MachineRecord, show_status: bool) -> MachineCardView {
        let section = Section::from(machine.purpose);
        MachineCardView {
            id: machine.id.clone(),
            title: machine.title.clone(),
            category: machine.category.clone(),
            model: machine.model.clone(),
            year: machine.year,
            hours: hours_text(machine.hours),
            condition_label: condition_label(&machine.condition).to_string(),
            status: show_status.then_some(machine.status),
            sold: machine.status == MachineStatus::Sold,
            purpose: machine.purpose,
            detail_path: section.machine_path(&machine.id),
            gallery: Carousel::new(machine.images.clone())
                .view(&machine.title, &self.config.card_fallback_image),
        }
    }

    /// Machine cards for a section (or for the whole catalog, with status
    /// badges, when `section` is `None`), optionally limited to a category
    pub async fn list(
        &self,
        section: Option<Section>,
        category_key: Option<&str>,
    ) -> AppResult<PageState<Vec<MachineCardView>>> {
        let category = match category_key {
            Some(key) => Some(
                category_by_key(key)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown category {}", key)))?,
            ),
            None => None,
        };

        let machines = match self.fetch_all().await {
            PageState::Loaded(machines) => machines,
            _ => return Ok(PageState::NotFound),
        };

        let cards = machines
            .iter()
            .filter(|m| section.map_or(true, |s| m.purpose == s.purpose()))
            .filter(|m| category.map_or(true, |c| m.category == c.name))
            .map(|m| self.card(m, section.is_none()))
            .collect();

        Ok(PageState::Loaded(cards))
    }

    /// Category tiles with the number of machines in each for a section
    pub async fn categories(&self, section: Section) -> PageState<Vec<CategoryCardView>> {
        let machines = match self.fetch_all().await {
            PageState::Loaded(machines) => machines,
            _ => return PageState::NotFound,
        };

        let tiles = CATEGORIES
            .iter()
            .map(|c| CategoryCardView {
                key: c.key.to_string(),
                title: c.title.to_string(),
                description: c.description.to_string(),
                image: self
                    .config
                    .category_images
                    .get(c.key)
                    .cloned()
                    .unwrap_or_else(|| self.config.default_category_image.clone()),
                count: machines
                    .iter()
                    .filter(|m| m.purpose == section.purpose() && m.category == c.name)
                    .count(),
                path: format!("{}?category={}", section.path(), c.key),
            })
            .collect();

        PageState::Loaded(tiles)
    }

    /// Specification grid of the detail page
    pub fn specs(machine: &MachineRecord) -> Vec<SpecEntry> {
        let entry = |label: &str, value: String| SpecEntry {
            label: label.to_string(),
            value,
        };

        let mut specs = vec![
            entry("MODEL", machine.model.clone()),
            entry("YEAR", year_text(machine.year)),
            entry("OPERATING HOURS", hours_text(machine.hours)),
            entry("CONDITION", machine.condition.clone()),
        ];

        specs.extend(
            machine
                .specifications
                .iter()
                .filter(|(key, _)| !RESERVED_SPEC_KEYS.contains(&key.to_lowercase().as_str()))
                .map(|(key, value)| entry(&key.to_uppercase(), value.clone())),
        );

        for (key, default) in DEFAULT_SPECS {
            let present = machine
                .specifications
                .get(key)
                .is_some_and(|v| !v.trim().is_empty());
            if !present {
                specs.push(entry(&key.to_uppercase(), default.to_string()));
            }
        }

        specs
    }

    /// Detail page of one machine with the gallery at the requested position
    pub async fn detail(
        &self,
        section: Section,
        id: &str,
        gallery: &GalleryRequest,
        page_url: Option<&str>,
    ) -> PageState<MachineDetailView> {
        let mut page = MachinePage::new();
        page.load(self.backend.as_ref(), id).await;
        gallery.apply(page.carousel_mut());

        let machine = match page.state() {
            PageState::Loaded(machine) => machine,
            _ => return PageState::NotFound,
        };

        let purpose = section.purpose();
        let page_url = page_url
            .map(str::to_string)
            .unwrap_or_else(|| self.enquiry.page_url(section, id));

        PageState::Loaded(MachineDetailView {
            id: machine.id.clone(),
            title: machine.title.clone(),
            category: machine.category.clone(),
            status: machine.status,
            location: machine.location.clone(),
            summary: format!(
                "{} • {} Model • {} Hours",
                machine.model,
                year_text(machine.year),
                hours_text(machine.hours)
            ),
            description: machine
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            specs: Self::specs(machine),
            gallery: page
                .carousel()
                .view(&machine.title, &self.config.detail_placeholder_image),
            purpose,
            back: BackLink {
                path: section.path().to_string(),
                label: section.label().to_string(),
            },
            enquiry: self.enquiry.actions(machine, purpose, &page_url),
        })
    }

    /// Enquiry actions for a machine, outside of the detail page
    pub async fn enquiry(
        &self,
        section: Section,
        id: &str,
        page_url: Option<&str>,
    ) -> AppResult<EnquiryActions> {
        let machine = self
            .backend
            .get_machine(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Machine {} not found", id)))?;

        let page_url = page_url
            .map(str::to_string)
            .unwrap_or_else(|| self.enquiry.page_url(section, id));

        Ok(self.enquiry.actions(&machine, section.purpose(), &page_url))
    }

    /// Rows of the admin machines table
    pub async fn admin_rows(&self) -> PageState<Vec<AdminMachineRow>> {
        let machines = match self.fetch_all().await {
            PageState::Loaded(machines) => machines,
            _ => return PageState::NotFound,
        };

        PageState::Loaded(
            machines
                .into_iter()
                .map(|m| AdminMachineRow {
                    thumbnail: thumbnail(&m.images, &self.config.admin_thumbnail_placeholder)
                        .to_string(),
                    id: m.id,
                    machine_code: m.machine_code,
                    title: m.title,
                    model: m.model,
                    category: m.category,
                    purpose: m.purpose,
                    year: m.year,
                    status: m.status,
                })
                .collect(),
        )
    }

    /// Delete a machine; the caller must have confirmed the action
    pub async fn delete(&self, id: &str, confirmed: bool) -> AppResult<()> {
        if !confirmed {
            return Err(AppError::BadRequest(
                "Deleting a machine must be confirmed".to_string(),
            ));
        }
        self.backend.delete_machine(id).await?;
        tracing::info!("Deleted machine {}", id);
        Ok(())
    }
}
