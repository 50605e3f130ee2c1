//! Configuration management for Heavy Horizon server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::{collections::HashMap, env};

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Location of the REST backend that owns machine records and image hosting
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Static imagery used by catalog rendering
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Shown on cards when a machine has no image or an image fails to load
    pub card_fallback_image: String,
    /// Shown on the detail gallery when a machine has no image
    pub detail_placeholder_image: String,
    /// Thumbnail used in the admin table for machines without images
    pub admin_thumbnail_placeholder: String,
    /// Category tile image used when a category has no configured image
    pub default_category_image: String,
    /// Category key (e.g. `backhoe-loaders`) to tile image
    #[serde(default)]
    pub category_images: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnquiryConfig {
    /// WhatsApp number in international format, digits only
    pub whatsapp_phone: String,
    pub call_phone: String,
    /// Public origin of the site, used to build the "Source:" page URL
    pub site_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    pub max_images: usize,
    /// Largest accepted multipart body when selecting images, in megabytes
    pub max_upload_mb: usize,
    /// Path prefix under which local previews are served
    pub preview_base_path: String,
    /// Editor sessions untouched for this long are discarded
    pub session_ttl_seconds: u64,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub enquiry: EnquiryConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix HEAVY_HORIZON_)
            .add_source(
                Environment::with_prefix("HEAVY_HORIZON")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override backend URL from BACKEND_URL env var if present
            .set_override_option("backend.base_url", env::var("BACKEND_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let category_images = [
            ("backhoe-loaders", "/assets/jcb-backhoe.jpg"),
            ("excavators", "/assets/hitachi-excavator.jpg"),
            (
                "backhoe-breakers",
                "https://res.cloudinary.com/dgchj39y2/image/upload/v1737471649/heavy_horizon/categories/backhoe-breaker-category.jpg",
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            card_fallback_image: "https://images.unsplash.com/photo-1581094288338-2314dddb7ece?auto=format&fit=crop&q=80&w=800".to_string(),
            detail_placeholder_image: "/placeholder.jpg".to_string(),
            admin_thumbnail_placeholder: "https://via.placeholder.com/60x40?text=No+Image".to_string(),
            default_category_image: "/assets/jcb-backhoe.jpg".to_string(),
            category_images,
        }
    }
}

impl Default for EnquiryConfig {
    fn default() -> Self {
        Self {
            whatsapp_phone: "916379432565".to_string(),
            call_phone: "+916379432565".to_string(),
            site_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_images: 10,
            max_upload_mb: 50,
            preview_base_path: "/api/v1/previews".to_string(),
            session_ttl_seconds: 3600,
        }
    }
}
