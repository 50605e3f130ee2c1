//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// Purpose
// ---------------------------------------------------------------------------

/// Whether a machine is offered for rental (services) or for sale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Purpose {
    #[default]
    Rental,
    Sales,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Rental => "Rental",
            Purpose::Sales => "Sales",
        }
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// Public site section a page lives under; determines the purpose tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Services,
    Sales,
}

impl Section {
    pub fn purpose(&self) -> Purpose {
        match self {
            Section::Services => Purpose::Rental,
            Section::Sales => Purpose::Sales,
        }
    }

    /// Root path of the section listing
    pub fn path(&self) -> &'static str {
        match self {
            Section::Services => "/services",
            Section::Sales => "/sales",
        }
    }

    /// Breadcrumb label of the section listing
    pub fn label(&self) -> &'static str {
        match self {
            Section::Services => "Our Services",
            Section::Sales => "Sales",
        }
    }

    pub fn machine_path(&self, id: &str) -> String {
        format!("{}/{}", self.path(), id)
    }
}

impl From<Purpose> for Section {
    fn from(p: Purpose) -> Self {
        match p {
            Purpose::Rental => Section::Services,
            Purpose::Sales => Section::Sales,
        }
    }
}

// ---------------------------------------------------------------------------
// MachineStatus
// ---------------------------------------------------------------------------

/// Availability of a machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MachineStatus {
    #[default]
    Available,
    Sold,
    Unavailable,
}

impl MachineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Available => "Available",
            MachineStatus::Sold => "Sold",
            MachineStatus::Unavailable => "Unavailable",
        }
    }
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_purpose() {
        assert_eq!(Section::Services.purpose(), Purpose::Rental);
        assert_eq!(Section::Sales.purpose(), Purpose::Sales);
        assert_eq!(Section::from(Purpose::Rental), Section::Services);
        assert_eq!(Section::Sales.machine_path("abc"), "/sales/abc");
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Purpose::Sales).unwrap(), "\"Sales\"");
        assert_eq!(serde_json::to_string(&MachineStatus::Sold).unwrap(), "\"Sold\"");
        let section: Section = serde_json::from_str("\"services\"").unwrap();
        assert_eq!(section, Section::Services);
    }
}
