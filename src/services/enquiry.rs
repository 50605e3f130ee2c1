//! Enquiry intake: modal seed and messaging/call deep links

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::{
    config::EnquiryConfig,
    models::{
        views::{EnquiryActions, EnquiryModalSeed},
        MachineRecord, Purpose, Section,
    },
};

/// Characters left as-is by a URI component encoder
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Clone)]
pub struct EnquiryService {
    config: EnquiryConfig,
}

impl EnquiryService {
    pub fn new(config: EnquiryConfig) -> Self {
        Self { config }
    }

    /// Public URL of a machine's detail page
    pub fn page_url(&self, section: Section, id: &str) -> String {
        format!(
            "{}{}",
            self.config.site_url.trim_end_matches('/'),
            section.machine_path(id)
        )
    }

    pub fn message(machine: &MachineRecord, purpose: Purpose, page_url: &str) -> String {
        format!(
            "Hi, I'm interested in the {} ({}) - {}.\n\nSource: {}\n\nPlease provide more information.",
            machine.title, machine.category, purpose, page_url
        )
    }

    pub fn whatsapp_url(&self, machine: &MachineRecord, purpose: Purpose, page_url: &str) -> String {
        let text = Self::message(machine, purpose, page_url);
        format!(
            "https://wa.me/{}?text={}",
            self.config.whatsapp_phone,
            utf8_percent_encode(&text, URI_COMPONENT)
        )
    }

    pub fn call_url(&self) -> String {
        format!("tel:{}", self.config.call_phone)
    }

    pub fn modal_seed(machine: &MachineRecord, purpose: Purpose) -> EnquiryModalSeed {
        EnquiryModalSeed {
            machine_id: machine.id.clone(),
            machine_title: machine.title.clone(),
            category: machine.category.clone(),
            enquiry_type: purpose,
        }
    }

    pub fn actions(&self, machine: &MachineRecord, purpose: Purpose, page_url: &str) -> EnquiryActions {
        EnquiryActions {
            modal: Self::modal_seed(machine, purpose),
            whatsapp_url: self.whatsapp_url(machine, purpose, page_url),
            call_url: self.call_url(),
        }
    }
}
