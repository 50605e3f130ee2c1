//! Data models for Heavy Horizon

pub mod enums;
pub mod machine;
pub mod views;

// Re-export commonly used types
pub use enums::{MachineStatus, Purpose, Section};
pub use machine::{
    DraftPatch, ImageField, ImageUpload, MachineDraft, MachinePayload, MachineRecord, NumericInput,
};
