//! Image gallery support
//!
//! Shape coercion of backend image fields and the carousel cursor that
//! cards, detail pages and admin previews navigate with.

pub mod carousel;
pub mod normalize;

pub use carousel::Carousel;
pub use normalize::{normalize_images, thumbnail};
