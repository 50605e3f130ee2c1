//! Image field normalization

use crate::models::ImageField;

/// Coerce an image field of any shape into an ordered list of URLs.
///
/// Order is kept; nothing is deduplicated or checked for URL syntax.
/// Absent, blank or malformed fields yield an empty list.
pub fn normalize_images(field: Option<&ImageField>) -> Vec<String> {
    match field {
        Some(ImageField::Single(url)) if !url.trim().is_empty() => vec![url.clone()],
        Some(ImageField::List(urls)) => urls.clone(),
        _ => Vec::new(),
    }
}

/// First image of a list, which is the canonical thumbnail
pub fn thumbnail<'a>(images: &'a [String], placeholder: &'a str) -> &'a str {
    images.first().map(String::as_str).unwrap_or(placeholder)
}
