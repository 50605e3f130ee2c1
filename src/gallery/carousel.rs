//! Carousel cursor over a machine's images

use std::collections::BTreeSet;

use crate::models::views::{GalleryControls, GallerySlot, GalleryView};

/// Cursor over an ordered, fixed list of image URLs.
///
/// The cursor always lies in `[0, len - 1]` and wraps around at both ends.
/// With no images it stays at 0 and the gallery renders the fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Carousel {
    images: Vec<String>,
    cursor: usize,
    failed: BTreeSet<usize>,
}

impl Carousel {
    pub fn new(images: Vec<String>) -> Self {
        Self {
            images,
            cursor: 0,
            failed: BTreeSet::new(),
        }
    }

    /// Bind a new image list, returning to the first image
    pub fn bind(&mut self, images: Vec<String>) {
        *self = Self::new(images);
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Navigation is only offered with more than one image
    pub fn has_controls(&self) -> bool {
        self.len() > 1
    }

    fn peek_next(&self) -> usize {
        match self.len() {
            0 => 0,
            n => (self.cursor + 1) % n,
        }
    }

    fn peek_previous(&self) -> usize {
        match self.len() {
            0 => 0,
            n => (self.cursor + n - 1) % n,
        }
    }

    pub fn next(&mut self) -> usize {
        self.cursor = self.peek_next();
        self.cursor
    }

    pub fn previous(&mut self) -> usize {
        self.cursor = self.peek_previous();
        self.cursor
    }

    /// Jump straight to a slot. Out-of-range indexes leave the cursor alone.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.len() {
            return false;
        }
        self.cursor = index;
        true
    }

    /// Record that the image in `index` failed to load.
    ///
    /// Only the rendered source of that slot changes; the list is untouched.
    pub fn mark_failed(&mut self, index: usize) {
        if let Some(url) = self.images.get(index) {
            tracing::warn!("Failed to load image: {}", url);
            self.failed.insert(index);
        }
    }

    /// Source to render for a slot, substituting `fallback` for failed loads
    pub fn src_at<'a>(&'a self, index: usize, fallback: &'a str) -> &'a str {
        match self.images.get(index) {
            Some(_) if self.failed.contains(&index) => fallback,
            Some(url) => url,
            None => fallback,
        }
    }

    pub fn current_src<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.src_at(self.cursor, fallback)
    }

    pub fn view(&self, title: &str, fallback: &str) -> GalleryView {
        let name = if title.trim().is_empty() { "Machine" } else { title };

        if self.is_empty() {
            return GalleryView {
                index: 0,
                total: 0,
                src: fallback.to_string(),
                fallback_src: fallback.to_string(),
                alt: "No image available".to_string(),
                controls: None,
            };
        }

        let controls = self.has_controls().then(|| GalleryControls {
            previous: self.peek_previous(),
            next: self.peek_next(),
            counter: format!("{} / {}", self.cursor + 1, self.len()),
            slots: (0..self.len())
                .map(|i| GallerySlot {
                    index: i,
                    src: self.src_at(i, fallback).to_string(),
                    active: i == self.cursor,
                    label: format!("Go to image {}", i + 1),
                })
                .collect(),
        });

        GalleryView {
            index: self.cursor,
            total: self.len(),
            src: self.current_src(fallback).to_string(),
            fallback_src: fallback.to_string(),
            alt: format!("{} - Image {}", name, self.cursor + 1),
            controls,
        }
    }
}
