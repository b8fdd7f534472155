//! Best-image selection for web pages
//!
//! Candidate image URLs scraped from a page are fetched by a small pool of
//! concurrent fetchers. A time-bounded window collects whatever decodes in
//! time and keeps the largest image that passes the shape and size filter.

mod crop;
mod detect;
mod fetcher;
mod page;
mod select;

pub use crop::{crop_to_fit, image_filename, save_png};
pub use detect::{DetectionResult, Detector};
pub use fetcher::{fetch_or_absent, FetchError, HttpImageFetcher, ImageFetcher};
pub use page::{clean_title, find_media, parse_page, PageMedia};
pub use select::{select_best_image, AggregationWindow};

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A decoded image together with the metadata the selector needs
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    /// Source URL
    pub url: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel area (width * height)
    pub area: u64,
    /// Decoded payload
    pub image: Arc<DynamicImage>,
}

impl ImageCandidate {
    pub fn new(url: impl Into<String>, image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        Self {
            url: url.into(),
            width,
            height,
            area: u64::from(width) * u64::from(height),
            image: Arc::new(image),
        }
    }

    pub fn summary(&self) -> ImageSummary {
        ImageSummary {
            url: self.url.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Lightweight description of a fetched image, reported as an alternate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

/// One unit of fetch work: a candidate URL and its position on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTask {
    pub url: String,
    pub position: usize,
}

impl SourceTask {
    pub fn new(url: impl Into<String>, position: usize) -> Self {
        Self {
            url: url.into(),
            position,
        }
    }
}

/// Outcome of one `SourceTask`
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// Image fetched and decoded
    Image(ImageCandidate),
    /// Fetch or decode failed; the failure has already been logged
    Absent { url: String },
}

impl FetchResult {
    /// URL of the originating task
    pub fn url(&self) -> &str {
        match self {
            Self::Image(candidate) => &candidate.url,
            Self::Absent { url } => url,
        }
    }
}

/// Shape and size constraints an image must meet to be chosen as best
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFilter {
    /// Widest accepted width/height ratio
    pub max_ratio: f64,
    /// Narrowest accepted width/height ratio
    pub min_ratio: f64,
    /// Smallest accepted pixel area
    pub min_area: u64,
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self {
            max_ratio: 2.0,
            min_ratio: 0.5,
            min_area: 5000,
        }
    }
}

impl ImageFilter {
    /// Rejects letterbox/pillarbox shapes and icon-sized images
    pub fn accepts(&self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }

        let ratio = f64::from(width) / f64::from(height);
        if ratio > self.max_ratio || ratio < self.min_ratio {
            return false;
        }

        u64::from(width) * u64::from(height) >= self.min_area
    }
}

/// Parameters of one best-image selection pass
#[derive(Debug, Clone)]
pub struct SelectConfig {
    /// Aggregation window length
    pub timeout: Duration,
    /// Number of concurrent fetchers
    pub workers: usize,
    /// Filter applied before a result may become best
    pub filter: ImageFilter,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            workers: 4,
            filter: ImageFilter::default(),
        }
    }
}

/// Output of a selection pass
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Largest image that passed the filter, if any
    pub best: Option<ImageCandidate>,
    /// Every image that was fetched in time, in arrival order
    pub candidates: Vec<ImageSummary>,
    /// Whether the window closed on its deadline
    pub timed_out: bool,
}

impl Selection {
    /// Candidates other than the chosen best
    pub fn alternates(&self) -> Vec<ImageSummary> {
        match self.best {
            Some(ref best) => self
                .candidates
                .iter()
                .filter(|c| c.url != best.url)
                .cloned()
                .collect(),
            None => self.candidates.clone(),
        }
    }
}
