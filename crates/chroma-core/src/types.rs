//! Core data types flowing through the Chroma pipeline.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Mask selecting the 24 RGB bits of a packed pixel.
pub const RGB_MASK: u32 = 0x00FF_FFFF;

/// A width×height grid of packed `0xRRGGBB` pixels in row-major order.
///
/// Alpha and any other high bits are stripped on construction, so every
/// stored value is a plain 24-bit color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelGrid {
    /// Build a grid from packed pixels. High bits are discarded.
    ///
    /// Returns `None` when `pixels.len()` does not equal `width * height`.
    pub fn new(width: u32, height: u32, mut pixels: Vec<u32>) -> Option<Self> {
        if pixels.len() as u64 != u64::from(width) * u64::from(height) {
            return None;
        }
        for pixel in &mut pixels {
            *pixel &= RGB_MASK;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A grid with no pixels.
    pub fn empty(width: u32, height: u32) -> Option<Self> {
        Self::new(width, height, Vec::new())
    }

    /// Convert a decoded image, dropping any alpha channel.
    pub fn from_image(image: &image::DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| u32::from(p[0]) << 16 | u32::from(p[1]) << 8 | u32::from(p[2]))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed `0xRRGGBB` pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// An image that was fetched and decoded, labelled with its source URL.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub url: String,
    pub grid: PixelGrid,
}

/// The three most frequent colors of an image, most frequent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorTriple(pub [u32; 3]);

impl ColorTriple {
    /// Reserved marker for the middle slot of an image with no pixels.
    pub const NO_PIXELS_MARKER: u32 = 0xBAD;

    /// Result reported for an image with no pixels.
    ///
    /// Genuine results never have identical first and third colors with a
    /// different middle color, so this pattern is unambiguous.
    pub const NO_PIXELS: ColorTriple = ColorTriple([0, Self::NO_PIXELS_MARKER, 0]);

    pub fn colors(&self) -> [u32; 3] {
        self.0
    }

    /// Whether this is the no-pixels marker rather than a real result.
    pub fn is_no_pixels(&self) -> bool {
        *self == Self::NO_PIXELS
    }
}

/// Counters collected over one pipeline run.
#[derive(Debug, Default)]
pub struct RunStats {
    urls_read: AtomicU64,
    images_fetched: AtomicU64,
    fetches_dropped: AtomicU64,
    results_produced: AtomicU64,
    lines_written: AtomicU64,
    write_failures: AtomicU64,
    items_abandoned: AtomicU64,
}

impl RunStats {
    pub fn record_url(&self) {
        self.urls_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetched(&self) {
        self.images_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.fetches_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_result(&self) {
        self.results_produced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_written(&self) {
        self.lines_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// An item was lost because its insert into the next queue failed.
    pub fn record_abandoned(&self) {
        self.items_abandoned.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of the counters.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            urls_read: self.urls_read.load(Ordering::Relaxed),
            images_fetched: self.images_fetched.load(Ordering::Relaxed),
            fetches_dropped: self.fetches_dropped.load(Ordering::Relaxed),
            results_produced: self.results_produced.load(Ordering::Relaxed),
            lines_written: self.lines_written.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            items_abandoned: self.items_abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`RunStats`], serializable for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Non-empty URL records read from the input
    pub urls_read: u64,
    /// Images fetched, decoded, and handed to the analyzers
    pub images_fetched: u64,
    /// URLs dropped by the fetch stage
    pub fetches_dropped: u64,
    /// Result lines produced by analyzers and handed to the sink
    pub results_produced: u64,
    /// Result lines handed to the output
    pub lines_written: u64,
    /// Result lines lost to write errors
    pub write_failures: u64,
    /// Items lost to interrupted queue inserts
    pub items_abandoned: u64,
}
