//! Exact color frequency counting by three-level bucket sort.

use super::buckets::{Buckets, Tally};
use super::top::TopThree;
use crate::types::{ColorTriple, PixelGrid};

/// Reusable scratch space for finding the most frequent colors of images.
///
/// Pixels are partitioned by red byte, each red bucket by green byte, and
/// each green bucket's blue bytes are counted directly. Every level only
/// visits slots that received data, and every slot is emptied as soon as
/// it has been visited, so the counter is clean again when a call returns.
///
/// One counter belongs to one analyzer; it is not meant to be shared.
#[derive(Debug, Clone, Default)]
pub struct ColorCounter {
    /// Packed `0xGGBB` values by red byte
    red: Buckets<u16>,
    /// Blue bytes by green byte, for the current red value
    green: Buckets<u8>,
    /// Pixel counts by blue byte, for the current red/green pair
    blue: Tally,
}

impl ColorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three most frequent colors of `grid`, most frequent first.
    pub fn dominant_colors(&mut self, grid: &PixelGrid) -> ColorTriple {
        self.dominant_colors_of(grid.pixels())
    }

    /// Like [`dominant_colors`](Self::dominant_colors) over raw packed
    /// pixels. Bits above the low 24 are ignored.
    pub fn dominant_colors_of(&mut self, pixels: &[u32]) -> ColorTriple {
        for &pixel in pixels {
            self.red.push((pixel >> 16) as u8, pixel as u16);
        }

        let mut top = TopThree::default();

        let mut red_cursor = self.red.take_head();
        while let Some(red) = red_cursor {
            red_cursor = self.red.after(red);
            for &green_blue in self.red.bucket(red) {
                self.green.push((green_blue >> 8) as u8, green_blue as u8);
            }
            self.red.clear(red);

            let mut green_cursor = self.green.take_head();
            while let Some(green) = green_cursor {
                green_cursor = self.green.after(green);
                for &blue in self.green.bucket(green) {
                    self.blue.increment(blue);
                }
                self.green.clear(green);

                let mut blue_cursor = self.blue.take_head();
                while let Some(blue) = blue_cursor {
                    blue_cursor = self.blue.after(blue);
                    let count = self.blue.take_count(blue);
                    top.offer(pack(red, green, blue), count);
                }
            }
        }

        top.finish()
    }

    /// True when no scratch state is left over from a previous image.
    pub fn is_clean(&self) -> bool {
        self.red.is_drained() && self.green.is_drained() && self.blue.is_zeroed()
    }
}

#[inline]
fn pack(red: u8, green: u8, blue: u8) -> u32 {
    u32::from(red) << 16 | u32::from(green) << 8 | u32::from(blue)
}
