//! Running top-3 of (color, count) pairs.

use crate::types::ColorTriple;

/// The three highest counts seen so far, highest first.
///
/// A candidate only enters when its count is strictly greater than an
/// installed count, so among equal counts the first one offered keeps
/// its rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopThree {
    colors: [u32; 3],
    counts: [u32; 3],
}

impl TopThree {
    #[inline]
    pub fn offer(&mut self, color: u32, count: u32) {
        if count <= self.counts[2] {
            return;
        }
        let rank = if count > self.counts[0] {
            0
        } else if count > self.counts[1] {
            1
        } else {
            2
        };
        for slot in (rank + 1..3).rev() {
            self.counts[slot] = self.counts[slot - 1];
            self.colors[slot] = self.colors[slot - 1];
        }
        self.counts[rank] = count;
        self.colors[rank] = color;
    }

    pub fn counts(&self) -> [u32; 3] {
        self.counts
    }

    /// Final triple, with the fill rules for images of fewer than three colors.
    ///
    /// - no pixels: `[0x000000, 0x000BAD, 0x000000]`
    /// - one color `a`: `[a, a, a]`
    /// - two colors `a`, `b`: `[a, a, b]`
    pub fn finish(&self) -> ColorTriple {
        let [first, second, _] = self.colors;
        if self.counts[0] == 0 {
            return ColorTriple::NO_PIXELS;
        }
        if self.counts[2] == 0 {
            let last = if self.counts[1] == 0 { first } else { second };
            return ColorTriple([first, first, last]);
        }
        ColorTriple(self.colors)
    }
}
