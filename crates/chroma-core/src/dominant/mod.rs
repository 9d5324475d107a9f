//! Dominant-color extraction.
//!
//! Finds the three most frequent exact 24-bit colors of an image without
//! hashing pixels. See [`ColorCounter`] for the algorithm and [`TopThree`]
//! for ranking and tie rules.

pub mod buckets;
pub mod counter;
pub mod top;

pub use counter::ColorCounter;
pub use top::TopThree;
