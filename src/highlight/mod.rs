//! Value highlighting in bill HTML
//!
//! Highlighting runs per text segment, between two reference links:
//! - **Matching** ([`matcher`]): literal forms of parameter values located in
//!   the simplified (tag-stripped) segment text
//! - **Remapping** ([`remap`]): simplified intervals mapped back onto the
//!   original HTML, with the markup needed to keep tags balanced
//! - **Injection** ([`inject`]): highlight buttons spliced right to left
//!
//! [`document`] drives the three steps over a whole bill.

pub mod document;
pub mod inject;
pub mod matcher;
pub mod remap;
pub mod settings;

pub use document::DocumentHighlighter;
pub use inject::{HighlightAnnotation, HighlightInjector};
pub use matcher::{find_literal, ValueMatcher};
pub use remap::{MappedInterval, RemapCursor, RemapError};
pub use settings::HighlightSettings;

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, stop)`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Interval {
    pub start: usize,
    pub stop: usize,
}

impl Interval {
    pub fn new(start: usize, stop: usize) -> Self {
        assert!(start <= stop, "interval start {} after stop {}", start, stop);
        Self { start, stop }
    }

    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.stop && other.start < self.stop
    }
}

/// Sort ascending by start (then stop) and drop duplicates
pub fn sort_dedup(intervals: &mut Vec<Interval>) {
    intervals.sort_unstable();
    intervals.dedup();
}
