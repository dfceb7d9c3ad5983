//! Indentation colorizer for plain text documents.
//!
//! Lines are grouped into colour buckets by indentation level; picking the
//! actual colours is left to the front end. Redraws are meant to be
//! coalesced with a [`Debouncer`].

pub mod debounce;

use std::ops::Range;
use std::time::Duration;

use crate::editing::Document;
use crate::levels::{self, LineLevel};

pub use debounce::Debouncer;

/// Lines decorated above and below the visible range
pub const VISIBLE_RANGE_PADDING: usize = 50;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

/// Bucket for a line, if it is decorated at all.
///
/// Unindented, blank and fractional lines stay uncoloured; level `n` maps to
/// bucket `(n - 1) % bucket_count`.
pub fn bucket_for(level: LineLevel, bucket_count: usize) -> Option<usize> {
    match level {
        LineLevel::Level(level) if level > 0 && bucket_count > 0 => {
            Some((level - 1) % bucket_count)
        }
        _ => None,
    }
}

/// Group the lines around `visible` into `bucket_count` colour buckets
pub fn decorate(
    doc: &Document,
    visible: Range<usize>,
    tab_width: usize,
    bucket_count: usize,
) -> Vec<Vec<usize>> {
    let mut buckets = vec![Vec::new(); bucket_count];
    let last = doc.line_count();
    let start = visible.start.saturating_sub(VISIBLE_RANGE_PADDING).min(last);
    let end = visible
        .end
        .saturating_add(VISIBLE_RANGE_PADDING)
        .min(last)
        .max(start);

    for line in start..end {
        let Some(text) = doc.line_text(line) else {
            continue;
        };
        if let Some(bucket) = bucket_for(levels::line_level(&text, tab_width), bucket_count) {
            buckets[bucket].push(line);
        }
    }
    buckets
}
