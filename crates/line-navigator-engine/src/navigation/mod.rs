//! Cursor motions and the region helpers that turn a selection or pattern
//! into the lines to bookmark.

pub mod motion;
pub mod regions;

pub use motion::{
    FIXED_STEP_LINES, fixed_step_down, fixed_step_up, word_left_begin, word_right_end,
};
pub use regions::{
    RegionError, lines_from_ranges, literal_matches, pattern_matches,
    selections_or_matches_or_word, word_range_at,
};
