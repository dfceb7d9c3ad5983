use std::collections::BTreeSet;
use std::ops::Range;

use regex::RegexBuilder;

use crate::editing::{Document, LineInfo, Position};
use crate::navigation::motion::{CharClass, class_of};

#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

fn is_word(c: char) -> bool {
    class_of(c) == CharClass::Word
}

fn ordered(range: &Range<Position>) -> Range<Position> {
    if range.start <= range.end {
        range.clone()
    } else {
        range.end..range.start
    }
}

/// The word under (or just before) the cursor
pub fn word_range_at(doc: &Document, position: Position) -> Option<Range<Position>> {
    let position = doc.clamp_position(position);
    let chars: Vec<char> = doc.line_text(position.line)?.chars().collect();
    let column = position.column;

    let hit = if chars.get(column).is_some_and(|c| is_word(*c)) {
        column
    } else if column > 0 && is_word(chars[column - 1]) {
        column - 1
    } else {
        return None;
    };

    let mut start = hit;
    while start > 0 && is_word(chars[start - 1]) {
        start -= 1;
    }
    let mut end = hit + 1;
    while end < chars.len() && is_word(chars[end]) {
        end += 1;
    }
    Some(Position::new(position.line, start)..Position::new(position.line, end))
}

/// Every occurrence of `needle` in the document
pub fn literal_matches(doc: &Document, needle: &str) -> Vec<Range<Position>> {
    if needle.is_empty() {
        return Vec::new();
    }
    let text = doc.text();
    text.match_indices(needle)
        .map(|(offset, found)| doc.position_of(offset)..doc.position_of(offset + found.len()))
        .collect()
}

/// Every match of a regular expression; `^` and `$` anchor at line boundaries
pub fn pattern_matches(doc: &Document, pattern: &str) -> Result<Vec<Range<Position>>, RegionError> {
    let regex = RegexBuilder::new(pattern).multi_line(true).build()?;
    let text = doc.text();
    Ok(regex
        .find_iter(&text)
        .map(|found| doc.position_of(found.start())..doc.position_of(found.end()))
        .collect())
}

/// Resolve what a "bookmark this" request refers to.
///
/// Several non-empty selections are taken as they are. A single selection is
/// widened to every occurrence of its text. With nothing selected the word
/// under the cursor is used, again widened to all of its occurrences.
pub fn selections_or_matches_or_word(
    doc: &Document,
    selections: &[Range<Position>],
    cursor: Position,
) -> Vec<Range<Position>> {
    let selected: Vec<Range<Position>> = selections
        .iter()
        .map(ordered)
        .filter(|range| range.start != range.end)
        .collect();

    match selected.len() {
        0 => word_range_at(doc, cursor)
            .map(|word| literal_matches(doc, &doc.text_in(word)))
            .unwrap_or_default(),
        1 => {
            let matches = literal_matches(doc, &doc.text_in(selected[0].clone()));
            if matches.is_empty() { selected } else { matches }
        }
        _ => selected,
    }
}

/// Distinct lines touched by the ranges, top to bottom.
///
/// A range ending at column 0 of a later line does not include that line.
/// Lines outside the document are ignored.
pub fn lines_from_ranges(
    doc: &Document,
    ranges: impl IntoIterator<Item = Range<Position>>,
) -> Vec<LineInfo> {
    let mut lines = BTreeSet::new();
    for range in ranges {
        let range = ordered(&range);
        let last = if range.end.line > range.start.line && range.end.column == 0 {
            range.end.line - 1
        } else {
            range.end.line
        };
        lines.extend(range.start.line..=last);
    }
    lines.into_iter().filter_map(|line| doc.line(line)).collect()
}
