use crate::editing::{Document, Position};

/// Lines moved by a fixed-step jump
pub const FIXED_STEP_LINES: usize = 5;

/// Characters that form words of their own, separate from identifiers
pub const WORD_SEPARATORS: &str = "`~!@#$%^&*()-=+[{]}\\|;:'\",.<>/?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    Whitespace,
    Separator,
    Word,
}

pub(crate) fn class_of(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Whitespace
    } else if WORD_SEPARATORS.contains(c) {
        CharClass::Separator
    } else {
        CharClass::Word
    }
}

/// Jump [`FIXED_STEP_LINES`] lines up.
///
/// Running out of lines lands at the very start of the document, the same
/// place repeated single-line moves would end up.
pub fn fixed_step_up(doc: &Document, cursor: Position) -> Position {
    let cursor = doc.clamp_position(cursor);
    match cursor.line.checked_sub(FIXED_STEP_LINES) {
        Some(line) => doc.clamp_position(Position::new(line, cursor.column)),
        None => Position::new(0, 0),
    }
}

/// Jump [`FIXED_STEP_LINES`] lines down, ending at the document end when short
pub fn fixed_step_down(doc: &Document, cursor: Position) -> Position {
    let cursor = doc.clamp_position(cursor);
    let last = doc.line_count() - 1;
    let target = cursor.line + FIXED_STEP_LINES;
    if target > last {
        Position::new(last, doc.line_len(last))
    } else {
        doc.clamp_position(Position::new(target, cursor.column))
    }
}

/// Move to the end of the next word without leaving the line
pub fn word_right_end(doc: &Document, cursor: Position) -> Position {
    let cursor = doc.clamp_position(cursor);
    let chars: Vec<char> = doc
        .line_text(cursor.line)
        .unwrap_or_default()
        .chars()
        .collect();

    let mut column = cursor.column;
    if column >= chars.len() {
        return cursor;
    }
    while column < chars.len() && class_of(chars[column]) == CharClass::Whitespace {
        column += 1;
    }
    if let Some(&c) = chars.get(column) {
        let class = class_of(c);
        while column < chars.len() && class_of(chars[column]) == class {
            column += 1;
        }
    }
    Position::new(cursor.line, column)
}

/// Move to the start of the previous word without leaving the line
pub fn word_left_begin(doc: &Document, cursor: Position) -> Position {
    let cursor = doc.clamp_position(cursor);
    if cursor.column == 0 {
        return cursor;
    }
    let chars: Vec<char> = doc
        .line_text(cursor.line)
        .unwrap_or_default()
        .chars()
        .collect();

    let mut column = cursor.column;
    while column > 0 && class_of(chars[column - 1]) == CharClass::Whitespace {
        column -= 1;
    }
    if column > 0 {
        let class = class_of(chars[column - 1]);
        while column > 0 && class_of(chars[column - 1]) == class {
            column -= 1;
        }
    }
    Position::new(cursor.line, column)
}
