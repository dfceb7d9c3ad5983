use std::ops::Range;

use crate::editing::{Document, Position};

/// Commands that can be applied to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertText { at: Position, text: String },
    DeleteRange { range: Range<Position> },
    ReplaceRange { range: Range<Position>, text: String },
    /// Open a new line under `line` holding `text`
    InsertLineBelow { line: usize, text: String },
    DeleteLine { line: usize },
    DuplicateLine { line: usize },
}

/// A command lowered to a single replacement in pre-edit coordinates
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Replacement {
    pub range: Range<Position>,
    pub text: String,
}

/// Compile a command into the replacement it performs.
///
/// Positions are clamped to the document and reversed ranges are swapped.
pub(crate) fn compile_command(doc: &Document, cmd: &Cmd) -> Replacement {
    match cmd {
        Cmd::InsertText { at, text } => {
            let at = doc.clamp_position(*at);
            Replacement {
                range: at..at,
                text: text.clone(),
            }
        }
        Cmd::DeleteRange { range } => Replacement {
            range: ordered(doc, range),
            text: String::new(),
        },
        Cmd::ReplaceRange { range, text } => Replacement {
            range: ordered(doc, range),
            text: text.clone(),
        },
        Cmd::InsertLineBelow { line, text } => {
            let end = line_end(doc, *line);
            Replacement {
                range: end..end,
                text: format!("{}{text}", doc.line_ending(end.line)),
            }
        }
        Cmd::DuplicateLine { line } => {
            let end = line_end(doc, *line);
            let content = doc.line_text(end.line).unwrap_or_default();
            Replacement {
                range: end..end,
                text: format!("{}{content}", doc.line_ending(end.line)),
            }
        }
        Cmd::DeleteLine { line } => {
            let last = doc.line_count() - 1;
            let line = (*line).min(last);
            let range = if line < last {
                // Take the line and its newline
                Position::new(line, 0)..Position::new(line + 1, 0)
            } else if line > 0 {
                // Last line: take the newline before it instead
                line_end(doc, line - 1)..line_end(doc, line)
            } else {
                Position::new(0, 0)..line_end(doc, 0)
            };
            Replacement {
                range,
                text: String::new(),
            }
        }
    }
}

fn line_end(doc: &Document, line: usize) -> Position {
    doc.clamp_position(Position::new(line, usize::MAX))
}

fn ordered(doc: &Document, range: &Range<Position>) -> Range<Position> {
    let start = doc.clamp_position(range.start);
    let end = doc.clamp_position(range.end);
    if start <= end { start..end } else { end..start }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Document {
        Document::from_bytes(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_crlf_lines_keep_their_terminator() {
        let doc = doc("alpha\r\nbeta\r\n");

        let below = compile_command(
            &doc,
            &Cmd::InsertLineBelow {
                line: 0,
                text: "new".to_string(),
            },
        );
        assert_eq!(below.range, Position::new(0, 5)..Position::new(0, 5));
        assert_eq!(below.text, "\r\nnew");

        let duplicate = compile_command(&doc, &Cmd::DuplicateLine { line: 2 });
        assert_eq!(duplicate.text, "\r\n");
    }

    #[test]
    fn test_insert_line_below_targets_line_end() {
        let doc = doc("alpha\nbeta\n");
        let replacement = compile_command(
            &doc,
            &Cmd::InsertLineBelow {
                line: 0,
                text: "new".to_string(),
            },
        );

        assert_eq!(replacement.range, Position::new(0, 5)..Position::new(0, 5));
        assert_eq!(replacement.text, "\nnew");
    }

    #[test]
    fn test_duplicate_line_copies_content() {
        let doc = doc("alpha\n  beta");
        let replacement = compile_command(&doc, &Cmd::DuplicateLine { line: 1 });

        assert_eq!(replacement.range, Position::new(1, 6)..Position::new(1, 6));
        assert_eq!(replacement.text, "\n  beta");
    }

    #[test]
    fn test_delete_middle_line() {
        let doc = doc("a\nb\nc");
        let replacement = compile_command(&doc, &Cmd::DeleteLine { line: 1 });
        assert_eq!(replacement.range, Position::new(1, 0)..Position::new(2, 0));
    }

    #[test]
    fn test_delete_last_line() {
        let doc = doc("a\nbb");
        let replacement = compile_command(&doc, &Cmd::DeleteLine { line: 1 });
        assert_eq!(replacement.range, Position::new(0, 1)..Position::new(1, 2));
    }

    #[test]
    fn test_delete_only_line() {
        let doc = doc("solo");
        let replacement = compile_command(&doc, &Cmd::DeleteLine { line: 0 });
        assert_eq!(replacement.range, Position::new(0, 0)..Position::new(0, 4));
    }

    #[test]
    fn test_reversed_range_is_swapped() {
        let doc = doc("one\ntwo");
        let replacement = compile_command(
            &doc,
            &Cmd::DeleteRange {
                range: Position::new(1, 2)..Position::new(0, 1),
            },
        );
        assert_eq!(replacement.range, Position::new(0, 1)..Position::new(1, 2));
    }

    #[test]
    fn test_positions_are_clamped() {
        let doc = doc("one\ntwo");
        let replacement = compile_command(
            &doc,
            &Cmd::InsertText {
                at: Position::new(9, 9),
                text: "!".to_string(),
            },
        );
        assert_eq!(replacement.range.start, Position::new(1, 3));
    }
}
