use crate::tracking::{DocumentId, EditDelta};

/// Line/column position; the column counts chars, not bytes
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// One edit as reported by the document change feed
///
/// `start..end` is the replaced range in the coordinates of the document
/// *before* the edit; `text` is what was inserted in its place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditChange {
    pub document_id: DocumentId,
    pub start: Position,
    pub end: Position,
    pub text: String,
    /// Document version after this change was applied
    pub version: u64,
}

impl EditChange {
    pub fn range(&self) -> std::ops::Range<Position> {
        self.start..self.end
    }

    /// Net number of lines added (positive) or removed (negative)
    pub fn lines_delta_count(&self) -> isize {
        let inserted = self.text.matches('\n').count() as isize;
        let removed = (self.end.line - self.start.line) as isize;
        inserted - removed
    }

    /// Normalize into the shape the anchor tracker consumes
    pub fn delta(&self) -> EditDelta {
        EditDelta {
            document_id: self.document_id,
            lines_start: self.start.line,
            char_start: self.start.column,
            lines_delta_count: self.lines_delta_count(),
        }
    }

    /// Whether the inserted text contains anything besides whitespace
    pub fn inserts_visible_text(&self) -> bool {
        self.text.chars().any(|c| !c.is_whitespace())
    }
}
