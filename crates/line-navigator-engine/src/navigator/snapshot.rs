use crate::tracking::{AnchorId, DocumentId, SectionId};

pub const TRI_DOT_HORIZONTAL: char = '⋯';
pub const TRI_DOT_VERTICAL: char = '⋮';
pub const TRI_DOT: char = '⋰';

pub const LEVELS_LABEL: &str = "Line Levels";
pub const RECENT_LABEL: &str = "Recent Edits";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Levels,
    Recent,
    Bookmarks(SectionId),
}

/// Immutable view of the navigator for rendering
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigatorSnapshot {
    pub sections: Vec<SnapshotSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSection {
    pub kind: SectionKind,
    pub label: String,
    pub items: Vec<SnapshotItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotItem {
    pub anchor_id: AnchorId,
    pub document_id: DocumentId,
    pub line: usize,
    pub label: String,
    pub description: String,
}

impl NavigatorSnapshot {
    pub fn section(&self, kind: SectionKind) -> Option<&SnapshotSection> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|section| section.items.len()).sum()
    }
}

/// `"notes.txt ⋮ 12 ⋮ "`
pub fn recent_label(document_name: &str, line: usize) -> String {
    format!(
        "{document_name} {TRI_DOT_VERTICAL} {} {TRI_DOT_VERTICAL} ",
        line + 1
    )
}

/// `"12 ⋮ "`
pub fn line_label(line: usize) -> String {
    format!("{} {TRI_DOT_VERTICAL} ", line + 1)
}

/// `"Bookmarks ⋯ notes.txt ⋰ subtitle"`
pub fn bookmarks_label(document_name: &str, subtitle: &str) -> String {
    format!("Bookmarks {TRI_DOT_HORIZONTAL} {document_name} {TRI_DOT} {subtitle}")
}
