//! Recent edits, bookmarks and line levels on top of a [`LineAnchorTracker`].
//!
//! The [`Navigator`] is what an editor integration talks to. It receives
//! document changes and cursor moves, applies the recent-edit coalescing and
//! bookmark section policies, and exposes a [`NavigatorSnapshot`] for
//! rendering.

pub mod snapshot;

use std::collections::HashMap;
use std::ops::Range;

use log::debug;

use crate::editing::{Document, EditChange, Position};
use crate::navigation::{self, RegionError};
use crate::tracking::{
    AnchorId, Category, DocumentId, EditDelta, InsertPosition, LineAnchorTracker, NewAnchor,
    SectionId,
};

pub use snapshot::{NavigatorSnapshot, SectionKind, SnapshotItem, SnapshotSection};

#[derive(Debug, thiserror::Error)]
pub enum NavigatorError {
    #[error("No text selected or text under cursor")]
    EmptySelection,
    #[error(transparent)]
    Region(#[from] RegionError),
}

/// Limits and ranges the navigator works with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorSettings {
    /// Maximum recent-edit entries
    pub recent_limit: usize,
    /// Maximum bookmark sections
    pub matches_limit: usize,
    /// Edits within this many lines of a recorded one are not recorded again
    pub recent_range: usize,
    /// Maximum bookmarked lines across all sections
    pub bookmark_line_limit: usize,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            recent_limit: 10,
            matches_limit: 5,
            recent_range: 5,
            bookmark_line_limit: 500,
        }
    }
}

/// One group of bookmarks created by a single request
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkSection {
    pub id: SectionId,
    pub document_id: DocumentId,
    pub subtitle: String,
}

/// Something the user can remove from the navigator view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef {
    Anchor(AnchorId),
    Section(SectionId),
}

#[derive(Debug, Default)]
pub struct Navigator {
    tracker: LineAnchorTracker,
    settings: NavigatorSettings,
    /// Newest first
    sections: Vec<BookmarkSection>,
    next_section: u64,
    document_names: HashMap<DocumentId, String>,
}

impl Navigator {
    pub fn new(settings: NavigatorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &NavigatorSettings {
        &self.settings
    }

    pub fn tracker(&self) -> &LineAnchorTracker {
        &self.tracker
    }

    pub fn sections(&self) -> &[BookmarkSection] {
        &self.sections
    }

    fn remember(&mut self, doc: &Document) {
        self.document_names
            .entry(doc.id())
            .or_insert_with(|| doc.name().to_string());
    }

    fn document_name(&self, document_id: DocumentId) -> &str {
        self.document_names
            .get(&document_id)
            .map(String::as_str)
            .unwrap_or("untitled")
    }

    /// React to edits reported by a document.
    ///
    /// Existing anchors are shifted first. A recent-edit entry is then
    /// recorded for the lines the edit touched, unless an entry already
    /// exists within `recent_range` lines of the first change (on a different
    /// line) or the first change inserted only whitespace. Returns whether
    /// anything visible changed.
    pub fn on_document_change(&mut self, doc: &Document, changes: &[EditChange]) -> bool {
        self.remember(doc);

        let deltas: Vec<EditDelta> = changes.iter().map(EditChange::delta).collect();
        let mut changed = self.tracker.apply_edits(&deltas);
        changed |= self.tracker.prune_beyond(doc.id(), doc.line_count());

        let Some(first) = changes.first() else {
            return changed;
        };

        let line = first.start.line;
        if self.tracker.should_suppress_new(
            Category::Recent,
            doc.id(),
            line,
            self.settings.recent_range,
        ) {
            debug!("recent edit at line {line} is close to an existing entry");
            return changed;
        }

        if !first.inserts_visible_text() {
            return changed;
        }

        let lines = navigation::lines_from_ranges(doc, changes.iter().map(EditChange::range));
        for info in lines {
            self.tracker.upsert(
                NewAnchor::new(
                    Category::Recent,
                    doc.id(),
                    info.number,
                    info.first_visible_char,
                    info.text,
                ),
                InsertPosition::Front,
                self.settings.recent_limit,
            );
            changed = true;
        }
        changed
    }

    /// Add a bookmark section holding the lines touched by `ranges`.
    ///
    /// The oldest sections are dropped so that, with the new one, at most
    /// `matches_limit` remain. A line already bookmarked moves to the new
    /// section.
    pub fn add_bookmarks(
        &mut self,
        doc: &Document,
        ranges: &[Range<Position>],
        subtitle: &str,
    ) -> Result<SectionId, NavigatorError> {
        if subtitle.is_empty() || ranges.is_empty() {
            return Err(NavigatorError::EmptySelection);
        }
        self.remember(doc);

        while self.sections.len() >= self.settings.matches_limit.max(1) {
            let Some(evicted) = self.sections.pop() else {
                break;
            };
            let removed = self.tracker.remove_section(evicted.id);
            debug!("evicted bookmark section {:?} ({removed} lines)", evicted.id);
        }

        self.next_section += 1;
        let id = SectionId(self.next_section);
        self.sections.insert(
            0,
            BookmarkSection {
                id,
                document_id: doc.id(),
                subtitle: subtitle.to_string(),
            },
        );

        let lines = navigation::lines_from_ranges(doc, ranges.iter().cloned());

        // Lines bookmarked before are re-added at the back so the new
        // section stays in line order
        let moved: Vec<AnchorId> = self
            .tracker
            .anchors(Category::Bookmark)
            .for_document(doc.id())
            .filter(|anchor| lines.iter().any(|info| info.number == anchor.line))
            .map(|anchor| anchor.id)
            .collect();
        for id in moved {
            self.tracker.remove(id);
        }

        for info in lines {
            self.tracker.upsert(
                NewAnchor::new(
                    Category::Bookmark,
                    doc.id(),
                    info.number,
                    info.first_visible_char,
                    info.text,
                )
                .in_section(id),
                InsertPosition::Back,
                self.settings.bookmark_line_limit,
            );
        }

        // Sections whose lines all moved to the new one are gone
        let bookmarks = self.tracker.anchors(Category::Bookmark);
        self.sections
            .retain(|section| section.id == id || bookmarks.in_section(section.id).next().is_some());

        Ok(id)
    }

    /// Bookmark the current selection(s), or the word under the cursor, and
    /// all other occurrences of it
    pub fn add_selection_bookmarks(
        &mut self,
        doc: &Document,
        selections: &[Range<Position>],
        cursor: Position,
    ) -> Result<SectionId, NavigatorError> {
        let ranges = navigation::selections_or_matches_or_word(doc, selections, cursor);
        let subtitle = match ranges.first() {
            Some(range) => doc.text_in(range.clone()).into_owned(),
            None => String::new(),
        };
        self.add_bookmarks(doc, &ranges, &subtitle)
    }

    /// Bookmark every line matching a regular expression
    pub fn add_pattern_bookmarks(
        &mut self,
        doc: &Document,
        pattern: &str,
    ) -> Result<SectionId, NavigatorError> {
        let ranges = navigation::pattern_matches(doc, pattern)?;
        self.add_bookmarks(doc, &ranges, pattern)
    }

    /// Rebuild the line levels for a cursor move
    pub fn refresh_levels(&mut self, doc: &Document, cursor_line: usize, tab_width: usize) {
        self.remember(doc);
        self.tracker.clear(Category::Level);

        let ancestors = doc.ancestors_of(cursor_line, tab_width);
        let limit = ancestors.len();
        for info in ancestors.into_iter().filter_map(|line| doc.line(line)) {
            self.tracker.upsert(
                NewAnchor::new(
                    Category::Level,
                    doc.id(),
                    info.number,
                    info.first_visible_char,
                    info.text,
                ),
                InsertPosition::Back,
                limit,
            );
        }
    }

    /// Remove an entry or a whole bookmark section; unknown items are ignored
    pub fn remove_item(&mut self, item: ItemRef) -> bool {
        match item {
            ItemRef::Anchor(id) => {
                let removed = self.tracker.remove(id);
                if let Some(section) = removed.as_ref().and_then(|anchor| anchor.section) {
                    let bookmarks = self.tracker.anchors(Category::Bookmark);
                    if bookmarks.in_section(section).next().is_none() {
                        self.sections.retain(|existing| existing.id != section);
                    }
                }
                removed.is_some()
            }
            ItemRef::Section(section) => {
                let before = self.sections.len();
                self.sections.retain(|existing| existing.id != section);
                self.tracker.remove_section(section);
                before != self.sections.len()
            }
        }
    }

    /// Forget everything about a closed document
    pub fn close_document(&mut self, document_id: DocumentId) {
        self.tracker.remove_document(document_id);
        self.sections
            .retain(|section| section.document_id != document_id);
        self.document_names.remove(&document_id);
    }

    /// Bookmark entry on `line` in the newest section that has one
    pub fn find_item_at_line(&self, document_id: DocumentId, line: usize) -> Option<AnchorId> {
        let bookmarks = self.tracker.anchors(Category::Bookmark);
        self.sections.iter().find_map(|section| {
            bookmarks
                .in_section(section.id)
                .find(|anchor| anchor.document_id == document_id && anchor.line == line)
                .map(|anchor| anchor.id)
        })
    }

    pub fn snapshot(&self) -> NavigatorSnapshot {
        let item = |anchor: &crate::tracking::Anchor, label: String| SnapshotItem {
            anchor_id: anchor.id,
            document_id: anchor.document_id,
            line: anchor.line,
            label,
            description: anchor.text.clone(),
        };

        let mut sections = vec![
            SnapshotSection {
                kind: SectionKind::Levels,
                label: snapshot::LEVELS_LABEL.to_string(),
                items: self
                    .tracker
                    .anchors(Category::Level)
                    .iter()
                    .map(|anchor| item(anchor, snapshot::line_label(anchor.line)))
                    .collect(),
            },
            SnapshotSection {
                kind: SectionKind::Recent,
                label: snapshot::RECENT_LABEL.to_string(),
                items: self
                    .tracker
                    .anchors(Category::Recent)
                    .iter()
                    .map(|anchor| {
                        let name = self.document_name(anchor.document_id);
                        item(anchor, snapshot::recent_label(name, anchor.line))
                    })
                    .collect(),
            },
        ];

        let bookmarks = self.tracker.anchors(Category::Bookmark);
        sections.extend(self.sections.iter().map(|section| SnapshotSection {
            kind: SectionKind::Bookmarks(section.id),
            label: snapshot::bookmarks_label(
                self.document_name(section.document_id),
                &section.subtitle,
            ),
            items: bookmarks
                .in_section(section.id)
                .map(|anchor| item(anchor, snapshot::line_label(anchor.line)))
                .collect(),
        }));

        NavigatorSnapshot { sections }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::Cmd;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "\
fn main() {
    let total = 0;
    for item in items {
        total += item;
    }
    println!(\"{total}\");
}
";

    fn doc(text: &str) -> Document {
        Document::from_bytes(text.as_bytes())
            .unwrap()
            .with_name("main.rs")
    }

    fn navigator() -> Navigator {
        Navigator::new(NavigatorSettings {
            recent_limit: 3,
            matches_limit: 2,
            recent_range: 2,
            bookmark_line_limit: 100,
        })
    }

    fn type_at(navigator: &mut Navigator, doc: &mut Document, line: usize, text: &str) -> bool {
        let changes = doc.apply(Cmd::InsertText {
            at: Position::new(line, 0),
            text: text.to_string(),
        });
        navigator.on_document_change(doc, &changes)
    }

    fn lines(navigator: &Navigator, category: Category) -> Vec<usize> {
        navigator.tracker().anchors(category).lines()
    }

    #[test]
    fn test_edit_records_recent_line() {
        let mut doc = doc(SOURCE);
        let mut navigator = navigator();

        assert!(type_at(&mut navigator, &mut doc, 3, "x"));

        let snapshot = navigator.snapshot();
        let recent = snapshot.section(SectionKind::Recent).unwrap();
        assert_eq!(recent.items.len(), 1);
        assert_eq!(recent.items[0].label, "main.rs ⋮ 4 ⋮ ");
        assert_eq!(recent.items[0].description, "x        total += item;");
    }

    #[test]
    fn test_nearby_edit_is_coalesced() {
        let mut doc = doc(SOURCE);
        let mut navigator = navigator();
        type_at(&mut navigator, &mut doc, 1, "a");

        type_at(&mut navigator, &mut doc, 3, "b");

        assert_eq!(lines(&navigator, Category::Recent), vec![1]);
    }

    #[test]
    fn test_same_line_edit_updates_entry() {
        let mut doc = doc(SOURCE);
        let mut navigator = navigator();
        type_at(&mut navigator, &mut doc, 5, "a");

        type_at(&mut navigator, &mut doc, 5, "b");

        let recent = navigator.tracker().anchors(Category::Recent);
        assert_eq!(recent.lines(), vec![5]);
        assert_eq!(recent.as_slice()[0].text, "ba    println!(\"{total}\");");
    }

    #[test]
    fn test_whitespace_edit_is_not_recorded() {
        let mut doc = doc(SOURCE);
        let mut navigator = navigator();

        assert!(!type_at(&mut navigator, &mut doc, 2, "   "));
        assert!(navigator.tracker().anchors(Category::Recent).is_empty());
    }

    #[test]
    fn test_recent_limit_keeps_newest() {
        let text: String = (0..40).map(|n| format!("line {n}\n")).collect();
        let mut doc = doc(&text);
        let mut navigator = navigator();

        for line in [0, 10, 20, 30] {
            type_at(&mut navigator, &mut doc, line, "x");
        }

        assert_eq!(lines(&navigator, Category::Recent), vec![30, 20, 10]);
    }

    #[test]
    fn test_new_lines_shift_existing_entries() {
        let mut doc = doc(SOURCE);
        let mut navigator = navigator();
        type_at(&mut navigator, &mut doc, 5, "x");
        let ranges = vec![Position::new(3, 8)..Position::new(3, 13)];
        navigator.add_bookmarks(&doc, &ranges, "total").unwrap();

        let changes = doc.apply(Cmd::InsertLineBelow {
            line: 0,
            text: String::new(),
        });
        let changed = navigator.on_document_change(&doc, &changes);

        assert!(changed);
        assert_eq!(lines(&navigator, Category::Recent), vec![6]);
        assert_eq!(lines(&navigator, Category::Bookmark), vec![4]);
    }

    #[test]
    fn test_deleted_first_line_drops_its_entry() {
        let mut doc = doc("alpha\nbeta\ngamma");
        let mut navigator = navigator();
        type_at(&mut navigator, &mut doc, 0, "x");

        let changes = doc.apply(Cmd::DeleteLine { line: 0 });
        navigator.on_document_change(&doc, &changes);

        assert!(navigator.tracker().anchors(Category::Recent).is_empty());
    }

    #[test]
    fn test_add_bookmarks_creates_sorted_section() {
        let doc = doc(SOURCE);
        let mut navigator = navigator();

        let id = navigator
            .add_selection_bookmarks(&doc, &[], Position::new(3, 10))
            .unwrap();

        let snapshot = navigator.snapshot();
        let section = snapshot.section(SectionKind::Bookmarks(id)).unwrap();
        assert_eq!(section.label, "Bookmarks ⋯ main.rs ⋰ total");
        let items: Vec<(usize, &str)> = section
            .items
            .iter()
            .map(|item| (item.line, item.label.as_str()))
            .collect();
        assert_eq!(items, vec![(1, "2 ⋮ "), (3, "4 ⋮ "), (5, "6 ⋮ ")]);
        assert_eq!(navigator.find_item_at_line(doc.id(), 3), Some(section.items[1].anchor_id));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let doc = doc("   \n");
        let mut navigator = navigator();

        let result = navigator.add_selection_bookmarks(&doc, &[], Position::new(0, 1));

        assert!(matches!(result, Err(NavigatorError::EmptySelection)));
        assert!(navigator.sections().is_empty());
    }

    #[test]
    fn test_pattern_bookmarks() {
        let doc = doc(SOURCE);
        let mut navigator = navigator();

        navigator.add_pattern_bookmarks(&doc, r"^\s+\w+!").unwrap();
        assert_eq!(lines(&navigator, Category::Bookmark), vec![5]);

        let result = navigator.add_pattern_bookmarks(&doc, "(");
        assert!(matches!(result, Err(NavigatorError::Region(_))));
    }

    #[test]
    fn test_matches_limit_evicts_oldest_section() {
        let doc = doc(SOURCE);
        let mut navigator = navigator();

        let first = navigator.add_pattern_bookmarks(&doc, "fn").unwrap();
        let second = navigator.add_pattern_bookmarks(&doc, "for").unwrap();
        let third = navigator.add_pattern_bookmarks(&doc, "let").unwrap();

        let ids: Vec<SectionId> = navigator.sections().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![third, second]);
        assert!(
            navigator
                .tracker()
                .anchors(Category::Bookmark)
                .in_section(first)
                .next()
                .is_none()
        );
    }

    #[test]
    fn test_rebookmarked_line_moves_to_new_section() {
        let doc = doc(SOURCE);
        let mut navigator = navigator();

        let first = navigator.add_pattern_bookmarks(&doc, "items").unwrap();
        let second = navigator.add_pattern_bookmarks(&doc, "item").unwrap();

        let ids: Vec<SectionId> = navigator.sections().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![second]);
        assert_ne!(first, second);
        assert_eq!(lines(&navigator, Category::Bookmark), vec![2, 3]);
    }

    #[test]
    fn test_rebookmarked_lines_keep_line_order() {
        let doc = doc(SOURCE);
        let mut navigator = navigator();

        navigator.add_pattern_bookmarks(&doc, "println").unwrap();
        let section = navigator.add_pattern_bookmarks(&doc, "total").unwrap();

        let snapshot = navigator.snapshot();
        let items: Vec<usize> = snapshot
            .section(SectionKind::Bookmarks(section))
            .unwrap()
            .items
            .iter()
            .map(|item| item.line)
            .collect();
        assert_eq!(items, vec![1, 3, 5]);
        assert_eq!(navigator.sections().len(), 1);
    }

    #[test]
    fn test_refresh_levels() {
        let doc = doc(SOURCE);
        let mut navigator = navigator();

        navigator.refresh_levels(&doc, 3, 4);
        assert_eq!(lines(&navigator, Category::Level), vec![0, 2]);

        navigator.refresh_levels(&doc, 1, 4);
        let snapshot = navigator.snapshot();
        let levels = snapshot.section(SectionKind::Levels).unwrap();
        assert_eq!(levels.items.len(), 1);
        assert_eq!(levels.items[0].label, "1 ⋮ ");
        assert_eq!(levels.items[0].description, "fn main() {");
    }

    #[test]
    fn test_remove_items() {
        let doc = doc(SOURCE);
        let mut navigator = navigator();
        let section = navigator.add_pattern_bookmarks(&doc, "total").unwrap();
        let anchor = navigator.find_item_at_line(doc.id(), 1).unwrap();

        assert!(navigator.remove_item(ItemRef::Anchor(anchor)));
        assert!(!navigator.remove_item(ItemRef::Anchor(anchor)));
        assert_eq!(lines(&navigator, Category::Bookmark), vec![3, 5]);

        assert!(navigator.remove_item(ItemRef::Section(section)));
        assert!(navigator.sections().is_empty());
        assert!(navigator.tracker().anchors(Category::Bookmark).is_empty());
    }

    #[test]
    fn test_removing_last_item_drops_section() {
        let doc = doc(SOURCE);
        let mut navigator = navigator();
        navigator.add_pattern_bookmarks(&doc, "println").unwrap();
        let anchor = navigator.find_item_at_line(doc.id(), 5).unwrap();

        navigator.remove_item(ItemRef::Anchor(anchor));

        assert!(navigator.sections().is_empty());
    }

    #[test]
    fn test_snapshot_section_order() {
        let doc = doc(SOURCE);
        let mut navigator = navigator();
        navigator.add_pattern_bookmarks(&doc, "fn").unwrap();

        let kinds: Vec<SectionKind> = navigator
            .snapshot()
            .sections
            .iter()
            .map(|section| section.kind)
            .collect();

        assert_eq!(kinds[0], SectionKind::Levels);
        assert_eq!(kinds[1], SectionKind::Recent);
        assert!(matches!(kinds[2], SectionKind::Bookmarks(_)));
    }

    #[test]
    fn test_close_document() {
        let mut doc = doc(SOURCE);
        let mut navigator = navigator();
        type_at(&mut navigator, &mut doc, 1, "x");
        navigator.add_pattern_bookmarks(&doc, "fn").unwrap();

        navigator.close_document(doc.id());

        assert!(navigator.tracker().is_empty());
        assert!(navigator.sections().is_empty());
    }
}
