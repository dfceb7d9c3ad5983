use std::collections::HashSet;

use log::{debug, trace};

use crate::tracking::{
    Anchor, AnchorId, AnchorSet, Category, DocumentId, EditDelta, InsertPosition, NewAnchor,
    SectionId,
};

/// Keeps line-anchored annotations correct while their documents change
///
/// The tracker owns one [`AnchorSet`] per [`Category`]. Every operation is a
/// synchronous transformation of those lists: bad input is clamped or the
/// affected anchor dropped, nothing is reported as an error.
#[derive(Clone, Debug, Default)]
pub struct LineAnchorTracker {
    bookmarks: AnchorSet,
    recent: AnchorSet,
    levels: AnchorSet,
    next_id: u64,
    next_seq: u64,
}

impl LineAnchorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchors of one category, in set order
    pub fn anchors(&self, category: Category) -> &AnchorSet {
        match category {
            Category::Bookmark => &self.bookmarks,
            Category::Recent => &self.recent,
            Category::Level => &self.levels,
        }
    }

    fn anchors_mut(&mut self, category: Category) -> &mut AnchorSet {
        match category {
            Category::Bookmark => &mut self.bookmarks,
            Category::Recent => &mut self.recent,
            Category::Level => &mut self.levels,
        }
    }

    pub fn len(&self, category: Category) -> usize {
        self.anchors(category).len()
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL
            .iter()
            .all(|category| self.anchors(*category).is_empty())
    }

    pub fn get(&self, id: AnchorId) -> Option<&Anchor> {
        Category::ALL
            .iter()
            .find_map(|category| self.anchors(*category).get(id))
    }

    /// Shift anchors for one reported edit.
    ///
    /// Returns true when any anchor moved or was dropped.
    pub fn apply_edit(&mut self, delta: &EditDelta) -> bool {
        if delta.lines_delta_count == 0 {
            return false;
        }

        let mut changed = false;
        for category in Category::ALL {
            let set = self.anchors_mut(category);
            set.anchors.retain_mut(|anchor| {
                if !delta.shifts(anchor) {
                    return true;
                }
                changed = true;
                match anchor.line.checked_add_signed(delta.lines_delta_count) {
                    Some(line) => {
                        trace!("anchor {:?} moved {} -> {}", anchor.id, anchor.line, line);
                        anchor.line = line;
                        true
                    }
                    None => {
                        debug!("anchor {:?} dropped, line went negative", anchor.id);
                        false
                    }
                }
            });
            dedup_lines(set);
        }
        changed
    }

    /// Apply several edits in the order they were reported
    pub fn apply_edits(&mut self, deltas: &[EditDelta]) -> bool {
        deltas
            .iter()
            .fold(false, |changed, delta| self.apply_edit(delta) | changed)
    }

    /// Whether a new anchor at `line` is too close to an existing one.
    ///
    /// An anchor on exactly the same line does not suppress; that case is an
    /// update handled by [`upsert`](Self::upsert).
    pub fn should_suppress_new(
        &self,
        category: Category,
        document_id: DocumentId,
        line: usize,
        proximity: usize,
    ) -> bool {
        self.anchors(category)
            .for_document(document_id)
            .any(|existing| existing.line != line && existing.line.abs_diff(line) <= proximity)
    }

    /// Insert an anchor, or replace the one already on its line.
    ///
    /// After insertion the oldest anchors are evicted until at most `limit`
    /// remain. Returns a copy of the updated set for rendering.
    pub fn upsert(&mut self, new: NewAnchor, position: InsertPosition, limit: usize) -> AnchorSet {
        let seq = self.next_seq;
        self.next_seq += 1;
        let category = new.category;

        let existing = self
            .anchors(category)
            .anchors
            .iter()
            .position(|anchor| anchor.document_id == new.document_id && anchor.line == new.line);

        let id = match existing.map(|index| self.anchors(category).anchors[index].id) {
            Some(id) => id,
            None => {
                self.next_id += 1;
                AnchorId(self.next_id)
            }
        };

        let anchor = Anchor {
            id,
            document_id: new.document_id,
            line: new.line,
            first_visible_char: new.first_visible_char,
            text: new.text.trim().to_string(),
            category,
            section: new.section,
            seq,
        };

        let set = &mut self.anchors_mut(category).anchors;
        match (existing, position) {
            (Some(index), InsertPosition::Front) => {
                set.remove(index);
                set.insert(0, anchor);
            }
            (Some(index), InsertPosition::Back) => set[index] = anchor,
            (None, InsertPosition::Front) => set.insert(0, anchor),
            (None, InsertPosition::Back) => set.push(anchor),
        }

        while set.len() > limit {
            let Some(oldest) = set
                .iter()
                .enumerate()
                .min_by_key(|(_, anchor)| anchor.seq)
                .map(|(index, _)| index)
            else {
                break;
            };
            let evicted = set.remove(oldest);
            debug!(
                "evicted {:?} anchor at line {} (limit {limit})",
                category, evicted.line
            );
        }

        self.anchors(category).clone()
    }

    /// Remove one anchor; absent ids are ignored
    pub fn remove(&mut self, id: AnchorId) -> Option<Anchor> {
        for category in Category::ALL {
            let set = &mut self.anchors_mut(category).anchors;
            if let Some(index) = set.iter().position(|anchor| anchor.id == id) {
                return Some(set.remove(index));
            }
        }
        None
    }

    /// Remove every anchor of a bookmark section, returning how many went
    pub fn remove_section(&mut self, section: SectionId) -> usize {
        let set = &mut self.bookmarks.anchors;
        let before = set.len();
        set.retain(|anchor| anchor.section != Some(section));
        before - set.len()
    }

    /// Forget a closed document
    pub fn remove_document(&mut self, document_id: DocumentId) -> bool {
        self.retain_all(|anchor| anchor.document_id != document_id)
    }

    /// Drop anchors that point past the end of a document
    pub fn prune_beyond(&mut self, document_id: DocumentId, line_count: usize) -> bool {
        self.retain_all(|anchor| anchor.document_id != document_id || anchor.line < line_count)
    }

    pub fn clear(&mut self, category: Category) {
        self.anchors_mut(category).anchors.clear();
    }

    fn retain_all(&mut self, mut keep: impl FnMut(&Anchor) -> bool) -> bool {
        let mut changed = false;
        for category in Category::ALL {
            let set = &mut self.anchors_mut(category).anchors;
            let before = set.len();
            set.retain(&mut keep);
            changed |= set.len() != before;
        }
        changed
    }
}

/// Keep the first anchor per (document, line) after a shift made two collide
fn dedup_lines(set: &mut AnchorSet) {
    let mut seen = HashSet::new();
    set.anchors.retain(|anchor| {
        let unique = seen.insert((anchor.document_id, anchor.line));
        if !unique {
            debug!("anchor {:?} merged into line {}", anchor.id, anchor.line);
        }
        unique
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn bookmark(doc: DocumentId, line: usize) -> NewAnchor {
        NewAnchor::new(Category::Bookmark, doc, line, 0, format!("line {line}"))
    }

    fn tracker_with(doc: DocumentId, category: Category, lines: &[usize]) -> LineAnchorTracker {
        let mut tracker = LineAnchorTracker::new();
        for &line in lines {
            tracker.upsert(
                NewAnchor::new(category, doc, line, 0, format!("line {line}")),
                InsertPosition::Back,
                usize::MAX,
            );
        }
        tracker
    }

    fn delta(doc: DocumentId, lines_start: usize, char_start: usize, count: isize) -> EditDelta {
        EditDelta {
            document_id: doc,
            lines_start,
            char_start,
            lines_delta_count: count,
        }
    }

    #[test]
    fn test_in_line_edit_moves_nothing() {
        let doc = DocumentId::new();
        let mut tracker = tracker_with(doc, Category::Bookmark, &[0, 3, 7]);

        let changed = tracker.apply_edit(&delta(doc, 0, 0, 0));

        assert!(!changed);
        assert_eq!(tracker.anchors(Category::Bookmark).lines(), vec![0, 3, 7]);
    }

    #[test]
    fn test_lines_above_edit_are_unchanged() {
        let doc = DocumentId::new();
        let mut tracker = tracker_with(doc, Category::Recent, &[1, 4, 6, 10]);

        assert!(tracker.apply_edit(&delta(doc, 5, 0, 2)));

        assert_eq!(tracker.anchors(Category::Recent).lines(), vec![1, 4, 8, 12]);
    }

    #[rstest]
    #[case::edit_before_content(2, 4, 8)]
    #[case::edit_at_content(4, 4, 8)]
    #[case::edit_after_content(5, 4, 5)]
    fn test_same_line_tie_break(
        #[case] char_start: usize,
        #[case] first_visible_char: usize,
        #[case] expected_line: usize,
    ) {
        let doc = DocumentId::new();
        let mut tracker = LineAnchorTracker::new();
        tracker.upsert(
            NewAnchor::new(Category::Bookmark, doc, 5, first_visible_char, "    foo()"),
            InsertPosition::Back,
            10,
        );

        tracker.apply_edit(&delta(doc, 5, char_start, 3));

        assert_eq!(
            tracker.anchors(Category::Bookmark).lines(),
            vec![expected_line]
        );
    }

    #[test]
    fn test_insert_then_delete_round_trips() {
        let doc = DocumentId::new();
        let mut tracker = tracker_with(doc, Category::Bookmark, &[2, 5, 9, 20]);

        tracker.apply_edit(&delta(doc, 5, 0, 3));
        assert_eq!(tracker.anchors(Category::Bookmark).lines(), vec![2, 8, 12, 23]);

        tracker.apply_edit(&delta(doc, 5, 0, -3));
        assert_eq!(tracker.anchors(Category::Bookmark).lines(), vec![2, 5, 9, 20]);
    }

    #[test]
    fn test_negative_line_drops_anchor() {
        let doc = DocumentId::new();
        let mut tracker = tracker_with(doc, Category::Recent, &[0, 1, 6]);

        assert!(tracker.apply_edit(&delta(doc, 0, 0, -2)));

        assert_eq!(tracker.anchors(Category::Recent).lines(), vec![4]);
    }

    #[test]
    fn test_collapsed_lines_are_merged() {
        let doc = DocumentId::new();
        let mut tracker = LineAnchorTracker::new();
        // line 3 has content starting at column 4; an edit at column 8 leaves it alone
        tracker.upsert(
            NewAnchor::new(Category::Bookmark, doc, 3, 4, "    keep"),
            InsertPosition::Back,
            10,
        );
        tracker.upsert(bookmark(doc, 4), InsertPosition::Back, 10);

        tracker.apply_edit(&delta(doc, 3, 8, -1));

        let set = tracker.anchors(Category::Bookmark);
        assert_eq!(set.lines(), vec![3]);
        assert_eq!(set.as_slice()[0].text, "keep");
    }

    #[test]
    fn test_edit_only_touches_its_document() {
        let doc = DocumentId::new();
        let other = DocumentId::new();
        let mut tracker = tracker_with(doc, Category::Bookmark, &[5]);
        tracker.upsert(bookmark(other, 5), InsertPosition::Back, 10);

        tracker.apply_edit(&delta(doc, 0, 0, 1));

        let lines: Vec<(DocumentId, usize)> = tracker
            .anchors(Category::Bookmark)
            .iter()
            .map(|anchor| (anchor.document_id, anchor.line))
            .collect();
        assert_eq!(lines, vec![(doc, 6), (other, 5)]);
    }

    #[test]
    fn test_apply_edits_in_order() {
        let doc = DocumentId::new();
        let mut tracker = tracker_with(doc, Category::Level, &[10]);

        let changed = tracker.apply_edits(&[delta(doc, 0, 0, 2), delta(doc, 20, 0, 5)]);

        assert!(changed);
        assert_eq!(tracker.anchors(Category::Level).lines(), vec![12]);
    }

    #[rstest]
    #[case::near_line(5, true)]
    #[case::far_line(30, false)]
    #[case::same_line(12, false)]
    #[case::edge_of_range(22, true)]
    fn test_should_suppress_new(#[case] existing: usize, #[case] expected: bool) {
        let doc = DocumentId::new();
        let tracker = tracker_with(doc, Category::Recent, &[existing]);

        assert_eq!(
            tracker.should_suppress_new(Category::Recent, doc, 12, 10),
            expected
        );
    }

    #[test]
    fn test_suppression_is_per_category_and_document() {
        let doc = DocumentId::new();
        let tracker = tracker_with(doc, Category::Bookmark, &[5]);

        assert!(!tracker.should_suppress_new(Category::Recent, doc, 6, 10));
        assert!(!tracker.should_suppress_new(Category::Bookmark, DocumentId::new(), 6, 10));
    }

    #[test]
    fn test_upsert_replaces_same_line() {
        let doc = DocumentId::new();
        let mut tracker = LineAnchorTracker::new();
        let first = tracker.upsert(
            NewAnchor::new(Category::Recent, doc, 4, 0, "old"),
            InsertPosition::Front,
            10,
        );
        let id = first.as_slice()[0].id;

        let set = tracker.upsert(
            NewAnchor::new(Category::Recent, doc, 4, 2, "  new  "),
            InsertPosition::Front,
            10,
        );

        assert_eq!(set.len(), 1);
        assert_eq!(set.as_slice()[0].id, id);
        assert_eq!(set.as_slice()[0].text, "new");
        assert_eq!(set.as_slice()[0].first_visible_char, 2);
    }

    #[test]
    fn test_upsert_front_moves_existing_to_front() {
        let doc = DocumentId::new();
        let mut tracker = LineAnchorTracker::new();
        for line in [1, 2, 3] {
            tracker.upsert(
                NewAnchor::new(Category::Recent, doc, line, 0, "x"),
                InsertPosition::Front,
                10,
            );
        }
        assert_eq!(tracker.anchors(Category::Recent).lines(), vec![3, 2, 1]);

        let set = tracker.upsert(
            NewAnchor::new(Category::Recent, doc, 1, 0, "x"),
            InsertPosition::Front,
            10,
        );

        assert_eq!(set.lines(), vec![1, 3, 2]);
    }

    #[test]
    fn test_upsert_back_keeps_slot() {
        let doc = DocumentId::new();
        let mut tracker = tracker_with(doc, Category::Bookmark, &[1, 2, 3]);

        let set = tracker.upsert(bookmark(doc, 1), InsertPosition::Back, 10);

        assert_eq!(set.lines(), vec![1, 2, 3]);
    }

    #[test]
    fn test_upsert_evicts_oldest_front_inserted() {
        let doc = DocumentId::new();
        let mut tracker = LineAnchorTracker::new();
        for line in [10, 20, 30, 40] {
            tracker.upsert(
                NewAnchor::new(Category::Recent, doc, line, 0, "x"),
                InsertPosition::Front,
                3,
            );
        }

        assert_eq!(tracker.anchors(Category::Recent).lines(), vec![40, 30, 20]);
    }

    #[test]
    fn test_upsert_evicts_by_insertion_not_line() {
        let doc = DocumentId::new();
        let mut tracker = LineAnchorTracker::new();
        for line in [30, 10, 20] {
            tracker.upsert(bookmark(doc, line), InsertPosition::Back, 2);
        }

        assert_eq!(tracker.anchors(Category::Bookmark).lines(), vec![10, 20]);
    }

    #[test]
    fn test_upsert_never_exceeds_limit_or_duplicates() {
        let doc = DocumentId::new();
        let mut tracker = LineAnchorTracker::new();
        for line in [3, 1, 3, 4, 1, 5, 9, 2, 6, 5, 3] {
            let set = tracker.upsert(
                NewAnchor::new(Category::Recent, doc, line, 0, "x"),
                InsertPosition::Front,
                4,
            );
            assert!(set.len() <= 4);
            let mut lines = set.lines();
            lines.sort_unstable();
            lines.dedup();
            assert_eq!(lines.len(), set.len());
        }
    }

    #[test]
    fn test_upsert_zero_limit_keeps_nothing() {
        let doc = DocumentId::new();
        let mut tracker = LineAnchorTracker::new();

        let set = tracker.upsert(bookmark(doc, 1), InsertPosition::Back, 0);

        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let doc = DocumentId::new();
        let mut tracker = tracker_with(doc, Category::Bookmark, &[1, 2]);
        let id = tracker.anchors(Category::Bookmark).as_slice()[0].id;

        assert!(tracker.remove(id).is_some());
        assert!(tracker.remove(id).is_none());
        assert!(tracker.remove(AnchorId(999)).is_none());
        assert_eq!(tracker.anchors(Category::Bookmark).lines(), vec![2]);
    }

    #[test]
    fn test_remove_section() {
        let doc = DocumentId::new();
        let mut tracker = LineAnchorTracker::new();
        tracker.upsert(bookmark(doc, 1).in_section(SectionId(1)), InsertPosition::Back, 10);
        tracker.upsert(bookmark(doc, 2).in_section(SectionId(2)), InsertPosition::Back, 10);
        tracker.upsert(bookmark(doc, 3).in_section(SectionId(1)), InsertPosition::Back, 10);

        assert_eq!(tracker.remove_section(SectionId(1)), 2);
        assert_eq!(tracker.anchors(Category::Bookmark).lines(), vec![2]);
    }

    #[test]
    fn test_remove_document_and_prune() {
        let doc = DocumentId::new();
        let other = DocumentId::new();
        let mut tracker = tracker_with(doc, Category::Recent, &[1, 8, 12]);
        tracker.upsert(
            NewAnchor::new(Category::Recent, other, 50, 0, "x"),
            InsertPosition::Back,
            10,
        );

        assert!(tracker.prune_beyond(doc, 10));
        assert_eq!(tracker.anchors(Category::Recent).lines(), vec![1, 8, 50]);

        assert!(tracker.remove_document(doc));
        assert_eq!(tracker.anchors(Category::Recent).lines(), vec![50]);
        assert!(!tracker.remove_document(doc));
    }
}
