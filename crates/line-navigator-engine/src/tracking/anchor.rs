use uuid::Uuid;

/// Opaque identifier of an open document
///
/// Anchors hold this instead of a reference to the document, so the tracker
/// never outlives or pins the documents it annotates.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for an anchor, assigned by the tracker
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct AnchorId(pub u64);

/// Identifier of a bookmark section (one "add bookmarks" request)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct SectionId(pub u64);

/// Grouping of anchors with independent limits and eviction
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Category {
    Bookmark,
    Recent,
    Level,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Bookmark, Category::Recent, Category::Level];
}

/// Where a new or updated anchor lands in its set
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum InsertPosition {
    /// Move to the front (most recent first)
    Front,
    /// Append new anchors; updated anchors keep their slot
    #[default]
    Back,
}

/// A line-anchored annotation
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    pub id: AnchorId,
    pub document_id: DocumentId,
    /// Zero-based line, shifted as edits are reported
    pub line: usize,
    /// Column of the first non-whitespace character when captured
    pub first_visible_char: usize,
    /// Trimmed line content when captured; never re-synced
    pub text: String,
    pub category: Category,
    pub section: Option<SectionId>,
    /// Insertion stamp, oldest evicted first
    pub(crate) seq: u64,
}

/// Request to create (or replace) an anchor
#[derive(Clone, Debug, PartialEq)]
pub struct NewAnchor {
    pub category: Category,
    pub document_id: DocumentId,
    pub line: usize,
    pub first_visible_char: usize,
    pub text: String,
    pub section: Option<SectionId>,
}

impl NewAnchor {
    pub fn new(
        category: Category,
        document_id: DocumentId,
        line: usize,
        first_visible_char: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            category,
            document_id,
            line,
            first_visible_char,
            text: text.into(),
            section: None,
        }
    }

    pub fn in_section(mut self, section: SectionId) -> Self {
        self.section = Some(section);
        self
    }
}

/// Effect of one document mutation on line numbering
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EditDelta {
    pub document_id: DocumentId,
    /// First affected line
    pub lines_start: usize,
    /// Column on `lines_start` where the edit begins
    pub char_start: usize,
    /// Net line count change; zero for in-line edits
    pub lines_delta_count: isize,
}

impl EditDelta {
    /// Whether this edit shifts the given anchor.
    ///
    /// Anchors above the edit stay put. On the edited line itself an anchor
    /// only moves when the edit starts at or before its first visible
    /// character.
    pub fn shifts(&self, anchor: &Anchor) -> bool {
        if self.lines_delta_count == 0 || anchor.document_id != self.document_id {
            return false;
        }
        if anchor.line < self.lines_start {
            return false;
        }
        !(anchor.line == self.lines_start && self.char_start > anchor.first_visible_char)
    }
}

/// Ordered anchors of one category
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnchorSet {
    pub(crate) anchors: Vec<Anchor>,
}

impl AnchorSet {
    pub fn iter(&self) -> std::slice::Iter<'_, Anchor> {
        self.anchors.iter()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn as_slice(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn get(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors.iter().find(|anchor| anchor.id == id)
    }

    /// Lines in set order
    pub fn lines(&self) -> Vec<usize> {
        self.anchors.iter().map(|anchor| anchor.line).collect()
    }

    pub fn for_document(&self, document_id: DocumentId) -> impl Iterator<Item = &Anchor> {
        self.anchors
            .iter()
            .filter(move |anchor| anchor.document_id == document_id)
    }

    pub fn in_section(&self, section: SectionId) -> impl Iterator<Item = &Anchor> {
        self.anchors
            .iter()
            .filter(move |anchor| anchor.section == Some(section))
    }
}

impl<'a> IntoIterator for &'a AnchorSet {
    type Item = &'a Anchor;
    type IntoIter = std::slice::Iter<'a, Anchor>;

    fn into_iter(self) -> Self::IntoIter {
        self.anchors.iter()
    }
}
