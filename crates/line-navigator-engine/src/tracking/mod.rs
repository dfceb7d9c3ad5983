//! Line-anchored annotations that survive document edits.
//!
//! A [`LineAnchorTracker`] holds bookmarks, recent-edit markers and level
//! markers for any number of open documents. Callers feed it the
//! [`EditDelta`]s the document reports, ask it whether a new recent-edit
//! entry would be a near duplicate, and upsert entries under a per-category
//! limit. Rendering reads the resulting [`AnchorSet`]s.

pub mod anchor;
pub mod tracker;

pub use anchor::{
    Anchor, AnchorId, AnchorSet, Category, DocumentId, EditDelta, InsertPosition, NewAnchor,
    SectionId,
};
pub use tracker::LineAnchorTracker;
