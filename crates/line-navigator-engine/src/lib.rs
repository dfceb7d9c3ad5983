pub mod colorizer;
pub mod editing;
pub mod io;
pub mod levels;
pub mod navigation;
pub mod navigator;
pub mod tracking;

// Re-export key types for easier usage
pub use editing::{Cmd, Document, EditChange, LineInfo, Position};
pub use levels::{LineLevel, find_ancestors, line_level};
pub use navigator::{
    ItemRef, Navigator, NavigatorError, NavigatorSettings, NavigatorSnapshot, SectionKind,
};
pub use tracking::*;
