/*!
 * # Editing
 *
 * The host side of the navigator: a rope-backed [`Document`] that applies
 * [`Cmd`]s and reports every edit as an [`EditChange`].
 *
 * ## Flow
 *
 * 1. A command is compiled into one replacement in pre-edit coordinates
 * 2. The replacement becomes an xi-rope `Delta` applied to the buffer
 * 3. The change is reported back (`EditChange`), which normalizes into the
 *    `EditDelta` consumed by [`crate::tracking::LineAnchorTracker`]
 *
 * ```rust
 * use line_navigator_engine::editing::{Cmd, Document};
 *
 * let mut doc = Document::from_bytes(b"fn main() {\n}\n").unwrap();
 * let changes = doc.apply(Cmd::InsertLineBelow { line: 0, text: "    run();".to_string() });
 * assert_eq!(changes[0].delta().lines_delta_count, 1);
 * ```
 */

pub mod commands;
pub mod document;
pub mod patch;

pub use commands::Cmd;
pub use document::{Document, LineInfo};
pub use patch::{EditChange, Position};
