use std::borrow::Cow;
use std::ops::Range;
use std::path::Path;

use log::trace;
use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::{Cmd, EditChange, Position, commands::compile_command};
use crate::levels::{self, LineLevel};
use crate::tracking::DocumentId;

/// Extensions treated as plain text by the colorizer
const PLAINTEXT_EXTENSIONS: &[&str] = &["txt", "text", "log"];

/// A single line as seen by the navigator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInfo {
    /// Zero-based line number
    pub number: usize,
    /// Line content without its line ending
    pub text: String,
    /// Column of the first non-whitespace char, or the line length when blank
    pub first_visible_char: usize,
}

impl LineInfo {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Text document held in an xi-rope buffer
///
/// This is the host side of the navigator: it owns the text, applies edit
/// commands and reports each edit as an [`EditChange`] so anchor tracking can
/// follow along. Columns in every [`Position`] count chars.
#[derive(Clone, Debug)]
pub struct Document {
    pub(crate) id: DocumentId,
    pub(crate) name: String,
    pub(crate) buffer: Rope,
    pub(crate) version: u64,
}

impl Document {
    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self {
            id: DocumentId::new(),
            name: "untitled".to_string(),
            buffer: Rope::from(text),
            version: 0,
        })
    }

    /// Set the display name, usually the file name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Plain text documents get the indentation colorizer
    pub fn is_plaintext(&self) -> bool {
        match Path::new(&self.name).extension() {
            Some(ext) => PLAINTEXT_EXTENSIONS
                .iter()
                .any(|plain| ext.eq_ignore_ascii_case(plain)),
            None => true,
        }
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.text().into_bytes()
    }

    /// Number of lines; a trailing newline starts one more (empty) line
    pub fn line_count(&self) -> usize {
        self.buffer.line_of_offset(self.buffer.len()) + 1
    }

    fn line_bounds(&self, line: usize) -> Option<Range<usize>> {
        let count = self.line_count();
        if line >= count {
            return None;
        }
        let start = self.buffer.offset_of_line(line);
        let end = if line + 1 < count {
            self.buffer.offset_of_line(line + 1)
        } else {
            self.buffer.len()
        };
        Some(start..end)
    }

    /// Line content without the line ending
    pub fn line_text(&self, line: usize) -> Option<String> {
        let bounds = self.line_bounds(line)?;
        let raw = self.buffer.slice_to_cow(bounds);
        Some(raw.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Terminator used by `line`, or by the line above when it has none
    pub fn line_ending(&self, line: usize) -> &'static str {
        let line = line.min(self.line_count() - 1);
        (0..=line)
            .rev()
            .filter_map(|n| self.line_bounds(n))
            .map(|bounds| self.buffer.slice_to_cow(bounds))
            .find(|raw| raw.ends_with('\n'))
            .map_or("\n", |raw| if raw.ends_with("\r\n") { "\r\n" } else { "\n" })
    }

    pub fn line(&self, line: usize) -> Option<LineInfo> {
        let text = self.line_text(line)?;
        let first_visible_char = text
            .chars()
            .position(|c| !c.is_whitespace())
            .unwrap_or_else(|| text.chars().count());
        Some(LineInfo {
            number: line,
            text,
            first_visible_char,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = LineInfo> + '_ {
        (0..self.line_count()).filter_map(|line| self.line(line))
    }

    /// Length of a line in chars
    pub fn line_len(&self, line: usize) -> usize {
        self.line_text(line)
            .map(|text| text.chars().count())
            .unwrap_or(0)
    }

    /// Pull a position back inside the document
    pub fn clamp_position(&self, position: Position) -> Position {
        let line = position.line.min(self.line_count() - 1);
        Position::new(line, position.column.min(self.line_len(line)))
    }

    /// Byte offset in the buffer for a (clamped) position
    pub fn offset_of(&self, position: Position) -> usize {
        let position = self.clamp_position(position);
        let start = self.buffer.offset_of_line(position.line);
        let text = self.line_text(position.line).unwrap_or_default();
        let byte_column = text
            .char_indices()
            .nth(position.column)
            .map(|(index, _)| index)
            .unwrap_or(text.len());
        start + byte_column
    }

    /// Position of a byte offset in the buffer
    pub fn position_of(&self, offset: usize) -> Position {
        let offset = offset.min(self.buffer.len());
        let line = self.buffer.line_of_offset(offset);
        let line_start = self.buffer.offset_of_line(line);
        let column = self.buffer.slice_to_cow(line_start..offset).chars().count();
        Position::new(line, column)
    }

    pub fn text_in(&self, range: Range<Position>) -> Cow<'_, str> {
        let start = self.offset_of(range.start);
        let end = self.offset_of(range.end).max(start);
        self.buffer.slice_to_cow(start..end)
    }

    /// Apply an edit command and report what changed.
    ///
    /// The returned changes use pre-edit coordinates, which is what anchor
    /// tracking needs to decide which lines move.
    pub fn apply(&mut self, cmd: Cmd) -> Vec<EditChange> {
        let replacement = compile_command(self, &cmd);
        let start = self.offset_of(replacement.range.start);
        let end = self.offset_of(replacement.range.end);

        if start == end && replacement.text.is_empty() {
            return Vec::new();
        }

        let delta = self.build_delta(start..end, &replacement.text);
        self.buffer = delta.apply(&self.buffer);
        self.version += 1;
        trace!("applied {cmd:?}, version {}", self.version);

        vec![EditChange {
            document_id: self.id,
            start: replacement.range.start,
            end: replacement.range.end,
            text: replacement.text,
            version: self.version,
        }]
    }

    fn build_delta(&self, range: Range<usize>, text: &str) -> Delta<RopeInfo> {
        let mut builder = Builder::new(self.buffer.len());
        if text.is_empty() {
            builder.delete(range);
        } else {
            builder.replace(range, Rope::from(text));
        }
        builder.build()
    }

    /// Indentation level of every line
    pub fn levels(&self, tab_width: usize) -> Vec<LineLevel> {
        self.lines()
            .map(|line| levels::line_level(&line.text, tab_width))
            .collect()
    }

    /// Ancestor lines of the cursor line by indentation, top to bottom
    pub fn ancestors_of(&self, cursor_line: usize, tab_width: usize) -> Vec<usize> {
        if cursor_line >= self.line_count() {
            return Vec::new();
        }
        let levels: Vec<LineLevel> = (0..=cursor_line)
            .filter_map(|line| self.line_text(line))
            .map(|text| levels::line_level(&text, tab_width))
            .collect();
        levels::find_ancestors(&levels, cursor_line)
    }
}
