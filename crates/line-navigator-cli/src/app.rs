use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::KeyCode;
use line_navigator_config::Config;
use line_navigator_engine::colorizer::{self, Debouncer};
use line_navigator_engine::{
    Cmd, Document, ItemRef, Navigator, NavigatorSettings, Position, SectionId, SectionKind, io,
    navigation,
};
use log::{debug, info};
use ratatui::widgets::ListState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Text,
    Navigator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing a regex to bookmark
    Pattern(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One row of the navigator pane
#[derive(Debug, Clone, PartialEq)]
pub struct NavRow {
    pub label: String,
    pub description: String,
    pub is_header: bool,
    pub target: Option<ItemRef>,
    pub line: Option<usize>,
}

pub fn settings_from(config: &Config) -> NavigatorSettings {
    NavigatorSettings {
        recent_limit: config.recent.limit,
        matches_limit: config.matches.limit,
        recent_range: config.recent.range,
        bookmark_line_limit: config.matches.max_lines,
    }
}

pub struct App {
    pub path: PathBuf,
    pub document: Document,
    pub cursor: Position,
    pub navigator: Navigator,
    pub tab_width: usize,
    pub colorize: bool,
    pub bucket_count: usize,
    pub debouncer: Debouncer,
    /// Colour bucket per line, rebuilt when the debouncer fires
    pub line_buckets: Vec<Option<usize>>,
    pub scroll: usize,
    pub view_height: usize,
    pub focus: Focus,
    pub mode: Mode,
    pub nav_rows: Vec<NavRow>,
    pub nav_state: ListState,
    pub status: String,
    pub dirty: bool,
}

impl App {
    pub fn new(path: PathBuf, config: &Config, bucket_limit: usize) -> Result<Self> {
        let document = io::open_document(&path)?;
        let colorize = config.colorizer.enabled && document.is_plaintext();
        info!(
            "opened {} ({} lines, colorized: {colorize})",
            path.display(),
            document.line_count()
        );

        let mut app = Self {
            path,
            document,
            cursor: Position::default(),
            navigator: Navigator::new(settings_from(config)),
            tab_width: config.editor.tab_width.max(1),
            colorize,
            bucket_count: config.colorizer.max_colors.clamp(1, bucket_limit.max(1)),
            debouncer: Debouncer::new(Duration::from_millis(config.colorizer.delay_ms)),
            line_buckets: Vec::new(),
            scroll: 0,
            view_height: 20,
            focus: Focus::Text,
            mode: Mode::Normal,
            nav_rows: Vec::new(),
            nav_state: ListState::default(),
            status: String::new(),
            dirty: false,
        };
        app.recolor();
        app.move_cursor(Position::default());
        Ok(app)
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Flow {
        self.status.clear();
        if let Mode::Pattern(pattern) = &mut self.mode {
            match code {
                KeyCode::Esc => self.mode = Mode::Normal,
                KeyCode::Enter => {
                    let pattern = std::mem::take(pattern);
                    self.mode = Mode::Normal;
                    self.bookmark_pattern(&pattern);
                }
                KeyCode::Backspace => {
                    pattern.pop();
                }
                KeyCode::Char(c) => pattern.push(c),
                _ => {}
            }
            return Flow::Continue;
        }

        match (self.focus, code) {
            (_, KeyCode::Char('q')) => return Flow::Quit,
            (Focus::Text, KeyCode::Tab) => self.focus = Focus::Navigator,
            (Focus::Navigator, KeyCode::Tab | KeyCode::Esc) => self.focus = Focus::Text,
            (Focus::Text, code) => self.handle_text_key(code),
            (Focus::Navigator, code) => self.handle_navigator_key(code),
        }
        Flow::Continue
    }

    fn handle_text_key(&mut self, code: KeyCode) {
        let cursor = self.cursor;
        let doc = &self.document;
        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(Position::new(cursor.line + 1, cursor.column))
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(Position::new(
                cursor.line.saturating_sub(1),
                cursor.column,
            )),
            KeyCode::Right | KeyCode::Char('l') => {
                self.move_cursor(Position::new(cursor.line, cursor.column + 1))
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(Position::new(
                cursor.line,
                cursor.column.saturating_sub(1),
            )),
            KeyCode::Char('J') => self.move_cursor(navigation::fixed_step_down(doc, cursor)),
            KeyCode::Char('K') => self.move_cursor(navigation::fixed_step_up(doc, cursor)),
            KeyCode::Char('w') => self.move_cursor(navigation::word_right_end(doc, cursor)),
            KeyCode::Char('b') => self.move_cursor(navigation::word_left_begin(doc, cursor)),
            KeyCode::Char('m') => self.bookmark_word(),
            KeyCode::Char('/') => self.mode = Mode::Pattern(String::new()),
            KeyCode::Char('o') => {
                let indent = doc
                    .line(cursor.line)
                    .map(|line| line.text.chars().take(line.first_visible_char).collect())
                    .unwrap_or_default();
                self.edit(Cmd::InsertLineBelow {
                    line: cursor.line,
                    text: indent,
                });
                self.move_cursor(Position::new(cursor.line + 1, usize::MAX));
            }
            KeyCode::Char('y') => {
                self.edit(Cmd::DuplicateLine { line: cursor.line });
                self.move_cursor(Position::new(cursor.line + 1, cursor.column));
            }
            KeyCode::Char('d') => {
                self.edit(Cmd::DeleteLine { line: cursor.line });
                self.move_cursor(cursor);
            }
            KeyCode::Char('s') => self.save(),
            _ => {}
        }
    }

    fn handle_navigator_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.select_row(1),
            KeyCode::Up | KeyCode::Char('k') => self.select_row(-1),
            KeyCode::Enter | KeyCode::Char(' ') => self.jump_to_selected(),
            KeyCode::Delete | KeyCode::Char('x') => self.remove_selected(),
            _ => {}
        }
    }

    /// Place the cursor and refresh the line levels, as a selection change would
    pub fn move_cursor(&mut self, position: Position) {
        self.cursor = self.document.clamp_position(position);
        self.navigator
            .refresh_levels(&self.document, self.cursor.line, self.tab_width);
        self.ensure_cursor_visible();
        self.rebuild_rows();
    }

    pub fn edit(&mut self, cmd: Cmd) {
        let changes = self.document.apply(cmd);
        if changes.is_empty() {
            return;
        }
        self.dirty = true;
        if self.navigator.on_document_change(&self.document, &changes) {
            self.rebuild_rows();
        }
        self.debouncer.trigger(Instant::now());
    }

    fn bookmark_word(&mut self) {
        match self
            .navigator
            .add_selection_bookmarks(&self.document, &[], self.cursor)
        {
            Ok(section) => self.after_bookmark(section),
            Err(err) => self.status = err.to_string(),
        }
    }

    fn bookmark_pattern(&mut self, pattern: &str) {
        match self.navigator.add_pattern_bookmarks(&self.document, pattern) {
            Ok(section) => self.after_bookmark(section),
            Err(err) => self.status = err.to_string(),
        }
    }

    fn after_bookmark(&mut self, section: SectionId) {
        self.rebuild_rows();
        let reveal = self
            .navigator
            .find_item_at_line(self.document.id(), self.cursor.line)
            .map(ItemRef::Anchor)
            .unwrap_or(ItemRef::Section(section));
        if let Some(index) = self.nav_rows.iter().position(|row| row.target == Some(reveal)) {
            self.nav_state.select(Some(index));
        }
        self.status = format!("Added bookmarks section {}", section.0);
    }

    fn select_row(&mut self, step: isize) {
        if self.nav_rows.is_empty() {
            return;
        }
        let last = self.nav_rows.len() - 1;
        let current = self.nav_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(step).min(last);
        self.nav_state.select(Some(next));
    }

    fn selected_row(&self) -> Option<&NavRow> {
        self.nav_state
            .selected()
            .and_then(|index| self.nav_rows.get(index))
    }

    fn jump_to_selected(&mut self) {
        if let Some(line) = self.selected_row().and_then(|row| row.line) {
            let column = self
                .document
                .line(line)
                .map(|info| info.first_visible_char)
                .unwrap_or(0);
            self.move_cursor(Position::new(line, column));
            self.focus = Focus::Text;
        }
    }

    fn remove_selected(&mut self) {
        if let Some(target) = self.selected_row().and_then(|row| row.target)
            && self.navigator.remove_item(target)
        {
            self.rebuild_rows();
        }
    }

    fn save(&mut self) {
        match io::save_document(&self.path, &self.document) {
            Ok(()) => {
                self.dirty = false;
                self.status = format!("Saved {}", self.path.display());
            }
            Err(err) => self.status = format!("Save failed: {err}"),
        }
    }

    /// Rebuild the navigator rows from a fresh snapshot
    pub fn rebuild_rows(&mut self) {
        let snapshot = self.navigator.snapshot();
        let own_document = self.document.id();
        let mut rows = Vec::with_capacity(snapshot.item_count() + snapshot.sections.len());

        for section in &snapshot.sections {
            rows.push(NavRow {
                label: section.label.clone(),
                description: String::new(),
                is_header: true,
                target: match section.kind {
                    SectionKind::Bookmarks(id) => Some(ItemRef::Section(id)),
                    SectionKind::Levels | SectionKind::Recent => None,
                },
                line: None,
            });
            rows.extend(section.items.iter().map(|item| NavRow {
                label: item.label.clone(),
                description: item.description.clone(),
                is_header: false,
                target: Some(ItemRef::Anchor(item.anchor_id)),
                line: (item.document_id == own_document).then_some(item.line),
            }));
        }

        self.nav_rows = rows;
        let selected = self.nav_state.selected().unwrap_or(0);
        self.nav_state
            .select(Some(selected.min(self.nav_rows.len().saturating_sub(1))));
    }

    pub fn set_view_height(&mut self, height: usize) {
        if height != self.view_height {
            self.view_height = height.max(1);
            self.ensure_cursor_visible();
        }
    }

    fn ensure_cursor_visible(&mut self) {
        let before = self.scroll;
        if self.cursor.line < self.scroll {
            self.scroll = self.cursor.line;
        } else if self.cursor.line >= self.scroll + self.view_height {
            self.scroll = self.cursor.line + 1 - self.view_height;
        }
        if before != self.scroll {
            // Visible range moved
            self.debouncer.trigger(Instant::now());
        }
    }

    /// Fire pending redraw work
    pub fn tick(&mut self, now: Instant) {
        if self.debouncer.fire(now) {
            self.recolor();
        }
    }

    fn recolor(&mut self) {
        self.line_buckets = vec![None; self.document.line_count()];
        if !self.colorize {
            return;
        }
        let visible = self.scroll..self.scroll + self.view_height;
        let buckets = colorizer::decorate(&self.document, visible, self.tab_width, self.bucket_count);
        for (bucket, lines) in buckets.iter().enumerate() {
            for &line in lines {
                self.line_buckets[line] = Some(bucket);
            }
        }
        debug!("recolored around lines {}..{}", self.scroll, self.scroll + self.view_height);
    }
}
