//! Indentation levels and the ancestor-by-indentation walk behind the
//! "Line Levels" view.

/// Indentation of a single line measured in tab stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLevel {
    /// Empty or whitespace-only line
    Blank,
    /// Indent width is not a multiple of the tab width
    Fractional {
        /// Level rounded up, used only when such a line holds the cursor
        next_level: usize,
    },
    Level(usize),
}

/// Width of the leading whitespace in columns; a tab advances to the next tab stop
pub fn indent_columns(text: &str, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    text.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .fold(0, |columns, c| match c {
            '\t' => columns + tab_width - columns % tab_width,
            _ => columns + 1,
        })
}

/// Classify a line's indentation for the given tab width (0 is treated as 1)
pub fn line_level(text: &str, tab_width: usize) -> LineLevel {
    if text.trim().is_empty() {
        return LineLevel::Blank;
    }
    let tab_width = tab_width.max(1);
    let columns = indent_columns(text, tab_width);
    if columns % tab_width == 0 {
        LineLevel::Level(columns / tab_width)
    } else {
        LineLevel::Fractional {
            next_level: columns.div_ceil(tab_width),
        }
    }
}

/// Lines above `cursor_line` whose indentation strictly decreases, nearest
/// ancestor last.
///
/// The walk goes upward from the line above the cursor. Blank and fractional
/// lines never qualify and never lower the bar. The walk ends once a level 0
/// line is found or the top of the document is reached.
pub fn find_ancestors(levels: &[LineLevel], cursor_line: usize) -> Vec<usize> {
    let Some(cursor_level) = levels.get(cursor_line) else {
        return Vec::new();
    };

    // A blank cursor line sits under whatever comes before it
    let mut current_min = match *cursor_level {
        LineLevel::Blank => usize::MAX,
        LineLevel::Fractional { next_level } => next_level,
        LineLevel::Level(level) => level,
    };

    let mut ancestors = Vec::new();
    for line in (0..cursor_line).rev() {
        if current_min == 0 {
            break;
        }
        if let LineLevel::Level(level) = levels[line]
            && level < current_min
        {
            ancestors.push(line);
            current_min = level;
        }
    }

    ancestors.reverse();
    ancestors
}
