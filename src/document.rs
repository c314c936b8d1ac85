//! In-memory text buffer with a caret and an optional selection
//!
//! Text is stored as a single UTF-8 string. The caret and the selection anchor
//! are byte offsets that always sit on char boundaries; line starts are
//! recomputed with memchr when needed, which is plenty for hand-edited files.

use std::borrow::Cow;
use std::ops::Range;

/// Caret motions understood by [`Document::move_caret`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    DocStart,
    DocEnd,
    /// Move by a number of lines (page up/down)
    Lines(isize),
}

/// Line terminator used when the text is written back to disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
    caret: usize,
    anchor: Option<usize>,
    line_ending: LineEnding,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from file contents. CRLF is normalized to `\n` in
    /// memory and remembered so saving can restore it.
    pub fn from_text(text: &str) -> Self {
        let (text, line_ending) = if text.contains("\r\n") {
            (text.replace("\r\n", "\n"), LineEnding::CrLf)
        } else {
            (text.to_string(), LineEnding::Lf)
        };
        Self {
            text,
            caret: 0,
            anchor: None,
            line_ending,
        }
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Text as it should be written to disk
    pub fn to_disk_text(&self) -> Cow<'_, str> {
        match self.line_ending {
            LineEnding::Lf => Cow::Borrowed(&self.text),
            LineEnding::CrLf => Cow::Owned(self.text.replace('\n', "\r\n")),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    // === Lines ===

    /// Byte offsets where each line starts (always at least one entry)
    fn line_starts(&self) -> Vec<usize> {
        let mut starts = Vec::with_capacity(64);
        starts.push(0);
        starts.extend(memchr::memchr_iter(b'\n', self.text.as_bytes()).map(|i| i + 1));
        starts
    }

    pub fn line_count(&self) -> usize {
        memchr::memchr_iter(b'\n', self.text.as_bytes()).count() + 1
    }

    /// Line contents without the trailing newline
    pub fn line(&self, index: usize) -> Option<&str> {
        self.text.split('\n').nth(index)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    fn line_range(&self, starts: &[usize], line: usize) -> Range<usize> {
        let start = starts[line];
        let end = starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        start..end
    }

    fn line_of(starts: &[usize], offset: usize) -> usize {
        match starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }

    /// Caret position as (line, column) with the column counted in chars
    pub fn caret_line_col(&self) -> (usize, usize) {
        self.line_col(self.caret)
    }

    fn line_col(&self, offset: usize) -> (usize, usize) {
        let starts = self.line_starts();
        let line = Self::line_of(&starts, offset);
        let column = self.text[starts[line]..offset].chars().count();
        (line, column)
    }

    /// Byte offset of (line, column), clamped to the document and line length
    fn offset_of(&self, starts: &[usize], line: usize, column: usize) -> usize {
        let line = line.min(starts.len() - 1);
        let range = self.line_range(starts, line);
        let slice = &self.text[range.clone()];
        slice
            .char_indices()
            .nth(column)
            .map(|(i, _)| range.start + i)
            .unwrap_or(range.end)
    }

    /// Place the caret at (line, column), clamped, dropping any selection
    pub fn set_caret_line_col(&mut self, line: usize, column: usize) {
        let starts = self.line_starts();
        self.caret = self.offset_of(&starts, line, column);
        self.anchor = None;
    }

    /// Move the caret to (line, column), keeping or starting a selection
    pub fn extend_to_line_col(&mut self, line: usize, column: usize) {
        self.anchor.get_or_insert(self.caret);
        let starts = self.line_starts();
        self.caret = self.offset_of(&starts, line, column);
    }

    // === Selection ===

    /// Selected byte range, if the selection is not empty
    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        if anchor == self.caret {
            return None;
        }
        Some(anchor.min(self.caret)..anchor.max(self.caret))
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selection().map(|range| &self.text[range])
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.caret = self.text.len();
    }

    /// Remove the selected text; returns whether anything was deleted
    pub fn delete_selection(&mut self) -> bool {
        let Some(range) = self.selection() else {
            self.anchor = None;
            return false;
        };
        self.caret = range.start;
        self.text.replace_range(range, "");
        self.anchor = None;
        true
    }

    // === Editing ===

    pub fn insert_char(&mut self, ch: char) -> bool {
        let mut buf = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buf))
    }

    /// Insert at the caret, replacing the selection
    pub fn insert_str(&mut self, s: &str) -> bool {
        let deleted = self.delete_selection();
        if s.is_empty() {
            return deleted;
        }
        let s = s.replace("\r\n", "\n");
        self.text.insert_str(self.caret, &s);
        self.caret += s.len();
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let Some(prev) = self.prev_boundary(self.caret) else {
            return false;
        };
        self.text.replace_range(prev..self.caret, "");
        self.caret = prev;
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let Some(next) = self.next_boundary(self.caret) else {
            return false;
        };
        self.text.replace_range(self.caret..next, "");
        true
    }

    /// Empty the text and reset caret and selection
    pub fn clear(&mut self) -> bool {
        let changed = !self.text.is_empty();
        self.text.clear();
        self.caret = 0;
        self.anchor = None;
        changed
    }

    // === Caret motion ===

    fn prev_boundary(&self, offset: usize) -> Option<usize> {
        self.text[..offset].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self, offset: usize) -> Option<usize> {
        self.text[offset..]
            .chars()
            .next()
            .map(|ch| offset + ch.len_utf8())
    }

    /// Move the caret; with `extend` the selection anchor stays put
    pub fn move_caret(&mut self, motion: Motion, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.caret);
        } else if let Some(range) = self.selection() {
            // Collapsing a selection with left/right lands on its edge
            self.anchor = None;
            match motion {
                Motion::Left => {
                    self.caret = range.start;
                    return;
                }
                Motion::Right => {
                    self.caret = range.end;
                    return;
                }
                _ => {}
            }
        } else {
            self.anchor = None;
        }

        let starts = self.line_starts();
        let (line, column) = {
            let line = Self::line_of(&starts, self.caret);
            (line, self.text[starts[line]..self.caret].chars().count())
        };

        self.caret = match motion {
            Motion::Left => self.prev_boundary(self.caret).unwrap_or(0),
            Motion::Right => self.next_boundary(self.caret).unwrap_or(self.caret),
            Motion::Up => {
                if line == 0 {
                    0
                } else {
                    self.offset_of(&starts, line - 1, column)
                }
            }
            Motion::Down => {
                if line + 1 >= starts.len() {
                    self.text.len()
                } else {
                    self.offset_of(&starts, line + 1, column)
                }
            }
            Motion::LineStart => starts[line],
            Motion::LineEnd => self.line_range(&starts, line).end,
            Motion::DocStart => 0,
            Motion::DocEnd => self.text.len(),
            Motion::Lines(delta) => {
                let target = line.saturating_add_signed(delta).min(starts.len() - 1);
                self.offset_of(&starts, target, column)
            }
        };
    }
}
