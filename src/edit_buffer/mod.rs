//! The edit buffer: a cursor-bearing editing surface wrapping a
//! [`TextBuffer`] with grapheme-aware motion, word-boundary navigation, and
//! undo/redo (spec.md §4.6).

pub mod cursor;
pub mod motion;

pub use cursor::Cursor;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::text_buffer::TextBuffer;
use crate::units::ColRange;

/// Emitted by mutating and cursor-moving operations so a host can decide
/// what to re-render (spec.md §4.6 "Emit `cursor-changed` and
/// `content-changed`").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditEvent {
    CursorChanged,
    ContentChanged,
}

/// A [`TextBuffer`] plus the caret and undo/redo machinery needed to edit
/// it interactively.
pub struct EditBuffer {
    buffer: TextBuffer,
    cursor: Cursor,
}

impl Default for EditBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl EditBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self { buffer: TextBuffer::new(), cursor: Cursor::default() }
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self { buffer: TextBuffer::with_config(config), cursor: Cursor::default() }
    }

    #[must_use]
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Replace the buffer's contents wholesale and reset the cursor to
    /// `(0, 0)`.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.buffer.set_text(text)?;
        self.cursor = Cursor::default();
        Ok(())
    }

    /// Insert `text` at the cursor (spec.md §4.6 "Insert text"). The cursor
    /// advances past the inserted text: onto the last inserted line if
    /// `text` contains line breaks, otherwise `col + inserted_width`.
    pub fn insert(&mut self, text: &str) -> Result<[EditEvent; 2]> {
        self.buffer.store_undo("insert");
        self.buffer.insert_at(self.cursor.row, self.cursor.col, text)?;

        let lines = crate::unicode::split_lines(text.as_bytes());
        let num_breaks = lines.len() - 1;
        let config = self.buffer.config();
        let last_line = std::str::from_utf8(&text.as_bytes()[lines[lines.len() - 1].clone()]).unwrap_or("");
        let new_row = self.cursor.row + num_breaks;
        let new_col = if num_breaks > 0 {
            motion::line_width(last_line, config)
        } else {
            self.cursor.col + motion::line_width(last_line, config)
        };
        self.cursor.set_horizontal(new_row, new_col);
        self.cursor.sync_offset(&self.buffer);
        Ok([EditEvent::CursorChanged, EditEvent::ContentChanged])
    }

    /// Delete the half-open column range `[col_start, col_end)` on `row`
    /// (spec.md §4.6 "Delete range"). The cursor moves to the normalized
    /// start of the range regardless of which endpoint the caller passed
    /// first.
    pub fn delete_range(&mut self, row: usize, col_start: u32, col_end: u32) -> Result<[EditEvent; 2]> {
        let (start, end) = if col_start <= col_end { (col_start, col_end) } else { (col_end, col_start) };
        self.buffer.store_undo("delete");
        self.buffer.delete_at(row, start, end)?;
        self.cursor.set_horizontal(row, start);
        self.cursor.sync_offset(&self.buffer);
        Ok([EditEvent::CursorChanged, EditEvent::ContentChanged])
    }

    /// Delete the grapheme cluster before the cursor (backspace). A no-op
    /// at the very start of the document.
    pub fn backspace(&mut self) -> Result<Option<[EditEvent; 2]>> {
        if self.cursor.col > 0 {
            let line = self.current_line();
            let config = self.buffer.config();
            let Some(w) = motion::prev_grapheme_width(&line, self.cursor.col, config) else { return Ok(None) };
            return self.delete_range(self.cursor.row, self.cursor.col - w, self.cursor.col).map(Some);
        }
        if self.cursor.row > 0 {
            let prev_row = self.cursor.row - 1;
            let prev_width = self.buffer.line_width_at(prev_row).unwrap_or(0);
            self.buffer.store_undo("backspace-join");
            self.buffer.join_with_next_line(prev_row)?;
            self.cursor.set_horizontal(prev_row, prev_width);
            self.cursor.sync_offset(&self.buffer);
            return Ok(Some([EditEvent::CursorChanged, EditEvent::ContentChanged]));
        }
        Ok(None)
    }

    fn current_line(&self) -> String {
        let width = self.buffer.line_width_at(self.cursor.row).unwrap_or(0);
        self.buffer.get_text_range(self.cursor.row, ColRange::new(crate::units::ColIndex::new(0), crate::units::ColIndex::new(width as usize)))
    }

    /// Move left by one grapheme cluster, wrapping onto the end of the
    /// previous line at column 0 (spec.md §4.6 "Grapheme-aware motion").
    pub fn move_left(&mut self) {
        let config = self.buffer.config();
        if self.cursor.col > 0 {
            let line = self.current_line();
            if let Some(w) = motion::prev_grapheme_width(&line, self.cursor.col, config) {
                self.cursor.set_horizontal(self.cursor.row, self.cursor.col - w);
                return;
            }
        }
        if self.cursor.row > 0 {
            let row = self.cursor.row - 1;
            let width = self.buffer.line_width_at(row).unwrap_or(0);
            self.cursor.set_horizontal(row, width);
        }
    }

    /// Move right by one grapheme cluster, wrapping onto the start of the
    /// next line at end-of-line.
    pub fn move_right(&mut self) {
        let config = self.buffer.config();
        let line = self.current_line();
        if let Some(w) = motion::grapheme_width_at(&line, self.cursor.col, config) {
            self.cursor.set_horizontal(self.cursor.row, self.cursor.col + w);
            return;
        }
        if self.cursor.row + 1 < self.buffer.line_count() {
            self.cursor.set_horizontal(self.cursor.row + 1, 0);
        }
    }

    /// Move up one logical row, preserving `desired_col` (spec.md §4.6
    /// "`moveUp/Down` preserve `desired_col` across lines").
    pub fn move_up(&mut self) {
        if self.cursor.row == 0 {
            return;
        }
        let row = self.cursor.row - 1;
        let width = self.buffer.line_width_at(row).unwrap_or(0);
        let col = self.cursor.desired_col.min(width);
        self.cursor.set_vertical(row, col);
    }

    /// Move down one logical row, preserving `desired_col`.
    pub fn move_down(&mut self) {
        if self.cursor.row + 1 >= self.buffer.line_count() {
            return;
        }
        let row = self.cursor.row + 1;
        let width = self.buffer.line_width_at(row).unwrap_or(0);
        let col = self.cursor.desired_col.min(width);
        self.cursor.set_vertical(row, col);
    }

    /// Move forward to the next word boundary (spec.md §4.6 "Word
    /// boundaries"): the first break strictly after the cursor on the
    /// current line, otherwise the start of the next line, otherwise
    /// end-of-document.
    pub fn move_word_forward(&mut self) {
        let config = self.buffer.config();
        let line = self.current_line();
        if let Some(col) = motion::word_break_after(&line, self.cursor.col, config) {
            self.cursor.set_horizontal(self.cursor.row, col);
            return;
        }
        if self.cursor.row + 1 < self.buffer.line_count() {
            self.cursor.set_horizontal(self.cursor.row + 1, 0);
            return;
        }
        let width = self.buffer.line_width_at(self.cursor.row).unwrap_or(0);
        self.cursor.set_horizontal(self.cursor.row, width);
    }

    /// Move backward to the previous word boundary: the last break
    /// strictly before the cursor on the current line, otherwise the end of
    /// the previous line, otherwise `(0, 0)`.
    pub fn move_word_backward(&mut self) {
        let config = self.buffer.config();
        let line = self.current_line();
        if let Some(col) = motion::word_break_before(&line, self.cursor.col, config) {
            self.cursor.set_horizontal(self.cursor.row, col);
            return;
        }
        if self.cursor.row > 0 {
            let row = self.cursor.row - 1;
            let width = self.buffer.line_width_at(row).unwrap_or(0);
            self.cursor.set_horizontal(row, width);
            return;
        }
        self.cursor.set_horizontal(0, 0);
    }

    /// Undo the last mutation and revalidate the cursor against the
    /// restored content (spec.md §4.6 "Undo/redo").
    pub fn undo(&mut self) -> bool {
        let ok = self.buffer.undo();
        if ok {
            self.cursor.revalidate(&self.buffer);
        }
        ok
    }

    /// Redo the most recently undone mutation.
    pub fn redo(&mut self) -> bool {
        let ok = self.buffer.redo();
        if ok {
            self.cursor.revalidate(&self.buffer);
        }
        ok
    }
}
