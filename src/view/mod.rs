//! Text buffer view: wraps and (optionally) truncates a [`TextBuffer`]'s
//! lines to a viewport width, with a measurement cache keyed on the
//! buffer's content epoch (spec.md §4.5).
//!
//! A view borrows its buffer (`&'a TextBuffer`) rather than holding a weak
//! handle to it: the compiler enforces "a view cannot outlive its buffer"
//! (spec.md §9 design note "lifetime ordering") for free, so there's no
//! need for the destroy-callback machinery a garbage-collected host would
//! require.

pub mod selection;
pub mod virtual_line;
pub mod wrap;

pub use selection::Selection;
pub use virtual_line::VirtualLine;
pub use wrap::{truncate_line, wrap_line, TruncatedLine, WrapSegment};

use std::cell::RefCell;

use crate::config::WrapMode;
use crate::text_buffer::{ContentEpoch, TextBuffer};
use crate::units::{ColIndex, RowIndex};

struct MeasureCache {
    epoch: ContentEpoch,
    width: u32,
    wrap_mode: WrapMode,
    lines: Vec<VirtualLine>,
}

/// A read-only projection of a [`TextBuffer`] onto a fixed-width viewport.
pub struct TextBufferView<'a> {
    buffer: &'a TextBuffer,
    width: u32,
    wrap_mode: WrapMode,
    truncate: bool,
    cache: RefCell<Option<MeasureCache>>,
}

impl<'a> TextBufferView<'a> {
    #[must_use]
    pub fn new(buffer: &'a TextBuffer, width: u32, wrap_mode: WrapMode) -> Self {
        Self { buffer, width, wrap_mode, truncate: buffer.config().truncate, cache: RefCell::new(None) }
    }

    #[must_use]
    pub fn buffer(&self) -> &TextBuffer {
        self.buffer
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    pub fn set_wrap_mode(&mut self, wrap_mode: WrapMode) {
        self.wrap_mode = wrap_mode;
    }

    /// Recompute (or reuse the cached) virtual-line layout for the current
    /// `(buffer epoch, width, wrap_mode)`, reusing the cache's `Vec`
    /// allocation across calls (spec.md §9 "`measure_for_dimensions` arena
    /// reuse") instead of allocating a fresh one every time.
    pub fn measure_for_dimensions(&self) -> std::cell::Ref<'_, Vec<VirtualLine>> {
        let needs_rebuild = {
            let cache = self.cache.borrow();
            match cache.as_ref() {
                Some(c) => c.epoch != self.buffer.epoch() || c.width != self.width || c.wrap_mode != self.wrap_mode,
                None => true,
            }
        };
        if needs_rebuild {
            let mut lines = self.cache.borrow_mut().take().map(|c| c.lines).unwrap_or_default();
            lines.clear();
            self.rebuild_into(&mut lines);
            *self.cache.borrow_mut() = Some(MeasureCache { epoch: self.buffer.epoch(), width: self.width, wrap_mode: self.wrap_mode, lines });
        }
        std::cell::Ref::map(self.cache.borrow(), |c| &c.as_ref().unwrap().lines)
    }

    fn rebuild_into(&self, out: &mut Vec<VirtualLine>) {
        let config = self.buffer.config();
        for row in 0..self.buffer.line_count() {
            let row_width = self.buffer.line_width_at(row).unwrap_or(0);
            let full_text = self.buffer.get_text_range(row, crate::units::ColRange::new(ColIndex::new(0), ColIndex::new(row_width as usize)));
            let segments = wrap_line(&full_text, self.width, self.wrap_mode, config.tab_width, config.width_method);
            let last = segments.len().saturating_sub(1);
            for (i, seg) in segments.into_iter().enumerate() {
                let text = self.buffer.get_text_range(row, seg.cols);
                let char_offset = crate::text_buffer::coords::coords_to_offset(
                    self.buffer.rope(),
                    crate::units::RowCol::new(RowIndex::new(row), seg.cols.start),
                )
                .map(|o| o.as_usize() as u32)
                .unwrap_or(0);
                let (text, is_truncated, ellipsis_pos, truncation_suffix_start) = if self.truncate && self.width > 0 {
                    let t = truncate_line(&text, self.width, config.tab_width, config.width_method);
                    (t.text, t.is_truncated, t.ellipsis_pos, t.truncation_suffix_start)
                } else {
                    (text, false, None, None)
                };
                out.push(VirtualLine {
                    source_row: RowIndex::new(row),
                    source_cols: seg.cols,
                    text,
                    is_last_of_row: i == last,
                    char_offset,
                    is_truncated,
                    ellipsis_pos,
                    truncation_suffix_start,
                });
            }
        }
    }

    /// Total number of on-screen rows after wrapping.
    #[must_use]
    pub fn virtual_line_count(&self) -> usize {
        self.measure_for_dimensions().len()
    }

    /// The widest rendered virtual line, in display columns.
    #[must_use]
    pub fn max_rendered_width(&self) -> u32 {
        self.measure_for_dimensions().iter().map(|l| l.source_cols.width().as_usize() as u32).max().unwrap_or(0)
    }

    /// Find the virtual-line index containing `(row, col)` (spec.md §4.5
    /// `find_visual_line_index`). Every sub-line but the last of its row
    /// claims columns with `<`; the last sub-line of a row claims its
    /// trailing boundary column too (`<=`), so a caret sitting exactly at
    /// end-of-line resolves to that row's final sub-line rather than
    /// falling through to the next row.
    #[must_use]
    pub fn find_visual_line_index(&self, row: usize, col: ColIndex) -> Option<usize> {
        let lines = self.measure_for_dimensions();
        lines.iter().position(|line| {
            if line.source_row.as_usize() != row {
                return false;
            }
            let start = line.source_cols.start.as_usize();
            let end = line.source_cols.end.as_usize();
            if line.is_last_of_row {
                col.as_usize() >= start && col.as_usize() <= end
            } else {
                col.as_usize() >= start && col.as_usize() < end
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_long_line_into_multiple_virtual_lines() {
        let mut buf = TextBuffer::new();
        buf.set_text("abcdefghij").unwrap();
        let view = TextBufferView::new(&buf, 4, WrapMode::Char);
        let lines = view.measure_for_dimensions();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "abcd");
        assert_eq!(lines[2].text, "ij");
    }

    #[test]
    fn cache_is_reused_until_epoch_changes() {
        let mut buf = TextBuffer::new();
        buf.set_text("hello").unwrap();
        let view = TextBufferView::new(&buf, 10, WrapMode::None);
        let first_ptr = view.measure_for_dimensions().as_ptr();
        let second_ptr = view.measure_for_dimensions().as_ptr();
        assert_eq!(first_ptr, second_ptr, "unchanged epoch must not reallocate");
    }

    #[test]
    fn find_visual_line_index_last_sub_line_is_inclusive() {
        let mut buf = TextBuffer::new();
        buf.set_text("abcdefgh").unwrap();
        let view = TextBufferView::new(&buf, 4, WrapMode::Char);
        // Row 0 wraps into [0,4) and [4,8]; column 8 (end of line) must
        // resolve to the second sub-line, not "no sub-line contains it".
        let idx = view.find_visual_line_index(0, ColIndex::new(8)).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn none_mode_never_wraps() {
        let mut buf = TextBuffer::new();
        buf.set_text("a very long single line of text").unwrap();
        let view = TextBufferView::new(&buf, 5, WrapMode::None);
        assert_eq!(view.virtual_line_count(), 1);
    }

    #[test]
    fn char_offset_accumulates_across_rows() {
        let mut buf = TextBuffer::new();
        buf.set_text("ab\ncd").unwrap();
        let view = TextBufferView::new(&buf, 10, WrapMode::None);
        let lines = view.measure_for_dimensions();
        assert_eq!(lines[0].char_offset, 0);
        assert_eq!(lines[1].char_offset, 3); // "ab" (2) + separator column (1)
    }

    #[test]
    fn truncation_fields_are_threaded_into_virtual_line() {
        let config = crate::config::EngineConfig { truncate: true, ..Default::default() };
        let mut buf = TextBuffer::with_config(config);
        buf.set_text(&"a".repeat(20)).unwrap();
        let view = TextBufferView::new(&buf, 11, WrapMode::None);
        let lines = view.measure_for_dimensions();
        assert!(lines[0].is_truncated);
        assert_eq!(lines[0].ellipsis_pos, Some(4));
        assert_eq!(lines[0].truncation_suffix_start, Some(16));
    }
}
