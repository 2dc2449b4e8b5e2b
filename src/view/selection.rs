//! Selection anchor/focus tracking and translation to character offsets via
//! virtual-line coordinates (spec.md §4.5 "Local selection uses virtual
//! line coordinates. Anchor and focus are translated to character offsets;
//! clamped to buffer bounds; points outside the viewport above/below map
//! to 0 or to the text end offset respectively."). The anchor persists
//! across incremental content updates; callers re-clamp it against the
//! view on every query rather than eagerly rewriting it on edit, so an
//! anchor past the end of a shrunk line still means "end of that line" and
//! not "wherever column N used to be".

use crate::units::{ColIndex, GlobalColOffset, RowCol, RowIndex};
use crate::view::TextBufferView;

/// A selection's two persisted endpoints. `anchor` is where the selection
/// started; `focus` is the end currently being dragged/extended. Stored in
/// logical `(row, col)` coordinates; translation to virtual-line-clamped
/// positions and flat character offsets happens per query against a
/// [`TextBufferView`], since only the view knows the current wrap layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: RowCol,
    pub focus: RowCol,
}

impl Selection {
    #[must_use]
    pub fn at(pos: RowCol) -> Self {
        Self { anchor: pos, focus: pos }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.anchor == self.focus
    }

    /// `(start, end)` in document order, independent of drag direction.
    #[must_use]
    pub fn ordered(self) -> (RowCol, RowCol) {
        if (self.anchor.row.as_usize(), self.anchor.col.as_usize()) <= (self.focus.row.as_usize(), self.focus.col.as_usize()) {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }

    /// Clamp both endpoints against `view`'s currently rendered virtual
    /// lines: a position before the first virtual line clamps to its
    /// start; a position after the last clamps to its end; an in-range
    /// position clamps its column to the enclosing virtual line's
    /// displayed span (spec.md §4.5).
    #[must_use]
    pub fn clamped_to(self, view: &TextBufferView) -> Self {
        Self {
            anchor: clamp_to_view(self.anchor, view),
            focus: clamp_to_view(self.focus, view),
        }
    }

    /// Translate both endpoints to flat document character offsets (spec.md
    /// §4.5 "translated to character offsets"), clamping first via
    /// [`Selection::clamped_to`]. Points outside the viewport above/below
    /// resolve to `0` and to the buffer's text-end offset respectively,
    /// since `clamped_to` already pins them to the first/last virtual
    /// line's boundary.
    #[must_use]
    pub fn to_char_offsets(self, view: &TextBufferView) -> (GlobalColOffset, GlobalColOffset) {
        let clamped = self.clamped_to(view);
        let offset = |pos: RowCol| {
            crate::text_buffer::coords::coords_to_offset(view.buffer().rope(), pos).unwrap_or(GlobalColOffset::new(0))
        };
        (offset(clamped.anchor), offset(clamped.focus))
    }
}

fn clamp_to_view(pos: RowCol, view: &TextBufferView) -> RowCol {
    let lines = view.measure_for_dimensions();
    let Some(first) = lines.first() else { return RowCol::default() };
    let last = lines.last().unwrap();

    let before_first = pos.row.as_usize() < first.source_row.as_usize()
        || (pos.row.as_usize() == first.source_row.as_usize() && pos.col.as_usize() <= first.source_cols.start.as_usize());
    if before_first {
        return RowCol::new(first.source_row, first.source_cols.start);
    }
    let after_last = pos.row.as_usize() > last.source_row.as_usize()
        || (pos.row.as_usize() == last.source_row.as_usize() && pos.col.as_usize() >= last.source_cols.end.as_usize());
    if after_last {
        return RowCol::new(last.source_row, last.source_cols.end);
    }

    // In range: clamp the column to the row's full width first (handles a
    // stale column past a shrunk line), then resolve to the enclosing
    // virtual line so the offset sits inside its displayed span.
    let row = pos.row.as_usize();
    let row_width = view.buffer().line_width_at(row).unwrap_or(0) as usize;
    let col = ColIndex::new(pos.col.as_usize().min(row_width));
    if let Some(idx) = view.find_visual_line_index(row, col) {
        let line = &lines[idx];
        let clamped_col = col.as_usize().clamp(line.source_cols.start.as_usize(), line.source_cols.end.as_usize());
        return RowCol::new(RowIndex::new(row), ColIndex::new(clamped_col));
    }
    RowCol::new(RowIndex::new(row), col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WrapMode;
    use crate::text_buffer::TextBuffer;

    #[test]
    fn ordered_swaps_reversed_drag() {
        let sel = Selection {
            anchor: RowCol::new(RowIndex::new(3), ColIndex::new(1)),
            focus: RowCol::new(RowIndex::new(0), ColIndex::new(5)),
        };
        let (start, end) = sel.ordered();
        assert_eq!(start.row.as_usize(), 0);
        assert_eq!(end.row.as_usize(), 3);
    }

    #[test]
    fn clamp_pulls_stale_position_onto_shrunk_line() {
        let mut buf = TextBuffer::new();
        buf.set_text("ab").unwrap();
        let view = TextBufferView::new(&buf, 80, WrapMode::None);
        let sel = Selection::at(RowCol::new(RowIndex::new(0), ColIndex::new(50)));
        let clamped = sel.clamped_to(&view);
        assert_eq!(clamped.anchor.col.as_usize(), 2);
    }

    #[test]
    fn clamp_pulls_stale_row_onto_last_row() {
        let mut buf = TextBuffer::new();
        buf.set_text("a\nb").unwrap();
        let view = TextBufferView::new(&buf, 80, WrapMode::None);
        let sel = Selection::at(RowCol::new(RowIndex::new(9), ColIndex::new(0)));
        let clamped = sel.clamped_to(&view);
        assert_eq!(clamped.anchor.row.as_usize(), 1);
    }

    #[test]
    fn position_above_viewport_maps_to_text_start_offset() {
        let mut buf = TextBuffer::new();
        buf.set_text("ab\ncd").unwrap();
        let view = TextBufferView::new(&buf, 80, WrapMode::None);
        let sel = Selection::at(RowCol::new(RowIndex::new(0), ColIndex::new(0)));
        let (anchor_off, _) = sel.to_char_offsets(&view);
        assert_eq!(anchor_off.as_usize(), 0);
    }

    #[test]
    fn position_below_viewport_maps_to_text_end_offset() {
        let mut buf = TextBuffer::new();
        buf.set_text("ab\ncd").unwrap();
        let view = TextBufferView::new(&buf, 80, WrapMode::None);
        let sel = Selection::at(RowCol::new(RowIndex::new(99), ColIndex::new(0)));
        let (anchor_off, _) = sel.to_char_offsets(&view);
        assert_eq!(anchor_off.as_usize(), buf.get_length());
    }

    #[test]
    fn clamp_resolves_within_a_wrapped_sub_line() {
        let mut buf = TextBuffer::new();
        buf.set_text("abcdefgh").unwrap();
        let view = TextBufferView::new(&buf, 4, WrapMode::Char);
        // Row 0 wraps into [0,4) and [4,8]; a stale column of 6 should
        // clamp within the second sub-line, not spill into the first.
        let sel = Selection::at(RowCol::new(RowIndex::new(0), ColIndex::new(6)));
        let clamped = sel.clamped_to(&view);
        assert_eq!(clamped.anchor.col.as_usize(), 6);
    }
}
