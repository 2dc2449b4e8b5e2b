//! Conversions between a flat `GlobalColOffset` and `(row, col)` coordinates
//! (spec.md §4.4 `get_length` / offset-addressing invariant). A line
//! boundary counts as one column of linear offset, distinct from its
//! rendered width (which is zero for the `Break` leaf itself).

use crate::rope::SegmentRope;
use crate::units::{ColIndex, GlobalColOffset, RowCol, RowIndex};

/// Total addressable length: the sum of every line's width plus one
/// separator column between each pair of consecutive lines.
#[must_use]
pub fn buffer_length(rope: &SegmentRope) -> usize {
    let lines = rope.line_count();
    if lines == 0 {
        return 0;
    }
    rope.metrics().total_width as usize + (lines - 1)
}

/// Map a flat offset to `(row, col)`. An offset landing exactly on a
/// separator resolves to `(row, line_width(row))` — one past the last
/// column of `row`, i.e. the position a caret occupies right before the
/// newline.
#[must_use]
pub fn offset_to_coords(rope: &SegmentRope, offset: GlobalColOffset) -> Option<RowCol> {
    let mut remaining = offset.as_usize();
    let lines = rope.line_count();
    for row in 0..lines {
        let width = rope.line_width(row)? as usize;
        if remaining <= width {
            return Some(RowCol::new(RowIndex::new(row), ColIndex::new(remaining)));
        }
        remaining -= width;
        if remaining == 0 {
            return Some(RowCol::new(RowIndex::new(row), ColIndex::new(width)));
        }
        remaining -= 1; // the separator column between `row` and `row + 1`
    }
    None
}

/// Inverse of [`offset_to_coords`].
#[must_use]
pub fn coords_to_offset(rope: &SegmentRope, coords: RowCol) -> Option<GlobalColOffset> {
    let mut offset = 0usize;
    for row in 0..coords.row.as_usize() {
        offset += rope.line_width(row)? as usize + 1;
    }
    offset += coords.col.as_usize();
    Some(GlobalColOffset::new(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rope::leaf::{ChunkFlags, Leaf, TextChunk};

    fn sample_rope() -> SegmentRope {
        let text = |w: u32| Leaf::Text(TextChunk { mem_id: 0, byte_start: 0, byte_end: w, width_cols: w, flags: ChunkFlags::ASCII_ONLY });
        SegmentRope::from_leaves(vec![
            Leaf::LineStart, text(3), Leaf::Break,
            Leaf::LineStart, text(5),
        ])
    }

    #[test]
    fn length_counts_separator_columns() {
        let rope = sample_rope();
        assert_eq!(buffer_length(&rope), 3 + 1 + 5);
    }

    #[test]
    fn round_trip_every_offset() {
        let rope = sample_rope();
        for offset in 0..buffer_length(&rope) {
            let coords = offset_to_coords(&rope, GlobalColOffset::new(offset)).unwrap();
            let back = coords_to_offset(&rope, coords).unwrap();
            assert_eq!(back.as_usize(), offset);
        }
    }

    #[test]
    fn offset_on_separator_lands_at_line_end() {
        let rope = sample_rope();
        let coords = offset_to_coords(&rope, GlobalColOffset::new(3)).unwrap();
        assert_eq!(coords.row.as_usize(), 0);
        assert_eq!(coords.col.as_usize(), 3);
    }
}
