//! A "virtual line" is one on-screen row produced by wrapping (and possibly
//! truncating) a logical buffer line (spec.md §4.5).

use crate::units::{ColRange, RowIndex};

/// One rendered row: which logical `row` it came from, which display
/// columns of that row it shows, and the text already wrapped/truncated to
/// fit the view's width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualLine {
    pub source_row: RowIndex,
    pub source_cols: ColRange,
    pub text: String,
    /// `true` if this virtual line is the last sub-line of its source row
    /// (spec.md §4.5 `find_visual_line_index`: the last sub-line uses `<=`
    /// where every earlier one uses `<`).
    pub is_last_of_row: bool,
    /// Flat document offset (spec.md's `coords_to_offset`) at which this
    /// virtual line begins, so a caller can place a selection position
    /// without re-deriving `(row, col)` (spec.md §3 `char_offset`).
    pub char_offset: u32,
    /// `true` if [`wrap::truncate_line`] shortened this line with an
    /// ellipsis (spec.md §3 `is_truncated`).
    pub is_truncated: bool,
    /// Display column, within `text`, where the ellipsis starts. `None`
    /// when `is_truncated` is `false`.
    pub ellipsis_pos: Option<u32>,
    /// Display column, within the *source* line (`source_cols`), where the
    /// kept suffix starts. `None` when `is_truncated` is `false`. Lets a
    /// selection position in the suffix map back to the untruncated source
    /// column instead of only to the end of the kept prefix (spec.md §4.5).
    pub truncation_suffix_start: Option<u32>,
}
