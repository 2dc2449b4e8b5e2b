//! Wrap and truncation algorithms (spec.md §4.5). Both operate on a single
//! logical line's text and its precomputed display width; neither touches
//! the rope or the buffer directly, so they're unit-testable in isolation.

use crate::config::{WidthMethod, WrapMode};
use crate::units::{ColIndex, ColRange};
use crate::unicode::{self, width, wrap_break};

/// One sub-line produced by wrapping a logical line: the half-open display
/// column range `[start, end)` of source text it covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrapSegment {
    pub cols: ColRange,
}

/// Wrap `text` (one logical line, no embedded `\n`) to `wrap_width` display
/// columns under `mode`. `wrap_width == 0` disables wrapping (treated as
/// [`WrapMode::None`]).
#[must_use]
pub fn wrap_line(text: &str, wrap_width: u32, mode: WrapMode, tab_width: u8, method: WidthMethod) -> Vec<WrapSegment> {
    let total = width::str_width(text, 0, tab_width, method).as_usize() as u32;
    if matches!(mode, WrapMode::None) || wrap_width == 0 {
        return vec![WrapSegment { cols: ColRange::new(ColIndex::new(0), ColIndex::new(total as usize)) }];
    }

    // Column at each grapheme boundary, and (for Word mode) the byte offset
    // of each boundary so word-break positions (computed on bytes) can be
    // translated into columns.
    let mut boundaries: Vec<(usize, u32)> = Vec::new(); // (byte_offset, col)
    let mut col = 0u32;
    let mut byte_off = 0usize;
    boundaries.push((0, 0));
    for cluster in unicode::graphemes(text) {
        col += width::grapheme_width(cluster, col as usize, tab_width, method).as_usize() as u32;
        byte_off += cluster.len();
        boundaries.push((byte_off, col));
    }

    let word_breaks: Vec<usize> = match mode {
        WrapMode::Word => wrap_break::wrap_breaks(text).into_iter().map(|b| b.byte_pos).collect(),
        _ => Vec::new(),
    };

    let mut segments = Vec::new();
    let mut seg_start_col = 0u32;
    let mut seg_start_idx = 0usize; // index into `boundaries`

    let mut i = 0usize;
    while i + 1 < boundaries.len() {
        let (_, next_col) = boundaries[i + 1];
        if next_col - seg_start_col > wrap_width {
            // `boundaries[i]` is the last grapheme that still fit.
            let break_idx = if matches!(mode, WrapMode::Word) {
                // Unwind to the latest recorded word-break at or before `i`,
                // falling back to the hard character break when the line has
                // no break point that fits (spec.md §4.5 word-wrap policy).
                find_unwind_break(&boundaries, &word_breaks, seg_start_idx, i).unwrap_or(i)
            } else {
                i
            };
            let break_idx = break_idx.max(seg_start_idx + 1); // always make progress
            let (_, end_col) = boundaries[break_idx];
            segments.push(WrapSegment { cols: ColRange::new(ColIndex::new(seg_start_col as usize), ColIndex::new(end_col as usize)) });
            seg_start_col = end_col;
            seg_start_idx = break_idx;
            i = break_idx;
            continue;
        }
        i += 1;
    }
    let (_, final_col) = *boundaries.last().unwrap();
    segments.push(WrapSegment { cols: ColRange::new(ColIndex::new(seg_start_col as usize), ColIndex::new(final_col as usize)) });
    segments
}

/// Find the last boundary index in `(seg_start_idx, up_to_idx]` whose byte
/// offset is a recorded word break.
fn find_unwind_break(boundaries: &[(usize, u32)], word_breaks: &[usize], seg_start_idx: usize, up_to_idx: usize) -> Option<usize> {
    (seg_start_idx + 1..=up_to_idx)
        .rev()
        .find(|&idx| word_breaks.contains(&boundaries[idx].0))
}

/// Result of [`truncate_line`]: the rendered text plus the positions a
/// caller needs to hit-test a selection against it (spec.md §3 Virtual
/// Lines `is_truncated`, `ellipsis_pos`, `truncation_suffix_start`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TruncatedLine {
    pub text: String,
    pub is_truncated: bool,
    /// Display column, within the *rendered* text, where the ellipsis
    /// starts. `None` when untruncated.
    pub ellipsis_pos: Option<u32>,
    /// Display column, within the *source* line, where the kept suffix
    /// starts. `None` when untruncated.
    pub truncation_suffix_start: Option<u32>,
}

/// Truncate `text` (a single display line, already narrower or wider than
/// `width`) to fit `width` columns, inserting a centered ellipsis when it
/// doesn't fit (spec.md §4.5 `truncate`): `prefix_width = (W - 3) / 2`,
/// `suffix_width = (W - 3) - prefix_width`. Returns the original text
/// unchanged if it already fits or `width` is too small to hold an
/// ellipsis (`< 3`).
#[must_use]
pub fn truncate_line(text: &str, width: u32, tab_width: u8, method: WidthMethod) -> TruncatedLine {
    let total = crate::unicode::width::str_width(text, 0, tab_width, method).as_usize() as u32;
    if total <= width || width < 3 {
        return TruncatedLine { text: text.to_string(), is_truncated: false, ellipsis_pos: None, truncation_suffix_start: None };
    }
    let prefix_width = (width - 3) / 2;
    let suffix_width = (width - 3) - prefix_width;

    let prefix = take_cols(text, 0, prefix_width, tab_width, method);
    let suffix_start_col = total - suffix_width;
    let suffix = take_from_col(text, suffix_start_col, tab_width, method);

    TruncatedLine {
        text: format!("{prefix}...{suffix}"),
        is_truncated: true,
        ellipsis_pos: Some(prefix_width),
        truncation_suffix_start: Some(suffix_start_col),
    }
}

fn take_cols(text: &str, start_col: usize, width: u32, tab_width: u8, method: WidthMethod) -> String {
    let mut col = start_col as u32;
    let target = start_col as u32 + width;
    let mut out = String::new();
    for cluster in unicode::graphemes(text) {
        let w = width::grapheme_width(cluster, col as usize, tab_width, method).as_usize() as u32;
        if col + w > target {
            break;
        }
        out.push_str(cluster);
        col += w;
    }
    out
}

fn take_from_col(text: &str, start_col: u32, tab_width: u8, method: WidthMethod) -> String {
    let mut col = 0u32;
    let mut out = String::new();
    for cluster in unicode::graphemes(text) {
        let w = width::grapheme_width(cluster, col as usize, tab_width, method).as_usize() as u32;
        if col >= start_col {
            out.push_str(cluster);
        }
        col += w;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::ColIndex;

    #[test]
    fn none_mode_is_a_single_segment() {
        let segs = wrap_line("hello world", 5, WrapMode::None, 4, WidthMethod::Unicode);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].cols, ColRange::new(ColIndex::new(0), ColIndex::new(11)));
    }

    #[test]
    fn char_wrap_breaks_at_width() {
        let segs = wrap_line("abcdefgh", 3, WrapMode::Char, 4, WidthMethod::Unicode);
        let widths: Vec<u32> = segs.iter().map(|s| (s.cols.end.as_usize() - s.cols.start.as_usize()) as u32).collect();
        assert_eq!(widths, vec![3, 3, 2]);
    }

    #[test]
    fn word_wrap_unwinds_to_earlier_space() {
        let segs = wrap_line("foo bar baz", 7, WrapMode::Word, 4, WidthMethod::Unicode);
        // "foo bar" fits in 7; "baz" continues the next segment rather than
        // splitting "bar" mid-word.
        assert_eq!(segs[0].cols, ColRange::new(ColIndex::new(0), ColIndex::new(7)));
    }

    #[test]
    fn word_with_no_break_falls_back_to_char_wrap() {
        let segs = wrap_line("supercalifragilistic", 5, WrapMode::Word, 4, WidthMethod::Unicode);
        assert!(segs.len() > 1);
        assert_eq!(segs[0].cols.start.as_usize(), 0);
        assert_eq!(segs[0].cols.end.as_usize(), 5);
    }

    #[test]
    fn truncate_short_text_is_unchanged() {
        let out = truncate_line("hi", 10, 4, WidthMethod::Unicode);
        assert_eq!(out.text, "hi");
        assert!(!out.is_truncated);
        assert_eq!(out.ellipsis_pos, None);
        assert_eq!(out.truncation_suffix_start, None);
    }

    #[test]
    fn truncate_centers_ellipsis() {
        let out = truncate_line("abcdefghijklmnop", 11, 4, WidthMethod::Unicode);
        assert_eq!(out.text, "abcd...mnop");
        assert!(out.is_truncated);
        assert_eq!(out.ellipsis_pos, Some(4));
        assert_eq!(out.truncation_suffix_start, Some(12));
    }

    #[test]
    fn truncate_matches_spec_scenario() {
        // spec scenario: line width 20, viewport width 11 -> prefix_width=4,
        // ellipsis_pos=4, suffix_start=16.
        let text = "a".repeat(20);
        let out = truncate_line(&text, 11, 4, WidthMethod::Unicode);
        assert_eq!(out.ellipsis_pos, Some(4));
        assert_eq!(out.truncation_suffix_start, Some(16));
    }
}
