//! Grapheme-cluster display width. A grapheme cluster (see the GLOSSARY in
//! `spec.md`) occupies 0, 1, or 2 display columns; tabs expand to the next
//! tab stop. This module has no knowledge of buffers, ropes, or pools — it
//! is pure text -> width.

use crate::config::WidthMethod;
use crate::units::ColWidth;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// `true` when every byte of `s` is ASCII. Callers use this to short-circuit
/// the grapheme walk entirely (spec.md §3 `ASCII_ONLY` flag).
#[must_use]
pub fn is_ascii_only(s: &str) -> bool {
    s.is_ascii()
}

/// Width of a single grapheme cluster under `method`, given the current
/// column (needed so tabs can expand to the correct stop) and `tab_width`.
#[must_use]
pub fn grapheme_width(cluster: &str, col: usize, tab_width: u8, method: WidthMethod) -> ColWidth {
    if cluster == "\t" {
        let tab_width = tab_width.max(1) as usize;
        let next_stop = ((col / tab_width) + 1) * tab_width;
        return ColWidth(next_stop - col);
    }

    if is_zero_width_cluster(cluster) {
        return ColWidth(0);
    }

    if is_emoji_presentation(cluster) {
        return ColWidth(2);
    }

    match method {
        WidthMethod::Unicode => ColWidth(UnicodeWidthStr::width(cluster).max(if cluster.is_empty() { 0 } else { 1 })),
        WidthMethod::WcWidth => ColWidth(wcwidth_str(cluster)),
    }
}

/// Total display width of `s`, assuming it starts at column `start_col` (so
/// tab expansion is correct) and contains no line breaks. Uses the ASCII
/// fast path when possible.
#[must_use]
pub fn str_width(s: &str, start_col: usize, tab_width: u8, method: WidthMethod) -> ColWidth {
    if is_ascii_only(s) && !s.contains('\t') {
        return ColWidth(s.len());
    }

    let mut col = start_col;
    let mut total = 0usize;
    for cluster in s.graphemes(true) {
        let w = grapheme_width(cluster, col, tab_width, method);
        total += w.0;
        col += w.0;
    }
    ColWidth(total)
}

fn is_zero_width_cluster(cluster: &str) -> bool {
    cluster.chars().all(|c| {
        matches!(
            c,
            '\u{200B}'..='\u{200D}' | '\u{FE00}'..='\u{FE0F}' | '\u{0300}'..='\u{036F}'
        )
    }) && !cluster.is_empty()
}

/// Heuristic for "this grapheme cluster renders as an emoji" — either it
/// contains an explicit emoji-presentation selector (U+FE0F) or its base
/// scalar falls in a block that is emoji-presentation by default.
fn is_emoji_presentation(cluster: &str) -> bool {
    if cluster.contains('\u{FE0F}') {
        return true;
    }
    cluster.chars().next().is_some_and(|c| {
        let cp = c as u32;
        matches!(cp,
            0x1F300..=0x1FAFF | 0x2600..=0x27BF | 0x1F000..=0x1F0FF
        )
    })
}

/// Minimal `wcwidth`-style table: wide East-Asian ranges count 2, everything
/// else printable counts 1, combining marks count 0.
fn wcwidth_str(cluster: &str) -> usize {
    cluster
        .chars()
        .map(|c| {
            let cp = c as u32;
            if matches!(c, '\u{0300}'..='\u{036F}') {
                0
            } else if is_wide_wcwidth(cp) {
                2
            } else {
                1
            }
        })
        .sum()
}

fn is_wide_wcwidth(cp: u32) -> bool {
    matches!(cp,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_byte_width() {
        assert_eq!(str_width("hello", 0, 4, WidthMethod::Unicode).0, 5);
    }

    #[test]
    fn cjk_counts_two_columns() {
        // "世" and "界" are wide.
        let w = str_width("a世界b", 0, 2, WidthMethod::Unicode);
        assert_eq!(w.0, 6);
    }

    #[test]
    fn tab_expands_to_next_stop() {
        let w = grapheme_width("\t", 1, 4, WidthMethod::Unicode);
        assert_eq!(w.0, 3);
    }

    #[test]
    fn emoji_counts_two_columns() {
        let w = str_width("a😀b", 0, 4, WidthMethod::Unicode);
        assert_eq!(w.0, 4);
    }
}
