//! UAX #14-like wrap-break position detection, used by word wrap (spec.md
//! §4.5) and by the edit buffer's word-boundary motion (spec.md §4.6).
//!
//! We approximate UAX #14 with `unicode-segmentation`'s word-boundary
//! iterator: a wrap break is legal immediately after a word boundary that is
//! itself followed by non-whitespace content, mirroring how most terminal
//! editors treat "break after a word, not mid-word".

use unicode_segmentation::UnicodeSegmentation;

/// A candidate wrap-break position: the byte offset *after* which a line
/// may be split (i.e. the break sits between `byte_pos - 1` and `byte_pos`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrapBreak {
    pub byte_pos: usize,
}

/// Compute all wrap-break positions within `line`, in ascending order.
/// Position `0` is never returned (there is nothing to wrap before the
/// start of the line) and `line.len()` is never returned (the end of the
/// line is not itself a "break" a wrapper needs to act on).
#[must_use]
pub fn wrap_breaks(line: &str) -> Vec<WrapBreak> {
    let mut breaks = Vec::new();
    for (byte_pos, _word) in line.split_word_bound_indices() {
        // A break is legal at the start of every word-bound segment except
        // the very first (nothing precedes it to wrap). Trailing whitespace
        // on the preceding segment is consumed by the line it follows.
        if byte_pos != 0 {
            breaks.push(WrapBreak { byte_pos });
        }
    }
    breaks
}

/// Return the last break in `breaks` whose `byte_pos <= max_byte`, i.e. the
/// rightmost break that still fits. This implements the "prefer the last
/// break that fits" policy from spec.md §4.5.
#[must_use]
pub fn last_fitting_break(breaks: &[WrapBreak], max_byte: usize) -> Option<WrapBreak> {
    breaks.iter().rev().find(|b| b.byte_pos <= max_byte).copied()
}

/// Return the first break in `breaks` whose `byte_pos > after_byte`, used by
/// forward word motion (spec.md §4.6).
#[must_use]
pub fn first_break_after(breaks: &[WrapBreak], after_byte: usize) -> Option<WrapBreak> {
    breaks.iter().find(|b| b.byte_pos > after_byte).copied()
}

/// Return the last break in `breaks` whose `byte_pos < before_byte`, used by
/// backward word motion (spec.md §4.6).
#[must_use]
pub fn last_break_before(breaks: &[WrapBreak], before_byte: usize) -> Option<WrapBreak> {
    breaks.iter().rev().find(|b| b.byte_pos < before_byte).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_breaks_between_words() {
        let breaks = wrap_breaks("hello world foo");
        let positions: Vec<usize> = breaks.iter().map(|b| b.byte_pos).collect();
        assert!(positions.contains(&6)); // after "hello "
        assert!(positions.contains(&12)); // after "world "
    }

    #[test]
    fn last_fitting_break_prefers_rightmost() {
        let breaks = wrap_breaks("hello world foo");
        let chosen = last_fitting_break(&breaks, 10).unwrap();
        assert_eq!(chosen.byte_pos, 6);
    }

    #[test]
    fn no_break_for_single_word() {
        let breaks = wrap_breaks("supercalifragilistic");
        assert!(breaks.is_empty());
    }
}
