//! Grapheme-aware horizontal motion and word-boundary search over a single
//! logical line's already-extracted text (spec.md §4.6). These are pure
//! functions over `&str` so they're testable without a [`TextBuffer`]
//! round-trip.
//!
//! [`TextBuffer`]: crate::text_buffer::TextBuffer

use crate::config::EngineConfig;
use crate::unicode::{self, width, wrap_break};

/// Width (in display columns) of the grapheme cluster immediately at or
/// after column `col` in `line`. Returns `None` at end of line.
#[must_use]
pub fn grapheme_width_at(line: &str, col: u32, config: EngineConfig) -> Option<u32> {
    let mut cursor = 0u32;
    for cluster in unicode::graphemes(line) {
        let w = width::grapheme_width(cluster, cursor as usize, config.tab_width, config.width_method).as_usize() as u32;
        if cursor == col {
            return Some(w);
        }
        cursor += w;
    }
    None
}

/// Width of the grapheme cluster immediately before column `col`. Returns
/// `None` at the start of the line.
#[must_use]
pub fn prev_grapheme_width(line: &str, col: u32, config: EngineConfig) -> Option<u32> {
    let mut cursor = 0u32;
    let mut prev_width = None;
    for cluster in unicode::graphemes(line) {
        if cursor >= col {
            break;
        }
        let w = width::grapheme_width(cluster, cursor as usize, config.tab_width, config.width_method).as_usize() as u32;
        prev_width = Some(w);
        cursor += w;
    }
    prev_width
}

/// Display width of a complete line, used to find "end of line" columns.
#[must_use]
pub fn line_width(line: &str, config: EngineConfig) -> u32 {
    width::str_width(line, 0, config.tab_width, config.width_method).as_usize() as u32
}

/// First forward word-break column strictly after `col` in `line`. `None`
/// if `line` has no break past `col` (caller falls through to end-of-line
/// or the next logical line, per spec.md §4.6).
#[must_use]
pub fn word_break_after(line: &str, col: u32, config: EngineConfig) -> Option<u32> {
    let after_byte = col_to_byte(line, col, config)?;
    let breaks = wrap_break::wrap_breaks(line);
    let brk = wrap_break::first_break_after(&breaks, after_byte)?;
    byte_to_col(line, brk.byte_pos, config)
}

/// Last backward word-break column strictly before `col` in `line`. `None`
/// if `line` has no break before `col`.
#[must_use]
pub fn word_break_before(line: &str, col: u32, config: EngineConfig) -> Option<u32> {
    let before_byte = col_to_byte(line, col, config)?;
    let breaks = wrap_break::wrap_breaks(line);
    let brk = wrap_break::last_break_before(&breaks, before_byte)?;
    byte_to_col(line, brk.byte_pos, config)
}

fn col_to_byte(line: &str, col: u32, config: EngineConfig) -> Option<usize> {
    let mut cursor = 0u32;
    let mut byte_off = 0usize;
    if col == 0 {
        return Some(0);
    }
    for cluster in unicode::graphemes(line) {
        if cursor == col {
            return Some(byte_off);
        }
        cursor += width::grapheme_width(cluster, cursor as usize, config.tab_width, config.width_method).as_usize() as u32;
        byte_off += cluster.len();
    }
    (cursor == col).then_some(byte_off)
}

fn byte_to_col(line: &str, byte_pos: usize, config: EngineConfig) -> Option<u32> {
    let mut cursor = 0u32;
    let mut byte_off = 0usize;
    if byte_pos == 0 {
        return Some(0);
    }
    for cluster in unicode::graphemes(line) {
        if byte_off == byte_pos {
            return Some(cursor);
        }
        cursor += width::grapheme_width(cluster, cursor as usize, config.tab_width, config.width_method).as_usize() as u32;
        byte_off += cluster.len();
    }
    (byte_off == byte_pos).then_some(cursor)
}
