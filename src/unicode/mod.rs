//! Pure Unicode helpers: grapheme width, line-break scanning, and wrap-break
//! detection. Nothing in this module touches the rope, the grapheme pool, or
//! any buffer type — it is the leaf dependency for all of them (spec.md §2).

pub mod segment_scan;
pub mod width;
pub mod wrap_break;

pub use segment_scan::{scan_line_breaks, split_lines, BreakKind, LineBreak};
pub use width::{grapheme_width, is_ascii_only, str_width};
pub use wrap_break::{first_break_after, last_break_before, last_fitting_break, wrap_breaks, WrapBreak};

use unicode_segmentation::UnicodeSegmentation;

/// Iterate the grapheme clusters of `s`, extended grapheme-cluster mode
/// (matches what a terminal renders as one cell-group).
#[must_use]
pub fn graphemes(s: &str) -> unicode_segmentation::Graphemes<'_> {
    s.graphemes(true)
}
