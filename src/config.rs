//! Configuration knobs shared by the text buffer and its views. `spec.md`
//! §9 leaves width-method selection for ambiguous-width codepoints as an
//! open question; we expose it as a config enum rather than baking in a
//! single policy.

use strum_macros::{Display, EnumString};

/// Default tab width used when a buffer does not override it. Must stay an
/// even number >= 2 (`TextBuffer::set_tab_width` enforces this on write).
pub const DEFAULT_TAB_WIDTH: u8 = 4;

/// Policy for computing the display width of ambiguous-width and emoji
/// codepoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
pub enum WidthMethod {
    /// `unicode-width`'s East-Asian-Width aware calculation, with
    /// emoji-presentation clusters forced to width 2.
    #[default]
    Unicode,
    /// Classic POSIX `wcwidth` table (ambiguous-width codepoints count as 1).
    WcWidth,
}

/// How a [`crate::view::TextBufferView`] wraps virtual lines. See spec.md
/// §4.5.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
pub enum WrapMode {
    /// One virtual line per logical line; the viewport slices horizontally.
    #[default]
    None,
    /// Hard wrap at column boundaries; a single grapheme wider than the wrap
    /// width takes its own line rather than being split.
    Char,
    /// Wrap at UAX #14-like word-break positions, falling back to character
    /// wrap for a line that has no break and doesn't fit.
    Word,
}

/// Buffer- and view-level configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub tab_width: u8,
    pub width_method: WidthMethod,
    pub truncate: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            width_method: WidthMethod::default(),
            truncate: false,
        }
    }
}

impl EngineConfig {
    /// Clamp a requested tab width to the spec's "even, >= 2" invariant
    /// (spec.md §4.4 `set_tab_width`).
    #[must_use]
    pub fn clamp_tab_width(width: u8) -> u8 {
        let width = width.max(2);
        if width % 2 == 1 { width + 1 } else { width }
    }
}
