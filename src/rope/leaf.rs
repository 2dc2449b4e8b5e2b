//! The three leaf variants of the segment rope (spec.md §3).

/// Per-chunk flags. Only one bit defined today; kept as a bitset so future
/// fast-path hints don't need a layout change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkFlags(pub u8);

impl ChunkFlags {
    pub const NONE: Self = Self(0);
    pub const ASCII_ONLY: Self = Self(1 << 0);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// A reference into one memory-registry buffer: `{ mem_id, byte_start,
/// byte_end, width_cols, flags }` (spec.md §3). `width_cols` is
/// precomputed once at construction (spec.md "TextChunk width
/// precomputation").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextChunk {
    pub mem_id: u8,
    pub byte_start: u32,
    pub byte_end: u32,
    pub width_cols: u32,
    pub flags: ChunkFlags,
}

impl TextChunk {
    #[must_use]
    pub fn byte_len(&self) -> u32 {
        self.byte_end - self.byte_start
    }

    #[must_use]
    pub fn is_ascii_only(&self) -> bool {
        self.flags.contains(ChunkFlags::ASCII_ONLY)
    }

    /// Two `Text` leaves are rewrite-mergeable when they share a `mem_id`
    /// and are byte-contiguous (spec.md §3 rope invariant).
    #[must_use]
    pub fn contiguous_with(&self, other: &TextChunk) -> bool {
        self.mem_id == other.mem_id && self.byte_end == other.byte_start
    }

    #[must_use]
    pub fn merge(&self, other: &TextChunk) -> TextChunk {
        debug_assert!(self.contiguous_with(other));
        TextChunk {
            mem_id: self.mem_id,
            byte_start: self.byte_start,
            byte_end: other.byte_end,
            width_cols: self.width_cols + other.width_cols,
            flags: if self.is_ascii_only() && other.is_ascii_only() {
                ChunkFlags::ASCII_ONLY
            } else {
                ChunkFlags::NONE
            },
        }
    }
}

/// A leaf of the segment rope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Leaf {
    /// Zero-width marker denoting the beginning of a logical line.
    LineStart,
    /// Zero-width line break. A `Break` always separates two `LineStart`s.
    Break,
    /// A styled text span.
    Text(TextChunk),
}

impl Leaf {
    #[must_use]
    pub fn width(&self) -> u32 {
        match self {
            Leaf::LineStart | Leaf::Break => 0,
            Leaf::Text(chunk) => chunk.width_cols,
        }
    }

    #[must_use]
    pub fn byte_len(&self) -> u32 {
        match self {
            Leaf::LineStart | Leaf::Break => 0,
            Leaf::Text(chunk) => chunk.byte_len(),
        }
    }

    #[must_use]
    pub fn is_line_start(&self) -> bool {
        matches!(self, Leaf::LineStart)
    }

    #[must_use]
    pub fn is_break(&self) -> bool {
        matches!(self, Leaf::Break)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&TextChunk> {
        match self {
            Leaf::Text(chunk) => Some(chunk),
            _ => None,
        }
    }
}
