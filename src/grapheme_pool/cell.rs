//! Grid-cell `char` encoding (spec.md §4.1, §6). A rendered grid cell packs
//! either a direct Unicode scalar, the start of a wide grapheme span, or a
//! continuation cell, into a single `u32`:
//!
//! ```text
//! bit:  31 30 | 29 28 27 26 | 25 .......................... 0
//!       tag   | left  right | grapheme id payload (26 bits)
//! ```
//!
//! `tag = 00` is a direct scalar (the low bits are the scalar value, not a
//! grapheme id). `tag = 10` starts a grapheme span; `tag = 11` is a
//! continuation cell of a span that started earlier. `left`/`right` each
//! hold 0..=3 and count how many additional cells the span occupies to each
//! side of the cell carrying them.

use super::id::GraphemeId;

const TAG_DIRECT: u32 = 0b00;
const TAG_START: u32 = 0b10;
const TAG_CONTINUATION: u32 = 0b11;

const TAG_SHIFT: u32 = 30;
const EXTENT_SHIFT: u32 = 26;
const EXTENT_MASK: u32 = 0b1111;
const PAYLOAD_MASK: u32 = 0x03FF_FFFF;

/// A decoded grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellChar {
    /// A single-column (or caller-known-width) Unicode scalar.
    Direct(char),
    /// The first cell of a (possibly wide) grapheme cluster.
    GraphemeStart { id: GraphemeId, right_extent: u8 },
    /// A continuation cell of a grapheme cluster started `left_extent`
    /// cells to the left (and extending `right_extent` further right).
    Continuation { id: GraphemeId, left_extent: u8, right_extent: u8 },
}

impl CellChar {
    #[must_use]
    pub fn encode(self) -> u32 {
        match self {
            CellChar::Direct(c) => (TAG_DIRECT << TAG_SHIFT) | (c as u32 & PAYLOAD_MASK),
            CellChar::GraphemeStart { id, right_extent } => {
                let extents = u32::from(right_extent.min(3)) & 0b11;
                (TAG_START << TAG_SHIFT) | (extents << EXTENT_SHIFT) | id.raw()
            }
            CellChar::Continuation { id, left_extent, right_extent } => {
                let left = u32::from(left_extent.min(3)) & 0b11;
                let right = u32::from(right_extent.min(3)) & 0b11;
                let extents = (left << 2) | right;
                (TAG_CONTINUATION << TAG_SHIFT) | (extents << EXTENT_SHIFT) | id.raw()
            }
        }
    }

    #[must_use]
    pub fn decode(raw: u32) -> Self {
        let tag = raw >> TAG_SHIFT;
        let payload = raw & PAYLOAD_MASK;
        match tag {
            TAG_START => {
                let extents = (raw >> EXTENT_SHIFT) & EXTENT_MASK;
                CellChar::GraphemeStart {
                    id: GraphemeId::from_raw(payload),
                    right_extent: (extents & 0b11) as u8,
                }
            }
            TAG_CONTINUATION => {
                let extents = (raw >> EXTENT_SHIFT) & EXTENT_MASK;
                CellChar::Continuation {
                    id: GraphemeId::from_raw(payload),
                    left_extent: ((extents >> 2) & 0b11) as u8,
                    right_extent: (extents & 0b11) as u8,
                }
            }
            _ => CellChar::Direct(char::from_u32(payload).unwrap_or('\u{FFFD}')),
        }
    }
}

/// Width in cells implied by a raw cell `char`, per spec.md §4.1: "returns
/// `left+right+1` for continuations, `right+1` for starts, else 1".
#[must_use]
pub fn encoded_char_width(raw: u32) -> u8 {
    match CellChar::decode(raw) {
        CellChar::Direct(_) => 1,
        CellChar::GraphemeStart { right_extent, .. } => right_extent + 1,
        CellChar::Continuation { left_extent, right_extent, .. } => left_extent + right_extent + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grapheme_pool::id::SizeClass;

    fn make_id() -> GraphemeId {
        GraphemeId::pack(SizeClass::C32, 3, 42)
    }

    #[test]
    fn direct_scalar_round_trips() {
        let encoded = CellChar::Direct('x').encode();
        assert_eq!(CellChar::decode(encoded), CellChar::Direct('x'));
        assert_eq!(encoded_char_width(encoded), 1);
    }

    #[test]
    fn grapheme_start_round_trips() {
        let id = make_id();
        let encoded = CellChar::GraphemeStart { id, right_extent: 1 }.encode();
        assert_eq!(encoded_char_width(encoded), 2);
        match CellChar::decode(encoded) {
            CellChar::GraphemeStart { id: decoded_id, right_extent } => {
                assert_eq!(decoded_id, id);
                assert_eq!(right_extent, 1);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn continuation_round_trips() {
        let id = make_id();
        let encoded = CellChar::Continuation { id, left_extent: 1, right_extent: 0 }.encode();
        assert_eq!(encoded_char_width(encoded), 2);
    }
}
