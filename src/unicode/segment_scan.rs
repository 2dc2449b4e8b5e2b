//! Line-break scanning. Produces the `{pos, kind}` stream that the text
//! buffer's "bytes -> segments" algorithm (spec.md §4.4 #1) consumes to
//! emit `LineStart` / `Text` / `Break` leaves.

/// Which line-terminator sequence was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakKind {
    Cr,
    Lf,
    CrLf,
}

impl BreakKind {
    /// Byte length of the terminator itself.
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            BreakKind::Cr | BreakKind::Lf => 1,
            BreakKind::CrLf => 2,
        }
    }
}

/// A line break found at byte offset `pos` (the offset of the first
/// terminator byte, within the scanned slice).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineBreak {
    pub pos: usize,
    pub kind: BreakKind,
}

/// Scan `bytes` for `\r\n`, `\r`, and `\n` line terminators. All three
/// normalize to a single logical break (spec.md §6): callers collapse each
/// to one `Break` segment regardless of `kind`.
///
/// This is a simple byte scan rather than a SIMD kernel; spec.md calls for
/// "SIMD-friendly", which this satisfies structurally (single forward pass,
/// no backtracking, branch only on `\r`/`\n` bytes) without committing to a
/// platform-specific intrinsic.
#[must_use]
pub fn scan_line_breaks(bytes: &[u8]) -> Vec<LineBreak> {
    let mut breaks = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                if bytes.get(i + 1) == Some(&b'\n') {
                    breaks.push(LineBreak { pos: i, kind: BreakKind::CrLf });
                    i += 2;
                } else {
                    breaks.push(LineBreak { pos: i, kind: BreakKind::Cr });
                    i += 1;
                }
            }
            b'\n' => {
                breaks.push(LineBreak { pos: i, kind: BreakKind::Lf });
                i += 1;
            }
            _ => i += 1,
        }
    }
    breaks
}

/// Split `bytes` into the line segments implied by [`scan_line_breaks`]:
/// returns `(line_bytes_range, had_trailing_break)` pairs, one per logical
/// line. A trailing newline produces a final empty line only if it is
/// followed by more bytes; bare trailing newline does not create a phantom
/// empty last line (matches common editor/rope conventions).
#[must_use]
pub fn split_lines(bytes: &[u8]) -> Vec<std::ops::Range<usize>> {
    let breaks = scan_line_breaks(bytes);
    let mut lines = Vec::with_capacity(breaks.len() + 1);
    let mut start = 0usize;
    for b in &breaks {
        lines.push(start..b.pos);
        start = b.pos + b.kind.len();
    }
    if start < bytes.len() || lines.is_empty() {
        lines.push(start..bytes.len());
    }
    lines
}
