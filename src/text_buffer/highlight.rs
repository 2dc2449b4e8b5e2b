//! Per-line highlight ranges and the sweep that resolves overlapping ranges
//! into non-overlapping [`StyleSpan`]s (spec.md §4.4 "highlight resolution").

use crate::units::ColIndex;

/// A single highlight range on one logical line, as added by
/// `TextBuffer::add_highlight`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Highlight {
    pub col_start: ColIndex,
    pub col_end: ColIndex,
    pub style_id: u32,
    pub priority: u8,
    /// Caller-supplied tag used by `remove_highlights_by_ref`; `None` means
    /// the highlight can only be cleared by `clear_line_highlights`.
    pub reference: Option<u32>,
}

/// One resolved, non-overlapping span of the sweep result: `[col,
/// next_col)` rendered with `style_id` (`0` = default/no style).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StyleSpan {
    pub col: ColIndex,
    pub next_col: ColIndex,
    pub style_id: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    End,
    Start,
}

/// Resolve `highlights` (any order, any amount of overlap) plus the line's
/// total `line_width` into an ordered, non-overlapping list of
/// [`StyleSpan`]s covering `[0, line_width)`.
///
/// At any column, the *active* highlight is the one with the highest
/// `priority` among all highlights currently covering that column; ties
/// break toward the highlight added last (spec.md §4.4 "priority sweep").
/// Columns covered by no highlight resolve to `style_id: 0`.
#[must_use]
pub fn resolve_line_spans(highlights: &[Highlight], line_width: u32) -> Vec<StyleSpan> {
    if highlights.is_empty() || line_width == 0 {
        return Vec::new();
    }

    // Event at `end` sorts before one at the same `start`, so a highlight
    // ending exactly where another begins doesn't create a zero-width
    // double-active window.
    let mut events: Vec<(u32, EventKind, usize)> = Vec::with_capacity(highlights.len() * 2);
    for (i, hl) in highlights.iter().enumerate() {
        let start = hl.col_start.as_usize() as u32;
        let end = hl.col_end.as_usize() as u32;
        if end <= start {
            continue;
        }
        events.push((start, EventKind::Start, i));
        events.push((end, EventKind::End, i));
    }
    events.sort_by_key(|&(col, kind, idx)| (col, kind, idx));

    let mut spans = Vec::new();
    let mut active: Vec<usize> = Vec::new();
    let mut cursor = 0u32;
    let mut i = 0;

    while i < events.len() {
        let col = events[i].0;
        if col > cursor {
            push_span(&mut spans, highlights, &active, cursor, col);
            cursor = col;
        }
        while i < events.len() && events[i].0 == col {
            match events[i].1 {
                EventKind::Start => active.push(events[i].2),
                EventKind::End => active.retain(|&x| x != events[i].2),
            }
            i += 1;
        }
    }
    if cursor < line_width {
        push_span(&mut spans, highlights, &active, cursor, line_width);
    }
    spans
}

fn push_span(spans: &mut Vec<StyleSpan>, highlights: &[Highlight], active: &[usize], start: u32, end: u32) {
    let style_id = active
        .iter()
        .map(|&i| &highlights[i])
        .max_by_key(|hl| (hl.priority, hl.col_start.as_usize()))
        .map_or(0, |hl| hl.style_id);
    if let Some(last) = spans.last_mut() {
        let last: &mut StyleSpan = last;
        if last.style_id == style_id && last.next_col.as_usize() as u32 == start {
            last.next_col = ColIndex::new(end as usize);
            return;
        }
    }
    spans.push(StyleSpan { col: ColIndex::new(start as usize), next_col: ColIndex::new(end as usize), style_id });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hl(start: usize, end: usize, style: u32, priority: u8) -> Highlight {
        Highlight { col_start: ColIndex::new(start), col_end: ColIndex::new(end), style_id: style, priority, reference: None }
    }

    #[test]
    fn no_highlights_is_empty() {
        assert!(resolve_line_spans(&[], 10).is_empty());
    }

    #[test]
    fn single_highlight_produces_three_spans() {
        let spans = resolve_line_spans(&[hl(2, 5, 7, 0)], 10);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0], StyleSpan { col: ColIndex::new(0), next_col: ColIndex::new(2), style_id: 0 });
        assert_eq!(spans[1], StyleSpan { col: ColIndex::new(2), next_col: ColIndex::new(5), style_id: 7 });
        assert_eq!(spans[2], StyleSpan { col: ColIndex::new(5), next_col: ColIndex::new(10), style_id: 0 });
    }

    #[test]
    fn overlapping_highlights_resolve_by_priority() {
        let spans = resolve_line_spans(&[hl(0, 10, 1, 0), hl(3, 6, 2, 5)], 10);
        assert_eq!(spans[0], StyleSpan { col: ColIndex::new(0), next_col: ColIndex::new(3), style_id: 1 });
        assert_eq!(spans[1], StyleSpan { col: ColIndex::new(3), next_col: ColIndex::new(6), style_id: 2 });
        assert_eq!(spans[2], StyleSpan { col: ColIndex::new(6), next_col: ColIndex::new(10), style_id: 1 });
    }

    #[test]
    fn adjacent_same_style_spans_merge() {
        let spans = resolve_line_spans(&[hl(0, 3, 9, 0), hl(3, 6, 9, 0)], 6);
        assert_eq!(spans, vec![StyleSpan { col: ColIndex::new(0), next_col: ColIndex::new(6), style_id: 9 }]);
    }

    #[test]
    fn tie_priority_prefers_later_start() {
        let spans = resolve_line_spans(&[hl(0, 10, 1, 3), hl(2, 8, 2, 3)], 10);
        assert_eq!(spans[1].style_id, 2);
    }
}
