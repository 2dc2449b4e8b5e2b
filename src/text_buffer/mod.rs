//! The text buffer: owns a [`SegmentRope`] plus the byte storage it
//! references, and layers per-line highlights and width-aware range
//! extraction on top (spec.md §4.4).

pub mod coords;
pub mod highlight;
pub mod style;

pub use highlight::{Highlight, StyleSpan};
pub use style::{Rgba, Style, SyntaxStyleRegistry, TextAttributes};

use std::collections::HashMap;
use std::rc::Weak;

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{Result, TextEngineError};
use crate::mem_registry::MemoryRegistry;
use crate::rope::leaf::{ChunkFlags, Leaf, TextChunk};
use crate::rope::SegmentRope;
use crate::unicode::{self, width};
use crate::units::{ColIndex, ColRange, RowIndex};

/// A `set_styled_text` input chunk: a run of bytes plus the style to apply
/// to its entire span (spec.md §4.4 "styled chunk ingestion").
pub struct StyledChunk<'a> {
    pub text: &'a str,
    pub style: Style,
}

/// Monotonically increasing counter bumped on every content mutation. Views
/// compare their last-seen epoch against [`TextBuffer::epoch`] rather than
/// receiving a push notification (spec.md §9 "lifetime ordering" design
/// note) — in Rust, a [`TextBufferView`](crate::view::TextBufferView)
/// simply borrows `&TextBuffer` for the duration of each query, so the
/// compile-time borrow checker enforces "views don't outlive their buffer"
/// for free; the epoch only needs to answer "has it changed since I last
/// measured".
pub type ContentEpoch = u64;

/// A rope-backed, styleable, incrementally editable text buffer.
pub struct TextBuffer {
    rope: SegmentRope,
    mem: MemoryRegistry,
    config: EngineConfig,
    highlights: HashMap<usize, Vec<Highlight>>,
    syntax_style: Option<Weak<SyntaxStyleRegistry>>,
    epoch: ContentEpoch,
    batch_depth: u32,
    /// The registry slot that small, single/few-character edits grow in
    /// place (spec.md §9 "append-only add-buffer"), so consecutive
    /// keystrokes stay byte-contiguous in the *same* `mem_id` and the
    /// rope's adjacent-leaf merge can coalesce them instead of leaving one
    /// leaf per keystroke.
    add_mem_id: Option<u8>,
}

/// A single add-buffer mem entry is rolled over to a fresh `mem_id` once it
/// would exceed this size, bounding how large a `replace` + leaf walk has to
/// scan for an in-progress typing burst.
const ADD_BUFFER_MAX_BYTES: usize = 4096;

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            rope: SegmentRope::new(),
            mem: MemoryRegistry::new(),
            config,
            highlights: HashMap::new(),
            syntax_style: None,
            epoch: 0,
            batch_depth: 0,
            add_mem_id: None,
        }
    }

    /// Append `text` onto the open add-buffer entry, growing it in place
    /// when there's room, or start a fresh one otherwise. Returns the
    /// `mem_id` to reference and the byte offset within it where `text`
    /// now lives.
    fn add_buffer_chunk(&mut self, text: &str) -> Result<(u8, u32)> {
        if let Some(id) = self.add_mem_id {
            if let Some(existing) = self.mem.get(id) {
                if existing.len() + text.len() <= ADD_BUFFER_MAX_BYTES {
                    let base = existing.len() as u32;
                    let mut bytes = existing.to_vec();
                    bytes.extend_from_slice(text.as_bytes());
                    self.mem.replace(id, bytes, true)?;
                    return Ok((id, base));
                }
            }
        }
        let id = self.mem.register(text.as_bytes().to_vec(), true)?;
        self.add_mem_id = Some(id);
        Ok((id, 0))
    }

    #[must_use]
    pub fn epoch(&self) -> ContentEpoch {
        self.epoch
    }

    #[must_use]
    pub fn rope(&self) -> &SegmentRope {
        &self.rope
    }

    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    fn bump_epoch(&mut self) {
        self.epoch += 1;
    }

    /// spec.md §4.4 `set_tab_width`: clamps to an even number >= 2.
    pub fn set_tab_width(&mut self, width: u8) {
        self.config.tab_width = EngineConfig::clamp_tab_width(width);
        self.bump_epoch();
    }

    pub fn set_syntax_style(&mut self, registry: &std::rc::Rc<SyntaxStyleRegistry>) {
        self.syntax_style = Some(std::rc::Rc::downgrade(registry));
    }

    fn resolve_style(&self, style_id: u32) -> Style {
        self.syntax_style
            .as_ref()
            .and_then(Weak::upgrade)
            .and_then(|registry| registry.style(style_id))
            .unwrap_or(Style::NONE)
    }

    // ---- bytes -> segments (spec.md §4.4 algorithm #1) ----------------

    /// Build rope leaves from `text`'s bytes, already registered at
    /// `mem_id`, using `base_byte_offset` as the offset of `text` within the
    /// registered buffer.
    fn build_leaves(&self, text: &str, mem_id: u8, base_byte_offset: u32) -> Vec<Leaf> {
        let lines = unicode::split_lines(text.as_bytes());
        let mut leaves = Vec::with_capacity(lines.len() * 2);
        let last = lines.len().saturating_sub(1);
        for (i, range) in lines.into_iter().enumerate() {
            leaves.push(Leaf::LineStart);
            if !range.is_empty() {
                let line_text = &text[range.clone()];
                let width_cols = width::str_width(line_text, 0, self.config.tab_width, self.config.width_method).as_usize() as u32;
                leaves.push(Leaf::Text(TextChunk {
                    mem_id,
                    byte_start: base_byte_offset + range.start as u32,
                    byte_end: base_byte_offset + range.end as u32,
                    width_cols,
                    flags: if width::is_ascii_only(line_text) { ChunkFlags::ASCII_ONLY } else { ChunkFlags::NONE },
                }));
            }
            if i != last {
                leaves.push(Leaf::Break);
            }
        }
        leaves
    }

    /// Replace the buffer's entire contents (spec.md §4.4 `set_text`).
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let mem_id = self.mem.register(text.as_bytes().to_vec(), true)?;
        let leaves = self.build_leaves(text, mem_id, 0);
        self.rope = SegmentRope::from_leaves(leaves);
        self.highlights.clear();
        self.bump_epoch();
        debug!(bytes = text.len(), "set_text");
        Ok(())
    }

    /// Replace the buffer's contents with bytes already living at `mem_id`
    /// in an external registry slot (spec.md §4.4 `set_text_from_mem_id`) —
    /// used when the caller (e.g. `load_file`) wants to avoid a copy.
    pub fn set_text_from_mem_id(&mut self, mem_id: u8, text: &str) -> Result<()> {
        self.mem.get(mem_id).ok_or(TextEngineError::InvalidMemId { mem_id })?;
        let leaves = self.build_leaves(text, mem_id, 0);
        self.rope = SegmentRope::from_leaves(leaves);
        self.highlights.clear();
        self.bump_epoch();
        Ok(())
    }

    /// Register `bytes` as owned external content and load it as if by
    /// `set_text` (spec.md §4.4 `load_file`), decoding as UTF-8 lossily as
    /// the teacher's editor buffer does for untrusted file content.
    pub fn load_file(&mut self, bytes: Vec<u8>) -> Result<()> {
        let text = String::from_utf8_lossy(&bytes).into_owned();
        self.set_text(&text)
    }

    /// Append `text` to the end of the buffer without disturbing existing
    /// highlights (spec.md §4.4 `append`).
    pub fn append(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let mem_id = self.mem.register(text.as_bytes().to_vec(), true)?;
        let leaves = self.build_leaves(text, mem_id, 0);
        let weight = self.rope.metrics().total_width;
        let splitter = Self::splitter(&self.mem, self.config);
        self.rope.insert_slice_by_weight(weight, leaves, &splitter);
        drop(splitter);
        self.bump_epoch();
        Ok(())
    }

    /// Ingest pre-styled chunks, registering a generated style per chunk
    /// (spec.md §4.4 `set_styled_text`).
    pub fn set_styled_text(&mut self, chunks: &[StyledChunk<'_>], registry: &std::rc::Rc<SyntaxStyleRegistry>) -> Result<()> {
        let joined: String = chunks.iter().map(|c| c.text).collect();
        self.set_text(&joined)?;
        self.set_syntax_style(registry);

        let mut col = 0usize;
        let mut row = 0usize;
        for chunk in chunks {
            let style_id = registry.register(chunk.style);
            for (i, segment) in chunk.text.split('\n').enumerate() {
                if i > 0 {
                    row += 1;
                    col = 0;
                }
                if !segment.is_empty() {
                    let w = width::str_width(segment, col, self.config.tab_width, self.config.width_method).as_usize();
                    self.add_highlight(row, Highlight {
                        col_start: ColIndex::new(col),
                        col_end: ColIndex::new(col + w),
                        style_id,
                        priority: 0,
                        reference: None,
                    });
                    col += w;
                }
            }
        }
        Ok(())
    }

    /// Drop all content but keep the memory registry and the undo history
    /// (spec.md §4.4 "`clear()`"). `undo()` after a `clear()` restores the
    /// content that was just cleared.
    pub fn clear(&mut self) {
        self.rope.store_undo("clear");
        self.rope.clear_content();
        self.highlights.clear();
        self.add_mem_id = None;
        self.bump_epoch();
    }

    /// Full tear-down: drop content, the memory registry, and the undo
    /// history (spec.md §4.4 "`reset()`"). Unlike `clear()`, nothing about
    /// this buffer's prior state survives.
    pub fn reset(&mut self) {
        self.rope = SegmentRope::new();
        self.highlights.clear();
        self.mem = MemoryRegistry::new();
        self.add_mem_id = None;
        self.bump_epoch();
    }

    // ---- leaf splitter (spec.md §4.3 "leaf splitter contract") --------

    /// Free function (not a `&self` method) deliberately: it borrows only
    /// `mem`, never `self` as a whole, so callers can build a splitter and
    /// still hold `&mut self.rope` at the same time.
    fn split_chunk(mem: &MemoryRegistry, config: EngineConfig, chunk: &TextChunk, local_col: u32) -> (TextChunk, TextChunk) {
        let Some(bytes) = mem.get(chunk.mem_id) else {
            return (*chunk, TextChunk { byte_start: chunk.byte_end, width_cols: 0, ..*chunk });
        };
        let slice = &bytes[chunk.byte_start as usize..chunk.byte_end as usize];
        let text = std::str::from_utf8(slice).unwrap_or("");

        if chunk.is_ascii_only() {
            let cut = chunk.byte_start + local_col;
            return (
                TextChunk { byte_end: cut, width_cols: local_col, ..*chunk },
                TextChunk { byte_start: cut, width_cols: chunk.width_cols - local_col, ..*chunk },
            );
        }

        let mut col = 0u32;
        let mut byte_off = 0usize;
        for cluster in unicode::graphemes(text) {
            if col >= local_col {
                break;
            }
            let w = width::grapheme_width(cluster, col as usize, config.tab_width, config.width_method);
            col += w.as_usize() as u32;
            byte_off += cluster.len();
        }
        let cut = chunk.byte_start + byte_off as u32;
        let (left, right) = text.split_at(byte_off);
        (
            TextChunk {
                byte_end: cut,
                width_cols: col,
                flags: if width::is_ascii_only(left) { ChunkFlags::ASCII_ONLY } else { ChunkFlags::NONE },
                ..*chunk
            },
            TextChunk {
                byte_start: cut,
                width_cols: chunk.width_cols - col,
                flags: if width::is_ascii_only(right) { ChunkFlags::ASCII_ONLY } else { ChunkFlags::NONE },
                ..*chunk
            },
        )
    }

    /// Build a splitter closure borrowing only `self.mem`, so the caller can
    /// still pass `&mut self.rope` to the rope method taking it — the two
    /// borrows are of disjoint fields.
    fn splitter(mem: &MemoryRegistry, config: EngineConfig) -> impl Fn(&TextChunk, u32) -> (TextChunk, TextChunk) + '_ {
        move |chunk, local| Self::split_chunk(mem, config, chunk, local)
    }

    // ---- highlights (spec.md §4.4 "highlight resolution") -------------

    pub fn add_highlight(&mut self, row: usize, highlight: Highlight) {
        self.highlights.entry(row).or_default().push(highlight);
        if self.batch_depth == 0 {
            self.bump_epoch();
        }
    }

    pub fn remove_highlights_by_ref(&mut self, row: usize, reference: u32) {
        if let Some(line) = self.highlights.get_mut(&row) {
            line.retain(|h| h.reference != Some(reference));
        }
        if self.batch_depth == 0 {
            self.bump_epoch();
        }
    }

    pub fn clear_line_highlights(&mut self, row: usize) {
        self.highlights.remove(&row);
        if self.batch_depth == 0 {
            self.bump_epoch();
        }
    }

    pub fn clear_all_highlights(&mut self) {
        self.highlights.clear();
        if self.batch_depth == 0 {
            self.bump_epoch();
        }
    }

    /// Begin a batch of highlight mutations; the content epoch is not
    /// bumped again until the matching [`HighlightBatch`] is dropped
    /// (spec.md §4.4 "batch highlight transaction"), so views that poll the
    /// epoch see one coherent jump rather than a flicker per call.
    pub fn begin_highlight_batch(&mut self) -> HighlightBatch<'_> {
        self.batch_depth += 1;
        HighlightBatch { buffer: self }
    }

    #[must_use]
    pub fn style_spans_for_line(&self, row: usize) -> Vec<StyleSpan> {
        let Some(width) = self.rope.line_width(row) else { return Vec::new() };
        let empty = Vec::new();
        let highlights = self.highlights.get(&row).unwrap_or(&empty);
        highlight::resolve_line_spans(highlights, width)
    }

    #[must_use]
    pub fn style_at(&self, row: usize, col: ColIndex) -> Style {
        let style_id = self
            .style_spans_for_line(row)
            .into_iter()
            .find(|span| ColRange::new(span.col, span.next_col).contains(col))
            .map_or(0, |span| span.style_id);
        self.resolve_style(style_id)
    }

    // ---- coordinate queries (spec.md §4.4) -----------------------------

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.line_count()
    }

    #[must_use]
    pub fn line_width_at(&self, row: usize) -> Option<u32> {
        self.rope.line_width(row)
    }

    #[must_use]
    pub fn max_line_width(&self) -> u32 {
        self.rope.metrics().max_line_width_whole_rope()
    }

    #[must_use]
    pub fn get_length(&self) -> usize {
        coords::buffer_length(&self.rope)
    }

    #[must_use]
    pub fn get_byte_size(&self) -> u32 {
        self.rope.metrics().total_bytes
    }

    /// Extract the text of row `row`, snapping the end of the range to the
    /// trailing grapheme boundary (spec.md §4.4 `get_text_range` "snap to
    /// grapheme start" edge case never splits a cluster).
    #[must_use]
    pub fn get_text_range(&self, row: usize, cols: ColRange) -> String {
        let Some(leaves) = self.rope.line_leaves(row) else { return String::new() };
        let mut col = 0u32;
        let mut out = String::new();
        for leaf in leaves {
            let Leaf::Text(chunk) = leaf else { continue };
            let chunk_start = col;
            let chunk_end = col + chunk.width_cols;
            col = chunk_end;
            if chunk_end <= cols.start.as_usize() as u32 || chunk_start >= cols.end.as_usize() as u32 {
                continue;
            }
            let Some(bytes) = self.mem.get(chunk.mem_id) else { continue };
            let text = std::str::from_utf8(&bytes[chunk.byte_start as usize..chunk.byte_end as usize]).unwrap_or("");
            if chunk.is_ascii_only() {
                let local_start = cols.start.as_usize().saturating_sub(chunk_start as usize).min(text.len());
                let local_end = (cols.end.as_usize().saturating_sub(chunk_start as usize)).min(text.len());
                out.push_str(&text[local_start..local_end]);
                continue;
            }
            let mut c = chunk_start;
            for cluster in unicode::graphemes(text) {
                let w = width::grapheme_width(cluster, c as usize, self.config.tab_width, self.config.width_method).as_usize() as u32;
                if c >= cols.start.as_usize() as u32 && c < cols.end.as_usize() as u32 {
                    out.push_str(cluster);
                }
                c += w;
            }
        }
        out
    }

    #[must_use]
    pub fn get_text_range_by_coords(&self, from: (RowIndex, ColIndex), to: (RowIndex, ColIndex)) -> String {
        if from.0 == to.0 {
            return self.get_text_range(from.0.as_usize(), ColRange::new(from.1, to.1));
        }
        let mut out = self.get_text_range(from.0.as_usize(), ColRange::new(from.1, ColIndex::new(u32::MAX as usize)));
        for row in (from.0.as_usize() + 1)..to.0.as_usize() {
            out.push('\n');
            out.push_str(&self.get_text_range(row, ColRange::new(ColIndex::new(0), ColIndex::new(u32::MAX as usize))));
        }
        if to.0.as_usize() > from.0.as_usize() {
            out.push('\n');
            out.push_str(&self.get_text_range(to.0.as_usize(), ColRange::new(ColIndex::new(0), to.1)));
        }
        out
    }

    // ---- row/col editing, used by the edit buffer ----------------------

    pub fn insert_at(&mut self, row: usize, col: u32, text: &str) -> Result<()> {
        let (mem_id, base_offset) = self.add_buffer_chunk(text)?;
        let leaves = self.build_leaves(text, mem_id, base_offset);
        // `build_leaves` wraps a freestanding string in its own LineStart,
        // which this insertion point already has; drop it so we splice in
        // only the content leaves (plus any internal line breaks).
        let leaves: Vec<Leaf> = leaves.into_iter().skip(1).collect();
        let splitter = Self::splitter(&self.mem, self.config);
        self.rope
            .insert_at_row_col(row, col, leaves, &splitter)
            .ok_or(TextEngineError::InvalidCursor { row, col: col as usize })?;
        drop(splitter);
        self.bump_epoch();
        Ok(())
    }

    pub fn delete_at(&mut self, row: usize, col_start: u32, col_end: u32) -> Result<()> {
        let splitter = Self::splitter(&self.mem, self.config);
        self.rope
            .delete_range_at_row_col(row, col_start, col_end, &splitter)
            .ok_or(TextEngineError::InvalidCursor { row, col: col_start as usize })?;
        drop(splitter);
        self.bump_epoch();
        Ok(())
    }

    /// Merge logical line `row` with `row + 1` (spec.md §4.6 backspace at
    /// column 0). `None` error path: `row` is already the last line.
    pub fn join_with_next_line(&mut self, row: usize) -> Result<()> {
        self.rope
            .join_with_next_line(row)
            .ok_or(TextEngineError::InvalidCursor { row, col: 0 })?;
        self.bump_epoch();
        Ok(())
    }

    pub fn store_undo(&mut self, label: &'static str) {
        self.rope.store_undo(label);
    }

    pub fn undo(&mut self) -> bool {
        let did = self.rope.undo();
        if did {
            self.bump_epoch();
        }
        did
    }

    pub fn redo(&mut self) -> bool {
        let did = self.rope.redo();
        if did {
            self.bump_epoch();
        }
        did
    }
}

/// RAII guard returned by [`TextBuffer::begin_highlight_batch`]; dropping it
/// commits the batch and bumps the epoch once.
pub struct HighlightBatch<'a> {
    buffer: &'a mut TextBuffer,
}

impl HighlightBatch<'_> {
    pub fn add_highlight(&mut self, row: usize, highlight: Highlight) {
        self.buffer.highlights.entry(row).or_default().push(highlight);
    }
}

impl Drop for HighlightBatch<'_> {
    fn drop(&mut self) {
        self.buffer.batch_depth -= 1;
        if self.buffer.batch_depth == 0 {
            self.buffer.bump_epoch();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_text_builds_lines_and_bumps_epoch() {
        let mut buf = TextBuffer::new();
        let before = buf.epoch();
        buf.set_text("hello\nworld").unwrap();
        assert!(buf.epoch() > before);
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_width_at(0), Some(5));
        assert_eq!(buf.line_width_at(1), Some(5));
    }

    #[test]
    fn get_length_counts_separators() {
        let mut buf = TextBuffer::new();
        buf.set_text("ab\ncde").unwrap();
        assert_eq!(buf.get_length(), 2 + 1 + 3);
    }

    #[test]
    fn get_text_range_extracts_substring() {
        let mut buf = TextBuffer::new();
        buf.set_text("hello world").unwrap();
        let text = buf.get_text_range(0, ColRange::new(ColIndex::new(6), ColIndex::new(11)));
        assert_eq!(text, "world");
    }

    #[test]
    fn highlight_resolves_to_registered_style() {
        let mut buf = TextBuffer::new();
        buf.set_text("hello").unwrap();
        let registry = SyntaxStyleRegistry::new();
        let style_id = registry.register(Style::bold());
        buf.set_syntax_style(&registry);
        buf.add_highlight(0, Highlight { col_start: ColIndex::new(0), col_end: ColIndex::new(5), style_id, priority: 0, reference: None });
        let resolved = buf.style_at(0, ColIndex::new(2));
        assert!(resolved.attrs.contains(TextAttributes::BOLD));
    }

    #[test]
    fn style_survives_registry_drop_as_default() {
        let mut buf = TextBuffer::new();
        buf.set_text("hi").unwrap();
        {
            let registry = SyntaxStyleRegistry::new();
            let id = registry.register(Style::bold());
            buf.set_syntax_style(&registry);
            buf.add_highlight(0, Highlight { col_start: ColIndex::new(0), col_end: ColIndex::new(2), style_id: id, priority: 0, reference: None });
        }
        // `registry` is gone; the weak back-reference must not panic.
        assert_eq!(buf.style_at(0, ColIndex::new(0)), Style::NONE);
    }

    #[test]
    fn append_extends_last_line_without_touching_earlier_highlights() {
        let mut buf = TextBuffer::new();
        buf.set_text("ab").unwrap();
        buf.add_highlight(0, Highlight { col_start: ColIndex::new(0), col_end: ColIndex::new(1), style_id: 1, priority: 0, reference: None });
        buf.append("cd").unwrap();
        assert_eq!(buf.line_width_at(0), Some(4));
        assert_eq!(buf.highlights.get(&0).map(Vec::len), Some(1));
    }

    #[test]
    fn insert_then_delete_round_trips_content() {
        let mut buf = TextBuffer::new();
        buf.set_text("ac").unwrap();
        buf.insert_at(0, 1, "b").unwrap();
        assert_eq!(buf.get_text_range(0, ColRange::new(ColIndex::new(0), ColIndex::new(3))), "abc");
        buf.delete_at(0, 1, 2).unwrap();
        assert_eq!(buf.get_text_range(0, ColRange::new(ColIndex::new(0), ColIndex::new(2))), "ac");
    }

    #[test]
    fn typing_one_char_at_a_time_keeps_leaf_count_small() {
        let mut buf = TextBuffer::new();
        buf.set_text("").unwrap();
        for (i, ch) in "hello".chars().enumerate() {
            buf.insert_at(0, i as u32, &ch.to_string()).unwrap();
        }
        assert_eq!(buf.get_text_range(0, ColRange::new(ColIndex::new(0), ColIndex::new(5))), "hello");
        // LineStart + at most one merged Text leaf.
        assert!(buf.rope().leaves().len() <= 4, "leaves: {:?}", buf.rope().leaves());
    }

    #[test]
    fn highlight_batch_defers_epoch_bump_to_drop() {
        let mut buf = TextBuffer::new();
        buf.set_text("abcdef").unwrap();
        let before = buf.epoch();
        {
            let mut batch = buf.begin_highlight_batch();
            batch.add_highlight(0, Highlight { col_start: ColIndex::new(0), col_end: ColIndex::new(2), style_id: 1, priority: 0, reference: None });
            batch.add_highlight(0, Highlight { col_start: ColIndex::new(2), col_end: ColIndex::new(4), style_id: 2, priority: 0, reference: None });
            assert_eq!(batch.buffer.epoch(), before);
        }
        assert_eq!(buf.epoch(), before + 1);
    }

    #[test]
    fn cjk_line_width_round_trips_through_get_text_range() {
        let mut buf = TextBuffer::new();
        buf.set_text("a世界b").unwrap();
        assert_eq!(buf.line_width_at(0), Some(6));
        assert_eq!(buf.get_text_range(0, ColRange::new(ColIndex::new(1), ColIndex::new(5))), "世界");
    }

    #[test]
    fn clear_empties_content_but_undo_restores_it() {
        let mut buf = TextBuffer::new();
        buf.set_text("hello").unwrap();
        buf.clear();
        assert_eq!(buf.get_length(), 0);
        assert!(buf.undo());
        assert_eq!(buf.get_text_range(0, ColRange::new(ColIndex::new(0), ColIndex::new(5))), "hello");
    }

    #[test]
    fn reset_empties_content_and_discards_undo_history() {
        let mut buf = TextBuffer::new();
        buf.set_text("hello").unwrap();
        buf.reset();
        assert_eq!(buf.get_length(), 0);
        assert!(!buf.undo());
    }
}
