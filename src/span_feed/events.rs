//! Stream configuration and the event enum delivered to attached consumers
//! (spec.md §4.7 "Events", §6 "Span Feed wire").

use strum_macros::{Display, EnumString};

/// What a `Stream` does when its active chunk fills and no existing chunk
/// is free.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
pub enum GrowthPolicy {
    /// Allocate a new chunk (subject to `max_bytes`).
    #[default]
    Grow,
    /// Fail the write with `NoSpace` instead of growing.
    Block,
}

/// Construction-time knobs for a [`super::Stream`] (spec.md §6 wire
/// defaults: `64 KiB / 2 / 0 / grow / true / 4096`).
#[derive(Clone, Copy, Debug)]
pub struct StreamOptions {
    pub chunk_size: usize,
    pub initial_chunks: usize,
    /// Total byte budget across all chunks; `0` means unbounded.
    pub max_bytes: usize,
    pub growth_policy: GrowthPolicy,
    pub auto_commit_on_full: bool,
    pub span_queue_capacity: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            initial_chunks: 2,
            max_bytes: 0,
            growth_policy: GrowthPolicy::Grow,
            auto_commit_on_full: true,
            span_queue_capacity: 4096,
        }
    }
}

/// Events delivered to an attached consumer (spec.md §4.7, §6 numeric
/// codes `ChunkAdded=2, Closed=5, Error=6, DataAvailable=7, StateBuffer=8`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    ChunkAdded { chunk_index: usize },
    Closed,
    Error { message: String },
    DataAvailable { count: usize },
    /// A snapshot of the per-chunk refcount table, replayed to a consumer
    /// on attach. `ptr`/`len` in spec.md's wire framing describe a raw
    /// buffer view; in-process consumers get an owned copy instead.
    StateBuffer { counts: Vec<u8> },
}
