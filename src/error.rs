//! Error taxonomy for the text engine. Every fallible public operation returns
//! [`Result`], never a bare `String` or a panic — panics are reserved for the
//! documented preconditions noted on the variants below (slot index beyond
//! capacity, splitting a leaf beyond its weight).

use miette::Diagnostic;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TextEngineError>;

/// All recoverable failure modes across the grapheme pool, memory registry,
/// rope, text buffer, view, edit buffer, and span feed.
#[derive(Debug, Error, Diagnostic)]
pub enum TextEngineError {
    /// An allocator (grapheme pool slab, memory registry, span-feed chunk
    /// pool) refused to grow further.
    #[error("out of memory: {context}")]
    #[diagnostic(code(textgrid_engine::out_of_memory))]
    OutOfMemory {
        /// Which subsystem ran out of room.
        context: &'static str,
    },

    /// A row or column index fell outside the buffer's current bounds.
    #[error("index out of range: {what} = {value} (bound = {bound})")]
    #[diagnostic(code(textgrid_engine::invalid_index))]
    InvalidIndex {
        what: &'static str,
        value: usize,
        bound: usize,
    },

    /// A cursor position could not be resolved against the buffer it refers
    /// to.
    #[error("invalid cursor at row {row}, col {col}")]
    #[diagnostic(code(textgrid_engine::invalid_cursor))]
    InvalidCursor { row: usize, col: usize },

    /// A `mem_id` did not resolve to a registered buffer.
    #[error("unknown mem_id {mem_id}")]
    #[diagnostic(
        code(textgrid_engine::invalid_mem_id),
        help("this is a programmer error: chunks must only reference mem_ids obtained from the registry they were created against")
    )]
    InvalidMemId { mem_id: u8 },

    /// A grapheme id did not resolve to a live slab slot.
    #[error("invalid grapheme id {id:#x}")]
    #[diagnostic(code(textgrid_engine::invalid_id))]
    InvalidId { id: u32 },

    /// A grapheme id resolved to a slot whose generation no longer matches.
    /// Non-fatal: callers may recover by re-interning the bytes.
    #[error("stale grapheme id {id:#x} (generation mismatch)")]
    #[diagnostic(
        code(textgrid_engine::wrong_generation),
        help("the slot has been recycled; re-intern the original bytes to obtain a fresh id")
    )]
    WrongGeneration { id: u32 },

    /// A span-feed ring, chunk, or reservation had no room for the request.
    #[error("no space available for {requested} bytes")]
    #[diagnostic(code(textgrid_engine::no_space))]
    NoSpace { requested: usize },

    /// The span feed's `max_bytes` growth cap was reached.
    #[error("max_bytes cap reached ({max_bytes} bytes)")]
    #[diagnostic(code(textgrid_engine::max_bytes))]
    MaxBytes { max_bytes: usize },

    /// A producer/consumer operation conflicted with an in-flight
    /// reservation or callback on the same stream.
    #[error("stream busy: {context}")]
    #[diagnostic(code(textgrid_engine::busy))]
    Busy { context: &'static str },

    /// The span feed has been closed and no longer accepts writes.
    #[error("operation on a closed stream")]
    #[diagnostic(code(textgrid_engine::invalid_stream))]
    StreamClosed,

    /// Loading buffer contents from a file failed.
    #[error("failed to load file {path}")]
    #[diagnostic(code(textgrid_engine::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TextEngineError {
    /// `true` for errors spec.md classifies as non-fatal / locally
    /// recoverable (stale generation, not-present lookups).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::WrongGeneration { .. })
    }
}
