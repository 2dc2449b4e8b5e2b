//! A column-accurate, wrap-aware, incrementally editable text engine for
//! terminal UIs.
//!
//! Layered bottom-up (see each module's docs for its piece of the design):
//! grapheme interning -> memory registry -> segment rope -> text buffer ->
//! text buffer view -> edit buffer -> span feed.

pub mod config;
pub mod edit_buffer;
pub mod error;
pub mod grapheme_pool;
pub mod mem_registry;
pub mod rope;
pub mod span_feed;
pub mod text_buffer;
pub mod unicode;
pub mod units;
pub mod view;

pub use config::{EngineConfig, WidthMethod, WrapMode};
pub use edit_buffer::EditBuffer;
pub use error::{Result, TextEngineError};
pub use grapheme_pool::GraphemePool;
pub use mem_registry::MemoryRegistry;
pub use rope::SegmentRope;
pub use span_feed::Stream;
pub use text_buffer::TextBuffer;
pub use view::TextBufferView;
