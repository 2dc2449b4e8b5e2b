//! Span Feed: a producer/consumer byte pipeline carrying committed spans
//! from a native producer to one or more consumers over a ring of
//! refcounted chunks (spec.md §4.7). This is the one part of the text
//! engine that is a genuine concurrency boundary (spec.md §5); events are
//! delivered over a `tokio` unbounded channel so an attached consumer can
//! be driven from either sync code (`try_recv`) or an async task
//! (`event_stream`).

pub mod chunk;
pub mod events;
pub mod ring;

pub use chunk::SpanInfo;
pub use events::{GrowthPolicy, StreamEvent, StreamOptions};

use chunk::Chunk;
use ring::SpanRing;
use tokio::sync::mpsc;

use crate::error::{Result, TextEngineError};

struct Reservation {
    chunk_index: usize,
    offset: usize,
    len: usize,
}

/// Aggregate counters (spec.md §4.7 "stats").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamStats {
    pub bytes_written: u64,
    pub spans_committed: u64,
    pub chunks: usize,
    pub pending_spans: usize,
}

/// A producer-owned byte stream: fixed-size chunks, a saturating per-chunk
/// refcount, and a bounded ring of committed span metadata.
pub struct Stream {
    options: StreamOptions,
    chunks: Vec<Chunk>,
    state_buffer: Vec<u8>,
    free_chunks: Vec<usize>,
    active: usize,
    pending_start: usize,
    ring: SpanRing,
    reserved: Option<Reservation>,
    closed: bool,
    bytes_written: u64,
    spans_committed: u64,
    event_tx: Option<mpsc::UnboundedSender<StreamEvent>>,
}

impl Stream {
    #[must_use]
    pub fn new(options: StreamOptions) -> Self {
        let initial = options.initial_chunks.max(1);
        let chunks = (0..initial).map(|_| Chunk::new(options.chunk_size)).collect();
        Self {
            chunks,
            state_buffer: vec![0u8; initial],
            free_chunks: Vec::new(),
            active: 0,
            pending_start: 0,
            ring: SpanRing::new(options.span_queue_capacity),
            reserved: None,
            closed: false,
            bytes_written: 0,
            spans_committed: 0,
            event_tx: None,
            options,
        }
    }

    #[must_use]
    pub fn stats(&self) -> StreamStats {
        StreamStats {
            bytes_written: self.bytes_written,
            spans_committed: self.spans_committed,
            chunks: self.chunks.len(),
            pending_spans: self.ring.len(),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Attach a consumer, replaying the current chunk list and state buffer
    /// and then `DataAvailable` if spans are already queued (spec.md §4.7
    /// "On attach, the producer replays...").
    pub fn attach(&mut self) -> mpsc::UnboundedReceiver<StreamEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        for i in 0..self.chunks.len() {
            let _ = tx.send(StreamEvent::ChunkAdded { chunk_index: i });
        }
        let _ = tx.send(StreamEvent::StateBuffer { counts: self.state_buffer.clone() });
        if !self.ring.is_empty() {
            let _ = tx.send(StreamEvent::DataAvailable { count: self.ring.len() });
        }
        self.event_tx = Some(tx);
        rx
    }

    /// An async-stream view of the same events delivered to [`Self::attach`]
    /// (spec.md §5 "consumers may be asynchronous").
    pub fn event_stream(&mut self) -> impl futures_core::Stream<Item = StreamEvent> {
        let mut rx = self.attach();
        async_stream::stream! {
            while let Some(ev) = rx.recv().await {
                yield ev;
            }
        }
    }

    fn emit(&self, event: StreamEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }

    /// A chunk pinned at the saturating refcount ceiling is treated as full
    /// regardless of remaining physical capacity (spec.md §4.7 "State-buffer
    /// overflow defense").
    fn force_full_if_saturated(&mut self) {
        if self.state_buffer[self.active] == u8::MAX {
            let cap = self.chunks[self.active].capacity();
            self.chunks[self.active].write_offset = cap;
        }
    }

    fn rollover_chunk(&mut self) -> Result<()> {
        // The active chunk itself may already be fully consumed (its last
        // span's refcount dropped to zero) by the time it fills up — reuse
        // it in place rather than demanding a second chunk that a `Block`
        // policy with a one-chunk budget could never grant (spec.md §8
        // scenario 7 back-pressure).
        if self.state_buffer[self.active] == 0 {
            self.chunks[self.active].reset();
            self.pending_start = 0;
            return Ok(());
        }
        if let Some(idx) = self.free_chunks.pop() {
            self.chunks[idx].reset();
            self.active = idx;
            self.pending_start = 0;
            return Ok(());
        }
        if matches!(self.options.growth_policy, GrowthPolicy::Block) {
            return Err(TextEngineError::NoSpace { requested: self.options.chunk_size });
        }
        let total_capacity = self.chunks.len() * self.options.chunk_size;
        if self.options.max_bytes != 0 && total_capacity + self.options.chunk_size > self.options.max_bytes {
            return Err(TextEngineError::MaxBytes { max_bytes: self.options.max_bytes });
        }
        self.chunks.push(Chunk::new(self.options.chunk_size));
        self.state_buffer.push(0);
        self.active = self.chunks.len() - 1;
        self.pending_start = 0;
        self.emit(StreamEvent::ChunkAdded { chunk_index: self.active });
        Ok(())
    }

    /// Ensure the active chunk has room for `need` more bytes, committing
    /// the open span and rolling to a fresh chunk if it doesn't.
    fn ensure_capacity(&mut self, need: usize) -> Result<()> {
        self.force_full_if_saturated();
        if self.chunks[self.active].remaining() >= need {
            return Ok(());
        }
        if !self.options.auto_commit_on_full {
            return Err(TextEngineError::NoSpace { requested: need });
        }
        self.commit()?;
        self.rollover_chunk()?;
        if self.chunks[self.active].remaining() < need {
            return Err(TextEngineError::NoSpace { requested: need });
        }
        Ok(())
    }

    /// Copy `bytes` into the current chunk (spec.md §4.7 `write`).
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(TextEngineError::StreamClosed);
        }
        if self.reserved.is_some() {
            return Err(TextEngineError::Busy { context: "a reservation is active" });
        }
        if bytes.len() > self.options.chunk_size {
            return Err(TextEngineError::NoSpace { requested: bytes.len() });
        }
        self.ensure_capacity(bytes.len())?;
        self.chunks[self.active].copy_in(bytes);
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Flush the pending (not yet committed) span into the ring (spec.md
    /// §4.7 `commit`). A no-op if nothing is pending.
    pub fn commit(&mut self) -> Result<()> {
        if self.closed {
            return Err(TextEngineError::StreamClosed);
        }
        if self.reserved.is_some() {
            return Err(TextEngineError::Busy { context: "a reservation is active" });
        }
        let chunk = &self.chunks[self.active];
        let len = chunk.write_offset - self.pending_start;
        if len == 0 {
            return Ok(());
        }
        let span = SpanInfo { chunk_index: self.active, offset: self.pending_start, len };
        if !self.ring.push_back(span) {
            return Err(TextEngineError::NoSpace { requested: len });
        }
        self.chunks[self.active].commit_offset = self.chunks[self.active].write_offset;
        self.pending_start = self.chunks[self.active].write_offset;
        self.state_buffer[self.active] = self.state_buffer[self.active].saturating_add(1);
        self.spans_committed += 1;
        self.emit(StreamEvent::DataAvailable { count: self.ring.len() });
        Ok(())
    }

    /// Acquire the remainder of the current chunk for a zero-copy fill,
    /// locking the stream against other writes until `commit_reserved`
    /// (spec.md §4.7 `reserve`).
    ///
    /// # Safety
    /// The returned pointer is valid for `len` bytes until the next call to
    /// any `&mut self` method on this stream.
    pub fn reserve(&mut self, min_len: usize) -> Result<(*mut u8, usize)> {
        if self.closed {
            return Err(TextEngineError::StreamClosed);
        }
        if self.reserved.is_some() {
            return Err(TextEngineError::Busy { context: "a reservation is already active" });
        }
        self.ensure_capacity(min_len)?;
        let offset = self.chunks[self.active].write_offset;
        let len = self.chunks[self.active].remaining();
        let ptr = self.chunks[self.active].ptr_at(offset);
        self.reserved = Some(Reservation { chunk_index: self.active, offset, len });
        Ok((ptr, len))
    }

    /// Materialize a span of exactly `len` bytes starting at the active
    /// reservation (spec.md §4.7 `commit_reserved`; `len <= reserved_len`).
    pub fn commit_reserved(&mut self, len: usize) -> Result<()> {
        let Some(reservation) = self.reserved.take() else {
            return Err(TextEngineError::StreamClosed);
        };
        if len > reservation.len {
            self.reserved = Some(reservation);
            return Err(TextEngineError::NoSpace { requested: len });
        }
        let chunk = &mut self.chunks[reservation.chunk_index];
        chunk.write_offset = reservation.offset + len;
        self.bytes_written += len as u64;
        if len == 0 {
            return Ok(());
        }
        let span = SpanInfo { chunk_index: reservation.chunk_index, offset: reservation.offset, len };
        if !self.ring.push_back(span) {
            return Err(TextEngineError::NoSpace { requested: len });
        }
        chunk.commit_offset = chunk.write_offset;
        if reservation.chunk_index == self.active {
            self.pending_start = chunk.write_offset;
        }
        self.state_buffer[reservation.chunk_index] = self.state_buffer[reservation.chunk_index].saturating_add(1);
        self.spans_committed += 1;
        self.emit(StreamEvent::DataAvailable { count: self.ring.len() });
        Ok(())
    }

    /// Copy up to `out.len()` queued spans into `out`, in commit order
    /// (spec.md §4.7 `drain`).
    pub fn drain(&mut self, out: &mut [SpanInfo]) -> usize {
        self.ring.drain_into(out)
    }

    /// Read the bytes a drained `span` addresses.
    #[must_use]
    pub fn span_bytes(&self, span: SpanInfo) -> &[u8] {
        self.chunks[span.chunk_index].slice(span.offset, span.len)
    }

    /// Release `span`'s chunk reference (spec.md §4.7 `mark_consumed`). Once
    /// a chunk's refcount returns to zero it becomes eligible for reuse by a
    /// future rollover.
    pub fn mark_consumed(&mut self, span: SpanInfo) {
        let Some(count) = self.state_buffer.get_mut(span.chunk_index) else { return };
        *count = count.saturating_sub(1);
        if *count == 0 && span.chunk_index != self.active && !self.free_chunks.contains(&span.chunk_index) {
            self.free_chunks.push(span.chunk_index);
        }
    }

    /// Drain every currently-queued span and run `handler` on each,
    /// decrementing its chunk's refcount only after the handler's future
    /// settles (spec.md §4.7 "decrement only after the future settles").
    /// Every drained span is marked consumed even if its handler errors
    /// (all-settled semantics); the first error encountered is returned
    /// after the pass (spec.md §5 "Ordering").
    pub async fn consume_all<F, Fut>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(SpanInfo, &[u8]) -> Fut,
        Fut: std::future::Future<Output = Result<()>>,
    {
        let mut spans = vec![SpanInfo { chunk_index: 0, offset: 0, len: 0 }; self.ring.len()];
        let n = self.drain(&mut spans);
        spans.truncate(n);

        let mut first_err = None;
        for span in spans {
            let bytes = self.span_bytes(span).to_vec();
            let outcome = handler(span, &bytes).await;
            self.mark_consumed(span);
            if outcome.is_err() && first_err.is_none() {
                first_err = outcome.err();
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Flush any pending span, mark closed, and emit `Closed` (spec.md
    /// §4.7 "Close protocol"). Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.commit()?;
        self.closed = true;
        self.emit(StreamEvent::Closed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(chunk_size: usize, auto_commit_on_full: bool) -> StreamOptions {
        StreamOptions { chunk_size, initial_chunks: 1, max_bytes: 0, growth_policy: GrowthPolicy::Grow, auto_commit_on_full, span_queue_capacity: 16 }
    }

    fn blocked_opts(chunk_size: usize, max_bytes: usize) -> StreamOptions {
        StreamOptions { chunk_size, initial_chunks: 1, max_bytes, growth_policy: GrowthPolicy::Block, auto_commit_on_full: true, span_queue_capacity: 16 }
    }

    #[test]
    fn new_allocates_initial_chunks() {
        let stream = Stream::new(StreamOptions { initial_chunks: 3, ..StreamOptions::default() });
        assert_eq!(stream.stats().chunks, 3);
    }

    #[test]
    fn write_then_commit_then_drain_round_trips_bytes() {
        let mut stream = Stream::new(opts(64, true));
        stream.write(b"hello").unwrap();
        stream.commit().unwrap();
        let mut out = [SpanInfo { chunk_index: 0, offset: 0, len: 0 }; 1];
        assert_eq!(stream.drain(&mut out), 1);
        assert_eq!(stream.span_bytes(out[0]), b"hello");
    }

    #[test]
    fn write_past_chunk_boundary_auto_commits_and_rolls_over() {
        let mut stream = Stream::new(opts(4, true));
        stream.write(b"ab").unwrap();
        stream.write(b"cd").unwrap(); // fills the 4-byte chunk exactly
        stream.write(b"ef").unwrap(); // doesn't fit; auto-commits "abcd" and rolls over
        assert_eq!(stream.stats().chunks, 2);
        let mut out = [SpanInfo { chunk_index: 0, offset: 0, len: 0 }; 2];
        assert_eq!(stream.drain(&mut out), 1); // only "abcd" committed so far
        assert_eq!(stream.span_bytes(out[0]), b"abcd");
    }

    #[test]
    fn write_without_auto_commit_fails_without_partial_write() {
        let mut stream = Stream::new(opts(4, false));
        stream.write(b"abc").unwrap();
        let err = stream.write(b"de").unwrap_err(); // 3 + 2 > 4
        assert!(matches!(err, TextEngineError::NoSpace { .. }));
        // the failed write left the chunk untouched.
        stream.commit().unwrap();
        let mut out = [SpanInfo { chunk_index: 0, offset: 0, len: 0 }; 1];
        stream.drain(&mut out);
        assert_eq!(stream.span_bytes(out[0]), b"abc");
    }

    #[test]
    fn reserve_then_commit_reserved_round_trips() {
        let mut stream = Stream::new(opts(8, true));
        let (ptr, len) = stream.reserve(4).unwrap();
        assert!(len >= 4);
        unsafe { std::ptr::copy_nonoverlapping(b"data".as_ptr(), ptr, 4) };
        stream.commit_reserved(4).unwrap();
        let mut out = [SpanInfo { chunk_index: 0, offset: 0, len: 0 }; 1];
        stream.drain(&mut out);
        assert_eq!(stream.span_bytes(out[0]), b"data");
    }

    #[test]
    fn write_while_reserved_is_busy() {
        let mut stream = Stream::new(opts(8, true));
        stream.reserve(4).unwrap();
        assert!(matches!(stream.write(b"x"), Err(TextEngineError::Busy { .. })));
    }

    #[test]
    fn mark_consumed_frees_chunk_for_reuse() {
        let mut stream = Stream::new(opts(4, true));
        stream.write(b"abcd").unwrap();
        stream.commit().unwrap();
        stream.write(b"ef").unwrap(); // rolls over to chunk 1
        assert_eq!(stream.stats().chunks, 2);

        let mut out = [SpanInfo { chunk_index: 0, offset: 0, len: 0 }; 1];
        stream.drain(&mut out);
        stream.mark_consumed(out[0]);

        // chunk 0 is free now; a third chunk's worth of writes should reuse
        // it rather than allocating a new one.
        stream.commit().unwrap();
        stream.write(b"gh").unwrap();
        stream.write(b"ij").unwrap(); // fills chunk 1, rolls over
        assert_eq!(stream.stats().chunks, 2, "freed chunk 0 should be reused, not grown past 2");
    }

    #[test]
    fn saturated_refcount_forces_rollover_despite_free_capacity() {
        let mut stream = Stream::new(opts(10_000, true));
        for _ in 0..255 {
            stream.write(b"a").unwrap();
            stream.commit().unwrap();
        }
        assert_eq!(stream.stats().chunks, 1);
        // chunk 0's refcount is pinned at 255; the next write must roll
        // over to a fresh chunk even though chunk 0 has ample physical room.
        stream.write(b"b").unwrap();
        assert_eq!(stream.stats().chunks, 2);
    }

    #[test]
    fn close_flushes_pending_and_emits_closed() {
        let mut stream = Stream::new(opts(64, true));
        let mut rx = stream.attach();
        stream.write(b"tail").unwrap();
        stream.close().unwrap();
        assert!(stream.is_closed());

        let mut saw_closed = false;
        while let Ok(ev) = rx.try_recv() {
            if ev == StreamEvent::Closed {
                saw_closed = true;
            }
        }
        assert!(saw_closed);
        assert!(matches!(stream.write(b"x"), Err(TextEngineError::StreamClosed)));
    }

    #[test]
    fn block_policy_refuses_growth_then_recovers_after_mark_consumed() {
        let mut stream = Stream::new(blocked_opts(8, 8));
        for _ in 0..8 {
            stream.write(b"a").unwrap();
        }
        // chunk is full and there is no room to grow past max_bytes: the
        // auto-commit inside ensure_capacity flushes the 8-byte span, but
        // rollover_chunk has nowhere to put the 9th byte.
        let err = stream.write(b"a").unwrap_err();
        assert!(matches!(err, TextEngineError::NoSpace { .. }));
        assert_eq!(stream.stats().chunks, 1, "Block policy must not grow past max_bytes");

        let mut out = [SpanInfo { chunk_index: 0, offset: 0, len: 0 }; 1];
        assert_eq!(stream.drain(&mut out), 1);
        assert_eq!(stream.span_bytes(out[0]), b"aaaaaaaa");
        stream.mark_consumed(out[0]);

        // the only chunk is now unreferenced; rollover reuses it in place
        // rather than asking for a second chunk Block would refuse.
        stream.write(b"b").unwrap();
    }

    #[tokio::test]
    async fn consume_all_marks_every_span_consumed_even_on_error() {
        let mut stream = Stream::new(opts(64, true));
        stream.write(b"a").unwrap();
        stream.commit().unwrap();
        stream.write(b"b").unwrap();
        stream.commit().unwrap();

        let mut seen = Vec::new();
        let result = stream
            .consume_all(|_span, bytes| {
                seen.push(bytes.to_vec());
                async { Err(TextEngineError::Busy { context: "simulated handler failure" }) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec()], "every span must still run its handler");
        assert_eq!(stream.stats().pending_spans, 0);
    }
}
