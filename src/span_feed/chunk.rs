//! Fixed-size byte chunks and the span metadata that addresses into them
//! (spec.md §4.7 "Data model").

/// One fixed-capacity byte block. `write_offset` marks the end of bytes
/// written so far (committed or still pending); `commit_offset` marks the
/// end of the last *committed* span, so `[commit_offset, write_offset)` is
/// the open, not-yet-committed region.
pub struct Chunk {
    data: Box<[u8]>,
    pub write_offset: usize,
    pub commit_offset: usize,
}

impl Chunk {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { data: vec![0u8; capacity].into_boxed_slice(), write_offset: 0, commit_offset: 0 }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.write_offset
    }

    pub fn copy_in(&mut self, bytes: &[u8]) {
        let end = self.write_offset + bytes.len();
        self.data[self.write_offset..end].copy_from_slice(bytes);
        self.write_offset = end;
    }

    #[must_use]
    pub fn slice(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Raw pointer to `offset` within this chunk, for the zero-copy
    /// `reserve`/`commit_reserved` producer path (spec.md §4.7).
    ///
    /// # Safety
    /// The returned pointer is valid only until the next operation that
    /// reallocates or drops this chunk (it never does on its own — chunks
    /// are never resized after creation — but the owning `Stream` must
    /// outlive any use of the pointer).
    #[must_use]
    pub fn ptr_at(&mut self, offset: usize) -> *mut u8 {
        unsafe { self.data.as_mut_ptr().add(offset) }
    }

    /// Reset to an empty, reusable state (spec.md §4.7 chunk reuse once its
    /// refcount returns to zero).
    pub fn reset(&mut self) {
        self.write_offset = 0;
        self.commit_offset = 0;
    }
}

/// A committed span's address: which chunk, at what offset, how long.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpanInfo {
    pub chunk_index: usize,
    pub offset: usize,
    pub len: usize,
}
