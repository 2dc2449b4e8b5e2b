//! Grapheme pool: an interning slab allocator mapping grapheme-cluster byte
//! sequences to compact 26-bit ids, with generation-based staleness
//! detection and reference counting (spec.md §3, §4.1).
//!
//! The pool may be process-wide or buffer-scoped (spec.md §9 design note);
//! it carries no internal locking, matching spec.md §5 ("shared across text
//! buffers but must be accessed from the same context").

pub mod cell;
pub mod id;

pub use cell::{encoded_char_width, CellChar};
pub use id::{class_for_size, GraphemeId, SizeClass, SIZE_CLASSES};

use crate::error::{Result, TextEngineError};
use rustc_hash::FxHashMap;

/// Per-slot header plus storage. `is_owned == false` slots hold a raw
/// pointer into caller-managed memory (spec.md `alloc_unowned`); the caller
/// is responsible for keeping that memory valid until the refcount drops to
/// zero. This is the one `unsafe` surface in the pool.
struct Slot {
    generation: u8,
    refcount: u32,
    len: u16,
    is_owned: bool,
    owned_bytes: Box<[u8]>,
    unowned: Option<(*const u8, usize)>,
    free: bool,
}

impl Slot {
    fn new_free(capacity: usize) -> Self {
        Self {
            generation: 0,
            refcount: 0,
            len: 0,
            is_owned: false,
            owned_bytes: vec![0u8; capacity].into_boxed_slice(),
            unowned: None,
            free: true,
        }
    }

    fn bytes(&self) -> &[u8] {
        if let Some((ptr, len)) = self.unowned {
            // Safety: caller-upheld invariant of `alloc_unowned` — the
            // pointed-to memory stays valid while refcount > 0.
            unsafe { std::slice::from_raw_parts(ptr, len) }
        } else {
            &self.owned_bytes[..self.len as usize]
        }
    }
}

struct Arena {
    class: SizeClass,
    slots: Vec<Slot>,
    free_list: Vec<u16>,
}

impl Arena {
    fn new(class: SizeClass) -> Self {
        Self { class, slots: Vec::new(), free_list: Vec::new() }
    }

    /// Pop a free slot (bumping its generation) or grow the arena.
    fn acquire_slot(&mut self) -> Result<u16> {
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1) & id::GENERATION_MASK;
            slot.free = false;
            return Ok(idx);
        }
        if self.slots.len() >= u16::MAX as usize {
            return Err(TextEngineError::OutOfMemory { context: "grapheme pool arena exhausted" });
        }
        self.slots.push(Slot::new_free(self.class.capacity()));
        Ok((self.slots.len() - 1) as u16)
    }
}

/// Intern-map key: owned bytes, so lookups by content don't require holding
/// a live slot reference.
type InternKey = Box<[u8]>;

/// The process-wide (or buffer-scoped) grapheme interning pool.
pub struct GraphemePool {
    arenas: [Arena; 5],
    intern_map: FxHashMap<InternKey, GraphemeId>,
}

impl Default for GraphemePool {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphemePool {
    #[must_use]
    pub fn new() -> Self {
        Self {
            arenas: SIZE_CLASSES.map(Arena::new),
            intern_map: FxHashMap::default(),
        }
    }

    fn arena_mut(&mut self, class: SizeClass) -> &mut Arena {
        &mut self.arenas[class as usize]
    }

    fn arena(&self, class: SizeClass) -> &Arena {
        &self.arenas[class as usize]
    }

    /// Validated slot lookup: decodes `id`, bounds-checks the slot, and
    /// verifies the generation matches. Returns `WrongGeneration` for a
    /// stale id and `InvalidId` for one that was never valid (out of
    /// bounds, or pointing at a currently-free slot whose generation
    /// happens to still match — treated the same as stale).
    fn validate<'a>(&'a self, id: GraphemeId) -> Result<(SizeClass, u16, &'a Slot)> {
        let (class, generation, slot_idx) = id.unpack();
        let arena = self.arena(class);
        let Some(slot) = arena.slots.get(slot_idx as usize) else {
            return Err(TextEngineError::InvalidId { id: id.raw() });
        };
        if slot.free {
            return Err(TextEngineError::InvalidId { id: id.raw() });
        }
        if slot.generation != generation {
            return Err(TextEngineError::WrongGeneration { id: id.raw() });
        }
        Ok((class, slot_idx, slot))
    }

    /// spec.md §4.1 "Algorithm: validated intern lookup" — look up `bytes`
    /// in the intern map; on any staleness (generation mismatch, content
    /// mismatch, refcount 0) purge the entry and report a miss rather than
    /// a hit.
    fn validated_intern_lookup(&mut self, bytes: &[u8]) -> Option<GraphemeId> {
        let existing = *self.intern_map.get(bytes)?;
        match self.validate(existing) {
            Ok((_, _, slot)) if slot.refcount > 0 && slot.bytes() == bytes => Some(existing),
            _ => {
                self.intern_map.remove(bytes);
                None
            }
        }
    }

    /// Intern owned `bytes`, returning an existing live id on content match
    /// or allocating a fresh slot. Fails for `bytes` longer than 128 or when
    /// the arena is exhausted.
    pub fn alloc(&mut self, bytes: &[u8]) -> Result<GraphemeId> {
        if let Some(id) = self.validated_intern_lookup(bytes) {
            self.incref(id)?;
            return Ok(id);
        }

        let Some(class) = class_for_size(bytes.len()) else {
            return Err(TextEngineError::OutOfMemory { context: "grapheme cluster exceeds 128 bytes" });
        };

        let arena = self.arena_mut(class);
        let slot_idx = arena.acquire_slot()?;
        let slot = &mut arena.slots[slot_idx as usize];
        slot.owned_bytes[..bytes.len()].copy_from_slice(bytes);
        slot.len = bytes.len() as u16;
        slot.is_owned = true;
        slot.refcount = 1;
        let id = GraphemeId::pack(class, slot.generation, slot_idx);

        self.intern_map.insert(bytes.into(), id);
        Ok(id)
    }

    /// Record a pointer into caller-owned storage. The caller must keep
    /// `bytes` valid until every ref is released. Unowned entries never
    /// enter the intern map.
    ///
    /// # Safety invariant
    /// `bytes` must remain valid and unmoved for as long as the returned id
    /// (and any id produced by interning the same content) has refcount > 0.
    pub fn alloc_unowned(&mut self, bytes: &[u8]) -> Result<GraphemeId> {
        let Some(class) = class_for_size(bytes.len()) else {
            return Err(TextEngineError::OutOfMemory { context: "grapheme cluster exceeds 128 bytes" });
        };
        let arena = self.arena_mut(class);
        let slot_idx = arena.acquire_slot()?;
        let slot = &mut arena.slots[slot_idx as usize];
        slot.is_owned = false;
        slot.len = bytes.len() as u16;
        slot.unowned = Some((bytes.as_ptr(), bytes.len()));
        slot.refcount = 1;
        Ok(GraphemeId::pack(class, slot.generation, slot_idx))
    }

    /// Increment a slot's refcount. A 0->1 transition on an owned slot
    /// re-adds its intern-map entry (covers `free_unreferenced`-adjacent
    /// recovery paths where the map entry was purged but the slot lives on).
    pub fn incref(&mut self, id: GraphemeId) -> Result<u32> {
        let (class, slot_idx, _) = self.validate(id)?;
        let (refcount, reinsert_bytes) = {
            let arena = self.arena_mut(class);
            let slot = &mut arena.slots[slot_idx as usize];
            let was_zero = slot.refcount == 0;
            slot.refcount += 1;
            let reinsert_bytes: Option<InternKey> =
                if was_zero && slot.is_owned { Some(slot.bytes().into()) } else { None };
            (slot.refcount, reinsert_bytes)
        };
        if let Some(bytes) = reinsert_bytes {
            self.intern_map.insert(bytes, id);
        }
        Ok(refcount)
    }

    /// Decrement a slot's refcount. On reaching zero: the intern-map entry
    /// (if owned) is removed and the slot is returned to its arena's free
    /// list, per spec.md's invariant "refcount at zero implies the slot is
    /// on the free list".
    pub fn decref(&mut self, id: GraphemeId) -> Result<u32> {
        let (class, slot_idx, _) = self.validate(id)?;
        let (refcount, remove_bytes) = {
            let arena = self.arena_mut(class);
            let slot = &mut arena.slots[slot_idx as usize];
            slot.refcount = slot.refcount.saturating_sub(1);
            let refcount = slot.refcount;
            let remove_bytes: Option<InternKey> = if refcount == 0 {
                let bytes = slot.is_owned.then(|| slot.bytes().into());
                slot.free = true;
                slot.unowned = None;
                arena.free_list.push(slot_idx);
                bytes
            } else {
                None
            };
            (refcount, remove_bytes)
        };
        if let Some(bytes) = remove_bytes {
            self.intern_map.remove(&bytes);
        }
        Ok(refcount)
    }

    /// Free a slot whose refcount is already (still) zero — e.g. a caller
    /// that allocated a slot for a post-alloc fixup which then failed before
    /// the first [`incref`](Self::incref). No-op (not an error) if the
    /// refcount is not zero; callers that truly want to force-free a live
    /// slot should `decref` it down to zero first.
    pub fn free_unreferenced(&mut self, id: GraphemeId) -> Result<()> {
        let (class, slot_idx, slot) = self.validate(id)?;
        if slot.refcount != 0 {
            return Ok(());
        }
        let arena = self.arena_mut(class);
        let slot = &mut arena.slots[slot_idx as usize];
        slot.free = true;
        slot.unowned = None;
        arena.free_list.push(slot_idx);
        Ok(())
    }

    /// Validated byte accessor.
    pub fn get(&self, id: GraphemeId) -> Result<&[u8]> {
        let (_, _, slot) = self.validate(id)?;
        Ok(slot.bytes())
    }

    /// Validated refcount accessor.
    pub fn refcount(&self, id: GraphemeId) -> Result<u32> {
        let (_, _, slot) = self.validate(id)?;
        Ok(slot.refcount)
    }
}

// Safety: `GraphemePool` is documented (spec.md §5) as carrying no internal
// locking and must only be shared across a single execution context; it is
// `Send` so it can be moved (not shared concurrently) between threads, e.g.
// when a buffer that owns one is moved across an await point boundary.
unsafe impl Send for GraphemePool {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_interns_matching_content() {
        let mut pool = GraphemePool::new();
        let a = pool.alloc(b"x").unwrap();
        let b = pool.alloc(b"x").unwrap();
        assert_eq!(a, b);
        assert_eq!(pool.refcount(a).unwrap(), 2);
    }

    #[test]
    fn decref_to_zero_then_alloc_returns_fresh_id() {
        let mut pool = GraphemePool::new();
        let id = pool.alloc(b"hello").unwrap();
        pool.incref(id).unwrap();
        assert_eq!(pool.decref(id).unwrap(), 1);
        assert_eq!(pool.decref(id).unwrap(), 0);

        let fresh = pool.alloc(b"hello").unwrap();
        assert_ne!(fresh, id, "a freed id's generation must not reappear for new content");
        assert_eq!(pool.get(fresh).unwrap(), b"hello");
    }

    #[test]
    fn stale_id_after_free_is_detected() {
        let mut pool = GraphemePool::new();
        let id = pool.alloc(b"abc").unwrap();
        pool.decref(id).unwrap();
        // Reuse the slot with different content, forcing a generation bump.
        let _other = pool.alloc(b"xyz").unwrap();
        match pool.get(id) {
            Err(TextEngineError::WrongGeneration { .. }) | Err(TextEngineError::InvalidId { .. }) => {}
            other => panic!("expected staleness error, got {other:?}"),
        }
    }

    #[test]
    fn oversize_bytes_rejected() {
        let mut pool = GraphemePool::new();
        let big = vec![b'a'; 129];
        assert!(matches!(pool.alloc(&big), Err(TextEngineError::OutOfMemory { .. })));
    }

    #[test]
    fn class_routing_matches_size() {
        let mut pool = GraphemePool::new();
        let id8 = pool.alloc(b"a").unwrap();
        let id32 = pool.alloc(b"0123456789abcdefghi").unwrap();
        let (class8, _, _) = id8.unpack();
        let (class32, _, _) = id32.unpack();
        assert_eq!(class8, SizeClass::C8);
        assert_eq!(class32, SizeClass::C32);
    }

    #[test]
    fn alloc_unowned_round_trips_and_skips_intern_map() {
        let mut pool = GraphemePool::new();
        let external = String::from("unowned");
        let id = pool.alloc_unowned(external.as_bytes()).unwrap();
        assert_eq!(pool.get(id).unwrap(), b"unowned");
        // A second `alloc` of identical bytes must NOT hit this unowned
        // entry (it never entered the intern map), so it gets a fresh slot.
        let owned = pool.alloc(b"unowned").unwrap();
        assert_ne!(owned, id);
    }

    #[test]
    fn free_unreferenced_is_noop_on_live_slot() {
        let mut pool = GraphemePool::new();
        let id = pool.alloc(b"keep").unwrap();
        pool.free_unreferenced(id).unwrap();
        assert_eq!(pool.get(id).unwrap(), b"keep");
    }
}
