//! Memory registry: a small append-only table mapping an 8-bit `mem_id` to a
//! byte buffer (spec.md §3, §4.2). Registry lifetime equals its owning text
//! buffer; owned slices are freed when the registry is torn down.

use crate::error::{Result, TextEngineError};

const MAX_ENTRIES: usize = 256;

struct Entry {
    data: Vec<u8>,
    owned: bool,
}

/// Append-only (within a buffer's lifetime) table of byte buffers addressed
/// by an 8-bit handle. Replacement is allowed and drops prior owned
/// contents; registration beyond 256 live entries fails.
#[derive(Default)]
pub struct MemoryRegistry {
    entries: Vec<Option<Entry>>,
}

impl MemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register `data`, returning its new `mem_id`.
    pub fn register(&mut self, data: Vec<u8>, owned: bool) -> Result<u8> {
        if self.entries.len() >= MAX_ENTRIES {
            return Err(TextEngineError::OutOfMemory { context: "memory registry full (256 entries)" });
        }
        self.entries.push(Some(Entry { data, owned }));
        Ok((self.entries.len() - 1) as u8)
    }

    /// Replace the buffer at `mem_id`. The previous buffer is dropped only
    /// if it was owned (spec.md §4.2).
    pub fn replace(&mut self, mem_id: u8, data: Vec<u8>, owned: bool) -> Result<()> {
        let slot = self
            .entries
            .get_mut(mem_id as usize)
            .ok_or(TextEngineError::InvalidMemId { mem_id })?;
        *slot = Some(Entry { data, owned });
        Ok(())
    }

    /// Fetch the buffer registered at `mem_id`. Unregistered ids are a
    /// programmer error in hot paths; callers there should treat `None` as
    /// a bug rather than attempt recovery (spec.md §4.2).
    #[must_use]
    pub fn get(&self, mem_id: u8) -> Option<&[u8]> {
        self.entries.get(mem_id as usize)?.as_ref().map(|e| e.data.as_slice())
    }

    #[must_use]
    pub fn is_owned(&self, mem_id: u8) -> Option<bool> {
        self.entries.get(mem_id as usize)?.as_ref().map(|e| e.owned)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_get_round_trip() {
        let mut reg = MemoryRegistry::new();
        let id = reg.register(b"hello".to_vec(), true).unwrap();
        assert_eq!(reg.get(id), Some(&b"hello"[..]));
    }

    #[test]
    fn replace_drops_prior_owned_contents() {
        let mut reg = MemoryRegistry::new();
        let id = reg.register(b"old".to_vec(), true).unwrap();
        reg.replace(id, b"new".to_vec(), true).unwrap();
        assert_eq!(reg.get(id), Some(&b"new"[..]));
    }

    #[test]
    fn unregistered_id_is_none() {
        let reg = MemoryRegistry::new();
        assert_eq!(reg.get(42), None);
    }

    #[test]
    fn registry_caps_at_256_entries() {
        let mut reg = MemoryRegistry::new();
        for _ in 0..256 {
            reg.register(Vec::new(), true).unwrap();
        }
        assert!(matches!(reg.register(Vec::new(), true), Err(TextEngineError::OutOfMemory { .. })));
    }
}
