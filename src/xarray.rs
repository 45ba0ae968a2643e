//! Flat tagged sparse array.
//!
//! The index space is cut into 64-slot chunks found through a hash directory
//! keyed by `index >> 6`. A chunk tags its occupied slots in a 64-bit presence
//! word and keeps only the present values, densely, in slot order; a slot's
//! position in that vector is the number of tagged slots below it.
//!
//! Storing into an occupied index replaces the value.

use rustc_hash::FxHashMap;

use crate::alloc::Quota;
use crate::container::{ContainerKind, Key, SparseStore};
use crate::error::{Error, Result};

const CHUNK_SHIFT: u32 = 6;
const CHUNK_MASK: Key = (1 << CHUNK_SHIFT) - 1;

#[inline]
fn split(index: Key) -> (Key, u32) {
    (index >> CHUNK_SHIFT, (index & CHUNK_MASK) as u32)
}

#[derive(Debug, Clone)]
struct Chunk<V> {
    present: u64,
    values: Vec<V>,
}

impl<V> Chunk<V> {
    fn new() -> Self {
        Self {
            present: 0,
            values: Vec::new(),
        }
    }

    #[inline]
    fn has(&self, slot: u32) -> bool {
        self.present & (1u64 << slot) != 0
    }

    /// Position of `slot` in `values`.
    #[inline]
    fn rank(&self, slot: u32) -> usize {
        (self.present & ((1u64 << slot) - 1)).count_ones() as usize
    }
}

/// Sparse array of values addressed by index.
#[derive(Debug, Clone)]
pub struct XArray<V> {
    chunks: FxHashMap<Key, Chunk<V>>,
    len: usize,
    max_index: Key,
    quota: Quota,
}

impl<V> XArray<V> {
    /// Create an empty array accepting every index.
    pub fn new() -> Self {
        Self::with_limits(Key::MAX, None)
    }

    /// Create an empty array accepting indices up to `max_index` and holding
    /// at most `limit` values.
    pub fn with_limits(max_index: Key, limit: Option<usize>) -> Self {
        Self {
            chunks: FxHashMap::default(),
            len: 0,
            max_index,
            quota: Quota::new(ContainerKind::XArray, limit),
        }
    }

    /// Number of allocated chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterate over `(index, value)` in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &V)> + '_ {
        let mut ids: Vec<Key> = self.chunks.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().flat_map(move |id| {
            let chunk = &self.chunks[&id];
            let base = id << CHUNK_SHIFT;
            let mut bits = chunk.present;
            chunk.values.iter().map(move |value| {
                let slot = bits.trailing_zeros() as Key;
                bits &= bits - 1;
                (base | slot, value)
            })
        })
    }

    fn insert_new(&mut self, index: Key, value: V) -> Result<()> {
        let (id, slot) = split(index);
        if !self.chunks.contains_key(&id) {
            self.chunks
                .try_reserve(1)
                .map_err(|_| Error::allocation(ContainerKind::XArray))?;
        }
        let chunk = self.chunks.entry(id).or_insert_with(Chunk::new);
        if let Err(err) = self.quota.reserve(&mut chunk.values, 1) {
            if chunk.present == 0 {
                self.chunks.remove(&id);
            }
            return Err(err);
        }
        let rank = chunk.rank(slot);
        chunk.values.insert(rank, value);
        chunk.present |= 1u64 << slot;
        Ok(())
    }
}

impl<V> SparseStore<V> for XArray<V> {
    fn kind(&self) -> ContainerKind {
        ContainerKind::XArray
    }

    fn max_index(&self) -> Key {
        self.max_index
    }

    fn store(&mut self, index: Key, value: V) -> Result<Option<V>> {
        self.check_index(index)?;
        let (id, slot) = split(index);
        if let Some(chunk) = self.chunks.get_mut(&id) {
            if chunk.has(slot) {
                let rank = chunk.rank(slot);
                return Ok(Some(std::mem::replace(&mut chunk.values[rank], value)));
            }
        }

        self.quota.charge()?;
        if let Err(err) = self.insert_new(index, value) {
            self.quota.release(1);
            return Err(err);
        }
        self.len += 1;
        Ok(None)
    }

    fn load(&self, index: Key) -> Option<&V> {
        let (id, slot) = split(index);
        let chunk = self.chunks.get(&id)?;
        if !chunk.has(slot) {
            return None;
        }
        chunk.values.get(chunk.rank(slot))
    }

    fn erase(&mut self, index: Key) -> Option<V> {
        let (id, slot) = split(index);
        let chunk = self.chunks.get_mut(&id)?;
        if !chunk.has(slot) {
            return None;
        }
        let rank = chunk.rank(slot);
        let value = chunk.values.remove(rank);
        chunk.present &= !(1u64 << slot);
        if chunk.present == 0 {
            self.chunks.remove(&id);
        }
        self.len -= 1;
        self.quota.release(1);
        Some(value)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) -> usize {
        self.chunks = FxHashMap::default();
        self.quota.reset();
        std::mem::take(&mut self.len)
    }
}

impl<V> Default for XArray<V> {
    fn default() -> Self {
        Self::new()
    }
}
