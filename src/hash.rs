//! Hash table with a fixed number of buckets, keyed by insertion index.
//!
//! Buckets are selected by `key mod bucket_count`. Each bucket keeps its
//! entries in insertion order; iteration walks bucket 0 first. Short chains
//! stay inline in the bucket array.

use smallvec::SmallVec;

use crate::alloc::Quota;
use crate::container::{ContainerKind, Key};
use crate::error::{Error, Result};

/// Entries stored inline per bucket before spilling to the heap.
const INLINE_CHAIN: usize = 4;

type Chain<V> = SmallVec<[(Key, V); INLINE_CHAIN]>;

/// Bucketed key/value multiset.
#[derive(Debug, Clone)]
pub struct KeyedMultiset<V> {
    buckets: Box<[Chain<V>]>,
    mask: usize,
    len: usize,
    quota: Quota,
}

impl<V> KeyedMultiset<V> {
    /// Create a table with `2^bits` buckets.
    pub fn new(bits: u32) -> Result<Self> {
        Self::with_limit(bits, None)
    }

    /// Create a table with `2^bits` buckets holding at most `limit` entries.
    pub fn with_limit(bits: u32, limit: Option<usize>) -> Result<Self> {
        let count = 1usize
            .checked_shl(bits)
            .ok_or_else(|| Error::configuration(format!("{bits} bucket bits do not fit a usize")))?;
        let quota = Quota::new(ContainerKind::Hash, limit);
        let buckets = quota.boxed_slice(count, SmallVec::new)?;
        Ok(Self {
            buckets,
            mask: count - 1,
            len: 0,
            quota,
        })
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket a key lands in.
    #[inline]
    pub fn bucket_of(&self, key: Key) -> usize {
        key & self.mask
    }

    /// File `value` under `key`. Duplicate keys are kept side by side.
    pub fn insert(&mut self, key: Key, value: V) -> Result<()> {
        self.quota.ensure_room()?;
        let b = self.bucket_of(key);
        self.quota.reserve_small(&mut self.buckets[b], 1)?;
        self.quota.charge()?;
        self.buckets[b].push((key, value));
        self.len += 1;
        Ok(())
    }

    /// Every value filed under `key`, oldest first.
    pub fn get(&self, key: Key) -> impl Iterator<Item = &V> + '_ {
        self.buckets[self.bucket_of(key)]
            .iter()
            .filter(move |(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Entries of one bucket in insertion order.
    pub fn bucket(&self, index: usize) -> &[(Key, V)] {
        self.buckets.get(index).map_or(&[], |chain| chain.as_slice())
    }

    /// Iterate over all entries, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &V)> + '_ {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter().map(|(k, v)| (*k, v)))
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Free every entry, returning how many were freed. Buckets stay allocated.
    pub fn clear(&mut self) -> usize {
        let mut freed = 0;
        for chain in self.buckets.iter_mut() {
            freed += chain.len();
            *chain = SmallVec::new();
        }
        debug_assert_eq!(freed, self.len);
        self.len = 0;
        self.quota.reset();
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_selection() {
        let mut table = KeyedMultiset::new(5).unwrap();
        assert_eq!(table.bucket_count(), 32);
        for key in 0..100 {
            table.insert(key, key as i32 * 10).unwrap();
        }
        assert_eq!(table.len(), 100);
        assert_eq!(table.bucket_of(33), 1);

        let keys: Vec<Key> = table.bucket(1).iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 33, 65, 97]);
        assert!(table.bucket(32).is_empty());
    }

    #[test]
    fn test_iteration_order() {
        let mut table = KeyedMultiset::new(1).unwrap();
        for (key, v) in [3, 1, 2, 5].into_iter().enumerate() {
            table.insert(key, v).unwrap();
        }
        // Bucket 0 holds keys 0 and 2, bucket 1 holds keys 1 and 3.
        let got: Vec<(Key, i32)> = table.iter().map(|(k, v)| (k, *v)).collect();
        assert_eq!(got, vec![(0, 3), (2, 2), (1, 1), (3, 5)]);
    }

    #[test]
    fn test_duplicate_keys() {
        let mut table = KeyedMultiset::new(5).unwrap();
        table.insert(4, 1).unwrap();
        table.insert(4, 2).unwrap();
        table.insert(36, 3).unwrap();
        assert_eq!(table.get(4).copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(table.get(36).copied().collect::<Vec<_>>(), vec![3]);
        assert_eq!(table.get(5).count(), 0);
    }

    #[test]
    fn test_rejects_oversized_bucket_count() {
        assert!(matches!(
            KeyedMultiset::<i32>::new(usize::BITS),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            KeyedMultiset::<i32>::new(200),
            Err(Error::Configuration { .. })
        ));
        assert_eq!(KeyedMultiset::<i32>::new(0).unwrap().bucket_count(), 1);
    }

    #[test]
    fn test_limit_and_clear() {
        let mut table = KeyedMultiset::with_limit(5, Some(3)).unwrap();
        for key in 0..3 {
            table.insert(key, 0).unwrap();
        }
        assert_eq!(table.insert(3, 0), Err(Error::allocation(ContainerKind::Hash)));
        assert_eq!(table.clear(), 3);
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
        table.insert(3, 0).unwrap();
    }
}
