//! Append-only ordered sequence.

use crate::alloc::Quota;
use crate::container::ContainerKind;
use crate::error::Result;

/// Values in insertion order.
#[derive(Debug, Clone)]
pub struct OrderedSequence<V> {
    items: Vec<V>,
    quota: Quota,
}

impl<V> OrderedSequence<V> {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Create an empty sequence that holds at most `limit` values.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            items: Vec::new(),
            quota: Quota::new(ContainerKind::List, limit),
        }
    }

    /// Add a value at the tail.
    pub fn append(&mut self, value: V) -> Result<()> {
        self.quota.ensure_room()?;
        self.quota.reserve(&mut self.items, 1)?;
        self.quota.charge()?;
        self.items.push(value);
        Ok(())
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.items.iter()
    }

    /// Get the number of values.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Free every value and the backing storage, returning how many values
    /// were freed.
    pub fn clear(&mut self) -> usize {
        let freed = std::mem::take(&mut self.items).len();
        self.quota.reset();
        freed
    }
}

impl<V> Default for OrderedSequence<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> IntoIterator for &'a OrderedSequence<V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_insertion_order() {
        let mut list = OrderedSequence::new();
        for v in [3, 1, 2] {
            list.append(v).unwrap();
        }
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
        // Restartable.
        assert_eq!(list.iter().count(), 3);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_limit() {
        let mut list = OrderedSequence::with_limit(Some(1));
        list.append(7).unwrap();
        assert_eq!(list.append(8), Err(Error::allocation(ContainerKind::List)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut list = OrderedSequence::new();
        for v in 0..10 {
            list.append(v).unwrap();
        }
        assert_eq!(list.clear(), 10);
        assert!(list.is_empty());
        assert_eq!(list.iter().next(), None);
        assert_eq!(list.clear(), 0);
    }
}
