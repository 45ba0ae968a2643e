//! Multi-level radix tree mapping indices to values.
//!
//! The tree is as tall as the largest stored index needs: a tree of height
//! `h` reaches indices below `64^h`. Storing a larger index stacks new roots
//! on top with the old root in slot 0; erasing prunes empty nodes and drops
//! roots that only keep slot 0. Sparse indices only allocate the nodes on
//! their own paths.
//!
//! Storing into an occupied index is refused rather than replaced.

mod node;

use crate::alloc::Quota;
use crate::container::{ContainerKind, Key, SparseStore};
use crate::error::{Error, Result, StoreFault};

pub use node::{MAP_SHIFT, MAP_SIZE};
use node::{slot_offset, Node, Slot};

/// Highest index a tree of `height` levels can hold.
fn reach(height: u32) -> Key {
    let bits = height * MAP_SHIFT;
    if bits >= Key::BITS {
        Key::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Levels needed to hold `index`.
fn height_for(index: Key) -> u32 {
    let mut height = 1;
    while reach(height) < index {
        height += 1;
    }
    height
}

/// Radix tree keyed by 6-bit chunks of the index.
pub struct RadixTree<V> {
    root: Option<Box<Node<V>>>,
    height: u32,
    len: usize,
    max_index: Key,
    quota: Quota,
}

impl<V> RadixTree<V> {
    /// Create an empty tree accepting every index.
    pub fn new() -> Self {
        Self::with_limits(Key::MAX, None)
    }

    /// Create an empty tree accepting indices up to `max_index` and holding
    /// at most `limit` values.
    pub fn with_limits(max_index: Key, limit: Option<usize>) -> Self {
        Self {
            root: None,
            height: 0,
            len: 0,
            max_index,
            quota: Quota::new(ContainerKind::Radix, limit),
        }
    }

    /// Current number of levels; 0 when empty.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Iterate over `(index, value)` in ascending index order.
    pub fn iter(&self) -> Iter<'_, V> {
        let stack = match self.root.as_deref() {
            Some(root) => vec![Frame {
                node: root,
                base: 0,
                shift: (self.height - 1) * MAP_SHIFT,
                next: 0,
            }],
            None => Vec::new(),
        };
        Iter {
            stack,
            remaining: self.len,
        }
    }

    /// Stack new roots until the tree has `target` levels.
    fn grow(&mut self, target: u32) -> Result<()> {
        if self.root.is_none() {
            self.root = Some(Node::new(&self.quota)?);
            self.height = target;
            return Ok(());
        }
        while self.height < target {
            let mut top = Node::new(&self.quota)?;
            if let Some(old) = self.root.take() {
                top.slots[0] = Slot::Child(old);
                top.count = 1;
            }
            self.root = Some(top);
            self.height += 1;
        }
        Ok(())
    }

    fn insert_value(&mut self, index: Key, value: V) -> Result<()> {
        self.grow(height_for(index))?;

        let quota = &self.quota;
        let Some(mut node) = self.root.as_deref_mut() else {
            unreachable!("grow leaves a root in place");
        };
        let mut shift = (self.height - 1) * MAP_SHIFT;
        while shift > 0 {
            node = node.child_or_insert(slot_offset(index, shift), quota)?;
            shift -= MAP_SHIFT;
        }

        let offset = slot_offset(index, 0);
        if !node.slots[offset].is_empty() {
            return Err(Error::store(ContainerKind::Radix, index, StoreFault::Occupied));
        }
        node.slots[offset] = Slot::Value(value);
        node.count += 1;
        Ok(())
    }

    fn erase_in(node: &mut Node<V>, index: Key, shift: u32) -> Option<V> {
        let offset = slot_offset(index, shift);
        if shift == 0 {
            return match std::mem::replace(&mut node.slots[offset], Slot::Empty) {
                Slot::Value(value) => {
                    node.count -= 1;
                    Some(value)
                }
                other => {
                    node.slots[offset] = other;
                    None
                }
            };
        }

        let Slot::Child(child) = &mut node.slots[offset] else {
            return None;
        };
        let value = Self::erase_in(child, index, shift - MAP_SHIFT)?;
        if child.count == 0 {
            node.slots[offset] = Slot::Empty;
            node.count -= 1;
        }
        Some(value)
    }

    /// Drop an empty root, and roots that only keep slot 0.
    fn shrink(&mut self) {
        loop {
            match self.root.as_deref() {
                Some(root) if root.count == 0 => {
                    self.root = None;
                    self.height = 0;
                    return;
                }
                Some(root)
                    if self.height > 1
                        && root.count == 1
                        && matches!(root.slots[0], Slot::Child(_)) => {}
                Some(_) => return,
                None => {
                    self.height = 0;
                    return;
                }
            }

            if let Some(mut root) = self.root.take() {
                if let Slot::Child(child) = std::mem::replace(&mut root.slots[0], Slot::Empty) {
                    self.root = Some(child);
                    self.height -= 1;
                }
            }
        }
    }
}

impl<V> SparseStore<V> for RadixTree<V> {
    fn kind(&self) -> ContainerKind {
        ContainerKind::Radix
    }

    fn max_index(&self) -> Key {
        self.max_index
    }

    fn store(&mut self, index: Key, value: V) -> Result<Option<V>> {
        self.check_index(index)?;
        if self.load(index).is_some() {
            return Err(Error::store(ContainerKind::Radix, index, StoreFault::Occupied));
        }
        self.quota.charge()?;
        if let Err(err) = self.insert_value(index, value) {
            self.quota.release(1);
            if self.len == 0 {
                self.root = None;
                self.height = 0;
            }
            return Err(err);
        }
        self.len += 1;
        Ok(None)
    }

    fn load(&self, index: Key) -> Option<&V> {
        let mut node = self.root.as_deref()?;
        if index > reach(self.height) {
            return None;
        }
        let mut shift = (self.height - 1) * MAP_SHIFT;
        loop {
            match &node.slots[slot_offset(index, shift)] {
                Slot::Child(child) if shift > 0 => {
                    node = &**child;
                    shift -= MAP_SHIFT;
                }
                Slot::Value(value) if shift == 0 => return Some(value),
                _ => return None,
            }
        }
    }

    fn erase(&mut self, index: Key) -> Option<V> {
        if index > reach(self.height) {
            return None;
        }
        let shift = self.height.checked_sub(1)? * MAP_SHIFT;
        let root = self.root.as_deref_mut()?;
        let value = Self::erase_in(root, index, shift)?;
        self.len -= 1;
        self.quota.release(1);
        self.shrink();
        Some(value)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) -> usize {
        self.root = None;
        self.height = 0;
        self.quota.reset();
        std::mem::take(&mut self.len)
    }
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

struct Frame<'a, V> {
    node: &'a Node<V>,
    base: Key,
    shift: u32,
    next: usize,
}

/// Ascending iterator over a [`RadixTree`].
pub struct Iter<'a, V> {
    stack: Vec<Frame<'a, V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Key, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            if frame.next == MAP_SIZE {
                self.stack.pop();
                continue;
            }
            let offset = frame.next;
            frame.next += 1;
            let index = frame.base | (offset << frame.shift);
            match &frame.node.slots[offset] {
                Slot::Empty => {}
                Slot::Value(value) => {
                    self.remaining -= 1;
                    return Some((index, value));
                }
                Slot::Child(child) => {
                    let shift = frame.shift - MAP_SHIFT;
                    self.stack.push(Frame {
                        node: &**child,
                        base: index,
                        shift,
                        next: 0,
                    });
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let mut tree = RadixTree::new();
        for (i, v) in [3, 1, 2].into_iter().enumerate() {
            assert_eq!(tree.store(i, v), Ok(None));
        }
        assert_eq!(tree.load(0), Some(&3));
        assert_eq!(tree.load(1), Some(&1));
        assert_eq!(tree.load(2), Some(&2));
        assert_eq!(tree.load(3), None);
        assert_eq!(tree.load(Key::MAX), None);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_grows_and_shrinks() {
        let mut tree = RadixTree::new();
        tree.store(5, 50).unwrap();
        assert_eq!(tree.height(), 1);
        tree.store(64, 640).unwrap();
        assert_eq!(tree.height(), 2);
        tree.store(1 << 40, 7).unwrap();
        assert_eq!(tree.height(), 7);

        assert_eq!(tree.load(5), Some(&50));
        assert_eq!(tree.load(64), Some(&640));
        assert_eq!(tree.load(1 << 40), Some(&7));
        assert_eq!(tree.load((1 << 40) + 1), None);

        assert_eq!(tree.erase(1 << 40), Some(7));
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.erase(64), Some(640));
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.erase(5), Some(50));
        assert_eq!(tree.height(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.erase(5), None);
    }

    #[test]
    fn test_largest_index() {
        let mut tree = RadixTree::new();
        tree.store(Key::MAX, 1).unwrap();
        tree.store(0, 2).unwrap();
        assert_eq!(tree.load(Key::MAX), Some(&1));
        assert_eq!(tree.load(0), Some(&2));
        assert_eq!(
            tree.iter().map(|(k, v)| (k, *v)).collect::<Vec<_>>(),
            vec![(0, 2), (Key::MAX, 1)]
        );
    }

    #[test]
    fn test_occupied() {
        let mut tree = RadixTree::new();
        tree.store(9, 1).unwrap();
        assert_eq!(
            tree.store(9, 2),
            Err(Error::store(ContainerKind::Radix, 9, StoreFault::Occupied))
        );
        assert_eq!(tree.load(9), Some(&1));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_out_of_range() {
        let mut tree = RadixTree::with_limits(100, None);
        tree.store(100, 1).unwrap();
        assert_eq!(
            tree.store(101, 1),
            Err(Error::store(
                ContainerKind::Radix,
                101,
                StoreFault::OutOfRange { max_index: 100 }
            ))
        );
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_limit() {
        let mut tree = RadixTree::with_limits(Key::MAX, Some(2));
        tree.store(0, 0).unwrap();
        tree.store(1, 1).unwrap();
        assert_eq!(tree.store(2, 2), Err(Error::allocation(ContainerKind::Radix)));
        tree.erase(0);
        tree.store(2, 2).unwrap();
    }

    #[test]
    fn test_iter_sparse() {
        let mut tree = RadixTree::new();
        let keys = [4096, 0, 63, 64, 1 << 20, 4095];
        for &k in &keys {
            tree.store(k, k as u64).unwrap();
        }
        let mut sorted = keys.to_vec();
        sorted.sort();
        let got: Vec<Key> = tree.iter().map(|(k, v)| {
            assert_eq!(*v, k as u64);
            k
        }).collect();
        assert_eq!(got, sorted);
        assert_eq!(tree.iter().size_hint(), (6, Some(6)));
    }

    #[test]
    fn test_clear() {
        let mut tree = RadixTree::new();
        for i in 0..1000 {
            tree.store(i, i).unwrap();
        }
        assert_eq!(tree.clear(), 1000);
        assert!(tree.is_empty());
        assert_eq!(tree.load(0), None);
        assert_eq!(tree.height(), 0);
        tree.store(0, 1).unwrap();
    }
}
