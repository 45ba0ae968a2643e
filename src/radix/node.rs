//! Radix tree nodes.
//!
//! Every node has [`MAP_SIZE`] slots and consumes [`MAP_SHIFT`] bits of the
//! index. Slots of bottom-level nodes hold values; slots above hold children.

use crate::alloc::Quota;
use crate::container::Key;
use crate::error::Result;

/// Index bits consumed per level.
pub const MAP_SHIFT: u32 = 6;

/// Slots per node.
pub const MAP_SIZE: usize = 1 << MAP_SHIFT;

const MAP_MASK: usize = MAP_SIZE - 1;

/// Slot of `index` in a node whose lowest consumed bit is `shift`.
#[inline]
pub(crate) fn slot_offset(index: Key, shift: u32) -> usize {
    (index >> shift) & MAP_MASK
}

/// Contents of one slot.
pub(crate) enum Slot<V> {
    Empty,
    Child(Box<Node<V>>),
    Value(V),
}

impl<V> Slot<V> {
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// A node with a fixed fan-out.
pub(crate) struct Node<V> {
    pub(crate) slots: Box<[Slot<V>]>,
    /// Occupied slots.
    pub(crate) count: usize,
}

impl<V> Node<V> {
    pub(crate) fn new(quota: &Quota) -> Result<Box<Self>> {
        Ok(Box::new(Self {
            slots: quota.boxed_slice(MAP_SIZE, || Slot::Empty)?,
            count: 0,
        }))
    }

    /// Child at `offset`, allocated if the slot is empty.
    pub(crate) fn child_or_insert(&mut self, offset: usize, quota: &Quota) -> Result<&mut Node<V>> {
        if self.slots[offset].is_empty() {
            self.slots[offset] = Slot::Child(Node::new(quota)?);
            self.count += 1;
        }
        match &mut self.slots[offset] {
            Slot::Child(child) => Ok(&mut **child),
            _ => unreachable!("value slot above the bottom level"),
        }
    }
}
