//! Red-black tree nodes.
//!
//! Nodes live in one arena vector and link to each other by [`NodeId`]
//! (a 32-bit offset into the arena) instead of pointers, so parent links never
//! dangle and freeing the arena frees every node once.

/// Color of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Red node; never the parent of another red node.
    Red,
    /// Black node; counted by the black height.
    Black,
}

/// Offset of a node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Largest arena length addressable by a `NodeId`.
    pub(crate) const MAX_NODES: usize = u32::MAX as usize;

    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < Self::MAX_NODES);
        Self(index as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the tree.
#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
    pub(crate) value: V,
    pub(crate) color: Color,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl<V> Node<V> {
    /// New red leaf hanging off `parent`.
    pub(crate) fn leaf(value: V, parent: Option<NodeId>) -> Self {
        Self {
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }
}
