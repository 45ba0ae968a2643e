//! Value-ordered red-black tree.
//!
//! Insertion descends from the root going left when the node's value is
//! strictly greater than the new one and right otherwise, so equal values
//! collect to the right of each other in arrival order. The new red leaf is
//! then repaired bottom-up:
//!
//! - red uncle: recolor parent, uncle and grandparent, continue from the
//!   grandparent;
//! - black uncle: one restructuring (a single rotation, or a double rotation
//!   when the new node is an inner grandchild), then stop.
//!
//! The tree never deletes single nodes; [`RbTree::clear`] frees them all.

mod node;

use thiserror::Error;

use crate::alloc::Quota;
use crate::container::ContainerKind;
use crate::error::{Error as CrateError, Result};

pub use node::{Color, NodeId};
use node::Node;

/// A broken red-black or search-tree invariant, found by [`RbTree::validate`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The root is red.
    #[error("root is red")]
    RedRoot,
    /// A red node has a red child.
    #[error("red node {0:?} has a red child")]
    RedRed(NodeId),
    /// The two subtrees of a node have different black heights.
    #[error("black height differs below node {0:?}")]
    BlackHeight(NodeId),
    /// A child does not point back at its parent.
    #[error("node {0:?} has a broken parent link")]
    ParentLink(NodeId),
    /// In-order traversal decreases at this node.
    #[error("node {0:?} is smaller than its in-order predecessor")]
    Order(NodeId),
    /// Some arena nodes are not reachable from the root.
    #[error("reached {reached} of {len} nodes")]
    Unreachable {
        /// Nodes reachable from the root
        reached: usize,
        /// Nodes in the arena
        len: usize,
    },
}

/// Red-black tree ordered by value.
#[derive(Debug, Clone)]
pub struct RbTree<V> {
    nodes: Vec<Node<V>>,
    root: Option<NodeId>,
    rotations: usize,
    quota: Quota,
}

impl<V> RbTree<V> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Create an empty tree that holds at most `limit` values.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            rotations: 0,
            quota: Quota::new(ContainerKind::RbTree, limit),
        }
    }

    /// Get the number of values.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rotations performed since the tree was created.
    pub fn rotations(&self) -> usize {
        self.rotations
    }

    /// Smallest value.
    pub fn first(&self) -> Option<&V> {
        self.first_id().map(|id| &self.node(id).value)
    }

    /// Largest value; the last inserted one among equals.
    pub fn last(&self) -> Option<&V> {
        let mut id = self.root?;
        while let Some(right) = self.node(id).right {
            id = right;
        }
        Some(&self.node(id).value)
    }

    /// Iterate in ascending order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            tree: self,
            next: self.first_id(),
            remaining: self.len(),
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.into_iter().map(|r| (r, 1)).collect();
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            let node = self.node(id);
            stack.extend(node.left.map(|l| (l, depth + 1)));
            stack.extend(node.right.map(|r| (r, depth + 1)));
        }
        max
    }

    /// Free every node, returning how many were freed.
    pub fn clear(&mut self) -> usize {
        let freed = std::mem::take(&mut self.nodes).len();
        self.root = None;
        let charged = self.quota.reset();
        debug_assert_eq!(charged, freed);
        freed
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node<V> {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<V> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.is_some_and(|id| self.node(id).color == Color::Red)
    }

    fn first_id(&self) -> Option<NodeId> {
        let mut id = self.root?;
        while let Some(left) = self.node(id).left {
            id = left;
        }
        Some(id)
    }

    /// In-order successor.
    fn next_id(&self, id: NodeId) -> Option<NodeId> {
        if let Some(mut next) = self.node(id).right {
            while let Some(left) = self.node(next).left {
                next = left;
            }
            return Some(next);
        }

        let mut child = id;
        while let Some(parent) = self.node(child).parent {
            if self.node(parent).left == Some(child) {
                return Some(parent);
            }
            child = parent;
        }
        None
    }

    /// Point `parent`'s link to `old` at `new` instead.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                let p = self.node_mut(p);
                if p.left == Some(old) {
                    p.left = Some(new);
                } else {
                    p.right = Some(new);
                }
            }
        }
    }

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.node(x).right else {
            debug_assert!(false, "rotate_left without a right child");
            return;
        };
        let inner = self.node(y).left;
        self.node_mut(x).right = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(x);
        }
        let parent = self.node(x).parent;
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, y);
        self.node_mut(y).left = Some(x);
        self.node_mut(x).parent = Some(y);
        self.rotations += 1;
    }

    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.node(x).left else {
            debug_assert!(false, "rotate_right without a left child");
            return;
        };
        let inner = self.node(y).right;
        self.node_mut(x).left = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(x);
        }
        let parent = self.node(x).parent;
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, y);
        self.node_mut(y).right = Some(x);
        self.node_mut(x).parent = Some(y);
        self.rotations += 1;
    }

    fn fix_after_insert(&mut self, mut node: NodeId) {
        while let Some(parent) = self.node(node).parent {
            if self.node(parent).color == Color::Black {
                break;
            }
            // A red parent is never the root.
            let Some(grand) = self.node(parent).parent else {
                break;
            };
            let parent_is_left = self.node(grand).left == Some(parent);
            let uncle = if parent_is_left {
                self.node(grand).right
            } else {
                self.node(grand).left
            };

            if self.is_red(uncle) {
                self.node_mut(parent).color = Color::Black;
                if let Some(uncle) = uncle {
                    self.node_mut(uncle).color = Color::Black;
                }
                self.node_mut(grand).color = Color::Red;
                node = grand;
                continue;
            }

            let mut top = parent;
            if parent_is_left {
                if self.node(parent).right == Some(node) {
                    self.rotate_left(parent);
                    top = node;
                }
                self.node_mut(top).color = Color::Black;
                self.node_mut(grand).color = Color::Red;
                self.rotate_right(grand);
            } else {
                if self.node(parent).left == Some(node) {
                    self.rotate_right(parent);
                    top = node;
                }
                self.node_mut(top).color = Color::Black;
                self.node_mut(grand).color = Color::Red;
                self.rotate_left(grand);
            }
            break;
        }

        if let Some(root) = self.root {
            self.node_mut(root).color = Color::Black;
        }
    }
}

impl<V: Ord> RbTree<V> {
    /// Insert a value and rebalance.
    pub fn insert(&mut self, value: V) -> Result<()> {
        self.quota.ensure_room()?;
        if self.nodes.len() >= NodeId::MAX_NODES {
            return Err(CrateError::allocation(ContainerKind::RbTree));
        }
        self.quota.reserve(&mut self.nodes, 1)?;
        self.quota.charge()?;

        let mut parent = None;
        let mut go_left = false;
        let mut link = self.root;
        while let Some(id) = link {
            let node = self.node(id);
            parent = Some(id);
            go_left = node.value > value;
            link = if go_left { node.left } else { node.right };
        }

        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::leaf(value, parent));
        match parent {
            None => self.root = Some(id),
            Some(p) if go_left => self.node_mut(p).left = Some(id),
            Some(p) => self.node_mut(p).right = Some(id),
        }

        self.fix_after_insert(id);
        Ok(())
    }

    /// Check every invariant, returning the black height of the tree
    /// (black nodes on any root-to-nil path).
    pub fn validate(&self) -> std::result::Result<usize, Violation> {
        let Some(root) = self.root else {
            return match self.nodes.len() {
                0 => Ok(0),
                len => Err(Violation::Unreachable { reached: 0, len }),
            };
        };
        if self.node(root).color == Color::Red {
            return Err(Violation::RedRoot);
        }

        let mut reached = 0;
        let black_height = self.check_subtree(root, None, &mut reached)?;
        if reached != self.nodes.len() {
            return Err(Violation::Unreachable {
                reached,
                len: self.nodes.len(),
            });
        }

        let mut prev = root;
        let mut cursor = self.first_id();
        let mut first = true;
        while let Some(id) = cursor {
            if !first && self.node(prev).value > self.node(id).value {
                return Err(Violation::Order(id));
            }
            first = false;
            prev = id;
            cursor = self.next_id(id);
        }

        Ok(black_height)
    }

    fn check_subtree(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        reached: &mut usize,
    ) -> std::result::Result<usize, Violation> {
        let node = self.node(id);
        *reached += 1;
        if node.parent != parent {
            return Err(Violation::ParentLink(id));
        }
        if node.color == Color::Red && (self.is_red(node.left) || self.is_red(node.right)) {
            return Err(Violation::RedRed(id));
        }

        let left = match node.left {
            Some(left) => self.check_subtree(left, Some(id), reached)?,
            None => 0,
        };
        let right = match node.right {
            Some(right) => self.check_subtree(right, Some(id), reached)?,
            None => 0,
        };
        if left != right {
            return Err(Violation::BlackHeight(id));
        }

        Ok(left + usize::from(node.color == Color::Black))
    }
}

impl<V> Default for RbTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ascending iterator over an [`RbTree`].
pub struct Iter<'a, V> {
    tree: &'a RbTree<V>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        let id = self.next?;
        self.next = self.tree.next_id(id);
        self.remaining -= 1;
        Some(&self.tree.node(id).value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a RbTree<V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
