//! Identity of the five containers and the interface shared by the two
//! sparse stores.

use std::fmt;

use crate::error::{Error, Result, StoreFault};

/// Dense, zero-based insertion index shared by one value across all containers.
pub type Key = usize;

/// Integer payload held by every container.
pub type Value = i32;

/// The five containers, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Append-only ordered sequence.
    List,
    /// Bucketed key/value multiset.
    Hash,
    /// Value-ordered red-black tree.
    RbTree,
    /// Multi-level radix trie.
    Radix,
    /// Flat tagged sparse array.
    XArray,
}

impl ContainerKind {
    /// All kinds in the fixed report order.
    pub const ALL: [ContainerKind; 5] = [
        ContainerKind::List,
        ContainerKind::Hash,
        ContainerKind::RbTree,
        ContainerKind::Radix,
        ContainerKind::XArray,
    ];

    /// Position in [`ContainerKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            ContainerKind::List => 0,
            ContainerKind::Hash => 1,
            ContainerKind::RbTree => 2,
            ContainerKind::Radix => 3,
            ContainerKind::XArray => 4,
        }
    }

    /// Label that opens this container's report section.
    pub fn label(self) -> &'static str {
        match self {
            ContainerKind::List => "Linked list:",
            ContainerKind::Hash => "Hash table:",
            ContainerKind::RbTree => "Red-black tree:",
            ContainerKind::Radix => "Radix tree:",
            ContainerKind::XArray => "XArray:",
        }
    }

    /// Short lowercase name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            ContainerKind::List => "list",
            ContainerKind::Hash => "hash",
            ContainerKind::RbTree => "rbtree",
            ContainerKind::Radix => "radix",
            ContainerKind::XArray => "xarray",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An index → value store over a possibly sparse key space.
///
/// Implementations never materialize the key space contiguously; absent keys
/// are reported as `None`, never as a default value.
pub trait SparseStore<V> {
    /// Which container this store plays.
    fn kind(&self) -> ContainerKind;

    /// Highest index this store accepts.
    fn max_index(&self) -> Key;

    /// Store `value` at `index`, returning the value it displaced, if the
    /// store allows replacement.
    fn store(&mut self, index: Key, value: V) -> Result<Option<V>>;

    /// Value stored at `index`.
    fn load(&self, index: Key) -> Option<&V>;

    /// Remove and return the value stored at `index`.
    fn erase(&mut self, index: Key) -> Option<V>;

    /// Number of stored values.
    fn len(&self) -> usize;

    /// Drop every stored value, returning how many there were.
    fn clear(&mut self) -> usize;

    /// Check whether the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail with [`Error::StoreConsistency`] if `index` is beyond [`max_index`](Self::max_index).
    fn check_index(&self, index: Key) -> Result<()> {
        let max_index = self.max_index();
        if index > max_index {
            return Err(Error::store(
                self.kind(),
                index,
                StoreFault::OutOfRange { max_index },
            ));
        }
        Ok(())
    }
}
