//! Entry accounting and fallible reservation.
//!
//! Every container owns a [`Quota`]. It counts live entries against an
//! optional limit and turns failed reservations into
//! [`Error::AllocationFailure`] tagged with the container's kind, so an
//! exhausted allocator surfaces as an error instead of an abort.

use smallvec::{Array, SmallVec};

use crate::container::ContainerKind;
use crate::error::{Error, Result};

/// Live-entry counter with an optional ceiling.
#[derive(Debug, Clone)]
pub struct Quota {
    kind: ContainerKind,
    limit: Option<usize>,
    live: usize,
}

impl Quota {
    /// Create a quota for `kind` that allows at most `limit` live entries.
    pub fn new(kind: ContainerKind, limit: Option<usize>) -> Self {
        Self {
            kind,
            limit,
            live: 0,
        }
    }

    /// Quota with no ceiling.
    pub fn unlimited(kind: ContainerKind) -> Self {
        Self::new(kind, None)
    }

    /// Number of live entries.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Fail if one more entry would exceed the limit.
    pub fn ensure_room(&self) -> Result<()> {
        match self.limit {
            Some(limit) if self.live >= limit => Err(Error::allocation(self.kind)),
            _ => Ok(()),
        }
    }

    /// Account for one new entry.
    pub fn charge(&mut self) -> Result<()> {
        self.ensure_room()?;
        self.live += 1;
        Ok(())
    }

    /// Give back `n` entries.
    pub fn release(&mut self, n: usize) {
        debug_assert!(n <= self.live, "releasing more entries than were charged");
        self.live = self.live.saturating_sub(n);
    }

    /// Forget every entry, returning how many were live.
    pub fn reset(&mut self) -> usize {
        std::mem::take(&mut self.live)
    }

    /// Reserve room for `additional` more elements in `vec`.
    pub fn reserve<T>(&self, vec: &mut Vec<T>, additional: usize) -> Result<()> {
        vec.try_reserve(additional)
            .map_err(|_| Error::allocation(self.kind))
    }

    /// Reserve room for `additional` more elements in a small vector.
    pub fn reserve_small<A: Array>(&self, vec: &mut SmallVec<A>, additional: usize) -> Result<()> {
        vec.try_reserve(additional)
            .map_err(|_| Error::allocation(self.kind))
    }

    /// Allocate a boxed slice of `len` elements produced by `fill`.
    pub fn boxed_slice<T>(&self, len: usize, fill: impl FnMut() -> T) -> Result<Box<[T]>> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(len)
            .map_err(|_| Error::allocation(self.kind))?;
        slots.resize_with(len, fill);
        Ok(slots.into_boxed_slice())
    }
}
