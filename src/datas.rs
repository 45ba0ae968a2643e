//! The container context and its lifecycle.
//!
//! A [`Datas`] owns the five containers and the insertion key counter. It
//! moves through three states:
//!
//! ```text
//! Empty --ingest--> Populated --teardown--> Destroyed
//!   \                                          ^
//!    `----------------teardown----------------'
//! ```
//!
//! `report` is valid in `Empty` and `Populated` and never changes state.
//! Nothing is valid in `Destroyed`.

use std::fmt;

use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::container::{ContainerKind, Key, SparseStore, Value};
use crate::error::{Error, Result};
use crate::hash::KeyedMultiset;
use crate::list::OrderedSequence;
use crate::radix::RadixTree;
use crate::rbtree::RbTree;
use crate::report::{Report, Reporter};
use crate::xarray::XArray;

/// Lifecycle state of a [`Datas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Nothing ingested yet.
    Empty,
    /// At least one value stored.
    Populated,
    /// Torn down; every container has been freed.
    Destroyed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Empty => "empty",
            State::Populated => "populated",
            State::Destroyed => "destroyed",
        })
    }
}

/// Entries freed per container by [`Datas::teardown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownSummary {
    /// Values freed from the ordered sequence
    pub list: usize,
    /// Entries freed from the hash table
    pub hash: usize,
    /// Nodes freed from the red-black tree
    pub rbtree: usize,
    /// Values erased from the radix tree
    pub radix: usize,
    /// Values erased from the sparse array
    pub xarray: usize,
}

impl TeardownSummary {
    /// Sum over all containers.
    pub fn total(&self) -> usize {
        self.list + self.hash + self.rbtree + self.radix + self.xarray
    }
}

/// Five containers filled from one integer sequence.
pub struct Datas {
    config: Config,
    state: State,
    next_key: Key,
    list: OrderedSequence<Value>,
    hash: KeyedMultiset<Value>,
    rbtree: RbTree<Value>,
    radix: RadixTree<Value>,
    xarray: XArray<Value>,
}

impl Datas {
    /// Create an empty context with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Create an empty context.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let limit = |kind| config.limit_for(kind);
        Ok(Self {
            state: State::Empty,
            next_key: 0,
            list: OrderedSequence::with_limit(limit(ContainerKind::List)),
            hash: KeyedMultiset::with_limit(config.bucket_bits, limit(ContainerKind::Hash))?,
            rbtree: RbTree::with_limit(limit(ContainerKind::RbTree)),
            radix: RadixTree::with_limits(config.max_index, limit(ContainerKind::Radix)),
            xarray: XArray::with_limits(config.max_index, limit(ContainerKind::XArray)),
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Number of insertion keys handed out.
    pub fn len(&self) -> usize {
        self.next_key
    }

    /// Check if no key has been handed out.
    pub fn is_empty(&self) -> bool {
        self.next_key == 0
    }

    /// The ordered sequence.
    pub fn list(&self) -> &OrderedSequence<Value> {
        &self.list
    }

    /// The hash table.
    pub fn hash(&self) -> &KeyedMultiset<Value> {
        &self.hash
    }

    /// The red-black tree.
    pub fn rbtree(&self) -> &RbTree<Value> {
        &self.rbtree
    }

    /// The radix tree.
    pub fn radix(&self) -> &RadixTree<Value> {
        &self.radix
    }

    /// The sparse array.
    pub fn xarray(&self) -> &XArray<Value> {
        &self.xarray
    }

    /// Entries held by one container.
    pub fn entries(&self, kind: ContainerKind) -> usize {
        match kind {
            ContainerKind::List => self.list.len(),
            ContainerKind::Hash => self.hash.len(),
            ContainerKind::RbTree => self.rbtree.len(),
            ContainerKind::Radix => self.radix.len(),
            ContainerKind::XArray => self.xarray.len(),
        }
    }

    fn total_entries(&self) -> usize {
        ContainerKind::ALL.iter().map(|&kind| self.entries(kind)).sum()
    }

    /// Store every value under the next insertion keys.
    ///
    /// Stops at the first value that cannot be stored and returns its error.
    /// Values stored before it stay in place, and so do the copies of the
    /// failing value that some containers already accepted. Returns the
    /// number of values stored by this call.
    pub fn ingest<I>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = Value>,
    {
        if self.state == State::Destroyed {
            return Err(Error::invalid_state("ingest", self.state));
        }

        let first_key = self.next_key;
        let mut outcome = Ok(());
        for value in values {
            let key = self.next_key;
            if let Err(err) = self.store_value(value) {
                warn!(key, value, error = %err, "ingest aborted");
                outcome = Err(err);
                break;
            }
        }

        if self.state == State::Empty && self.total_entries() > 0 {
            self.state = State::Populated;
        }

        let stored = self.next_key - first_key;
        info!(stored, total = self.next_key, state = %self.state, "ingest finished");
        outcome.map(|()| stored)
    }

    fn store_value(&mut self, value: Value) -> Result<()> {
        let key = self.next_key;
        self.radix.check_index(key)?;
        self.xarray.check_index(key)?;

        let before = self.total_entries();
        let placed = self.place(key, value);
        // A key some container already holds is spent even if a later one
        // refused the value, so the next value never collides with it.
        if placed.is_ok() || self.total_entries() != before {
            self.next_key += 1;
        }
        placed?;

        trace!(key, value, "stored");
        Ok(())
    }

    fn place(&mut self, key: Key, value: Value) -> Result<()> {
        self.list.append(value)?;
        self.hash.insert(key, value)?;
        self.rbtree.insert(value)?;
        self.radix.store(key, value)?;
        self.xarray.store(key, value)?;
        Ok(())
    }

    /// Render every container into one bounded report.
    pub fn report(&self) -> Result<Report> {
        if self.state == State::Destroyed {
            return Err(Error::invalid_state("report", self.state));
        }

        let keys = 0..self.next_key;
        let mut reporter = Reporter::from_config(&self.config);
        reporter.section(ContainerKind::List.label(), self.list.iter());
        reporter.section(ContainerKind::Hash.label(), self.hash.iter().map(|(_, v)| v));
        reporter.section(ContainerKind::RbTree.label(), self.rbtree.iter());
        reporter.section(
            ContainerKind::Radix.label(),
            keys.clone().filter_map(|key| self.radix.load(key)),
        );
        reporter.section(
            ContainerKind::XArray.label(),
            keys.filter_map(|key| self.xarray.load(key)),
        );

        let report = reporter.finish();
        debug!(
            bytes = report.len(),
            truncated = report.is_truncated(),
            "report rendered"
        );
        Ok(report)
    }

    /// Free every container. Valid once; a second call is rejected.
    pub fn teardown(&mut self) -> Result<TeardownSummary> {
        if self.state == State::Destroyed {
            return Err(Error::invalid_state("teardown", self.state));
        }
        info!(keys = self.next_key, "cleaning up");

        let summary = TeardownSummary {
            list: self.list.clear(),
            hash: self.hash.clear(),
            rbtree: self.rbtree.clear(),
            radix: drain_sparse(&mut self.radix, self.next_key),
            xarray: drain_sparse(&mut self.xarray, self.next_key),
        };
        self.state = State::Destroyed;

        debug_assert_eq!(self.total_entries(), 0);
        info!(freed = summary.total(), "teardown finished");
        Ok(summary)
    }
}

/// Erase every key below `count`, then sweep whatever is left.
fn drain_sparse<S: SparseStore<Value>>(store: &mut S, count: Key) -> usize {
    let mut freed = 0;
    for key in 0..count {
        if store.erase(key).is_some() {
            freed += 1;
        }
    }
    let stray = store.clear();
    if stray > 0 {
        warn!(container = %store.kind(), stray, "entries beyond the key range");
    }
    freed + stray
}

impl fmt::Debug for Datas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datas")
            .field("state", &self.state)
            .field("next_key", &self.next_key)
            .field("list", &self.list.len())
            .field("hash", &self.hash.len())
            .field("rbtree", &self.rbtree.len())
            .field("radix", &self.radix.len())
            .field("xarray", &self.xarray.len())
            .finish()
    }
}
