//! # datas
//!
//! Stores one integer sequence five times over, in five independently owned
//! containers keyed by a shared insertion index:
//!
//! - an append-only ordered sequence,
//! - a bucketed hash table keyed by insertion index,
//! - a value-ordered red-black tree,
//! - a multi-level radix tree,
//! - a flat tagged sparse array.
//!
//! A [`Datas`] context ingests the values, renders a bounded text report of
//! all five containers any number of times, and frees everything in a single
//! teardown.
//!
//! ## Example
//!
//! ```rust
//! use datas::Datas;
//!
//! let mut datas = Datas::new().unwrap();
//! datas.ingest([3, 1, 2]).unwrap();
//!
//! let report = datas.report().unwrap();
//! assert!(report.as_str().starts_with("Linked list: 3, 1, 2\n"));
//! assert!(report.as_str().contains("Red-black tree: 1, 2, 3\n"));
//!
//! let freed = datas.teardown().unwrap();
//! assert_eq!(freed.total(), 15);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alloc;
pub mod config;
pub mod container;
pub mod datas;
pub mod error;
pub mod hash;
pub mod list;
pub mod params;
pub mod procfile;
pub mod radix;
pub mod rbtree;
pub mod report;
pub mod xarray;

pub use config::Config;
pub use container::{ContainerKind, Key, SparseStore, Value};
pub use datas::{Datas, State, TeardownSummary};
pub use error::{Error, Result};
pub use hash::KeyedMultiset;
pub use list::OrderedSequence;
pub use radix::RadixTree;
pub use rbtree::RbTree;
pub use report::Report;
pub use xarray::XArray;

#[cfg(test)]
mod proptests;
