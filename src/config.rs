//! Sizing knobs for a [`Datas`](crate::Datas) context.

use crate::container::{ContainerKind, Key};
use crate::error::{Error, Result};

/// Default number of hash bucket bits (2^5 = 32 buckets).
pub const DEFAULT_BUCKET_BITS: u32 = 5;

/// Default report buffer capacity in bytes, terminator included.
pub const DEFAULT_REPORT_CAPACITY: usize = 2048;

/// Default headroom below which no further value is written.
pub const DEFAULT_REPORT_HEADROOM: usize = 4;

const MAX_BUCKET_BITS: u32 = 16;

/// Configuration for a [`Datas`](crate::Datas) context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// log2 of the number of hash buckets
    pub bucket_bits: u32,
    /// Report buffer capacity, terminator included
    pub report_capacity: usize,
    /// Minimum free bytes required before writing another value
    pub report_headroom: usize,
    /// Highest index the sparse stores accept
    pub max_index: Key,
    /// Maximum entries per container, `None` for no limit
    pub entry_limit: Option<usize>,
    /// Per-container caps, indexed in [`ContainerKind::ALL`] order; each one
    /// overrides `entry_limit` for its container
    pub container_limits: [Option<usize>; 5],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_bits: DEFAULT_BUCKET_BITS,
            report_capacity: DEFAULT_REPORT_CAPACITY,
            report_headroom: DEFAULT_REPORT_HEADROOM,
            max_index: Key::MAX,
            entry_limit: None,
            container_limits: [None; 5],
        }
    }
}

impl Config {
    /// Set the number of hash bucket bits.
    pub fn with_bucket_bits(mut self, bits: u32) -> Self {
        self.bucket_bits = bits;
        self
    }

    /// Set the report buffer capacity.
    pub fn with_report_capacity(mut self, capacity: usize) -> Self {
        self.report_capacity = capacity;
        self
    }

    /// Set the highest index the sparse stores accept.
    pub fn with_max_index(mut self, max_index: Key) -> Self {
        self.max_index = max_index;
        self
    }

    /// Cap the number of entries each container may hold.
    pub fn with_entry_limit(mut self, limit: usize) -> Self {
        self.entry_limit = Some(limit);
        self
    }

    /// Cap the number of entries one container may hold.
    pub fn with_container_limit(mut self, kind: ContainerKind, limit: usize) -> Self {
        self.container_limits[kind.index()] = Some(limit);
        self
    }

    /// Entry cap in effect for `kind`.
    pub fn limit_for(&self, kind: ContainerKind) -> Option<usize> {
        self.container_limits[kind.index()].or(self.entry_limit)
    }

    /// Number of hash buckets.
    pub fn bucket_count(&self) -> usize {
        1usize << self.bucket_bits
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.bucket_bits == 0 || self.bucket_bits > MAX_BUCKET_BITS {
            return Err(Error::configuration(format!(
                "bucket_bits must be in 1..={MAX_BUCKET_BITS}, got {}",
                self.bucket_bits
            )));
        }
        if self.report_headroom == 0 {
            return Err(Error::configuration("report_headroom must be at least 1"));
        }
        if self.report_capacity <= self.report_headroom {
            return Err(Error::configuration(format!(
                "report_capacity ({}) must exceed report_headroom ({})",
                self.report_capacity, self.report_headroom
            )));
        }
        Ok(())
    }
}
