//! Error handling for the container engine.

use thiserror::Error;

use crate::container::{ContainerKind, Key};
use crate::datas::State;

/// Why a sparse store refused a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFault {
    /// The index is above the store's configured limit.
    OutOfRange {
        /// Highest index the store accepts
        max_index: Key,
    },
    /// The store does not replace values and the index is already taken.
    Occupied,
}

impl std::fmt::Display for StoreFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreFault::OutOfRange { max_index } => write!(f, "index above limit {max_index}"),
            StoreFault::Occupied => f.write_str("slot already occupied"),
        }
    }
}

/// Why a token of the integer list could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseReason {
    /// Sign or radix prefix with no digits after it.
    NoDigits,
    /// A character that is not a digit of the detected radix.
    InvalidDigit,
    /// The number does not fit a 32-bit signed integer.
    OutOfRange,
}

impl std::fmt::Display for ParseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ParseReason::NoDigits => "no digits",
            ParseReason::InvalidDigit => "invalid digit",
            ParseReason::OutOfRange => "out of range for i32",
        })
    }
}

/// Main error type of the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A container could not allocate room for a new entry.
    #[error("allocation failed in {container}")]
    AllocationFailure {
        /// Container that refused the entry
        container: ContainerKind,
    },

    /// A token of the comma-separated input is not an integer.
    #[error("cannot parse token {position} ({token:?}): {reason}")]
    Parse {
        /// Zero-based position of the token among non-empty tokens
        position: usize,
        /// The offending token
        token: String,
        /// What was wrong with it
        reason: ParseReason,
    },

    /// A sparse store rejected a write for a reason other than memory.
    #[error("{container} rejected index {index}: {fault}")]
    StoreConsistency {
        /// Store that rejected the write
        container: ContainerKind,
        /// Index of the write
        index: Key,
        /// Reason
        fault: StoreFault,
    },

    /// Operation not valid in the controller's current state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// State the controller was in
        state: State,
    },

    /// Caller's buffer cannot hold the report.
    #[error("buffer too small: need {needed} bytes, got {available}")]
    BufferTooSmall {
        /// Bytes the report needs, terminator included
        needed: usize,
        /// Bytes the caller offered
        available: usize,
    },

    /// Rejected configuration value.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// What is wrong
        message: String,
    },
}

impl Error {
    /// Create an allocation failure error
    pub fn allocation(container: ContainerKind) -> Self {
        Self::AllocationFailure { container }
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(position: usize, token: S, reason: ParseReason) -> Self {
        Self::Parse {
            position,
            token: token.into(),
            reason,
        }
    }

    /// Create a store consistency error
    pub fn store(container: ContainerKind, index: Key, fault: StoreFault) -> Self {
        Self::StoreConsistency {
            container,
            index,
            fault,
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(operation: &'static str, state: State) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error came from running out of memory or quota.
    pub fn is_allocation(&self) -> bool {
        matches!(self, Self::AllocationFailure { .. })
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
