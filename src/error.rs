use thiserror::Error;

/// Contract violations reported by the tables.
///
/// Every variant describes bad input from the caller; nothing is retried or
/// corrected internally, and the table is left exactly as it was before the
/// failing call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The key is one of the table's reserved sentinels, or is negative for a
    /// table that only accepts non-negative keys.
    #[error("illegal key: {key}")]
    IllegalKey {
        /// The rejected key.
        key: i64,
    },
    /// A requested or computed slot count is zero or exceeds the maximum.
    #[error("illegal capacity {requested}: must be in 1..={max}")]
    IllegalCapacity {
        /// Slot count that was asked for.
        requested: usize,
        /// Largest slot count the table supports.
        max: usize,
    },
    /// A table holding non-negative counts was given, or would have reached,
    /// a negative value.
    #[error("value cannot be negative: {value}")]
    NegativeValue {
        /// The offending value.
        value: i64,
    },
    /// A count would have grown past `i32::MAX`.
    #[error("value overflows i32: {value}")]
    ValueOverflow {
        /// The result that did not fit.
        value: i64,
    },
    /// A table that only grows when told to has reached its threshold and
    /// cannot take another key.
    #[error("table is full at {capacity} slots and must be expanded by the caller")]
    TableFull {
        /// Slot count of the full table.
        capacity: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
