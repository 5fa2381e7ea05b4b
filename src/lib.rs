#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod hash;
mod int_slots;
mod long_slots;
mod object_slots;
mod raw_table;
mod uint_slots;

/// Error type shared by every table.
pub mod error;

pub mod packed;

pub mod value;

/// A set that returns the canonical stored instance of a key.
pub mod lookup_set;

/// Maps from hashable keys to numeric values, with counting operations.
pub mod value_map;

/// Maps from hashable keys to non-negative counts.
pub mod uint_value_map;

/// Frequency counting over hashable items.
pub mod histogram;

pub mod uint_map;

/// Maps keyed by any `i32` except `i32::MIN`, optionally grown only on
/// request.
pub mod int_map;

pub mod long_uint_map;

pub mod trie;

pub use error::Error;
pub use error::Result;
pub use hash::DEFAULT_CAPACITY;
pub use hash::MAX_CAPACITY;
pub use histogram::Histogram;
pub use int_map::IntMap;
pub use long_uint_map::LongUIntMap;
pub use lookup_set::LookupSet;
pub use packed::IntFloatMap;
pub use packed::IntIntMap;
pub use packed::PackedMap;
#[cfg(feature = "stats")]
pub use raw_table::ProbeStats;
pub use trie::Trie;
pub use uint_map::UIntIntMap;
pub use uint_map::UIntMap;
pub use uint_map::UIntSet;
pub use uint_value_map::UIntValueMap;
pub use value::Numeric;
pub use value::PackedValue;
pub use value_map::CountSet;
pub use value_map::DoubleValueMap;
pub use value_map::FloatValueMap;
pub use value_map::IntValueMap;
pub use value_map::ValueMap;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hasher builder used by the object-keyed tables when none is given.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hasher builder used by the object-keyed tables when none is given.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder when neither `foldhash` nor `std` is enabled. It
        /// cannot be constructed, so object-keyed tables must be built with
        /// an explicit hasher builder.
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}
