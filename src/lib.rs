#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Error types returned by key-bearing map operations.
pub mod error;

/// The chained hash table backing `LongMap`.
///
/// `HashTable` is generic over its values: callers supply the hash and the
/// equality check, the table owns bucket allocation and growth.
pub mod hash_table;

/// A hash map specialized for `i64` keys.
///
/// This module provides `LongMap`, which wraps the chained `HashTable` and
/// checks every key against a pluggable validation policy.
pub mod long_map;

/// Key validation policies.
///
/// This module provides the `KeyValidator` capability the map calls before
/// every key-bearing operation, and the policies shipped with the crate.
pub mod validation;

#[cfg(test)]
mod proptests;

pub use error::Error;
pub use error::InvalidKeyError;
pub use error::Result;
pub use hash_table::HashTable;
pub use long_map::Entry;
pub use long_map::LongMap;
pub use long_map::hash_key;
pub use validation::AnyKey;
pub use validation::KeyValidator;
pub use validation::NonNegativeKeys;
