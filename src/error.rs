//! Error types for [`LongMap`](crate::LongMap) operations.

use alloc::borrow::Cow;

use thiserror::Error;

/// Result type alias for fallible map operations.
pub type Result<T> = core::result::Result<T, Error>;

/// A key was rejected by the map's [`KeyValidator`](crate::KeyValidator).
///
/// Validators construct this directly; the map forwards it to the caller
/// without inspecting it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid key {key}: {reason}")]
pub struct InvalidKeyError {
    /// The rejected key.
    pub key: i64,
    /// Why the validator rejected the key.
    pub reason: Cow<'static, str>,
}

impl InvalidKeyError {
    /// Creates a new error for `key` with the given reason.
    pub fn new(key: i64, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            key,
            reason: reason.into(),
        }
    }
}

/// Errors produced by key-bearing map operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The validation policy rejected the key.
    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyError),

    /// `remove` targeted a bucket slot that has no bucket allocated, so the
    /// key is definitely absent.
    #[error("no bucket allocated at index {index} for key {key}")]
    NoSuchBucket {
        /// The key passed to `remove`.
        key: i64,
        /// The bucket index the key hashes to.
        index: usize,
    },
}

impl Error {
    /// Returns `true` if this error came from the validation policy.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Error::InvalidKey(_))
    }

    /// Returns `true` if this error reports an unallocated bucket.
    pub fn is_no_such_bucket(&self) -> bool {
        matches!(self, Error::NoSuchBucket { .. })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_invalid_key_display() {
        let err = InvalidKeyError::new(-3, "key cannot be negative");
        assert_eq!(err.to_string(), "invalid key -3: key cannot be negative");

        let wrapped: Error = err.clone().into();
        assert_eq!(wrapped.to_string(), err.to_string());
        assert!(wrapped.is_invalid_key());
        assert!(!wrapped.is_no_such_bucket());
    }

    #[test]
    fn test_no_such_bucket_display() {
        let err = Error::NoSuchBucket { key: 2, index: 9 };
        assert_eq!(
            err.to_string(),
            "no bucket allocated at index 9 for key 2"
        );
        assert!(err.is_no_such_bucket());
    }
}
