use crate::error::InvalidKeyError;

/// A policy deciding which keys a [`LongMap`](crate::LongMap) accepts.
///
/// The map calls [`validate`](KeyValidator::validate) before every
/// key-bearing operation and returns the error unchanged if it fails. The map
/// never assumes anything about the rule itself.
///
/// Any `Fn(i64) -> Result<(), InvalidKeyError>` closure is a validator:
///
/// ```rust
/// # use long_map::{InvalidKeyError, LongMap};
/// #
/// let even_only = |key: i64| {
///     if key % 2 == 0 {
///         Ok(())
///     } else {
///         Err(InvalidKeyError::new(key, "key must be even"))
///     }
/// };
///
/// let mut map = LongMap::with_validator(even_only);
/// assert!(map.put(2, "two").is_ok());
/// assert!(map.put(3, "three").is_err());
/// ```
pub trait KeyValidator {
    /// Checks `key`, returning an error if the map must not accept it.
    fn validate(&self, key: i64) -> Result<(), InvalidKeyError>;
}

impl<F> KeyValidator for F
where
    F: Fn(i64) -> Result<(), InvalidKeyError>,
{
    fn validate(&self, key: i64) -> Result<(), InvalidKeyError> {
        self(key)
    }
}

/// The reference policy: rejects negative keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NonNegativeKeys;

impl KeyValidator for NonNegativeKeys {
    fn validate(&self, key: i64) -> Result<(), InvalidKeyError> {
        if key < 0 {
            return Err(InvalidKeyError::new(key, "key cannot be negative"));
        }
        Ok(())
    }
}

/// Accepts every key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnyKey;

impl KeyValidator for AnyKey {
    #[inline(always)]
    fn validate(&self, _key: i64) -> Result<(), InvalidKeyError> {
        Ok(())
    }
}
