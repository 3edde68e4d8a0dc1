use core::fmt::Debug;

use crate::error::Error;
use crate::error::Result;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::hash_table::UnallocatedBucket;
use crate::validation::KeyValidator;
use crate::validation::NonNegativeKeys;

/// Seed mixed into every key hash.
const HASH_SEED: u32 = 31 * 17;

/// Hashes a key to the 32-bit value cached with its entry.
///
/// The high and low halves of the key are folded together with XOR and the
/// result is offset by a fixed seed using wrapping arithmetic. Every map
/// operation goes through this function, so a key's bucket is the same for
/// insert, lookup and removal.
///
/// ```rust
/// # use long_map::hash_key;
/// #
/// assert_eq!(hash_key(0), 527);
/// assert_eq!(hash_key(1), 528);
/// // Keys whose halves cancel out share a hash.
/// assert_eq!(hash_key((7 << 32) | 7), hash_key(0));
/// ```
#[inline]
pub fn hash_key(key: i64) -> u32 {
    let bits = key as u64;
    HASH_SEED.wrapping_add((bits ^ (bits >> 32)) as u32)
}

/// A hash map from `i64` keys to values of type `V`.
///
/// `LongMap` stores `(key, value)` pairs in a chained [`HashTable`]. Every
/// key-bearing operation first asks the validation policy `P` whether the key
/// is acceptable and returns its [`InvalidKeyError`](crate::InvalidKeyError)
/// unchanged when it is not. The default policy, [`NonNegativeKeys`], rejects
/// negative keys.
///
/// The map is not synchronized; mutating operations take `&mut self`.
///
/// # Examples
///
/// ```rust
/// # use long_map::LongMap;
/// #
/// let mut map = LongMap::new();
/// map.put(1, "string1")?;
/// map.put(3, "string3")?;
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get(1)?, Some(&"string1"));
/// assert_eq!(map.get(2)?, None);
/// assert!(map.put(-1, "negative").is_err());
/// # Ok::<(), long_map::Error>(())
/// ```
#[derive(Clone)]
pub struct LongMap<V, P = NonNegativeKeys> {
    table: HashTable<(i64, V)>,
    validator: P,
}

impl<V, P> Debug for LongMap<V, P>
where
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V, P> PartialEq for LongMap<V, P>
where
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(key, value)| {
            other
                .table
                .find(hash_key(key), |(k, _)| *k == key)
                .is_some_and(|(_, v)| v == value)
        })
    }
}

impl<V, P> Eq for LongMap<V, P> where V: Eq {}

impl<V, P> LongMap<V, P>
where
    P: KeyValidator,
{
    /// Creates an empty map that checks keys with `validator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::{AnyKey, LongMap};
    /// #
    /// let mut map = LongMap::with_validator(AnyKey);
    /// map.put(-5, "accepted")?;
    /// assert_eq!(map.get(-5)?, Some(&"accepted"));
    /// # Ok::<(), long_map::Error>(())
    /// ```
    pub fn with_validator(validator: P) -> Self {
        Self::with_capacity_and_validator(0, validator)
    }

    /// Creates an empty map able to hold at least `capacity` entries without
    /// growing, checking keys with `validator`.
    pub fn with_capacity_and_validator(capacity: usize, validator: P) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            validator,
        }
    }

    fn validate(&self, key: i64) -> Result<()> {
        self.validator.validate(key).map_err(|err| {
            log::debug!("key {} rejected: {}", key, err.reason);
            Error::from(err)
        })
    }

    /// Stores `value` under `key` and returns a reference to the stored
    /// value.
    ///
    /// An existing value for `key` is always replaced, even when it compares
    /// equal to `value`. The map grows first if one more entry would bring it
    /// to its threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the validation policy rejects `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// assert_eq!(map.put(4, "string4")?, &mut "string4");
    ///
    /// *map.put(4, "x")? = "y";
    /// assert_eq!(map.get(4)?, Some(&"y"));
    /// assert_eq!(map.len(), 1);
    /// # Ok::<(), long_map::Error>(())
    /// ```
    pub fn put(&mut self, key: i64, value: V) -> Result<&mut V> {
        self.validate(key)?;
        let stored = match self.table.entry(hash_key(key), |(k, _)| *k == key) {
            TableEntry::Occupied(entry) => {
                let (_, stored) = entry.into_mut();
                *stored = value;
                stored
            }
            TableEntry::Vacant(entry) => &mut entry.insert((key, value)).1,
        };
        Ok(stored)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Returns `None` if the key was absent, or the replaced value if it was
    /// present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// assert_eq!(map.insert(37, "a")?, None);
    /// assert_eq!(map.insert(37, "b")?, Some("a"));
    /// assert_eq!(map.get(37)?, Some(&"b"));
    /// # Ok::<(), long_map::Error>(())
    /// ```
    pub fn insert(&mut self, key: i64, value: V) -> Result<Option<V>> {
        self.validate(key)?;
        match self.table.entry(hash_key(key), |(k, _)| *k == key) {
            TableEntry::Occupied(mut entry) => {
                let old_value = core::mem::replace(&mut entry.get_mut().1, value);
                Ok(Some(old_value))
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                Ok(None)
            }
        }
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// A missing key is `Ok(None)`, not an error.
    pub fn get(&self, key: i64) -> Result<Option<&V>> {
        self.validate(key)?;
        Ok(self
            .table
            .find(hash_key(key), |(k, _)| *k == key)
            .map(|(_, v)| v))
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// map.put(1, 10)?;
    /// if let Some(x) = map.get_mut(1)? {
    ///     *x += 1;
    /// }
    /// assert_eq!(map.get(1)?, Some(&11));
    /// # Ok::<(), long_map::Error>(())
    /// ```
    pub fn get_mut(&mut self, key: i64) -> Result<Option<&mut V>> {
        self.validate(key)?;
        Ok(self
            .table
            .find_mut(hash_key(key), |(k, _)| *k == key)
            .map(|(_, v)| v))
    }

    /// Returns `true` if the map contains a value for `key`.
    pub fn contains_key(&self, key: i64) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Removes `key` from the map, returning its value if it was present.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidKey`] if the validation policy rejects `key`.
    /// - [`Error::NoSuchBucket`] if no bucket was ever allocated at the slot
    ///   `key` hashes to. If the bucket exists but does not hold `key`, the
    ///   result is `Ok(None)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::{Error, LongMap};
    /// #
    /// let mut map = LongMap::new();
    /// map.put(1, "a")?;
    /// map.put(2, "b")?;
    ///
    /// assert_eq!(map.remove(1)?, Some("a"));
    /// assert_eq!(map.remove(1)?, None);
    /// assert!(matches!(map.remove(3), Err(Error::NoSuchBucket { key: 3, .. })));
    /// # Ok::<(), long_map::Error>(())
    /// ```
    pub fn remove(&mut self, key: i64) -> Result<Option<V>> {
        Ok(self.remove_entry(key)?.map(|(_, v)| v))
    }

    /// Removes `key` from the map, returning the stored key and value if it
    /// was present. Fails the same way as [`remove`](Self::remove).
    pub fn remove_entry(&mut self, key: i64) -> Result<Option<(i64, V)>> {
        self.validate(key)?;
        self.table
            .remove(hash_key(key), |(k, _)| *k == key)
            .map_err(|UnallocatedBucket { index }| {
                log::debug!("remove of key {} found no bucket at index {}", key, index);
                Error::NoSuchBucket { key, index }
            })
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// If one more entry would bring the map to its threshold, the map grows
    /// before the key is located, even when the entry turns out to be
    /// occupied.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// *map.entry(7)?.or_insert(0) += 1;
    /// *map.entry(7)?.or_insert(0) += 1;
    /// assert_eq!(map.get(7)?, Some(&2));
    /// # Ok::<(), long_map::Error>(())
    /// ```
    pub fn entry(&mut self, key: i64) -> Result<Entry<'_, V>> {
        self.validate(key)?;
        Ok(match self.table.entry(hash_key(key), |(k, _)| *k == key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        })
    }

    /// Inserts every pair from `iter`, stopping at the first key the
    /// validation policy rejects. Pairs before the rejected one stay
    /// inserted.
    ///
    /// Room for the iterator's lower size bound is reserved only once the
    /// first key has been accepted, so a rejected first key leaves the map
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// assert!(map.try_extend([(1, "a"), (-2, "b"), (3, "c")]).is_err());
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn try_extend<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = (i64, V)>,
    {
        let mut iter = iter.into_iter();
        let Some((key, value)) = iter.next() else {
            return Ok(());
        };
        self.validate(key)?;
        let (lower, _) = iter.size_hint();
        self.reserve(lower.saturating_add(1));
        self.put(key, value)?;
        for (key, value) in iter {
            self.put(key, value)?;
        }
        Ok(())
    }
}

impl<V, P> LongMap<V, P> {
    /// Returns the validation policy.
    pub fn validator(&self) -> &P {
        &self.validator
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of bucket slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the entry count at which the next insert grows the map.
    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    /// Removes all entries. The number of bucket slots is preserved.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// map.put(1, "a")?;
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert!(!map.contains_key(1)?);
    /// # Ok::<(), long_map::Error>(())
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Shrinks the bucket array as much as possible, never below 16 slots.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Returns `true` if any entry holds a value equal to `value`.
    ///
    /// This scans every entry. With `V = Option<T>`, looking up `&None`
    /// matches only entries that store `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// map.put(1, Some("string1"))?;
    ///
    /// assert!(map.contains_value(&Some("string1")));
    /// assert!(!map.contains_value(&None));
    /// # Ok::<(), long_map::Error>(())
    /// ```
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Returns an iterator over the entries, bucket by bucket.
    ///
    /// The order is unspecified and may change after any mutation.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the entries with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys.
    ///
    /// [`values`](Self::values) enumerates in the same order as long as the
    /// map is not modified in between.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::LongMap;
    /// #
    /// let mut map = LongMap::new();
    /// map.put(1, "one")?;
    /// map.put(2, "two")?;
    ///
    /// let keys: Vec<i64> = map.keys().collect();
    /// let values: Vec<&str> = map.values().copied().collect();
    /// assert_eq!(keys, [1, 2]);
    /// assert_eq!(values, ["one", "two"]);
    /// # Ok::<(), long_map::Error>(())
    /// ```
    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns an iterator that removes and yields every entry.
    ///
    /// After calling `drain()`, the map will be empty.
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns bucket utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }

    /// Counts allocated buckets by chain length.
    #[cfg(any(test, feature = "stats"))]
    pub fn bucket_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.bucket_histogram()
    }

    /// Pretty-prints the chain-length histogram using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_bucket_histogram(&self) {
        self.table.print_bucket_histogram();
    }
}

#[cfg(test)]
impl<V, P> LongMap<V, P> {
    /// Panics if any table invariant is broken, including stale cached hashes.
    pub(crate) fn validate_table(&self) {
        self.table.validate(|(key, _)| hash_key(*key));
    }

    pub(crate) fn is_bucket_allocated(&self, key: i64) -> bool {
        self.table.is_allocated(hash_key(key))
    }
}

impl<V> LongMap<V, NonNegativeKeys> {
    /// Creates an empty map that rejects negative keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::LongMap;
    /// #
    /// let map: LongMap<String> = LongMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 16);
    /// ```
    pub fn new() -> Self {
        Self::with_validator(NonNegativeKeys)
    }

    /// Creates an empty map that rejects negative keys and can hold at least
    /// `capacity` entries without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_validator(capacity, NonNegativeKeys)
    }
}

impl<V, P> Default for LongMap<V, P>
where
    P: KeyValidator + Default,
{
    fn default() -> Self {
        Self::with_validator(P::default())
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`LongMap`].
///
/// [`entry`]: LongMap::entry
pub enum Entry<'a, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Like [`or_insert_with`](Self::or_insert_with), passing the key to the
    /// closure.
    pub fn or_insert_with_key<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce(i64) -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let value = default(entry.key);
                entry.insert(value)
            }
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns this entry's key.
    pub fn key(&self) -> i64 {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, V> Entry<'a, V>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, V> {
    entry: crate::hash_table::VacantEntry<'a, (i64, V)>,
    key: i64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Gets the key that would be used when inserting a value.
    pub fn key(&self) -> i64 {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (i64, V)>,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets the key in the entry.
    pub fn key(&self) -> i64 {
        self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (i64, V) {
        self.entry.remove()
    }
}

/// An iterator over the entries of a `LongMap`.
pub struct Iter<'a, V> {
    inner: crate::hash_table::Iter<'a, (i64, V)>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (i64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// An iterator over the entries of a `LongMap` with mutable values.
pub struct IterMut<'a, V> {
    inner: crate::hash_table::IterMut<'a, (i64, V)>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (i64, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// An iterator over the keys of a `LongMap`.
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}

/// An iterator over the values of a `LongMap`.
pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}

/// A mutable iterator over the values of a `LongMap`.
pub struct ValuesMut<'a, V> {
    inner: IterMut<'a, V>,
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for ValuesMut<'_, V> {}

/// A draining iterator over the entries of a `LongMap`.
pub struct Drain<'a, V> {
    inner: crate::hash_table::Drain<'a, (i64, V)>,
}

impl<'a, V> Iterator for Drain<'a, V> {
    type Item = (i64, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}
