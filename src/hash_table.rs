//! A chained hash table with lazily allocated buckets.
//!
//! [`HashTable`] stores values of type `T` in an array of bucket slots. Each
//! slot is either absent or holds an ordered sequence of values whose cached
//! 32-bit hash maps to that slot. The table does not know how values are
//! keyed: every lookup takes the hash and an equality predicate, and the
//! caller is responsible for hashing consistently.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::marker::PhantomData;

/// Number of bucket slots in a freshly created table.
const MIN_BUCKETS: usize = 16;

/// Entry count at which a table with `buckets` slots grows (0.75 load).
///
/// Bucket counts are always powers of two no smaller than `MIN_BUCKETS`, so
/// this is exact.
#[inline(always)]
fn load_threshold(buckets: usize) -> usize {
    buckets / 4 * 3
}

/// Smallest bucket count able to hold `entries` values without growing.
fn buckets_for(entries: usize) -> usize {
    let mut buckets = MIN_BUCKETS;
    while load_threshold(buckets) <= entries {
        buckets = buckets.checked_mul(2).expect("capacity overflow");
    }
    buckets
}

fn empty_buckets<T>(count: usize) -> Vec<Bucket<T>> {
    let mut buckets = Vec::with_capacity(count);
    buckets.resize_with(count, || None);
    buckets
}

#[derive(Clone)]
struct Slot<T> {
    hash: u32,
    value: T,
}

/// A bucket slot: absent until the first insert into it, and never
/// deallocated by removals.
type Bucket<T> = Option<Vec<Slot<T>>>;

/// Returned by [`HashTable::remove`] when the bucket slot for the hash has no
/// bucket allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnallocatedBucket {
    /// Index of the absent bucket slot.
    pub index: usize,
}

/// Debug statistics for bucket chain analysis.
///
/// Compiled only for tests or with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of values currently in the table
    pub populated: usize,
    /// Number of bucket slots
    pub capacity: usize,
    /// Entry count that triggers the next growth
    pub threshold: usize,
    /// Bucket slots with a bucket allocated
    pub allocated_buckets: usize,
    /// Allocated buckets that currently hold no values
    pub empty_buckets: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
}

#[cfg(any(test, feature = "stats"))]
cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        impl DebugStats {
            /// Pretty-print the debug statistics.
            pub fn print(&self) {
                println!("=== Hash Table Debug Statistics ===");
                println!(
                    "Population: {}/{} buckets ({:.2}% load factor, grows at {})",
                    self.populated,
                    self.capacity,
                    self.load_factor * 100.0,
                    self.threshold
                );
                println!(
                    "Buckets: {} allocated, {} empty, longest chain {}",
                    self.allocated_buckets, self.empty_buckets, self.longest_chain
                );
            }
        }
    } else {
        impl DebugStats {
            /// Emit the debug statistics through the `log` facade.
            pub fn print(&self) {
                log::info!(
                    "populated={} capacity={} threshold={} allocated={} empty={} longest_chain={}",
                    self.populated,
                    self.capacity,
                    self.threshold,
                    self.allocated_buckets,
                    self.empty_buckets,
                    self.longest_chain
                );
            }
        }
    }
}

/// A chained hash table.
///
/// The table starts with 16 bucket slots and doubles whenever an insert would
/// bring the number of values to three quarters of the slot count. Growth
/// moves every value by its cached hash; values are never re-hashed or
/// compared while moving.
///
/// # Invariants
///
/// - Every value lives in the slot `hash % capacity()`.
/// - `len()` equals the total number of values across all buckets.
/// - `len() < threshold()` after every insert.
#[derive(Clone)]
pub struct HashTable<T> {
    buckets: Vec<Bucket<T>>,
    threshold: usize,
    populated: usize,
}

impl<T> Debug for HashTable<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for HashTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HashTable<T> {
    /// Creates an empty table with 16 bucket slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::new();
    /// assert_eq!(table.capacity(), 16);
    /// assert_eq!(table.threshold(), 12);
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty table able to hold at least `capacity` values without
    /// growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::with_capacity(100);
    /// assert!(table.threshold() > 100);
    /// assert!(table.capacity().is_power_of_two());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let count = buckets_for(capacity);
        Self {
            buckets: empty_buckets(count),
            threshold: load_threshold(count),
            populated: 0,
        }
    }

    #[inline(always)]
    fn index_of(&self, hash: u32) -> usize {
        // Bucket counts are powers of two, so masking is `hash % capacity`.
        hash as usize & (self.buckets.len() - 1)
    }

    /// Returns the number of values in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no values.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of bucket slots.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the value count at which the next insert grows the table.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns `true` if the slot for `hash` has a bucket allocated.
    pub fn is_allocated(&self, hash: u32) -> bool {
        self.buckets[self.index_of(hash)].is_some()
    }

    /// Returns the slot index `hash` maps to under the current capacity.
    pub fn bucket_index(&self, hash: u32) -> usize {
        self.index_of(hash)
    }

    /// Finds a value by hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(7, |&v: &u64| v == 7).or_insert(7);
    ///
    /// assert_eq!(table.find(7, |&v| v == 7), Some(&7));
    /// assert_eq!(table.find(8, |&v| v == 8), None);
    /// ```
    pub fn find(&self, hash: u32, eq: impl Fn(&T) -> bool) -> Option<&T> {
        self.buckets[self.index_of(hash)]
            .as_deref()?
            .iter()
            .find(|slot| slot.hash == hash && eq(&slot.value))
            .map(|slot| &slot.value)
    }

    /// Finds a value by hash and equality predicate, returning a mutable
    /// reference.
    pub fn find_mut(&mut self, hash: u32, eq: impl Fn(&T) -> bool) -> Option<&mut T> {
        let index = self.index_of(hash);
        self.buckets[index]
            .as_deref_mut()?
            .iter_mut()
            .find(|slot| slot.hash == hash && eq(&slot.value))
            .map(|slot| &mut slot.value)
    }

    /// Gets the entry for `hash`/`eq` for in-place manipulation.
    ///
    /// If inserting one more value would bring the table to its threshold, the
    /// table grows before the bucket is located, whether or not the entry
    /// turns out to be vacant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::hash_table::{Entry, HashTable};
    /// #
    /// let mut table = HashTable::new();
    /// match table.entry(1, |&v: &u64| v == 1) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert(1);
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    /// assert_eq!(table.len(), 1);
    /// assert!(matches!(table.entry(1, |&v| v == 1), Entry::Occupied(_)));
    /// ```
    pub fn entry(&mut self, hash: u32, eq: impl Fn(&T) -> bool) -> Entry<'_, T> {
        if self.populated + 1 >= self.threshold {
            self.grow();
        }

        let index = self.index_of(hash);
        let HashTable {
            buckets, populated, ..
        } = self;
        let slot = &mut buckets[index];

        let position = slot
            .as_deref()
            .and_then(|bucket| bucket.iter().position(|s| s.hash == hash && eq(&s.value)));

        if let Some(index) = position {
            if let Some(bucket) = slot {
                return Entry::Occupied(OccupiedEntry {
                    bucket,
                    index,
                    populated,
                });
            }
        }

        Entry::Vacant(VacantEntry {
            slot,
            hash,
            populated,
        })
    }

    /// Removes a value by hash and equality predicate.
    ///
    /// Returns `Err` if the slot for `hash` has no bucket allocated, and
    /// `Ok(None)` if the bucket exists but holds no matching value. Values
    /// after the removed one keep their order within the bucket.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(3, |&v: &u64| v == 3).or_insert(3);
    ///
    /// assert_eq!(table.remove(3, |&v| v == 3), Ok(Some(3)));
    /// assert_eq!(table.remove(3, |&v| v == 3), Ok(None));
    /// assert!(table.remove(4, |&v| v == 4).is_err());
    /// ```
    pub fn remove(
        &mut self,
        hash: u32,
        eq: impl Fn(&T) -> bool,
    ) -> Result<Option<T>, UnallocatedBucket> {
        let index = self.index_of(hash);
        let Some(bucket) = self.buckets[index].as_mut() else {
            return Err(UnallocatedBucket { index });
        };

        match bucket
            .iter()
            .position(|slot| slot.hash == hash && eq(&slot.value))
        {
            Some(position) => {
                self.populated -= 1;
                Ok(Some(bucket.remove(position).value))
            }
            None => Ok(None),
        }
    }

    /// Removes all values, leaving every bucket slot absent.
    ///
    /// The number of bucket slots is preserved.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for n in 0..20u64 {
    ///     table.entry(n as u32, |&v| v == n).or_insert(n);
    /// }
    /// let capacity = table.capacity();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|bucket| *bucket = None);
        self.populated = 0;
    }

    /// Reserves room for at least `additional` more values without growing.
    pub fn reserve(&mut self, additional: usize) {
        let needed = self
            .populated
            .checked_add(additional)
            .expect("capacity overflow");
        let count = buckets_for(needed);
        if count > self.buckets.len() {
            self.rehash(count);
        }
    }

    /// Shrinks the bucket array to the smallest size that holds the current
    /// values, never below 16 slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::with_capacity(1000);
    /// table.entry(1, |&v| v == 1).or_insert(1);
    ///
    /// table.shrink_to_fit();
    /// assert_eq!(table.capacity(), 16);
    /// assert_eq!(table.find(1, |&v| v == 1), Some(&1));
    /// ```
    pub fn shrink_to_fit(&mut self) {
        let count = buckets_for(self.populated);
        if count < self.buckets.len() {
            self.rehash(count);
        }
    }

    fn grow(&mut self) {
        let count = self
            .buckets
            .len()
            .checked_mul(2)
            .expect("capacity overflow");
        self.rehash(count);
    }

    /// Moves every value into a fresh array of `count` bucket slots.
    ///
    /// Placement uses each value's cached hash only; no predicate runs and no
    /// threshold is checked while moving.
    fn rehash(&mut self, count: usize) {
        log::trace!(
            "rehashing {} values from {} to {} buckets",
            self.populated,
            self.buckets.len(),
            count
        );

        let old = core::mem::replace(&mut self.buckets, empty_buckets(count));
        let mask = count - 1;
        for slot in old.into_iter().flatten().flatten() {
            self.buckets[slot.hash as usize & mask]
                .get_or_insert_with(Vec::new)
                .push(slot);
        }
        self.threshold = load_threshold(count);

        debug_assert_eq!(
            self.populated,
            self.buckets.iter().flatten().map(Vec::len).sum::<usize>()
        );
    }

    /// Returns an iterator over the values, bucket by bucket and in bucket
    /// order within each.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(2, |&v: &u64| v == 2).or_insert(2);
    /// table.entry(1, |&v: &u64| v == 1).or_insert(1);
    ///
    /// let values: Vec<_> = table.iter().copied().collect();
    /// assert_eq!(values, vec![1, 2]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buckets: self.buckets.iter(),
            current: Default::default(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator yielding mutable references to the values in the
    /// same order as [`iter`](Self::iter).
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            buckets: self.buckets.iter_mut(),
            current: Default::default(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator that removes and yields every value.
    ///
    /// Every bucket slot is absent afterwards. Values not consumed before the
    /// iterator is dropped are dropped with it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use long_map::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(1, |&v: &u64| v == 1).or_insert(1);
    /// table.entry(2, |&v: &u64| v == 2).or_insert(2);
    ///
    /// let drained: Vec<u64> = table.drain().collect();
    /// assert_eq!(drained.len(), 2);
    /// assert!(table.is_empty());
    /// assert!(!table.is_allocated(1));
    /// ```
    pub fn drain(&mut self) -> Drain<'_, T> {
        let count = self.buckets.len();
        let buckets = core::mem::replace(&mut self.buckets, empty_buckets(count));
        let remaining = core::mem::take(&mut self.populated);
        Drain {
            buckets: buckets.into_iter(),
            current: Vec::new().into_iter(),
            remaining,
            marker: PhantomData,
        }
    }

    /// Counts allocated buckets by chain length.
    ///
    /// Index `n` of the result holds the number of allocated buckets with
    /// exactly `n` values. Absent slots are not counted.
    ///
    /// Compiled only for tests or with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn bucket_histogram(&self) -> Vec<usize> {
        let mut hist = alloc::vec![0usize; 1];
        for bucket in self.buckets.iter().flatten() {
            if bucket.len() >= hist.len() {
                hist.resize(bucket.len() + 1, 0);
            }
            hist[bucket.len()] += 1;
        }
        hist
    }

    /// Returns bucket utilization statistics for debugging.
    ///
    /// Compiled only for tests or with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.bucket_histogram();
        DebugStats {
            populated: self.populated,
            capacity: self.buckets.len(),
            threshold: self.threshold,
            allocated_buckets: hist.iter().sum(),
            empty_buckets: hist[0],
            longest_chain: hist.len() - 1,
            load_factor: self.populated as f64 / self.buckets.len() as f64,
        }
    }

    /// Pretty-prints the chain-length histogram using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_bucket_histogram(&self) {
        let hist = self.bucket_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("bucket histogram: no buckets allocated");
            return;
        }

        let max_bar = 60usize;
        println!("bucket histogram ({} values):", self.populated);
        for (len, count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {:<60} {}", len, "#".repeat(width), count);
        }
    }
}

#[cfg(test)]
impl<T> HashTable<T> {
    /// Panics if any table invariant is broken. `hash_of` recomputes a value's
    /// hash so the cached copy can be checked.
    pub(crate) fn validate(&self, hash_of: impl Fn(&T) -> u32) {
        let mask = self.buckets.len() - 1;
        let mut counted = 0;
        for (index, bucket) in self.buckets.iter().enumerate() {
            for slot in bucket.iter().flatten() {
                assert_eq!(slot.hash, hash_of(&slot.value), "stale cached hash");
                assert_eq!(
                    slot.hash as usize & mask,
                    index,
                    "value stored outside its hash bucket"
                );
                counted += 1;
            }
        }
        assert_eq!(counted, self.populated, "populated count drifted");
        assert!(self.buckets.len().is_power_of_two() && self.buckets.len() >= MIN_BUCKETS);
        assert_eq!(self.threshold, load_threshold(self.buckets.len()));
        assert!(self.populated < self.threshold || self.populated == 0);
    }
}

/// A view into a single entry in the table, which may either be vacant or
/// occupied.
///
/// This enum is constructed from [`HashTable::entry`].
pub enum Entry<'a, T> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, T>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, T>),
}

impl<'a, T> Entry<'a, T> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the stored value.
    pub fn or_insert(self, default: T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the stored value.
    pub fn or_insert_with(self, default: impl FnOnce() -> T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to the value if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut T)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }
}

impl<'a, T> Entry<'a, T>
where
    T: Default,
{
    /// Inserts `T::default()` if the entry is vacant and returns a mutable
    /// reference to the stored value.
    pub fn or_default(self) -> &'a mut T {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in a [`HashTable`].
pub struct VacantEntry<'a, T> {
    slot: &'a mut Bucket<T>,
    hash: u32,
    populated: &'a mut usize,
}

impl<'a, T> VacantEntry<'a, T> {
    /// Appends `value` to its bucket, allocating the bucket if the slot is
    /// absent, and returns a mutable reference to it.
    pub fn insert(self, value: T) -> &'a mut T {
        let VacantEntry {
            slot,
            hash,
            populated,
        } = self;

        *populated += 1;
        let bucket = slot.get_or_insert_with(Vec::new);
        bucket.push(Slot { hash, value });
        let last = bucket.len() - 1;
        &mut bucket[last].value
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, T> {
    bucket: &'a mut Vec<Slot<T>>,
    index: usize,
    populated: &'a mut usize,
}

impl<'a, T> OccupiedEntry<'a, T> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &T {
        &self.bucket[self.index].value
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.bucket[self.index].value
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut T {
        let OccupiedEntry { bucket, index, .. } = self;
        &mut bucket[index].value
    }

    /// Replaces the value in the entry, returning the old one.
    pub fn insert(&mut self, value: T) -> T {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the value from the table. The bucket itself stays allocated.
    pub fn remove(self) -> T {
        *self.populated -= 1;
        self.bucket.remove(self.index).value
    }
}

/// An iterator over the values of a [`HashTable`].
pub struct Iter<'a, T> {
    buckets: core::slice::Iter<'a, Bucket<T>>,
    current: core::slice::Iter<'a, Slot<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.current.next() {
                self.remaining -= 1;
                return Some(&slot.value);
            }
            if let Some(bucket) = self.buckets.next()? {
                self.current = bucket.iter();
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// A mutable iterator over the values of a [`HashTable`].
pub struct IterMut<'a, T> {
    buckets: core::slice::IterMut<'a, Bucket<T>>,
    current: core::slice::IterMut<'a, Slot<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.current.next() {
                self.remaining -= 1;
                return Some(&mut slot.value);
            }
            if let Some(bucket) = self.buckets.next()? {
                self.current = bucket.iter_mut();
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// A draining iterator over the values of a [`HashTable`].
///
/// The table is emptied when the iterator is created. Values not yielded are
/// dropped with the iterator, or leaked with it if it is forgotten.
pub struct Drain<'a, T> {
    buckets: alloc::vec::IntoIter<Bucket<T>>,
    current: alloc::vec::IntoIter<Slot<T>>,
    remaining: usize,
    marker: PhantomData<&'a mut HashTable<T>>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.current.next() {
                self.remaining -= 1;
                return Some(slot.value);
            }
            if let Some(slots) = self.buckets.next()? {
                self.current = slots.into_iter();
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Drain<'_, T> {}

impl<T> FusedIterator for Drain<'_, T> {}
