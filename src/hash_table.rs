use alloc::alloc::handle_alloc_error;
use alloc::boxed::Box;
#[cfg(any(test, feature = "stats"))]
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem::MaybeUninit;

use crate::hashing::DefaultKeyHasher;
use crate::hashing::KeyEq;
use crate::hashing::KeyHasher;
use crate::hashing::StdEq;

/// Hash value marking an empty slot. Real hashes are remapped away from it.
const EMPTY: u32 = 0;

/// Capacity used by [`RobinHoodTable::new`].
const DEFAULT_CAPACITY: usize = 16;

/// Maximum number of entries a table of `capacity` slots holds before it
/// grows, i.e. a load factor of 0.85.
#[inline(always)]
fn max_load(capacity: usize) -> usize {
    ((capacity as u128 * 85) / 100) as usize
}

/// Circular distance from the ideal index of `hash` forward to `index`.
#[inline(always)]
fn probe_distance(hash: u32, index: usize, mask: usize) -> usize {
    index.wrapping_sub(hash as usize & mask) & mask
}

/// One cell of the open-addressed array.
///
/// `hash == EMPTY` is the only thing that marks a slot as vacant; `entry` is
/// initialized exactly while `hash != EMPTY`. An all-zero bit pattern is a
/// valid empty slot, which lets the array come straight from a zeroed
/// allocation.
struct Slot<K, V> {
    hash: u32,
    entry: MaybeUninit<(K, V)>,
}

impl<K, V> Slot<K, V> {
    #[inline(always)]
    fn is_occupied(&self) -> bool {
        self.hash != EMPTY
    }

    /// # Safety
    ///
    /// The slot must be occupied.
    #[inline(always)]
    unsafe fn entry(&self) -> &(K, V) {
        debug_assert!(self.is_occupied());
        // SAFETY: Caller guarantees the slot is occupied, so `entry` is
        // initialized.
        unsafe { self.entry.assume_init_ref() }
    }

    /// # Safety
    ///
    /// The slot must be occupied.
    #[inline(always)]
    unsafe fn entry_mut(&mut self) -> &mut (K, V) {
        debug_assert!(self.is_occupied());
        // SAFETY: Caller guarantees the slot is occupied, so `entry` is
        // initialized.
        unsafe { self.entry.assume_init_mut() }
    }

    /// Moves the entry out and marks the slot empty.
    ///
    /// # Safety
    ///
    /// The slot must be occupied.
    #[inline(always)]
    unsafe fn take(&mut self) -> (K, V) {
        debug_assert!(self.is_occupied());
        self.hash = EMPTY;
        // SAFETY: Caller guarantees the slot was occupied. Clearing the hash
        // first means the bits left behind are never read again.
        unsafe { self.entry.assume_init_read() }
    }

    /// Stores an entry in a vacant slot.
    #[inline(always)]
    fn write(&mut self, hash: u32, entry: (K, V)) {
        debug_assert!(!self.is_occupied());
        debug_assert!(hash != EMPTY);
        self.entry.write(entry);
        self.hash = hash;
    }
}

/// Allocates `size` zeroed, and therefore empty, slots.
///
/// Allocation failure is fatal and goes through [`handle_alloc_error`].
fn alloc_slots<K, V>(size: usize) -> Box<[Slot<K, V>]> {
    if size == 0 {
        return Box::default();
    }

    let layout = Layout::array::<Slot<K, V>>(size).expect("allocation size overflow");
    // SAFETY: `Slot` always contains a `u32`, so `layout` has a non-zero size.
    // A zeroed `Slot` is valid: `hash` is `EMPTY` and `entry` is
    // `MaybeUninit`. The pointer comes from the global allocator with the
    // layout of `[Slot<K, V>; size]`, which is what `Box<[_]>` frees with.
    unsafe {
        let raw_alloc = alloc::alloc::alloc_zeroed(layout);
        if raw_alloc.is_null() {
            handle_alloc_error(layout);
        }

        Box::from_raw(core::ptr::slice_from_raw_parts_mut(
            raw_alloc.cast::<Slot<K, V>>(),
            size,
        ))
    }
}

/// The slot array and its occupancy count, without any knowledge of how
/// keys are hashed or compared.
struct RawTable<K, V> {
    slots: Box<[Slot<K, V>]>,
    used: usize,
}

impl<K, V> RawTable<K, V> {
    fn with_capacity(capacity: usize) -> Self {
        let size = capacity
            .max(1)
            .checked_next_power_of_two()
            .expect("capacity overflow");
        Self {
            slots: alloc_slots(size),
            used: 0,
        }
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.slots.len().wrapping_sub(1)
    }

    /// Returns the index of the entry with `hash` for which `eq` holds.
    ///
    /// The scan stops at the first empty slot, or at the first resident that
    /// sits closer to its ideal index than the scan has travelled: an entry
    /// hashed to the start index would have displaced that resident.
    #[inline]
    fn find(&self, hash: u32, eq: impl Fn(&K) -> bool) -> Option<usize> {
        let mask = self.mask();
        let mut index = hash as usize & mask;

        for probe in 0..self.slots.len() {
            // SAFETY: `index` is masked to the power-of-two slot count.
            let slot = unsafe { self.slots.get_unchecked(index) };
            if !slot.is_occupied() {
                return None;
            }

            // SAFETY: The slot is occupied.
            if slot.hash == hash && eq(unsafe { &slot.entry().0 }) {
                return Some(index);
            }

            if probe > probe_distance(slot.hash, index, mask) {
                return None;
            }

            index = (index + 1) & mask;
        }

        None
    }

    /// Stores an entry whose key is known to be absent, displacing residents
    /// that are closer to their ideal index than the carried entry is to its
    /// own. Returns the index where `entry` itself landed, which is where the
    /// first displacement happened if there was one.
    ///
    /// The caller must have reserved room for one more entry.
    fn insert_unique(&mut self, mut hash: u32, mut entry: (K, V)) -> usize {
        debug_assert!(hash != EMPTY);
        debug_assert!(self.used < self.slots.len());

        let mask = self.mask();
        let mut index = hash as usize & mask;
        let mut probe = 0;
        let mut placed = None;

        for _ in 0..self.slots.len() {
            // SAFETY: `index` is masked to the power-of-two slot count.
            let slot = unsafe { self.slots.get_unchecked_mut(index) };
            if !slot.is_occupied() {
                slot.write(hash, entry);
                self.used += 1;
                return placed.unwrap_or(index);
            }

            let resident_hash = slot.hash;
            let resident_probe = probe_distance(resident_hash, index, mask);
            if probe > resident_probe {
                slot.hash = hash;
                hash = resident_hash;
                // SAFETY: The slot is occupied.
                core::mem::swap(unsafe { slot.entry_mut() }, &mut entry);
                placed.get_or_insert(index);
                probe = resident_probe;
            }

            probe += 1;
            index = (index + 1) & mask;
        }

        unreachable!("no vacant slot on the probe sequence of a table below its load limit")
    }

    /// Removes the entry at `index`, closing the gap by shifting the
    /// following run of displaced entries one slot back.
    ///
    /// # Safety
    ///
    /// The slot at `index` must be occupied.
    unsafe fn remove_at(&mut self, index: usize) -> (K, V) {
        let mask = self.mask();
        // SAFETY: Caller guarantees the slot is occupied.
        let removed = unsafe { self.slots[index].take() };

        let mut current = index;
        for _ in 0..self.slots.len() {
            let next = (current + 1) & mask;
            let next_hash = self.slots[next].hash;
            if next_hash == EMPTY || probe_distance(next_hash, next, mask) == 0 {
                self.used -= 1;
                return removed;
            }

            // SAFETY: `next` is occupied, and `current` was vacated by the
            // previous `take`.
            let entry = unsafe { self.slots[next].take() };
            self.slots[current].write(next_hash, entry);
            current = next;
        }

        unreachable!("backward shift wrapped the whole table without reaching a stop slot")
    }

    /// Grows the slot array, if needed, so `additional` more entries fit
    /// below the load limit.
    #[inline]
    fn reserve(&mut self, additional: usize) {
        if self.used.saturating_add(additional) > max_load(self.slots.len()) {
            self.grow(additional);
        }
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self, additional: usize) {
        let required = self.used.checked_add(additional).expect("capacity overflow");
        let mut size = self.slots.len();
        while required > max_load(size) {
            size = size.checked_mul(2).expect("capacity overflow").max(1);
        }
        self.resize(size);
    }

    /// Moves every entry into a fresh zeroed array of `size` slots, reusing
    /// the stored hashes.
    fn resize(&mut self, size: usize) {
        debug_assert!(size.is_power_of_two());
        debug_assert!(self.used <= max_load(size));

        let mut old_slots = core::mem::replace(&mut self.slots, alloc_slots(size));
        let old_used = core::mem::replace(&mut self.used, 0);

        // Entries are moved out one by one; `Slot` has no destructor, so
        // releasing `old_slots` afterwards only frees the memory.
        for slot in old_slots.iter_mut() {
            if slot.is_occupied() {
                let hash = slot.hash;
                // SAFETY: The slot is occupied.
                let entry = unsafe { slot.take() };
                self.insert_unique(hash, entry);
            }
        }

        debug_assert_eq!(self.used, old_used);
    }

    fn clear(&mut self) {
        if self.used == 0 {
            return;
        }

        for slot in self.slots.iter_mut() {
            if slot.is_occupied() {
                // SAFETY: The slot is occupied.
                drop(unsafe { slot.take() });
            }
        }
        self.used = 0;
    }

    /// Checks that `used` matches the occupied slots and that every entry
    /// respects Robin Hood order with respect to its predecessor.
    #[cfg(test)]
    fn assert_robin_hood_order(&self) {
        let mask = self.mask();
        let occupied = self.slots.iter().filter(|s| s.is_occupied()).count();
        assert_eq!(occupied, self.used, "used count out of sync");
        assert!(self.used <= max_load(self.slots.len()) || self.used == 0);

        for (index, slot) in self.slots.iter().enumerate() {
            if !slot.is_occupied() {
                continue;
            }

            let distance = probe_distance(slot.hash, index, mask);
            if distance == 0 {
                continue;
            }

            let prev_index = index.wrapping_sub(1) & mask;
            let prev = &self.slots[prev_index];
            assert!(
                prev.is_occupied(),
                "slot {index} at distance {distance} follows an empty slot"
            );
            let prev_distance = probe_distance(prev.hash, prev_index, mask);
            assert!(
                prev_distance + 1 >= distance,
                "slot {index} at distance {distance} follows slot {prev_index} at distance \
                 {prev_distance}"
            );
        }
    }
}

impl<K, V> Drop for RawTable<K, V> {
    fn drop(&mut self) {
        if core::mem::needs_drop::<(K, V)>() && self.used > 0 {
            for slot in self.slots.iter_mut() {
                if slot.is_occupied() {
                    // SAFETY: The slot is occupied, and the table is going away
                    // so nothing reads it afterwards.
                    unsafe { slot.entry.assume_init_drop() };
                }
            }
        }
    }
}

impl<K, V> Clone for RawTable<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        // Entries keep their indices, so the copy has the same layout. `used`
        // is bumped per entry so a panicking `clone` drops only what was
        // written.
        let mut table = Self {
            slots: alloc_slots(self.slots.len()),
            used: 0,
        };

        for (src, dst) in self.slots.iter().zip(table.slots.iter_mut()) {
            if src.is_occupied() {
                // SAFETY: The slot is occupied.
                let (key, value) = unsafe { src.entry() };
                dst.write(src.hash, (key.clone(), value.clone()));
                table.used += 1;
            }
        }

        table
    }
}

/// Probe-distance histogram of a table.
///
/// Requires the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// `counts[d]` is the number of entries sitting `d` slots past their
    /// ideal index.
    pub counts: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Total number of entries counted.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Largest probe distance present, or `None` for an empty table.
    pub fn max_distance(&self) -> Option<usize> {
        self.counts.iter().rposition(|&count| count != 0)
    }

    /// Pretty-prints the histogram as a horizontal bar chart.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = match units % 8 {
                1 => Some('▏'),
                2 => Some('▎'),
                3 => Some('▍'),
                4 => Some('▌'),
                5 => Some('▋'),
                6 => Some('▊'),
                7 => Some('▉'),
                _ => None,
            };
            if let Some(ch) = partial {
                bar.push(ch);
            }
            bar
        };

        for (distance, &count) in self.counts.iter().enumerate() {
            println!("{:>3} | {} ({})", distance, make_bar(count), count);
        }
    }
}

/// Debug statistics for hash table analysis.
///
/// Requires the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries currently in the table
    pub populated: usize,
    /// Number of slots allocated
    pub capacity: usize,
    /// Number of entries the table holds before it grows
    pub max_load: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Largest probe distance of any entry
    pub max_probe_distance: usize,
    /// Mean probe distance over all entries
    pub mean_probe_distance: f64,
    /// Total memory in bytes used by the slot array
    pub total_bytes: usize,
    /// Memory in bytes held by vacant slots
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor, grows past {})",
            self.populated,
            self.capacity,
            self.load_factor * 100.0,
            self.max_load
        );
        println!(
            "Probe distance: max {}, mean {:.3}",
            self.max_probe_distance, self.mean_probe_distance
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// An open-addressing hash table using Robin Hood displacement and
/// backward-shift deletion.
///
/// `RobinHoodTable<K, V, H, E>` maps keys of type `K` to values of type `V`.
/// Keys are hashed to 32 bits by `H` and compared by `E`. Entries live
/// directly in one power-of-two array of slots; a slot whose stored hash is
/// zero is empty, and there are no tombstones. The table grows by doubling
/// before an insertion would take its load factor above 0.85, and never
/// shrinks.
///
/// ## Example
///
/// ```rust
/// use robin_hood_table::RobinHoodTable;
/// use robin_hood_table::hashing::Murmur3;
///
/// let mut table: RobinHoodTable<&str, i32, Murmur3> = RobinHoodTable::with_capacity(16);
/// table.put("foo", 99);
/// table.put("bar", 435);
///
/// assert_eq!(table.get(&"foo"), Some(&99));
/// assert_eq!(table.get(&"baz"), None);
///
/// assert_eq!(table.remove(&"bar"), Some(435));
/// assert_eq!(table.get(&"bar"), None);
/// ```
#[derive(Clone)]
pub struct RobinHoodTable<K, V, H = DefaultKeyHasher, E = StdEq> {
    raw: RawTable<K, V>,
    hasher: H,
    eq: E,
}

impl<K, V, H, E> Debug for RobinHoodTable<K, V, H, E>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H, E> Default for RobinHoodTable<K, V, H, E>
where
    H: Default,
    E: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H, E> RobinHoodTable<K, V, H, E>
where
    H: Default,
    E: Default,
{
    /// Creates an empty table with 16 slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let table: RobinHoodTable<&str, i32> = RobinHoodTable::new();
    /// assert_eq!(table.capacity(), 16);
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty table with at least `capacity` slots.
    ///
    /// The slot count is `capacity` rounded up to the next power of two
    /// (and at least 1).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let table: RobinHoodTable<&str, i32> = RobinHoodTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 128);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_strategies(capacity, H::default(), E::default())
    }
}

impl<K, V, H> RobinHoodTable<K, V, H, StdEq> {
    /// Creates an empty table with 16 slots that hashes keys with `hasher`.
    pub fn with_hasher(hasher: H) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// Creates an empty table with at least `capacity` slots that hashes keys
    /// with `hasher`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    /// use robin_hood_table::hashing::Murmur3;
    ///
    /// let mut table = RobinHoodTable::with_capacity_and_hasher(8, Murmur3::with_seed(7));
    /// table.put("answer", 42);
    /// assert_eq!(table.capacity(), 8);
    /// assert_eq!(table.get(&"answer"), Some(&42));
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hasher: H) -> Self {
        Self::with_capacity_and_strategies(capacity, hasher, StdEq)
    }
}

impl<K, V, H, E> RobinHoodTable<K, V, H, E> {
    /// Creates an empty table with at least `capacity` slots, hashing keys
    /// with `hasher` and comparing them with `eq`.
    pub fn with_capacity_and_strategies(capacity: usize, hasher: H, eq: E) -> Self {
        Self {
            raw: RawTable::with_capacity(capacity),
            hasher,
            eq,
        }
    }

    /// Returns the key hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns the key equality strategy.
    pub fn key_eq(&self) -> &E {
        &self.eq
    }

    /// Returns the number of entries in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let mut table: RobinHoodTable<&str, i32> = RobinHoodTable::new();
    /// assert_eq!(table.len(), 0);
    /// table.put("a", 1);
    /// table.put("a", 2);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.raw.used
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.raw.used == 0
    }

    /// Returns the number of slots in the table.
    ///
    /// This is always a power of two (or zero after a leaked [`drain`]). The
    /// table grows before it would hold more than 85% of this number.
    ///
    /// [`drain`]: RobinHoodTable::drain
    pub fn capacity(&self) -> usize {
        self.raw.slots.len()
    }

    /// Removes all entries, keeping the allocated slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let mut table: RobinHoodTable<&str, i32> = RobinHoodTable::new();
    /// table.put("a", 1);
    /// table.put("b", 2);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Reserves room for at least `additional` more entries.
    ///
    /// The slot count doubles until `len() + additional` entries fit below
    /// the 0.85 load factor, so that many insertions of new keys will not
    /// trigger a resize.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let mut table: RobinHoodTable<&str, i32> = RobinHoodTable::new();
    /// table.reserve(100);
    /// assert_eq!(table.capacity(), 128);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        self.raw.reserve(additional);
    }

    /// Returns an iterator over `(&K, &V)` pairs in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let mut table: RobinHoodTable<&str, i32> = RobinHoodTable::new();
    /// table.put("a", 1);
    /// table.put("b", 2);
    ///
    /// let mut sum = 0;
    /// for (_, value) in table.iter() {
    ///     sum += value;
    /// }
    /// assert_eq!(sum, 3);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.raw.slots.iter(),
            remaining: self.raw.used,
        }
    }

    /// Returns an iterator over `(&K, &mut V)` pairs in slot order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            slots: self.raw.slots.iter_mut(),
            remaining: self.raw.used,
        }
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes every entry and yields them as owned pairs.
    ///
    /// The table is empty as soon as this returns, and gets its slots back
    /// when the iterator is dropped. Entries the iterator did not yield are
    /// dropped with it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let mut table: RobinHoodTable<&str, i32> = RobinHoodTable::new();
    /// table.put("a", 1);
    /// table.put("b", 2);
    ///
    /// let mut drained: Vec<(&str, i32)> = table.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, [("a", 1), ("b", 2)]);
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        let slots = core::mem::take(&mut self.raw.slots);
        let remaining = core::mem::replace(&mut self.raw.used, 0);
        Drain {
            iter: IntoIter {
                slots,
                index: 0,
                remaining,
            },
            table: &mut self.raw,
        }
    }

    /// Keeps only the entries for which `f` returns `true`.
    ///
    /// Rejected entries are removed with the same backward shift as
    /// [`remove`], so the table never holds tombstones. Each entry is
    /// visited exactly once.
    ///
    /// [`remove`]: RobinHoodTable::remove
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let mut table: RobinHoodTable<&str, i32> = RobinHoodTable::new();
    /// for (key, value) in [("one", 1), ("two", 2), ("three", 3), ("four", 4)] {
    ///     table.put(key, value);
    /// }
    ///
    /// table.retain(|_, value| *value % 2 == 0);
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.get(&"two"), Some(&2));
    /// assert_eq!(table.get(&"three"), None);
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        let mask = self.raw.mask();
        let mut remaining = self.raw.used;
        let mut index = 0;

        // Backward shifts preserve the circular order of entries, so counting
        // visits is enough to stop before anything comes around a second
        // time.
        while remaining > 0 {
            // SAFETY: `index` is masked to the power-of-two slot count, which
            // is non-zero while entries remain.
            let slot = unsafe { self.raw.slots.get_unchecked_mut(index) };
            if slot.is_occupied() {
                remaining -= 1;
                // SAFETY: The slot is occupied.
                let (key, value) = unsafe { slot.entry_mut() };
                if !f(key, value) {
                    // SAFETY: The slot is occupied. The shift pulls the next
                    // entry into `index`, so it is examined without advancing.
                    drop(unsafe { self.raw.remove_at(index) });
                    continue;
                }
            }

            index = (index + 1) & mask;
        }
    }

    /// Computes how many entries sit at each probe distance.
    ///
    /// Requires the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mask = self.raw.mask();
        let mut counts = Vec::new();

        for (index, slot) in self.raw.slots.iter().enumerate() {
            if !slot.is_occupied() {
                continue;
            }

            let distance = probe_distance(slot.hash, index, mask);
            if counts.len() <= distance {
                counts.resize(distance + 1, 0);
            }
            counts[distance] += 1;
        }

        ProbeHistogram { counts }
    }

    /// Returns detailed utilization statistics for debugging.
    ///
    /// Requires the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let capacity = self.capacity();
        let populated = self.len();
        let slot_bytes = core::mem::size_of::<Slot<K, V>>();

        let distance_sum: usize = histogram
            .counts
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();

        DebugStats {
            populated,
            capacity,
            max_load: max_load(capacity),
            load_factor: if capacity == 0 {
                0.0
            } else {
                populated as f64 / capacity as f64
            },
            max_probe_distance: histogram.max_distance().unwrap_or(0),
            mean_probe_distance: if populated == 0 {
                0.0
            } else {
                distance_sum as f64 / populated as f64
            },
            total_bytes: capacity * slot_bytes,
            wasted_bytes: (capacity - populated) * slot_bytes,
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        self.raw.assert_robin_hood_order();
    }
}

impl<K, V, H, E> RobinHoodTable<K, V, H, E>
where
    H: KeyHasher<K>,
    E: KeyEq<K>,
{
    /// Hashes `key`, remapping 0 (the empty marker) to 1.
    #[inline(always)]
    fn make_hash(&self, key: &K) -> u32 {
        match self.hasher.hash_key(key) {
            EMPTY => 1,
            hash => hash,
        }
    }

    #[inline]
    fn find_index(&self, key: &K) -> Option<usize> {
        if self.raw.used == 0 {
            return None;
        }

        let hash = self.make_hash(key);
        self.raw.find(hash, |k| self.eq.key_eq(k, key))
    }

    /// Returns a reference to the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let mut table: RobinHoodTable<&str, i32> = RobinHoodTable::new();
    /// table.put("foo", 99);
    /// assert_eq!(table.get(&"foo"), Some(&99));
    /// assert_eq!(table.get(&"bar"), None);
    /// ```
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and value for `key`.
    #[inline]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let index = self.find_index(key)?;
        // SAFETY: `find_index` only returns indices of occupied slots.
        let (key, value) = unsafe { self.raw.slots.get_unchecked(index).entry() };
        Some((key, value))
    }

    /// Returns a mutable reference to the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let mut table: RobinHoodTable<&str, i32> = RobinHoodTable::new();
    /// table.put("count", 1);
    /// if let Some(count) = table.get_mut(&"count") {
    ///     *count += 1;
    /// }
    /// assert_eq!(table.get(&"count"), Some(&2));
    /// ```
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.find_index(key)?;
        // SAFETY: `find_index` only returns indices of occupied slots.
        let (_, value) = unsafe { self.raw.slots.get_unchecked_mut(index).entry_mut() };
        Some(value)
    }

    /// Returns `true` if the table holds an entry for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_index(key).is_some()
    }

    /// Stores `value` under `key`.
    ///
    /// If the key was absent the entry is inserted and `None` is returned.
    /// If it was present its value is overwritten in place and the previous
    /// value is returned; the stored key is kept and `len()` is unchanged.
    ///
    /// Updating an existing key never resizes. Before inserting a new key the
    /// table doubles its slot count if one more entry would take the load
    /// factor above 0.85.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let mut table: RobinHoodTable<&str, i32> = RobinHoodTable::new();
    /// assert_eq!(table.put("foo", 1), None);
    /// assert_eq!(table.put("foo", 2), Some(1));
    /// assert_eq!(table.get(&"foo"), Some(&2));
    /// ```
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        let eq = &self.eq;
        if let Some(index) = self.raw.find(hash, |k| eq.key_eq(k, &key)) {
            // SAFETY: `find` only returns indices of occupied slots.
            let (_, resident) = unsafe { self.raw.slots.get_unchecked_mut(index).entry_mut() };
            return Some(core::mem::replace(resident, value));
        }

        self.raw.reserve(1);
        self.raw.insert_unique(hash, (key, value));
        None
    }

    /// Removes the entry for `key`, returning its value.
    ///
    /// The run of entries following the removed one is shifted back by one
    /// slot until an empty slot or an entry at its ideal index is reached.
    /// The slot count never decreases.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let mut table: RobinHoodTable<&str, i32> = RobinHoodTable::new();
    /// table.put("bar", 435);
    /// assert_eq!(table.remove(&"bar"), Some(435));
    /// assert_eq!(table.remove(&"bar"), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry for `key`, returning the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let index = self.find_index(key)?;
        // SAFETY: `find_index` only returns indices of occupied slots.
        Some(unsafe { self.raw.remove_at(index) })
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// Like [`put`], a vacant entry grows the table first if one more entry
    /// would exceed the load limit; an occupied entry leaves it alone.
    ///
    /// [`put`]: RobinHoodTable::put
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hood_table::RobinHoodTable;
    ///
    /// let mut counts: RobinHoodTable<&str, u32> = RobinHoodTable::new();
    /// for word in ["a", "b", "a", "c", "a"] {
    ///     *counts.entry(word).or_insert(0) += 1;
    /// }
    /// assert_eq!(counts.get(&"a"), Some(&3));
    /// assert_eq!(counts.get(&"c"), Some(&1));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = self.make_hash(&key);
        let eq = &self.eq;
        match self.raw.find(hash, |k| eq.key_eq(k, &key)) {
            Some(index) => Entry::Occupied(OccupiedEntry {
                raw: &mut self.raw,
                index,
            }),
            None => {
                self.raw.reserve(1);
                Entry::Vacant(VacantEntry {
                    raw: &mut self.raw,
                    hash,
                    key,
                })
            }
        }
    }
}

impl<K, V, H, E> PartialEq for RobinHoodTable<K, V, H, E>
where
    H: KeyHasher<K>,
    E: KeyEq<K>,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V, H, E> Extend<(K, V)> for RobinHoodTable<K, V, H, E>
where
    H: KeyHasher<K>,
    E: KeyEq<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K, V, H, E> FromIterator<(K, V)> for RobinHoodTable<K, V, H, E>
where
    H: KeyHasher<K> + Default,
    E: KeyEq<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

/// A view into a single entry of the table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on
/// [`RobinHoodTable`].
///
/// [`entry`]: RobinHoodTable::entry
pub enum Entry<'a, K, V> {
    /// The key is not present in the table
    Vacant(VacantEntry<'a, K, V>),
    /// The key is present in the table
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value. `default` is not called for an
    /// occupied entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to the value of an occupied entry, leaving a vacant entry
    /// untouched.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry of the table.
pub struct VacantEntry<'a, K, V> {
    raw: &'a mut RawTable<K, V>,
    hash: u32,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value and returns a mutable reference to it.
    ///
    /// The entry may displace residents further along its probe sequence;
    /// the returned reference points at wherever this entry settled.
    pub fn insert(self, value: V) -> &'a mut V {
        let raw = self.raw;
        let index = raw.insert_unique(self.hash, (self.key, value));
        // SAFETY: `insert_unique` returns the occupied slot holding this
        // entry.
        unsafe { &mut raw.slots.get_unchecked_mut(index).entry_mut().1 }
    }
}

/// A view into an occupied entry of the table.
pub struct OccupiedEntry<'a, K, V> {
    raw: &'a mut RawTable<K, V>,
    index: usize,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the stored key.
    pub fn key(&self) -> &K {
        &self.pair().0
    }

    /// Gets a reference to the value.
    pub fn get(&self) -> &V {
        &self.pair().1
    }

    /// Gets a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut V {
        // SAFETY: `index` was found occupied and the entry holds the only
        // borrow of the table.
        unsafe { &mut self.raw.slots.get_unchecked_mut(self.index).entry_mut().1 }
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        let raw = self.raw;
        // SAFETY: `index` was found occupied and the entry holds the only
        // borrow of the table.
        unsafe { &mut raw.slots.get_unchecked_mut(self.index).entry_mut().1 }
    }

    /// Replaces the value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry and returns its value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry and returns the stored key and value.
    pub fn remove_entry(self) -> (K, V) {
        // SAFETY: `index` was found occupied and nothing has touched the
        // table since.
        unsafe { self.raw.remove_at(self.index) }
    }

    fn pair(&self) -> &(K, V) {
        // SAFETY: `index` was found occupied and nothing has touched the
        // table since.
        unsafe { self.raw.slots.get_unchecked(self.index).entry() }
    }
}

/// An iterator over the entries of a [`RobinHoodTable`].
///
/// This struct is created by the [`iter`] method. It yields `(&K, &V)` in
/// slot order.
///
/// [`iter`]: RobinHoodTable::iter
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if slot.is_occupied() {
                self.remaining -= 1;
                // SAFETY: The slot is occupied.
                let (key, value) = unsafe { slot.entry() };
                return Some((key, value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of a [`RobinHoodTable`].
///
/// This struct is created by the [`iter_mut`] method.
///
/// [`iter_mut`]: RobinHoodTable::iter_mut
pub struct IterMut<'a, K, V> {
    slots: core::slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if slot.is_occupied() {
                self.remaining -= 1;
                // SAFETY: The slot is occupied, and each slot is yielded once.
                let (key, value) = unsafe { slot.entry_mut() };
                return Some((&*key, value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a [`RobinHoodTable`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`RobinHoodTable`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a [`RobinHoodTable`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

/// An owning iterator over the entries of a [`RobinHoodTable`].
///
/// This struct is created by `into_iter` on the table. Entries that are not
/// consumed are dropped with the iterator.
pub struct IntoIter<K, V> {
    slots: Box<[Slot<K, V>]>,
    index: usize,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 && self.index < self.slots.len() {
            let slot = &mut self.slots[self.index];
            self.index += 1;
            if slot.is_occupied() {
                self.remaining -= 1;
                // SAFETY: The slot is occupied; `take` marks it empty so it is
                // neither yielded nor dropped again.
                return Some(unsafe { slot.take() });
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> Drop for IntoIter<K, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

/// A draining iterator over the entries of a [`RobinHoodTable`].
///
/// This struct is created by the [`drain`] method. The slot array is handed
/// back to the table, emptied, when the iterator is dropped. If the iterator
/// is leaked the table is left empty with no slots, and grows again on the
/// next insertion.
///
/// [`drain`]: RobinHoodTable::drain
pub struct Drain<'a, K, V> {
    iter: IntoIter<K, V>,
    table: &'a mut RawTable<K, V>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}
impl<K, V> FusedIterator for Drain<'_, K, V> {}

impl<K, V> Drop for Drain<'_, K, V> {
    fn drop(&mut self) {
        for _ in &mut self.iter {}

        debug_assert!(self.table.slots.is_empty());
        self.table.slots = core::mem::take(&mut self.iter.slots);
    }
}

impl<K, V, H, E> IntoIterator for RobinHoodTable<K, V, H, E> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        let slots = core::mem::take(&mut self.raw.slots);
        let remaining = core::mem::replace(&mut self.raw.used, 0);
        IntoIter {
            slots,
            index: 0,
            remaining,
        }
    }
}

impl<'a, K, V, H, E> IntoIterator for &'a RobinHoodTable<K, V, H, E> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, H, E> IntoIterator for &'a mut RobinHoodTable<K, V, H, E> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::hashing::AddressHasher;
    use crate::hashing::Murmur3;

    #[derive(Clone)]
    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl Default for HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }
    }

    impl KeyHasher<u64> for HashState {
        fn hash_key(&self, key: &u64) -> u32 {
            let mut h = SipHasher::new_with_keys(self.k0, self.k1);
            h.write_u64(*key);
            h.finish() as u32
        }
    }

    /// Sends every key to the same hash, so the whole table is one run.
    #[derive(Clone, Copy, Default)]
    struct ConstHasher(u32);

    impl<K> KeyHasher<K> for ConstHasher {
        fn hash_key(&self, _key: &K) -> u32 {
            self.0
        }
    }

    /// Assigns hand-picked hashes so tests can predict slot positions.
    #[derive(Clone, Copy)]
    struct FixedHashes(&'static [(&'static str, u32)]);

    impl KeyHasher<&'static str> for FixedHashes {
        fn hash_key(&self, key: &&'static str) -> u32 {
            self.0
                .iter()
                .find(|(k, _)| k == key)
                .map(|&(_, hash)| hash)
                .unwrap_or_else(|| panic!("no fixed hash for {key:?}"))
        }
    }

    fn key_at<K: Clone, V, H, E>(table: &RobinHoodTable<K, V, H, E>, index: usize) -> Option<K> {
        let slot = &table.raw.slots[index];
        if slot.is_occupied() {
            // SAFETY: The slot is occupied.
            Some(unsafe { slot.entry().0.clone() })
        } else {
            None
        }
    }

    #[test]
    fn smoke_scenario() {
        let mut table: RobinHoodTable<&str, i32, Murmur3> = RobinHoodTable::with_capacity(16);
        table.put("foo", 99);
        table.put("bar", 435);

        assert_eq!(table.get(&"foo"), Some(&99));
        assert_eq!(table.get(&"bar"), Some(&435));
        assert_eq!(table.get(&"baz"), None);

        assert!(table.remove(&"bar").is_some());
        assert_eq!(table.get(&"bar"), None);
        assert_eq!(table.get(&"foo"), Some(&99));
        table.assert_invariants();
    }

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let table: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::with_capacity(0);
        assert_eq!(table.capacity(), 1);
        let table: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::with_capacity(16);
        assert_eq!(table.capacity(), 16);
        let table: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::with_capacity(17);
        assert_eq!(table.capacity(), 32);
        let table: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::new();
        assert_eq!(table.capacity(), 16);
    }

    #[test]
    fn insert_and_get() {
        let mut table: RobinHoodTable<u64, i32, HashState> = RobinHoodTable::with_capacity(0);
        for k in 0..32u64 {
            assert_eq!(table.put(k, (k as i32) * 2), None);
            assert_eq!(table.get(&k), Some(&((k as i32) * 2)), "{:#?}", table);
            table.assert_invariants();
        }
        assert_eq!(table.len(), 32);

        for k in 0..32u64 {
            assert_eq!(table.get(&k), Some(&((k as i32) * 2)));
        }
        assert!(table.get(&999).is_none());
        assert!(!table.contains_key(&999));
    }

    #[test]
    fn empty_table_misses() {
        let table: RobinHoodTable<u64, i32, HashState> = RobinHoodTable::new();
        assert_eq!(table.get(&0), None);
        assert_eq!(table.get_key_value(&1), None);
    }

    #[test]
    fn put_overwrites_in_place() {
        let mut table: RobinHoodTable<u64, i32, HashState> = RobinHoodTable::new();
        assert_eq!(table.put(42, 7), None);
        assert_eq!(table.len(), 1);

        assert_eq!(table.put(42, 11), Some(7));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&42), Some(&11));
        table.assert_invariants();
    }

    #[test]
    fn update_keeps_original_key() {
        #[derive(Debug, Clone)]
        struct Tagged(&'static str, u32);

        impl PartialEq for Tagged {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        struct TagHasher;
        impl KeyHasher<Tagged> for TagHasher {
            fn hash_key(&self, key: &Tagged) -> u32 {
                crate::hashing::murmur3_32(key.0.as_bytes(), 0)
            }
        }

        let mut table: RobinHoodTable<Tagged, i32, TagHasher> =
            RobinHoodTable::with_hasher(TagHasher);
        table.put(Tagged("k", 1), 1);
        table.put(Tagged("k", 2), 2);

        let (key, value) = table.get_key_value(&Tagged("k", 0)).unwrap();
        assert_eq!(key.1, 1);
        assert_eq!(*value, 2);
    }

    #[test]
    fn get_mut_modifies() {
        let mut table: RobinHoodTable<u64, i32, HashState> = RobinHoodTable::new();
        for k in 0..5u64 {
            table.put(k, 1);
        }

        for k in 0..5u64 {
            if let Some(v) = table.get_mut(&k) {
                *v += 9;
            }
        }
        for k in 0..5u64 {
            assert_eq!(table.get(&k), Some(&10));
        }
        assert_eq!(table.get_mut(&99), None);
    }

    #[test]
    fn remove_items() {
        let mut table: RobinHoodTable<u64, i32, HashState> = RobinHoodTable::with_capacity(0);
        for k in 0..8u64 {
            table.put(k, k as i32);
        }
        assert_eq!(table.len(), 8);

        for k in [0u64, 3, 7] {
            assert_eq!(table.remove(&k), Some(k as i32));
            assert_eq!(table.get(&k), None);
            table.assert_invariants();
        }
        assert_eq!(table.len(), 5);

        for k in [1u64, 2, 4, 5, 6] {
            assert_eq!(table.get(&k), Some(&(k as i32)));
        }
        assert!(table.remove(&1000).is_none());
        assert_eq!(table.remove_entry(&4), Some((4, 4)));
    }

    #[test]
    fn load_factor_triggers_growth_on_fourteenth_key() {
        let mut table: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::with_capacity(16);
        for k in 0..13u64 {
            table.put(k, k);
        }
        assert_eq!(table.capacity(), 16);

        table.put(13, 13);
        assert_eq!(table.capacity(), 32);
        assert_eq!(table.len(), 14);
        for k in 0..14u64 {
            assert_eq!(table.get(&k), Some(&k));
        }
        table.assert_invariants();
    }

    #[test]
    fn update_at_load_limit_keeps_capacity() {
        let mut table: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::with_capacity(16);
        for k in 0..13u64 {
            table.put(k, k);
        }
        assert_eq!(table.capacity(), 16);

        assert_eq!(table.put(0, 99), Some(0));
        assert_eq!(table.capacity(), 16);
        assert_eq!(table.len(), 13);

        *table.entry(5).or_insert(0) += 100;
        table.entry(7).and_modify(|v| *v = 70).or_default();
        assert_eq!(table.capacity(), 16);
        assert_eq!(table.len(), 13);
        assert_eq!(table.get(&0), Some(&99));
        assert_eq!(table.get(&5), Some(&105));
        assert_eq!(table.get(&7), Some(&70));
        table.assert_invariants();

        // A vacant entry is an insertion and grows like `put` does.
        assert_eq!(*table.entry(13).or_insert(13), 13);
        assert_eq!(table.capacity(), 32);
        assert_eq!(table.len(), 14);
        table.assert_invariants();
    }

    #[test]
    fn hasher_constructors_infer_key_eq() {
        let mut table = RobinHoodTable::with_capacity_and_hasher(8, Murmur3::with_seed(7));
        table.put("answer", 42);
        assert_eq!(table.capacity(), 8);
        assert_eq!(table.get(&"answer"), Some(&42));

        let mut table = RobinHoodTable::with_hasher(Murmur3::default());
        table.put(String::from("k"), 1u8);
        assert_eq!(table.capacity(), 16);
        assert_eq!(table.key_eq(), &StdEq);
    }

    #[test]
    fn growth_doubles_and_preserves_entries() {
        let mut table: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::with_capacity(1);
        let mut capacity = table.capacity();

        for k in 0..5000u64 {
            table.put(k, k * 3);
            let new_capacity = table.capacity();
            if new_capacity != capacity {
                assert_eq!(new_capacity, capacity * 2);
                capacity = new_capacity;
                table.assert_invariants();
            }
            assert!(table.len() <= max_load(table.capacity()));
        }

        assert_eq!(capacity, 8192);
        for k in 0..5000u64 {
            assert_eq!(table.get(&k), Some(&(k * 3)));
        }
    }

    #[test]
    fn zero_hash_is_remapped() {
        let mut table: RobinHoodTable<u64, u64, ConstHasher> =
            RobinHoodTable::with_hasher(ConstHasher(0));
        for k in 0..10u64 {
            table.put(k, k + 100);
        }

        assert_eq!(table.len(), 10);
        assert!(
            table
                .raw
                .slots
                .iter()
                .filter(|s| s.is_occupied())
                .all(|s| s.hash == 1)
        );
        for k in 0..10u64 {
            assert_eq!(table.get(&k), Some(&(k + 100)));
        }

        assert_eq!(table.remove(&4), Some(104));
        assert_eq!(table.get(&4), None);
        table.assert_invariants();
    }

    #[test]
    fn explicit_collision() {
        let mut table: RobinHoodTable<u64, i32, ConstHasher> =
            RobinHoodTable::with_capacity_and_hasher(0, ConstHasher(0x1234_5678));
        for k in 0..65u64 {
            table.put(k, k as i32);
        }

        assert_eq!(table.len(), 65);
        for k in 0..65u64 {
            assert_eq!(table.get(&k), Some(&(k as i32)), "{:#?}", table);
        }

        for k in (0..65u64).step_by(3) {
            assert_eq!(table.remove(&k), Some(k as i32));
            table.assert_invariants();
        }
        for k in 0..65u64 {
            let expected = (k % 3 != 0).then_some(k as i32);
            assert_eq!(table.get(&k).copied(), expected);
        }
    }

    #[test]
    fn displacement_follows_robin_hood_order() {
        static HASHES: &[(&str, u32)] = &[("a", 16), ("b", 32), ("c", 1), ("d", 48), ("e", 17)];
        let mut table: RobinHoodTable<&str, u32, FixedHashes> =
            RobinHoodTable::with_hasher(FixedHashes(HASHES));

        // a and b both start at slot 0, c at slot 1.
        table.put("a", 1);
        table.put("b", 2);
        table.put("c", 3);
        assert_eq!(key_at(&table, 0), Some("a"));
        assert_eq!(key_at(&table, 1), Some("b"));
        assert_eq!(key_at(&table, 2), Some("c"));

        // d starts at slot 0 and is two slots away when it reaches c, which is
        // only one slot from home, so d takes slot 2 and c moves on.
        table.put("d", 4);
        assert_eq!(key_at(&table, 2), Some("d"));
        assert_eq!(key_at(&table, 3), Some("c"));
        table.assert_invariants();

        // e shares c's ideal slot and hash low bits but is absent.
        assert_eq!(table.get(&"e"), None);
        for (key, value) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
            assert_eq!(table.get(&key), Some(&value));
        }

        // Removing b pulls d and c one slot back.
        assert_eq!(table.remove(&"b"), Some(2));
        assert_eq!(key_at(&table, 1), Some("d"));
        assert_eq!(key_at(&table, 2), Some("c"));
        assert_eq!(key_at(&table, 3), None);
        table.assert_invariants();
    }

    #[test]
    fn backward_shift_stops_at_home_slot() {
        static HASHES: &[(&str, u32)] = &[("a", 4), ("b", 4), ("c", 6)];
        let mut table: RobinHoodTable<&str, u32, FixedHashes> =
            RobinHoodTable::with_hasher(FixedHashes(HASHES));

        table.put("a", 1);
        table.put("b", 2);
        table.put("c", 3);
        assert_eq!(key_at(&table, 4), Some("a"));
        assert_eq!(key_at(&table, 5), Some("b"));
        assert_eq!(key_at(&table, 6), Some("c"));

        // c sits at its ideal slot, so it must stay put.
        table.remove(&"a");
        assert_eq!(key_at(&table, 4), Some("b"));
        assert_eq!(key_at(&table, 5), None);
        assert_eq!(key_at(&table, 6), Some("c"));
        table.assert_invariants();
    }

    #[test]
    fn wraps_around_the_end_of_the_array() {
        let mut table: RobinHoodTable<u64, u64, ConstHasher> =
            RobinHoodTable::with_capacity_and_hasher(16, ConstHasher(15));
        for k in 0..5u64 {
            table.put(k, k);
        }
        for k in 0..5u64 {
            assert_eq!(key_at(&table, (15 + k as usize) & 15), Some(k));
        }

        assert_eq!(table.remove(&0), Some(0));
        assert_eq!(key_at(&table, 15), Some(1));
        assert_eq!(key_at(&table, 0), Some(2));
        assert_eq!(key_at(&table, 1), Some(3));
        assert_eq!(key_at(&table, 2), Some(4));
        assert_eq!(key_at(&table, 3), None);
        table.assert_invariants();

        for k in 1..5u64 {
            assert_eq!(table.get(&k), Some(&k));
        }
    }

    #[test]
    fn remove_then_reinsert_cycles() {
        let mut table: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::new();
        for round in 0..20u64 {
            for k in 0..12u64 {
                table.put(k, k + round);
            }
            for k in (0..12u64).filter(|k| k % 2 == round % 2) {
                assert_eq!(table.remove(&k), Some(k + round));
            }
            table.assert_invariants();
        }
        assert_eq!(table.capacity(), 16);
    }

    #[test]
    fn string_keys() {
        let mut table: RobinHoodTable<String, i32, Murmur3> = RobinHoodTable::new();
        let keys = ["hello", "world", "foo", "bar", "baz"];

        for (i, k) in keys.iter().enumerate() {
            table.put(k.to_string(), i as i32);
        }
        assert_eq!(table.len(), keys.len());

        for (i, k) in keys.iter().enumerate() {
            assert_eq!(table.get(&k.to_string()), Some(&(i as i32)));
        }
        assert!(table.get(&"not found".to_string()).is_none());

        let removed = table.remove_entry(&"foo".to_string()).unwrap();
        assert_eq!(removed, ("foo".to_string(), 2));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn address_keys() {
        #[derive(Debug, PartialEq)]
        struct Loc {
            line: u32,
            col: u32,
        }

        let forms = vec![String::from("(def"), String::from("foo"), String::from("())")];
        let mut locations: RobinHoodTable<*const String, Loc, AddressHasher> =
            RobinHoodTable::new();
        for (col, form) in forms.iter().enumerate() {
            locations.put(
                form as *const String,
                Loc {
                    line: 0,
                    col: col as u32,
                },
            );
        }

        assert_eq!(
            locations.get(&(&forms[1] as *const String)),
            Some(&Loc { line: 0, col: 1 })
        );
        let copy = forms[1].clone();
        assert_eq!(locations.get(&(&copy as *const String)), None);
    }

    #[test]
    fn iter_visits_every_entry_once() {
        let mut table: RobinHoodTable<u64, i32, HashState> = RobinHoodTable::new();
        for k in 10..20u64 {
            table.put(k, (k as i32) + 1);
        }

        let iter = table.iter();
        assert_eq!(iter.len(), 10);
        let mut collected: Vec<u64> = iter.map(|(k, _)| *k).collect();
        collected.sort_unstable();
        assert_eq!(collected, (10..20).collect::<Vec<_>>());

        let mut keys: Vec<u64> = table.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (10..20).collect::<Vec<_>>());
        assert_eq!(table.values().map(|v| *v as i64).sum::<i64>(), (11..21).sum());

        for (k, v) in table.iter_mut() {
            *v = -(*k as i32);
        }
        for v in table.values_mut() {
            *v *= 2;
        }
        for k in 10..20u64 {
            assert_eq!(table.get(&k), Some(&(-2 * k as i32)));
        }

        let mut by_ref = 0;
        for (_, _) in &table {
            by_ref += 1;
        }
        assert_eq!(by_ref, 10);
    }

    #[test]
    fn drain_empties_and_keeps_capacity() {
        let mut table: RobinHoodTable<u64, i32, HashState> = RobinHoodTable::new();
        for k in 0..100u64 {
            table.put(k, k as i32);
        }
        let capacity = table.capacity();

        let mut drained: Vec<(u64, i32)> = table.drain().collect();
        drained.sort_unstable();
        assert_eq!(drained.len(), 100);
        assert_eq!(drained[42], (42, 42));

        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        for k in 0..100u64 {
            assert!(table.get(&k).is_none());
        }

        table.put(5, 5);
        assert_eq!(table.get(&5), Some(&5));
        table.assert_invariants();
    }

    #[test]
    fn partial_drain_drops_the_rest() {
        let marker = Rc::new(());
        let mut table: RobinHoodTable<u64, Rc<()>, HashState> = RobinHoodTable::new();
        for k in 0..10u64 {
            table.put(k, marker.clone());
        }
        assert_eq!(Rc::strong_count(&marker), 11);

        let first = table.drain().next();
        assert!(first.is_some());
        drop(first);
        assert_eq!(Rc::strong_count(&marker), 1);
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 16);
    }

    #[test]
    fn leaked_drain_leaves_usable_table() {
        let mut table: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::new();
        for k in 0..10u64 {
            table.put(k, k);
        }

        core::mem::forget(table.drain());
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 0);
        assert_eq!(table.get(&3), None);
        assert_eq!(table.remove(&3), None);

        table.put(3, 30);
        assert_eq!(table.get(&3), Some(&30));
        assert!(table.capacity().is_power_of_two());
        table.assert_invariants();
    }

    #[test]
    fn into_iter_yields_owned_pairs() {
        let mut table: RobinHoodTable<String, i32, Murmur3> = RobinHoodTable::new();
        table.put("a".to_string(), 1);
        table.put("b".to_string(), 2);

        let mut pairs: Vec<(String, i32)> = table.into_iter().collect();
        pairs.sort();
        assert_eq!(pairs, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn values_are_dropped_exactly_once() {
        let marker = Rc::new(());
        {
            let mut table: RobinHoodTable<u64, Rc<()>, HashState> = RobinHoodTable::new();
            for k in 0..40u64 {
                table.put(k, marker.clone());
            }
            table.put(0, marker.clone());
            assert_eq!(Rc::strong_count(&marker), 41);

            for k in 0..10u64 {
                table.remove(&k);
            }
            assert_eq!(Rc::strong_count(&marker), 31);

            let _ = table.into_iter().take(5).count();
        }
        assert_eq!(Rc::strong_count(&marker), 1);

        let mut table: RobinHoodTable<u64, Rc<()>, HashState> = RobinHoodTable::new();
        for k in 0..10u64 {
            table.put(k, marker.clone());
        }
        table.clear();
        assert_eq!(Rc::strong_count(&marker), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn retain_filters_entries() {
        let mut table: RobinHoodTable<u64, u64, ConstHasher> =
            RobinHoodTable::with_capacity_and_hasher(64, ConstHasher(60));
        for k in 0..40u64 {
            table.put(k, k);
        }

        let mut visited = Vec::new();
        table.retain(|k, v| {
            visited.push(*k);
            *v += 1;
            k % 3 != 0
        });

        visited.sort_unstable();
        assert_eq!(visited, (0..40).collect::<Vec<_>>());
        assert_eq!(table.len(), 26);
        for k in 0..40u64 {
            let expected = (k % 3 != 0).then_some(k + 1);
            assert_eq!(table.get(&k).copied(), expected);
        }
        table.assert_invariants();
    }

    #[test]
    fn reserve_prevents_growth() {
        let mut table: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::new();
        table.reserve(100);
        let capacity = table.capacity();
        assert_eq!(capacity, 128);

        for k in 0..100u64 {
            table.put(k, k);
        }
        assert_eq!(table.capacity(), capacity);

        table.reserve(0);
        assert_eq!(table.capacity(), capacity);
    }

    #[test]
    fn entry_api() {
        let mut table: RobinHoodTable<u64, String, HashState> = RobinHoodTable::new();

        let value = table.entry(1).or_insert("hello".to_string());
        assert_eq!(value, "hello");
        let value = table.entry(1).or_insert("world".to_string());
        assert_eq!(value, "hello");
        assert_eq!(table.len(), 1);

        table.entry(2).or_insert_with(|| "computed".to_string());
        table
            .entry(1)
            .or_insert_with(|| panic!("occupied entry must not call the closure"));
        assert_eq!(table.get(&2), Some(&"computed".to_string()));

        table
            .entry(1)
            .and_modify(|v| v.push_str(" world"))
            .or_insert("default".to_string());
        assert_eq!(table.get(&1), Some(&"hello world".to_string()));

        assert_eq!(table.entry(3).key(), &3);
        assert_eq!(table.entry(3).or_default(), "");
    }

    #[test]
    fn occupied_and_vacant_entries() {
        let mut table: RobinHoodTable<u64, i32, HashState> = RobinHoodTable::new();
        match table.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(*entry.insert(10), 10);
            }
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }

        match table.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.get(), &10);
                *entry.get_mut() += 1;
                assert_eq!(entry.insert(20), 11);
                assert_eq!(entry.remove_entry(), (1, 20));
            }
            Entry::Vacant(_) => panic!("expected occupied entry"),
        }
        assert!(table.is_empty());

        match table.entry(2) {
            Entry::Vacant(entry) => assert_eq!(entry.into_key(), 2),
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }
        assert!(table.is_empty());
    }

    #[test]
    fn vacant_insert_points_at_displacing_entry() {
        static HASHES: &[(&str, u32)] = &[("a", 16), ("b", 32), ("c", 1), ("d", 48)];
        let mut table: RobinHoodTable<&str, u32, FixedHashes> =
            RobinHoodTable::with_hasher(FixedHashes(HASHES));
        table.put("a", 1);
        table.put("b", 2);
        table.put("c", 3);

        // d displaces c from slot 2; the returned reference must be d's.
        let value = match table.entry("d") {
            Entry::Vacant(entry) => entry.insert(4),
            Entry::Occupied(_) => panic!("expected vacant entry"),
        };
        *value += 100;

        assert_eq!(table.get(&"d"), Some(&104));
        assert_eq!(table.get(&"c"), Some(&3));
        table.assert_invariants();
    }

    #[test]
    fn clone_is_deep() {
        let mut original: RobinHoodTable<String, i32, Murmur3> = RobinHoodTable::with_capacity(10);
        for (key, value) in [("hello", 1), ("world", 2), ("rust", 3)] {
            original.put(key.to_string(), value);
        }

        let cloned = original.clone();
        assert_eq!(cloned.len(), 3);
        assert_eq!(cloned.capacity(), original.capacity());
        assert_eq!(cloned, original);
        cloned.assert_invariants();

        *original.get_mut(&"hello".to_string()).unwrap() = 999;
        assert_eq!(cloned.get(&"hello".to_string()), Some(&1));
        assert_ne!(cloned, original);

        let empty: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::new();
        assert!(empty.clone().is_empty());
    }

    #[test]
    fn collect_and_extend() {
        let mut table: RobinHoodTable<u64, u64, HashState> =
            (0..50u64).map(|k| (k, k * k)).collect();
        assert_eq!(table.len(), 50);

        table.extend((25..75u64).map(|k| (k, k)));
        assert_eq!(table.len(), 75);
        assert_eq!(table.get(&10), Some(&100));
        assert_eq!(table.get(&30), Some(&30));
        table.assert_invariants();
    }

    #[test]
    fn debug_formats_as_map() {
        let mut table: RobinHoodTable<&str, i32, Murmur3> = RobinHoodTable::new();
        table.put("only", 1);
        assert_eq!(format!("{table:?}"), "{\"only\": 1}");
    }

    #[test]
    fn probe_histogram_accounts_for_every_entry() {
        let mut table: RobinHoodTable<u64, u64, ConstHasher> =
            RobinHoodTable::with_capacity_and_hasher(16, ConstHasher(3));
        for k in 0..6u64 {
            table.put(k, k);
        }

        let histogram = table.probe_histogram();
        assert_eq!(histogram.counts, vec![1, 1, 1, 1, 1, 1]);
        assert_eq!(histogram.total(), 6);
        assert_eq!(histogram.max_distance(), Some(5));

        let stats = table.debug_stats();
        assert_eq!(stats.populated, 6);
        assert_eq!(stats.capacity, 16);
        assert_eq!(stats.max_load, 13);
        assert_eq!(stats.max_probe_distance, 5);
        assert!((stats.mean_probe_distance - 2.5).abs() < 1e-9);
        assert_eq!(stats.wasted_bytes, 10 * core::mem::size_of::<Slot<u64, u64>>());

        #[cfg(feature = "std")]
        {
            histogram.print();
            stats.print();
        }
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn insert_many() {
        let mut table: RobinHoodTable<u64, u64, HashState> = RobinHoodTable::with_capacity(0);
        for k in 0..100_000u64 {
            table.put(k, k);
        }
        assert_eq!(table.len(), 100_000);
        assert_eq!(table.capacity(), 131_072);
        table.assert_invariants();

        for k in 0..100_000u64 {
            assert_eq!(table.get(&k), Some(&k));
        }
        for k in (0..100_000u64).step_by(2) {
            assert_eq!(table.remove(&k), Some(k));
        }
        table.assert_invariants();
        for k in 0..100_000u64 {
            assert_eq!(table.get(&k).is_some(), k % 2 == 1);
        }
    }
}
