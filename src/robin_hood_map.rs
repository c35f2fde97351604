//! RobinHoodMap: public map over the slot table, with hashing, positional
//! handles and the debug reentrancy check.

use crate::error::LookupError;
use crate::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::reentrancy::ReentrancyCheck;
use crate::table::{Probe, SlotTable};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;

/// Position of an entry in the slot array, as returned by
/// [`RobinHoodMap::find`].
///
/// A handle is only meaningful until the next mutation that relocates
/// entries: any insert that grows the table, any erase, and `clear`. After
/// such a mutation the handle may resolve to a different entry or to
/// nothing. Mutating a value through `value_mut` does not relocate
/// anything.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(usize);

impl Handle {
    /// Index of the slot this handle points at.
    pub fn index(&self) -> usize {
        self.0
    }

    pub fn key<'a, K, V, S>(&self, map: &'a RobinHoodMap<K, V, S>) -> Option<&'a K> {
        map.table.get(self.0).map(|s| &s.key)
    }

    pub fn value<'a, K, V, S>(&self, map: &'a RobinHoodMap<K, V, S>) -> Option<&'a V> {
        map.table.get(self.0).map(|s| &s.value)
    }

    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut RobinHoodMap<K, V, S>) -> Option<&'a mut V> {
        map.table.get_mut(self.0).map(|s| &mut s.value)
    }
}

/// Open-addressing hash map with Robin Hood insertion and backward-shift
/// deletion.
///
/// The table starts with a single slot and doubles whenever an insertion's
/// probe scan would run past the last slot. Probing never wraps around, so
/// keys whose home index is near the end of the array trigger growth
/// earlier than keys near the start.
///
/// Borrowing iterators are invalidated by the borrow checker:
///
/// ```compile_fail
/// use robin_hood_map::RobinHoodMap;
///
/// let mut m = RobinHoodMap::new();
/// m.insert(1, "one");
/// let it = m.iter();
/// m.insert(2, "two");
/// it.count();
/// ```
#[derive(Clone)]
pub struct RobinHoodMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    table: SlotTable<K, V>,
    reentrancy: ReentrancyCheck,
}

impl<K, V> RobinHoodMap<K, V, DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for RobinHoodMap<K, V, DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> RobinHoodMap<K, V, S> {
    /// Creates an empty map that hashes keys with `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            table: SlotTable::new(),
            reentrancy: ReentrancyCheck::new(),
        }
    }

    /// The hash builder supplied at construction.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Number of slots. Never decreases; only ever doubles.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Removes every entry and keeps the current capacity.
    pub fn clear(&mut self) {
        log::trace!(
            "clearing {} entries, keeping {} slots",
            self.table.len(),
            self.table.capacity()
        );
        self.table.clear();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.table.slots(), self.table.len())
    }

    /// Iterates from the slot `handle` names to the end of the array, the
    /// same entries a full `iter()` would still yield from that point.
    pub fn iter_from(&self, handle: Handle) -> Iter<'_, K, V> {
        Iter::starting_at(self.table.slots(), handle.0)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let len = self.table.len();
        IterMut::new(self.table.slots_mut(), len)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

impl<K, V, S> RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn probe<Q>(&self, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.table.locate(hash, |k| k.borrow() == q)
    }

    /// Inserts `key` with `value` unless the key is already present, in which
    /// case the map is left untouched (the first insert wins). Returns
    /// whether the entry was added.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let _g = self.reentrancy.enter("insert");
        let hash = self.make_hash(&key);
        match self.table.locate(hash, |k| *k == key) {
            Probe::Found(_) => false,
            Probe::Vacant | Probe::Exhausted => {
                self.table.insert(hash, key, value);
                true
            }
        }
    }

    /// Returns the value for `key`, inserting the value produced by
    /// `default` first if the key is absent. `default` only runs on insert.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let _g = self.reentrancy.enter("get_or_insert_with");
        let hash = self.make_hash(&key);
        let index = match self.table.locate(hash, |k| *k == key) {
            Probe::Found(index) => Some(index),
            Probe::Vacant | Probe::Exhausted => self.table.insert(hash, key, default()),
        };
        match index.and_then(|index| self.table.get_mut(index)) {
            Some(slot) => &mut slot.value,
            None => unreachable!("entry was just located or inserted"),
        }
    }

    /// Indexing-style access: inserts `V::default()` for an absent key.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Removes `key` if present, closing the gap with a backward shift.
    pub fn erase<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _ = self.remove_entry(key);
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("remove");
        let hash = self.make_hash(key);
        match self.table.locate(hash, |k| k.borrow() == key) {
            Probe::Found(index) => self.table.remove(index).map(|s| (s.key, s.value)),
            Probe::Vacant | Probe::Exhausted => None,
        }
    }

    /// Locates `key` and returns a positional handle to its slot.
    pub fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("find");
        match self.probe(key) {
            Probe::Found(index) => Some(Handle(index)),
            Probe::Vacant | Probe::Exhausted => None,
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.find(key)?;
        self.table.get(h.0).map(|s| (&s.key, &s.value))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.find(key)?;
        h.value_mut(self)
    }

    /// Strict lookup: never inserts.
    pub fn at<Q>(&self, key: &Q) -> Result<&V, LookupError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).ok_or(LookupError::KeyNotFound)
    }

    /// Probe steps between the entry for `key` and its home slot.
    pub fn displacement<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.find(key)?;
        self.table.get(h.0).map(|s| s.cost)
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        self.table.assert_invariants();
        for (i, (k, _)) in self.iter().enumerate() {
            assert!(
                self.iter().skip(i + 1).all(|(other, _)| other != k),
                "duplicate key in slot table"
            );
        }
    }
}

impl<K, V, S, Q> Index<&Q> for RobinHoodMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// Panics if the key is absent; use [`RobinHoodMap::at`] to get an error instead.
    fn index(&self, key: &Q) -> &V {
        match self.at(key) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<K, V, S> fmt::Debug for RobinHoodMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| v == ov))
    }
}

impl<K, V, S> Eq for RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for RobinHoodMap<K, V, DefaultHashBuilder>
where
    K: Eq + Hash,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K, V, S> IntoIterator for &'a RobinHoodMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut RobinHoodMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for RobinHoodMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let len = self.table.len();
        IntoIter::new(self.table.into_slots(), len)
    }
}
