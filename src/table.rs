//! SlotTable: the slot store plus the probing, Robin Hood placement,
//! resize and backward-shift rules.
//!
//! The table works purely on precomputed `u64` hashes. Key comparison is
//! supplied by the caller as a closure, so nothing in here ever calls
//! `K: Hash`.

use core::mem;

/// Slot count of a freshly created table.
pub(crate) const INITIAL_CAPACITY: usize = 1;
/// Multiplier applied to the slot count whenever a probe scan runs off the end.
pub(crate) const RESIZE_FACTOR: usize = 2;

#[derive(Clone, Debug)]
pub(crate) struct Slot<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
    /// Probe steps between this slot and the entry's home index.
    pub(crate) cost: usize,
}

/// Outcome of scanning forward from a home index.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Probe {
    /// An occupied slot holding an equal key.
    Found(usize),
    /// The run ended at an empty slot.
    Vacant,
    /// The scan reached the end of the array without a match.
    Exhausted,
}

#[derive(Clone, Debug)]
pub(crate) struct SlotTable<K, V> {
    slots: Box<[Option<Slot<K, V>>]>,
    len: usize,
    /// Where the entry being inserted currently sits, while `insert` runs.
    watched: Option<usize>,
}

fn empty_slots<K, V>(capacity: usize) -> Box<[Option<Slot<K, V>>]> {
    (0..capacity).map(|_| None).collect()
}

impl<K, V> SlotTable<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: empty_slots(INITIAL_CAPACITY),
            len: 0,
            watched: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slots(&self) -> &[Option<Slot<K, V>>] {
        &self.slots
    }
    pub(crate) fn slots_mut(&mut self) -> &mut [Option<Slot<K, V>>] {
        &mut self.slots
    }
    pub(crate) fn into_slots(self) -> Vec<Option<Slot<K, V>>> {
        self.slots.into_vec()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Slot<K, V>> {
        self.slots.get(index)?.as_ref()
    }
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Slot<K, V>> {
        self.slots.get_mut(index)?.as_mut()
    }

    /// Home index of `hash` at the current capacity.
    #[inline]
    fn home(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    /// Scans forward from the home index of `hash`. There is no wraparound:
    /// a run never crosses the end of the array.
    pub(crate) fn locate<F>(&self, hash: u64, mut eq: F) -> Probe
    where
        F: FnMut(&K) -> bool,
    {
        let home = self.home(hash);
        for (offset, slot) in self.slots[home..].iter().enumerate() {
            match slot {
                None => return Probe::Vacant,
                Some(s) if s.hash == hash && eq(&s.key) => return Probe::Found(home + offset),
                Some(_) => {}
            }
        }
        Probe::Exhausted
    }

    /// Inserts an entry whose key is known to be absent and returns the
    /// index it ended up in once every growth has settled.
    pub(crate) fn insert(&mut self, hash: u64, key: K, value: V) -> Option<usize> {
        self.watched = None;
        let slot = Slot {
            key,
            value,
            hash,
            cost: 0,
        };
        self.place(slot, true);
        self.watched.take()
    }

    /// Robin Hood placement. The poorer entry keeps the slot and the richer
    /// one is carried further along. When the carried entry reaches the end
    /// of the array the table grows, and the carried entry starts over from
    /// its new home with a fresh cost.
    ///
    /// `watching` is true while the carried entry is the one `insert` was
    /// called with; its final index is left in `watched`.
    fn place(&mut self, mut carried: Slot<K, V>, mut watching: bool) {
        carried.cost = 0;
        let mut index = self.home(carried.hash);
        loop {
            if index == self.slots.len() {
                self.grow();
                carried.cost = 0;
                index = self.home(carried.hash);
            }
            let slot = &mut self.slots[index];
            match slot {
                None => {
                    *slot = Some(carried);
                    self.len += 1;
                    if watching {
                        self.watched = Some(index);
                    }
                    return;
                }
                Some(occupant) => {
                    if occupant.cost < carried.cost {
                        mem::swap(occupant, &mut carried);
                        let evicted_watched = self.watched == Some(index);
                        if watching {
                            self.watched = Some(index);
                        } else if evicted_watched {
                            self.watched = None;
                        }
                        watching = evicted_watched;
                    }
                }
            }
            carried.cost += 1;
            index += 1;
        }
    }

    /// Doubles the slot count and re-inserts every entry in array order with
    /// costs recomputed from scratch. A re-inserted entry may run off the end
    /// again, in which case the table grows once more before the remaining
    /// old entries are placed.
    fn grow(&mut self) {
        let old_capacity = self.slots.len();
        let new_capacity = old_capacity
            .checked_mul(RESIZE_FACTOR)
            .expect("capacity overflow");
        let old = mem::replace(&mut self.slots, empty_slots(new_capacity));
        let moved = mem::replace(&mut self.len, 0);
        log::trace!(
            "growing slot table from {} to {} slots, re-inserting {} entries",
            old_capacity,
            new_capacity,
            moved
        );
        let watched = self.watched.take();
        for (index, slot) in old.into_vec().into_iter().enumerate() {
            if let Some(slot) = slot {
                self.place(slot, watched == Some(index));
            }
        }
    }

    /// Empties the slot at `index` and closes the gap by shifting the rest
    /// of the run one slot back.
    pub(crate) fn remove(&mut self, index: usize) -> Option<Slot<K, V>> {
        let removed = self.slots.get_mut(index)?.take()?;
        self.len -= 1;
        self.shift_back(index);
        Some(removed)
    }

    fn shift_back(&mut self, gap: usize) {
        let mut next = gap + 1;
        while next < self.slots.len() {
            match &mut self.slots[next] {
                Some(s) if s.cost > 0 => s.cost -= 1,
                _ => break,
            }
            self.slots.swap(next - 1, next);
            next += 1;
        }
    }

    /// Drops every entry and keeps the current capacity.
    pub(crate) fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.len = 0;
    }

    /// Panics if any structural invariant of the table does not hold.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut occupied = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(s) = slot else { continue };
            occupied += 1;
            assert!(s.cost <= index, "slot {index}: run crosses the array start");
            assert_eq!(index - s.cost, self.home(s.hash), "slot {index}: wrong home");
            if s.cost > 0 {
                let prev = self.slots[index - 1]
                    .as_ref()
                    .unwrap_or_else(|| panic!("slot {index}: hole inside probe run"));
                assert!(
                    prev.cost + 1 >= s.cost,
                    "slot {index}: cost {} follows cost {}",
                    s.cost,
                    prev.cost
                );
            }
        }
        assert_eq!(occupied, self.len, "len out of sync with occupied slots");
        assert!(self.slots.len().is_power_of_two());
    }
}
