//! Iterators over the occupied slots of a `RobinHoodMap`, in ascending slot
//! order.

use crate::table::Slot;
use core::iter::FusedIterator;

/// Iterator over `(&K, &V)`.
///
/// A cursor of (slot array, index). Two iterators are equal when they walk
/// the same slot array and sit at the same index.
pub struct Iter<'a, K, V> {
    slots: &'a [Option<Slot<K, V>>],
    index: usize,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(slots: &'a [Option<Slot<K, V>>], len: usize) -> Self {
        Self {
            slots,
            index: 0,
            remaining: len,
        }
    }

    /// Cursor positioned at slot `index`. Past the end it yields nothing.
    pub(crate) fn starting_at(slots: &'a [Option<Slot<K, V>>], index: usize) -> Self {
        let remaining = slots
            .get(index..)
            .map_or(0, |rest| rest.iter().filter(|s| s.is_some()).count());
        Self {
            slots,
            index: index.min(slots.len()),
            remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.slots.get(self.index) {
            self.index += 1;
            if let Some(s) = slot {
                self.remaining -= 1;
                return Some((&s.key, &s.value));
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

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            index: self.index,
            remaining: self.remaining,
        }
    }
}

impl<K, V> PartialEq for Iter<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.slots, other.slots) && self.index == other.index
    }
}

impl<K, V> Eq for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)`.
pub struct IterMut<'a, K, V> {
    it: core::slice::IterMut<'a, Option<Slot<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(slots: &'a mut [Option<Slot<K, V>>], len: usize) -> Self {
        Self {
            it: slots.iter_mut(),
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let s = self.it.find_map(Option::as_mut)?;
        self.remaining -= 1;
        Some((&s.key, &mut s.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator over `(K, V)`.
pub struct IntoIter<K, V> {
    it: std::vec::IntoIter<Option<Slot<K, V>>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(slots: Vec<Option<Slot<K, V>>>, len: usize) -> Self {
        Self {
            it: slots.into_iter(),
            remaining: len,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let s = self.it.find_map(|slot| slot)?;
        self.remaining -= 1;
        Some((s.key, s.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    pub(crate) inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

#[cfg(test)]
mod tests {
    use crate::RobinHoodMap;
    use std::collections::BTreeMap;

    fn sample() -> RobinHoodMap<String, i32> {
        (0..50).map(|i| (format!("k{i}"), i)).collect()
    }

    /// Invariant: every iterator flavor yields each live entry exactly once
    /// and reports an exact length.
    #[test]
    fn all_iterators_agree() {
        let mut m = sample();
        let expected: BTreeMap<String, i32> = (0..50).map(|i| (format!("k{i}"), i)).collect();

        let it = m.iter();
        assert_eq!(it.len(), 50);
        let seen: BTreeMap<String, i32> = it.map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(seen, expected);

        assert_eq!(m.keys().len(), 50);
        assert_eq!(m.values().copied().sum::<i32>(), (0..50).sum::<i32>());

        for (_k, v) in m.iter_mut() {
            *v += 100;
        }
        for v in m.values_mut() {
            *v -= 50;
        }
        assert_eq!(m.get("k7"), Some(&57));

        let owned: BTreeMap<String, i32> = m.into_iter().collect();
        assert_eq!(owned.len(), 50);
        assert_eq!(owned["k0"], 50);
    }

    /// Invariant: iterator equality is (slot array, index); a restarted
    /// iterator compares equal to a fresh one, an advanced one does not.
    #[test]
    fn iterator_equality_is_positional() {
        let m = sample();
        let other = m.clone();
        let a = m.iter();
        let mut b = m.iter();
        assert!(a == b);
        b.next();
        assert!(a != b);
        let restarted = b.clone();
        assert!(restarted == b);
        assert!(m.iter() != other.iter(), "distinct maps never compare equal");
    }

    /// Invariant: exhausted iterators stay exhausted and size hints shrink.
    #[test]
    fn fused_and_size_hint() {
        let mut m: RobinHoodMap<u32, u32> = RobinHoodMap::new();
        m.insert(1, 1);
        m.insert(2, 2);
        let mut it = m.iter();
        assert_eq!(it.size_hint(), (2, Some(2)));
        it.next();
        assert_eq!(it.size_hint(), (1, Some(1)));
        it.next();
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
        assert_eq!(it.size_hint(), (0, Some(0)));
    }

    #[test]
    fn empty_map_iterates_nothing() {
        let mut m: RobinHoodMap<u32, u32> = RobinHoodMap::new();
        assert_eq!(m.iter().next(), None);
        assert_eq!(m.iter_mut().next(), None);
        assert_eq!(m.into_iter().next(), None);
    }

    #[test]
    fn for_loops_over_references() {
        let mut m = sample();
        for (_, v) in &mut m {
            *v *= 2;
        }
        let mut total = 0;
        for (_, v) in &m {
            total += *v;
        }
        assert_eq!(total, 2 * (0..50).sum::<i32>());
    }
}
