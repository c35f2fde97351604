use proptest::prelude::*;
use robin_hood_map::{LookupError, RobinHoodMap};
use std::collections::BTreeMap;
use std::hash::{BuildHasher, Hasher};

#[derive(Clone, Default)]
struct IdentityBuildHasher;
#[derive(Default)]
struct IdentityHasher(u64);
impl BuildHasher for IdentityBuildHasher {
    type Hasher = IdentityHasher;
    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher::default()
    }
}
impl Hasher for IdentityHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 << 8) | u64::from(b);
        }
    }
    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
    fn finish(&self) -> u64 {
        self.0
    }
}

// Property: round-trip and size accounting for n distinct inserts followed
// by erasing a subset of them.
proptest! {
    #[test]
    fn prop_round_trip_and_size(
        keys in proptest::collection::btree_set(any::<u32>(), 0..200),
        erase_mask in proptest::collection::vec(any::<bool>(), 200),
    ) {
        let mut m = RobinHoodMap::new();
        for &k in &keys {
            prop_assert!(m.insert(k, u64::from(k) * 3));
            prop_assert_eq!(m.get(&k), Some(&(u64::from(k) * 3)));
        }
        prop_assert_eq!(m.len(), keys.len());

        let mut erased = 0;
        for (&k, &gone) in keys.iter().zip(&erase_mask) {
            if gone {
                m.erase(&k);
                erased += 1;
                prop_assert!(m.find(&k).is_none());
                prop_assert_eq!(m.at(&k), Err(LookupError::KeyNotFound));
            }
        }
        prop_assert_eq!(m.len(), keys.len() - erased);
        prop_assert_eq!(m.iter().count(), m.len());
    }
}

// Property: against a BTreeMap model with clustered identity hashes, the
// map agrees on contents, insert is first-wins, and erasing one key never
// makes another key's probe longer.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_clustered_model_equivalence(
        ops in proptest::collection::vec((0u64..64, any::<bool>(), any::<i16>()), 1..150),
    ) {
        let mut sut = RobinHoodMap::with_hasher(IdentityBuildHasher);
        let mut model: BTreeMap<u64, i16> = BTreeMap::new();
        let mut capacity = sut.capacity();

        for (k, is_insert, v) in ops {
            // Multiples of 8 pile onto few home slots.
            let k = k * 8 % 96;
            if is_insert {
                let fresh = !model.contains_key(&k);
                prop_assert_eq!(sut.insert(k, v), fresh);
                model.entry(k).or_insert(v);
            } else {
                let before: Vec<(u64, usize)> = sut
                    .keys()
                    .filter(|&&o| o != k)
                    .map(|&o| (o, sut.displacement(&o).unwrap_or(usize::MAX)))
                    .collect();
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
                for (o, d) in before {
                    let now = sut.displacement(&o);
                    prop_assert!(now.map_or(false, |n| n <= d), "key {} after erase of {}", o, k);
                }
            }
            prop_assert!(sut.capacity() >= capacity);
            capacity = sut.capacity();

            let contents: BTreeMap<u64, i16> = sut.iter().map(|(k, v)| (*k, *v)).collect();
            prop_assert_eq!(&contents, &model);
        }
    }
}
