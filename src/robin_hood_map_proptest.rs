#![cfg(test)]

// Property tests for RobinHoodMap kept inside the crate so they can check
// the raw slot table invariants after every step.

use crate::error::LookupError;
use crate::robin_hood_map::RobinHoodMap;
use core::hash::{BuildHasher, Hasher};
use hashbrown::HashMap;
use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fmt;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    IndexAssign(usize, i32),
    Erase(usize),
    Find(usize),
    At(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::IndexAssign(i, v)),
            3 => idx.clone().prop_map(OpI::Erase),
            1 => idx.clone().prop_map(OpI::Find),
            1 => idx.clone().prop_map(OpI::At),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn displacements<S: BuildHasher>(m: &RobinHoodMap<Key, i32, S>) -> Vec<(Key, usize)> {
    m.keys()
        .map(|k| (k.clone(), m.displacement(k).expect("iterated key is findable")))
        .collect()
}

fn run_scenario<S: BuildHasher>(
    mut sut: RobinHoodMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
    let mut capacity = sut.capacity();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                let inserted = sut.insert(k.clone(), v);
                prop_assert_eq!(inserted, !already, "insert adds iff the key is new");
                model.entry(k).or_insert(v);
            }
            OpI::IndexAssign(i, v) => {
                let k = key_from(pool, i);
                *sut.get_or_insert_default(k.clone()) = v;
                model.insert(k, v);
            }
            OpI::Erase(i) => {
                let k = key_from(pool, i);
                let before = displacements(&sut);
                let removed = sut.remove(&k);
                prop_assert_eq!(removed, model.remove(&k));
                prop_assert!(sut.find(&k).is_none());
                // Backward shift never lengthens another key's probe.
                for (other, d) in before.into_iter().filter(|(o, _)| *o != k) {
                    let now = sut.displacement(&other);
                    prop_assert!(now.is_some(), "{:?} lost by erase", other);
                    prop_assert!(now.unwrap_or(0) <= d, "{:?} moved farther from home", other);
                }
            }
            OpI::Find(i) => {
                let k = key_from(pool, i);
                let h = sut.find(&k);
                prop_assert_eq!(h.is_some(), model.contains_key(&k));
                if let Some(h) = h {
                    prop_assert_eq!(h.key(&sut), Some(&k));
                    prop_assert_eq!(h.value(&sut), model.get(&k));
                }
            }
            OpI::At(i) => {
                let k = key_from(pool, i);
                match model.get(&k) {
                    Some(v) => prop_assert_eq!(sut.at(&k), Ok(v)),
                    None => prop_assert_eq!(sut.at(&k), Err(LookupError::KeyNotFound)),
                }
            }
            OpI::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(vr) = sut.get_mut(&k) {
                    *vr = vr.saturating_add(d);
                    let mv = model.get_mut(&k).expect("model tracks live key");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.keys().cloned().collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
                prop_assert_eq!(sut.iter().count(), sut.len());
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), capacity, "clear keeps capacity");
            }
        }

        // Post-conditions after each op
        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.capacity() >= capacity, "capacity never shrinks");
        prop_assert!(
            sut.capacity() == capacity || sut.capacity() % capacity == 0,
            "capacity grows by doubling"
        );
        capacity = sut.capacity();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(RobinHoodMap::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher: every key shares home 0, so
// the whole table is one probe run.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Low-entropy variant: keys hash to a handful of values, producing many
// short overlapping runs and frequent evictions.
#[derive(Clone, Default)]
struct FewBucketsBuildHasher;
#[derive(Default)]
struct FewBucketsHasher(DefaultHasher);
impl BuildHasher for FewBucketsBuildHasher {
    type Hasher = FewBucketsHasher;
    fn build_hasher(&self) -> Self::Hasher {
        FewBucketsHasher::default()
    }
}
impl Hasher for FewBucketsHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes);
    }
    fn finish(&self) -> u64 {
        self.0.finish() % 5
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(RobinHoodMap::with_hasher(ConstBuildHasher), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_few_buckets((pool, ops) in arb_scenario()) {
        run_scenario(RobinHoodMap::with_hasher(FewBucketsBuildHasher), &pool, ops)?;
    }

    // Clones are deep: mutating either side leaves the other untouched.
    #[test]
    fn prop_clone_independence((pool, ops) in arb_scenario(), extra in "[A-Z]{1,4}") {
        let mut original: RobinHoodMap<Key, i32> = RobinHoodMap::new();
        for (i, k) in pool.iter().enumerate() {
            original.insert(Key(k.clone()), i as i32);
        }
        let snapshot: Vec<(Key, i32)> = original.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let mut copy = original.clone();
        prop_assert!(copy == original);

        run_scenario(original.clone(), &pool, ops)?;
        copy.insert(Key(extra.clone()), -1);
        if let Some(first) = pool.first() {
            copy.erase(first.as_str());
        }
        let after: Vec<(Key, i32)> = original.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(&after, &snapshot);
        prop_assert!(!original.contains_key(extra.as_str()));

        original.clear();
        prop_assert!(copy.contains_key(extra.as_str()));
    }
}

// Slot-exact comparison against a plain reference table. Keys hash to
// themselves, so every placement decision is reproducible and the two
// tables must agree on layout, not only on contents.

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
    fn write(&mut self, _bytes: &[u8]) {
        unreachable!("only u64 keys are hashed here");
    }
    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
    fn finish(&self) -> u64 {
        self.0
    }
}

/// Straight-line model: `(key, cost)` per slot, growth restarts the
/// carried entry from its new home after re-inserting the old array.
struct ReferenceTable {
    slots: Vec<Option<(u64, usize)>>,
}

impl ReferenceTable {
    fn new() -> Self {
        Self { slots: vec![None] }
    }

    fn position(&self, key: u64) -> Option<usize> {
        let home = (key % self.slots.len() as u64) as usize;
        self.slots[home..]
            .iter()
            .take_while(|s| s.is_some())
            .position(|s| matches!(s, Some((k, _)) if *k == key))
            .map(|offset| home + offset)
    }

    fn insert(&mut self, key: u64) {
        if self.position(key).is_none() {
            self.place(key);
        }
    }

    fn place(&mut self, key: u64) {
        let mut carried = (key, 0);
        let mut index = (key % self.slots.len() as u64) as usize;
        loop {
            if index == self.slots.len() {
                let old = std::mem::replace(&mut self.slots, vec![None; index * 2]);
                for (k, _) in old.into_iter().flatten() {
                    self.place(k);
                }
                carried.1 = 0;
                index = (carried.0 % self.slots.len() as u64) as usize;
            }
            let current = self.slots[index];
            match current {
                None => {
                    self.slots[index] = Some(carried);
                    return;
                }
                Some(occupant) if occupant.1 < carried.1 => {
                    self.slots[index] = Some(carried);
                    carried = occupant;
                }
                Some(_) => {}
            }
            carried.1 += 1;
            index += 1;
        }
    }

    fn erase(&mut self, key: u64) {
        let Some(gap) = self.position(key) else { return };
        self.slots[gap] = None;
        let mut next = gap + 1;
        while let Some(Some((_, cost))) = self.slots.get_mut(next) {
            if *cost == 0 {
                break;
            }
            *cost -= 1;
            self.slots.swap(next - 1, next);
            next += 1;
        }
    }

    fn layout(&self) -> Vec<(usize, u64, usize)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|(k, c)| (i, k, c)))
            .collect()
    }
}

#[derive(Clone, Debug)]
enum LayoutOp {
    Insert(u64),
    IndexAssign(u64),
    Erase(u64),
}

fn arb_layout_op() -> impl Strategy<Value = LayoutOp> {
    prop_oneof![
        4 => (0u64..32).prop_map(LayoutOp::Insert),
        1 => (0u64..32).prop_map(LayoutOp::IndexAssign),
        3 => (0u64..32).prop_map(LayoutOp::Erase),
    ]
}

fn layout_of(m: &RobinHoodMap<u64, u64, IdentityBuildHasher>) -> Vec<(usize, u64, usize)> {
    m.keys()
        .map(|&k| {
            let index = m.find(&k).map(|h| h.index()).unwrap_or(usize::MAX);
            (index, k, m.displacement(&k).unwrap_or(usize::MAX))
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]
    #[test]
    fn prop_layout_matches_reference_table(ops in proptest::collection::vec(arb_layout_op(), 1..120)) {
        let mut sut = RobinHoodMap::with_hasher(IdentityBuildHasher);
        let mut reference = ReferenceTable::new();
        for op in ops {
            match op {
                LayoutOp::Insert(k) => {
                    sut.insert(k, k);
                    reference.insert(k);
                }
                LayoutOp::IndexAssign(k) => {
                    *sut.get_or_insert_default(k) = k;
                    reference.insert(k);
                    prop_assert_eq!(sut.get(&k), Some(&k));
                }
                LayoutOp::Erase(k) => {
                    sut.erase(&k);
                    reference.erase(k);
                }
            }
            sut.assert_invariants();
            prop_assert_eq!(sut.capacity(), reference.slots.len());
            prop_assert_eq!(layout_of(&sut), reference.layout());
        }
    }
}

#[test]
fn reference_table_growth_order() {
    let mut reference = ReferenceTable::new();
    let mut sut = RobinHoodMap::with_hasher(IdentityBuildHasher);
    for k in [5u64, 26, 8, 2, 24] {
        reference.insert(k);
        sut.insert(k, k);
    }
    let expected = vec![(0, 8, 0), (1, 24, 1), (2, 2, 0), (3, 26, 1), (5, 5, 0)];
    assert_eq!(reference.layout(), expected);
    assert_eq!(layout_of(&sut), expected);
}
