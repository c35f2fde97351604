//! robin-hood-map: a single-owner, open-addressing hash map that balances
//! probe lengths with Robin Hood insertion and deletes without tombstones
//! using backward shifts.
//!
//! Internal Design:
//!
//! Summary
//! - Layers:
//!   - SlotTable<K, V>: owns the boxed slot array and implements probing,
//!     Robin Hood placement, doubling and backward-shift deletion. Works
//!     on precomputed `u64` hashes and caller-supplied key comparison.
//!   - RobinHoodMap<K, V, S>: public API. Hashes keys with `S:
//!     BuildHasher`, hands out positional `Handle`s and borrowing
//!     iterators, and guards entry points with a debug-only reentrancy
//!     check.
//!
//! Table invariants
//! - `len` equals the number of occupied slots; capacity starts at 1 and
//!   only ever doubles.
//! - Every entry sits `cost` slots after its home index `hash % capacity`.
//!   Probing never wraps around, so a run ends at the array boundary.
//! - Robin Hood balance: an entry with `cost > 0` is preceded by an
//!   occupied slot whose cost is at least `cost - 1`. The whole range from
//!   an entry's home to the entry is therefore occupied, and a lookup can
//!   stop at the first empty slot.
//! - Keys are unique; inserting an existing key changes nothing.
//!
//! Growth
//! - Insertion walks the eviction chain, seating the carried entry and
//!   picking up whatever richer entry it displaces. If the entry in hand
//!   reaches the end of the array, the table doubles and re-seats every
//!   stored entry in old slot order with fresh costs. The entry in hand goes
//!   last, starting over from its new home. Re-seating may itself run off
//!   the end and grow again.
//! - The table follows the inserted entry through evictions and growth, so
//!   `get_or_insert_with` can return the slot it finally occupies.
//! - Keys near the top of the array force growth sooner than keys near the
//!   bottom. This follows from the missing wraparound and is intentional.
//!
//! Hasher and rehashing
//! - Each slot caches the key's `u64` hash; growth never calls `K: Hash`.
//!
//! Invalidation
//! - Iterators and references borrow the map, so the borrow checker
//!   rejects any mutation while they are alive.
//! - `Handle`s are plain slot positions. Any growth, erase or clear may
//!   move entries, after which an old handle may resolve to another entry
//!   or to nothing. `iter_from` resumes slot-order iteration at a handle.
//!
//! Notes and non-goals
//! - `Send` but not `Sync`; wrap the map in a `Mutex` to share it.
//! - No shrinking, no alternative growth strategies, no duplicate keys.

mod error;
mod iter;
mod reentrancy;
mod robin_hood_map;
mod robin_hood_map_proptest;
mod table;

// Public surface
pub use error::LookupError;
pub use iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use robin_hood_map::{Handle, RobinHoodMap};
