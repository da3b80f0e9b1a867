//! The sweep status structure.
//!
//! Active items live in a [`Slab`] owned by the sweep; the ordered set
//! only stores their keys together with a pointer to the slab, and
//! compares through it.
use log::warn;
use slab::Slab;
use std::{cmp::Ordering, collections::BTreeSet, fmt::Debug, ops::Bound};

/// Key of an item in the status, ordered by the item it refers to.
pub struct Active<T> {
    key: usize,
    storage: *const Slab<T>,
}

impl<T: Debug> Debug for Active<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Active")
            .field("key", &self.key)
            .field("item", &self.get())
            .finish()
    }
}

impl<T> Active<T> {
    /// # Safety
    ///
    /// The caller must ensure that:
    ///
    /// 1. `storage` outlives the created object, and is not moved
    /// while it is alive;
    ///
    /// 2. all items co-existing in one set are linearly ordered by
    /// `T: PartialOrd`, and this order does not change while they are
    /// in the set. Violating this is not memory-UB, but causes panics
    /// or wrong neighbours.
    unsafe fn new(key: usize, storage: &Slab<T>) -> Self {
        Active {
            key,
            storage: storage as *const _,
        }
    }

    fn get(&self) -> &T {
        // Safety: guaranteed by the contract of `new`.
        let slab = unsafe { &*self.storage as &Slab<_> };
        &slab[self.key]
    }
}

/// Equality based on key.
impl<T> PartialEq for Active<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: PartialOrd> Eq for Active<T> {}

impl<T: PartialOrd> PartialOrd for Active<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.get().partial_cmp(other.get())
    }
}

/// Panics if the items are not comparable: the status must only hold
/// items that are ordered at the current sweep position.
impl<T: PartialOrd + Debug> Ord for Active<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or_else(|| {
            panic!(
                "couldn't compare active items: {:?} <=> {:?}",
                self, other
            );
        })
    }
}

/// Insert, remove and find the neighbours of items in the status.
pub trait Access: Default {
    type Item;
    fn prev_key(&self, key: usize, storage: &Slab<Self::Item>) -> Option<usize>;
    fn next_key(&self, key: usize, storage: &Slab<Self::Item>) -> Option<usize>;
    /// # Safety
    ///
    /// See [`Active::new`]: `storage` must stay at its address while
    /// the key is in the set.
    unsafe fn add_key(&mut self, key: usize, storage: &Slab<Self::Item>);
    fn remove_key(&mut self, key: usize, storage: &Slab<Self::Item>);
}

impl<T: PartialOrd + Debug> Access for BTreeSet<Active<T>> {
    type Item = T;

    /// The key of the greatest active item smaller than the item at
    /// `key`. The item itself need not be in the set (it may be a
    /// query).
    #[inline]
    fn prev_key(&self, key: usize, storage: &Slab<Self::Item>) -> Option<usize> {
        // Safety: the temporary only lives in this call, while we hold
        // a shared reference to `storage`.
        let item = unsafe { Active::new(key, storage) };
        self.range((Bound::Unbounded, Bound::Excluded(item)))
            .next_back()
            .map(|s| s.key)
    }

    #[inline]
    fn next_key(&self, key: usize, storage: &Slab<Self::Item>) -> Option<usize> {
        // Safety: as in `prev_key`.
        let item = unsafe { Active::new(key, storage) };
        self.range((Bound::Excluded(item), Bound::Unbounded))
            .next()
            .map(|s| s.key)
    }

    #[inline]
    unsafe fn add_key(&mut self, key: usize, storage: &Slab<Self::Item>) {
        debug_assert!(storage.contains(key));
        assert!(self.insert(Active::new(key, storage)));
    }

    /// Remove the item at `key`. If rounding has left the set out of
    /// order so that the search misses it, fall back to a linear scan.
    fn remove_key(&mut self, key: usize, storage: &Slab<Self::Item>) {
        debug_assert!(storage.contains(key));
        // Safety: as in `prev_key`.
        if !self.remove(&unsafe { Active::new(key, storage) }) {
            warn!("active item {} not found by search, scanning", key);
            self.retain(|a| a.key != key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_by_item_order() {
        let mut storage: Box<Slab<i32>> = Box::new(Slab::new());
        let k30 = storage.insert(30);
        let k10 = storage.insert(10);
        let k20 = storage.insert(20);
        let query = storage.insert(15);

        let mut status: BTreeSet<Active<i32>> = Default::default();
        unsafe {
            status.add_key(k30, &storage);
            status.add_key(k10, &storage);
            status.add_key(k20, &storage);
        }

        assert_eq!(status.prev_key(k20, &storage), Some(k10));
        assert_eq!(status.next_key(k20, &storage), Some(k30));
        assert_eq!(status.prev_key(k10, &storage), None);
        assert_eq!(status.prev_key(query, &storage), Some(k10));
        assert_eq!(status.next_key(query, &storage), Some(k20));

        status.remove_key(k20, &storage);
        assert_eq!(status.next_key(k10, &storage), Some(k30));
    }

    #[test]
    fn remove_survives_a_changed_item() {
        let mut storage: Box<Slab<i32>> = Box::new(Slab::new());
        let keys: Vec<_> = (0..8).map(|i| storage.insert(10 * i)).collect();
        let mut status: BTreeSet<Active<i32>> = Default::default();
        for &k in &keys {
            unsafe { status.add_key(k, &storage) };
        }
        // The search for the moved item goes the wrong way.
        storage[keys[5]] = 5;
        status.remove_key(keys[5], &storage);
        assert_eq!(status.len(), 7);
        assert_eq!(status.next_key(keys[4], &storage), Some(keys[6]));
    }
}
