//! Z-ordered drawable index replicated per camera group
//!
//! The index keeps one `z_order → set` map for the whole scene (the
//! "global" map used by the default camera) and one map per camera-group
//! bit. An element whose mask has `k` bits set lives in the global map and in
//! exactly `k` group maps, always in the bucket keyed by its current z-order.
//!
//! Keys are supplied by the caller on every mutation, as the values the index
//! last saw. The index records them too and refuses mismatches, so a caller
//! that mutates a cached key before updating the index fails immediately
//! instead of leaving a stale bucket behind.

use std::collections::{btree_map, BTreeMap, BTreeSet, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use crate::foundation::collections::set_bits;

use super::IndexError;

/// Number of independent camera groups
pub const MAX_CAMERA_GROUP_COUNT: usize = 64;

type Buckets<E> = BTreeMap<i32, BTreeSet<E>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexEntry {
    z_order: i32,
    camera_group: u64,
}

/// Multi-index of elements by z-order, globally and per camera group
#[derive(Debug, Clone)]
pub struct CameraGroupIndex<E> {
    global: Buckets<E>,
    groups: Vec<Buckets<E>>,
    entries: HashMap<E, IndexEntry>,
}

impl<E> Default for CameraGroupIndex<E> {
    fn default() -> Self {
        Self {
            global: BTreeMap::new(),
            groups: (0..MAX_CAMERA_GROUP_COUNT).map(|_| BTreeMap::new()).collect(),
            entries: HashMap::new(),
        }
    }
}

impl<E> CameraGroupIndex<E>
where
    E: Copy + Ord + Hash + Debug,
{
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `element` under `z_order` globally and in every group of `camera_group`
    pub fn register(&mut self, element: E, z_order: i32, camera_group: u64) -> Result<(), IndexError> {
        if self.entries.contains_key(&element) {
            return Err(IndexError::AlreadyRegistered(format!("{element:?}")));
        }

        insert(&mut self.global, z_order, element);
        for bit in set_bits(camera_group) {
            insert(&mut self.groups[bit], z_order, element);
        }

        self.entries.insert(element, IndexEntry { z_order, camera_group });
        Ok(())
    }

    /// Remove `element`, keyed on the z-order and mask it was last filed under
    pub fn unregister(&mut self, element: E, z_order: i32, camera_group: u64) -> Result<(), IndexError> {
        self.check_keys(element, z_order, camera_group)?;

        remove(&mut self.global, z_order, element);
        for bit in set_bits(camera_group) {
            remove(&mut self.groups[bit], z_order, element);
        }

        self.entries.remove(&element);
        Ok(())
    }

    /// Move `element` from bucket `old` to bucket `new` in every map it belongs to
    pub fn update_z_order(&mut self, element: E, old: i32, new: i32) -> Result<(), IndexError> {
        let entry = self.entry(element)?;
        self.check_keys(element, old, entry.camera_group)?;

        if old == new {
            return Ok(());
        }

        remove(&mut self.global, old, element);
        insert(&mut self.global, new, element);
        for bit in set_bits(entry.camera_group) {
            let group = &mut self.groups[bit];
            remove(group, old, element);
            insert(group, new, element);
        }

        self.entries.insert(element, IndexEntry { z_order: new, ..entry });
        Ok(())
    }

    /// Patch group membership for the bits that differ between `old` and `new`.
    ///
    /// The global map is untouched: the mask does not affect registration.
    pub fn update_camera_group(&mut self, element: E, old: u64, new: u64) -> Result<(), IndexError> {
        let entry = self.entry(element)?;
        self.check_keys(element, entry.z_order, old)?;

        for bit in set_bits(old & !new) {
            remove(&mut self.groups[bit], entry.z_order, element);
        }
        for bit in set_bits(new & !old) {
            insert(&mut self.groups[bit], entry.z_order, element);
        }

        self.entries.insert(element, IndexEntry { camera_group: new, ..entry });
        Ok(())
    }

    /// Buckets in ascending z-order, of the global map (`None`) or of one group.
    ///
    /// A group at or beyond [`MAX_CAMERA_GROUP_COUNT`] yields nothing.
    pub fn iter(&self, group: Option<usize>) -> BucketIter<'_, E> {
        let map = match group {
            None => Some(&self.global),
            Some(index) => self.groups.get(index),
        };
        BucketIter { inner: map.map(BTreeMap::iter) }
    }

    /// Elements of one map in draw order, flattened
    pub fn elements(&self, group: Option<usize>) -> impl Iterator<Item = E> + '_ {
        self.iter(group).flat_map(|(_, bucket)| bucket.iter().copied())
    }

    /// True if `element` is in the global map (`None`) or in the given group
    pub fn contains(&self, element: E, group: Option<usize>) -> bool {
        let Some(entry) = self.entries.get(&element) else {
            return false;
        };
        let map = match group {
            None => Some(&self.global),
            Some(index) => self.groups.get(index),
        };
        map.and_then(|buckets| buckets.get(&entry.z_order))
            .is_some_and(|bucket| bucket.contains(&element))
    }

    /// Bucket of `z_order` in one map, if non-empty
    pub fn bucket(&self, group: Option<usize>, z_order: i32) -> Option<&BTreeSet<E>> {
        match group {
            None => self.global.get(&z_order),
            Some(index) => self.groups.get(index)?.get(&z_order),
        }
    }

    /// True if `element` is registered
    pub fn is_registered(&self, element: E) -> bool {
        self.entries.contains_key(&element)
    }

    /// Number of registered elements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, element: E) -> Result<IndexEntry, IndexError> {
        self.entries
            .get(&element)
            .copied()
            .ok_or_else(|| IndexError::NotRegistered(format!("{element:?}")))
    }

    fn check_keys(&self, element: E, z_order: i32, camera_group: u64) -> Result<(), IndexError> {
        let entry = self.entry(element)?;
        if entry.z_order != z_order || entry.camera_group != camera_group {
            return Err(IndexError::KeyMismatch {
                element: format!("{element:?}"),
                recorded_z_order: entry.z_order,
                recorded_group: entry.camera_group,
                z_order,
                group: camera_group,
            });
        }
        Ok(())
    }
}

fn insert<E: Ord>(buckets: &mut Buckets<E>, z_order: i32, element: E) {
    buckets.entry(z_order).or_default().insert(element);
}

fn remove<E: Ord>(buckets: &mut Buckets<E>, z_order: i32, element: E) {
    if let btree_map::Entry::Occupied(mut bucket) = buckets.entry(z_order) {
        bucket.get_mut().remove(&element);
        if bucket.get().is_empty() {
            bucket.remove();
        }
    }
}

/// Ascending `(z_order, bucket)` pairs of one map of a [`CameraGroupIndex`]
#[derive(Debug, Clone)]
pub struct BucketIter<'a, E> {
    inner: Option<btree_map::Iter<'a, i32, BTreeSet<E>>>,
}

impl<'a, E> Iterator for BucketIter<'a, E> {
    type Item = (i32, &'a BTreeSet<E>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next().map(|(z_order, bucket)| (*z_order, bucket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn z_orders(index: &CameraGroupIndex<u32>, group: Option<usize>) -> Vec<i32> {
        index.iter(group).map(|(z, _)| z).collect()
    }

    /// Every registered element sits exactly where its recorded keys say.
    fn assert_consistent(index: &CameraGroupIndex<u32>) {
        for (&element, entry) in &index.entries {
            let global_hits = index.global.values().filter(|b| b.contains(&element)).count();
            assert_eq!(global_hits, 1, "{element} must be in exactly one global bucket");
            assert!(index.global[&entry.z_order].contains(&element));

            for group in 0..MAX_CAMERA_GROUP_COUNT {
                let expected = (entry.camera_group >> group) & 1 == 1;
                let hits = index.groups[group].values().filter(|b| b.contains(&element)).count();
                assert_eq!(hits, usize::from(expected), "{element} in group {group}");
                assert_eq!(index.contains(element, Some(group)), expected);
            }
        }
        for buckets in std::iter::once(&index.global).chain(&index.groups) {
            assert!(buckets.values().all(|b| !b.is_empty()), "empty buckets must be pruned");
        }
    }

    #[test]
    fn test_register_fans_out_per_bit() {
        let mut index = CameraGroupIndex::new();
        index.register(1u32, 10, 0b101).unwrap();
        index.register(2u32, 5, 0).unwrap();
        index.register(3u32, 10, 1u64 << 63).unwrap();

        assert_eq!(z_orders(&index, None), vec![5, 10]);
        assert_eq!(index.elements(Some(0)).collect::<Vec<_>>(), vec![1]);
        assert_eq!(index.elements(Some(1)).count(), 0);
        assert_eq!(index.elements(Some(2)).collect::<Vec<_>>(), vec![1]);
        assert_eq!(index.elements(Some(63)).collect::<Vec<_>>(), vec![3]);
        assert_eq!(index.bucket(None, 10).map(BTreeSet::len), Some(2));
        assert_consistent(&index);
    }

    #[test]
    fn test_mask_zero_is_global_only() {
        let mut index = CameraGroupIndex::new();
        index.register(7u32, 0, 0).unwrap();

        assert!(index.contains(7, None));
        assert!((0..MAX_CAMERA_GROUP_COUNT).all(|g| !index.contains(7, Some(g))));
    }

    #[test]
    fn test_double_register_fails() {
        let mut index = CameraGroupIndex::new();
        index.register(1u32, 0, 1).unwrap();
        let err = index.register(1u32, 3, 2).unwrap_err();

        assert!(matches!(err, IndexError::AlreadyRegistered(_)));
        assert_eq!(index.len(), 1);
        assert_consistent(&index);
    }

    #[test]
    fn test_unregister_restores_prior_state() {
        let mut index = CameraGroupIndex::new();
        index.register(1u32, 4, 0b11).unwrap();
        let before = (z_orders(&index, None), z_orders(&index, Some(0)), z_orders(&index, Some(1)));

        index.register(2u32, 9, 0b110).unwrap();
        index.unregister(2u32, 9, 0b110).unwrap();

        let after = (z_orders(&index, None), z_orders(&index, Some(0)), z_orders(&index, Some(1)));
        assert_eq!(before, after);
        assert!(z_orders(&index, Some(2)).is_empty());
        assert!(!index.is_registered(2));
        assert_consistent(&index);
    }

    #[test]
    fn test_unregister_unknown_or_stale_keys_fails() {
        let mut index = CameraGroupIndex::new();
        assert!(matches!(index.unregister(1u32, 0, 0), Err(IndexError::NotRegistered(_))));

        index.register(1u32, 2, 1).unwrap();
        let err = index.unregister(1u32, 3, 1).unwrap_err();
        assert!(matches!(err, IndexError::KeyMismatch { recorded_z_order: 2, z_order: 3, .. }));
        assert!(index.contains(1, None));
    }

    #[test]
    fn test_z_order_move_law() {
        let mut index = CameraGroupIndex::new();
        index.register(1u32, 100, 0b11).unwrap();
        index.register(2u32, 100, 0b01).unwrap();

        index.update_z_order(1u32, 100, -5).unwrap();

        for group in [None, Some(0), Some(1)] {
            assert!(index.bucket(group, 100).map_or(true, |b| !b.contains(&1)));
            assert!(index.bucket(group, -5).is_some_and(|b| b.contains(&1)));
        }
        assert_eq!(z_orders(&index, Some(1)), vec![-5]);
        assert_eq!(z_orders(&index, Some(0)), vec![-5, 100]);
        assert_consistent(&index);

        // old bucket must be the recorded one
        assert!(matches!(index.update_z_order(1u32, 100, 0), Err(IndexError::KeyMismatch { .. })));
    }

    #[test]
    fn test_group_move_law() {
        let mut index = CameraGroupIndex::new();
        index.register(1u32, 3, 0b0110).unwrap();

        index.update_camera_group(1u32, 0b0110, 0b1100 | 1u64 << 40).unwrap();

        assert!(!index.contains(1, Some(1)));
        assert!(index.contains(1, Some(2)));
        assert!(index.contains(1, Some(3)));
        assert!(index.contains(1, Some(40)));
        assert!(index.contains(1, None));
        assert_consistent(&index);

        index.update_camera_group(1u32, 0b1100 | 1u64 << 40, 0).unwrap();
        assert!((0..MAX_CAMERA_GROUP_COUNT).all(|g| !index.contains(1, Some(g))));
        assert!(index.contains(1, None));
        assert_consistent(&index);
    }

    #[test]
    fn test_iteration_is_ascending_and_restartable() {
        let mut index = CameraGroupIndex::new();
        for (element, z) in [(1u32, 300), (2, 200), (3, 150), (4, 200)] {
            index.register(element, z, 1).unwrap();
        }

        let first: Vec<u32> = index.elements(Some(0)).collect();
        let second: Vec<u32> = index.elements(Some(0)).collect();
        assert_eq!(first, vec![3, 2, 4, 1]);
        assert_eq!(first, second);
        assert_eq!(index.iter(Some(MAX_CAMERA_GROUP_COUNT)).count(), 0);
    }

    #[test]
    fn test_randomized_mutations_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(0x2545_f491_4f6c_dd1d);

        let mut index = CameraGroupIndex::new();
        let mut live: HashMap<u32, (i32, u64)> = HashMap::new();

        for _ in 0..2_000 {
            let element: u32 = rng.gen_range(0..32);
            let z: i32 = rng.gen_range(-3..=3);
            let mask = rng.gen::<u64>() & rng.gen::<u64>();

            match (live.get(&element).copied(), rng.gen_range(0..3)) {
                (None, _) => {
                    index.register(element, z, mask).unwrap();
                    live.insert(element, (z, mask));
                }
                (Some((old_z, old_mask)), 0) => {
                    index.unregister(element, old_z, old_mask).unwrap();
                    live.remove(&element);
                }
                (Some((old_z, old_mask)), 1) => {
                    index.update_z_order(element, old_z, z).unwrap();
                    live.insert(element, (z, old_mask));
                }
                (Some((old_z, old_mask)), _) => {
                    index.update_camera_group(element, old_mask, mask).unwrap();
                    live.insert(element, (old_z, mask));
                }
            }
        }

        assert_eq!(index.len(), live.len());
        assert_consistent(&index);
        for (&element, &(z, mask)) in &live {
            assert!(index.bucket(None, z).is_some_and(|bucket| bucket.contains(&element)));
            for group in 0..MAX_CAMERA_GROUP_COUNT {
                assert_eq!(index.contains(element, Some(group)), (mask >> group) & 1 == 1);
            }
        }
    }
}
