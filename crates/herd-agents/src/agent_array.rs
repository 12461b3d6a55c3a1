//! An ordered agent container with aggregate, sampling and sorted-array
//! operations.
//!
//! [`AgentArray`] wraps a `Vec<T>` and dereferences to `[T]`, so slice
//! methods (`len`, `iter`, `first`, `last`, ...) are available directly.
//! Agent sets keep their memberships as `AgentArray<AgentId>` sorted by
//! id and use the sorted-array operations here for membership updates.

use std::cmp::Ordering;
use std::hash::Hash;
use std::ops::Deref;

use herd_core::math::is_between;
use indexmap::IndexSet;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use crate::error::AgentError;

// ── Histogram ───────────────────────────────────────────────────

/// Bin counts produced by [`AgentArray::histogram_of`].
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    /// Count per bin, lowest bin first.
    pub counts: Vec<usize>,
    /// Number of bins.
    pub bins: usize,
    /// Lower edge of the first bin.
    pub min: f64,
    /// Upper edge of the last bin.
    pub max: f64,
    /// Width of each bin.
    pub bin_size: f64,
    /// Length of the array the histogram was built from.
    pub array_size: usize,
}

// ── AgentArray ──────────────────────────────────────────────────

/// An ordered collection of agents (or any values).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AgentArray<T> {
    items: Vec<T>,
}

impl<T> AgentArray<T> {
    /// An empty array.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// An empty array with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Wrap an existing vector.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Unwrap into the underlying vector.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Borrow as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Append an item.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Keep only the items matching `pred`, preserving order.
    pub fn retain(&mut self, pred: impl FnMut(&T) -> bool) {
        self.items.retain(pred);
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Item at `index`, wrapping negative and overlong indices.
    pub fn at_index(&self, index: isize) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len() as isize;
        self.items.get(index.rem_euclid(len) as usize)
    }

    // ── aggregates ──────────────────────────────────────────────

    /// Number of items matching `pred`.
    pub fn count(&self, pred: impl Fn(&T) -> bool) -> usize {
        self.items.iter().filter(|t| pred(*t)).count()
    }

    /// Whether every item matches `pred`. True for an empty array.
    pub fn all(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.items.iter().all(pred)
    }

    /// Sum of `key` over the items.
    pub fn sum_by(&self, key: impl Fn(&T) -> f64) -> f64 {
        self.items.iter().map(key).sum()
    }

    /// Mean of `key` over the items; NaN when empty.
    pub fn avg_by(&self, key: impl Fn(&T) -> f64) -> f64 {
        self.sum_by(key) / self.items.len() as f64
    }

    /// Smallest `key`; `+inf` when empty.
    pub fn min_of(&self, key: impl Fn(&T) -> f64) -> f64 {
        self.items.iter().map(key).fold(f64::INFINITY, f64::min)
    }

    /// Largest `key`; `-inf` when empty.
    pub fn max_of(&self, key: impl Fn(&T) -> f64) -> f64 {
        self.items.iter().map(key).fold(f64::NEG_INFINITY, f64::max)
    }

    /// `(min, max)` of `key`.
    pub fn extent_of(&self, key: impl Fn(&T) -> f64) -> (f64, f64) {
        (self.min_of(&key), self.max_of(&key))
    }

    /// Histogram of `key` over `bins` equal-width bins.
    ///
    /// `range` defaults to the extent of the values. A value equal to the
    /// upper bound falls in the last bin; values outside the range (or
    /// NaN) are dropped with a warning.
    pub fn histogram_of(
        &self,
        key: impl Fn(&T) -> f64,
        bins: usize,
        range: Option<(f64, f64)>,
    ) -> Histogram {
        let (min, max) = range.unwrap_or_else(|| self.extent_of(&key));
        let bin_size = (max - min) / bins as f64;
        let mut counts = vec![0; bins];
        for item in &self.items {
            let v = key(item);
            if !is_between(v, min, max) {
                warn!(value = v, min, max, "histogram value out of range; skipped");
                continue;
            }
            if bins == 0 {
                continue;
            }
            let bin = if bin_size > 0.0 {
                (((v - min) / bin_size).floor() as usize).min(bins - 1)
            } else {
                0
            };
            counts[bin] += 1;
        }
        Histogram {
            counts,
            bins,
            min,
            max,
            bin_size,
            array_size: self.items.len(),
        }
    }

    // ── transforms ──────────────────────────────────────────────

    /// Project every item through `key`.
    pub fn props<U>(&self, key: impl Fn(&T) -> U) -> AgentArray<U> {
        self.items.iter().map(key).collect()
    }

    /// Items matching `pred`, in order.
    pub fn with(&self, pred: impl Fn(&T) -> bool) -> Self
    where
        T: Clone,
    {
        self.items.iter().filter(|t| pred(*t)).cloned().collect()
    }

    /// Every item except those equal to `item`.
    pub fn other(&self, item: &T) -> Self
    where
        T: Clone + PartialEq,
    {
        self.with(|t| t != item)
    }

    /// Items with duplicates removed, first occurrence kept.
    pub fn uniq(&self) -> Self
    where
        T: Clone + Eq + Hash,
    {
        self.items
            .iter()
            .cloned()
            .collect::<IndexSet<T>>()
            .into_iter()
            .collect()
    }

    /// Shuffle in place.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.items.shuffle(rng);
    }

    /// Stable sort by a numeric reporter.
    pub fn sort_by_value(&mut self, reporter: impl Fn(&T) -> f64, ascending: bool) {
        self.items.sort_by(|a, b| {
            let ord = reporter(a)
                .partial_cmp(&reporter(b))
                .unwrap_or(Ordering::Equal);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
    }

    // ── sorted arrays ───────────────────────────────────────────

    /// Lower-bound slot of `item` in an array sorted ascending by `key`.
    pub fn sorted_index<K: PartialOrd>(&self, item: &T, key: impl Fn(&T) -> K) -> usize {
        let k = key(item);
        self.items.partition_point(|t| key(t) < k)
    }

    /// Index of `item` in an array sorted by `key`, if present.
    pub fn agent_index_by<K: PartialOrd>(&self, item: &T, key: impl Fn(&T) -> K) -> Option<usize>
    where
        T: PartialEq,
    {
        let i = self.sorted_index(item, key);
        (self.items.get(i) == Some(item)).then_some(i)
    }

    /// Whether a sorted array contains `item`.
    pub fn contains_by<K: PartialOrd>(&self, item: &T, key: impl Fn(&T) -> K) -> bool
    where
        T: PartialEq,
    {
        self.agent_index_by(item, key).is_some()
    }

    /// Linear search for `item`.
    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.items.iter().position(|t| t == item)
    }

    /// Insert into an array sorted ascending by `key`.
    ///
    /// Fails with [`AgentError::DuplicateKey`] if the slot already holds
    /// an item with an equal key.
    pub fn insert_sorted<K: PartialOrd>(
        &mut self,
        item: T,
        key: impl Fn(&T) -> K,
    ) -> Result<usize, AgentError> {
        let index = self.sorted_index(&item, &key);
        if let Some(existing) = self.items.get(index) {
            if key(existing) == key(&item) {
                return Err(AgentError::DuplicateKey { index });
            }
        }
        self.items.insert(index, item);
        Ok(index)
    }

    /// Remove `item` from an array sorted by `key`.
    ///
    /// Returns the removed item; a missing item is logged and ignored.
    pub fn remove_item<K: PartialOrd>(&mut self, item: &T, key: impl Fn(&T) -> K) -> Option<T>
    where
        T: PartialEq + std::fmt::Debug,
    {
        match self.agent_index_by(item, key) {
            Some(i) => Some(self.items.remove(i)),
            None => {
                warn!(?item, "remove_item: item not in array");
                None
            }
        }
    }

    /// Remove the first occurrence of `item` from an unsorted array.
    pub fn remove_item_linear(&mut self, item: &T) -> Option<T>
    where
        T: PartialEq + std::fmt::Debug,
    {
        match self.index_of(item) {
            Some(i) => Some(self.items.remove(i)),
            None => {
                warn!(?item, "remove_item_linear: item not in array");
                None
            }
        }
    }

    // ── random selection ────────────────────────────────────────

    /// A random item; `None` when empty.
    pub fn one_of<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        if self.items.is_empty() {
            None
        } else {
            self.items.get(rng.random_range(0..self.items.len()))
        }
    }

    /// A random item not equal to `item`.
    pub fn other_one_of<R: Rng + ?Sized>(&self, item: &T, rng: &mut R) -> Option<&T>
    where
        T: PartialEq,
    {
        let candidates: Vec<&T> = self.items.iter().filter(|t| *t != item).collect();
        if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.random_range(0..candidates.len())])
        }
    }

    /// `n` distinct items chosen at random.
    ///
    /// `n == len` returns a copy in the original order.
    pub fn n_of<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Self, AgentError>
    where
        T: Clone,
    {
        let len = self.items.len();
        if n > len {
            return Err(AgentError::NotEnoughItems {
                requested: n,
                available: len,
            });
        }
        if n == len {
            return Ok(self.clone());
        }
        let mut picked = IndexSet::with_capacity(n);
        while picked.len() < n {
            picked.insert(rng.random_range(0..len));
        }
        Ok(picked.into_iter().map(|i| self.items[i].clone()).collect())
    }

    /// `n` distinct items chosen at random, excluding `item`.
    ///
    /// Shuffles the remaining items and keeps the first `n`. Every
    /// `n`-subset is as likely as under repeated draw-and-reject, but the
    /// result order is random rather than the draw order, and the
    /// generator is advanced differently.
    pub fn other_n_of<R: Rng + ?Sized>(
        &self,
        n: usize,
        item: &T,
        rng: &mut R,
    ) -> Result<Self, AgentError>
    where
        T: Clone + PartialEq,
    {
        let mut rest = self.items.clone();
        if let Some(i) = rest.iter().position(|t| t == item) {
            rest.remove(i);
        }
        if n > rest.len() {
            return Err(AgentError::NotEnoughItems {
                requested: n,
                available: rest.len(),
            });
        }
        rest.shuffle(rng);
        rest.truncate(n);
        Ok(Self::from_vec(rest))
    }

    // ── extremes ────────────────────────────────────────────────

    /// The item with the smallest (or largest) reporter value, and that value.
    ///
    /// Ties keep the first item found.
    pub fn min_or_max_of(
        &self,
        want_min: bool,
        reporter: impl Fn(&T) -> f64,
    ) -> Result<(&T, f64), AgentError> {
        let mut best: Option<(&T, f64)> = None;
        for item in &self.items {
            let v = reporter(item);
            let better = match best {
                None => true,
                Some((_, b)) => {
                    if want_min {
                        v < b
                    } else {
                        v > b
                    }
                }
            };
            if better {
                best = Some((item, v));
            }
        }
        best.ok_or(AgentError::EmptyArray)
    }

    /// Item with the smallest reporter value.
    pub fn min_one_of(&self, reporter: impl Fn(&T) -> f64) -> Result<&T, AgentError> {
        self.min_or_max_of(true, reporter).map(|(t, _)| t)
    }

    /// Item with the largest reporter value.
    pub fn max_one_of(&self, reporter: impl Fn(&T) -> f64) -> Result<&T, AgentError> {
        self.min_or_max_of(false, reporter).map(|(t, _)| t)
    }

    /// Smallest reporter value.
    pub fn min_val_of(&self, reporter: impl Fn(&T) -> f64) -> Result<f64, AgentError> {
        self.min_or_max_of(true, reporter).map(|(_, v)| v)
    }

    /// Largest reporter value.
    pub fn max_val_of(&self, reporter: impl Fn(&T) -> f64) -> Result<f64, AgentError> {
        self.min_or_max_of(false, reporter).map(|(_, v)| v)
    }

    /// The `n` items with the smallest reporter values, smallest first.
    pub fn min_n_of(&self, n: usize, reporter: impl Fn(&T) -> f64) -> Result<Self, AgentError>
    where
        T: Clone,
    {
        self.extreme_n(n, reporter, true)
    }

    /// The `n` items with the largest reporter values, largest first.
    pub fn max_n_of(&self, n: usize, reporter: impl Fn(&T) -> f64) -> Result<Self, AgentError>
    where
        T: Clone,
    {
        self.extreme_n(n, reporter, false)
    }

    fn extreme_n(
        &self,
        n: usize,
        reporter: impl Fn(&T) -> f64,
        ascending: bool,
    ) -> Result<Self, AgentError>
    where
        T: Clone,
    {
        if n > self.items.len() {
            return Err(AgentError::NotEnoughItems {
                requested: n,
                available: self.items.len(),
            });
        }
        let mut sorted = self.clone();
        sorted.sort_by_value(reporter, ascending);
        sorted.items.truncate(n);
        Ok(sorted)
    }

    // ── iteration ───────────────────────────────────────────────

    /// Call `f` with each item and its index. The array cannot change
    /// during the loop.
    pub fn for_loop(&self, mut f: impl FnMut(&T, usize)) {
        for (i, item) in self.items.iter().enumerate() {
            f(item, i);
        }
    }

    /// Call `f` with the array and each index in turn, allowing the
    /// callback to mutate the array.
    ///
    /// Visits at most `min(original_len, current_len)` indices; a length
    /// change during the loop is logged.
    pub fn ask(&mut self, mut f: impl FnMut(&mut Self, usize)) {
        let original = self.items.len();
        let mut i = 0;
        while i < original.min(self.items.len()) {
            f(self, i);
            i += 1;
        }
        if self.items.len() != original {
            warn!(
                original,
                current = self.items.len(),
                "array length changed during ask"
            );
        }
    }
}

impl<T: Copy + Into<f64>> AgentArray<T> {
    /// Sum of the items.
    pub fn sum(&self) -> f64 {
        self.sum_by(|&v| v.into())
    }

    /// Mean of the items; NaN when empty.
    pub fn avg(&self) -> f64 {
        self.avg_by(|&v| v.into())
    }

    /// Smallest item; `+inf` when empty.
    pub fn min(&self) -> f64 {
        self.min_of(|&v| v.into())
    }

    /// Largest item; `-inf` when empty.
    pub fn max(&self) -> f64 {
        self.max_of(|&v| v.into())
    }

    /// `(min, max)` of the items.
    pub fn extent(&self) -> (f64, f64) {
        self.extent_of(|&v| v.into())
    }

    /// Histogram of the items; see [`AgentArray::histogram_of`].
    pub fn histogram(&self, bins: usize, range: Option<(f64, f64)>) -> Histogram {
        self.histogram_of(|&v| v.into(), bins, range)
    }
}

impl<T> Default for AgentArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for AgentArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for AgentArray<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for AgentArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for AgentArray<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a AgentArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herd_core::random::seeded_rng;
    use proptest::prelude::*;

    fn nums(v: &[f64]) -> AgentArray<f64> {
        AgentArray::from_vec(v.to_vec())
    }

    #[test]
    fn empty_aggregates() {
        let a: AgentArray<f64> = AgentArray::new();
        assert_eq!(a.sum(), 0.0);
        assert!(a.avg().is_nan());
        assert_eq!(a.min(), f64::INFINITY);
        assert_eq!(a.max(), f64::NEG_INFINITY);
        assert_eq!(a.min_one_of(|&v| v), Err(AgentError::EmptyArray));
    }

    #[test]
    fn aggregates() {
        let a = nums(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        assert_eq!(a.sum(), 14.0);
        assert_eq!(a.avg(), 2.8);
        assert_eq!(a.extent(), (1.0, 5.0));
        assert_eq!(a.count(|&v| v == 1.0), 2);
        assert!(a.all(|&v| v > 0.0));
        let ints = AgentArray::from_vec(vec![3, 1, 4, 1, 5, 3]);
        assert_eq!(ints.uniq().as_slice(), &[3, 1, 4, 5]);
    }

    #[test]
    fn histogram_places_max_in_last_bin() {
        let a = AgentArray::from_vec(vec![0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let h = a.histogram(5, None);
        assert_eq!(h.counts, vec![2, 2, 2, 2, 3]);
        assert_eq!(h.bin_size, 2.0);
        assert_eq!(h.array_size, 11);
    }

    #[test]
    fn histogram_with_gap() {
        let a = AgentArray::from_vec(vec![3u8, 1, 4, 1, 5]);
        let h = a.histogram(4, None);
        assert_eq!(h.counts, vec![2, 0, 1, 2]);
        assert_eq!((h.min, h.max), (1.0, 5.0));
    }

    #[test]
    fn histogram_drops_out_of_range() {
        let a = nums(&[-1.0, 0.0, 0.5, 1.0, 2.0]);
        let h = a.histogram(2, Some((0.0, 1.0)));
        assert_eq!(h.counts, vec![1, 2]);
    }

    #[test]
    fn at_index_wraps() {
        let a = AgentArray::from_vec(vec![10, 20, 30]);
        assert_eq!(a.at_index(-1), Some(&30));
        assert_eq!(a.at_index(4), Some(&20));
        assert_eq!(AgentArray::<i32>::new().at_index(0), None);
    }

    #[test]
    fn sorted_insert_and_remove() {
        let mut a = AgentArray::from_vec(vec![1, 3, 5]);
        assert_eq!(a.insert_sorted(4, |&v| v), Ok(2));
        assert_eq!(a.as_slice(), &[1, 3, 4, 5]);
        assert_eq!(
            a.insert_sorted(3, |&v| v),
            Err(AgentError::DuplicateKey { index: 1 })
        );
        assert_eq!(a.remove_item(&3, |&v| v), Some(3));
        assert_eq!(a.remove_item(&3, |&v| v), None);
        assert_eq!(a.as_slice(), &[1, 4, 5]);
        assert_eq!(a.agent_index_by(&5, |&v| v), Some(2));
        assert!(!a.contains_by(&2, |&v| v));
    }

    #[test]
    fn extremes_first_wins() {
        let a = AgentArray::from_vec(vec![(0, 2.0), (1, 1.0), (2, 1.0), (3, 7.0)]);
        assert_eq!(a.min_one_of(|t| t.1), Ok(&(1, 1.0)));
        assert_eq!(a.max_val_of(|t| t.1), Ok(7.0));
        let top = a.max_n_of(2, |t| t.1).unwrap();
        assert_eq!(top.props(|t| t.0).as_slice(), &[3, 0]);
        assert!(a.min_n_of(5, |t| t.1).is_err());
    }

    #[test]
    fn n_of_edges() {
        let mut rng = seeded_rng(3);
        let a = AgentArray::from_vec(vec![1, 2, 3, 4]);
        assert_eq!(a.n_of(4, &mut rng).unwrap(), a);
        assert_eq!(
            a.n_of(5, &mut rng),
            Err(AgentError::NotEnoughItems {
                requested: 5,
                available: 4
            })
        );
        assert_eq!(
            a.other_n_of(4, &2, &mut rng),
            Err(AgentError::NotEnoughItems {
                requested: 4,
                available: 3
            })
        );
        let others = a.other_n_of(3, &2, &mut rng).unwrap();
        assert!(!others.contains(&2));
        assert_eq!(others.len(), 3);
    }

    #[test]
    fn other_n_of_picks_every_subset_evenly() {
        let mut rng = seeded_rng(11);
        let a = AgentArray::from_vec(vec![0, 1, 2, 3]);
        let mut pairs = std::collections::HashMap::new();
        for _ in 0..3000 {
            let mut pick = a.other_n_of(2, &0, &mut rng).unwrap().into_vec();
            pick.sort_unstable();
            *pairs.entry(pick).or_insert(0usize) += 1;
        }
        assert_eq!(pairs.len(), 3);
        for (pair, count) in pairs {
            assert!((850..1150).contains(&count), "{pair:?} drawn {count} times");
        }
    }

    #[test]
    fn other_one_of_skips_item() {
        let mut rng = seeded_rng(5);
        let a = AgentArray::from_vec(vec![7, 8]);
        for _ in 0..20 {
            assert_eq!(a.other_one_of(&7, &mut rng), Some(&8));
        }
        assert_eq!(AgentArray::from_vec(vec![7]).other_one_of(&7, &mut rng), None);
    }

    #[test]
    fn ask_stops_at_shrunk_length() {
        let mut a = AgentArray::from_vec(vec![1, 2, 3, 4]);
        let mut seen = Vec::new();
        a.ask(|arr, i| {
            seen.push(arr[i]);
            if i == 0 {
                arr.retain(|&v| v != 4);
            }
        });
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn ask_ignores_growth() {
        let mut a = AgentArray::from_vec(vec![1, 2]);
        let mut visits = 0;
        a.ask(|arr, _| {
            visits += 1;
            arr.push(0);
        });
        assert_eq!(visits, 2);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn sort_by_value_descending() {
        let mut a = nums(&[2.0, 9.0, 4.0]);
        a.sort_by_value(|&v| v, false);
        assert_eq!(a.as_slice(), &[9.0, 4.0, 2.0]);
    }

    proptest! {
        #[test]
        fn n_of_is_distinct_subset(len in 1usize..40, seed in any::<u64>(), frac in 0.0f64..1.0) {
            let a: AgentArray<usize> = (0..len).collect();
            let n = (len as f64 * frac) as usize;
            let mut rng = seeded_rng(seed);
            let picked = a.n_of(n, &mut rng).unwrap();
            prop_assert_eq!(picked.len(), n);
            prop_assert_eq!(picked.uniq().len(), n);
            prop_assert!(picked.iter().all(|v| *v < len));
        }

        #[test]
        fn histogram_counts_every_in_range_value(
            values in prop::collection::vec(0.0f64..100.0, 0..60),
            bins in 1usize..12,
        ) {
            let a = AgentArray::from_vec(values.clone());
            let h = a.histogram(bins, Some((0.0, 100.0)));
            prop_assert_eq!(h.counts.iter().sum::<usize>(), values.len());
        }

        #[test]
        fn insert_sorted_keeps_order(values in prop::collection::btree_set(0u32..1000, 0..50)) {
            let mut a = AgentArray::new();
            for v in values.iter().rev() {
                a.insert_sorted(*v, |&x| x).unwrap();
            }
            prop_assert!(a.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
