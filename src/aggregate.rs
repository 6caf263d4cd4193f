//! Per-key aggregates and the tables that hold them
//!
//! `Aggregate` is a commutative monoid under [`Aggregate::merge`] with
//! [`Aggregate::default`] as identity, so partial tables can be folded in any
//! order, at any chunk granularity, and give the same final table.

use rustc_hash::FxHashMap;

use crate::temperature::FixedPoint;

/// Running min/max/count/sum for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    min: FixedPoint,
    max: FixedPoint,
    count: u64,
    sum: i64,
}

impl Default for Aggregate {
    /// Empty aggregate: no observations, min/max undefined
    fn default() -> Self {
        Self {
            min: FixedPoint::from_tenths(i16::MAX),
            max: FixedPoint::from_tenths(i16::MIN),
            count: 0,
            sum: 0,
        }
    }
}

impl Aggregate {
    /// Aggregate holding exactly one observation
    pub fn new(value: FixedPoint) -> Self {
        Self {
            min: value,
            max: value,
            count: 1,
            sum: i64::from(value.tenths()),
        }
    }

    #[inline]
    pub fn observe(&mut self, value: FixedPoint) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
        self.sum += i64::from(value.tenths());
    }

    /// Fold another aggregate for the same key into this one
    #[inline]
    pub fn merge(&mut self, other: &Aggregate) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count += other.count;
        self.sum += other.sum;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn min(&self) -> Option<FixedPoint> {
        (!self.is_empty()).then_some(self.min)
    }

    pub fn max(&self) -> Option<FixedPoint> {
        (!self.is_empty()).then_some(self.max)
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Exact sum of observations, in tenths
    pub fn sum_tenths(&self) -> i64 {
        self.sum
    }

    /// Arithmetic mean in real units (`sum / count / 10`)
    pub fn mean(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.sum as f64 / self.count as f64 / 10.0)
    }
}

/// Mapping from owned key bytes to their aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateTable {
    entries: FxHashMap<Box<[u8]>, Aggregate>,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation for `key`.
    ///
    /// The key is borrowed for the lookup and only copied into owned storage
    /// the first time it is seen, so the table never points into the chunk
    /// it was built from.
    #[inline]
    pub fn observe(&mut self, key: &[u8], value: FixedPoint) {
        match self.entries.get_mut(key) {
            Some(aggregate) => aggregate.observe(value),
            None => {
                self.entries.insert(Box::from(key), Aggregate::new(value));
            }
        }
    }

    /// Fold `other` into this table, consuming it.
    pub fn merge(&mut self, other: AggregateTable) {
        if self.entries.is_empty() {
            self.entries = other.entries;
            return;
        }
        for (key, partial) in other.entries {
            self.entries
                .entry(key)
                .and_modify(|global| global.merge(&partial))
                .or_insert(partial);
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&Aggregate> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of observations across all keys
    pub fn total_count(&self) -> u64 {
        self.entries.values().map(Aggregate::count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Aggregate)> {
        self.entries.iter().map(|(key, agg)| (&**key, agg))
    }

    /// Entries ordered ascending by key bytes
    pub fn sorted(&self) -> Vec<(&[u8], &Aggregate)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
