//! Comparison strategies used by the differ.
//!
//! [`diff_with`](crate::diff::diff_with) takes a [`ValueComparator`]; the
//! default one compares every name of a key with a [`DataComparator`] and can
//! skip keys whose contents change between runs for reasons nobody cares
//! about.

use crate::diff::ValueDiff;
use crate::error::Result;
use crate::registry::{DataName, Key, Value};
use crate::value::Data;
use std::collections::BTreeSet;

/// Decides whether two values stored under the same name are equal.
pub trait DataComparator {
    /// Returns `Ok(true)` if `data1` and `data2` are the same.
    ///
    /// # Errors
    ///
    /// Implementations may fail; the error aborts the whole diff.
    fn compare_data(&self, name: &DataName, data1: &Data, data2: &Data) -> Result<bool>;
}

impl<F> DataComparator for F
where
    F: Fn(&DataName, &Data, &Data) -> Result<bool>,
{
    fn compare_data(&self, name: &DataName, data1: &Data, data2: &Data) -> Result<bool> {
        self(name, data1, data2)
    }
}

/// Equal when both the type tag and the canonical text form match.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDataComparator;

impl DataComparator for DefaultDataComparator {
    fn compare_data(&self, _name: &DataName, data1: &Data, data2: &Data) -> Result<bool> {
        if data1.data_type() != data2.data_type() {
            return Ok(false);
        }
        Ok(data1.to_string() == data2.to_string())
    }
}

/// Computes the per-name difference of one key present in both snapshots.
pub trait ValueComparator {
    /// Returns the names of `key` that differ between `value1` and `value2`.
    ///
    /// # Errors
    ///
    /// Implementations may fail; the error aborts the whole diff.
    fn compare_value(&self, key: &Key, value1: &Value, value2: &Value) -> Result<ValueDiff>;
}

/// Name-by-name comparison with an optional set of ignored keys.
#[derive(Debug, Clone, Default)]
pub struct DefaultValueComparator<C = DefaultDataComparator> {
    /// Comparator applied to names present on both sides.
    pub data_comparator: C,
    /// Keys that always compare as unchanged.
    pub ignore_keys: BTreeSet<Key>,
}

impl DefaultValueComparator {
    /// Creates a comparator using [`DefaultDataComparator`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: DataComparator> DefaultValueComparator<C> {
    /// Creates a comparator with a custom data comparator.
    pub fn with_data_comparator(data_comparator: C) -> Self {
        Self {
            data_comparator,
            ignore_keys: BTreeSet::new(),
        }
    }

    /// Returns this comparator with `keys` added to the ignore list.
    pub fn ignoring<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        self.ignore_keys.extend(keys.into_iter().map(Into::into));
        self
    }
}

impl<C: DataComparator> ValueComparator for DefaultValueComparator<C> {
    fn compare_value(&self, key: &Key, value1: &Value, value2: &Value) -> Result<ValueDiff> {
        let mut diff = ValueDiff::new();
        if self.ignore_keys.contains(key) {
            tracing::trace!(key = %key, "Ignoring key");
            return Ok(diff);
        }

        for (name, data1) in value1 {
            match value2.get(name) {
                None => {
                    diff.value1.insert(name.clone(), data1.clone());
                }
                Some(data2) => {
                    if !self.data_comparator.compare_data(name, data1, data2)? {
                        diff.value1.insert(name.clone(), data1.clone());
                        diff.value2.insert(name.clone(), data2.clone());
                    }
                }
            }
        }
        for (name, data2) in value2 {
            if !value1.contains(name) {
                diff.value2.insert(name.clone(), data2.clone());
            }
        }
        Ok(diff)
    }
}
