//! Structural difference between two registry snapshots.

use crate::compare::{DefaultValueComparator, ValueComparator};
use crate::error::Result;
use crate::registry::{Key, Registry, Value};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Differing names of one key present in both snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValueDiff {
    /// Snapshot 1 side: names missing from snapshot 2 or holding other data.
    pub value1: Value,
    /// Snapshot 2 side: names missing from snapshot 1 or holding other data.
    pub value2: Value,
}

impl ValueDiff {
    /// Creates an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if either side holds anything.
    pub fn has_diff(&self) -> bool {
        !self.value1.is_empty() || !self.value2.is_empty()
    }
}

/// Result of comparing two registries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegistryDiff {
    /// Keys only present in snapshot 1, with all their data.
    pub registry1_only: Registry,
    /// Keys only present in snapshot 2, with all their data.
    pub registry2_only: Registry,
    /// Keys present in both whose data differs.
    pub registry_changed: BTreeMap<Key, ValueDiff>,
}

impl RegistryDiff {
    /// Creates an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the two snapshots were equal.
    pub fn is_empty(&self) -> bool {
        self.registry1_only.is_empty()
            && self.registry2_only.is_empty()
            && self.registry_changed.is_empty()
    }
}

/// Compares two registries with the default comparators.
///
/// # Errors
///
/// The default comparators never fail; see [`diff_with`].
///
/// # Examples
///
/// ```rust
/// use wine_regdiff::{diff, Data, Registry, Value};
///
/// let reg1 = Registry::new().with("K", Value::new().with("V", Data::Dword(1)));
/// let reg2 = Registry::new().with("K", Value::new().with("V", Data::Dword(2)));
///
/// let changes = diff(&reg1, &reg2).unwrap();
/// assert!(changes.registry1_only.is_empty());
/// assert_eq!(changes.registry_changed["K"].value2, Value::new().with("V", Data::Dword(2)));
/// ```
pub fn diff(reg1: &Registry, reg2: &Registry) -> Result<RegistryDiff> {
    diff_with(reg1, reg2, &DefaultValueComparator::new())
}

/// Compares two registries, delegating keys present in both to `comparator`.
///
/// # Errors
///
/// Returns the first error raised by `comparator`.
#[instrument(skip_all, fields(keys1 = reg1.len(), keys2 = reg2.len()))]
pub fn diff_with<C>(reg1: &Registry, reg2: &Registry, comparator: &C) -> Result<RegistryDiff>
where
    C: ValueComparator + ?Sized,
{
    let mut diff = RegistryDiff::new();

    for (key, value1) in reg1 {
        let Some(value2) = reg2.get(key) else {
            diff.registry1_only.insert(key.clone(), value1.clone());
            continue;
        };
        let value_diff = comparator.compare_value(key, value1, value2)?;
        if value_diff.has_diff() {
            diff.registry_changed.insert(key.clone(), value_diff);
        }
    }
    for (key, value2) in reg2 {
        if !reg1.contains_key(key) {
            diff.registry2_only.insert(key.clone(), value2.clone());
        }
    }

    debug!(
        registry1_only = diff.registry1_only.len(),
        registry2_only = diff.registry2_only.len(),
        changed = diff.registry_changed.len(),
        "Computed registry diff"
    );
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Data;

    fn sample() -> Registry {
        Registry::new()
            .with("Same", Value::new().with("V", Data::Dword(1)))
            .with("Empty", Value::new())
            .with("Gone", Value::new().with("V", Data::String("x".into())))
    }

    #[test]
    fn test_equal_registries() {
        let diff = diff(&sample(), &sample()).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn test_partitions() {
        let reg2 = Registry::new()
            .with("Same", Value::new().with("V", Data::Dword(2)))
            .with("Empty", Value::new())
            .with("New", Value::new());

        let diff = diff(&sample(), &reg2).unwrap();
        assert_eq!(diff.registry1_only.len(), 1);
        assert!(diff.registry1_only.contains_key("Gone"));
        assert_eq!(diff.registry2_only.len(), 1);
        assert!(diff.registry2_only.get("New").unwrap().is_empty());
        assert_eq!(diff.registry_changed.len(), 1);
        assert_eq!(
            diff.registry_changed["Same"],
            ValueDiff {
                value1: Value::new().with("V", Data::Dword(1)),
                value2: Value::new().with("V", Data::Dword(2)),
            }
        );
    }

    #[test]
    fn test_value_diff_has_diff() {
        assert!(!ValueDiff::new().has_diff());
        let diff = ValueDiff {
            value1: Value::new(),
            value2: Value::new().with("V", Data::Dword(2)),
        };
        assert!(diff.has_diff());
    }
}
