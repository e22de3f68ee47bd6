//! In-memory registry snapshot model.

use crate::error::{RegistryError, Result};
use crate::value::Data;
use std::borrow::Borrow;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Path of a registry key relative to its root, e.g. `Software\Wine`.
///
/// Keys are compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Key(String);

impl Key {
    /// Creates a key from an unescaped path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the key path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Key {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Name of a value within a key.
///
/// The unnamed value of a key is written `@` in `.reg` files and is kept
/// distinct from a value actually named `"@"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataName {
    /// The key's unnamed ("default") value.
    Default,
    /// A named value.
    Named(String),
}

impl DataName {
    /// Creates a named value name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns true for the unnamed value.
    pub fn is_default(&self) -> bool {
        matches!(self, DataName::Default)
    }
}

impl fmt::Display for DataName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataName::Default => f.write_str("@"),
            DataName::Named(name) => f.write_str(name),
        }
    }
}

impl From<&str> for DataName {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

/// The unnamed value serialises as `""` and named values as their plain
/// name. Empty names are rejected by the parser, so the two never collide.
#[cfg(feature = "serde")]
impl serde::Serialize for DataName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DataName::Default => serializer.serialize_str(""),
            DataName::Named(name) => serializer.serialize_str(name),
        }
    }
}

/// The named data of one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Value {
    data: BTreeMap<DataName, Data>,
}

impl Value {
    /// Creates an empty value map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this map with `name` set to `data`.
    pub fn with(mut self, name: impl Into<DataName>, data: Data) -> Self {
        self.insert(name.into(), data);
        self
    }

    /// Sets `name` to `data`, returning the previous data.
    pub fn insert(&mut self, name: DataName, data: Data) -> Option<Data> {
        self.data.insert(name, data)
    }

    /// Looks up the data stored under `name`.
    pub fn get(&self, name: &DataName) -> Option<&Data> {
        self.data.get(name)
    }

    /// Returns true if `name` is present.
    pub fn contains(&self, name: &DataName) -> bool {
        self.data.contains_key(name)
    }

    /// Iterates entries in name order, the unnamed value first.
    pub fn iter(&self) -> btree_map::Iter<'_, DataName, Data> {
        self.data.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the key holds no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl FromIterator<(DataName, Data)> for Value {
    fn from_iter<I: IntoIterator<Item = (DataName, Data)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Value {
    type Item = (&'a DataName, &'a Data);
    type IntoIter = btree_map::Iter<'a, DataName, Data>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// A full registry snapshot: every key with its data.
///
/// Build one with [`Registry::parse_str`], [`Registry::from_reader`] or
/// [`Registry::open`]; see the `parser` module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Registry {
    keys: BTreeMap<Key, Value>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this registry with `key` set to `value`.
    pub fn with(mut self, key: impl Into<Key>, value: Value) -> Self {
        self.keys.insert(key.into(), value);
        self
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
        self.keys.insert(key, value)
    }

    /// Returns the value map of `key`, creating an empty one if missing.
    pub(crate) fn entry(&mut self, key: Key) -> &mut Value {
        self.keys.entry(key).or_default()
    }

    /// Looks up a key.
    pub fn get<Q>(&self, key: &Q) -> Option<&Value>
    where
        Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys.get(key)
    }

    /// Returns true if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys.contains_key(key)
    }

    /// Iterates keys in lexicographic order.
    pub fn iter(&self) -> btree_map::Iter<'_, Key, Value> {
        self.keys.iter()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the registry has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<(Key, Value)> for Registry {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = (&'a Key, &'a Value);
    type IntoIter = btree_map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

/// Predefined root key a snapshot is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegistryRoot {
    /// `HKEY_LOCAL_MACHINE` (`HKLM`).
    #[default]
    LocalMachine,
    /// `HKEY_CURRENT_USER` (`HKCU`).
    CurrentUser,
    /// `HKEY_CLASSES_ROOT` (`HKCR`).
    ClassesRoot,
    /// `HKEY_USERS` (`HKU`).
    Users,
    /// `HKEY_CURRENT_CONFIG` (`HKCC`).
    CurrentConfig,
}

impl RegistryRoot {
    /// Returns the full root name, e.g. `HKEY_LOCAL_MACHINE`.
    pub fn name(&self) -> &'static str {
        match self {
            RegistryRoot::LocalMachine => "HKEY_LOCAL_MACHINE",
            RegistryRoot::CurrentUser => "HKEY_CURRENT_USER",
            RegistryRoot::ClassesRoot => "HKEY_CLASSES_ROOT",
            RegistryRoot::Users => "HKEY_USERS",
            RegistryRoot::CurrentConfig => "HKEY_CURRENT_CONFIG",
        }
    }

    /// Returns the abbreviated root name, e.g. `HKLM`.
    pub fn short_name(&self) -> &'static str {
        match self {
            RegistryRoot::LocalMachine => "HKLM",
            RegistryRoot::CurrentUser => "HKCU",
            RegistryRoot::ClassesRoot => "HKCR",
            RegistryRoot::Users => "HKU",
            RegistryRoot::CurrentConfig => "HKCC",
        }
    }
}

impl fmt::Display for RegistryRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegistryRoot {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        [
            RegistryRoot::LocalMachine,
            RegistryRoot::CurrentUser,
            RegistryRoot::ClassesRoot,
            RegistryRoot::Users,
            RegistryRoot::CurrentConfig,
        ]
        .into_iter()
        .find(|root| s == root.short_name() || s == root.name())
        .ok_or_else(|| RegistryError::invalid_data(format!("invalid registry root: '{}'", s)))
    }
}
