// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region identifiers and keyed per-region datasets.

use core::borrow::Borrow;
use core::fmt;
use core::marker::PhantomData;

use hashbrown::HashMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::model::Record;

/// Identifier of a map region.
///
/// Ids are compared as strings: a geometry whose id is the number `5` matches
/// a dataset key `"5"`. Numbers are rendered the way a JavaScript object key
/// would render them, so `5.0` becomes `"5"` and `2.5` stays `"2.5"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(String);

impl RegionId {
    /// Creates an id from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Converts a JSON value into a region id.
    ///
    /// Returns `None` for values that cannot identify a region: `null`, `false`,
    /// the empty string, arrays and objects. `0` is a valid id.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(number_key(n))),
            Value::Bool(true) => Some(Self("true".into())),
            _ => None,
        }
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn number_key(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // `-0` prints as `0` in an object key.
        Some(f) if f == 0.0 => "0".into(),
        Some(f) => format!("{f}"),
        None => n.to_string(),
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for RegionId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// A single dataset entry.
///
/// - [`DataEntry::Value`] is the metadata-keyed mode: the entry *is* the number
///   and descriptive content lives in a separate metadata dataset.
/// - [`DataEntry::Record`] is the value-keyed mode: the number lives at a
///   caller-chosen field of the record.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DataEntry {
    /// A direct numeric value.
    Value(f64),
    /// A record of named fields.
    Record(Record),
}

impl DataEntry {
    /// Extracts the numeric value of this entry.
    ///
    /// A direct value is returned as is. For a record, the field at `value_key`
    /// is returned when it is a number; a missing key, a missing field, or a
    /// non-numeric field all yield `0`.
    #[must_use]
    pub fn value(&self, value_key: Option<&str>) -> f64 {
        match self {
            Self::Value(v) => *v,
            Self::Record(record) => value_key
                .and_then(|key| record.get(key))
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
        }
    }

    /// Returns `true` if this entry is a record carrying `key`.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        match self {
            Self::Value(_) => false,
            Self::Record(record) => record.contains_key(key),
        }
    }

    /// Returns the record, if this is a value-keyed entry.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Value(_) => None,
            Self::Record(record) => Some(record),
        }
    }
}

impl From<f64> for DataEntry {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

impl From<Record> for DataEntry {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

/// An insertion-ordered mapping from [`RegionId`] to `T`.
///
/// Entries keep the order they were inserted (or appeared in the source JSON),
/// and lookups by id are constant time. Re-inserting an existing id replaces
/// the value in place without moving it.
#[derive(Clone, Debug)]
pub struct Dataset<T> {
    entries: Vec<(RegionId, T)>,
    index: HashMap<RegionId, usize>,
}

impl<T> Default for Dataset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dataset<T> {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Inserts or replaces the value for `id`, returning the previous value.
    pub fn insert(&mut self, id: impl Into<RegionId>, value: T) -> Option<T> {
        let id = id.into();
        if let Some(&idx) = self.index.get(&id) {
            return Some(core::mem::replace(&mut self.entries[idx].1, value));
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, value));
        None
    }

    /// Returns the value for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&idx| &self.entries[idx].1)
    }

    /// Returns `true` if the dataset has an entry for `id`.
    #[must_use]
    pub fn contains_key(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the dataset is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&RegionId, &T)> {
        self.entries.iter().map(|(id, value)| (id, value))
    }

    /// Iterates over ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &RegionId> {
        self.entries.iter().map(|(id, _)| id)
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl<K: Into<RegionId>, T> FromIterator<(K, T)> for Dataset<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut dataset = Self::new();
        for (id, value) in iter {
            dataset.insert(id, value);
        }
        dataset
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Dataset<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DatasetVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for DatasetVisitor<T> {
            type Value = Dataset<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from region id to region data")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Dataset<T>, A::Error> {
                let mut dataset = Dataset::new();
                while let Some((id, value)) = map.next_entry::<String, T>()? {
                    dataset.insert(id, value);
                }
                Ok(dataset)
            }
        }

        deserializer.deserialize_map(DatasetVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_follow_object_key_rendering() {
        assert_eq!(RegionId::from_value(&json!(0)), Some(RegionId::from("0")));
        assert_eq!(RegionId::from_value(&json!(5.0)), Some(RegionId::from("5")));
        assert_eq!(RegionId::from_value(&json!(2.5)), Some(RegionId::from("2.5")));
        assert_eq!(RegionId::from_value(&json!("FR")), Some(RegionId::from("FR")));
        assert_eq!(RegionId::from_value(&json!(true)), Some(RegionId::from("true")));
    }

    #[test]
    fn falsy_and_compound_values_are_not_ids() {
        for value in [json!(null), json!(false), json!(""), json!([1]), json!({"a": 1})] {
            assert_eq!(RegionId::from_value(&value), None, "{value} should not be an id");
        }
    }

    #[test]
    fn record_value_extraction() {
        let entry: DataEntry = serde_json::from_value(json!({"pop": 7, "name": "x"})).unwrap();
        assert_eq!(entry.value(Some("pop")), 7.0);
        assert_eq!(entry.value(Some("name")), 0.0);
        assert_eq!(entry.value(Some("missing")), 0.0);
        assert_eq!(entry.value(None), 0.0);
        assert!(entry.has_key("name"));

        let direct: DataEntry = serde_json::from_value(json!(3.5)).unwrap();
        assert_eq!(direct.value(Some("pop")), 3.5);
        assert!(!direct.has_key("pop"));
        assert!(direct.as_record().is_none());
    }

    #[test]
    fn dataset_keeps_insertion_order_and_replaces_in_place() {
        let mut data: Dataset<f64> = Dataset::new();
        assert_eq!(data.insert("b", 1.0), None);
        assert_eq!(data.insert("a", 2.0), None);
        assert_eq!(data.insert("b", 3.0), Some(1.0));

        let ids: Vec<&str> = data.ids().map(RegionId::as_str).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(data.get("b"), Some(&3.0));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn dataset_deserializes_in_document_order() {
        let data: Dataset<DataEntry> =
            serde_json::from_str(r#"{ "z": 1, "m": { "v": 2 }, "a": 3 }"#).unwrap();
        let ids: Vec<&str> = data.ids().map(RegionId::as_str).collect();
        assert_eq!(ids, ["z", "m", "a"]);
        assert_eq!(data.get("m").map(|e| e.value(Some("v"))), Some(2.0));
        assert!(data.contains_key("a"));
        assert!(!data.contains_key("q"));
    }
}
