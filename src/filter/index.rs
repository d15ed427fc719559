use crate::data::DamRecord;
use std::collections::{BTreeMap, HashMap};

/// Two-level lookup from property key to property value to the records
/// sharing that value. Built once after load, read-only afterwards.
/// Value buckets are `BTreeMap`s so sidebar display order is the
/// lexicographic order of the value strings.
pub struct PropertyIndex {
    keys: &'static [&'static str],
    groups: HashMap<&'static str, BTreeMap<String, Vec<usize>>>,
}

impl PropertyIndex {
    /// An index with no records, used before the dataset lands.
    pub fn empty(keys: &'static [&'static str]) -> Self {
        let mut groups = HashMap::with_capacity(keys.len());
        for &key in keys {
            groups.insert(key, BTreeMap::new());
        }
        Self { keys, groups }
    }

    /// Classify every record under every key in `keys`. Missing and empty
    /// values land in the sentinel bucket via `DamRecord::value_for`, so
    /// each record appears exactly once per key.
    pub fn build(records: &[DamRecord], keys: &'static [&'static str]) -> Self {
        let mut index = Self::empty(keys);
        for record in records {
            for &key in keys {
                let value = record.value_for(key);
                index
                    .groups
                    .entry(key)
                    .or_default()
                    .entry(value.to_string())
                    .or_default()
                    .push(record.id);
            }
        }
        index
    }

    pub fn keys(&self) -> &'static [&'static str] {
        self.keys
    }

    /// Record ids sharing `value` for `key`, if such a group exists.
    pub fn group(&self, key: &str, value: &str) -> Option<&[usize]> {
        self.groups
            .get(key)
            .and_then(|values| values.get(value))
            .map(Vec::as_slice)
    }

    /// Value buckets for one key, in display (sorted) order.
    pub fn values(&self, key: &str) -> impl Iterator<Item = (&str, &[usize])> {
        self.groups.get(key).into_iter().flat_map(|values| {
            values
                .iter()
                .map(|(value, ids)| (value.as_str(), ids.as_slice()))
        })
    }

    /// Number of distinct values seen for one key.
    pub fn distinct_values(&self, key: &str) -> usize {
        self.groups.get(key).map_or(0, BTreeMap::len)
    }
}
