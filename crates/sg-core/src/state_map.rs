//! Flat name -> value maps used for step reports and snapshots.

use std::collections::BTreeMap;

pub type StateMap = BTreeMap<String, f64>;

/// Insert `value` under `key`, coercing booleans and counters into `f64`.
pub fn put(map: &mut StateMap, key: &str, value: impl Into<f64>) {
    map.insert(key.to_string(), value.into());
}

/// Copy every entry of `source` into `target` under `prefix` + key.
pub fn merge_prefixed(target: &mut StateMap, prefix: &str, source: &StateMap) {
    for (key, value) in source {
        target.insert(format!("{prefix}{key}"), *value);
    }
}

/// 1.0 / 0.0 encoding for flags in numeric maps.
pub fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
