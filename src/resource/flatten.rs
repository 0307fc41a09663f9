//! Config Flattening
//!
//! Converts between a key/value mapping and the flat, count-prefixed
//! representation stored in attribute tables, e.g.
//!
//! ```text
//! config.#         = 1
//! config.0.#       = 2
//! config.0.FOO     = bar
//! config.0.REGION  = eu
//! ```

use super::model::Attributes;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reserved attribute key holding an element count
pub const COUNT_MARKER: &str = "#";

/// A single configuration entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

/// Configuration as an ordered sequence of entries
///
/// Entries are sorted by key and keys are unique, so the number of entries is
/// the number of configured keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatConfig {
    entries: Vec<ConfigEntry>,
}

impl FlatConfig {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    /// Look up the value configured for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .binary_search_by(|e| e.key.as_str().cmp(key))
            .ok()
            .map(|idx| self.entries[idx].value.as_str())
    }

    /// Write this config under `prefix` as a one-element list of maps
    ///
    /// An empty config writes nothing.
    pub fn write_attributes(&self, attrs: &mut Attributes, prefix: &str) {
        if self.is_empty() {
            return;
        }
        write_map_list(attrs, prefix, &[unflatten(self)]);
    }

    /// Read a config previously written with [`FlatConfig::write_attributes`]
    ///
    /// Returns `None` when no config is recorded under `prefix`.
    pub fn from_attributes(attrs: &Attributes, prefix: &str) -> Result<Option<Self>> {
        let maps = read_map_list(attrs, prefix)?;
        if maps.is_empty() {
            return Ok(None);
        }
        // Several maps are merged, later keys win
        let merged: BTreeMap<String, String> = maps.into_iter().flatten().collect();
        Ok(Some(flatten(&merged)))
    }
}

/// Flatten a mapping into an ordered config
pub fn flatten(map: &BTreeMap<String, String>) -> FlatConfig {
    let entries = map
        .iter()
        .filter(|(key, _)| {
            let reserved = key.as_str() == COUNT_MARKER;
            if reserved {
                tracing::warn!("Discarding reserved config key {:?}", COUNT_MARKER);
            }
            !reserved
        })
        .map(|(key, value)| ConfigEntry {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();

    FlatConfig { entries }
}

/// Rebuild the mapping from a flattened config, discarding the count marker
pub fn unflatten(flat: &FlatConfig) -> BTreeMap<String, String> {
    flat.entries
        .iter()
        .filter(|e| e.key != COUNT_MARKER)
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect()
}

/// Coerce a declared configuration mapping into string values
///
/// Strings are kept verbatim, numbers and booleans are stringified. Anything
/// nested, null, or keyed by the count marker is rejected.
pub fn coerce_declared(declared: &BTreeMap<String, Value>) -> Result<BTreeMap<String, String>> {
    declared
        .iter()
        .map(|(key, value)| {
            if key == COUNT_MARKER || key.is_empty() {
                return Err(Error::invalid_configuration(key, "reserved or empty key"));
            }
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => return Err(Error::invalid_configuration(key, "value is null")),
                Value::Array(_) | Value::Object(_) => {
                    return Err(Error::invalid_configuration(key, "value is not a scalar"))
                }
            };
            Ok((key.clone(), value))
        })
        .collect()
}

/// Write a list of maps under `prefix` with explicit counts
pub fn write_map_list(attrs: &mut Attributes, prefix: &str, maps: &[BTreeMap<String, String>]) {
    if maps.is_empty() {
        return;
    }
    attrs.insert(format!("{prefix}.{COUNT_MARKER}"), maps.len().to_string());
    for (idx, map) in maps.iter().enumerate() {
        attrs.insert(format!("{prefix}.{idx}.{COUNT_MARKER}"), map.len().to_string());
        for (key, value) in map {
            attrs.insert(format!("{prefix}.{idx}.{key}"), value.clone());
        }
    }
}

/// Read a list of maps written with [`write_map_list`]
///
/// An absent list reads as empty. Counts that cannot be parsed or disagree
/// with the entries present are rejected.
pub fn read_map_list(attrs: &Attributes, prefix: &str) -> Result<Vec<BTreeMap<String, String>>> {
    let count_key = format!("{prefix}.{COUNT_MARKER}");
    let Some(count) = attrs.get(&count_key) else {
        return Ok(Vec::new());
    };
    let count = parse_count(&count_key, count)?;

    let mut maps = Vec::with_capacity(count);
    for idx in 0..count {
        let element_prefix = format!("{prefix}.{idx}.");
        let map: BTreeMap<String, String> = attrs
            .range(element_prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&element_prefix))
            .map(|(k, v)| (k[element_prefix.len()..].to_string(), v.clone()))
            .filter(|(k, _)| k != COUNT_MARKER)
            .collect();

        let element_count_key = format!("{element_prefix}{COUNT_MARKER}");
        if let Some(expected) = attrs.get(&element_count_key) {
            let expected = parse_count(&element_count_key, expected)?;
            if expected != map.len() {
                return Err(Error::invalid_configuration(
                    element_count_key,
                    format!("count is {expected} but {} entries are present", map.len()),
                ));
            }
        }
        maps.push(map);
    }

    Ok(maps)
}

fn parse_count(key: &str, raw: &str) -> Result<usize> {
    raw.parse()
        .map_err(|_| Error::invalid_configuration(key, format!("count {raw:?} is not a number")))
}
