//! Typed views over learned and parsed device data.
//!
//! Learned models are loosely shaped: loopbacks have no `counters`, some
//! platforms omit individual counter keys, virtual interfaces carry no MAC.
//! Every optional field is reached through an accessor returning `Option`
//! (or [`CounterReading`]); nothing here panics on a missing key.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LearnedDataError {
    #[error("expected {what} to be a mapping, found {found}")]
    NotAMapping {
        what: &'static str,
        found: &'static str,
    },
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

// ── Interfaces ──────────────────────────────────────────────────────

/// Interface name → interface record, in the order the device reported them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceTable {
    interfaces: Vec<(String, InterfaceRecord)>,
}

impl InterfaceTable {
    pub fn from_value(value: Value) -> Result<Self, LearnedDataError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(LearnedDataError::NotAMapping {
                    what: "interface data",
                    found: kind_of(&other),
                });
            }
        };

        let interfaces = map
            .into_iter()
            .map(|(name, fields)| {
                let fields = match fields {
                    Value::Object(fields) => fields,
                    other => {
                        tracing::debug!(interface = %name, found = kind_of(&other), "interface entry is not a mapping");
                        Map::new()
                    }
                };
                (name, InterfaceRecord { fields })
            })
            .collect();

        Ok(Self { interfaces })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InterfaceRecord)> {
        self.interfaces.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn get(&self, name: &str) -> Option<&InterfaceRecord> {
        self.interfaces
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceRecord {
    fields: Map<String, Value>,
}

impl InterfaceRecord {
    /// The nested `counters` mapping, if the interface reports one.
    pub fn counters(&self) -> Option<Counters<'_>> {
        self.fields
            .get("counters")
            .and_then(Value::as_object)
            .map(|fields| Counters { fields })
    }

    pub fn mac_address(&self) -> Option<&str> {
        self.fields.get("mac_address").and_then(Value::as_str)
    }
}

/// Result of probing one counter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterReading {
    Missing,
    Value(u64),
    /// Present, but not an unsigned integer.
    Unreadable,
}

#[derive(Debug, Clone, Copy)]
pub struct Counters<'a> {
    fields: &'a Map<String, Value>,
}

impl Counters<'_> {
    pub fn get(&self, key: &str) -> CounterReading {
        match self.fields.get(key) {
            None => CounterReading::Missing,
            Some(v) => v
                .as_u64()
                .map(CounterReading::Value)
                .unwrap_or(CounterReading::Unreadable),
        }
    }
}

// ── Version ─────────────────────────────────────────────────────────

/// Parsed `show version` output.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRecord {
    value: Value,
}

impl VersionRecord {
    pub fn from_value(value: Value) -> Self {
        Self { value }
    }

    /// The `version` field of the top-level `version` section.
    ///
    /// IOS-family parsers report it there; NX-OS does not, and gets `None`.
    pub fn version(&self) -> Option<&str> {
        self.value
            .get("version")
            .and_then(|section| section.get("version"))
            .and_then(Value::as_str)
    }
}
