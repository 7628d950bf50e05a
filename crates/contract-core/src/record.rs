//! The contract data record: the one long-lived mutable entity.
//!
//! A flat mapping from a field name or a group key to a scalar string.
//! Boolean state travels as the literal strings `"true"`/`"false"`. The record
//! only ever changes through [`ContractData::merge`], which applies a sparse
//! [`Patch`] key by key and never replaces the record wholesale.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::TemplateError;
use crate::update::{Patch, PatchOp};

/// The canonical emptiness predicate.
///
/// Missing, empty, whitespace-only, and any casing of `"false"` count as
/// empty. Every other string is filled, including `"0"`.
#[must_use]
pub fn is_empty_value(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(raw) => {
            let trimmed = raw.trim();
            trimmed.is_empty() || trimmed.eq_ignore_ascii_case("false")
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContractData {
    values: BTreeMap<String, String>,
}

impl ContractData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from JSON. Strings pass through, booleans become
    /// `"true"`/`"false"`, numbers become their decimal text and `null`
    /// entries are treated as absent.
    pub fn from_value(value: &Value) -> Result<Self, TemplateError> {
        let obj = value.as_object().ok_or(TemplateError::NotAnObject)?;
        let mut values = BTreeMap::new();
        for (key, raw) in obj {
            let scalar = match raw {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Bool(flag) => flag.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(TemplateError::InvalidDataValue { key: key.clone() });
                }
            };
            values.insert(key.clone(), scalar);
        }
        Ok(Self { values })
    }

    pub fn from_json_str(text: &str) -> Result<Self, TemplateError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// `true` when the key holds a value that is not empty under
    /// [`is_empty_value`].
    #[must_use]
    pub fn is_filled(&self, key: &str) -> bool {
        !is_empty_value(self.get(key))
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Shallow-merge a patch: keys named by the patch are set or removed,
    /// every other key is left untouched. Returns how many keys changed.
    pub fn merge(&mut self, patch: &Patch) -> usize {
        let mut changed = 0;
        for (key, op) in patch.iter() {
            match op {
                PatchOp::Set(value) => {
                    if self.get(key) != Some(value.as_str()) {
                        self.values.insert(key.to_string(), value.clone());
                        changed += 1;
                    }
                }
                PatchOp::Clear => {
                    if self.values.remove(key).is_some() {
                        changed += 1;
                    }
                }
            }
        }
        changed
    }

    /// Merged copy, leaving `self` untouched.
    #[must_use]
    pub fn merged(&self, patch: &Patch) -> Self {
        let mut next = self.clone();
        next.merge(patch);
        next
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContractData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
