//! Field update engine: one edit in, one sparse patch out.
//!
//! Both editing surfaces route every edit through [`compute_update`], so the
//! same edit yields the same patch whichever surface it came from. Group
//! exclusivity is enforced here and nowhere else: a selection is written to
//! the group key only, and the codec derives every sibling's surface value
//! from that single key.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::index::{OptionGroup, SchemaIndex};
use crate::radio::SurfaceSelection;
use crate::record::{is_empty_value, ContractData};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    Set(String),
    Clear,
}

/// Sparse set of key changes, merged shallowly into a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    ops: BTreeMap<String, PatchOp>,
}

impl Patch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.ops.insert(key.into(), PatchOp::Set(value.into()));
    }

    pub fn clear(&mut self, key: impl Into<String>) {
        self.ops.insert(key.into(), PatchOp::Clear);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PatchOp> {
        self.ops.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PatchOp)> {
        self.ops.iter().map(|(k, op)| (k.as_str(), op))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// JSON form: set keys map to their string, cleared keys to `null`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.ops
                .iter()
                .map(|(k, op)| {
                    let v = match op {
                        PatchOp::Set(value) => Value::String(value.clone()),
                        PatchOp::Clear => Value::Null,
                    };
                    (k.clone(), v)
                })
                .collect(),
        )
    }
}

impl Serialize for Patch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.ops.len()))?;
        for (key, op) in &self.ops {
            match op {
                PatchOp::Set(value) => map.serialize_entry(key, value)?,
                PatchOp::Clear => map.serialize_entry(key, &Option::<String>::None)?,
            }
        }
        map.end()
    }
}

/// Compute the patch for one edit.
///
/// `value` is `None` when the surface cleared the field. `data` is read only
/// to decide whether a deselected option was the current selection and to
/// find stale per-option keys.
///
/// Rules, first match wins:
/// 1. `field_name` is a group key: a member name selects it, an empty value
///    clears the group, anything else is ignored. No other key is touched.
/// 2. `field_name` is a grouped option: a selecting value writes the option's
///    name to the group key; a deselecting value clears the group key only
///    when this option is the current selection. Per-option keys of the group
///    left in the record by older writers are cleared as well.
/// 3. `None` clears the key.
/// 4. Anything else is written through unchanged.
#[must_use]
pub fn compute_update(
    index: &SchemaIndex,
    data: &ContractData,
    field_name: &str,
    value: Option<&str>,
) -> Patch {
    let mut patch = Patch::new();

    if let Some(group) = index.group(field_name) {
        if is_empty_value(value) {
            patch.clear(&group.key);
        } else if let Some(selected) = value.filter(|v| group.contains(v)) {
            patch.set(&group.key, selected);
        } else {
            debug!(
                group = %group.key,
                value = value.unwrap_or_default(),
                "ignoring group write that names no member"
            );
        }
        return patch;
    }

    if let Some(group) = index.group_for_option(field_name) {
        match SurfaceSelection::from_surface_value(value) {
            SurfaceSelection::Select => patch.set(&group.key, field_name),
            SurfaceSelection::Deselect => {
                if data.get(&group.key) != Some(field_name) {
                    return patch;
                }
                patch.clear(&group.key);
            }
        }
        clear_stale_option_keys(&mut patch, group, data);
        return patch;
    }

    match value {
        None => patch.clear(field_name),
        Some(v) => patch.set(field_name, v),
    }
    patch
}

/// Selection state lives only at the group key; drop any per-option keys an
/// older writer left behind.
fn clear_stale_option_keys(patch: &mut Patch, group: &OptionGroup, data: &ContractData) {
    for member in group.member_names() {
        if data.contains_key(member) {
            patch.clear(member);
        }
    }
}
