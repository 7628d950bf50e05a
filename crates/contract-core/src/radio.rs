//! Option-group codec between storage form and surface form.
//!
//! Storage form keeps one key per group holding the selected option's name.
//! Surface form gives every option its own value: the option's own name when
//! it is the selection, `""` otherwise. Both directions are pure and can
//! never produce more than one selected option for a group.

use std::collections::BTreeMap;

use crate::index::{FieldDescriptor, OptionGroup, SchemaIndex};
use crate::record::{is_empty_value, ContractData};

/// Substring that marks an "other, please specify" option.
pub const OTHER_MARKER: &str = "other";

/// Per-field values handed to a rendering surface.
pub type WidgetInputs = BTreeMap<String, String>;

/// Surface value for one option of a group.
#[must_use]
pub fn to_surface_form(data: &ContractData, group_key: &str, option_name: &str) -> String {
    match data.get(group_key) {
        Some(selected) if !selected.is_empty() && selected == option_name => selected.to_string(),
        _ => String::new(),
    }
}

/// Whether the group's stored selection looks like an "other" option.
///
/// This is a case-insensitive substring test on the stored value, so an
/// option named e.g. `brothers_realty` also matches.
#[must_use]
pub fn is_other_selected(data: &ContractData, group_key: &str) -> bool {
    data.get(group_key)
        .is_some_and(|value| value.to_lowercase().contains(OTHER_MARKER))
}

/// The member whose name equals the stored selection.
#[must_use]
pub fn selected_option<'a>(group: &'a OptionGroup, data: &ContractData) -> Option<&'a FieldDescriptor> {
    let selected = data.get(&group.key).filter(|v| !v.is_empty())?;
    group.members.iter().find(|m| m.name == selected)
}

/// Decode a group's surface form back to storage form: the first member
/// carrying a non-empty value is the selection.
#[must_use]
pub fn from_surface_form<'a>(group: &'a OptionGroup, surface: &WidgetInputs) -> Option<&'a str> {
    group
        .members
        .iter()
        .find(|m| !is_empty_value(surface.get(&m.name).map(String::as_str)))
        .map(|m| m.name.as_str())
}

/// How a per-option value written by a surface should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSelection {
    Select,
    Deselect,
}

impl SurfaceSelection {
    /// `"true"`, the option's own name or any other non-empty value selects;
    /// missing, `""` and `"false"` deselect.
    #[must_use]
    pub fn from_surface_value(value: Option<&str>) -> Self {
        if is_empty_value(value) {
            Self::Deselect
        } else {
            Self::Select
        }
    }
}

/// Surface-form values for every indexed field. Grouped options go through
/// the codec; every other field passes its stored value through.
#[must_use]
pub fn widget_inputs(index: &SchemaIndex, data: &ContractData) -> WidgetInputs {
    index
        .fields()
        .iter()
        .map(|field| {
            let value = match field.option_group() {
                Some(group_key) if index.is_group_key(group_key) => {
                    to_surface_form(data, group_key, &field.name)
                }
                _ => data.get(&field.name).unwrap_or_default().to_string(),
            };
            (field.name.clone(), value)
        })
        .collect()
}
