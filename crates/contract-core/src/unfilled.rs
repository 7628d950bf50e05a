//! Required-field tracking.
//!
//! Produces the ordered list of required entries that are still empty. Each
//! option group counts as one entry keyed by the group, not one per option.

use std::collections::HashSet;

use serde::Serialize;

use crate::family::group_label;
use crate::index::{FieldDescriptor, SchemaIndex};
use crate::label::format_label;
use crate::record::ContractData;
use crate::schema::FieldType;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfilledEntry {
    /// Field name, or the group key for a collapsed option group.
    pub name: String,
    pub label: String,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfilledReport {
    pub unfilled_fields: Vec<UnfilledEntry>,
    pub total_required: usize,
    pub filled_count: usize,
}

impl UnfilledReport {
    /// Whole-number share of required entries that are filled; 100 when
    /// nothing is required.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        if self.total_required == 0 {
            return 100;
        }
        let pct = self.filled_count * 100 / self.total_required;
        u8::try_from(pct).unwrap_or(100)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unfilled_fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.unfilled_fields.iter().map(|e| e.name.as_str())
    }
}

/// Every required entry, collapsed and sorted by page then vertical position.
#[must_use]
pub fn required_entries(index: &SchemaIndex) -> Vec<UnfilledEntry> {
    let mut seen_groups: HashSet<&str> = HashSet::new();
    let mut entries = Vec::new();

    for field in index.fields() {
        if !field.required || field.field_type.is_presentation_only() || field.is_description() {
            continue;
        }
        match field.option_group().and_then(|key| index.group(key)) {
            Some(group) => {
                if !seen_groups.insert(group.key.as_str()) {
                    continue;
                }
                entries.push(UnfilledEntry {
                    name: group.key.clone(),
                    label: group_label(group),
                    page: field.page,
                    position_y: field.position_y,
                    field_type: FieldType::RadioGroupOption,
                    group: Some(group.key.clone()),
                });
            }
            None => entries.push(field_entry(field)),
        }
    }

    entries.sort_by(|a, b| {
        a.page.cmp(&b.page).then_with(|| {
            a.position_y
                .unwrap_or(0.0)
                .total_cmp(&b.position_y.unwrap_or(0.0))
        })
    });
    entries
}

fn field_entry(field: &FieldDescriptor) -> UnfilledEntry {
    UnfilledEntry {
        name: field.name.clone(),
        label: format_label(&field.name),
        page: field.page,
        position_y: field.position_y,
        field_type: field.field_type.clone(),
        group: field.group.clone(),
    }
}

/// Required entries whose value is still empty.
#[must_use]
pub fn unfilled(index: &SchemaIndex, data: &ContractData) -> UnfilledReport {
    let required = required_entries(index);
    let total_required = required.len();
    let unfilled_fields: Vec<UnfilledEntry> = required
        .into_iter()
        .filter(|entry| !data.is_filled(&entry.name))
        .collect();
    UnfilledReport {
        filled_count: total_required - unfilled_fields.len(),
        total_required,
        unfilled_fields,
    }
}
