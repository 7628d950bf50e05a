//! Family grouping: recover render sections from dotted field names.
//!
//! A field's family is its name with any `_description` suffix removed and
//! the last dot-segment dropped. Fields sharing a family render together.
//! Families are recomputed on every read and never stored.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::index::{FieldDescriptor, OptionGroup, SchemaIndex, DESCRIPTION_SUFFIX};
use crate::label::{format_label, format_option_label, group_base, section_title};
use crate::radio::{is_other_selected, OTHER_MARKER};
use crate::record::ContractData;
use crate::schema::FieldType;

/// Family key for a field name. Only `.` separates levels; a name with at
/// most one segment belongs to the ungrouped family `""`.
#[must_use]
pub fn family_key(name: &str) -> String {
    let stem = name.strip_suffix(DESCRIPTION_SUFFIX).unwrap_or(name);
    match stem.rsplit_once('.') {
        Some((family, _)) => family.to_string(),
        None => String::new(),
    }
}

/// Display label for an option group: the first member description, else
/// the group's base name.
#[must_use]
pub fn group_label(group: &OptionGroup) -> String {
    group
        .members
        .iter()
        .find_map(|m| m.description.clone())
        .unwrap_or_else(|| format_label(group_base(&group.key)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionItem {
    pub field: FieldDescriptor,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderItem {
    Single {
        field: FieldDescriptor,
        label: String,
    },
    /// Every member of one group, rendered once where the group is first met.
    #[serde(rename_all = "camelCase")]
    GroupedOption {
        group_key: String,
        label: String,
        options: Vec<OptionItem>,
    },
    /// A checkbox with its `_description` companion.
    PairedCheckbox {
        checkbox: FieldDescriptor,
        description: FieldDescriptor,
        label: String,
    },
}

impl RenderItem {
    /// Field names this item renders, in display order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Self::Single { field, .. } => vec![field.name.as_str()],
            Self::GroupedOption { options, .. } => {
                options.iter().map(|o| o.field.name.as_str()).collect()
            }
            Self::PairedCheckbox {
                checkbox,
                description,
                ..
            } => vec![checkbox.name.as_str(), description.name.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilySection {
    pub family: String,
    pub title: String,
    pub items: Vec<RenderItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderModel {
    pub sections: Vec<FamilySection>,
    /// "Other" description fields whose governing group could not be
    /// located. They are never shown; reporting them is up to the caller.
    pub unresolved: Vec<String>,
}

/// How a `_description` field relates to the rest of the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DescriptionRole {
    NotDescription,
    /// Rendered together with its checkbox.
    PairedWithCheckbox,
    /// Shown only while the governing group's "other" option is selected.
    Other { group: Option<String> },
    Plain,
}

fn classify(index: &SchemaIndex, field: &FieldDescriptor) -> DescriptionRole {
    let Some(base) = field.described_name() else {
        return DescriptionRole::NotDescription;
    };
    let target = index.field(base);
    if target.is_some_and(|t| t.field_type == FieldType::Checkbox) {
        return DescriptionRole::PairedWithCheckbox;
    }
    if !base.to_lowercase().contains(OTHER_MARKER) {
        return DescriptionRole::Plain;
    }

    let group = target
        .and_then(FieldDescriptor::option_group)
        .filter(|key| index.is_group_key(key))
        .map(str::to_string)
        .or_else(|| governing_group_by_prefix(index, base));
    DescriptionRole::Other { group }
}

/// Longest group whose base path is a `.`/`_`-bounded prefix of `name`.
fn governing_group_by_prefix(index: &SchemaIndex, name: &str) -> Option<String> {
    index
        .groups()
        .iter()
        .filter(|g| {
            let base = group_base(&g.key);
            !base.is_empty()
                && name
                    .strip_prefix(base)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(['.', '_']))
        })
        .max_by_key(|g| group_base(&g.key).len())
        .map(|g| g.key.clone())
}

fn family_order(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a.cmp(b),
    }
}

/// Build render sections for one page (`Some(page)`) or the whole template.
///
/// Families are sorted by key with the ungrouped family last; items keep
/// field order except that a group collapses into one item at its first
/// member and a checkbox absorbs its description.
#[must_use]
pub fn render_model(index: &SchemaIndex, data: &ContractData, page: Option<u32>) -> RenderModel {
    let mut families: Vec<(String, Vec<&FieldDescriptor>)> = Vec::new();
    let mut slot_by_family: HashMap<String, usize> = HashMap::new();
    for field in index
        .fields()
        .iter()
        .filter(|f| page.map_or(true, |p| f.page == p))
    {
        let family = family_key(&field.name);
        let slot = *slot_by_family.entry(family.clone()).or_insert_with(|| {
            families.push((family, Vec::new()));
            families.len() - 1
        });
        families[slot].1.push(field);
    }
    families.sort_by(|a, b| family_order(&a.0, &b.0));

    let mut model = RenderModel::default();
    let mut seen_groups: HashSet<&str> = HashSet::new();

    for (family, fields) in families {
        let mut items = Vec::new();
        for field in fields {
            match classify(index, field) {
                DescriptionRole::PairedWithCheckbox => continue,
                DescriptionRole::Other { group: None } => {
                    model.unresolved.push(field.name.clone());
                    continue;
                }
                DescriptionRole::Other { group: Some(key) } => {
                    if is_other_selected(data, &key) {
                        items.push(single(field));
                    }
                    continue;
                }
                DescriptionRole::NotDescription | DescriptionRole::Plain => {}
            }

            if let Some(group) = field.option_group().and_then(|key| index.group(key)) {
                if seen_groups.insert(group.key.as_str()) {
                    items.push(grouped(group));
                }
                continue;
            }

            if field.field_type == FieldType::Checkbox {
                let desc_name = format!("{}{DESCRIPTION_SUFFIX}", field.name);
                if let Some(description) = index.field(&desc_name) {
                    items.push(RenderItem::PairedCheckbox {
                        checkbox: field.clone(),
                        description: description.clone(),
                        label: format_label(&field.name),
                    });
                    continue;
                }
            }

            items.push(single(field));
        }

        if !items.is_empty() {
            model.sections.push(FamilySection {
                title: section_title(&family),
                family,
                items,
            });
        }
    }
    model
}

fn single(field: &FieldDescriptor) -> RenderItem {
    RenderItem::Single {
        field: field.clone(),
        label: format_label(&field.name),
    }
}

fn grouped(group: &OptionGroup) -> RenderItem {
    RenderItem::GroupedOption {
        group_key: group.key.clone(),
        label: group_label(group),
        options: group
            .members
            .iter()
            .map(|m| OptionItem {
                field: m.clone(),
                label: format_option_label(&m.name, &group.key),
            })
            .collect(),
    }
}
