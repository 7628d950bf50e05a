//! Schema indexing: flatten a multi-page template into one ordered field list
//! and a global option-group index.
//!
//! Field order is page order, then within-page order; everything downstream
//! (render order, unfilled ordering ties) relies on that.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::schema::{FieldType, Template};

/// Suffix that marks a field as the free-text companion of another field.
pub const DESCRIPTION_SUFFIX: &str = "_description";

/// Derived description of one schema field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub required: bool,
    /// 1-based page number.
    pub page: u32,
    #[serde(rename = "positionY", skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDescriptor {
    /// The option group this field belongs to, if it is a grouped option.
    #[must_use]
    pub fn option_group(&self) -> Option<&str> {
        if self.field_type == FieldType::RadioGroupOption {
            self.group.as_deref()
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_description(&self) -> bool {
        self.name.ends_with(DESCRIPTION_SUFFIX)
    }

    /// Name with a trailing `_description` removed, if present.
    #[must_use]
    pub fn described_name(&self) -> Option<&str> {
        self.name.strip_suffix(DESCRIPTION_SUFFIX)
    }
}

/// Every option sharing one group key, in index order across all pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionGroup {
    pub key: String,
    pub members: Vec<FieldDescriptor>,
}

impl OptionGroup {
    #[must_use]
    pub fn contains(&self, option_name: &str) -> bool {
        self.members.iter().any(|m| m.name == option_name)
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.members.iter().any(|m| m.required)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaIndex {
    fields: Vec<FieldDescriptor>,
    groups: Vec<OptionGroup>,
    by_name: HashMap<String, usize>,
    group_by_key: HashMap<String, usize>,
    page_count: usize,
}

impl SchemaIndex {
    /// Index a template. Signature fields are dropped, duplicate names keep
    /// their first occurrence, and an empty template gives an empty index.
    #[must_use]
    pub fn build(template: &Template) -> Self {
        let mut index = Self {
            page_count: template.pages.len(),
            ..Self::default()
        };

        for (page_idx, page) in template.pages.iter().enumerate() {
            let page_no = u32::try_from(page_idx + 1).unwrap_or(u32::MAX);
            for def in page {
                if def.field_type.is_presentation_only() {
                    trace!(field = %def.name, "skipping presentation-only field");
                    continue;
                }
                if index.by_name.contains_key(&def.name) {
                    trace!(field = %def.name, page = page_no, "skipping duplicate field name");
                    continue;
                }
                let descriptor = FieldDescriptor {
                    name: def.name.clone(),
                    field_type: def.field_type.clone(),
                    group: def.group.clone(),
                    required: def.required,
                    page: page_no,
                    position_y: def.position.map(|p| p.y),
                    description: def.description.clone(),
                };
                index.insert(descriptor);
            }
        }

        debug!(
            pages = index.page_count,
            fields = index.fields.len(),
            groups = index.groups.len(),
            "indexed template schema"
        );
        index
    }

    fn insert(&mut self, descriptor: FieldDescriptor) {
        if let Some(key) = descriptor.option_group() {
            match self.group_by_key.get(key) {
                Some(&slot) => self.groups[slot].members.push(descriptor.clone()),
                None => {
                    self.group_by_key.insert(key.to_string(), self.groups.len());
                    self.groups.push(OptionGroup {
                        key: key.to_string(),
                        members: vec![descriptor.clone()],
                    });
                }
            }
        }
        self.by_name
            .insert(descriptor.name.clone(), self.fields.len());
        self.fields.push(descriptor);
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Option groups in order of their first member.
    #[must_use]
    pub fn groups(&self) -> &[OptionGroup] {
        &self.groups
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&slot| &self.fields[slot])
    }

    #[must_use]
    pub fn group(&self, key: &str) -> Option<&OptionGroup> {
        self.group_by_key.get(key).map(|&slot| &self.groups[slot])
    }

    #[must_use]
    pub fn is_group_key(&self, key: &str) -> bool {
        self.group_by_key.contains_key(key)
    }

    /// The group an option field belongs to.
    #[must_use]
    pub fn group_for_option(&self, option_name: &str) -> Option<&OptionGroup> {
        self.field(option_name)
            .and_then(FieldDescriptor::option_group)
            .and_then(|key| self.group(key))
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn fields_on_page(&self, page: u32) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(move |f| f.page == page)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
