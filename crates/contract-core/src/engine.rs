//! One-stop entry point over a parsed template.
//!
//! The engine owns the schema index for a template and exposes the pure
//! derivations as methods. The record itself is always passed in; the
//! engine never holds data.

use crate::error::TemplateError;
use crate::family::{render_model, RenderModel};
use crate::index::SchemaIndex;
use crate::navigator::FieldNavigator;
use crate::radio::{widget_inputs, WidgetInputs};
use crate::record::ContractData;
use crate::schema::Template;
use crate::sync::SyncSession;
use crate::unfilled::{unfilled, UnfilledReport};
use crate::update::{compute_update, Patch};

#[derive(Debug, Clone, Default)]
pub struct ContractEngine {
    index: SchemaIndex,
}

impl ContractEngine {
    #[must_use]
    pub fn from_template(template: &Template) -> Self {
        Self {
            index: SchemaIndex::build(template),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, TemplateError> {
        Ok(Self::from_template(&Template::from_json_str(text)?))
    }

    #[must_use]
    pub fn index(&self) -> &SchemaIndex {
        &self.index
    }

    #[must_use]
    pub fn render_model(&self, data: &ContractData, page: Option<u32>) -> RenderModel {
        render_model(&self.index, data, page)
    }

    #[must_use]
    pub fn widget_inputs(&self, data: &ContractData) -> WidgetInputs {
        widget_inputs(&self.index, data)
    }

    #[must_use]
    pub fn update(&self, data: &ContractData, field_name: &str, value: Option<&str>) -> Patch {
        compute_update(&self.index, data, field_name, value)
    }

    #[must_use]
    pub fn unfilled(&self, data: &ContractData) -> UnfilledReport {
        unfilled(&self.index, data)
    }

    /// Navigator positioned on the first unfilled entry.
    #[must_use]
    pub fn navigator(&self, data: &ContractData) -> FieldNavigator {
        FieldNavigator::new(self.unfilled(data).unfilled_fields)
    }

    /// Start a synchronised editing session over `record`.
    #[must_use]
    pub fn session(&self, record: ContractData) -> SyncSession {
        SyncSession::new(self.index.clone(), record)
    }
}
