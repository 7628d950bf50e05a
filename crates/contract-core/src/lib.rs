//! contract-core: schema-driven form model for fillable contract templates.
//!
//! A template is a list of pages of positioned field schemas. This crate
//! indexes those fields, groups them into render sections by their dotted
//! names, encodes mutually exclusive option groups, computes the patch for an
//! edit, tracks which required fields are still empty, and keeps two editing
//! surfaces in step with one canonical record.

pub mod engine;
pub mod error;
pub mod family;
pub mod group_bus;
pub mod index;
pub mod label;
pub mod navigator;
pub mod radio;
pub mod record;
pub mod schema;
pub mod sync;
pub mod unfilled;
pub mod update;

pub use engine::ContractEngine;
pub use error::TemplateError;
pub use family::{render_model, FamilySection, RenderItem, RenderModel};
pub use index::{FieldDescriptor, OptionGroup, SchemaIndex};
pub use navigator::{FieldNavigator, NavigatorState};
pub use radio::WidgetInputs;
pub use record::ContractData;
pub use schema::{FieldType, Template};
pub use sync::{ChangeOutcome, SurfaceId, SurfaceWidget, SyncSession};
pub use unfilled::{unfilled, UnfilledEntry, UnfilledReport};
pub use update::{compute_update, Patch, PatchOp};

/// Crate identity label.
pub fn crate_label() -> &'static str {
    "contract-core"
}
