//! Template schema input: `{ basePdf, schemas: Page[] }`.
//!
//! Decoding is tolerant. A page may be an array of field definitions or a
//! name-keyed object; anything that is not a usable field definition is
//! skipped rather than rejected, so a partially saved template still yields
//! every field it does describe.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::TemplateError;

/// Field kind tag carried by a raw field definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Checkbox,
    RadioGroupOption,
    Date,
    DateTime,
    Signature,
    /// Any tag this engine does not interpret; handled as a plain field.
    Other(String),
}

impl FieldType {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "text" => Self::Text,
            "checkbox" => Self::Checkbox,
            "radioGroupOption" | "radiogroupoption" => Self::RadioGroupOption,
            "date" => Self::Date,
            "dateTime" | "datetime" => Self::DateTime,
            "signature" => Self::Signature,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Checkbox => "checkbox",
            Self::RadioGroupOption => "radioGroupOption",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Signature => "signature",
            Self::Other(raw) => raw,
        }
    }

    /// Presentation-only kinds never hold contract data.
    #[must_use]
    pub fn is_presentation_only(&self) -> bool {
        matches!(self, Self::Signature)
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One raw field definition as stored in a template page.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub group: Option<String>,
    pub required: bool,
    pub position: Option<Position>,
    pub description: Option<String>,
}

impl FieldDef {
    /// Decode a field definition. `key` is the map key when the page is
    /// name-keyed; it stands in for a missing `name`.
    #[must_use]
    pub fn from_value(value: &Value, key: Option<&str>) -> Option<Self> {
        let obj = value.as_object()?;
        let name = non_empty_str(obj, "name")
            .or_else(|| key.map(str::trim).filter(|k| !k.is_empty()))?
            .to_string();

        let field_type = obj
            .get("type")
            .and_then(Value::as_str)
            .map(FieldType::parse)
            .unwrap_or(FieldType::Text);

        Some(Self {
            name,
            field_type,
            group: non_empty_str(obj, "group").map(str::to_string),
            required: decode_flag(obj.get("required")),
            position: obj.get("position").and_then(decode_position),
            description: non_empty_str(obj, "description").map(str::to_string),
        })
    }
}

/// A decoded template. `pages` keeps the input page order and, within a
/// page, the input field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    pub base_pdf: Value,
    pub pages: Vec<Vec<FieldDef>>,
}

impl Template {
    /// Decode a template from JSON. Never fails: a missing or non-array
    /// `schemas` yields zero pages, and a page that is neither an array nor
    /// an object yields an empty page so later page numbers stay aligned.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let base_pdf = obj.get("basePdf").cloned().unwrap_or(Value::Null);
        let pages = match obj.get("schemas") {
            Some(Value::Array(pages)) => pages.iter().map(decode_page).collect(),
            _ => Vec::new(),
        };
        Self { base_pdf, pages }
    }

    pub fn from_json_str(text: &str) -> Result<Self, TemplateError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(TemplateError::NotAnObject);
        }
        Ok(Self::from_value(&value))
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

fn decode_page(page: &Value) -> Vec<FieldDef> {
    match page {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| FieldDef::from_value(item, None))
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, item)| FieldDef::from_value(item, Some(key)))
            .collect(),
        _ => Vec::new(),
    }
}

fn non_empty_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn decode_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(raw)) => raw.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn decode_position(value: &Value) -> Option<Position> {
    let obj = value.as_object()?;
    let x = obj.get("x").and_then(Value::as_f64).unwrap_or(0.0);
    let y = obj.get("y").and_then(Value::as_f64)?;
    Some(Position { x, y })
}
