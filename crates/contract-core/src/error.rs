//! Errors for the text boundary of the engine.
//!
//! Engine operations themselves are total: a partial or malformed template
//! degrades to fewer fields instead of failing. Only turning raw text into
//! JSON can fail, and those failures are reported here.

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("parse json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a json object at the top level")]
    NotAnObject,
    #[error("contract data value for {key:?} must be a scalar")]
    InvalidDataValue { key: String },
}
