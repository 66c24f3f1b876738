use std::fmt;

use serde::Serialize;

use super::super::document::MalformedInput;
use super::super::items::ConfigError;

/// Location of a node inside a template document, e.g. `structure.areas[0].items[2]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodePath(String);

impl NodePath {
    pub fn template() -> Self {
        Self("template".to_string())
    }

    pub(crate) fn structure() -> Self {
        Self("structure".to_string())
    }

    pub(crate) fn child(&self, segment: &str, index: usize) -> Self {
        Self(format!("{}.{segment}[{index}]", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named rule violation found while validating a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{path}: missing required field `{field}`")]
    MissingField { path: NodePath, field: &'static str },
    #[error("template name must not be empty")]
    EmptyTemplateName,
    #[error("template name is {length} characters long, the limit is {max}")]
    TemplateNameTooLong { length: usize, max: usize },
    #[error("{path}: area name must not be empty")]
    EmptyAreaName { path: NodePath },
    #[error("{path}: unknown item type `{found}`")]
    UnknownItemType { path: NodePath, found: String },
    #[error("item id `{id}` is used by both {first} and {second}")]
    DuplicateItemId {
        id: String,
        first: NodePath,
        second: NodePath,
    },
    #[error("area id `{id}` is used by both {first} and {second}")]
    DuplicateAreaId {
        id: String,
        first: NodePath,
        second: NodePath,
    },
    #[error("template has areas but none of them contains an item")]
    NoItems,
    #[error("{path}: item `{item_id}`: {source}")]
    ItemConfig {
        path: NodePath,
        item_id: String,
        source: ConfigError,
    },
}

impl SchemaError {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::MissingField { .. } => "missing_field",
            SchemaError::EmptyTemplateName => "empty_template_name",
            SchemaError::TemplateNameTooLong { .. } => "template_name_too_long",
            SchemaError::EmptyAreaName { .. } => "empty_area_name",
            SchemaError::UnknownItemType { .. } => "unknown_item_type",
            SchemaError::DuplicateItemId { .. } => "duplicate_item_id",
            SchemaError::DuplicateAreaId { .. } => "duplicate_area_id",
            SchemaError::NoItems => "no_items",
            SchemaError::ItemConfig { source, .. } => source.code(),
        }
    }

    /// Path of the offending node; duplicates report the later occurrence.
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            SchemaError::MissingField { path, .. }
            | SchemaError::EmptyAreaName { path }
            | SchemaError::UnknownItemType { path, .. }
            | SchemaError::ItemConfig { path, .. } => Some(path),
            SchemaError::DuplicateItemId { second, .. }
            | SchemaError::DuplicateAreaId { second, .. } => Some(second),
            SchemaError::EmptyTemplateName
            | SchemaError::TemplateNameTooLong { .. }
            | SchemaError::NoItems => None,
        }
    }

    pub fn view(&self) -> SchemaErrorView {
        SchemaErrorView {
            code: self.code(),
            path: self.path().map(|path| path.to_string()),
            message: self.to_string(),
        }
    }
}

/// Serializable projection handed to authoring UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaErrorView {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

/// Outcome of validating raw JSON: either unreadable or readable with rule violations.
#[derive(Debug, thiserror::Error)]
pub enum ValidationFailure {
    #[error(transparent)]
    Malformed(#[from] MalformedInput),
    #[error("template failed validation with {} error(s)", .0.len())]
    Invalid(Vec<SchemaError>),
}
