// ⚠️ Error taxonomy for height exports and scene building
//
// Any error aborts the whole export: there is no partial output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    /// Registry entry has no factory behind it
    #[error("No entity factory registered for '{0}'")]
    MissingEntity(String),

    /// Entity produced by a factory has no name
    #[error("Entity from registry entry '{0}' has no name")]
    MissingName(String),

    /// View has no height at the accessor path of the selected schema
    #[error("View '{view}' of entity '{entity}' has no height at {path}")]
    MissingHeight {
        entity: String,
        view: String,
        path: &'static str,
    },

    /// Two entities reported the same name
    #[error("Entity name '{0}' produced by more than one registry entry")]
    DuplicateEntity(String),

    #[error("Unknown unit: '{0}'")]
    UnknownUnit(String),

    /// Measurement cannot be expressed as a finite number in the target unit
    #[error("Cannot convert {value} to {unit}")]
    UnitConversion { value: String, unit: String },

    /// Catalog could not be read or does not match the selected view shape
    #[error("Invalid entity catalog: {0}")]
    Catalog(String),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Scene entity not written as name:model:view:height
    #[error("Invalid entity spec: {0}")]
    InvalidSpec(String),

    #[error("At least one entity is required to build a scene")]
    EmptyScene,

    #[error("Unknown model: '{0}'")]
    UnknownModel(String),

    #[error("Model '{model}' has no view '{view}'")]
    UnknownView { model: String, view: String },
}

impl ExportError {
    pub fn missing_height(
        entity: impl Into<String>,
        view: impl Into<String>,
        path: &'static str,
    ) -> Self {
        Self::MissingHeight {
            entity: entity.into(),
            view: view.into(),
            path,
        }
    }

    pub fn conversion(value: impl ToString, unit: impl Into<String>) -> Self {
        Self::UnitConversion {
            value: value.to_string(),
            unit: unit.into(),
        }
    }

    /// Attach entity and view names to a MissingHeight raised by a view
    pub fn at(self, entity: &str, view: &str) -> Self {
        match self {
            Self::MissingHeight { path, .. } => Self::missing_height(entity, view, path),
            other => other,
        }
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
