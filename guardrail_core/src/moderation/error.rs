use thiserror::Error;

use crate::moderation::dto::Direction;

/// A violated moderation rule. `Display` is the notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("OpenAI moderation requires a configured OpenAI provider")]
    ProviderNotConfigured,
    #[error("Enable moderation for inputs, outputs, or both")]
    NoDirectionEnabled,
    #[error("{label} cannot be empty")]
    MissingRequiredField { field: String, label: String },
    #[error("Preset response for {0} cannot be empty")]
    MissingPresetResponse(Direction),
    #[error("Moderation provider {0} has no form schema")]
    MissingFormSchema(String),
    #[error("Unknown moderation provider: {0}")]
    UnknownProvider(String),
}

impl ValidationError {
    pub fn missing_field(field: impl Into<String>, label: impl Into<String>) -> Self {
        ValidationError::MissingRequiredField {
            field: field.into(),
            label: label.into(),
        }
    }

    /// The offending field name, for errors tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingRequiredField { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to save moderation settings: {0}")]
    Sink(anyhow::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Moderation is not configured for app {0}")]
    NotConfigured(String),
    #[error("Moderation provider {0} cannot run locally")]
    Unsupported(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
