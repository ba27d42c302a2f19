use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Dataset error: {message}")]
    Dataset { message: String },

    #[error("Invalid feature '{column}': {message}")]
    InvalidFeature { column: String, message: String },

    #[error("Inference error: {category}: {message}")]
    Inference { category: String, message: String },

    #[error("Training error: {message}")]
    Training { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    pub fn invalid_feature(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFeature {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn inference(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Inference {
            category: category.into(),
            message: message.into(),
        }
    }

    pub fn training(message: impl Into<String>) -> Self {
        Self::Training {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
