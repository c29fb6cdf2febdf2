use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesignDocError {
    #[error("invalid spec field '{field}': {reason}")]
    InvalidSpec { field: String, reason: String },

    #[error("strategy '{approach}' does not support domain type '{domain}'")]
    UnsupportedDomain { approach: String, domain: String },

    #[error("validation failed with score {score}: {}", errors.join("; "))]
    ValidationFailed { score: u32, errors: Vec<String> },

    #[error("unknown approach: {0}")]
    UnknownApproach(String),

    #[error("unknown cross-cutting capability: {0}")]
    UnknownCapability(String),

    #[error("invalid constitution: {0}")]
    InvalidConstitution(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DesignDocError {
    pub(crate) fn invalid_spec(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DesignDocError::InvalidSpec {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DesignDocError>;
