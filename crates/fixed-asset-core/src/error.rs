use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixedAssetError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FixedAssetError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FixedAssetError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FixedAssetError {
    fn from(e: serde_json::Error) -> Self {
        FixedAssetError::SerializationError(e.to_string())
    }
}
