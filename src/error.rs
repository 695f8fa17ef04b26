use thiserror::Error;

#[derive(Error, Debug)]
pub enum StratusError {
    // Search index errors
    #[error("document not found: {id} in index {index}")]
    DocumentNotFound { id: String, index: String },

    // Object store errors
    #[error("no such object: {key} in bucket {bucket}")]
    ObjectNotFound { bucket: String, key: String },

    // Validation errors
    #[error("validation error: {0}")]
    Validation(String),

    // Config errors
    #[error("config error: {0}")]
    Config(String),

    // Serialization errors
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StratusError>;

impl StratusError {
    pub fn status_code(&self) -> u16 {
        match self {
            StratusError::DocumentNotFound { .. } | StratusError::ObjectNotFound { .. } => 404,

            StratusError::Validation(_) => 400,

            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_not_found_status_code() {
        let err = StratusError::DocumentNotFound {
            id: "abc123xyz".into(),
            index: "products".into(),
        };
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_object_not_found_status_code() {
        let err = StratusError::ObjectNotFound {
            bucket: "local-bucket".into(),
            key: "uploads/missing.txt".into(),
        };
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_validation_status_code() {
        let err = StratusError::Validation("bad input".into());
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_default_status_code() {
        let err = StratusError::Config("missing key".into());
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_display_formatting() {
        let err = StratusError::DocumentNotFound {
            id: "doc-9".into(),
            index: "notes".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("doc-9"));
        assert!(msg.contains("notes"));

        let err = StratusError::ObjectNotFound {
            bucket: "b1".into(),
            key: "k/v.bin".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("b1"));
        assert!(msg.contains("k/v.bin"));
    }
}
