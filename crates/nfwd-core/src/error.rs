//! Error types for nfwd core values

use thiserror::Error;

use crate::face::FaceId;

/// Errors related to names and name components
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Invalid name URI: {0}")]
    InvalidUri(String),

    #[error("Invalid percent escape in component: {0}")]
    InvalidEscape(String),

    #[error("Component is not a version component")]
    NotVersion,

    #[error("Invalid version length: {0} bytes")]
    InvalidVersionLength(usize),
}

/// Errors related to faces
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FaceError {
    #[error("Face not found: {0}")]
    NotFound(FaceId),

    #[error("Face already registered: {0}")]
    Duplicate(FaceId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_error_display() {
        let err = NameError::InvalidUri("no/slash".to_string());
        assert!(format!("{}", err).contains("Invalid name URI"));
        assert!(format!("{}", err).contains("no/slash"));

        let err = NameError::InvalidVersionLength(3);
        assert!(format!("{}", err).contains("3 bytes"));
    }

    #[test]
    fn test_face_error_display() {
        let err = FaceError::NotFound(FaceId(42));
        assert!(format!("{}", err).contains("42"));

        let err = FaceError::Duplicate(FaceId(7));
        assert!(format!("{}", err).contains("already registered"));
    }
}
