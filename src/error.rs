use thiserror::Error;

/// Geofield-specific error types
#[derive(Debug, Error)]
pub enum GeoFieldError {
    #[error("Malformed geometry text: {0}")]
    MalformedInput(String),

    #[error("Unknown geometry kind: {0}")]
    UnknownGeometryKind(String),

    #[error("Invalid spatial reference: {0}")]
    InvalidReference(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Geometry kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: String, found: String },

    #[error("Coordinate reference system error: {0}")]
    Crs(String),

    #[error("Popup opened with no content")]
    EmptyContent,
}

impl GeoFieldError {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        GeoFieldError::MalformedInput(msg.into())
    }

    pub fn unknown_kind<S: Into<String>>(kind: S) -> Self {
        GeoFieldError::UnknownGeometryKind(kind.into())
    }

    pub fn invalid_reference<S: Into<String>>(msg: S) -> Self {
        GeoFieldError::InvalidReference(msg.into())
    }

    pub fn invalid_geometry<S: Into<String>>(msg: S) -> Self {
        GeoFieldError::InvalidGeometry(msg.into())
    }

    pub fn kind_mismatch<E: Into<String>, F: Into<String>>(expected: E, found: F) -> Self {
        GeoFieldError::KindMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn crs<S: Into<String>>(msg: S) -> Self {
        GeoFieldError::Crs(msg.into())
    }
}

/// Result type for geofield operations
pub type GeoFieldResult<T> = Result<T, GeoFieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = GeoFieldError::malformed("unexpected token");
        assert!(matches!(error, GeoFieldError::MalformedInput(_)));
        assert_eq!(error.to_string(), "Malformed geometry text: unexpected token");
    }

    #[test]
    fn test_kind_mismatch_display() {
        let error = GeoFieldError::kind_mismatch("POINT", "POLYGON");
        assert!(error.to_string().contains("POINT"));
        assert!(error.to_string().contains("POLYGON"));
    }

    #[test]
    fn test_empty_content_display() {
        assert_eq!(
            GeoFieldError::EmptyContent.to_string(),
            "Popup opened with no content"
        );
    }
}
