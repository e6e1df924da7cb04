//! Error types for the placeport CSV interchange layer.
//!
//! - [`SchemaError`] - data-type resolution errors
//! - [`ExportError`] - CSV export errors
//! - [`TemplateError`] - template generation errors
//!
//! Import problems are deliberately NOT represented here: the importer is
//! fail-soft and folds every recoverable failure into
//! [`crate::import::ImportResult`]. Only the export/template write paths
//! propagate errors with `?`.

use thiserror::Error;

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors resolving a data type from its string form.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The string does not name a known entity category.
    #[error("Unknown data type: '{0}' (expected students, faculty, operations, outreach or admin)")]
    UnknownDataType(String),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors during CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to write the export file.
    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),

    /// No headers could be derived for the document.
    #[error("Cannot derive export headers: {0}")]
    NoHeaders(String),
}

// =============================================================================
// Template Errors
// =============================================================================

/// Errors during template generation.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Failed to write the template file.
    #[error("Failed to write template file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for schema lookups.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_data_type_message() {
        let err = SchemaError::UnknownDataType("companies".into());
        let msg = err.to_string();
        assert!(msg.contains("companies"));
        assert!(msg.contains("students"));
    }

    #[test]
    fn test_export_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ExportError = io.into();
        assert!(err.to_string().contains("denied"));
    }
}
