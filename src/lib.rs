//! # Placeport - placement-cell CSV import/export
//!
//! Placeport moves university placement-cell records (students, faculty,
//! operations, outreach, admin staff) in and out of CSV files with
//! schema-driven validation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Records    │────▶│  Exporter   │────▶│ Value Codec │────▶│  CSV file   │
//! │ (JSON maps) │     │ (headers)   │     │ (escape)    │     │ (BOM+UTF-8) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV file   │────▶│  Importer   │────▶│ Validation  │────▶│ImportResult │
//! │ (any enc.)  │     │ (scan+coerce)│    │ (rules)     │     │ (partition) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! Both directions are driven by the [`schema::SchemaRegistry`]: ordered
//! field paths, display headers, per-field coercion kinds, required fields
//! and validation rules, all static tables.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use placeport::{import_from_csv, DataType};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let result = import_from_csv(Path::new("students.csv"), DataType::Students).await;
//!     println!("{} valid rows, {} errors", result.summary.valid_rows, result.errors.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types and Result aliases
//! - [`schema`] - Field registry (entity schemas, rules, samples)
//! - [`codec`] - Nested access, coercion, cell quoting, line scanning
//! - [`validation`] - Rule evaluation over reconstructed rows
//! - [`import`] - Fail-soft CSV importer
//! - [`export`] - Dated CSV file exporter
//! - [`template`] - Import template generator

// Core modules
pub mod error;
pub mod schema;

// Value layer
pub mod codec;

// Validation
pub mod validation;

// Read path
pub mod import;

// Write path
pub mod export;

// Templates
pub mod template;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ExportError, ExportResult, SchemaError, SchemaResult, TemplateError, TemplateResult,
};

// =============================================================================
// Re-exports - Schema
// =============================================================================

pub use schema::{
    default_registry, DataType, EntitySchema, FieldKind, FieldSpec, RuleKey, SchemaRegistry,
    ValidationRule,
};

// =============================================================================
// Re-exports - Codec
// =============================================================================

pub use codec::{
    cell_for, coerce, escape_csv, format_csv_value, get_nested, parse_csv_line, set_nested,
    value_to_cell,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate_records, validate_row, ValidationError};

// =============================================================================
// Re-exports - Import
// =============================================================================

pub use import::{
    import_from_csv, validate_import_file, CsvImporter, ImportOptions, ImportResult,
    ImportSummary, MAX_IMPORT_BYTES,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{
    export_admin_csv, export_entity_csv, export_faculty_csv, export_operations_csv,
    export_outreach_csv, export_students_csv, CsvExporter, ExportOptions, BOM,
};

// =============================================================================
// Re-exports - Templates
// =============================================================================

pub use template::{
    download_all_templates, download_csv_template, generate_csv_template, write_all_templates,
    write_csv_template, TemplateOptions,
};
