//! CSV importer: file reading, decoding, parsing, validation and
//! partitioning into an [`ImportResult`].
//!
//! The import boundary is fail-soft: nothing here returns `Err`. Structural
//! failures (unreadable file, fewer than two non-empty lines) surface as a
//! single synthetic error on row 0; per-row validation failures exclude the
//! affected rows from `data` without aborting the rest.
//!
//! Encoding is auto-detected from the raw bytes so exports from common
//! spreadsheet tools (UTF-8 with BOM, Windows-1252, Latin-1) re-import
//! cleanly.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use crate::codec::{parse_csv_line, set_nested};
use crate::schema::{default_registry, DataType, SchemaRegistry};
use crate::validation::{validate_records, ValidationError};

/// Default pre-flight size limit: 10 MB.
pub const MAX_IMPORT_BYTES: u64 = 10 * 1024 * 1024;

/// Row count above which a size warning is attached to the result.
pub const ROW_WARNING_THRESHOLD: usize = 1000;

/// Tunables for pre-flight checks and warnings.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Reject files larger than this during pre-flight.
    pub max_file_bytes: u64,
    /// Attach a size warning when an import has more rows than this.
    pub row_warning_threshold: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_IMPORT_BYTES,
            row_warning_threshold: ROW_WARNING_THRESHOLD,
        }
    }
}

/// Row counts for an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Data rows parsed from the file (header excluded).
    pub total_rows: usize,
    /// Rows with no validation errors.
    pub valid_rows: usize,
    /// DISTINCT rows with at least one error, not the error count.
    pub error_rows: usize,
    /// Rows carried into `data`; equals `valid_rows`.
    pub processed_rows: usize,
}

/// Outcome of an import. Partial success is the default: rows referenced by
/// any error are excluded from `data`, everything else survives.
#[derive(Debug, Serialize)]
pub struct ImportResult {
    /// True iff no errors at all were recorded.
    pub success: bool,
    /// Reconstructed records whose row number appears in no error.
    pub data: Vec<Value>,
    /// All accumulated errors, structural and per-row.
    pub errors: Vec<ValidationError>,
    /// Non-fatal advisories (large file, excluded-row count).
    pub warnings: Vec<String>,
    /// Row accounting; `valid_rows + error_rows == total_rows`.
    pub summary: ImportSummary,
}

impl ImportResult {
    /// Whole-operation failure with no partial data.
    fn structural_failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            errors: vec![ValidationError::file_error(message)],
            warnings: Vec::new(),
            summary: ImportSummary {
                total_rows: 0,
                valid_rows: 0,
                error_rows: 0,
                processed_rows: 0,
            },
        }
    }
}

/// Schema-driven CSV importer.
pub struct CsvImporter<'a> {
    registry: &'a SchemaRegistry,
    options: ImportOptions,
}

impl<'a> CsvImporter<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self::with_options(registry, ImportOptions::default())
    }

    pub fn with_options(registry: &'a SchemaRegistry, options: ImportOptions) -> Self {
        Self { registry, options }
    }

    /// Pre-flight checks on the file itself, without reading its content.
    ///
    /// Returns human-readable rejection reasons; empty means proceed.
    pub fn validate_import_file(&self, path: &Path) -> Vec<String> {
        let mut reasons = Vec::new();

        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            reasons.push("File must have a .csv extension".to_string());
        }

        match std::fs::metadata(path) {
            Ok(meta) => {
                if meta.len() == 0 {
                    reasons.push("File is empty".to_string());
                }
                if meta.len() > self.options.max_file_bytes {
                    reasons.push(format!(
                        "File exceeds the {} MB size limit",
                        self.options.max_file_bytes / (1024 * 1024)
                    ));
                }
            }
            Err(e) => reasons.push(format!("File is not accessible: {}", e)),
        }

        reasons
    }

    /// Read, decode and import a CSV file. Never fails across this boundary.
    pub async fn import_from_csv(&self, path: &Path, data_type: DataType) -> ImportResult {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return ImportResult::structural_failure(format!(
                    "Failed to read file '{}': {}",
                    path.display(),
                    e
                ))
            }
        };
        let content = decode_bytes(&bytes);
        self.import_from_str(&content, data_type)
    }

    /// Import already-decoded CSV text.
    pub fn import_from_str(&self, content: &str, data_type: DataType) -> ImportResult {
        let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() < 2 {
            return ImportResult::structural_failure(
                "CSV must contain a header row and at least one data row",
            );
        }

        // Reverse-map display headers to field paths; unknown headers pass
        // through as literal keys.
        let headers: Vec<String> = parse_csv_line(lines[0])
            .iter()
            .map(|h| self.registry.path_for_header(data_type, h.trim()))
            .collect();
        debug!(data_type = %data_type, columns = headers.len(), "parsed import header");

        let mut rows = Vec::with_capacity(lines.len() - 1);
        for line in &lines[1..] {
            let cells = parse_csv_line(line);
            let mut row = Value::Object(Map::new());
            for (i, path) in headers.iter().enumerate() {
                let raw = cells.get(i).map(String::as_str).unwrap_or("");
                let kind = self.registry.kind_for(data_type, path);
                set_nested(&mut row, path, raw, kind);
            }
            rows.push(row);
        }

        let errors = validate_records(self.registry, data_type, &rows);
        let error_rows: BTreeSet<usize> = errors.iter().map(|e| e.row).collect();

        let total_rows = rows.len();
        let data: Vec<Value> = rows
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !error_rows.contains(&(index + 2)))
            .map(|(_, row)| row)
            .collect();

        let mut warnings = Vec::new();
        if total_rows > self.options.row_warning_threshold {
            warnings.push(format!(
                "Large import: {} rows may take a while to review",
                total_rows
            ));
        }
        if !errors.is_empty() {
            warnings.push(format!(
                "{} row(s) contain validation errors and were excluded",
                error_rows.len()
            ));
        }

        let summary = ImportSummary {
            total_rows,
            valid_rows: data.len(),
            error_rows: error_rows.len(),
            processed_rows: data.len(),
        };

        ImportResult {
            success: errors.is_empty(),
            data,
            errors,
            warnings,
            summary,
        }
    }
}

/// Decode raw file bytes, auto-detecting the charset and stripping any BOM.
pub(crate) fn decode_bytes(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;
    let decoded = match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => String::from_utf8_lossy(bytes).to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    };
    match decoded.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => decoded,
    }
}

// =============================================================================
// Convenience wrappers over the default registry
// =============================================================================

/// Import with the default registry and options.
pub async fn import_from_csv(path: &Path, data_type: DataType) -> ImportResult {
    CsvImporter::new(default_registry())
        .import_from_csv(path, data_type)
        .await
}

/// Pre-flight with the default registry and options.
pub fn validate_import_file(path: &Path) -> Vec<String> {
    CsvImporter::new(default_registry()).validate_import_file(path)
}
