//! CSV exporter: document assembly and dated file output.
//!
//! The exporter flattens records through the schema registry's field paths,
//! escapes each cell and writes `{filename}_{YYYY-MM-DD}.csv` with an
//! optional UTF-8 BOM for spreadsheet compatibility. An empty input is not
//! an error: it logs a warning and produces no file.

use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::codec::{cell_for, escape_csv};
use crate::error::{ExportError, ExportResult};
use crate::schema::{default_registry, DataType, SchemaRegistry};

/// UTF-8 byte order mark, prepended for spreadsheet tools.
pub const BOM: &str = "\u{feff}";

/// Options controlling header resolution and output placement.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Select registry headers and display names.
    pub data_type: Option<DataType>,
    /// Explicit column paths; takes precedence over `data_type`.
    pub custom_headers: Option<Vec<String>>,
    /// Prepend a UTF-8 BOM (on by default).
    pub bom: bool,
    /// Directory the dated file is written into.
    pub output_dir: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            data_type: None,
            custom_headers: None,
            bom: true,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ExportOptions {
    pub fn for_data_type(data_type: DataType) -> Self {
        Self {
            data_type: Some(data_type),
            ..Self::default()
        }
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
}

/// Schema-driven CSV exporter.
pub struct CsvExporter<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> CsvExporter<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Assemble the CSV document text, or `None` for empty input.
    ///
    /// Header resolution order: custom headers, then registry headers for
    /// the data type, then the shallow keys of the first record. The
    /// shallow fallback does not auto-discover nested paths.
    pub fn build_csv(&self, data: &[Value], options: &ExportOptions) -> ExportResult<Option<String>> {
        if data.is_empty() {
            warn!("export skipped: no records to export");
            return Ok(None);
        }

        let columns = self.resolve_columns(data, options)?;

        let mut lines = Vec::with_capacity(data.len() + 1);
        lines.push(
            columns
                .iter()
                .map(|(_, display)| escape_csv(display))
                .collect::<Vec<_>>()
                .join(","),
        );
        for record in data {
            lines.push(
                columns
                    .iter()
                    .map(|(path, _)| escape_csv(&cell_for(record, path)))
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }

        let mut document = lines.join("\n");
        if options.bom {
            document.insert_str(0, BOM);
        }
        Ok(Some(document))
    }

    /// Build and write `{filename}_{YYYY-MM-DD}.csv`.
    ///
    /// Returns the written path, or `Ok(None)` for the empty-input no-op.
    pub fn export_to_csv(
        &self,
        data: &[Value],
        filename: &str,
        options: &ExportOptions,
    ) -> ExportResult<Option<PathBuf>> {
        let Some(document) = self.build_csv(data, options)? else {
            return Ok(None);
        };

        let path = dated_path(&options.output_dir, filename);
        fs::create_dir_all(&options.output_dir)?;
        fs::write(&path, document)?;
        info!(records = data.len(), path = %path.display(), "exported CSV");
        Ok(Some(path))
    }

    /// Export only the given field paths, with the data type's display names.
    pub fn export_filtered_data(
        &self,
        data: &[Value],
        filename: &str,
        data_type: DataType,
        fields: &[String],
        options: &ExportOptions,
    ) -> ExportResult<Option<PathBuf>> {
        let filtered = ExportOptions {
            data_type: Some(data_type),
            custom_headers: Some(fields.to_vec()),
            ..options.clone()
        };
        self.export_to_csv(data, filename, &filtered)
    }

    /// Export a two-column Metric/Value summary document.
    pub fn export_summary_csv(
        &self,
        summary: &[(String, Value)],
        filename: &str,
        options: &ExportOptions,
    ) -> ExportResult<Option<PathBuf>> {
        let records: Vec<Value> = summary
            .iter()
            .map(|(metric, value)| {
                serde_json::json!({ "metric": metric, "value": value })
            })
            .collect();
        let summary_options = ExportOptions {
            data_type: None,
            custom_headers: Some(vec!["metric".to_string(), "value".to_string()]),
            ..options.clone()
        };
        self.export_to_csv(&records, filename, &summary_options)
    }

    /// Resolve ordered (path, display) column pairs.
    fn resolve_columns(
        &self,
        data: &[Value],
        options: &ExportOptions,
    ) -> ExportResult<Vec<(String, String)>> {
        if let Some(custom) = &options.custom_headers {
            return Ok(custom
                .iter()
                .map(|path| {
                    let display = options
                        .data_type
                        .map(|dt| self.registry.display_name_for(dt, path).to_string())
                        .unwrap_or_else(|| path.clone());
                    (path.clone(), display)
                })
                .collect());
        }

        if let Some(data_type) = options.data_type {
            return Ok(self
                .registry
                .schema(data_type)
                .fields
                .iter()
                .map(|f| (f.path.to_string(), f.display.to_string()))
                .collect());
        }

        // Fallback: shallow keys of the first record.
        let Some(first) = data[0].as_object() else {
            return Err(ExportError::NoHeaders(
                "first record is not an object and no data type was given".to_string(),
            ));
        };
        if first.is_empty() {
            return Err(ExportError::NoHeaders("first record has no keys".to_string()));
        }
        Ok(first.keys().map(|k| (k.clone(), k.clone())).collect())
    }
}

/// `{dir}/{base}_{YYYY-MM-DD}.csv` using the UTC date.
fn dated_path(dir: &Path, base: &str) -> PathBuf {
    dir.join(format!("{}_{}.csv", base, Utc::now().format("%Y-%m-%d")))
}

// =============================================================================
// Type-specific shorthands over the default registry
// =============================================================================

/// Export one entity category with its registry headers.
pub fn export_entity_csv(
    data_type: DataType,
    data: &[Value],
    output_dir: impl AsRef<Path>,
) -> ExportResult<Option<PathBuf>> {
    let options = ExportOptions::for_data_type(data_type).with_output_dir(output_dir);
    CsvExporter::new(default_registry()).export_to_csv(
        data,
        &format!("{}_export", data_type.as_str()),
        &options,
    )
}

pub fn export_students_csv(data: &[Value], dir: impl AsRef<Path>) -> ExportResult<Option<PathBuf>> {
    export_entity_csv(DataType::Students, data, dir)
}

pub fn export_faculty_csv(data: &[Value], dir: impl AsRef<Path>) -> ExportResult<Option<PathBuf>> {
    export_entity_csv(DataType::Faculty, data, dir)
}

pub fn export_operations_csv(data: &[Value], dir: impl AsRef<Path>) -> ExportResult<Option<PathBuf>> {
    export_entity_csv(DataType::Operations, data, dir)
}

pub fn export_outreach_csv(data: &[Value], dir: impl AsRef<Path>) -> ExportResult<Option<PathBuf>> {
    export_entity_csv(DataType::Outreach, data, dir)
}

pub fn export_admin_csv(data: &[Value], dir: impl AsRef<Path>) -> ExportResult<Option<PathBuf>> {
    export_entity_csv(DataType::Admin, data, dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exporter() -> CsvExporter<'static> {
        CsvExporter::new(default_registry())
    }

    fn no_bom_options(data_type: DataType) -> ExportOptions {
        ExportOptions {
            bom: false,
            ..ExportOptions::for_data_type(data_type)
        }
    }

    #[test]
    fn test_empty_dataset_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions::for_data_type(DataType::Students).with_output_dir(dir.path());
        let written = exporter().export_to_csv(&[], "students_export", &options).unwrap();
        assert!(written.is_none());
        // No file of any kind produced.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_header_row_uses_display_names() {
        let data = vec![json!({ "name": "John Doe", "email": "john@srmap.edu.in" })];
        let document = exporter()
            .build_csv(&data, &no_bom_options(DataType::Students))
            .unwrap()
            .unwrap();
        let header = document.lines().next().unwrap();
        assert!(header.starts_with("Full Name,Email Address"));
    }

    #[test]
    fn test_bom_prepended_by_default() {
        let data = vec![json!({ "name": "John" })];
        let options = ExportOptions::for_data_type(DataType::Students);
        let document = exporter().build_csv(&data, &options).unwrap().unwrap();
        assert!(document.starts_with(BOM));
    }

    #[test]
    fn test_quoted_comma_cell() {
        let data = vec![json!({ "name": "Doe, John" })];
        let document = exporter()
            .build_csv(&data, &no_bom_options(DataType::Students))
            .unwrap()
            .unwrap();
        assert!(document.contains("\"Doe, John\""));
    }

    #[test]
    fn test_array_cell_joined() {
        let data = vec![json!({ "skills": { "technical": ["Python", "Java"] } })];
        let document = exporter()
            .build_csv(&data, &no_bom_options(DataType::Students))
            .unwrap()
            .unwrap();
        assert!(document.contains("Python; Java"));
    }

    #[test]
    fn test_shallow_fallback_headers() {
        let data = vec![json!({ "id": 1, "label": "x" })];
        let document = exporter()
            .build_csv(&data, &ExportOptions { bom: false, ..ExportOptions::default() })
            .unwrap()
            .unwrap();
        let header = document.lines().next().unwrap();
        // serde_json objects iterate keys in sorted order.
        assert_eq!(header, "id,label");
    }

    #[test]
    fn test_fallback_requires_object() {
        let data = vec![json!("just a string")];
        let result = exporter().build_csv(&data, &ExportOptions::default());
        assert!(matches!(result, Err(ExportError::NoHeaders(_))));
    }

    #[test]
    fn test_export_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = vec![json!({
            "name": "John Doe",
            "email": "john@srmap.edu.in",
            "rollNumber": "AP1",
            "department": "CSE"
        })];
        let path = export_students_csv(&data, dir.path()).unwrap().unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("students_export_"));
        assert!(name.ends_with(".csv"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(BOM));
        assert!(content.contains("John Doe"));
    }

    #[test]
    fn test_filtered_export() {
        let dir = tempfile::tempdir().unwrap();
        let data = vec![json!({ "name": "John", "email": "j@srmap.edu.in", "cgpa": 8.4 })];
        let options = ExportOptions::default().with_output_dir(dir.path());
        let path = exporter()
            .export_filtered_data(
                &data,
                "shortlist",
                DataType::Students,
                &["name".to_string(), "cgpa".to_string()],
                &options,
            )
            .unwrap()
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.trim_start_matches(BOM).lines().next().unwrap();
        assert_eq!(header, "Full Name,CGPA");
        assert!(!content.contains("j@srmap.edu.in"));
    }

    #[test]
    fn test_summary_export() {
        let dir = tempfile::tempdir().unwrap();
        let summary = vec![
            ("Total Students".to_string(), json!(1200)),
            ("Placed".to_string(), json!(874)),
        ];
        let options = ExportOptions::default().with_output_dir(dir.path());
        let path = exporter()
            .export_summary_csv(&summary, "placement_summary", &options)
            .unwrap()
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let body = content.trim_start_matches(BOM);
        assert!(body.starts_with("metric,value"));
        assert!(body.contains("Total Students,1200"));
    }

    #[test]
    fn test_export_then_import_roundtrip() {
        let data = vec![json!({
            "name": "Doe, John",
            "email": "john@srmap.edu.in",
            "rollNumber": "AP1",
            "department": "CSE",
            "cgpa": 8.4,
            "skills": { "technical": ["Python", "Java"] },
            "isRegistered": true
        })];
        let document = exporter()
            .build_csv(&data, &ExportOptions::for_data_type(DataType::Students))
            .unwrap()
            .unwrap();

        let importer = crate::import::CsvImporter::new(default_registry());
        let result =
            importer.import_from_str(document.trim_start_matches(BOM), DataType::Students);

        assert!(result.success, "errors: {:?}", result.errors);
        let row = &result.data[0];
        assert_eq!(row["name"], "Doe, John");
        assert_eq!(row["cgpa"], json!(8.4));
        assert_eq!(row["skills"]["technical"], json!(["Python", "Java"]));
        assert_eq!(row["isRegistered"], json!(true));
    }
}
