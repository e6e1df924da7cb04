//! Placeport CLI - schema-driven CSV import/export for placement-cell data
//!
//! # Main Commands
//!
//! ```bash
//! placeport import students.csv -t students    # Import and validate a CSV
//! placeport export records.json -t students    # Export JSON records to CSV
//! placeport template all                       # Write import templates
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! placeport preflight upload.csv               # Pre-flight file checks only
//! placeport validate records.json -t faculty   # Validate JSON records
//! placeport schema students                    # Show a schema's columns
//! ```

use clap::{Parser, Subcommand};
use placeport::{
    default_registry, download_all_templates, download_csv_template, validate_records,
    CsvExporter, CsvImporter, DataType, ExportOptions, TemplateOptions,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "placeport")]
#[command(about = "Import, export and validate placement-cell CSV data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a JSON array of records to a dated CSV file
    Export {
        /// Input JSON file (array of records)
        input: PathBuf,

        /// Data type (students, faculty, operations, outreach, admin)
        #[arg(short = 't', long)]
        data_type: String,

        /// Base filename (default: "{data_type}_export")
        #[arg(short, long)]
        filename: Option<String>,

        /// Output directory (default: PLACEPORT_OUTPUT_DIR or ".")
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Export only these field paths (comma separated)
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Skip the UTF-8 BOM
        #[arg(long)]
        no_bom: bool,
    },

    /// Import a CSV file, validate it and report the result
    Import {
        /// Input CSV file
        input: PathBuf,

        /// Data type (students, faculty, operations, outreach, admin)
        #[arg(short = 't', long)]
        data_type: String,

        /// Write the full import result as JSON (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip pre-flight file checks
        #[arg(long)]
        skip_preflight: bool,
    },

    /// Run pre-flight checks on a file without reading its content
    Preflight {
        /// Candidate import file
        input: PathBuf,
    },

    /// Validate a JSON array of records against a schema
    Validate {
        /// Input JSON file (array of records)
        input: PathBuf,

        /// Data type (students, faculty, operations, outreach, admin)
        #[arg(short = 't', long)]
        data_type: String,
    },

    /// Write CSV import templates
    Template {
        /// Data type, or "all" for every template
        #[arg(default_value = "all")]
        data_type: String,

        /// Output directory (default: PLACEPORT_OUTPUT_DIR or ".")
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Omit the sample data row
        #[arg(long)]
        no_sample: bool,

        /// Omit the instruction comment lines
        #[arg(long)]
        no_instructions: bool,
    },

    /// Show the columns of an entity schema
    Schema {
        /// Data type (students, faculty, operations, outreach, admin)
        data_type: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Export {
            input,
            data_type,
            filename,
            output_dir,
            fields,
            no_bom,
        } => cmd_export(&input, &data_type, filename, output_dir, fields, no_bom),

        Commands::Import {
            input,
            data_type,
            output,
            skip_preflight,
        } => cmd_import(&input, &data_type, output.as_deref(), skip_preflight).await,

        Commands::Preflight { input } => cmd_preflight(&input),

        Commands::Validate { input, data_type } => cmd_validate(&input, &data_type),

        Commands::Template {
            data_type,
            output_dir,
            no_sample,
            no_instructions,
        } => cmd_template(&data_type, output_dir, no_sample, no_instructions),

        Commands::Schema { data_type } => cmd_schema(&data_type),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Resolve the output directory: flag > PLACEPORT_OUTPUT_DIR > ".".
fn resolve_output_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("PLACEPORT_OUTPUT_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn read_records(input: &Path) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(input)?;
    let records: Vec<Value> = serde_json::from_str(&content)?;
    Ok(records)
}

fn cmd_export(
    input: &Path,
    data_type: &str,
    filename: Option<String>,
    output_dir: Option<PathBuf>,
    fields: Option<Vec<String>>,
    no_bom: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data_type: DataType = data_type.parse()?;
    let records = read_records(input)?;
    eprintln!("Exporting {} {} record(s)...", records.len(), data_type);

    let options = ExportOptions {
        bom: !no_bom,
        ..ExportOptions::for_data_type(data_type).with_output_dir(resolve_output_dir(output_dir))
    };
    let filename = filename.unwrap_or_else(|| format!("{}_export", data_type.as_str()));

    let exporter = CsvExporter::new(default_registry());
    let written = match fields {
        Some(fields) => {
            exporter.export_filtered_data(&records, &filename, data_type, &fields, &options)?
        }
        None => exporter.export_to_csv(&records, &filename, &options)?,
    };

    match written {
        Some(path) => eprintln!("Wrote {}", path.display()),
        None => eprintln!("Nothing to export."),
    }
    Ok(())
}

async fn cmd_import(
    input: &Path,
    data_type: &str,
    output: Option<&Path>,
    skip_preflight: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data_type: DataType = data_type.parse()?;
    let importer = CsvImporter::new(default_registry());

    if !skip_preflight {
        let reasons = importer.validate_import_file(input);
        if !reasons.is_empty() {
            for reason in &reasons {
                eprintln!("  - {}", reason);
            }
            return Err("File rejected by pre-flight checks".into());
        }
    }

    eprintln!("Importing {} as {}...", input.display(), data_type);
    let result = importer.import_from_csv(input, data_type).await;

    eprintln!("  Rows:     {}", result.summary.total_rows);
    eprintln!("  Valid:    {}", result.summary.valid_rows);
    eprintln!("  Errors:   {} (in {} row(s))", result.errors.len(), result.summary.error_rows);
    for warning in &result.warnings {
        eprintln!("  Warning: {}", warning);
    }
    for error in result.errors.iter().take(10) {
        eprintln!("  Row {}, {}: {}", error.row, error.field, error.message);
    }
    if result.errors.len() > 10 {
        eprintln!("  ... and {} more error(s)", result.errors.len() - 10);
    }

    let json = serde_json::to_string_pretty(&result)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("Result written to {}", path.display());
        }
        None => println!("{}", json),
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_preflight(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let importer = CsvImporter::new(default_registry());
    let reasons = importer.validate_import_file(input);
    if reasons.is_empty() {
        eprintln!("{} passed pre-flight checks", input.display());
        Ok(())
    } else {
        for reason in &reasons {
            eprintln!("  - {}", reason);
        }
        Err("File rejected by pre-flight checks".into())
    }
}

fn cmd_validate(input: &Path, data_type: &str) -> Result<(), Box<dyn std::error::Error>> {
    let data_type: DataType = data_type.parse()?;
    let records = read_records(input)?;
    eprintln!("Validating {} {} record(s)...", records.len(), data_type);

    let errors = validate_records(default_registry(), data_type, &records);
    if errors.is_empty() {
        eprintln!("All records valid.");
        return Ok(());
    }

    for error in errors.iter().take(20) {
        // Row numbers are CSV-style (first data row = 2); map back to the
        // JSON array index for direct record input.
        eprintln!("  Record {}, {}: {}", error.row - 2, error.field, error.message);
    }
    if errors.len() > 20 {
        eprintln!("  ... and {} more error(s)", errors.len() - 20);
    }
    Err(format!("{} validation error(s)", errors.len()).into())
}

fn cmd_template(
    data_type: &str,
    output_dir: Option<PathBuf>,
    no_sample: bool,
    no_instructions: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = resolve_output_dir(output_dir);
    let options = TemplateOptions {
        include_sample_data: !no_sample,
        include_instructions: !no_instructions,
    };

    let paths = if data_type.eq_ignore_ascii_case("all") {
        download_all_templates(&dir, options)?
    } else {
        vec![download_csv_template(data_type.parse()?, &dir, options)?]
    };

    for path in paths {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

fn cmd_schema(data_type: &str) -> Result<(), Box<dyn std::error::Error>> {
    let data_type: DataType = data_type.parse()?;
    let registry = default_registry();
    let schema = registry.schema(data_type);

    println!("{} ({} columns)\n", data_type.label(), schema.fields.len());
    for field in schema.fields {
        println!(
            "  {:35} {:25} {:12} {}",
            field.display,
            field.path,
            format!("{:?}", field.kind).to_lowercase(),
            if field.required { "required" } else { "" }
        );
    }
    Ok(())
}
