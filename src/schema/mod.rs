//! Field registry for placement-cell entity schemas.
//!
//! This module is the single source of truth for what each entity category
//! looks like on the wire: column order, display headers, required fields,
//! per-field value kinds and validation rules.
//!
//! # Kind tables
//!
//! Every field row in the static tables carries an explicit [`FieldKind`];
//! coercion never inspects field names. Columns that are not in any table
//! (custom headers) fall back to [`FieldKind::Text`].
//!
//! # Registry injection
//!
//! [`SchemaRegistry`] is an explicit value handed to the exporter, importer
//! and template generator. Callers that don't need schema variants use
//! [`default_registry`], built once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{SchemaError, SchemaResult};

// =============================================================================
// Data Types
// =============================================================================

/// Entity category selecting which header/required/rule set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Students,
    Faculty,
    Operations,
    Outreach,
    Admin,
}

impl DataType {
    /// All known data types, in export-tab order.
    pub fn all() -> [DataType; 5] {
        [
            DataType::Students,
            DataType::Faculty,
            DataType::Operations,
            DataType::Outreach,
            DataType::Admin,
        ]
    }

    /// Lowercase wire name (`students`, `faculty`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Students => "students",
            DataType::Faculty => "faculty",
            DataType::Operations => "operations",
            DataType::Outreach => "outreach",
            DataType::Admin => "admin",
        }
    }

    /// Human label for template instructions and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            DataType::Students => "Students",
            DataType::Faculty => "Faculty",
            DataType::Operations => "Operations",
            DataType::Outreach => "Outreach",
            DataType::Admin => "Admin",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = SchemaError;

    fn from_str(s: &str) -> SchemaResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "students" | "student" => Ok(DataType::Students),
            "faculty" => Ok(DataType::Faculty),
            "operations" => Ok(DataType::Operations),
            "outreach" => Ok(DataType::Outreach),
            "admin" => Ok(DataType::Admin),
            other => Err(SchemaError::UnknownDataType(other.to_string())),
        }
    }
}

// =============================================================================
// Field Kinds
// =============================================================================

/// Value kind a CSV cell is coerced into on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Raw string, unchanged.
    Text,
    /// `parseFloat`-style number; empty cells become null, non-empty
    /// unparseable cells keep their raw text for validation to reject.
    Number,
    /// True iff the lowercased cell is `true` or `1`.
    Boolean,
    /// Semicolon-separated list of trimmed strings.
    StringList,
}

/// One column in an entity schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Dot-separated path into the record (`address.city`).
    pub path: &'static str,
    /// Human header used in exported files.
    pub display: &'static str,
    /// Coercion applied on import.
    pub kind: FieldKind,
    /// Whether a non-empty value is required on import.
    pub required: bool,
}

const fn field(path: &'static str, display: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { path, display, kind, required: false }
}

const fn required(path: &'static str, display: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { path, display, kind, required: true }
}

// =============================================================================
// Entity Schemas (static tables)
// =============================================================================

use FieldKind::{Boolean, Number, StringList, Text};

const STUDENT_FIELDS: &[FieldSpec] = &[
    required("name", "Full Name", Text),
    required("email", "Email Address", Text),
    field("phone", "Phone Number", Text),
    required("rollNumber", "Roll Number", Text),
    required("department", "Department", Text),
    field("year", "Year of Study", Number),
    field("semester", "Semester", Number),
    field("cgpa", "CGPA", Number),
    field("academicHistory.tenth.percentage", "10th Percentage", Number),
    field("academicHistory.twelfth.percentage", "12th Percentage", Number),
    field("address.city", "City", Text),
    field("address.state", "State", Text),
    field("skills.technical", "Technical Skills", StringList),
    field("skills.soft", "Soft Skills", StringList),
    field("family.annualIncome", "Annual Family Income", Number),
    field("isRegistered", "Placement Registered", Boolean),
];

const FACULTY_FIELDS: &[FieldSpec] = &[
    required("name", "Full Name", Text),
    required("email", "Email Address", Text),
    field("phone", "Phone Number", Text),
    required("employeeId", "Employee ID", Text),
    required("department", "Department", Text),
    field("designation", "Designation", Text),
    field("experience", "Experience (Years)", Number),
    field("specialization", "Specialization", Text),
    field("isActive", "Active", Boolean),
];

const OPERATIONS_FIELDS: &[FieldSpec] = &[
    required("name", "Full Name", Text),
    required("email", "Email Address", Text),
    field("phone", "Phone Number", Text),
    required("employeeId", "Employee ID", Text),
    field("responsibilities", "Responsibilities", StringList),
    field("systemAccess", "System Access", StringList),
    field("shift", "Shift", Text),
    field("isActive", "Active", Boolean),
];

const OUTREACH_FIELDS: &[FieldSpec] = &[
    required("name", "Full Name", Text),
    required("email", "Email Address", Text),
    field("phone", "Phone Number", Text),
    required("employeeId", "Employee ID", Text),
    field("region", "Region", Text),
    field("targetSector", "Target Sector", Text),
    field("responsibilities", "Responsibilities", StringList),
    field("isActive", "Active", Boolean),
];

const ADMIN_FIELDS: &[FieldSpec] = &[
    required("name", "Full Name", Text),
    required("email", "Email Address", Text),
    field("phone", "Phone Number", Text),
    required("employeeId", "Employee ID", Text),
    field("role", "Admin Role", Text),
    field("systemAccess", "System Access", StringList),
    field("isActive", "Active", Boolean),
];

/// Ordered column list for one entity category.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    pub data_type: DataType,
    pub fields: &'static [FieldSpec],
}

impl EntitySchema {
    /// Look up a column by its field path.
    pub fn field(&self, path: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// Look up a column by its display header.
    pub fn field_by_display(&self, display: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.display == display)
    }
}

// =============================================================================
// Validation Rules
// =============================================================================

/// Semantic rule key matched from a field path's last segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKey {
    Email,
    Phone,
    Cgpa,
    Percentage,
    Year,
    Semester,
    Experience,
}

/// Explicit suffix-match table: last path segment -> rule key.
const RULE_SUFFIXES: &[(&str, RuleKey)] = &[
    ("email", RuleKey::Email),
    ("phone", RuleKey::Phone),
    ("cgpa", RuleKey::Cgpa),
    ("percentage", RuleKey::Percentage),
    ("year", RuleKey::Year),
    ("semester", RuleKey::Semester),
    ("experience", RuleKey::Experience),
];

/// A field-level validation rule.
#[derive(Debug, Clone)]
pub enum ValidationRule {
    /// String must match the pattern.
    Pattern { regex: Regex, message: &'static str },
    /// Numeric value must fall inside the inclusive range.
    Range { min: f64, max: f64 },
}

// =============================================================================
// Schema Registry
// =============================================================================

/// Lookup service over the entity schemas and validation rules.
pub struct SchemaRegistry {
    schemas: HashMap<DataType, EntitySchema>,
    rules: HashMap<RuleKey, ValidationRule>,
}

impl SchemaRegistry {
    /// Build the registry from the built-in schema tables.
    pub fn new() -> Self {
        let schemas = [
            (DataType::Students, STUDENT_FIELDS),
            (DataType::Faculty, FACULTY_FIELDS),
            (DataType::Operations, OPERATIONS_FIELDS),
            (DataType::Outreach, OUTREACH_FIELDS),
            (DataType::Admin, ADMIN_FIELDS),
        ]
        .into_iter()
        .map(|(data_type, fields)| (data_type, EntitySchema { data_type, fields }))
        .collect();

        let mut rules = HashMap::new();
        rules.insert(
            RuleKey::Email,
            ValidationRule::Pattern {
                regex: Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
                    .expect("email pattern is valid"),
                message: "is not a valid email address",
            },
        );
        rules.insert(
            RuleKey::Phone,
            ValidationRule::Pattern {
                regex: Regex::new(r"^(\+91[\- ]?)?[6-9][0-9]{9}$").expect("phone pattern is valid"),
                message: "is not a valid phone number",
            },
        );
        rules.insert(RuleKey::Cgpa, ValidationRule::Range { min: 0.0, max: 10.0 });
        rules.insert(RuleKey::Percentage, ValidationRule::Range { min: 0.0, max: 100.0 });
        rules.insert(RuleKey::Year, ValidationRule::Range { min: 1.0, max: 4.0 });
        rules.insert(RuleKey::Semester, ValidationRule::Range { min: 1.0, max: 8.0 });
        rules.insert(RuleKey::Experience, ValidationRule::Range { min: 0.0, max: 50.0 });

        Self { schemas, rules }
    }

    /// Schema for a data type. Total: every `DataType` variant has one.
    pub fn schema(&self, data_type: DataType) -> &EntitySchema {
        &self.schemas[&data_type]
    }

    /// Ordered export column paths.
    pub fn headers_for(&self, data_type: DataType) -> Vec<&'static str> {
        self.schema(data_type).fields.iter().map(|f| f.path).collect()
    }

    /// Field paths that must be non-empty on import.
    pub fn required_fields_for(&self, data_type: DataType) -> Vec<&'static str> {
        self.schema(data_type)
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.path)
            .collect()
    }

    /// Display header for a path, or the raw path when unmapped.
    pub fn display_name_for<'a>(&self, data_type: DataType, path: &'a str) -> &'a str {
        self.schema(data_type)
            .field(path)
            .map(|f| f.display)
            .unwrap_or(path)
    }

    /// Reverse-map an imported header back to a field path.
    ///
    /// Unmapped headers survive as literal keys so custom columns round-trip.
    pub fn path_for_header(&self, data_type: DataType, header: &str) -> String {
        self.schema(data_type)
            .field_by_display(header)
            .map(|f| f.path.to_string())
            .unwrap_or_else(|| header.to_string())
    }

    /// Coercion kind for a path; unmapped columns stay text.
    pub fn kind_for(&self, data_type: DataType, path: &str) -> FieldKind {
        self.schema(data_type)
            .field(path)
            .map(|f| f.kind)
            .unwrap_or(FieldKind::Text)
    }

    /// Rule for a semantic key.
    pub fn rule_for(&self, key: RuleKey) -> Option<&ValidationRule> {
        self.rules.get(&key)
    }

    /// Match a field path to its semantic rule via the suffix table.
    pub fn rule_key_for_path(path: &str) -> Option<RuleKey> {
        let last = path.rsplit('.').next().unwrap_or(path);
        RULE_SUFFIXES
            .iter()
            .find(|(suffix, _)| *suffix == last)
            .map(|(_, key)| *key)
    }

    /// Fully populated sample record used in generated templates.
    pub fn sample_record(&self, data_type: DataType) -> Value {
        match data_type {
            DataType::Students => json!({
                "name": "Aarav Sharma",
                "email": "aarav.sharma@srmap.edu.in",
                "phone": "9876543210",
                "rollNumber": "AP21110010001",
                "department": "Computer Science Engineering",
                "year": 3,
                "semester": 6,
                "cgpa": 8.4,
                "academicHistory": {
                    "tenth": { "percentage": 92.5 },
                    "twelfth": { "percentage": 88.2 }
                },
                "address": { "city": "Guntur", "state": "Andhra Pradesh" },
                "skills": {
                    "technical": ["Python", "Java", "SQL"],
                    "soft": ["Communication", "Teamwork"]
                },
                "family": { "annualIncome": 450000 },
                "isRegistered": true
            }),
            DataType::Faculty => json!({
                "name": "Dr. Kavitha Rao",
                "email": "kavitha.rao@srmap.edu.in",
                "phone": "9123456780",
                "employeeId": "FAC-2041",
                "department": "Computer Science Engineering",
                "designation": "Associate Professor",
                "experience": 12,
                "specialization": "Machine Learning",
                "isActive": true
            }),
            DataType::Operations => json!({
                "name": "Ravi Teja",
                "email": "ravi.teja@srmap.edu.in",
                "phone": "9988776655",
                "employeeId": "OPS-114",
                "responsibilities": ["Drive scheduling", "Hall allocation"],
                "systemAccess": ["dashboard", "reports"],
                "shift": "Morning",
                "isActive": true
            }),
            DataType::Outreach => json!({
                "name": "Sneha Reddy",
                "email": "sneha.reddy@srmap.edu.in",
                "phone": "9876501234",
                "employeeId": "OUT-207",
                "region": "Hyderabad",
                "targetSector": "IT Services",
                "responsibilities": ["Company onboarding", "MoU follow-up"],
                "isActive": true
            }),
            DataType::Admin => json!({
                "name": "Manoj Kumar",
                "email": "manoj.kumar@srmap.edu.in",
                "phone": "9012345678",
                "employeeId": "ADM-003",
                "role": "Placement Officer",
                "systemAccess": ["users", "companies", "policies"],
                "isActive": true
            }),
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide registry built from the built-in tables.
static DEFAULT_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

/// The shared default registry.
pub fn default_registry() -> &'static SchemaRegistry {
    &DEFAULT_REGISTRY
}
