//! Response contract validation.
//!
//! Each booking endpoint has one fixed JSON Schema document, bundled with
//! the crate. Validation is format-aware (`date`, `date-time`, `email`) on
//! top of the structural keywords.

use crate::result::{ProbeError, ProbeResult, SchemaViolation};
use jsonschema::Validator;
use serde_json::Value;

const CREATE_SCHEMA: &str = include_str!("../schemas/post_api_response_schema.json");
const READ_SCHEMA: &str = include_str!("../schemas/get_api_response_schema.json");
const SEARCH_SCHEMA: &str = include_str!("../schemas/search_api_response_schema.json");
const UPDATE_SCHEMA: &str = include_str!("../schemas/put_api_response_schema.json");

/// Which endpoint response a schema describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// `POST /booking`: `{bookingid, booking}`
    Create,
    /// `GET /booking/{id}`: the bare booking
    Read,
    /// `GET /booking?firstname&lastname`: `[{bookingid}]`
    Search,
    /// `PUT /booking/{id}`: the bare booking, no `bookingid`
    Update,
}

impl SchemaKind {
    /// Every bundled schema
    pub const ALL: [Self; 4] = [Self::Create, Self::Read, Self::Search, Self::Update];

    /// Short name used in logs and errors
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Search => "search",
            Self::Update => "update",
        }
    }

    /// Raw schema document
    #[must_use]
    pub const fn document(self) -> &'static str {
        match self {
            Self::Create => CREATE_SCHEMA,
            Self::Read => READ_SCHEMA,
            Self::Search => SEARCH_SCHEMA,
            Self::Update => UPDATE_SCHEMA,
        }
    }
}

/// Outcome of validating one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    /// Whether the instance conforms
    pub valid: bool,
    /// Violations, empty when valid
    pub errors: Vec<SchemaViolation>,
}

/// A compiled schema document
pub struct SchemaValidator {
    name: String,
    validator: Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile an arbitrary schema document with format checks enabled.
    pub fn compile(name: impl Into<String>, schema: &Value) -> ProbeResult<Self> {
        let name = name.into();
        let validator = jsonschema::options()
            .should_validate_formats(true)
            .build(schema)
            .map_err(|e| ProbeError::SchemaCompile {
                schema: name.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { name, validator })
    }

    /// Compile one of the bundled endpoint schemas.
    pub fn for_kind(kind: SchemaKind) -> ProbeResult<Self> {
        let schema: Value = serde_json::from_str(kind.document())?;
        Self::compile(kind.name(), &schema)
    }

    /// Schema name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate and collect every violation.
    #[must_use]
    pub fn validate(&self, instance: &Value) -> SchemaReport {
        let errors: Vec<SchemaViolation> = self
            .validator
            .iter_errors(instance)
            .map(|error| SchemaViolation {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect();
        SchemaReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Validate and fail hard on any violation.
    ///
    /// The full violation list is logged before the error is returned.
    pub fn ensure_valid(&self, instance: &Value) -> ProbeResult<()> {
        let report = self.validate(instance);
        if report.valid {
            return Ok(());
        }
        for violation in &report.errors {
            tracing::error!(schema = %self.name, path = %violation.path, "{}", violation.message);
        }
        Err(ProbeError::SchemaMismatch {
            schema: self.name.clone(),
            violations: report.errors,
        })
    }
}

/// The four endpoint validators, compiled once per run and shared read-only.
#[derive(Debug)]
pub struct SchemaSet {
    create: SchemaValidator,
    read: SchemaValidator,
    search: SchemaValidator,
    update: SchemaValidator,
}

impl SchemaSet {
    /// Compile every bundled schema.
    pub fn bundled() -> ProbeResult<Self> {
        Ok(Self {
            create: SchemaValidator::for_kind(SchemaKind::Create)?,
            read: SchemaValidator::for_kind(SchemaKind::Read)?,
            search: SchemaValidator::for_kind(SchemaKind::Search)?,
            update: SchemaValidator::for_kind(SchemaKind::Update)?,
        })
    }

    /// Validator for one endpoint
    #[must_use]
    pub const fn get(&self, kind: SchemaKind) -> &SchemaValidator {
        match kind {
            SchemaKind::Create => &self.create,
            SchemaKind::Read => &self.read,
            SchemaKind::Search => &self.search,
            SchemaKind::Update => &self.update,
        }
    }
}
