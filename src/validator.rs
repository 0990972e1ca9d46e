use std::fmt::{Display, Formatter};

use serde_json::Value;

use crate::binding::spec::BindingSpec;

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The field the violation names, or `(root)` for document-level
    /// constraints such as missing required properties.
    pub field: String,
    pub message: String,
}

/// Composite validation failure. Preserves every individual violation; the
/// `Display` form enumerates all of them.
#[derive(Debug)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed: ")?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", v.field, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Struct validator seam. Absent by default: with no validator configured
/// the validation stage of materialization is skipped entirely, which is a
/// deliberate configuration choice, not an error.
///
/// The instance is the populated request document in JSON form; a
/// validator must report every violated constraint in one call.
pub trait StructValidator: Send + Sync {
    fn validate(&self, instance: &Value, spec: &BindingSpec) -> Result<(), ValidationErrors>;
}

/// JSON Schema validator. The schema is compiled once at configuration
/// time and shared read-only across requests; format assertions
/// (`"format": "email"` and friends) are enabled.
pub struct SchemaValidator {
    compiled: jsonschema::Validator,
}

impl SchemaValidator {
    pub fn new(schema: &Value) -> anyhow::Result<Self> {
        let compiled = jsonschema::options()
            .should_validate_formats(true)
            .build(schema)
            .map_err(|e| anyhow::anyhow!("invalid schema: {e}"))?;
        Ok(Self { compiled })
    }
}

impl StructValidator for SchemaValidator {
    fn validate(&self, instance: &Value, _spec: &BindingSpec) -> Result<(), ValidationErrors> {
        let violations: Vec<Violation> = self
            .compiled
            .iter_errors(instance)
            .map(|err| {
                let path = err.instance_path.to_string();
                let field = path.trim_start_matches('/');
                Violation {
                    field: if field.is_empty() {
                        "(root)".to_string()
                    } else {
                        field.to_string()
                    },
                    message: err.to_string(),
                }
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(violations))
        }
    }
}
