//! Input schemas: JSON Schema generation and validation of raw tool input.

use std::marker::PhantomData;

use jsonschema::Validator;
use proto::{ToolError, ValidationIssue};
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::de::DeserializeOwned;

/// Typed tool parameters.
///
/// The JSON schema is derived from the type; `refine` adds cross-field
/// constraints checked after every per-field constraint has passed.
pub trait ToolParams: DeserializeOwned + JsonSchema + Send + 'static {
    /// Returns whole-object violations. Empty means valid.
    fn refine(&self) -> Vec<ValidationIssue> {
        Vec::new()
    }
}

/// Compiled input schema for one tool's parameter type.
pub struct InputSchema<P> {
    tool: String,
    json: serde_json::Value,
    validator: Validator,
    _params: PhantomData<fn() -> P>,
}

impl<P: ToolParams> InputSchema<P> {
    /// Generates and compiles the schema for `P`.
    pub fn new(tool: &str) -> Result<Self, ToolError> {
        let generator = SchemaSettings::draft07()
            .with(|settings| {
                settings.option_nullable = false;
                settings.option_add_null_type = false;
                settings.inline_subschemas = true;
            })
            .into_generator();
        let root = generator.into_root_schema_for::<P>();

        let mut json = serde_json::to_value(&root).map_err(|e| ToolError::InvalidSchema {
            tool: tool.to_string(),
            reason: e.to_string(),
        })?;
        // Drop the Rust type name schemars puts in `title`.
        if let Some(object) = json.as_object_mut() {
            object.remove("title");
        }

        let validator = jsonschema::validator_for(&json).map_err(|e| ToolError::InvalidSchema {
            tool: tool.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            tool: tool.to_string(),
            json,
            validator,
            _params: PhantomData,
        })
    }

    /// JSON schema as exposed to callers.
    pub fn json(&self) -> &serde_json::Value {
        &self.json
    }

    /// Validates raw input and parses it into `P`.
    ///
    /// Reports every structural violation at once; refinements run only when
    /// the structure is valid.
    pub fn validate(&self, raw: &serde_json::Value) -> Result<P, ToolError> {
        let issues: Vec<ValidationIssue> = self
            .validator
            .iter_errors(raw)
            .map(|error| ValidationIssue::new(error.instance_path.to_string(), error.to_string()))
            .collect();
        if !issues.is_empty() {
            return Err(self.failure(issues));
        }

        let params: P = serde_json::from_value(raw.clone())
            .map_err(|e| ToolError::validation(&self.tool, "", e.to_string()))?;

        let issues = params.refine();
        if !issues.is_empty() {
            return Err(self.failure(issues));
        }
        Ok(params)
    }

    fn failure(&self, issues: Vec<ValidationIssue>) -> ToolError {
        ToolError::Validation {
            tool: self.tool.clone(),
            issues,
        }
    }
}
