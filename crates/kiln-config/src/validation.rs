//! Descriptor-tree validation.
//!
//! Validation normalizes rather than rejects: undeclared keys are dropped,
//! declared defaults are filled in, and every independent violation is
//! collected before failing. Issues are reported depth-first in schema
//! declaration order.

use std::fmt;

use tracing::{debug, trace};

use crate::schema::{ObjectSchema, Schema, SchemaKind, UnknownKeys, builder_schema, describe_literal};
use crate::value::{ConfigMap, ConfigValue};

/// What went wrong at one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    InvalidType { expected: String, received: String },
    InvalidEnum { options: Vec<String>, received: String },
    InvalidLiteral { expected: String },
    InvalidUnion { expected: String, received: String },
    UnrecognizedKeys(Vec<String>),
    Required,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: Vec<String>,
    pub kind: IssueKind,
}

impl ValidationIssue {
    /// Dotted path, array indices as numeric segments.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    pub fn message(&self) -> String {
        let detail = match &self.kind {
            IssueKind::InvalidType { expected, received } => {
                format!("Expected {expected}, received {received}")
            }
            IssueKind::InvalidEnum { options, received } => format!(
                "Invalid enum value. Expected {}, received '{received}'",
                options
                    .iter()
                    .map(|option| format!("'{option}'"))
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
            IssueKind::InvalidLiteral { expected } => {
                format!("Invalid literal value, expected {expected}")
            }
            IssueKind::InvalidUnion { expected, received } => {
                format!("Expected {expected}, received {received}")
            }
            IssueKind::UnrecognizedKeys(keys) => format!(
                "Unrecognized key(s) in object: {}",
                keys.iter()
                    .map(|key| format!("'{key}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            IssueKind::Required => "Required".to_string(),
        };

        if self.path.is_empty() {
            detail
        } else {
            format!("{detail} at \"{}\"", self.path_string())
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Every issue found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config validation error:")?;
        for issue in &self.issues {
            write!(f, "\n* {}", issue.message())?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Configuration that passed validation. Only [`Validator`] constructs it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig(ConfigValue);

impl ValidatedConfig {
    pub fn as_value(&self) -> &ConfigValue {
        &self.0
    }

    pub fn into_inner(self) -> ConfigValue {
        self.0
    }
}

/// Validates values against a [`Schema`].
///
/// # Example
///
/// ```
/// use kiln_config::{ConfigValue, Validator, builder_schema};
/// use serde_json::json;
///
/// let raw = ConfigValue::from(json!({ "output": { "polyfill": "usage" } }));
/// let err = Validator::new(builder_schema()).validate(&raw).unwrap_err();
/// assert_eq!(err.issues()[0].path_string(), "output.polyfill");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Validator<'s> {
    schema: &'s Schema,
    strict: bool,
}

impl<'s> Validator<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            strict: false,
        }
    }

    /// Report undeclared keys instead of dropping them.
    ///
    /// Objects declared as passthrough keep their extra keys.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn validate(&self, raw: &ConfigValue) -> Result<ValidatedConfig, ValidationErrors> {
        let mut issues = Vec::new();
        let mut path = Vec::new();
        let normalized = self.check(self.schema, raw, &mut path, &mut issues);

        match normalized {
            Some(value) if issues.is_empty() => Ok(ValidatedConfig(value)),
            _ => {
                debug!(count = issues.len(), "config validation failed");
                Err(ValidationErrors { issues })
            }
        }
    }

    fn check(
        &self,
        schema: &Schema,
        value: &ConfigValue,
        path: &mut Vec<String>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<ConfigValue> {
        let mismatch = |issues: &mut Vec<ValidationIssue>, path: &[String]| -> Option<ConfigValue> {
            issues.push(ValidationIssue {
                path: path.to_vec(),
                kind: IssueKind::InvalidType {
                    expected: schema.describe(),
                    received: received_shape(value),
                },
            });
            None
        };

        match (&schema.kind, value) {
            (SchemaKind::Any, _) => Some(value.clone()),
            (SchemaKind::String, ConfigValue::String(_))
            | (SchemaKind::Number, ConfigValue::Number(_))
            | (SchemaKind::Boolean, ConfigValue::Bool(_)) => Some(value.clone()),
            (SchemaKind::Integer, ConfigValue::Number(n)) => {
                if n.is_i64() || n.is_u64() {
                    Some(value.clone())
                } else {
                    issues.push(ValidationIssue {
                        path: path.clone(),
                        kind: IssueKind::InvalidType {
                            expected: "integer".to_string(),
                            received: "float".to_string(),
                        },
                    });
                    None
                }
            }
            (SchemaKind::Literal(expected), _) => {
                if expected == value {
                    Some(value.clone())
                } else {
                    issues.push(ValidationIssue {
                        path: path.clone(),
                        kind: IssueKind::InvalidLiteral {
                            expected: describe_literal(expected),
                        },
                    });
                    None
                }
            }
            (SchemaKind::Enum(options), ConfigValue::String(s)) => {
                if options.iter().any(|option| option == s) {
                    Some(value.clone())
                } else {
                    issues.push(ValidationIssue {
                        path: path.clone(),
                        kind: IssueKind::InvalidEnum {
                            options: options.clone(),
                            received: s.clone(),
                        },
                    });
                    None
                }
            }
            (SchemaKind::Function(expected), ConfigValue::Function(f)) => {
                match expected {
                    Some(kind) if *kind != f.kind() => mismatch(issues, path),
                    _ => Some(value.clone()),
                }
            }
            (SchemaKind::Object(object), ConfigValue::Object(map)) => {
                self.check_object(object, map, path, issues)
            }
            (SchemaKind::Record(values), ConfigValue::Object(map)) => {
                let mut out = ConfigMap::with_capacity(map.len());
                let mut ok = true;
                for (key, item) in map {
                    path.push(key.clone());
                    match self.check(values, item, path, issues) {
                        Some(item) => {
                            out.insert(key.clone(), item);
                        }
                        None => ok = false,
                    }
                    path.pop();
                }
                ok.then_some(ConfigValue::Object(out))
            }
            (SchemaKind::Array(items), ConfigValue::Array(list)) => {
                let mut out = Vec::with_capacity(list.len());
                let mut ok = true;
                for (index, item) in list.iter().enumerate() {
                    path.push(index.to_string());
                    match self.check(items, item, path, issues) {
                        Some(item) => out.push(item),
                        None => ok = false,
                    }
                    path.pop();
                }
                ok.then_some(ConfigValue::Array(out))
            }
            (SchemaKind::Union(alternatives), _) => {
                self.check_union(schema, alternatives, value, path, issues)
            }
            _ => mismatch(issues, path),
        }
    }

    fn check_object(
        &self,
        object: &ObjectSchema,
        map: &ConfigMap,
        path: &mut Vec<String>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<ConfigValue> {
        let policy = match object.unknown_keys {
            UnknownKeys::Strip if self.strict => UnknownKeys::Reject,
            policy => policy,
        };
        let declared = |key: &str| object.fields.iter().any(|(name, _)| name == key);

        if policy == UnknownKeys::Reject {
            let unknown: Vec<String> = map.keys().filter(|key| !declared(key)).cloned().collect();
            if !unknown.is_empty() {
                issues.push(ValidationIssue {
                    path: path.clone(),
                    kind: IssueKind::UnrecognizedKeys(unknown),
                });
            }
        }

        let mut checked = ConfigMap::new();
        let mut filled = ConfigMap::new();
        let mut ok = true;
        for (name, field) in &object.fields {
            match map.get(name) {
                Some(item) => {
                    path.push(name.clone());
                    match self.check(field, item, path, issues) {
                        Some(item) => {
                            checked.insert(name.clone(), item);
                        }
                        None => ok = false,
                    }
                    path.pop();
                }
                None => {
                    if let Some(default) = &field.default {
                        filled.insert(name.clone(), default.clone());
                    } else if !field.optional {
                        let mut field_path = path.clone();
                        field_path.push(name.clone());
                        issues.push(ValidationIssue {
                            path: field_path,
                            kind: IssueKind::Required,
                        });
                        ok = false;
                    }
                }
            }
        }

        if !ok {
            return None;
        }

        // user key order first, then filled defaults in declaration order
        let mut out = ConfigMap::with_capacity(map.len() + filled.len());
        for (key, item) in map {
            if let Some(item) = checked.shift_remove(key) {
                out.insert(key.clone(), item);
            } else if !declared(key) {
                if policy == UnknownKeys::Passthrough {
                    out.insert(key.clone(), item.clone());
                } else {
                    trace!(key = %key, "dropping unknown config key");
                }
            }
        }
        out.extend(filled);
        Some(ConfigValue::Object(out))
    }

    fn check_union(
        &self,
        schema: &Schema,
        alternatives: &[Schema],
        value: &ConfigValue,
        path: &mut Vec<String>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<ConfigValue> {
        let mut failures = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let mut attempt = Vec::new();
            if let Some(value) = self.check(alternative, value, path, &mut attempt) {
                if attempt.is_empty() {
                    return Some(value);
                }
            }
            failures.push(attempt);
        }

        // An alternative that only failed below this path matched the outer
        // shape; its issues are more useful than the generic union message.
        let depth = path.len();
        let mut deeper = failures
            .into_iter()
            .filter(|attempt| attempt.iter().any(|issue| issue.path.len() > depth));
        match (deeper.next(), deeper.next()) {
            (Some(attempt), None) => issues.extend(attempt),
            _ => issues.push(ValidationIssue {
                path: path.clone(),
                kind: IssueKind::InvalidUnion {
                    expected: schema.describe(),
                    received: received_shape(value),
                },
            }),
        }
        None
    }
}

fn received_shape(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Function(f) => format!("function({})", f.kind().as_str()),
        other => other.shape().to_string(),
    }
}

/// Validate against the builtin configuration schema.
pub fn validate(raw: &ConfigValue) -> Result<ValidatedConfig, ValidationErrors> {
    Validator::new(builder_schema()).validate(raw)
}

/// Validate against the builtin schema, rejecting unknown keys.
pub fn validate_strict(raw: &ConfigValue) -> Result<ValidatedConfig, ValidationErrors> {
    Validator::new(builder_schema()).strict().validate(raw)
}
