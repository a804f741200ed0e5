//! Declarative schema descriptors.
//!
//! A [`Schema`] is a tree of typed descriptors. Every leaf is either a
//! concrete type check or a closed enum; only [`Schema::any`] and
//! [`Schema::function`] accept opaque values.
//!
//! ```
//! use kiln_config::schema::Schema;
//!
//! let schema = Schema::object([
//!     ("polyfill", Schema::enumeration(["entry", "ua", "off"]).optional()),
//!     ("minify", Schema::boolean().default(true)),
//! ]);
//! ```

mod builtin;

pub use builtin::builder_schema;

use crate::value::{ConfigValue, FnKind};

/// What to do with object keys the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Drop them silently
    #[default]
    Strip,
    /// Report them as a validation issue
    Reject,
    /// Keep them untouched
    Passthrough,
}

#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub fields: Vec<(String, Schema)>,
    pub unknown_keys: UnknownKeys,
}

#[derive(Debug, Clone)]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Literal(ConfigValue),
    Enum(Vec<String>),
    Object(ObjectSchema),
    /// Arbitrary keys, every value checked against one schema
    Record(Box<Schema>),
    Array(Box<Schema>),
    /// A user callable; `None` accepts either kind
    Function(Option<FnKind>),
    Union(Vec<Schema>),
    Any,
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub kind: SchemaKind,
    pub optional: bool,
    pub default: Option<ConfigValue>,
}

impl Schema {
    fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            optional: false,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number)
    }

    pub fn integer() -> Self {
        Self::new(SchemaKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn literal(value: impl Into<ConfigValue>) -> Self {
        Self::new(SchemaKind::Literal(value.into()))
    }

    pub fn enumeration<I, S>(literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Enum(literals.into_iter().map(Into::into).collect()))
    }

    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self::new(SchemaKind::Object(ObjectSchema {
            fields: fields
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
            unknown_keys: UnknownKeys::Strip,
        }))
    }

    pub fn record(values: Schema) -> Self {
        Self::new(SchemaKind::Record(Box::new(values)))
    }

    pub fn array(items: Schema) -> Self {
        Self::new(SchemaKind::Array(Box::new(items)))
    }

    pub fn function(kind: FnKind) -> Self {
        Self::new(SchemaKind::Function(Some(kind)))
    }

    pub fn any_function() -> Self {
        Self::new(SchemaKind::Function(None))
    }

    pub fn union(alternatives: impl IntoIterator<Item = Schema>) -> Self {
        Self::new(SchemaKind::Union(alternatives.into_iter().collect()))
    }

    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Value inserted when the field is absent. Implies optional.
    pub fn default(mut self, value: impl Into<ConfigValue>) -> Self {
        self.optional = true;
        self.default = Some(value.into());
        self
    }

    /// Reject undeclared keys on this object.
    pub fn strict(self) -> Self {
        self.with_unknown_keys(UnknownKeys::Reject)
    }

    /// Keep undeclared keys on this object.
    pub fn passthrough(self) -> Self {
        self.with_unknown_keys(UnknownKeys::Passthrough)
    }

    fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        if let SchemaKind::Object(object) = &mut self.kind {
            object.unknown_keys = policy;
        }
        self
    }

    /// Expected-shape description used in diagnostics.
    pub fn describe(&self) -> String {
        match &self.kind {
            SchemaKind::String => "string".to_string(),
            SchemaKind::Number => "number".to_string(),
            SchemaKind::Integer => "integer".to_string(),
            SchemaKind::Boolean => "boolean".to_string(),
            SchemaKind::Literal(value) => describe_literal(value),
            SchemaKind::Enum(literals) => literals
                .iter()
                .map(|literal| format!("'{literal}'"))
                .collect::<Vec<_>>()
                .join(" | "),
            SchemaKind::Object(_) | SchemaKind::Record(_) => "object".to_string(),
            SchemaKind::Array(_) => "array".to_string(),
            SchemaKind::Function(Some(kind)) => format!("function({})", kind.as_str()),
            SchemaKind::Function(None) => "function".to_string(),
            SchemaKind::Union(alternatives) => alternatives
                .iter()
                .map(Schema::describe)
                .collect::<Vec<_>>()
                .join(" | "),
            SchemaKind::Any => "any".to_string(),
        }
    }

    /// Field descriptor for `name` if this is an object schema.
    pub fn field(&self, name: &str) -> Option<&Schema> {
        match &self.kind {
            SchemaKind::Object(object) => object
                .fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, schema)| schema),
            _ => None,
        }
    }

    /// Descriptor at a dotted path through nested objects.
    pub fn at(&self, path: &str) -> Option<&Schema> {
        path.split('.')
            .try_fold(self, |schema, segment| schema.field(segment))
    }
}

pub(crate) fn describe_literal(value: &ConfigValue) -> String {
    match value {
        ConfigValue::String(s) => format!("'{s}'"),
        ConfigValue::Bool(b) => b.to_string(),
        ConfigValue::Number(n) => n.to_string(),
        ConfigValue::Null => "null".to_string(),
        other => other.shape().to_string(),
    }
}
