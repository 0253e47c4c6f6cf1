// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::engine::Config;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::interpreter::Context;
use crate::registry::Registry;
use crate::value::Value;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Declared type of a model field. Checked by [`Model::populate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Any,
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    /// Absent and null values satisfy every type.
    pub fn check(&self, v: &Value) -> bool {
        match (self, v) {
            (_, Value::Undefined | Value::Null) => true,
            (FieldType::Any, _) => true,
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Number, Value::Number(_)) => true,
            (FieldType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (FieldType::Boolean, Value::Bool(_)) => true,
            (FieldType::Array, Value::Array(_)) => true,
            (FieldType::Object, Value::Object(_)) => true,
            _ => false,
        }
    }
}

/// Results that do not replace the raw input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Defer {
    /// Only a missing result.
    #[default]
    Undefined,
    /// Missing or null.
    Null,
    /// Missing, null, `""`, `[]` or `{}`.
    Empty,
}

impl Defer {
    pub fn defers(&self, v: &Value) -> bool {
        match self {
            Defer::Undefined => v.is_undefined(),
            Defer::Null => v.is_undefined() || v.is_null(),
            Defer::Empty => v.is_undefined() || v.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformResult {
    /// Keep whatever the input holds for the field.
    NoOverride,
    Override(Value),
}

/// Associates a field of a model with the expression computing it.
#[derive(Debug, Clone)]
pub struct FieldBinding {
    field: String,
    path: Vec<String>,
    expr: Expr,
    output_type: FieldType,
    fallback: Option<Expr>,
    defer: Defer,
}

impl FieldBinding {
    /// `field` is a dotted path into the document (`address.city`).
    pub fn new(field: &str, expr: Expr) -> FieldBinding {
        FieldBinding {
            field: field.to_string(),
            path: field.split('.').map(str::to_string).collect(),
            expr,
            output_type: FieldType::Any,
            fallback: None,
            defer: Defer::Undefined,
        }
    }

    pub fn with_type(mut self, output_type: FieldType) -> FieldBinding {
        self.output_type = output_type;
        self
    }

    /// Expression evaluated when the primary expression fails.
    pub fn with_fallback(mut self, fallback: Expr) -> FieldBinding {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_defer(mut self, defer: Defer) -> FieldBinding {
        self.defer = defer;
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn output_type(&self) -> FieldType {
        self.output_type
    }

    pub fn defer(&self) -> Defer {
        self.defer
    }

    /// Evaluates the binding against `document`.
    pub fn evaluate(&self, document: &Value, config: &Config) -> Result<TransformResult> {
        let eval = |expr: &Expr| {
            Context::new(document.clone())
                .with_max_depth(config.max_depth)
                .eval(expr)
        };

        let value = match (eval(&self.expr), &self.fallback) {
            (Ok(v), _) => v,
            (Err(e), Some(fallback)) => {
                warn!("field `{}` failed ({e}); using fallback", self.field);
                eval(fallback)?
            }
            (Err(e), None) => return Err(e),
        };

        Ok(match self.defer.defers(&value) {
            true => TransformResult::NoOverride,
            false => TransformResult::Override(value),
        })
    }
}

/// Checks a populated document. Implemented for closures.
pub trait Validator {
    fn validate(&self, model: &Model, document: &Value) -> core::result::Result<(), String>;
}

impl<F> Validator for F
where
    F: Fn(&Model, &Value) -> core::result::Result<(), String>,
{
    fn validate(&self, model: &Model, document: &Value) -> core::result::Result<(), String> {
        self(model, document)
    }
}

/// A named set of field bindings applied to input documents.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    fields: Vec<FieldBinding>,
}

impl Model {
    pub fn new(name: &str) -> Model {
        Model {
            name: name.to_string(),
            fields: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldBinding] {
        &self.fields
    }

    pub fn with_field(mut self, binding: FieldBinding) -> Result<Model> {
        self.add_field(binding)?;
        Ok(self)
    }

    pub fn add_field(&mut self, binding: FieldBinding) -> Result<()> {
        if self.fields.iter().any(|f| f.field == binding.field) {
            return Err(Error::DuplicateField {
                model: self.name.clone(),
                field: binding.field,
            });
        }
        self.fields.push(binding);
        Ok(())
    }

    /// Applies every binding in declaration order and returns the resulting
    /// document. Expressions always see the raw `document`, never earlier
    /// overrides; `document` itself is left untouched.
    pub fn transform(&self, document: &Value) -> Result<Value> {
        self.transform_with_config(document, &Config::default())
    }

    pub fn transform_with_config(&self, document: &Value, config: &Config) -> Result<Value> {
        let mut output = document.clone();
        for binding in &self.fields {
            let result = binding
                .evaluate(document, config)
                .map_err(|e| Error::Field {
                    model: self.name.clone(),
                    field: binding.field.clone(),
                    source: Box::new(e),
                })?;

            match result {
                TransformResult::NoOverride => {
                    debug!("{}.{}: keeping input value", self.name, binding.field);
                }
                TransformResult::Override(v) => {
                    debug!("{}.{}: override with {v}", self.name, binding.field);
                    let path: Vec<&str> = binding.path.iter().map(String::as_str).collect();
                    *output.make_or_get_value_mut(&path) = v;
                }
            }
        }
        Ok(output)
    }

    /// Transforms `document`, checks the declared field types and hands the
    /// result to `validator`.
    pub fn populate(&self, document: &Value, validator: &dyn Validator) -> Result<Value> {
        self.populate_with_config(document, validator, &Config::default())
    }

    pub fn populate_with_config(
        &self,
        document: &Value,
        validator: &dyn Validator,
        config: &Config,
    ) -> Result<Value> {
        let output = self.transform_with_config(document, config)?;

        for binding in &self.fields {
            let mut v = &output;
            for key in &binding.path {
                v = &v[key];
            }
            if !binding.output_type.check(v) {
                return Err(Error::Validation {
                    model: self.name.clone(),
                    message: format!(
                        "field `{}` expects {:?}. Got {} `{v}`",
                        binding.field,
                        binding.output_type,
                        v.type_name()
                    ),
                });
            }
        }

        validator
            .validate(self, &output)
            .map_err(|message| Error::Validation {
                model: self.name.clone(),
                message,
            })?;
        Ok(output)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelSpec {
    name: String,
    #[serde(default)]
    fields: Vec<FieldSpec>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldSpec {
    field: String,
    #[serde(rename = "type", default)]
    output_type: FieldType,
    transform: Value,
    #[serde(default)]
    fallback: Option<Value>,
    #[serde(default)]
    defer: Defer,
}

impl Model {
    /// Builds a model from its file encoding, resolving operators in
    /// `registry`:
    ///
    /// ```json
    /// {"name": "identity", "fields": [
    ///     {"field": "name", "type": "string", "transform": {"CAPITALIZE": [{"JSONPATH": ["$.name"]}]}}
    /// ]}
    /// ```
    pub fn from_value(model: &Value, registry: &Registry) -> Result<Model> {
        let spec: ModelSpec = serde_json::from_value(serde_json::to_value(model)?)?;
        Self::from_spec(spec, registry)
    }

    pub fn from_json_str(json: &str, registry: &Registry) -> Result<Model> {
        Self::from_spec(serde_json::from_str(json)?, registry)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str, registry: &Registry) -> Result<Model> {
        Self::from_spec(serde_yaml::from_str(yaml)?, registry)
    }

    fn from_spec(spec: ModelSpec, registry: &Registry) -> Result<Model> {
        let mut model = Model::new(&spec.name);
        for f in spec.fields {
            let mut binding = FieldBinding::new(&f.field, registry.expr_from_json(&f.transform)?)
                .with_type(f.output_type)
                .with_defer(f.defer);
            if let Some(fallback) = &f.fallback {
                binding = binding.with_fallback(registry.expr_from_json(fallback)?);
            }
            model.add_field(binding)?;
        }
        Ok(model)
    }
}
