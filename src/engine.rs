// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::interpreter::{Context, DEFAULT_MAX_DEPTH};
use crate::model::{Model, Validator};
use crate::registry::{Operator, Registry};
use crate::value::{Map, Value};

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use log::info;

/// Evaluation settings shared by every call made through an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Bound on expression nesting. `None` disables the check.
    pub max_depth: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

/// Holds an operator registry and a set of named models.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    models: IndexMap<String, Model>,
    config: Config,
}

/// Create a default engine.
impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An engine with the built-in operators.
    pub fn new() -> Self {
        Self::with_registry(Registry::builtin().clone())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
            models: IndexMap::new(),
            config: Config::default(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Adds an operator. Models added earlier keep the operators they were
    /// built with.
    pub fn register_operator(&mut self, name: &str, operator: Arc<dyn Operator>) -> Result<()> {
        Arc::make_mut(&mut self.registry).register(name, operator)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_max_depth(&mut self, max_depth: Option<usize>) {
        self.config.max_depth = max_depth;
    }

    pub fn add_model(&mut self, model: Model) -> Result<()> {
        if self.models.contains_key(model.name()) {
            return Err(Error::DuplicateModel {
                name: model.name().to_string(),
            });
        }
        info!(
            "added model `{}` with {} fields",
            model.name(),
            model.fields().len()
        );
        self.models.insert(model.name().to_string(), model);
        Ok(())
    }

    pub fn add_model_from_json_str(&mut self, json: &str) -> Result<()> {
        let model = Model::from_json_str(json, &self.registry)?;
        self.add_model(model)
    }

    #[cfg(feature = "yaml")]
    pub fn add_model_from_yaml_str(&mut self, yaml: &str) -> Result<()> {
        let model = Model::from_yaml_str(yaml, &self.registry)?;
        self.add_model(model)
    }

    /// Loads a model file. `.yaml` and `.yml` files are read as YAML, anything
    /// else as JSON.
    pub fn add_model_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            #[cfg(feature = "yaml")]
            Some("yaml" | "yml") => self.add_model_from_yaml_str(&contents),
            _ => self.add_model_from_json_str(&contents),
        }
    }

    pub fn get_model(&self, name: &str) -> Result<&Model> {
        self.models.get(name).ok_or_else(|| Error::UnknownModel {
            name: name.to_string(),
        })
    }

    /// Model names in the order they were added.
    pub fn model_names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    /// Evaluates a built expression against `document`.
    pub fn eval(&self, expr: &Expr, document: &Value) -> Result<Value> {
        Context::new(document.clone())
            .with_max_depth(self.config.max_depth)
            .eval(expr)
    }

    /// Builds `rule` from its structured encoding and evaluates it.
    pub fn eval_expr(&self, rule: &Value, document: &Value) -> Result<Value> {
        let expr = self.registry.expr_from_json(rule)?;
        self.eval(&expr, document)
    }

    pub fn transform(&self, model: &str, document: &Value) -> Result<Value> {
        self.get_model(model)?
            .transform_with_config(document, &self.config)
    }

    pub fn populate(&self, model: &str, document: &Value, validator: &dyn Validator) -> Result<Value> {
        self.get_model(model)?
            .populate_with_config(document, validator, &self.config)
    }

    /// Runs every model against `document`. The result maps each model name
    /// to its transformed document.
    pub fn transform_all(&self, document: &Value) -> Result<Value> {
        let mut outputs = Map::new();
        for (name, model) in &self.models {
            let output = model.transform_with_config(document, &self.config)?;
            outputs.insert(name.as_str().into(), output);
        }
        Ok(Value::from(outputs))
    }
}
