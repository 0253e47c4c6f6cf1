// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

pub mod builtins;
mod engine;
mod error;
mod expr;
mod interpreter;
mod model;
mod path;
mod registry;
mod rule_json;
mod value;

pub use engine::{Config, Engine};
pub use error::{Error, Result};
pub use expr::{compose, pipe, Expr, ExprKind};
pub use interpreter::{evaluate, Context};
pub use model::{Defer, FieldBinding, FieldType, Model, TransformResult, Validator};
pub use path::{resolve, PathQuery};
pub use registry::{Arity, InputSlot, Operator, Registry, Signature};
pub use value::Value;

#[cfg(test)]
mod tests;
