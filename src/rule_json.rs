// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured (JSONLogic-style) encoding of expressions.
//!
//! An object with a single key names an operator and holds its arguments:
//! `{"SUBSTR": [0, 10, {"JSONPATH": ["$.pan"]}]}`. A few reserved keys encode
//! the other node kinds:
//!
//! | Encoding                   | Node                          |
//! |----------------------------|-------------------------------|
//! | `{"JSONPATH": ["$.a"]}`    | path reference                |
//! | `{"INPUT": []}`            | implicit input slot           |
//! | `{"PIPE": [e1, e2, ...]}`  | `e1` composed with `e2`, ...  |
//! | `{"LITERAL": [v]}`         | `v` taken verbatim            |
//! | `{"SCOPE": [input, body]}` | scope node                    |
//!
//! Inside `PIPE`, operator objects after the first stage are built as chain
//! stages: the piped value fills the operator's input slot unless the stage
//! already names `{"INPUT": []}` explicitly. Any other JSON value is a literal.

use crate::error::{Error, Result};
use crate::expr::{pipe, Expr, ExprKind};
use crate::registry::Registry;
use crate::value::{Map, Value};

const JSONPATH: &str = "JSONPATH";
const INPUT: &str = "INPUT";
const PIPE: &str = "PIPE";
const LITERAL: &str = "LITERAL";
const SCOPE: &str = "SCOPE";

fn is_reserved(key: &str) -> bool {
    matches!(key, JSONPATH | INPUT | PIPE | LITERAL | SCOPE)
}

// `{"OP": [a, b]}` and the shorthand `{"OP": a}` both carry arguments.
fn arguments(v: &Value) -> Vec<Value> {
    match v {
        Value::Array(items) => items.to_vec(),
        _ => vec![v.clone()],
    }
}

impl Registry {
    /// Builds an expression from its structured encoding. Operators are
    /// resolved and arities checked here.
    pub fn expr_from_json(&self, rule: &Value) -> Result<Expr> {
        self.build(rule, false)
    }

    /// Builds an expression from encoded JSON text.
    pub fn expr_from_json_str(&self, rule: &str) -> Result<Expr> {
        let rule: Value = serde_json::from_str(rule)?;
        self.expr_from_json(&rule)
    }

    fn build(&self, rule: &Value, as_stage: bool) -> Result<Expr> {
        let Value::Object(fields) = rule else {
            return Ok(Expr::literal(rule.clone()));
        };
        if fields.len() != 1 {
            return Ok(Expr::literal(rule.clone()));
        }
        let Some((key, v)) = fields.iter().next() else {
            return Ok(Expr::literal(rule.clone()));
        };
        let args = arguments(v);

        match key.as_ref() {
            JSONPATH => match args.as_slice() {
                [Value::String(query)] => Expr::path(query),
                _ => Err(Error::composition(format!(
                    "`{JSONPATH}` expects a single query string. Got `{v}`"
                ))),
            },
            INPUT => match args.is_empty() {
                true => Ok(Expr::input()),
                false => Err(Error::composition(format!(
                    "`{INPUT}` takes no arguments. Got `{v}`"
                ))),
            },
            LITERAL => match args.as_slice() {
                [] => Ok(Expr::literal(Value::Undefined)),
                [value] => Ok(Expr::literal(value.clone())),
                _ => Err(Error::composition(format!(
                    "`{LITERAL}` expects at most one value. Got `{v}`"
                ))),
            },
            SCOPE => match args.as_slice() {
                [input, body] => Ok(Expr::scope(
                    self.build(input, false)?,
                    self.build(body, false)?,
                )),
                _ => Err(Error::composition(format!(
                    "`{SCOPE}` expects an input and a body. Got `{v}`"
                ))),
            },
            PIPE => {
                let stages = args
                    .iter()
                    .enumerate()
                    .map(|(idx, stage)| self.build(stage, idx > 0))
                    .collect::<Result<Vec<_>>>()?;
                pipe(stages)
            }
            name => {
                let args = args
                    .iter()
                    .map(|a| self.build(a, false))
                    .collect::<Result<Vec<_>>>()?;
                let explicit_input = args.iter().any(|a| matches!(a.kind(), ExprKind::Input));
                match as_stage && !explicit_input {
                    true => self.stage(name, args),
                    false => self.construct(name, args),
                }
            }
        }
    }
}

fn tagged(key: &str, args: Vec<Value>) -> Value {
    let mut m = Map::new();
    m.insert(key.into(), Value::from(args));
    Value::from(m)
}

impl Expr {
    /// Structured encoding of the tree. [`Registry::expr_from_json`] builds an
    /// equal tree back from it.
    pub fn to_json(&self) -> Value {
        match self.kind() {
            ExprKind::Literal(Value::Undefined) => tagged(LITERAL, vec![]),
            ExprKind::Literal(v @ Value::Object(fields)) if fields.len() == 1 => {
                tagged(LITERAL, vec![v.clone()])
            }
            ExprKind::Literal(v) => v.clone(),
            ExprKind::Path(query) => tagged(JSONPATH, vec![Value::from(query.as_str())]),
            ExprKind::Input => tagged(INPUT, vec![]),
            ExprKind::Call { name, args, .. } => {
                tagged(name, args.iter().map(Expr::to_json).collect())
            }
            ExprKind::Scope { input, body } => tagged(SCOPE, vec![input.to_json(), body.to_json()]),
        }
    }
}

/// Whether `name` can be bound in a registry without being shadowed by the
/// structured encoding.
pub fn is_encodable_name(name: &str) -> bool {
    !is_reserved(name)
}
