// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Error, Result};
use crate::expr::{Expr, ExprKind};
use crate::registry::Signature;
use crate::value::Value;

/// Default bound on expression nesting during one evaluation.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Evaluation state for one call: the stack of data frames (innermost last)
/// and the current nesting depth.
///
/// A context is created per evaluation and never shared.
#[derive(Debug, Clone)]
pub struct Context {
    frames: Vec<Value>,
    depth: usize,
    max_depth: Option<usize>,
}

/// Evaluates `expr` against `document` with the default depth limit.
pub fn evaluate(expr: &Expr, document: &Value) -> Result<Value> {
    Context::new(document.clone()).eval(expr)
}

impl Context {
    pub fn new(document: Value) -> Context {
        Context {
            frames: vec![document],
            depth: 0,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }

    /// `None` disables the depth limit.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Context {
        self.max_depth = max_depth;
        self
    }

    /// The innermost frame.
    pub fn current(&self) -> &Value {
        self.frames.last().unwrap_or(&Value::Undefined)
    }

    pub fn frames(&self) -> &[Value] {
        &self.frames
    }

    /// Runs `f` with `frame` pushed as the innermost frame. The frame is
    /// popped on every exit path.
    pub fn with_frame<T>(
        &mut self,
        frame: Value,
        f: impl FnOnce(&mut Context) -> Result<T>,
    ) -> Result<T> {
        self.frames.push(frame);
        let result = f(self);
        self.frames.pop();
        result
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value> {
        if let Some(limit) = self.max_depth {
            if self.depth >= limit {
                return Err(Error::DepthLimitExceeded { limit });
            }
        }
        self.depth += 1;
        let result = self.eval_impl(expr);
        self.depth -= 1;
        result
    }

    fn eval_impl(&mut self, expr: &Expr) -> Result<Value> {
        match expr.kind() {
            ExprKind::Literal(v) => Ok(v.clone()),
            ExprKind::Path(query) => Ok(query.resolve(self.current())),
            ExprKind::Input => Ok(self.current().clone()),
            ExprKind::Call {
                name,
                operator,
                args,
            } => operator.evaluate(name, self, args),
            ExprKind::Scope { input, body } => {
                let frame = self.eval(input)?;
                self.with_frame(frame, |ctx| ctx.eval(body))
            }
        }
    }

    /// Evaluates `args` left to right against the current frame. An argument
    /// that matched nothing is an error unless `signature` accepts it.
    pub fn eval_args(
        &mut self,
        name: &str,
        signature: &Signature,
        args: &[Expr],
    ) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for (idx, arg) in args.iter().enumerate() {
            let value = self.eval(arg)?;
            if value.is_undefined() && !signature.accepts_undefined {
                return Err(Error::evaluation(
                    name,
                    format!("argument {} `{arg}` matched nothing", idx + 1),
                ));
            }
            values.push(value);
        }
        Ok(values)
    }
}
