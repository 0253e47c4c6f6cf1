// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::{self, Builtin, BuiltinFcn};
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::interpreter::Context;
use crate::rule_json;
use crate::value::Value;

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;

/// Number of arguments an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(e) => n == e,
            Arity::AtLeast(min) => n >= min,
            Arity::Range(min, max) => (min..=max).contains(&n),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: usize| if n == 1 { "argument" } else { "arguments" };
        match *self {
            Arity::Exact(n) => write!(f, "{n} {}", plural(n)),
            Arity::AtLeast(n) => write!(f, "at least {n} {}", plural(n)),
            Arity::Range(min, max) => write!(f, "{min} to {max} arguments"),
        }
    }
}

/// Position that receives the piped value when an operator is used as a
/// chain stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    First,
    Last,
}

/// Construction and evaluation contract of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub arity: Arity,
    pub input: InputSlot,
    /// Whether [`Value::Undefined`] may be passed as an argument. When false,
    /// an argument that matched nothing is reported as an evaluation error.
    pub accepts_undefined: bool,
    /// Argument that is evaluated by the operator itself against frames it
    /// pushes. Composition never fills input slots inside it.
    pub scoped: Option<usize>,
    /// Whether a call without arguments reads the innermost frame directly.
    pub frame_default: bool,
}

impl Signature {
    pub const fn new(arity: Arity) -> Self {
        Self {
            arity,
            input: InputSlot::First,
            accepts_undefined: false,
            scoped: None,
            frame_default: false,
        }
    }

    pub const fn input(mut self, slot: InputSlot) -> Self {
        self.input = slot;
        self
    }

    pub const fn accepts_undefined(mut self) -> Self {
        self.accepts_undefined = true;
        self
    }

    pub const fn scoped(mut self, arg: usize) -> Self {
        self.scoped = Some(arg);
        self
    }

    pub const fn frame_default(mut self) -> Self {
        self.frame_default = true;
        self
    }
}

/// A named computation that can be placed in an expression tree.
pub trait Operator: Send + Sync {
    fn signature(&self) -> Signature;

    /// Validates the arguments of a call being built. Runs once, when the
    /// tree is constructed.
    fn construct(&self, name: &str, args: &[Expr]) -> Result<()> {
        let arity = self.signature().arity;
        if !arity.accepts(args.len()) {
            return Err(Error::Arity {
                name: name.to_string(),
                expected: arity,
                found: args.len(),
            });
        }
        Ok(())
    }

    /// Evaluates a call. `args` are the unevaluated argument expressions;
    /// most operators evaluate all of them with [`Context::eval_args`].
    fn evaluate(&self, name: &str, ctx: &mut Context, args: &[Expr]) -> Result<Value>;
}

lazy_static! {
    static ref BUILTINS: Registry = Registry::with_builtins();
}

/// Maps operator names to their definitions.
///
/// Registration needs `&mut self`; once a registry is shared for evaluation it
/// can no longer change.
#[derive(Clone, Default)]
pub struct Registry {
    operators: HashMap<Arc<str>, Arc<dyn Operator>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("operators", &self.names())
            .finish()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in operators.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register(&mut registry);
        registry
    }

    /// Process-wide read-only registry of the built-in operators.
    pub fn builtin() -> &'static Registry {
        &BUILTINS
    }

    pub fn register(&mut self, name: &str, operator: Arc<dyn Operator>) -> Result<()> {
        if name.trim().is_empty() || !rule_json::is_encodable_name(name) {
            return Err(Error::InvalidOperatorName {
                name: name.to_string(),
            });
        }

        use std::collections::hash_map::Entry;
        match self.operators.entry(name.into()) {
            Entry::Occupied(e) => Err(Error::DuplicateOperator {
                name: e.key().to_string(),
            }),
            Entry::Vacant(e) => {
                e.insert(operator);
                Ok(())
            }
        }
    }

    pub fn register_fn(&mut self, name: &str, signature: Signature, fcn: BuiltinFcn) -> Result<()> {
        self.register(name, Arc::new(Builtin { signature, fcn }))
    }

    // Builtin names are fixed and distinct.
    pub(crate) fn insert_builtin(&mut self, name: &'static str, signature: Signature, fcn: BuiltinFcn) {
        self.operators
            .insert(name.into(), Arc::new(Builtin { signature, fcn }));
    }

    pub(crate) fn insert_operator(&mut self, name: &'static str, operator: Arc<dyn Operator>) {
        self.operators.insert(name.into(), operator);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Operator>> {
        self.operators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operators.keys().map(|k| k.as_ref()).collect();
        names.sort_unstable();
        names
    }

    /// Builds a call node. Unknown names and argument counts that violate the
    /// operator's signature are rejected here, before any evaluation.
    pub fn construct(&self, name: &str, args: Vec<Expr>) -> Result<Expr> {
        let (key, operator) = match self.operators.get_key_value(name) {
            Some((k, op)) => (k.clone(), op.clone()),
            None => {
                return Err(Error::UnknownOperator {
                    name: name.to_string(),
                })
            }
        };
        operator.construct(name, &args)?;
        Ok(Expr::new_call(key, operator, args))
    }

    /// Nested-call builder. Same as [`Registry::construct`].
    pub fn call(&self, name: &str, args: Vec<Expr>) -> Result<Expr> {
        self.construct(name, args)
    }

    /// Chain-stage builder: the call with an implicit input slot at the
    /// position the operator's signature names. Compose it after another
    /// expression with [`Expr::then`].
    pub fn stage(&self, name: &str, mut args: Vec<Expr>) -> Result<Expr> {
        let Some(operator) = self.operators.get(name) else {
            return Err(Error::UnknownOperator {
                name: name.to_string(),
            });
        };
        match operator.signature().input {
            InputSlot::First => args.insert(0, Expr::input()),
            InputSlot::Last => args.push(Expr::input()),
        }
        self.construct(name, args)
    }
}
