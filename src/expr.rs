// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Error, Result};
use crate::path::PathQuery;
use crate::registry::Operator;
use crate::value::Value;

use core::fmt;
use std::sync::Arc;

/// An immutable expression tree. Cloning shares the tree.
///
/// Nodes are only ever built from already constructed children, so a tree
/// can never contain itself.
#[derive(Clone)]
pub struct Expr(Arc<ExprKind>);

pub enum ExprKind {
    Literal(Value),
    Path(PathQuery),
    Call {
        name: Arc<str>,
        operator: Arc<dyn Operator>,
        args: Vec<Expr>,
    },
    /// The value piped into a chain stage. Evaluates to the innermost frame.
    Input,
    /// Evaluates `body` with the result of `input` pushed as the innermost
    /// frame.
    Scope { input: Expr, body: Expr },
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Expr {
        Expr(Arc::new(ExprKind::Literal(value.into())))
    }

    /// A path reference. The query is parsed here; malformed queries fail
    /// the build.
    pub fn path(query: &str) -> Result<Expr> {
        Ok(Expr(Arc::new(ExprKind::Path(PathQuery::parse(query)?))))
    }

    pub fn input() -> Expr {
        Expr(Arc::new(ExprKind::Input))
    }

    pub fn scope(input: Expr, body: Expr) -> Expr {
        Expr(Arc::new(ExprKind::Scope { input, body }))
    }

    pub(crate) fn new_call(name: Arc<str>, operator: Arc<dyn Operator>, args: Vec<Expr>) -> Expr {
        Expr(Arc::new(ExprKind::Call {
            name,
            operator,
            args,
        }))
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    /// `self` followed by `next`: `next` receives the result of `self` as its
    /// input. See [`compose`].
    pub fn then(&self, next: &Expr) -> Expr {
        compose(self, next)
    }

    /// True if the same node, not merely an equal one.
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Whether evaluating this expression reads the innermost context frame
    /// through anything other than an input slot.
    fn reads_frame(&self) -> bool {
        match self.kind() {
            ExprKind::Literal(_) | ExprKind::Input => false,
            ExprKind::Path(_) => true,
            ExprKind::Call { operator, args, .. } => {
                let signature = operator.signature();
                if args.is_empty() {
                    return signature.frame_default;
                }
                args.iter()
                    .enumerate()
                    .any(|(idx, a)| Some(idx) != signature.scoped && a.reads_frame())
            }
            ExprKind::Scope { input, .. } => input.reads_frame(),
        }
    }

    fn fill_input(&self, value: &Expr) -> Expr {
        match self.kind() {
            ExprKind::Input => value.clone(),
            ExprKind::Literal(_) | ExprKind::Path(_) => self.clone(),
            ExprKind::Call {
                name,
                operator,
                args,
            } => {
                let scoped = operator.signature().scoped;
                let args = args
                    .iter()
                    .enumerate()
                    .map(|(idx, a)| match Some(idx) == scoped {
                        true => a.clone(),
                        false => a.fill_input(value),
                    })
                    .collect();
                Expr::new_call(name.clone(), operator.clone(), args)
            }
            ExprKind::Scope { input, body } => Expr::scope(input.fill_input(value), body.clone()),
        }
    }
}

/// Sequential composition: evaluate `a`, then `b` with that result as its
/// input.
///
/// A stage only observes its input. When `b` reads the context solely through
/// its input slots, the slots are replaced by `a`, producing the same tree the
/// nested-call form builds. Otherwise `b` is wrapped in a scope whose frame is
/// the result of `a`. Composition is associative.
pub fn compose(a: &Expr, b: &Expr) -> Expr {
    if b.reads_frame() {
        Expr::scope(a.clone(), b.clone())
    } else {
        b.fill_input(a)
    }
}

/// Left-to-right composition of `stages`.
pub fn pipe<I: IntoIterator<Item = Expr>>(stages: I) -> Result<Expr> {
    let mut stages = stages.into_iter();
    let Some(first) = stages.next() else {
        return Err(Error::composition("a pipe needs at least one stage"));
    };
    Ok(stages.fold(first, |acc, stage| compose(&acc, &stage)))
}

impl PartialEq for Expr {
    fn eq(&self, other: &Expr) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.kind(), other.kind()) {
            (ExprKind::Literal(a), ExprKind::Literal(b)) => a == b,
            (ExprKind::Path(a), ExprKind::Path(b)) => a == b,
            (ExprKind::Input, ExprKind::Input) => true,
            (
                ExprKind::Call {
                    name: n1, args: a1, ..
                },
                ExprKind::Call {
                    name: n2, args: a2, ..
                },
            ) => n1 == n2 && a1 == a2,
            (
                ExprKind::Scope {
                    input: i1,
                    body: b1,
                },
                ExprKind::Scope {
                    input: i2,
                    body: b2,
                },
            ) => i1 == i2 && b1 == b2,
            _ => false,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Literal(v) => write!(f, "Literal({v})"),
            ExprKind::Path(p) => write!(f, "Path({p})"),
            ExprKind::Input => f.write_str("Input"),
            ExprKind::Call { name, args, .. } => {
                f.debug_tuple(&format!("Call<{name}>")).field(args).finish()
            }
            ExprKind::Scope { input, body } => f
                .debug_struct("Scope")
                .field("input", input)
                .field("body", body)
                .finish(),
        }
    }
}
