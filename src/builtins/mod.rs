// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

pub mod control;
#[cfg(feature = "time")]
pub mod dates;
pub mod gst;
pub mod records;
pub mod strings;
pub mod utils;

use crate::error::Result;
use crate::expr::Expr;
use crate::interpreter::Context;
use crate::registry::{Operator, Registry, Signature};
use crate::value::Value;

/// Body of an operator that works on fully evaluated arguments.
pub type BuiltinFcn = fn(name: &str, ctx: &mut Context, args: &[Value]) -> Result<Value>;

/// Operator backed by a plain function. All arguments are evaluated first.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub signature: Signature,
    pub fcn: BuiltinFcn,
}

impl Operator for Builtin {
    fn signature(&self) -> Signature {
        self.signature
    }

    fn evaluate(&self, name: &str, ctx: &mut Context, args: &[Expr]) -> Result<Value> {
        let values = ctx.eval_args(name, &self.signature, args)?;
        (self.fcn)(name, ctx, &values)
    }
}

#[rustfmt::skip]
pub(crate) fn register(m: &mut Registry) {
    strings::register(m);
    records::register(m);
    control::register(m);
    #[cfg(feature = "time")]
    dates::register(m);
}
