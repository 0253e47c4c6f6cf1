// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Operators that decide for themselves which arguments to evaluate and
//! against which frame.

use crate::builtins::utils::ensure_array;
use crate::error::Result;
use crate::expr::Expr;
use crate::interpreter::Context;
use crate::registry::{Arity, Operator, Registry, Signature};
use crate::value::Value;

use std::sync::Arc;

pub fn register(m: &mut Registry) {
    m.insert_operator("COALESCE", Arc::new(Coalesce));
    m.insert_operator("MAP", Arc::new(MapEach));
}

/// First argument that matched something. Later arguments are not evaluated.
struct Coalesce;

impl Operator for Coalesce {
    fn signature(&self) -> Signature {
        Signature::new(Arity::AtLeast(1)).accepts_undefined()
    }

    fn evaluate(&self, _name: &str, ctx: &mut Context, args: &[Expr]) -> Result<Value> {
        for arg in args {
            match ctx.eval(arg)? {
                Value::Undefined => continue,
                v => return Ok(v),
            }
        }
        Ok(Value::Undefined)
    }
}

/// `MAP(list, body)`: evaluates `body` once per element of `list`, with the
/// element as the innermost frame. Elements for which `body` matched nothing
/// map to null so positions are kept.
struct MapEach;

impl Operator for MapEach {
    fn signature(&self) -> Signature {
        Signature::new(Arity::Exact(2)).scoped(1)
    }

    fn evaluate(&self, name: &str, ctx: &mut Context, args: &[Expr]) -> Result<Value> {
        let list = match ctx.eval(&args[0])? {
            Value::Undefined => return Ok(Value::Undefined),
            v => ensure_array(name, 0, &v)?,
        };

        let mut out = Vec::with_capacity(list.len());
        for item in list.iter() {
            let v = ctx.with_frame(item.clone(), |ctx| ctx.eval(&args[1]))?;
            out.push(match v {
                Value::Undefined => Value::Null,
                v => v,
            });
        }
        Ok(Value::from(out))
    }
}
