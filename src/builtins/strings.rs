// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::utils::ensure_integer;
use crate::error::Result;
use crate::interpreter::Context;
use crate::registry::{Arity, InputSlot, Registry, Signature};
use crate::value::Value;

pub fn register(m: &mut Registry) {
    let unary = Signature::new(Arity::Exact(1)).accepts_undefined();
    m.insert_builtin("CAPITALIZE", unary, capitalize);
    m.insert_builtin("UPPER", unary, upper);
    m.insert_builtin("LOWER", unary, lower);
    m.insert_builtin("TRIM", unary, trim);
    m.insert_builtin(
        "SUBSTR",
        Signature::new(Arity::Exact(3))
            .input(InputSlot::Last)
            .accepts_undefined(),
        substr,
    );
    m.insert_builtin(
        "JOIN_PARTS",
        Signature::new(Arity::AtLeast(0))
            .input(InputSlot::Last)
            .accepts_undefined(),
        join_parts,
    );
}

// Undefined and null pass through unchanged; other values are stringified.
fn map_text(v: &Value, f: impl FnOnce(&str) -> String) -> Value {
    match v {
        Value::Undefined | Value::Null => v.clone(),
        Value::String(s) => Value::from(f(s.as_ref())),
        _ => Value::from(f(&v.to_text())),
    }
}

fn capitalize(_name: &str, _ctx: &mut Context, args: &[Value]) -> Result<Value> {
    Ok(map_text(&args[0], |s| {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }))
}

fn upper(_name: &str, _ctx: &mut Context, args: &[Value]) -> Result<Value> {
    Ok(map_text(&args[0], str::to_uppercase))
}

fn lower(_name: &str, _ctx: &mut Context, args: &[Value]) -> Result<Value> {
    Ok(map_text(&args[0], str::to_lowercase))
}

fn trim(_name: &str, _ctx: &mut Context, args: &[Value]) -> Result<Value> {
    Ok(map_text(&args[0], |s| s.trim().to_string()))
}

// Characters [start, start + length). A negative start counts from the end.
fn substr(name: &str, _ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let start = ensure_integer(name, 0, &args[0])?;
    let length = ensure_integer(name, 1, &args[1])?;

    Ok(map_text(&args[2], |s| {
        let len = s.chars().count() as i64;
        let clamp = |i: i64| match i < 0 {
            true => (len + i).max(0),
            false => i.min(len),
        };
        let begin = clamp(start);
        let end = clamp(start.saturating_add(length));
        if end <= begin {
            return String::new();
        }
        s.chars()
            .skip(begin as usize)
            .take((end - begin) as usize)
            .collect()
    }))
}

// A part that matched nothing leaves the whole result missing. Nulls are
// skipped.
fn join_parts(_name: &str, _ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let mut joined = String::new();
    for part in args {
        match part {
            Value::Undefined => return Ok(Value::Undefined),
            Value::Null => (),
            _ => joined.push_str(&part.to_text()),
        }
    }
    Ok(Value::from(joined))
}
