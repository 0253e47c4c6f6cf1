// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::utils::ensure_string;
use crate::error::{Error, Result};
use crate::interpreter::Context;
use crate::registry::{Arity, Registry, Signature};
use crate::value::Value;

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const DEFAULT_OUTPUT_FORMAT: &str = "%d-%b-%Y";

pub fn register(m: &mut Registry) {
    m.insert_builtin(
        "FORMAT_DATE",
        Signature::new(Arity::Range(1, 2)).accepts_undefined(),
        format_date,
    );
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, INPUT_FORMAT) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// FORMAT_DATE(timestamp [, format])
fn format_date(name: &str, _ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let ts = match &args[0] {
        Value::Undefined | Value::Null => return Ok(args[0].clone()),
        v => ensure_string(name, 0, v)?,
    };
    let format = match args.get(1) {
        None | Some(Value::Undefined) | Some(Value::Null) => DEFAULT_OUTPUT_FORMAT.into(),
        Some(v) => ensure_string(name, 1, v)?,
    };

    let Some(dt) = parse_timestamp(&ts) else {
        return Err(Error::evaluation(
            name,
            format!("could not parse `{ts}` as a timestamp"),
        ));
    };

    // Invalid format specifiers surface as a formatting error instead of a panic.
    let mut out = String::new();
    if write!(out, "{}", dt.format(&format)).is_err() {
        return Err(Error::evaluation(
            name,
            format!("invalid date format `{format}`"),
        ));
    }
    Ok(Value::from(out))
}
