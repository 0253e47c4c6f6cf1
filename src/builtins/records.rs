// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::gst;
use crate::error::Result;
use crate::interpreter::Context;
use crate::registry::{Arity, Registry, Signature};
use crate::value::{Map, Value};

pub fn register(m: &mut Registry) {
    m.insert_builtin(
        "GST_DETAILS_ALL",
        Signature::new(Arity::Range(0, 1))
            .accepts_undefined()
            .frame_default(),
        gst_details_all,
    );
}

// Derives pan number and state name from each record's GSTIN.
// Without an argument the records are read from `gst_records` of the current
// frame. Missing records stay missing. Records without a usable `gst_number`
// are skipped.
fn gst_details_all(_name: &str, ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let records = match args.first() {
        Some(records) => records.clone(),
        None => ctx.current()["gst_records"].clone(),
    };

    let records = match records {
        Value::Undefined => return Ok(Value::Undefined),
        Value::Array(records) => records,
        _ => return Ok(Value::new_array()),
    };

    // Multi-match path results arrive wrapped in an outer array.
    let records = match records.first() {
        Some(Value::Array(inner)) => inner.clone(),
        _ => records,
    };

    let mut out = vec![];
    for record in records.iter() {
        let Value::String(gst) = &record["gst_number"] else {
            continue;
        };
        let chars: Vec<char> = gst.chars().collect();
        if chars.len() < 12 {
            continue;
        }
        let state_code: String = chars[..2].iter().collect();
        let pan: String = chars[2..12].iter().collect();

        let mut details = Map::new();
        details.insert("gst_number".into(), Value::String(gst.clone()));
        details.insert("pan_number".into(), Value::from(pan));
        details.insert(
            "state_name".into(),
            Value::from(gst::state_name(&state_code).unwrap_or_default()),
        );
        out.push(Value::from(details));
    }
    Ok(Value::from(out))
}
