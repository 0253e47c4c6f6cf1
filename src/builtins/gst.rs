// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! GSTIN state-code reference table.

use crate::value::Value;

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use log::error;

const STATE_CODES_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/gstin_state_codes_india.json"
));

lazy_static! {
    static ref STATE_CODES: BTreeMap<String, String> = match Value::from_json_str(STATE_CODES_JSON)
    {
        Ok(table) => parse_state_codes(&table),
        Err(e) => {
            error!("could not load GSTIN state codes: {e}");
            BTreeMap::new()
        }
    };
}

/// State name for a two digit GSTIN state code.
pub fn state_name(code: &str) -> Option<&'static str> {
    STATE_CODES.get(code).map(String::as_str)
}

/// Builds a code to name table from any of the accepted layouts:
///
/// - `{"29": "Karnataka", ...}`
/// - `{"states": [{"state_code": 29, "state_name": "Karnataka"}, ...]}`
/// - `[{"code": "29", "state": "Karnataka"}, ...]`
/// - `[["29", "Karnataka"], ...]`
///
/// Codes are zero padded to two digits.
pub fn parse_state_codes(table: &Value) -> BTreeMap<String, String> {
    let mut codes = BTreeMap::new();
    match table {
        Value::Object(fields) => {
            for (k, v) in fields.iter() {
                match v {
                    Value::String(name) => add(&mut codes, &Value::String(k.clone()), name),
                    Value::Array(items) => add_items(&mut codes, items),
                    _ => (),
                }
            }
        }
        Value::Array(items) => add_items(&mut codes, items),
        _ => (),
    }
    codes
}

fn add_items(codes: &mut BTreeMap<String, String>, items: &[Value]) {
    for item in items {
        match item {
            Value::Object(_) => {
                let code = first_defined(&item["state_code"], &item["code"]);
                let name = first_defined(&item["state_name"], &item["state"]);
                if let Value::String(name) = name {
                    add(codes, code, name);
                }
            }
            Value::Array(pair) if pair.len() >= 2 => {
                if let Value::String(name) = &pair[1] {
                    add(codes, &pair[0], name);
                }
            }
            _ => (),
        }
    }
}

fn first_defined<'a>(a: &'a Value, b: &'a Value) -> &'a Value {
    match a {
        Value::Undefined | Value::Null => b,
        _ => a,
    }
}

fn add(codes: &mut BTreeMap<String, String>, code: &Value, name: &str) {
    let code = match code {
        Value::String(s) => s.to_string(),
        Value::Number(n) => n.to_string(),
        _ => return,
    };
    if code.is_empty() || name.is_empty() {
        return;
    }
    codes.insert(format!("{code:0>2}"), name.to_string());
}
