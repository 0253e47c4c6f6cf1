// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Error, Result};
use crate::value::Value;

use std::sync::Arc;

pub fn ensure_string(fcn: &str, idx: usize, v: &Value) -> Result<Arc<str>> {
    Ok(match v {
        Value::String(s) => s.clone(),
        _ => {
            return Err(Error::evaluation(
                fcn,
                format!("argument {} expects string. Got `{v}` instead", idx + 1),
            ))
        }
    })
}

pub fn ensure_integer(fcn: &str, idx: usize, v: &Value) -> Result<i64> {
    match v {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(i),
            None => Err(Error::evaluation(
                fcn,
                format!("argument {} expects integer. Got `{v}` instead", idx + 1),
            )),
        },
        _ => Err(Error::evaluation(
            fcn,
            format!("argument {} expects integer. Got `{v}` instead", idx + 1),
        )),
    }
}

pub fn ensure_array(fcn: &str, idx: usize, v: &Value) -> Result<Arc<Vec<Value>>> {
    Ok(match v {
        Value::Array(a) => a.clone(),
        _ => {
            return Err(Error::evaluation(
                fcn,
                format!("argument {} expects array. Got `{v}` instead", idx + 1),
            ))
        }
    })
}
