// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use crate::value::Value;


pub(crate) fn json(s: &str) -> Value {
    Value::from_json_str(s).unwrap()
}
