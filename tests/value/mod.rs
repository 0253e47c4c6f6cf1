// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::Result;
use fieldrules::*;

#[test]
fn object_order_is_kept() -> Result<()> {
    let v = Value::from_json_str(r#"{"z": 1, "a": 2, "m": {"y": null, "b": true}}"#)?;
    assert_eq!(v.to_string(), r#"{"z":1,"a":2,"m":{"y":null,"b":true}}"#);
    let keys: Vec<&str> = v.as_object()?.keys().map(|k| k.as_ref()).collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
    Ok(())
}

#[test]
fn serialize_undefined() -> Result<()> {
    assert_eq!(serde_json::to_string(&Value::Undefined)?, "\"<undefined>\"");
    assert_eq!(
        Value::String("Hello, World\n".into()).to_json_str()?,
        "\"Hello, World\\n\""
    );
    Ok(())
}

#[test]
fn constructors() -> Result<()> {
    assert_eq!(Value::new_object(), Value::from_json_str("{}")?);
    assert_eq!(Value::new_array(), Value::from_json_str("[]")?);
    assert_eq!(Value::from(-3i64), Value::from_json_str("-3")?);
    assert_eq!(Value::from(3u64), Value::from_json_str("3")?);
    assert_eq!(Value::from(f64::NAN), Value::Null);
    assert_eq!(
        Value::from(serde_json::json!({"a": [1, "b", null]})),
        Value::from_json_str(r#"{"a": [1, "b", null]}"#)?
    );
    assert_eq!(
        Value::from_yaml_str("a:\n  - 1\n  - b\n")?,
        Value::from_json_str(r#"{"a": [1, "b"]}"#)?
    );
    Ok(())
}

#[test]
fn indexing() -> Result<()> {
    let v = Value::from_json_str(r#"{"a": [1, 2, {"b": "c"}]}"#)?;
    assert_eq!(v["a"][2usize]["b"], Value::from("c"));
    assert_eq!(v["a"][5usize], Value::Undefined);
    assert_eq!(v["missing"]["deeper"], Value::Undefined);
    assert_eq!(Value::Null["a"], Value::Undefined);
    assert_eq!(v[&"a".to_string()][0usize], Value::from(1u64));
    Ok(())
}

#[test]
fn emptiness() -> Result<()> {
    for empty in ["null", r#""""#, "[]", "{}"] {
        assert!(Value::from_json_str(empty)?.is_empty(), "{empty}");
    }
    for present in ["0", "false", r#"" ""#, "[null]"] {
        assert!(!Value::from_json_str(present)?.is_empty(), "{present}");
    }
    assert!(!Value::Undefined.is_empty());
    assert!(Value::Undefined.is_undefined());
    assert!(!Value::Null.is_undefined());
    Ok(())
}

#[test]
fn text_form() -> Result<()> {
    assert_eq!(Value::from("plain").to_text(), "plain");
    assert_eq!(Value::from(1.5).to_text(), "1.5");
    assert_eq!(Value::Bool(true).to_text(), "true");
    assert_eq!(Value::Undefined.to_text(), "");
    assert_eq!(Value::from_json_str(r#"["a", 1]"#)?.to_text(), r#"["a",1]"#);
    Ok(())
}

#[test]
fn make_or_get_value_mut() -> Result<()> {
    let mut v = Value::from_json_str(r#"{"a": {"x": 1}, "b": 2}"#)?;
    let original = v.clone();

    *v.make_or_get_value_mut(&["a", "y"]) = Value::from("new");
    *v.make_or_get_value_mut(&["b", "c"]) = Value::Bool(true);
    *v.make_or_get_value_mut(&["d", "e", "f"]) = Value::Null;

    assert_eq!(
        v,
        Value::from_json_str(
            r#"{"a": {"x": 1, "y": "new"}, "b": {"c": true}, "d": {"e": {"f": null}}}"#
        )?
    );
    // Copies made before the update are not affected.
    assert_eq!(original["b"], Value::from(2u64));
    Ok(())
}

#[test]
fn api() -> Result<()> {
    assert!(Value::from_json_str("{}")?.as_object()?.is_empty());
    let mut v = Value::new_object();
    v.as_object_mut()?.insert("a".into(), Value::from(3.145));
    assert_eq!(v["a"], Value::from(3.145));
    assert_eq!(v.as_object()?.len(), 1);

    assert_eq!(Value::from(7i64).as_i64()?, 7);
    assert_eq!(Value::from("s").as_string()?.as_ref(), "s");
    assert!(*Value::Bool(true).as_bool()?);

    assert!(Value::Undefined.as_object().is_err());
    assert!(Value::Undefined.as_object_mut().is_err());
    assert!(Value::String("anc".into()).as_array().is_err());
    assert!(Value::String("anc".into()).as_array_mut().is_err());
    assert!(Value::from(5.6).as_bool().is_err());
    assert!(Value::from(5.6).as_i64().is_err());
    Ok(())
}
