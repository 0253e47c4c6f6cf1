// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use anyhow::Result;
use fieldrules::*;

fn repeat(name: &str, _ctx: &mut Context, args: &[Value]) -> fieldrules::Result<Value> {
    match &args[0] {
        Value::String(s) => Ok(Value::from(format!("{s}{s}"))),
        v => Err(Error::Evaluation {
            operator: name.to_string(),
            message: format!("expects a string. Got `{v}` instead"),
        }),
    }
}

struct Repeat;

impl Operator for Repeat {
    fn signature(&self) -> Signature {
        Signature::new(Arity::Exact(1))
    }

    fn evaluate(&self, name: &str, ctx: &mut Context, args: &[Expr]) -> fieldrules::Result<Value> {
        let values = ctx.eval_args(name, &self.signature(), args)?;
        repeat(name, ctx, &values)
    }
}

const IDENTITY: &str = r#"{
    "name": "identity",
    "fields": [
        {"field": "full_name", "type": "string", "transform": {"JOIN_PARTS": [
            {"CAPITALIZE": [{"JSONPATH": ["$.first_name"]}]},
            " ",
            {"CAPITALIZE": [{"JSONPATH": ["$.surname"]}]}
        ]}},
        {"field": "pan", "transform": {"PIPE": [{"JSONPATH": ["$.gst_records[0].gst_number"]}, {"SUBSTR": [2, 10]}]}}
    ]
}"#;

const TAX: &str = r#"
name: tax
fields:
  - field: gst_details
    type: array
    transform:
      GST_DETAILS_ALL: []
"#;

fn applicant() -> Result<Value> {
    Value::from_json_str(
        r#"{
            "first_name": "paul",
            "surname": "smith",
            "gst_records": [{"gst_number": "29ABCDE1234F1Z5"}]
        }"#,
    )
}

#[test]
fn extension() -> Result<()> {
    let mut engine = Engine::new();

    // Unknown until registered.
    let rule = Value::from_json_str(r#"{"REPEAT": ["ab"]}"#)?;
    assert!(matches!(
        engine.eval_expr(&rule, &Value::Null),
        Err(Error::UnknownOperator { .. })
    ));

    engine.register_operator("REPEAT", Arc::new(Repeat))?;
    assert!(engine.register_operator("REPEAT", Arc::new(Repeat)).is_err());
    assert_eq!(engine.eval_expr(&rule, &Value::Null)?, Value::from("abab"));

    // The shared builtin registry is unaffected.
    assert!(!Registry::builtin().contains("REPEAT"));
    Ok(())
}

#[test]
fn function_extension() -> Result<()> {
    let mut registry = Registry::with_builtins();
    registry.register_fn("REPEAT", Signature::new(Arity::Exact(1)), repeat)?;
    let engine = Engine::with_registry(registry);

    let rule = Value::from_json_str(r#"{"PIPE": [{"JSONPATH": ["$.a"]}, {"REPEAT": []}, {"UPPER": []}]}"#)?;
    let doc = Value::from_json_str(r#"{"a": "xy"}"#)?;
    assert_eq!(engine.eval_expr(&rule, &doc)?, Value::from("XYXY"));

    let err = engine
        .eval_expr(&rule, &Value::from_json_str(r#"{"a": 1}"#)?)
        .unwrap_err();
    assert_eq!(err.to_string(), "`REPEAT`: expects a string. Got `1` instead");
    Ok(())
}

#[test]
fn models() -> Result<()> {
    let mut engine = Engine::new();
    engine.add_model_from_json_str(IDENTITY)?;
    engine.add_model_from_yaml_str(TAX)?;
    assert_eq!(engine.model_names(), vec!["identity", "tax"]);

    let identity = engine.transform("identity", &applicant()?)?;
    assert_eq!(identity["full_name"], Value::from("Paul Smith"));
    assert_eq!(identity["pan"], Value::from("ABCDE1234F"));
    assert_eq!(identity["first_name"], Value::from("paul"));

    let all = engine.transform_all(&applicant()?)?;
    assert_eq!(all["identity"], identity);
    assert_eq!(
        all["tax"]["gst_details"],
        Value::from_json_str(
            r#"[{"gst_number": "29ABCDE1234F1Z5", "pan_number": "ABCDE1234F", "state_name": "Karnataka"}]"#
        )?
    );

    assert!(matches!(
        engine.transform("missing", &applicant()?),
        Err(Error::UnknownModel { .. })
    ));
    assert!(matches!(
        engine.add_model_from_json_str(IDENTITY),
        Err(Error::DuplicateModel { .. })
    ));
    Ok(())
}

#[test]
fn populate() -> Result<()> {
    let mut engine = Engine::new();
    engine.add_model_from_json_str(IDENTITY)?;

    let short_names = |_: &Model, doc: &Value| -> std::result::Result<(), String> {
        match doc["full_name"].as_string() {
            Ok(name) if name.len() <= 10 => Ok(()),
            _ => Err(format!("`{}` is too long", doc["full_name"])),
        }
    };

    let out = engine.populate("identity", &applicant()?, &short_names)?;
    assert_eq!(out["full_name"], Value::from("Paul Smith"));

    let long = Value::from_json_str(r#"{"first_name": "bartholomew", "surname": "jones"}"#)?;
    let err = engine.populate("identity", &long, &short_names).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert!(err.to_string().contains("too long"), "{err}");
    Ok(())
}

#[test]
fn model_files() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("fieldrules-models-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let json_file = dir.join("identity.json");
    let yaml_file = dir.join("tax.yaml");
    std::fs::write(&json_file, IDENTITY)?;
    std::fs::write(&yaml_file, TAX)?;

    let mut engine = Engine::new();
    engine.add_model_from_file(&json_file)?;
    engine.add_model_from_file(&yaml_file)?;
    assert_eq!(engine.model_names(), vec!["identity", "tax"]);

    assert!(matches!(
        engine.add_model_from_file(dir.join("missing.json")),
        Err(Error::Io(_))
    ));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn max_depth() -> Result<()> {
    let mut rule = Value::from_json_str(r#"{"JSONPATH": ["$.a"]}"#)?;
    for _ in 0..50 {
        rule = Value::from_json_str(&format!(r#"{{"TRIM": [{rule}]}}"#))?;
    }
    let doc = Value::from_json_str(r#"{"a": " x "}"#)?;

    let mut engine = Engine::new();
    assert_eq!(engine.config().max_depth, Some(256));
    assert_eq!(engine.eval_expr(&rule, &doc)?, Value::from("x"));

    engine.set_max_depth(Some(20));
    assert!(matches!(
        engine.eval_expr(&rule, &doc),
        Err(Error::DepthLimitExceeded { limit: 20 })
    ));

    engine.set_max_depth(None);
    assert_eq!(engine.eval_expr(&rule, &doc)?, Value::from("x"));
    Ok(())
}

#[test]
fn shared_across_threads() -> Result<()> {
    let mut engine = Engine::new();
    engine.add_model_from_json_str(IDENTITY)?;
    let engine = Arc::new(engine);

    let handles: Vec<_> = ["ann", "bob", "cyd", "dee"]
        .into_iter()
        .map(|name| {
            let engine = engine.clone();
            std::thread::spawn(move || -> Result<Value> {
                let doc = Value::from_json_str(&format!(
                    r#"{{"first_name": "{name}", "surname": "x"}}"#
                ))?;
                Ok(engine.transform("identity", &doc)?["full_name"].clone())
            })
        })
        .collect();

    let mut names = vec![];
    for h in handles {
        match h.join() {
            Ok(r) => names.push(r?),
            Err(_) => anyhow::bail!("worker panicked"),
        }
    }
    assert_eq!(
        names,
        vec![
            Value::from("Ann X"),
            Value::from("Bob X"),
            Value::from("Cyd X"),
            Value::from("Dee X")
        ]
    );
    Ok(())
}
