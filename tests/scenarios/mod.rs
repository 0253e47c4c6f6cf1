// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::env;

use anyhow::{bail, Result};
use fieldrules::*;
use serde::{Deserialize, Serialize};
use test_generator::test_resources;

// Undefined is written as the string "#undefined" in case files.
fn process_value(v: &Value) -> Value {
    match v {
        Value::String(s) if s.as_ref() == "#undefined" => Value::Undefined,
        Value::Array(items) => Value::from(items.iter().map(process_value).collect::<Vec<_>>()),
        Value::Object(fields) => {
            let mut object = Value::new_object();
            if let Ok(map) = object.as_object_mut() {
                for (k, v) in fields.iter() {
                    map.insert(k.clone(), process_value(v));
                }
            }
            object
        }
        _ => v.clone(),
    }
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    data: Value,
    /// An expression in rule encoding.
    rule: Option<Value>,
    /// Model definitions. Every model is run and the outputs are keyed by
    /// model name.
    models: Option<Vec<Value>>,
    want_result: Option<Value>,
    error: Option<String>,
    skip: Option<bool>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn eval_case(case: &TestCase) -> Result<Value> {
    let mut engine = Engine::new();
    match (&case.rule, &case.models) {
        (Some(rule), None) => Ok(engine.eval_expr(rule, &case.data)?),
        (None, Some(models)) => {
            for m in models {
                let model = Model::from_value(m, engine.registry())?;
                engine.add_model(model)?;
            }
            Ok(engine.transform_all(&case.data)?)
        }
        _ => bail!("case `{}` needs exactly one of `rule` and `models`", case.note),
    }
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    println!("running {file}");

    for case in test.cases {
        print!("case {} ", case.note);
        if case.skip == Some(true) {
            println!("skipped");
            continue;
        }

        match (&case.want_result, &case.error) {
            (Some(_), None) | (None, Some(_)) => (),
            _ => bail!("either want_result or error must be specified in test case."),
        }

        match eval_case(&case) {
            Ok(result) => match &case.want_result {
                Some(want_result) => {
                    let expected = process_value(want_result);
                    if result != expected {
                        bail!(
                            "\nmismatch in `{}`\nleft  = {}\nright = {}\n",
                            case.note,
                            serde_json::to_string_pretty(&result)?,
                            serde_json::to_string_pretty(&expected)?
                        );
                    }
                }
                None => bail!("eval succeeded and did not produce any errors"),
            },
            Err(actual) => match &case.error {
                Some(expected) => {
                    let actual = actual.to_string();
                    if !actual.contains(expected) {
                        bail!("Error message\n`{actual}\n`\ndoes not contain `{expected}`");
                    }
                    println!("{actual}");
                }
                None => return Err(actual),
            },
        }

        println!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{}", e);
        }
    }
}

#[test]
#[ignore = "intended for running a single case file"]
fn one_yaml() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut file = String::default();
    for a in env::args() {
        if a.ends_with(".yaml") {
            file = a;
        }
    }

    if file.is_empty() {
        bail!("missing <yaml-file>");
    }

    yaml_test(file.as_str())
}

#[test_resources("tests/scenarios/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
