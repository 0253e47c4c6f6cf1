// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

fn read_value(file: &str) -> Result<fieldrules::Value> {
    let contents =
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?;

    Ok(if file.ends_with(".json") {
        serde_json::from_str(&contents)?
    } else if file.ends_with(".yaml") || file.ends_with(".yml") {
        serde_yaml::from_str(&contents)?
    } else {
        bail!("Unsupported file `{file}`. Must be json or yaml.")
    })
}

fn read_input(input: Option<String>) -> Result<fieldrules::Value> {
    match input {
        Some(file) => read_value(&file),
        None => Ok(fieldrules::Value::new_object()),
    }
}

fn rules_eval(models: &[String], input: Option<String>, model: Option<String>) -> Result<()> {
    let mut engine = fieldrules::Engine::new();
    for file in models {
        engine
            .add_model_from_file(file)
            .with_context(|| format!("Failed to load model {file}"))?;
    }

    let document = read_input(input)?;

    // Run a single model if one is named; otherwise all of them.
    let results = match &model {
        Some(name) => engine.transform(name, &document)?,
        None => engine.transform_all(&document)?,
    };
    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}

fn rules_expr(rule: String, input: Option<String>) -> Result<()> {
    let engine = fieldrules::Engine::new();
    let rule: fieldrules::Value =
        serde_json::from_str(&rule).with_context(|| "Expression must be json")?;
    let document = read_input(input)?;

    let result = engine.eval_expr(&rule, &document)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

fn rules_check(file: String) -> Result<()> {
    let mut engine = fieldrules::Engine::new();
    engine
        .add_model_from_file(&file)
        .with_context(|| format!("Failed to load model {file}"))?;

    for name in engine.model_names() {
        let model = engine.get_model(name)?;
        println!("model {name}");
        for field in model.fields() {
            println!(
                "  {} ({:?}, defer {:?}): {}",
                field.field(),
                field.output_type(),
                field.defer(),
                field.expr()
            );
        }
    }

    Ok(())
}

#[derive(Subcommand)]
enum RulesCommand {
    /// Transform a document with one or more models.
    Eval {
        /// Model files. json or yaml.
        #[arg(required(true), long, short, value_name = "model.json|model.yaml")]
        model: Vec<String>,

        /// Input document. json or yaml.
        #[arg(long, short, value_name = "input.json")]
        input: Option<String>,

        /// Only run the named model.
        #[arg(long)]
        only: Option<String>,
    },

    /// Evaluate a single expression in rule encoding.
    Expr {
        /// Input document. json or yaml.
        #[arg(long, short, value_name = "input.json")]
        input: Option<String>,

        /// Expression, e.g. '{"UPPER": [{"JSONPATH": ["$.name"]}]}'.
        rule: String,
    },

    /// Load a model file and print its bindings.
    Check {
        /// Model file.
        file: String,
    },
}

#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: RulesCommand,
}

fn main() -> Result<()> {
    env_logger::init();

    // Parse and dispatch command.
    let cli = Cli::parse();
    match cli.command {
        RulesCommand::Eval { model, input, only } => rules_eval(&model, input, only),
        RulesCommand::Expr { input, rule } => rules_expr(rule, input),
        RulesCommand::Check { file } => rules_check(file),
    }
}
