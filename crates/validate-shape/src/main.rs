mod report;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use shape_validation::{Environment, NodeKind, ValidationOptions, Value, validate_named};
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use report::TextReport;

/// Validate a JSON value against a named schema
#[derive(Parser, Debug)]
#[command(name = "validate-shape")]
#[command(about = "Validate JSON values against schema environments", long_about = None)]
struct Args {
    /// Path to the JSON schema environment (an object of named schemas)
    #[arg(long, value_name = "FILE")]
    schema: PathBuf,

    /// Name of the schema in the environment to validate against
    #[arg(long, value_name = "NAME")]
    root: String,

    /// Path to the JSON value to validate
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// TOML file with validation options; flags below are applied on top
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Report declared properties missing from the value
    #[arg(long)]
    strict_missing: bool,

    /// Do not report undeclared properties
    #[arg(long)]
    skip_prop_check: bool,

    /// Do not accept null where unit is expected
    #[arg(long)]
    strict_unit: bool,

    /// Node kinds that JSON-decode string inputs
    #[arg(long, value_name = "KIND", value_delimiter = ',')]
    json_strings: Vec<NodeKind>,

    /// How to print validation errors
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let options = load_options(&args)?;
    debug!(?options, "effective validation options");

    let schema_content = fs::read_to_string(&args.schema)
        .with_context(|| format!("Failed to read schema file: {}", args.schema.display()))?;
    let env = Environment::from_json_str(&schema_content)
        .with_context(|| format!("Failed to load schemas from {}", args.schema.display()))?;

    if !env.contains(&args.root) {
        bail!(
            "No schema named '{}' in {} (available: {})",
            args.root,
            args.schema.display(),
            env.names().collect::<Vec<_>>().join(", ")
        );
    }

    let input_content = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file: {}", args.input.display()))?;
    let input = Value::from_json_str(&input_content)
        .with_context(|| format!("Failed to parse input file: {}", args.input.display()))?;

    match validate_named(&input, &args.root, &env, &options) {
        Ok(sanitized) => {
            println!("{}", serde_json::to_string_pretty(&sanitized)?);
            Ok(())
        }
        Err(errors) => {
            match args.format {
                Format::Text => eprint!("{}", TextReport(&errors)),
                Format::Json => println!("{}", serde_json::to_string_pretty(&errors)?),
            }
            process::exit(1);
        }
    }
}

/// Options from the `--options` file, with command-line flags switched on over them.
fn load_options(args: &Args) -> Result<ValidationOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file: {}", path.display()))?;
            toml::from_str::<ValidationOptions>(&content)
                .with_context(|| format!("Failed to parse options file: {}", path.display()))?
        }
        None => ValidationOptions::default(),
    };

    options.strict_missing |= args.strict_missing;
    options.skip_prop_check |= args.skip_prop_check;
    options.strict_unit |= args.strict_unit;
    options.json_strings.extend(args.json_strings.iter().copied());
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let base = ["validate-shape", "--schema", "s.json", "--root", "r", "--input", "i.json"];
        Args::try_parse_from(base.iter().chain(extra)).unwrap()
    }

    #[test]
    fn test_flags_switch_options_on() {
        let args = parse(&["--strict-unit", "--json-strings", "number,num,bool"]);
        let options = load_options(&args).unwrap();
        assert_eq!(
            options,
            ValidationOptions::new()
                .strict_unit(true)
                .json_string(NodeKind::Number)
                .json_string(NodeKind::Bool)
        );
        assert_eq!(args.format, Format::Text);
    }

    #[test]
    fn test_unknown_node_kind_is_rejected() {
        let base = ["validate-shape", "--schema", "s", "--root", "r", "--input", "i"];
        let result = Args::try_parse_from(base.iter().chain(&["--json-strings", "blob"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_json_format() {
        assert_eq!(parse(&["--format", "json"]).format, Format::Json);
    }
}
