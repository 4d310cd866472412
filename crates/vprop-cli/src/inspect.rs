//! # Inspect Subcommand
//!
//! Prints the store snapshot as nested JSON.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::{apply_assignment, load_store, parse_assignment, read_input};

/// Arguments for the inspect subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Form document (YAML, or JSON with a `.json` extension).
    pub schema: PathBuf,

    /// Host input JSON file.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Field assignment `NAME=VALUE`, applied in order. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub assignments: Vec<String>,

    /// Run a validation pass before taking the snapshot.
    #[arg(long)]
    pub validate: bool,
}

/// Build the snapshot JSON the subcommand prints.
pub fn snapshot_json(args: &InspectArgs) -> Result<serde_json::Value> {
    let input = read_input(args.input.as_deref())?;
    let mut store = load_store(&args.schema, input)?;
    for raw in &args.assignments {
        let (name, value) = parse_assignment(raw)?;
        apply_assignment(&mut store, &name, value)?;
    }
    if args.validate {
        store.validate_all();
    }
    Ok(store.snapshot().to_value())
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let snapshot = snapshot_json(args)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_nests_and_counts_errors() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("form.json");
        std::fs::write(
            &schema,
            r#"{"fields": [
                {"name": "user.name", "rules": [{"rule": "required", "error": "required"}]},
                {"name": "tags", "list": 2}
            ]}"#,
        )
        .unwrap();

        let args = InspectArgs {
            schema,
            input: None,
            assignments: vec!["tags[1]=rust".into()],
            validate: true,
        };
        let snapshot = snapshot_json(&args).unwrap();
        assert_eq!(snapshot["user"]["name"]["errors"], json!(["required"]));
        assert_eq!(snapshot["tags"][1]["value"], json!("rust"));
        assert_eq!(snapshot["validator"]["errors_count"], json!(1));
    }
}
