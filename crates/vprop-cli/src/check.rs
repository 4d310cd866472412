//! # Check Subcommand
//!
//! Loads a form, applies `--set` assignments, validates every field and
//! prints the aggregate result as JSON.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::{apply_assignment, load_store, parse_assignment, read_input, EXIT_INVALID};

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Form document (YAML, or JSON with a `.json` extension).
    pub schema: PathBuf,

    /// Host input JSON file.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Field assignment `NAME=VALUE`, applied in order. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub assignments: Vec<String>,

    /// Validate this field only instead of the whole form.
    #[arg(long)]
    pub field: Option<String>,
}

/// Execute the check subcommand. Returns the process exit code.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let input = read_input(args.input.as_deref())?;
    let mut store = load_store(&args.schema, input)?;

    for raw in &args.assignments {
        let (name, value) = parse_assignment(raw)?;
        apply_assignment(&mut store, &name, value)?;
    }

    let (is_valid, report) = match &args.field {
        Some(name) => {
            let key = crate::resolve_key(store.fields(), name)?;
            let outcome = store.validate(key)?;
            (outcome.is_valid, serde_json::to_string_pretty(&outcome)?)
        }
        None => {
            let result = store.validate_all();
            (result.is_valid, serde_json::to_string_pretty(&result)?)
        }
    };

    tracing::debug!(is_valid, errors_count = store.errors_count(), "check finished");
    println!("{report}");
    Ok(if is_valid { 0 } else { EXIT_INVALID })
}
