use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;

use fixed_asset_core::register::{self, RegisterInput};

use crate::input;

/// Arguments for the book value register
#[derive(Args)]
pub struct RegisterArgs {
    /// Path to JSON input file with `as_of` and `assets`
    #[arg(long)]
    pub input: Option<String>,

    /// Report date (YYYY-MM-DD); overrides `as_of` in the input
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_register(args: RegisterArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut register_input: RegisterInput = input::load(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for the book value register")?;
    if let Some(as_of) = args.as_of {
        register_input.as_of = as_of;
    }
    let result = register::book_value_register(&register_input)?;
    Ok(serde_json::to_value(result)?)
}
