use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use fixed_asset_core::depreciation::{
    self, AssetFinancials, DepreciationInput, DepreciationMethod, PriorAccrual,
};
use fixed_asset_core::with_metadata;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    StraightLine,
    DecliningBalance,
    SumOfYearsDigits,
    UnitsOfProduction,
}

/// Asset parameters given as individual flags
#[derive(Args)]
pub struct AssetArgs {
    /// Acquisition cost (e.g. 120000)
    #[arg(long)]
    pub cost: Option<Decimal>,

    /// Salvage value
    #[arg(long)]
    pub salvage: Option<Decimal>,

    /// Useful life in months
    #[arg(long)]
    pub life_months: Option<u32>,

    /// Depreciation method
    #[arg(long, value_enum, default_value = "straight-line")]
    pub method: MethodArg,

    /// Annual declining-balance rate in percent (default: 200% / life in years)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Switch declining balance to straight-line when that charges more
    #[arg(long)]
    pub switch_to_straight_line: bool,

    /// Total expected units (units of production)
    #[arg(long)]
    pub total_units: Option<u64>,

    /// Comma-separated units per period; "-" marks a missing report
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub usage: Vec<String>,

    /// First day of depreciation (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for schedule generation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub asset: AssetArgs,

    /// Report date for a book value lookup (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a book value lookup
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct BookValueArgs {
    #[command(flatten)]
    pub asset: AssetArgs,

    /// Report date (YYYY-MM-DD); overrides `as_of` in the JSON input
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for pre-depreciation re-basing
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AdjustArgs {
    #[command(flatten)]
    pub asset: AssetArgs,

    /// Depreciation recognised before entry
    #[arg(long)]
    pub prior_amount: Option<Decimal>,

    /// Months of depreciation already elapsed
    #[arg(long)]
    pub prior_months: Option<u32>,

    /// Book value asserted at entry
    #[arg(long)]
    pub entry_book_value: Option<Decimal>,

    /// Allowed gap between asserted and implied book value
    #[arg(long)]
    pub tolerance: Option<Decimal>,

    /// Start of the re-based schedule (YYYY-MM-DD; default: start date plus prior months)
    #[arg(long)]
    pub entry_date: Option<NaiveDate>,

    /// Path to JSON input file with `financials` and `prior_accrual`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dep_input = match input::load::<DepreciationInput>(args.input.as_deref())? {
        Some(mut loaded) => {
            if args.as_of.is_some() {
                loaded.as_of = args.as_of;
            }
            loaded
        }
        None => DepreciationInput {
            financials: financials_from_args(&args.asset)?,
            prior_accrual: None,
            unit_usage: parse_usage(&args.asset.usage)?,
            as_of: args.as_of,
        },
    };
    let result = depreciation::analyze_depreciation(&dep_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_book_value(args: BookValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut dep_input = match input::load::<DepreciationInput>(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => DepreciationInput {
            financials: financials_from_args(&args.asset)?,
            prior_accrual: None,
            unit_usage: parse_usage(&args.asset.usage)?,
            as_of: None,
        },
    };
    if args.as_of.is_some() {
        dep_input.as_of = args.as_of;
    }
    if dep_input.as_of.is_none() {
        return Err("--as-of <YYYY-MM-DD> is required for a book value lookup".into());
    }

    let analysis = depreciation::analyze_depreciation(&dep_input)?;
    let output = with_metadata(
        &analysis.methodology,
        &analysis.assumptions,
        analysis.warnings,
        analysis.metadata.computation_time_us,
        analysis.result.book_value,
    );
    Ok(serde_json::to_value(output)?)
}

#[derive(serde::Deserialize)]
struct AdjustInput {
    financials: AssetFinancials,
    prior_accrual: PriorAccrual,
}

pub fn run_adjust(args: AdjustArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let adjust_input = match input::load::<AdjustInput>(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => AdjustInput {
            financials: financials_from_args(&args.asset)?,
            prior_accrual: prior_accrual_from_args(&args)?,
        },
    };

    let adjustment =
        depreciation::adjust(&adjust_input.financials, &adjust_input.prior_accrual)?;
    let warnings = adjustment
        .book_value_mismatch
        .iter()
        .map(|m| depreciation::ScheduleNotice::BookValueMismatch(m.clone()).to_string())
        .collect();

    let output = with_metadata(
        "Pre-depreciation re-basing on entry book value",
        &adjust_input.prior_accrual,
        warnings,
        start.elapsed().as_micros() as u64,
        adjustment,
    );
    Ok(serde_json::to_value(output)?)
}

fn financials_from_args(args: &AssetArgs) -> Result<AssetFinancials, Box<dyn std::error::Error>> {
    let method = match args.method {
        MethodArg::StraightLine => DepreciationMethod::StraightLine,
        MethodArg::DecliningBalance => DepreciationMethod::DecliningBalance {
            rate_override: args.rate,
            switch_to_straight_line: args.switch_to_straight_line,
        },
        MethodArg::SumOfYearsDigits => DepreciationMethod::SumOfYearsDigits,
        MethodArg::UnitsOfProduction => DepreciationMethod::UnitsOfProduction {
            total_expected_units: args.total_units,
        },
    };

    Ok(AssetFinancials {
        acquisition_cost: args.cost.ok_or("--cost is required (or provide --input)")?,
        salvage_value: args.salvage.unwrap_or(Decimal::ZERO),
        useful_life_months: args
            .life_months
            .ok_or("--life-months is required (or provide --input)")?,
        method,
        start_date: args
            .start_date
            .ok_or("--start-date is required (or provide --input)")?,
    })
}

fn prior_accrual_from_args(args: &AdjustArgs) -> Result<PriorAccrual, Box<dyn std::error::Error>> {
    Ok(PriorAccrual {
        prior_depreciation_amount: args
            .prior_amount
            .ok_or("--prior-amount is required (or provide --input)")?,
        prior_depreciation_months: args
            .prior_months
            .ok_or("--prior-months is required (or provide --input)")?,
        entry_book_value: args
            .entry_book_value
            .ok_or("--entry-book-value is required (or provide --input)")?,
        tolerance: args.tolerance,
        entry_date: args.entry_date,
    })
}

fn parse_usage(raw: &[String]) -> Result<Vec<Option<u64>>, Box<dyn std::error::Error>> {
    let mut usage = Vec::with_capacity(raw.len());
    for s in raw {
        match s.trim() {
            "-" | "" => usage.push(None),
            units => {
                let parsed = units
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid --usage value '{}': {}", units, e))?;
                usage.push(Some(parsed));
            }
        }
    }
    Ok(usage)
}
