mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::depreciation::{AdjustArgs, BookValueArgs, ScheduleArgs};
use commands::register::RegisterArgs;

/// Fixed-asset depreciation schedules and book values
#[derive(Parser)]
#[command(
    name = "fxa",
    version,
    about = "Fixed-asset depreciation schedules and book values",
    long_about = "A CLI for fixed-asset depreciation with decimal precision. Generates \
                  straight-line, declining-balance, sum-of-years' digits and \
                  units-of-production schedules, looks up book values as of a date, \
                  re-bases pre-depreciated assets and reports a book value register."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine decisions to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a depreciation schedule with monthly preview and yearly summary
    Schedule(ScheduleArgs),
    /// Book value and accumulated depreciation as of a date
    BookValue(BookValueArgs),
    /// Re-base an asset that enters with depreciation already accrued
    Adjust(AdjustArgs),
    /// Book value register for a set of assets
    Register(RegisterArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "fixed_asset_core=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::depreciation::run_schedule(args),
        Commands::BookValue(args) => commands::depreciation::run_book_value(args),
        Commands::Adjust(args) => commands::depreciation::run_adjust(args),
        Commands::Register(args) => commands::register::run_register(args),
        Commands::Version => {
            println!("fxa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
