mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::comparison::{CompareArgs, PresetsArgs};
use commands::loan::{EmiArgs, PrepaymentArgs, ProgressArgs, ScheduleArgs};

/// Loan EMI, amortization and prepayment calculations
#[derive(Parser)]
#[command(
    name = "emi",
    version,
    about = "Loan EMI, amortization and prepayment calculations",
    long_about = "A CLI for fixed-rate loan repayment analysis with decimal precision. \
                  Computes EMIs, month-by-month amortization schedules, prepayment \
                  savings, repayment progress and side-by-side loan comparisons."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the equated monthly installment and loan totals
    Emi(EmiArgs),
    /// Month-by-month amortization schedule
    Schedule(ScheduleArgs),
    /// Interest and tenure saved by a lump-sum prepayment
    Prepayment(PrepaymentArgs),
    /// How much of the loan is repaid after N installments
    Progress(ProgressArgs),
    /// Compare up to three loans side by side
    Compare(CompareArgs),
    /// List built-in loan presets
    Presets(PresetsArgs),
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

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loan::run_emi(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Prepayment(args) => commands::loan::run_prepayment(args),
        Commands::Progress(args) => commands::loan::run_progress(args),
        Commands::Compare(args) => commands::comparison::run_compare(args),
        Commands::Presets(args) => commands::comparison::run_presets(args),
        Commands::Version => {
            println!("emi {}", env!("CARGO_PKG_VERSION"));
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
