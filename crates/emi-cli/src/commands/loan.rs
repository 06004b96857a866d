use clap::Args;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

use emi_engine::amortization::emi;
use emi_engine::amortization::prepayment::{self, PrepaymentInput, PrepaymentPlan};
use emi_engine::amortization::schedule::{self, ProgressInput, ScheduleInput, DEFAULT_PREVIEW_MONTHS};
use emi_engine::LoanTerms;

use crate::input;

/// Loan terms given as individual flags
#[derive(Args, Debug, Clone)]
pub struct TermsArgs {
    /// Loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 8.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long)]
    pub tenure: Option<u32>,
}

impl TermsArgs {
    fn to_terms(&self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = self.rate.ok_or("--rate is required (or provide --input)")?;
        let tenure = self.tenure.ok_or("--tenure is required (or provide --input)")?;
        Ok(LoanTerms::new(principal, rate, tenure))
    }
}

/// Read a typed request from --input, then piped stdin, then fall back to flags.
fn load_or<T, F>(path: Option<&str>, from_flags: F) -> Result<T, Box<dyn std::error::Error>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Result<T, Box<dyn std::error::Error>>,
{
    if let Some(path) = path {
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        from_flags()
    }
}

/// Arguments for EMI calculation
#[derive(Args)]
pub struct EmiArgs {
    /// Path to JSON input file with loan terms (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsArgs,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = load_or(args.input.as_deref(), || args.terms.to_terms())?;
    let result = emi::analyze_emi(&terms)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for amortization schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file ({"terms": {...}, "months": N})
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsArgs,

    /// Only show the first N months
    #[arg(long, conflicts_with = "preview")]
    pub months: Option<u32>,

    /// Show the first year only
    #[arg(long)]
    pub preview: bool,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let months = if args.preview {
        Some(DEFAULT_PREVIEW_MONTHS)
    } else {
        args.months
    };
    let schedule_input: ScheduleInput = load_or(args.input.as_deref(), || {
        Ok(ScheduleInput {
            terms: args.terms.to_terms()?,
            months,
        })
    })?;
    let result = schedule::analyze_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for prepayment analysis
#[derive(Args)]
pub struct PrepaymentArgs {
    /// Path to JSON input file ({"terms": {...}, "plan": {...}})
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsArgs,

    /// Lump sum paid on top of the regular installment
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Month after whose installment the lump sum is paid
    #[arg(long, default_value = "12")]
    pub at_month: u32,
}

pub fn run_prepayment(args: PrepaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pp_input: PrepaymentInput = load_or(args.input.as_deref(), || {
        let extra = args.extra.ok_or("--extra is required (or provide --input)")?;
        Ok(PrepaymentInput {
            terms: args.terms.to_terms()?,
            plan: PrepaymentPlan {
                extra_amount: extra,
                apply_at_month: args.at_month,
            },
        })
    })?;
    let result = prepayment::analyze_prepayment(&pp_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for repayment progress
#[derive(Args)]
pub struct ProgressArgs {
    /// Path to JSON input file ({"terms": {...}, "payments_made": N})
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsArgs,

    /// Installments paid so far
    #[arg(long)]
    pub payments_made: Option<u32>,
}

pub fn run_progress(args: ProgressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let progress_input: ProgressInput = load_or(args.input.as_deref(), || {
        let payments_made = args
            .payments_made
            .ok_or("--payments-made is required (or provide --input)")?;
        Ok(ProgressInput {
            terms: args.terms.to_terms()?,
            payments_made,
        })
    })?;
    let result = schedule::analyze_progress(&progress_input)?;
    Ok(serde_json::to_value(result)?)
}
