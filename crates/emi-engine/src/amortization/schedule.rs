//! Month-by-month amortization schedules.
//!
//! [`Amortization`] walks a fixed-installment loan lazily. Balances and
//! interest are carried at full precision between months and only rounded
//! when an entry is emitted. The final month settles whatever balance the
//! rounded installment left behind, so the last entry always closes at zero.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::time::Instant;

use super::emi::fixed_installment;
use crate::error::EngineError;
use crate::types::*;
use crate::EngineResult;

/// Rows shown when a caller asks for a preview without a length.
pub const DEFAULT_PREVIEW_MONTHS: u32 = 12;

/// One month of the repayment schedule, in whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub month: u32,
    pub installment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

/// Lazy, restartable amortization walk over a loan.
#[derive(Debug, Clone)]
pub struct Amortization {
    monthly_rate: Rate,
    installment: Money,
    balance: Money,
    month: u32,
    tenure: u32,
}

impl Amortization {
    /// Fixed installment every regular month uses.
    pub fn installment(&self) -> Money {
        self.installment
    }

    /// Unrounded balance after the most recently emitted month.
    pub fn outstanding(&self) -> Money {
        self.balance
    }

    /// Months emitted so far.
    pub fn months_elapsed(&self) -> u32 {
        self.month
    }
}

/// Start an amortization walk for the given terms.
pub fn amortize(terms: &LoanTerms) -> EngineResult<Amortization> {
    terms.validate()?;
    Ok(Amortization {
        monthly_rate: terms.monthly_rate(),
        installment: fixed_installment(terms)?,
        balance: terms.principal,
        month: 0,
        tenure: terms.tenure_months,
    })
}

impl Amortization {
    fn step(&mut self) -> EngineResult<ScheduleEntry> {
        let interest = checked(self.balance.checked_mul(self.monthly_rate), "schedule interest")?;
        // Final month settles the residual from rounding the installment
        let settle = self.month == self.tenure || self.installment - interest > self.balance;
        let (payment, principal_paid) = if settle {
            let payoff = checked(self.balance.checked_add(interest), "schedule payoff")?;
            (payoff, self.balance)
        } else {
            (self.installment, self.installment - interest)
        };
        self.balance = checked(self.balance.checked_sub(principal_paid), "schedule balance")?;

        let installment = round_currency(payment);
        let interest_portion = round_currency(interest);
        Ok(ScheduleEntry {
            month: self.month,
            installment,
            principal_portion: installment - interest_portion,
            interest_portion,
            remaining_balance: round_currency(self.balance).max(Decimal::ZERO),
        })
    }
}

/// Yields one entry per month. An entry that cannot be represented ends the
/// walk with [`EngineError::Overflow`].
impl Iterator for Amortization {
    type Item = EngineResult<ScheduleEntry>;

    fn next(&mut self) -> Option<EngineResult<ScheduleEntry>> {
        if self.month >= self.tenure {
            return None;
        }
        self.month += 1;

        let entry = self.step();
        if entry.is_err() {
            self.month = self.tenure;
        }
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.tenure - self.month) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Amortization {}

impl FusedIterator for Amortization {}

/// Full schedule, one entry per month of the tenure.
pub fn generate_schedule(terms: &LoanTerms) -> EngineResult<Vec<ScheduleEntry>> {
    amortize(terms)?.collect()
}

/// First `months` entries of the schedule (capped at the tenure).
pub fn schedule_preview(terms: &LoanTerms, months: u32) -> EngineResult<Vec<ScheduleEntry>> {
    amortize(terms)?.take(months as usize).collect()
}

fn checked_sum(mut values: impl Iterator<Item = Money>, context: &str) -> EngineResult<Money> {
    values.try_fold(Decimal::ZERO, |acc, v| checked(acc.checked_add(v), context))
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Input for a schedule request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub terms: LoanTerms,
    /// Limit the output to the first N months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
}

/// Schedule plus the totals of the emitted rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub monthly_installment: Money,
    pub months_shown: u32,
    pub total_principal: Money,
    pub total_interest: Money,
    pub entries: Vec<ScheduleEntry>,
}

/// Build a schedule (full or preview) wrapped in the standard envelope.
pub fn analyze_schedule(input: &ScheduleInput) -> EngineResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings = input.terms.warnings();

    let walk = amortize(&input.terms)?;
    let monthly_installment = walk.installment();
    let limit = input.months.unwrap_or(input.terms.tenure_months);
    if limit > input.terms.tenure_months {
        warnings.push(format!(
            "Requested {limit} months; schedule ends after {}",
            input.terms.tenure_months
        ));
    }

    let entries: Vec<ScheduleEntry> = walk.take(limit as usize).collect::<EngineResult<_>>()?;
    let total_principal = checked_sum(
        entries.iter().map(|e| e.principal_portion),
        "schedule principal total",
    )?;
    let total_interest = checked_sum(
        entries.iter().map(|e| e.interest_portion),
        "schedule interest total",
    )?;

    let output = ScheduleOutput {
        monthly_installment,
        months_shown: entries.len() as u32,
        total_principal,
        total_interest,
        entries,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-installment amortization schedule",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Repayment progress
// ---------------------------------------------------------------------------

/// How far along a loan is after a number of scheduled payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentProgress {
    pub payments_made: u32,
    pub total_payments: u32,
    pub amount_paid: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub outstanding_balance: Money,
    /// Principal repaid as a percentage of the original principal.
    pub percent_complete: Decimal,
}

/// Totals paid and balance outstanding after `payments_made` installments.
pub fn repayment_progress(terms: &LoanTerms, payments_made: u32) -> EngineResult<RepaymentProgress> {
    terms.validate()?;
    if payments_made > terms.tenure_months {
        return Err(EngineError::InvalidInput {
            field: "payments_made".into(),
            reason: format!(
                "Payments made ({payments_made}) cannot exceed the tenure of {} months",
                terms.tenure_months
            ),
        });
    }

    let mut amount_paid = Decimal::ZERO;
    let mut principal_paid = Decimal::ZERO;
    let mut interest_paid = Decimal::ZERO;
    let mut outstanding_balance = terms.principal;

    for entry in amortize(terms)?.take(payments_made as usize) {
        let entry = entry?;
        amount_paid = checked(amount_paid.checked_add(entry.installment), "progress amount paid")?;
        principal_paid = checked(
            principal_paid.checked_add(entry.principal_portion),
            "progress principal paid",
        )?;
        interest_paid = checked(
            interest_paid.checked_add(entry.interest_portion),
            "progress interest paid",
        )?;
        outstanding_balance = entry.remaining_balance;
    }

    let repaid_share = checked(
        (terms.principal - outstanding_balance).checked_div(terms.principal),
        "progress percentage",
    )?;
    let percent_complete = checked(repaid_share.checked_mul(dec!(100)), "progress percentage")?
        .round_dp(2)
        .clamp(Decimal::ZERO, dec!(100));

    Ok(RepaymentProgress {
        payments_made,
        total_payments: terms.tenure_months,
        amount_paid,
        principal_paid,
        interest_paid,
        outstanding_balance,
        percent_complete,
    })
}

/// Input for a repayment progress request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressInput {
    pub terms: LoanTerms,
    pub payments_made: u32,
}

/// Repayment progress wrapped in the standard envelope.
pub fn analyze_progress(input: &ProgressInput) -> EngineResult<ComputationOutput<RepaymentProgress>> {
    let start = Instant::now();
    let result = repayment_progress(&input.terms, input.payments_made)?;
    let warnings = input.terms.warnings();
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Repayment progress from the fixed-installment schedule",
        input,
        warnings,
        elapsed,
        result,
    ))
}
