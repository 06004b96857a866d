use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value;
use crate::types::*;
use crate::EngineResult;

/// Installment and lifetime totals for a loan.
///
/// Totals are derived from the rounded installment so they agree with what
/// a schedule table built from the same installment shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmiResult {
    pub monthly_installment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
}

/// Equated monthly installment for the given terms.
pub fn compute_emi(terms: &LoanTerms) -> EngineResult<EmiResult> {
    terms.validate()?;

    let monthly_installment = fixed_installment(terms)?;
    let total_payment = checked(
        monthly_installment.checked_mul(Decimal::from(terms.tenure_months)),
        "EMI total payment",
    )?;
    let total_interest = round_currency(total_payment - terms.principal);

    Ok(EmiResult {
        monthly_installment,
        total_interest,
        total_payment,
    })
}

/// Rounded installment held constant across the schedule.
pub(crate) fn fixed_installment(terms: &LoanTerms) -> EngineResult<Money> {
    let raw = time_value::pmt(terms.monthly_rate(), terms.tenure_months, terms.principal)?;
    Ok(round_currency(raw))
}

/// EMI wrapped in the standard output envelope.
pub fn analyze_emi(terms: &LoanTerms) -> EngineResult<ComputationOutput<EmiResult>> {
    let start = Instant::now();
    let result = compute_emi(terms)?;
    let warnings = terms.warnings();

    let methodology = if terms.monthly_rate() <= time_value::RATE_EPSILON {
        "EMI (zero-rate straight-line repayment)"
    } else {
        "EMI (level-payment annuity)"
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, terms, warnings, elapsed, result))
}
