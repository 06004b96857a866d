//! Lump-sum prepayment analysis.
//!
//! A prepayment is applied right after the installment of `apply_at_month`.
//! The installment stays fixed and the tenure shrinks. The installments left
//! on the reduced balance come from the closed-form estimate in
//! [`time_value::nper`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::schedule::amortize;
use crate::error::EngineError;
use crate::time_value;
use crate::types::*;
use crate::EngineResult;

/// A single extra principal payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepaymentPlan {
    pub extra_amount: Money,
    /// 1-based month after whose installment the extra amount is paid.
    pub apply_at_month: u32,
}

/// Effect of a prepayment on cost and tenure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepaymentOutcome {
    pub interest_saved: Money,
    pub revised_tenure_months: u32,
    pub months_saved: u32,
    /// Outstanding balance after the installment of `apply_at_month`,
    /// before any extra amount is applied, rounded.
    pub balance_at_apply_month: Money,
    /// Portion of the extra amount that actually reduced the balance.
    pub amount_applied: Money,
    pub fully_retired: bool,
}

impl PrepaymentPlan {
    pub fn validate(&self, terms: &LoanTerms) -> EngineResult<()> {
        if self.extra_amount < Decimal::ZERO {
            return Err(EngineError::InvalidInput {
                field: "extra_amount".into(),
                reason: "Prepayment amount cannot be negative".into(),
            });
        }
        if self.apply_at_month == 0 || self.apply_at_month > terms.tenure_months {
            return Err(EngineError::InvalidInput {
                field: "apply_at_month".into(),
                reason: format!(
                    "Prepayment month must be between 1 and {}",
                    terms.tenure_months
                ),
            });
        }
        Ok(())
    }
}

/// Interest saved and revised tenure for a lump-sum prepayment.
pub fn simulate_prepayment(
    terms: &LoanTerms,
    plan: &PrepaymentPlan,
) -> EngineResult<PrepaymentOutcome> {
    terms.validate()?;
    plan.validate(terms)?;

    let mut walk = amortize(terms)?;
    let installment = walk.installment();
    for entry in walk.by_ref().take(plan.apply_at_month as usize) {
        entry?;
    }
    let balance_at_apply = walk.outstanding().max(Decimal::ZERO);

    if plan.extra_amount.is_zero() {
        return Ok(PrepaymentOutcome {
            interest_saved: Decimal::ZERO,
            revised_tenure_months: terms.tenure_months,
            months_saved: 0,
            balance_at_apply_month: round_currency(balance_at_apply),
            amount_applied: Decimal::ZERO,
            fully_retired: false,
        });
    }

    let reduced_balance = balance_at_apply - plan.extra_amount;
    let installments = |months: u32, context: &str| {
        checked(installment.checked_mul(Decimal::from(months)), context)
    };
    let paid_before = installments(plan.apply_at_month, "prepayment paid before")?;
    let original_total = installments(terms.tenure_months, "prepayment original total")?;

    if reduced_balance <= Decimal::ZERO {
        debug!(
            apply_at_month = plan.apply_at_month,
            %balance_at_apply,
            "prepayment retires the loan"
        );
        let revised_total = checked(
            paid_before.checked_add(balance_at_apply),
            "prepayment revised total",
        )?;
        let saved = original_total - revised_total;
        return Ok(PrepaymentOutcome {
            interest_saved: round_currency(saved.max(Decimal::ZERO)),
            revised_tenure_months: plan.apply_at_month,
            months_saved: terms.tenure_months - plan.apply_at_month,
            balance_at_apply_month: round_currency(balance_at_apply),
            amount_applied: balance_at_apply,
            fully_retired: true,
        });
    }

    let remaining = time_value::nper(terms.monthly_rate(), installment, reduced_balance)?;
    let revised_tenure_months = plan.apply_at_month.saturating_add(remaining);
    debug!(
        apply_at_month = plan.apply_at_month,
        remaining,
        revised_tenure_months,
        "prepayment shortens tenure"
    );

    let revised_total = installments(remaining, "prepayment remaining installments")?
        .checked_add(paid_before)
        .and_then(|total| total.checked_add(plan.extra_amount));
    let revised_total = checked(revised_total, "prepayment revised total")?;
    let saved = original_total - revised_total;

    Ok(PrepaymentOutcome {
        interest_saved: round_currency(saved.max(Decimal::ZERO)),
        revised_tenure_months,
        months_saved: terms.tenure_months.saturating_sub(revised_tenure_months),
        balance_at_apply_month: round_currency(balance_at_apply),
        amount_applied: plan.extra_amount,
        fully_retired: false,
    })
}

/// Input for a prepayment analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentInput {
    pub terms: LoanTerms,
    pub plan: PrepaymentPlan,
}

/// Prepayment analysis wrapped in the standard envelope.
pub fn analyze_prepayment(
    input: &PrepaymentInput,
) -> EngineResult<ComputationOutput<PrepaymentOutcome>> {
    let start = Instant::now();
    let mut warnings = input.terms.warnings();

    let outcome = simulate_prepayment(&input.terms, &input.plan)?;

    if outcome.amount_applied < input.plan.extra_amount {
        warnings.push(format!(
            "Only {} of the {} prepayment is needed to retire the loan",
            outcome.amount_applied.round_dp(2),
            input.plan.extra_amount
        ));
    }
    if !input.plan.extra_amount.is_zero() && outcome.months_saved == 0 {
        warnings.push("Prepayment is too small to shorten the tenure".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Lump-sum prepayment with fixed installment (tenure reduction)",
        input,
        warnings,
        elapsed,
        outcome,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn home_loan() -> LoanTerms {
        LoanTerms::new(dec!(2500000), dec!(8.5), 240)
    }

    fn plan(extra_amount: Money, apply_at_month: u32) -> PrepaymentPlan {
        PrepaymentPlan {
            extra_amount,
            apply_at_month,
        }
    }

    #[test]
    fn test_home_loan_lump_sum_after_first_year() {
        let outcome = simulate_prepayment(&home_loan(), &plan(dec!(500000), 12)).unwrap();
        // ln(1 + 1950239.04 * r / 21696) / ln(1 + r) = 69.8 installments left
        assert_eq!(outcome.revised_tenure_months, 82);
        assert_eq!(outcome.months_saved, 158);
        assert_eq!(outcome.interest_saved, dec!(2927968));
        assert_eq!(outcome.balance_at_apply_month, dec!(2450239));
        assert!(!outcome.fully_retired);
    }

    #[test]
    fn test_smaller_prepayment_later() {
        let outcome = simulate_prepayment(&home_loan(), &plan(dec!(100000), 24)).unwrap();
        assert_eq!(outcome.revised_tenure_months, 104);
        assert_eq!(outcome.interest_saved, dec!(2850656));
    }

    #[test]
    fn test_zero_extra_is_noop() {
        let outcome = simulate_prepayment(&home_loan(), &plan(Decimal::ZERO, 12)).unwrap();
        assert_eq!(outcome.revised_tenure_months, 240);
        assert_eq!(outcome.interest_saved, Decimal::ZERO);
        assert_eq!(outcome.months_saved, 0);
        assert_eq!(outcome.balance_at_apply_month, dec!(2450239));
        assert_eq!(outcome.amount_applied, Decimal::ZERO);
    }

    #[test]
    fn test_full_retirement() {
        let terms = LoanTerms::new(dec!(100000), dec!(12), 12);
        let outcome = simulate_prepayment(&terms, &plan(dec!(200000), 6)).unwrap();
        assert!(outcome.fully_retired);
        assert_eq!(outcome.revised_tenure_months, 6);
        assert_eq!(outcome.balance_at_apply_month, dec!(51491));
        // 8885 * 12 - (8885 * 6 + 51491.36)
        assert_eq!(outcome.interest_saved, dec!(1819));
        assert!(outcome.amount_applied < dec!(200000));
    }

    #[test]
    fn test_savings_clamped_at_zero() {
        // Charging the last, partial installment in full makes the raw
        // figure negative; it must not surface as a cost increase.
        let terms = LoanTerms::new(dec!(100000), dec!(12), 12);
        let outcome = simulate_prepayment(&terms, &plan(dec!(50000), 6)).unwrap();
        assert_eq!(outcome.revised_tenure_months, 7);
        assert_eq!(outcome.interest_saved, Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_prepayment() {
        let terms = LoanTerms::new(dec!(120000), Decimal::ZERO, 12);
        let outcome = simulate_prepayment(&terms, &plan(dec!(30000), 3)).unwrap();
        assert_eq!(outcome.revised_tenure_months, 9);
        assert_eq!(outcome.interest_saved, Decimal::ZERO);
    }

    #[test]
    fn test_prepayment_in_final_month() {
        let terms = LoanTerms::new(dec!(100000), dec!(12), 12);
        let outcome = simulate_prepayment(&terms, &plan(dec!(1000), 12)).unwrap();
        assert!(outcome.fully_retired);
        assert_eq!(outcome.revised_tenure_months, 12);
    }

    #[test]
    fn test_rounded_down_installment_does_not_converge() {
        // Installment rounds to 0 on a tiny principal; nothing ever amortizes
        let terms = LoanTerms::new(dec!(1), dec!(12), 360);
        let err = simulate_prepayment(&terms, &plan(dec!(0.1), 1)).unwrap_err();
        assert!(matches!(err, EngineError::NoConvergence { .. }));
    }

    #[test]
    fn test_unrepresentable_totals_are_an_error() {
        let terms = LoanTerms::new(dec!(1000000000000000000000000000), dec!(1000), 480);
        let err = simulate_prepayment(&terms, &plan(dec!(1000), 12)).unwrap_err();
        assert!(matches!(err, EngineError::Overflow { .. }));
    }

    #[test]
    fn test_invalid_plans() {
        let terms = home_loan();
        assert!(simulate_prepayment(&terms, &plan(dec!(1000), 0)).is_err());
        assert!(simulate_prepayment(&terms, &plan(dec!(1000), 241)).is_err());
        assert!(simulate_prepayment(&terms, &plan(dec!(-1), 12)).is_err());
    }

    #[test]
    fn test_envelope_warns_on_excess_prepayment() {
        let input = PrepaymentInput {
            terms: LoanTerms::new(dec!(100000), dec!(12), 12),
            plan: plan(dec!(200000), 6),
        };
        let out = analyze_prepayment(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.result.fully_retired);
    }
}
