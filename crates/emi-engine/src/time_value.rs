use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::error::EngineError;
use crate::types::{checked, Money, Rate};
use crate::EngineResult;

/// Periodic rates at or below this are treated as zero. Below it the annuity
/// factor is indistinguishable from straight-line repayment at 28 digits.
pub const RATE_EPSILON: Decimal = dec!(0.000000000001);

/// Slack subtracted before taking the ceiling of a fractional period count,
/// so an exact integer that picked up ln() noise is not bumped up a month.
const PERIOD_TOLERANCE: Decimal = dec!(0.000000001);

/// Level payment that retires `present_value` over `nper` periods.
///
/// Returned as a positive amount. Computed as `pv * r / (1 - (1+r)^-n)` so
/// that a growth factor too large for Decimal degrades to the interest-only
/// limit. A payment that itself exceeds the Decimal range is an
/// [`EngineError::Overflow`].
pub fn pmt(rate: Rate, nper: u32, present_value: Money) -> EngineResult<Money> {
    if nper == 0 {
        return Err(EngineError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate < Decimal::ZERO {
        return Err(EngineError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate cannot be negative".into(),
        });
    }

    let periods = Decimal::from(nper);
    if rate <= RATE_EPSILON {
        return Ok(present_value / periods);
    }

    let growth = Decimal::ONE
        .checked_add(rate)
        .and_then(|base| base.checked_powu(u64::from(nper)));
    let discount = match growth {
        Some(growth) => Decimal::ONE / growth,
        None => Decimal::ZERO,
    };
    let annuity_denominator = Decimal::ONE - discount;

    if annuity_denominator.is_zero() {
        return Ok(present_value / periods);
    }

    let interest_only = checked(present_value.checked_mul(rate), "PMT interest")?;
    checked(interest_only.checked_div(annuity_denominator), "PMT annuity")
}

/// Whole periods left on a `balance` repaid by a level `payment`.
///
/// `n = ln(1 + balance * r / payment) / ln(1 + r)`, rounded up, and
/// `balance / payment` at a zero rate. This runs shorter than the exact
/// annuity inverse. Fails with `NoConvergence` when the payment does not
/// exceed the interest accruing on the balance.
pub fn nper(rate: Rate, payment: Money, balance: Money) -> EngineResult<u32> {
    if balance <= Decimal::ZERO {
        return Ok(0);
    }
    if rate < Decimal::ZERO {
        return Err(EngineError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate cannot be negative".into(),
        });
    }

    let interest_only = checked(balance.checked_mul(rate), "NPER interest")?;
    if payment <= interest_only || payment <= Decimal::ZERO {
        warn!(%payment, %interest_only, "payment does not cover accruing interest");
        return Err(EngineError::NoConvergence {
            installment: payment,
            interest_only,
        });
    }

    let periods = if rate <= RATE_EPSILON {
        checked(balance.checked_div(payment), "NPER periods")?
    } else {
        let growth_log = checked(Decimal::ONE.checked_add(rate), "NPER growth factor")?.ln();
        if growth_log.is_zero() {
            return Err(EngineError::DivisionByZero {
                context: "NPER log growth factor".into(),
            });
        }
        (Decimal::ONE + interest_only / payment).ln() / growth_log
    };

    let whole = (periods - PERIOD_TOLERANCE).ceil().max(Decimal::ONE);
    whole.to_u32().ok_or_else(|| EngineError::InvalidInput {
        field: "balance".into(),
        reason: format!("Period count {whole} exceeds the supported range"),
    })
}
