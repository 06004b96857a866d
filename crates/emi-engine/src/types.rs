use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::EngineResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Loan parameters for a single calculation.
///
/// The annual rate is quoted in percent (8.5 = 8.5% p.a.), the way
/// borrowers read it off a loan offer. Use [`LoanTerms::monthly_rate`] for
/// the periodic decimal rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate_percent: Decimal,
    pub tenure_months: u32,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate_percent: Decimal, tenure_months: u32) -> Self {
        LoanTerms {
            principal,
            annual_rate_percent,
            tenure_months,
        }
    }

    /// Periodic (monthly) rate as a decimal: annual percent / 1200.
    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate_percent / dec!(1200)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(EngineError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.tenure_months == 0 {
            return Err(EngineError::InvalidInput {
                field: "tenure_months".into(),
                reason: "Tenure must be at least 1 month".into(),
            });
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(EngineError::InvalidInput {
                field: "annual_rate_percent".into(),
                reason: "Interest rate cannot be negative".into(),
            });
        }
        Ok(())
    }

    /// Non-fatal observations about unusual but accepted terms.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.annual_rate_percent > dec!(100) {
            warnings.push(format!(
                "Annual rate of {}% is unusually high",
                self.annual_rate_percent
            ));
        }
        if self.tenure_months > 360 {
            warnings.push(format!(
                "Tenure of {} months exceeds the usual 30-year maximum",
                self.tenure_months
            ));
        }
        warnings
    }
}

/// Round to whole currency units, halves away from zero.
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Surface a failed `checked_*` operation as [`EngineError::Overflow`].
pub(crate) fn checked(value: Option<Decimal>, context: &str) -> EngineResult<Decimal> {
    value.ok_or_else(|| EngineError::Overflow {
        context: context.into(),
    })
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
    pub rounding: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
            rounding: "whole_units_half_away_from_zero".to_string(),
        },
    }
}
