pub mod amortization;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "comparison")]
pub mod comparison;

#[cfg(feature = "presets")]
pub mod presets;

pub use amortization::emi::{compute_emi, EmiResult};
pub use amortization::prepayment::{simulate_prepayment, PrepaymentOutcome, PrepaymentPlan};
pub use amortization::schedule::{
    amortize, generate_schedule, repayment_progress, schedule_preview, RepaymentProgress,
    ScheduleEntry,
};
#[cfg(feature = "comparison")]
pub use comparison::{best_of, compare_loans, ComparisonEntry, ComparisonSet};
pub use error::EngineError;
pub use types::*;

/// Standard result type for all engine operations
pub type EngineResult<T> = Result<T, EngineError>;
