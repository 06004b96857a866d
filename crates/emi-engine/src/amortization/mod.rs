pub mod emi;
pub mod prepayment;
pub mod schedule;
