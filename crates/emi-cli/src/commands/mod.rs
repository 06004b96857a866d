pub mod comparison;
pub mod loan;
