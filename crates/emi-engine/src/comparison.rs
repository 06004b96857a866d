//! Side-by-side loan comparison.
//!
//! A [`ComparisonSet`] holds at most [`MAX_COMPARISONS`] entries in insertion
//! order. Inserting into a full set is rejected; nothing is ever evicted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::amortization::emi::{compute_emi, EmiResult};
use crate::error::EngineError;
use crate::types::*;
use crate::EngineResult;

pub const MAX_COMPARISONS: usize = 3;

/// A loan held for comparison, with its EMI computed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub id: Uuid,
    pub label: String,
    pub terms: LoanTerms,
    pub emi: EmiResult,
    pub created_at: DateTime<Utc>,
}

impl ComparisonEntry {
    pub fn new(label: impl Into<String>, terms: LoanTerms) -> EngineResult<Self> {
        let emi = compute_emi(&terms)?;
        Ok(ComparisonEntry {
            id: Uuid::new_v4(),
            label: label.into(),
            terms,
            emi,
            created_at: Utc::now(),
        })
    }
}

/// Ordered, capacity-bounded set of loans under comparison.
///
/// Serialized as a plain list of entries; deserializing more than
/// [`MAX_COMPARISONS`] entries fails like [`ComparisonSet::add`] does.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ComparisonEntry>", into = "Vec<ComparisonEntry>")]
pub struct ComparisonSet {
    entries: Vec<ComparisonEntry>,
}

impl TryFrom<Vec<ComparisonEntry>> for ComparisonSet {
    type Error = EngineError;

    fn try_from(entries: Vec<ComparisonEntry>) -> Result<Self, Self::Error> {
        let mut set = ComparisonSet::new();
        for entry in entries {
            set.add(entry)?;
        }
        Ok(set)
    }
}

impl From<ComparisonSet> for Vec<ComparisonEntry> {
    fn from(set: ComparisonSet) -> Self {
        set.entries
    }
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Fails with `CapacityExceeded` on a full set, which is
    /// left unchanged.
    pub fn add(&mut self, entry: ComparisonEntry) -> EngineResult<&ComparisonEntry> {
        if self.entries.len() >= MAX_COMPARISONS {
            return Err(EngineError::CapacityExceeded {
                capacity: MAX_COMPARISONS,
            });
        }
        debug!(id = %entry.id, label = %entry.label, "loan added to comparison");
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn remove(&mut self, id: Uuid) -> EngineResult<ComparisonEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(EngineError::NotFound { id })?;
        Ok(self.entries.remove(index))
    }

    pub fn get(&self, id: Uuid) -> EngineResult<&ComparisonEntry> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or(EngineError::NotFound { id })
    }

    pub fn entries(&self) -> &[ComparisonEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_COMPARISONS
    }

    pub fn best(&self) -> Option<&ComparisonEntry> {
        best_of(&self.entries)
    }
}

fn cheapness(a: &ComparisonEntry, b: &ComparisonEntry) -> Ordering {
    a.emi
        .monthly_installment
        .cmp(&b.emi.monthly_installment)
        .then(a.emi.total_interest.cmp(&b.emi.total_interest))
}

/// Entry with the lowest installment, ties broken by lower total interest
/// and then by insertion order. `None` for an empty slice.
pub fn best_of(entries: &[ComparisonEntry]) -> Option<&ComparisonEntry> {
    entries.iter().reduce(|best, current| {
        if cheapness(current, best) == Ordering::Less {
            current
        } else {
            best
        }
    })
}

/// Entry with the highest installment, ties broken by higher total interest.
pub fn worst_of(entries: &[ComparisonEntry]) -> Option<&ComparisonEntry> {
    entries.iter().reduce(|worst, current| {
        if cheapness(current, worst) == Ordering::Greater {
            current
        } else {
            worst
        }
    })
}

/// Verdict over two or more loans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub best_id: Uuid,
    pub best_label: String,
    pub worst_id: Uuid,
    pub worst_label: String,
    /// Difference in total payment between the worst and best option.
    pub savings_amount: Money,
    pub loans_compared: usize,
}

pub fn compare_loans(entries: &[ComparisonEntry]) -> EngineResult<ComparisonSummary> {
    if entries.len() < 2 {
        return Err(EngineError::InsufficientData(
            "At least 2 loans are required for comparison".into(),
        ));
    }
    let (Some(best), Some(worst)) = (best_of(entries), worst_of(entries)) else {
        return Err(EngineError::InsufficientData(
            "At least 2 loans are required for comparison".into(),
        ));
    };

    let savings = checked(
        worst.emi.total_payment.checked_sub(best.emi.total_payment),
        "comparison savings",
    )?;

    Ok(ComparisonSummary {
        best_id: best.id,
        best_label: best.label.clone(),
        worst_id: worst.id,
        worst_label: worst.label.clone(),
        savings_amount: round_currency(savings),
        loans_compared: entries.len(),
    })
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A loan to compare, as supplied by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonCandidate {
    pub label: String,
    pub terms: LoanTerms,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub loans: Vec<ComparisonCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub entries: Vec<ComparisonEntry>,
    pub summary: ComparisonSummary,
}

/// Build a comparison set from candidates and summarise it.
pub fn analyze_comparison(
    input: &ComparisonInput,
) -> EngineResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let mut warnings = Vec::new();
    let mut set = ComparisonSet::new();

    for candidate in &input.loans {
        warnings.extend(
            candidate
                .terms
                .warnings()
                .into_iter()
                .map(|w| format!("{}: {w}", candidate.label)),
        );
        set.add(ComparisonEntry::new(
            candidate.label.clone(),
            candidate.terms.clone(),
        )?)?;
    }

    let summary = compare_loans(set.entries())?;
    if summary.savings_amount.is_zero() && summary.best_id != summary.worst_id {
        warnings.push("All compared loans cost the same in total".into());
    }
    let output = ComparisonOutput {
        entries: set.entries().to_vec(),
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan comparison by installment, then total interest",
        input,
        warnings,
        elapsed,
        output,
    ))
}
