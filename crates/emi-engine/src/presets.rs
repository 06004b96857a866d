//! Named loan presets and the storage seam for saved comparisons.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use crate::comparison::ComparisonEntry;
use crate::error::EngineError;
use crate::types::LoanTerms;
use crate::EngineResult;

/// Kind of loan a preset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanCategory {
    Home,
    Car,
    Personal,
}

impl LoanCategory {
    pub const ALL: [LoanCategory; 3] = [LoanCategory::Home, LoanCategory::Car, LoanCategory::Personal];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanCategory::Home => "home",
            LoanCategory::Car => "car",
            LoanCategory::Personal => "personal",
        }
    }
}

impl fmt::Display for LoanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(LoanCategory::Home),
            "car" => Ok(LoanCategory::Car),
            "personal" => Ok(LoanCategory::Personal),
            other => Err(EngineError::InvalidInput {
                field: "category".into(),
                reason: format!("Unknown loan category '{other}' (expected home, car or personal)"),
            }),
        }
    }
}

/// A named starting point for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPreset {
    pub category: LoanCategory,
    pub name: String,
    pub terms: LoanTerms,
}

impl LoanPreset {
    fn new(category: LoanCategory, name: &str, principal: Decimal, rate: Decimal, tenure: u32) -> Self {
        LoanPreset {
            category,
            name: name.into(),
            terms: LoanTerms::new(principal, rate, tenure),
        }
    }
}

/// Built-in presets, two per category.
pub fn default_presets() -> Vec<LoanPreset> {
    vec![
        LoanPreset::new(LoanCategory::Home, "Starter home", dec!(2500000), dec!(8.5), 240),
        LoanPreset::new(LoanCategory::Home, "Family home", dec!(5000000), dec!(8.75), 300),
        LoanPreset::new(LoanCategory::Car, "Hatchback", dec!(800000), dec!(9.5), 60),
        LoanPreset::new(LoanCategory::Car, "SUV", dec!(1500000), dec!(10), 84),
        LoanPreset::new(LoanCategory::Personal, "Short term", dec!(300000), dec!(12), 36),
        LoanPreset::new(LoanCategory::Personal, "Debt consolidation", dec!(500000), dec!(13.5), 60),
    ]
}

/// Storage for presets and saved comparisons.
pub trait LoanStore {
    fn load_presets(&self, category: LoanCategory) -> EngineResult<Vec<LoanTerms>>;

    fn save_comparison(&mut self, entry: ComparisonEntry) -> EngineResult<Uuid>;

    /// Fails with `NotFound` when no comparison has this id.
    fn delete_comparison(&mut self, id: Uuid) -> EngineResult<()>;
}

/// In-process [`LoanStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    presets: Vec<LoanPreset>,
    comparisons: Vec<ComparisonEntry>,
}

impl MemoryStore {
    pub fn from_presets(presets: Vec<LoanPreset>) -> Self {
        MemoryStore {
            presets,
            comparisons: Vec::new(),
        }
    }

    pub fn with_default_presets() -> Self {
        Self::from_presets(default_presets())
    }

    /// Presets of one category with their names.
    pub fn presets(&self, category: LoanCategory) -> Vec<&LoanPreset> {
        self.presets.iter().filter(|p| p.category == category).collect()
    }

    pub fn comparisons(&self) -> &[ComparisonEntry] {
        &self.comparisons
    }
}

impl LoanStore for MemoryStore {
    fn load_presets(&self, category: LoanCategory) -> EngineResult<Vec<LoanTerms>> {
        Ok(self
            .presets
            .iter()
            .filter(|p| p.category == category)
            .map(|p| p.terms.clone())
            .collect())
    }

    fn save_comparison(&mut self, entry: ComparisonEntry) -> EngineResult<Uuid> {
        let id = entry.id;
        self.comparisons.push(entry);
        debug!(%id, stored = self.comparisons.len(), "comparison saved");
        Ok(id)
    }

    fn delete_comparison(&mut self, id: Uuid) -> EngineResult<()> {
        let index = self
            .comparisons
            .iter()
            .position(|c| c.id == id)
            .ok_or(EngineError::NotFound { id })?;
        self.comparisons.remove(index);
        Ok(())
    }
}
