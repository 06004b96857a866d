use clap::Args;
use serde_json::{json, Value};

use emi_engine::comparison::{self, ComparisonInput};
use emi_engine::presets::{default_presets, LoanCategory, LoanPreset, MemoryStore};

use crate::input;

/// Arguments for side-by-side loan comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON input file ({"loans": [{"label": ..., "terms": {...}}, ...]})
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let compare_input: ComparisonInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin JSON required for loan comparison".into());
    };
    let result = comparison::analyze_comparison(&compare_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for listing loan presets
#[derive(Args)]
pub struct PresetsArgs {
    /// Only list presets of this category (home, car, personal)
    #[arg(long)]
    pub category: Option<LoanCategory>,

    /// Path to a JSON array of presets replacing the built-in ones
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_presets(args: PresetsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = match args.input {
        Some(ref path) => {
            let presets: Vec<LoanPreset> = input::file::read_json(path)?;
            for preset in &presets {
                preset.terms.validate()?;
            }
            MemoryStore::from_presets(presets)
        }
        None => MemoryStore::from_presets(default_presets()),
    };

    let categories: Vec<LoanCategory> = match args.category {
        Some(category) => vec![category],
        None => LoanCategory::ALL.to_vec(),
    };
    let presets: Vec<&LoanPreset> = categories
        .into_iter()
        .flat_map(|category| store.presets(category))
        .collect();

    Ok(json!(presets))
}
