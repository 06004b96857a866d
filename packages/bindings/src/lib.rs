use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use emi_engine::amortization::{emi, prepayment, schedule};
use emi_engine::comparison;
use emi_engine::presets::{default_presets, LoanCategory, LoanPreset, MemoryStore};
use emi_engine::LoanTerms;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_emi(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = emi::analyze_emi(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::analyze_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_prepayment(input_json: String) -> NapiResult<String> {
    let input: prepayment::PrepaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = prepayment::analyze_prepayment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn repayment_progress(input_json: String) -> NapiResult<String> {
    let input: schedule::ProgressInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::analyze_progress(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Comparison & presets
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_loans(input_json: String) -> NapiResult<String> {
    let input: comparison::ComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = comparison::analyze_comparison(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct PresetsRequest {
    #[serde(default)]
    category: Option<LoanCategory>,
}

/// `{"category": "home"}` lists one category; `{}` lists all of them.
#[napi]
pub fn load_presets(input_json: String) -> NapiResult<String> {
    let request: PresetsRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let store = MemoryStore::from_presets(default_presets());
    let presets: Vec<&LoanPreset> = match request.category {
        Some(category) => store.presets(category),
        None => LoanCategory::ALL
            .into_iter()
            .flat_map(|category| store.presets(category))
            .collect(),
    };
    serde_json::to_string(&presets).map_err(to_napi_error)
}
