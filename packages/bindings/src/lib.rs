use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use fixed_asset_core::depreciation::{self, AssetFinancials, DepreciationInput, PriorAccrual};
use fixed_asset_core::register::{self, RegisterInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Depreciation
// ---------------------------------------------------------------------------

/// Schedule, monthly preview, yearly summary and optional book value.
#[napi]
pub fn depreciation_schedule(input_json: String) -> NapiResult<String> {
    let input: DepreciationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = depreciation::analyze_depreciation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Book value only; `as_of` is required.
#[napi]
pub fn book_value_as_of(input_json: String) -> NapiResult<String> {
    let input: DepreciationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    if input.as_of.is_none() {
        return Err(to_napi_error("as_of is required for a book value lookup"));
    }
    let output = depreciation::analyze_depreciation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output.result.book_value).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct AdjustInput {
    financials: AssetFinancials,
    prior_accrual: PriorAccrual,
}

#[napi]
pub fn adjust_for_prior_depreciation(input_json: String) -> NapiResult<String> {
    let input: AdjustInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        depreciation::adjust(&input.financials, &input.prior_accrual).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

#[napi]
pub fn book_value_register(input_json: String) -> NapiResult<String> {
    let input: RegisterInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = register::book_value_register(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
