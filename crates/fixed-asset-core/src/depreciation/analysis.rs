use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::book_value::{annual_summary, value_as_of, AnnualDepreciation, BookValue};
use super::pre_depreciation::{adjust, PreDepreciationAdjustment, PriorAccrual};
use super::schedule::generate_schedule_with_usage;
use super::{AssetFinancials, DepreciationSchedule};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FixedAssetResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationInput {
    pub financials: AssetFinancials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_accrual: Option<PriorAccrual>,
    /// Per-period units for units-of-production; `null` marks a missing report
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unit_usage: Vec<Option<u64>>,
    /// Report date for the book value lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationAnalysis {
    /// First-period charge of the (remaining) schedule
    pub monthly_estimate: Money,
    pub schedule: DepreciationSchedule,
    pub annual_summary: Vec<AnnualDepreciation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_value: Option<BookValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<PreDepreciationAdjustment>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Preview and reporting in one call: re-base for prior accrual when given,
/// generate the schedule, summarise it by year and look up the book value.
pub fn analyze_depreciation(
    input: &DepreciationInput,
) -> FixedAssetResult<ComputationOutput<DepreciationAnalysis>> {
    let start = Instant::now();

    let (schedule, adjustment) = match &input.prior_accrual {
        Some(prior) => {
            let adjustment = adjust(&input.financials, prior)?;
            let schedule = adjustment.remaining_schedule(&input.unit_usage)?;
            (schedule, Some(adjustment))
        }
        None => (
            generate_schedule_with_usage(&input.financials, &input.unit_usage)?,
            None,
        ),
    };

    let monthly_estimate = schedule
        .entries
        .first()
        .map(|e| e.period_depreciation)
        .unwrap_or_default();
    let book_value = input.as_of.map(|date| value_as_of(&schedule, date));
    let warnings = schedule.warnings();

    let methodology = if adjustment.is_some() {
        format!(
            "{} depreciation, re-based on entry book value for prior accrual",
            input.financials.method
        )
    } else {
        format!("{} depreciation", input.financials.method)
    };

    let output = DepreciationAnalysis {
        monthly_estimate,
        annual_summary: annual_summary(&schedule),
        schedule,
        book_value,
        adjustment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &methodology,
        &serde_json::json!({
            "method": input.financials.method,
            "acquisition_cost": input.financials.acquisition_cost.to_string(),
            "salvage_value": input.financials.salvage_value.to_string(),
            "useful_life_months": input.financials.useful_life_months,
            "start_date": input.financials.start_date,
            "currency_precision_dp": crate::types::CURRENCY_DP,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depreciation::DepreciationMethod;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn input() -> DepreciationInput {
        DepreciationInput {
            financials: AssetFinancials {
                acquisition_cost: dec!(120000),
                salvage_value: dec!(0),
                useful_life_months: 60,
                method: DepreciationMethod::StraightLine,
                start_date: d(2024, 1, 1),
            },
            prior_accrual: None,
            unit_usage: Vec::new(),
            as_of: Some(d(2024, 6, 30)),
        }
    }

    #[test]
    fn test_analysis_preview_and_book_value() {
        let out = analyze_depreciation(&input()).unwrap();
        let r = &out.result;

        assert_eq!(r.monthly_estimate, dec!(2000));
        assert_eq!(r.schedule.entries.len(), 60);
        assert_eq!(r.annual_summary.len(), 5);
        let bv = r.book_value.as_ref().unwrap();
        assert_eq!(bv.book_value, dec!(108000));
        assert!(out.warnings.is_empty());
        assert_eq!(out.methodology, "Straight-Line depreciation");
    }

    #[test]
    fn test_analysis_with_prior_accrual_surfaces_mismatch() {
        let mut i = input();
        i.financials.acquisition_cost = dec!(50000);
        i.prior_accrual = Some(PriorAccrual {
            prior_depreciation_amount: dec!(21000),
            prior_depreciation_months: 24,
            entry_book_value: dec!(30000),
            tolerance: None,
            entry_date: None,
        });
        i.as_of = None;

        let out = analyze_depreciation(&i).unwrap();
        assert_eq!(out.result.monthly_estimate, dec!(833.33));
        assert!(out.result.adjustment.is_some());
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("differs from implied book value"));
    }

    #[test]
    fn test_analysis_serializes_to_json() {
        let out = analyze_depreciation(&input()).unwrap();
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["result"]["schedule"]["method"], "Straight-Line");
        assert_eq!(value["assumptions"]["method"]["type"], "straight_line");
    }
}
