//! Depreciation schedules, book values and pre-depreciation re-basing.
//!
//! Everything in here is a pure function of its inputs: schedules are
//! recomputed on demand from [`AssetFinancials`] and never mutated after
//! generation.

pub mod analysis;
pub mod book_value;
pub mod pre_depreciation;
pub mod schedule;

#[cfg(test)]
mod props;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::FixedAssetError;
use crate::types::{Money, RatePct};
use crate::FixedAssetResult;

pub use analysis::{analyze_depreciation, DepreciationAnalysis, DepreciationInput};
pub use book_value::{annual_summary, value_as_of, AnnualDepreciation, BookValue};
pub use pre_depreciation::{adjust, PreDepreciationAdjustment, PriorAccrual};
pub use schedule::{
    generate_schedule, generate_schedule_with_usage, monthly_depreciation_estimate,
    validate_financials,
};

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Depreciation method with the data each method needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DepreciationMethod {
    StraightLine,
    DecliningBalance {
        /// Annual rate in percent. Defaults to 200% / useful life in years.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rate_override: Option<RatePct>,
        /// Charge straight-line over the remaining life once that exceeds
        /// the declining charge.
        #[serde(default)]
        switch_to_straight_line: bool,
    },
    SumOfYearsDigits,
    UnitsOfProduction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total_expected_units: Option<u64>,
    },
}

impl DepreciationMethod {
    pub fn label(&self) -> &'static str {
        match self {
            DepreciationMethod::StraightLine => "Straight-Line",
            DepreciationMethod::DecliningBalance { .. } => "Declining Balance",
            DepreciationMethod::SumOfYearsDigits => "Sum-of-Years' Digits",
            DepreciationMethod::UnitsOfProduction { .. } => "Units of Production",
        }
    }
}

impl std::fmt::Display for DepreciationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Financial parameters of a single asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFinancials {
    /// Original (or original-equivalent) cost basis
    pub acquisition_cost: Money,
    /// Floor below which book value never falls
    #[serde(default)]
    pub salvage_value: Money,
    /// Total depreciable life in months
    pub useful_life_months: u32,
    pub method: DepreciationMethod,
    /// First day of the first depreciation period
    pub start_date: NaiveDate,
}

impl AssetFinancials {
    /// Cost minus salvage: the total amount that may be expensed.
    pub fn depreciable_base(&self) -> Money {
        self.acquisition_cost - self.salvage_value
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One period of a depreciation schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Period number (1-indexed)
    pub period_index: u32,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub period_depreciation: Money,
    pub accumulated_depreciation: Money,
    pub ending_book_value: Money,
    /// Units reported for the period (units-of-production only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units_consumed: Option<u64>,
    /// No usage was reported; the zero charge needs follow-up
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub usage_missing: bool,
}

/// Entry book value disagrees with cost minus prior depreciation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookValueMismatch {
    pub implied_book_value: Money,
    pub entry_book_value: Money,
    pub difference: Money,
    pub tolerance: Money,
}

/// Non-fatal conditions raised while building a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleNotice {
    /// Units-of-production usage missing for a period, or for the whole
    /// schedule when `period_index` is `None`.
    InsufficientUsageData { period_index: Option<u32> },
    BookValueMismatch(BookValueMismatch),
}

impl std::fmt::Display for ScheduleNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleNotice::InsufficientUsageData { period_index: None } => write!(
                f,
                "No unit usage reported; units-of-production schedule is empty"
            ),
            ScheduleNotice::InsufficientUsageData {
                period_index: Some(p),
            } => write!(
                f,
                "Period {p} has no reported unit usage; charged zero pending follow-up"
            ),
            ScheduleNotice::BookValueMismatch(m) => write!(
                f,
                "Entry book value {} differs from implied book value {} by {} (tolerance {})",
                m.entry_book_value, m.implied_book_value, m.difference, m.tolerance
            ),
        }
    }
}

/// A generated depreciation schedule together with the basis it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationSchedule {
    pub method: String,
    pub acquisition_cost: Money,
    pub salvage_value: Money,
    pub depreciable_base: Money,
    pub start_date: NaiveDate,
    pub entries: Vec<ScheduleEntry>,
    pub notices: Vec<ScheduleNotice>,
}

impl DepreciationSchedule {
    pub(crate) fn empty(
        method: &DepreciationMethod,
        acquisition_cost: Money,
        salvage_value: Money,
        start_date: NaiveDate,
    ) -> Self {
        DepreciationSchedule {
            method: method.label().to_string(),
            acquisition_cost,
            salvage_value,
            depreciable_base: acquisition_cost - salvage_value,
            start_date,
            entries: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_depreciation(&self) -> Money {
        self.entries
            .last()
            .map(|e| e.accumulated_depreciation)
            .unwrap_or_default()
    }

    pub fn final_book_value(&self) -> Money {
        self.entries
            .last()
            .map(|e| e.ending_book_value)
            .unwrap_or(self.acquisition_cost)
    }

    /// Notices rendered for the output envelope.
    pub fn warnings(&self) -> Vec<String> {
        self.notices.iter().map(|n| n.to_string()).collect()
    }
}

// ---------------------------------------------------------------------------
// Period dates
// ---------------------------------------------------------------------------

/// Start of period `index` (1-indexed), always offset from the original start
/// so month-end clamping never drifts.
pub(crate) fn period_start(start_date: NaiveDate, index: u32) -> FixedAssetResult<NaiveDate> {
    add_months(start_date, index.saturating_sub(1))
}

pub(crate) fn period_bounds(
    start_date: NaiveDate,
    index: u32,
) -> FixedAssetResult<(NaiveDate, NaiveDate)> {
    let start = period_start(start_date, index)?;
    let end = add_months(start_date, index)?
        .pred_opt()
        .ok_or_else(|| FixedAssetError::DateError(format!("period {index} end underflows")))?;
    Ok((start, end))
}

pub(crate) fn add_months(date: NaiveDate, months: u32) -> FixedAssetResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| FixedAssetError::DateError(format!("{date} + {months} months overflows")))
}
