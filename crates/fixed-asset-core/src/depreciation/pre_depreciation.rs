//! Re-basing of assets that enter the register with depreciation already
//! accrued under a prior regime.
//!
//! The asserted entry book value becomes the new acquisition cost and the
//! remaining months become the new useful life, so the regular schedule
//! generator covers the future periods unchanged.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::schedule::{generate_schedule_with_usage, validate_financials};
use super::{
    add_months, AssetFinancials, BookValueMismatch, DepreciationMethod, DepreciationSchedule,
    ScheduleNotice,
};
use crate::error::FixedAssetError;
use crate::types::{Money, DEFAULT_BOOK_VALUE_TOLERANCE};
use crate::FixedAssetResult;

/// Depreciation recognised before the asset entered the register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorAccrual {
    pub prior_depreciation_amount: Money,
    pub prior_depreciation_months: u32,
    /// Book value asserted at entry
    pub entry_book_value: Money,
    /// Allowed gap between asserted and implied book value (default 0.01)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<Money>,
    /// First period of the remaining schedule. Defaults to the original
    /// start date advanced by the prior months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<NaiveDate>,
}

/// Result of re-basing an asset for its prior accrual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreDepreciationAdjustment {
    pub remaining_useful_life_months: u32,
    /// Original cost minus prior depreciation
    pub implied_book_value: Money,
    pub entry_book_value: Money,
    pub entry_date: NaiveDate,
    pub salvage_value: Money,
    pub method: DepreciationMethod,
    /// Re-based financials for the future periods; `None` once the useful
    /// life is used up.
    pub financials: Option<AssetFinancials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_value_mismatch: Option<BookValueMismatch>,
}

impl PreDepreciationAdjustment {
    pub fn is_exhausted(&self) -> bool {
        self.financials.is_none()
    }

    /// Schedule for the periods after entry. Empty when the life is used up.
    /// A book value mismatch is carried into the schedule's notices.
    pub fn remaining_schedule(
        &self,
        unit_usage: &[Option<u64>],
    ) -> FixedAssetResult<DepreciationSchedule> {
        let mut schedule = match &self.financials {
            Some(financials) => generate_schedule_with_usage(financials, unit_usage)?,
            None => DepreciationSchedule::empty(
                &self.method,
                self.entry_book_value,
                self.salvage_value,
                self.entry_date,
            ),
        };
        if let Some(mismatch) = &self.book_value_mismatch {
            schedule
                .notices
                .insert(0, ScheduleNotice::BookValueMismatch(mismatch.clone()));
        }
        Ok(schedule)
    }
}

/// Re-base `original` for depreciation already accrued before entry.
pub fn adjust(
    original: &AssetFinancials,
    prior: &PriorAccrual,
) -> FixedAssetResult<PreDepreciationAdjustment> {
    validate_financials(original)?;
    validate_prior(original, prior)?;

    let remaining_useful_life_months = original
        .useful_life_months
        .saturating_sub(prior.prior_depreciation_months);
    let implied_book_value = original.acquisition_cost - prior.prior_depreciation_amount;

    let tolerance = prior.tolerance.unwrap_or(DEFAULT_BOOK_VALUE_TOLERANCE);
    let difference = (implied_book_value - prior.entry_book_value).abs();
    let book_value_mismatch = if difference > tolerance {
        warn!(
            implied = %implied_book_value,
            entry = %prior.entry_book_value,
            %difference,
            "entry book value differs from implied book value"
        );
        Some(BookValueMismatch {
            implied_book_value,
            entry_book_value: prior.entry_book_value,
            difference,
            tolerance,
        })
    } else {
        None
    };

    let entry_date = match prior.entry_date {
        Some(date) => date,
        None => add_months(original.start_date, prior.prior_depreciation_months)?,
    };

    let financials = (remaining_useful_life_months > 0).then(|| AssetFinancials {
        acquisition_cost: prior.entry_book_value,
        salvage_value: original.salvage_value,
        useful_life_months: remaining_useful_life_months,
        method: original.method.clone(),
        start_date: entry_date,
    });

    Ok(PreDepreciationAdjustment {
        remaining_useful_life_months,
        implied_book_value,
        entry_book_value: prior.entry_book_value,
        entry_date,
        salvage_value: original.salvage_value,
        method: original.method.clone(),
        financials,
        book_value_mismatch,
    })
}

fn validate_prior(original: &AssetFinancials, prior: &PriorAccrual) -> FixedAssetResult<()> {
    if prior.prior_depreciation_amount < Decimal::ZERO {
        return Err(FixedAssetError::invalid(
            "prior_depreciation_amount",
            "Prior depreciation cannot be negative",
        ));
    }
    if prior.entry_book_value < original.salvage_value {
        return Err(FixedAssetError::invalid(
            "entry_book_value",
            "Entry book value cannot be below salvage value",
        ));
    }
    if matches!(prior.tolerance, Some(t) if t < Decimal::ZERO) {
        return Err(FixedAssetError::invalid(
            "tolerance",
            "Tolerance cannot be negative",
        ));
    }
    Ok(())
}
