//! Depreciation schedule generation.
//!
//! Each method first produces a list of per-period charges; a common
//! assembly step then attaches period dates and running balances. Every
//! method charges at most the depreciable base, and the method that reaches
//! the end of its life (straight-line, sum-of-years' digits, the last month
//! of declining balance) places the rounding residue in its final period.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use super::{
    period_bounds, AssetFinancials, DepreciationMethod, DepreciationSchedule, ScheduleEntry,
    ScheduleNotice,
};
use crate::error::FixedAssetError;
use crate::types::{round_money, Money, RatePct};
use crate::FixedAssetResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on schedule length (100 years of monthly periods).
pub const MAX_SCHEDULE_PERIODS: u32 = 1200;

/// Annual percentage for double-declining balance, spread over useful life
/// in years: 200% / (months / 12) = 2400 / months.
const DOUBLE_DECLINING_NUMERATOR: Decimal = dec!(2400);

#[derive(Debug, Clone, Copy)]
struct PeriodCharge {
    amount: Money,
    units: Option<u64>,
    usage_missing: bool,
}

impl PeriodCharge {
    fn flat(amount: Money) -> Self {
        PeriodCharge {
            amount,
            units: None,
            usage_missing: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reject input no schedule can be built from.
pub fn validate_financials(financials: &AssetFinancials) -> FixedAssetResult<()> {
    if financials.useful_life_months == 0 {
        return Err(FixedAssetError::invalid(
            "useful_life_months",
            "Useful life must be greater than zero",
        ));
    }
    if financials.useful_life_months > MAX_SCHEDULE_PERIODS {
        return Err(FixedAssetError::invalid(
            "useful_life_months",
            format!("Useful life cannot exceed {MAX_SCHEDULE_PERIODS} months"),
        ));
    }
    if financials.acquisition_cost < Decimal::ZERO {
        return Err(FixedAssetError::invalid(
            "acquisition_cost",
            "Acquisition cost cannot be negative",
        ));
    }
    if financials.salvage_value < Decimal::ZERO {
        return Err(FixedAssetError::invalid(
            "salvage_value",
            "Salvage value cannot be negative",
        ));
    }
    if financials.salvage_value > financials.acquisition_cost {
        return Err(FixedAssetError::invalid(
            "salvage_value",
            "Salvage value cannot exceed acquisition cost",
        ));
    }
    match financials.method {
        DepreciationMethod::DecliningBalance {
            rate_override: Some(rate),
            ..
        } if rate <= Decimal::ZERO => Err(FixedAssetError::invalid(
            "method.rate_override",
            "Declining balance rate must be positive",
        )),
        DepreciationMethod::UnitsOfProduction {
            total_expected_units: None | Some(0),
        } => Err(FixedAssetError::invalid(
            "method.total_expected_units",
            "Units of production requires a positive total expected units",
        )),
        _ => Ok(()),
    }
}

/// Generate the full schedule for a time-based method. Units-of-production
/// assets get an empty schedule here; use [`generate_schedule_with_usage`].
pub fn generate_schedule(financials: &AssetFinancials) -> FixedAssetResult<DepreciationSchedule> {
    generate_schedule_with_usage(financials, &[])
}

/// Generate a schedule, consuming `unit_usage` (one entry per period, `None`
/// for a period with no report) when the method is units-of-production.
/// The usage stream is ignored by the time-based methods.
pub fn generate_schedule_with_usage(
    financials: &AssetFinancials,
    unit_usage: &[Option<u64>],
) -> FixedAssetResult<DepreciationSchedule> {
    validate_financials(financials)?;
    if unit_usage.len() > MAX_SCHEDULE_PERIODS as usize {
        return Err(FixedAssetError::invalid(
            "unit_usage",
            format!("Usage stream cannot exceed {MAX_SCHEDULE_PERIODS} periods"),
        ));
    }

    let mut schedule = DepreciationSchedule::empty(
        &financials.method,
        financials.acquisition_cost,
        financials.salvage_value,
        financials.start_date,
    );

    let base = financials.depreciable_base();
    if base <= Decimal::ZERO {
        debug!(
            acquisition_cost = %financials.acquisition_cost,
            "depreciable base is zero; asset fully depreciated at acquisition"
        );
        return Ok(schedule);
    }

    let months = financials.useful_life_months;
    let charges = match &financials.method {
        DepreciationMethod::StraightLine => straight_line_charges(base, months),
        DepreciationMethod::DecliningBalance {
            rate_override,
            switch_to_straight_line,
        } => declining_balance_charges(
            financials,
            rate_override.unwrap_or_else(|| default_declining_rate(months)),
            *switch_to_straight_line,
        )?,
        DepreciationMethod::SumOfYearsDigits => sum_of_years_digits_charges(base, months),
        DepreciationMethod::UnitsOfProduction {
            total_expected_units,
        } => {
            // validate_financials guarantees Some(n > 0)
            let total = total_expected_units.unwrap_or(1);
            units_of_production_charges(base, total, unit_usage, &mut schedule.notices)
        }
    };

    schedule.entries = assemble_entries(financials, &charges)?;

    debug!(
        method = financials.method.label(),
        periods = schedule.entries.len(),
        total = %schedule.total_depreciation(),
        "generated depreciation schedule"
    );

    Ok(schedule)
}

/// First-period charge, the figure shown as the monthly depreciation preview.
/// Zero when the schedule is empty.
pub fn monthly_depreciation_estimate(financials: &AssetFinancials) -> FixedAssetResult<Money> {
    let schedule = generate_schedule(financials)?;
    Ok(schedule
        .entries
        .first()
        .map(|e| e.period_depreciation)
        .unwrap_or_default())
}

/// Default annual rate for declining balance: double the straight-line rate.
pub fn default_declining_rate(useful_life_months: u32) -> RatePct {
    DOUBLE_DECLINING_NUMERATOR / Decimal::from(useful_life_months)
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

fn straight_line_charges(base: Money, months: u32) -> Vec<PeriodCharge> {
    let nominal = round_money(base / Decimal::from(months));
    let mut remaining = base;

    (1..=months)
        .map(|period| {
            let amount = if period == months {
                remaining
            } else {
                nominal.min(remaining)
            };
            remaining -= amount;
            PeriodCharge::flat(amount)
        })
        .collect()
}

fn declining_balance_charges(
    financials: &AssetFinancials,
    annual_rate_pct: RatePct,
    switch_to_straight_line: bool,
) -> FixedAssetResult<Vec<PeriodCharge>> {
    let months = financials.useful_life_months;
    let salvage = financials.salvage_value;
    let monthly_factor = annual_rate_pct / dec!(100) / dec!(12);

    let mut book_value = financials.acquisition_cost;
    let mut charges = Vec::with_capacity(months as usize);

    for period in 1..=months {
        let remaining = book_value - salvage;
        if remaining <= Decimal::ZERO {
            break;
        }

        let declining = book_value.checked_mul(monthly_factor).ok_or_else(|| {
            FixedAssetError::invalid(
                "method.rate_override",
                format!(
                    "Declining balance rate {annual_rate_pct}% overflows the charge on {book_value}"
                ),
            )
        })?;
        let mut amount = round_money(declining);
        if switch_to_straight_line {
            let periods_left = Decimal::from(months - period + 1);
            amount = amount.max(round_money(remaining / periods_left));
        }
        // Floor reached (or life over): charge only down to salvage
        if amount >= remaining || period == months {
            amount = remaining;
        }

        book_value -= amount;
        charges.push(PeriodCharge::flat(amount));

        if book_value <= salvage {
            break;
        }
    }

    Ok(charges)
}

fn sum_of_years_digits_charges(base: Money, months: u32) -> Vec<PeriodCharge> {
    let life_years = u64::from(months.div_ceil(12));
    let digits_sum = Decimal::from(life_years * (life_years + 1) / 2);
    let mut remaining = base;
    let mut charges = Vec::with_capacity(months as usize);

    for year in 1..=life_years {
        let months_in_year = if year == life_years {
            u64::from(months) - 12 * (life_years - 1)
        } else {
            12
        };
        // Weight <= 1, so the share never exceeds the base
        let weight = Decimal::from(life_years - year + 1) / digits_sum;
        let annual_share = base * weight;
        let monthly = round_money(annual_share / Decimal::from(months_in_year));

        for m in 1..=months_in_year {
            let last = year == life_years && m == months_in_year;
            let amount = if last { remaining } else { monthly.min(remaining) };
            remaining -= amount;
            charges.push(PeriodCharge::flat(amount));
        }
    }

    charges
}

fn units_of_production_charges(
    base: Money,
    total_expected_units: u64,
    unit_usage: &[Option<u64>],
    notices: &mut Vec<ScheduleNotice>,
) -> Vec<PeriodCharge> {
    if unit_usage.is_empty() {
        warn!("units-of-production schedule requested without usage data");
        notices.push(ScheduleNotice::InsufficientUsageData { period_index: None });
        return Vec::new();
    }

    let total = Decimal::from(total_expected_units);
    let mut remaining = base;
    let mut cumulative_units: u64 = 0;
    let mut charges = Vec::with_capacity(unit_usage.len());

    for (i, reported) in unit_usage.iter().enumerate() {
        if remaining <= Decimal::ZERO {
            break;
        }
        let period_index = i as u32 + 1;
        match *reported {
            None => {
                warn!(period_index, "no unit usage reported for period");
                notices.push(ScheduleNotice::InsufficientUsageData {
                    period_index: Some(period_index),
                });
                charges.push(PeriodCharge {
                    amount: Decimal::ZERO,
                    units: None,
                    usage_missing: true,
                });
            }
            Some(units) => {
                cumulative_units = cumulative_units.saturating_add(units);
                let amount = if cumulative_units >= total_expected_units {
                    remaining
                } else {
                    // units < total here, so the fraction is below one
                    round_money(base * (Decimal::from(units) / total)).min(remaining)
                };
                remaining -= amount;
                charges.push(PeriodCharge {
                    amount,
                    units: Some(units),
                    usage_missing: false,
                });
            }
        }
    }

    charges
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn assemble_entries(
    financials: &AssetFinancials,
    charges: &[PeriodCharge],
) -> FixedAssetResult<Vec<ScheduleEntry>> {
    let mut accumulated = Decimal::ZERO;
    let mut entries = Vec::with_capacity(charges.len());

    for (i, charge) in charges.iter().enumerate() {
        let period_index = i as u32 + 1;
        let (period_start, period_end) = period_bounds(financials.start_date, period_index)?;
        accumulated += charge.amount;

        entries.push(ScheduleEntry {
            period_index,
            period_start,
            period_end,
            period_depreciation: charge.amount,
            accumulated_depreciation: accumulated,
            ending_book_value: financials.acquisition_cost - accumulated,
            units_consumed: charge.units,
            usage_missing: charge.usage_missing,
        });
    }

    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
