//! Book value lookup against a generated schedule.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DepreciationSchedule;
use crate::types::Money;

/// Accumulated depreciation and book value at a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookValue {
    pub as_of: NaiveDate,
    pub accumulated_depreciation: Money,
    pub book_value: Money,
    /// Number of schedule periods whose end falls on or before `as_of`
    pub periods_elapsed: u32,
    pub fully_depreciated: bool,
}

/// One calendar year of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualDepreciation {
    pub year: i32,
    pub periods: u32,
    pub opening_book_value: Money,
    pub depreciation: Money,
    pub closing_book_value: Money,
    pub accumulated_depreciation: Money,
}

/// Values from the latest period ending on or before `as_of`. Before the first
/// period nothing has accrued; after the last, the final entry holds.
pub fn value_as_of(schedule: &DepreciationSchedule, as_of: NaiveDate) -> BookValue {
    let elapsed = schedule.entries.partition_point(|e| e.period_end <= as_of);

    let (accumulated_depreciation, book_value) = match elapsed.checked_sub(1) {
        Some(i) => {
            let entry = &schedule.entries[i];
            (entry.accumulated_depreciation, entry.ending_book_value)
        }
        None => (Decimal::ZERO, schedule.acquisition_cost),
    };

    BookValue {
        as_of,
        accumulated_depreciation,
        book_value,
        periods_elapsed: elapsed as u32,
        fully_depreciated: book_value <= schedule.salvage_value,
    }
}

/// Group schedule entries by the calendar year their period ends in.
pub fn annual_summary(schedule: &DepreciationSchedule) -> Vec<AnnualDepreciation> {
    let mut years: Vec<AnnualDepreciation> = Vec::new();
    let mut opening = schedule.acquisition_cost;

    for entry in &schedule.entries {
        let year = entry.period_end.year();
        match years.last_mut() {
            Some(current) if current.year == year => {
                current.periods += 1;
                current.depreciation += entry.period_depreciation;
                current.closing_book_value = entry.ending_book_value;
                current.accumulated_depreciation = entry.accumulated_depreciation;
            }
            _ => years.push(AnnualDepreciation {
                year,
                periods: 1,
                opening_book_value: opening,
                depreciation: entry.period_depreciation,
                closing_book_value: entry.ending_book_value,
                accumulated_depreciation: entry.accumulated_depreciation,
            }),
        }
        opening = entry.ending_book_value;
    }

    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depreciation::{generate_schedule, AssetFinancials, DepreciationMethod};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn straight_line_schedule() -> DepreciationSchedule {
        let f = AssetFinancials {
            acquisition_cost: dec!(120000),
            salvage_value: dec!(0),
            useful_life_months: 60,
            method: DepreciationMethod::StraightLine,
            start_date: d(2024, 1, 1),
        };
        generate_schedule(&f).unwrap()
    }

    #[test]
    fn test_before_first_period_is_cost() {
        let bv = value_as_of(&straight_line_schedule(), d(2023, 12, 31));
        assert_eq!(bv.accumulated_depreciation, dec!(0));
        assert_eq!(bv.book_value, dec!(120000));
        assert_eq!(bv.periods_elapsed, 0);
        assert!(!bv.fully_depreciated);
    }

    #[test]
    fn test_mid_period_uses_last_completed_period() {
        let schedule = straight_line_schedule();
        // Jan closes on Jan 31; Feb is not complete on Feb 15
        let bv = value_as_of(&schedule, d(2024, 2, 15));
        assert_eq!(bv.periods_elapsed, 1);
        assert_eq!(bv.accumulated_depreciation, dec!(2000));
        assert_eq!(bv.book_value, dec!(118000));
    }

    #[test]
    fn test_on_period_end_includes_that_period() {
        let bv = value_as_of(&straight_line_schedule(), d(2024, 12, 31));
        assert_eq!(bv.periods_elapsed, 12);
        assert_eq!(bv.book_value, dec!(96000));
    }

    #[test]
    fn test_after_last_period_is_final_entry() {
        let bv = value_as_of(&straight_line_schedule(), d(2035, 6, 30));
        assert_eq!(bv.periods_elapsed, 60);
        assert_eq!(bv.accumulated_depreciation, dec!(120000));
        assert_eq!(bv.book_value, dec!(0));
        assert!(bv.fully_depreciated);
    }

    #[test]
    fn test_lookup_does_not_touch_schedule() {
        let schedule = straight_line_schedule();
        let before = schedule.clone();
        let _ = value_as_of(&schedule, d(2026, 3, 31));
        assert_eq!(schedule, before);
    }

    #[test]
    fn test_annual_summary_groups_by_year() {
        let years = annual_summary(&straight_line_schedule());
        assert_eq!(years.len(), 5);
        assert_eq!(years[0].year, 2024);
        assert_eq!(years[0].periods, 12);
        assert_eq!(years[0].opening_book_value, dec!(120000));
        assert_eq!(years[0].depreciation, dec!(24000));
        assert_eq!(years[0].closing_book_value, dec!(96000));
        assert_eq!(years[1].opening_book_value, dec!(96000));
        assert_eq!(years[4].closing_book_value, dec!(0));
    }

    #[test]
    fn test_annual_summary_mid_year_start() {
        let f = AssetFinancials {
            acquisition_cost: dec!(1200),
            salvage_value: dec!(0),
            useful_life_months: 12,
            method: DepreciationMethod::StraightLine,
            start_date: d(2024, 7, 1),
        };
        let years = annual_summary(&generate_schedule(&f).unwrap());
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].periods, 6);
        assert_eq!(years[0].depreciation, dec!(600));
        assert_eq!(years[1].year, 2025);
        assert_eq!(years[1].periods, 6);
    }
}
