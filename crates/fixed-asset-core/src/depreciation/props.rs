//! Property-based tests for schedule generation.
//!
//! - Conservation: straight-line and sum-of-years' digits expense exactly the
//!   depreciable base
//! - Monotonicity: accumulated depreciation never decreases, book value never
//!   rises and never falls below salvage
//! - Floor respect: declining balance stops at the period that reaches salvage
//! - Idempotence: identical input gives identical output

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::{
    adjust, generate_schedule, generate_schedule_with_usage, AssetFinancials, DepreciationMethod,
    DepreciationSchedule, PriorAccrual,
};

/// Costs from 0.00 to 10,000,000.00.
fn cost_and_salvage() -> impl Strategy<Value = (Decimal, Decimal)> {
    (0i64..1_000_000_000i64)
        .prop_flat_map(|cost| (Just(cost), 0i64..=cost))
        .prop_map(|(cost, salvage)| (Decimal::new(cost, 2), Decimal::new(salvage, 2)))
}

fn useful_life() -> impl Strategy<Value = u32> {
    1u32..=480
}

fn time_based_method() -> impl Strategy<Value = DepreciationMethod> {
    prop_oneof![
        Just(DepreciationMethod::StraightLine),
        Just(DepreciationMethod::SumOfYearsDigits),
        any::<bool>().prop_map(|switch| DepreciationMethod::DecliningBalance {
            rate_override: None,
            switch_to_straight_line: switch,
        }),
        (1i64..100_000i64).prop_map(|r| DepreciationMethod::DecliningBalance {
            rate_override: Some(Decimal::new(r, 2)),
            switch_to_straight_line: false,
        }),
    ]
}

fn financials(
    (cost, salvage): (Decimal, Decimal),
    months: u32,
    method: DepreciationMethod,
) -> AssetFinancials {
    AssetFinancials {
        acquisition_cost: cost,
        salvage_value: salvage,
        useful_life_months: months,
        method,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    }
}

fn assert_balances_consistent(f: &AssetFinancials, schedule: &DepreciationSchedule) {
    let mut previous = Decimal::ZERO;
    for entry in &schedule.entries {
        assert!(entry.period_depreciation >= Decimal::ZERO);
        assert!(entry.accumulated_depreciation >= previous);
        assert_eq!(
            entry.ending_book_value,
            f.acquisition_cost - entry.accumulated_depreciation
        );
        assert!(entry.ending_book_value >= f.salvage_value);
        assert!(entry.accumulated_depreciation <= f.depreciable_base());
        previous = entry.accumulated_depreciation;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_balances_monotonic_and_floored(
        basis in cost_and_salvage(),
        months in useful_life(),
        method in time_based_method(),
    ) {
        let f = financials(basis, months, method);
        let schedule = generate_schedule(&f).unwrap();
        prop_assert!(schedule.entries.len() <= months as usize);
        assert_balances_consistent(&f, &schedule);
    }

    #[test]
    fn prop_conservation_straight_line_and_syd(
        basis in cost_and_salvage(),
        months in useful_life(),
        syd in any::<bool>(),
    ) {
        let method = if syd {
            DepreciationMethod::SumOfYearsDigits
        } else {
            DepreciationMethod::StraightLine
        };
        let f = financials(basis, months, method);
        let schedule = generate_schedule(&f).unwrap();
        let total: Decimal = schedule.entries.iter().map(|e| e.period_depreciation).sum();

        prop_assert_eq!(total, f.depreciable_base().max(Decimal::ZERO));
        if f.depreciable_base() > Decimal::ZERO {
            prop_assert_eq!(schedule.entries.len(), months as usize);
        }
    }

    #[test]
    fn prop_declining_balance_stops_at_floor(
        basis in cost_and_salvage(),
        months in useful_life(),
    ) {
        let f = financials(basis, months, DepreciationMethod::DecliningBalance {
            rate_override: None,
            switch_to_straight_line: false,
        });
        let schedule = generate_schedule(&f).unwrap();

        if let Some(last) = schedule.entries.last() {
            prop_assert_eq!(last.ending_book_value, f.salvage_value);
            // Only the last entry may sit on the floor
            let at_floor = schedule
                .entries
                .iter()
                .filter(|e| e.ending_book_value == f.salvage_value)
                .count();
            prop_assert_eq!(at_floor, 1);
        }
    }

    #[test]
    fn prop_generate_is_idempotent(
        basis in cost_and_salvage(),
        months in useful_life(),
        method in time_based_method(),
    ) {
        let f = financials(basis, months, method);
        prop_assert_eq!(generate_schedule(&f).unwrap(), generate_schedule(&f).unwrap());
    }

    #[test]
    fn prop_units_of_production_never_exceeds_base(
        basis in cost_and_salvage(),
        total_units in 1u64..10_000,
        usage in prop::collection::vec(prop::option::of(0u64..2_000), 0..60),
    ) {
        let f = financials(basis, 60, DepreciationMethod::UnitsOfProduction {
            total_expected_units: Some(total_units),
        });
        let schedule = generate_schedule_with_usage(&f, &usage).unwrap();
        prop_assert!(schedule.entries.len() <= usage.len());
        assert_balances_consistent(&f, &schedule);
    }

    #[test]
    fn prop_prior_life_used_up_gives_empty_schedule(
        basis in cost_and_salvage(),
        months in useful_life(),
        method in time_based_method(),
    ) {
        let f = financials(basis, months, method);
        let prior = PriorAccrual {
            prior_depreciation_amount: f.depreciable_base(),
            prior_depreciation_months: months,
            entry_book_value: f.salvage_value,
            tolerance: None,
            entry_date: None,
        };
        let adjustment = adjust(&f, &prior).unwrap();
        prop_assert!(adjustment.remaining_schedule(&[]).unwrap().is_empty());
    }
}
