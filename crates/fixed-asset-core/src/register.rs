//! Book value register: book values for a set of persisted assets as of a
//! report date, with totals per currency.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use tracing::debug;

use crate::depreciation::{
    adjust, generate_schedule_with_usage, value_as_of, AssetFinancials, PriorAccrual,
};
use crate::error::FixedAssetError;
use crate::types::{with_metadata, ComputationOutput, Currency, Money};
use crate::FixedAssetResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// A persisted asset's stored financial parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub asset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub currency: Currency,
    pub financials: AssetFinancials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_accrual: Option<PriorAccrual>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unit_usage: Vec<Option<u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub as_of: NaiveDate,
    pub assets: Vec<AssetRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterLine {
    pub asset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub currency: Currency,
    pub method: String,
    pub acquisition_cost: Money,
    pub salvage_value: Money,
    /// Including depreciation recognised before entry
    pub accumulated_depreciation: Money,
    pub book_value: Money,
    pub fully_depreciated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyTotal {
    pub currency: Currency,
    pub asset_count: u32,
    pub acquisition_cost: Money,
    pub accumulated_depreciation: Money,
    pub book_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterOutput {
    pub as_of: NaiveDate,
    pub lines: Vec<RegisterLine>,
    pub totals: Vec<CurrencyTotal>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute every asset's book value as of `input.as_of`. One invalid asset
/// fails the whole register; the error field names the asset.
pub fn book_value_register(
    input: &RegisterInput,
) -> FixedAssetResult<ComputationOutput<RegisterOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut lines = Vec::with_capacity(input.assets.len());

    for asset in &input.assets {
        if !seen.insert(asset.asset_id.as_str()) {
            return Err(FixedAssetError::invalid(
                format!("assets[{}].asset_id", asset.asset_id),
                "Duplicate asset id in register",
            ));
        }
        let line = register_line(asset, input.as_of, &mut warnings)
            .map_err(|e| scope_error(&asset.asset_id, e))?;
        lines.push(line);
    }

    let totals = currency_totals(&lines);
    debug!(assets = lines.len(), currencies = totals.len(), "built book value register");

    let output = RegisterOutput {
        as_of: input.as_of,
        lines,
        totals,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Book value register (schedule lookup per asset)",
        &serde_json::json!({
            "as_of": input.as_of,
            "asset_count": input.assets.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn register_line(
    asset: &AssetRecord,
    as_of: NaiveDate,
    warnings: &mut Vec<String>,
) -> FixedAssetResult<RegisterLine> {
    let schedule = match &asset.prior_accrual {
        Some(prior) => adjust(&asset.financials, prior)?.remaining_schedule(&asset.unit_usage)?,
        None => generate_schedule_with_usage(&asset.financials, &asset.unit_usage)?,
    };
    warnings.extend(
        schedule
            .warnings()
            .into_iter()
            .map(|w| format!("{}: {}", asset.asset_id, w)),
    );

    let acquisition_cost = asset.financials.acquisition_cost;
    let salvage_value = asset.financials.salvage_value;

    // Not yet acquired: prior accrual only applies from the original start
    let (book_value, fully_depreciated) = if as_of < asset.financials.start_date {
        (acquisition_cost, acquisition_cost <= salvage_value)
    } else {
        let value = value_as_of(&schedule, as_of);
        (value.book_value, value.fully_depreciated)
    };

    Ok(RegisterLine {
        asset_id: asset.asset_id.clone(),
        description: asset.description.clone(),
        currency: asset.currency.clone(),
        method: asset.financials.method.label().to_string(),
        acquisition_cost,
        salvage_value,
        accumulated_depreciation: acquisition_cost - book_value,
        book_value,
        fully_depreciated,
    })
}

fn currency_totals(lines: &[RegisterLine]) -> Vec<CurrencyTotal> {
    let mut totals: BTreeMap<Currency, CurrencyTotal> = BTreeMap::new();
    for line in lines {
        let total = totals
            .entry(line.currency.clone())
            .or_insert_with(|| CurrencyTotal {
                currency: line.currency.clone(),
                asset_count: 0,
                acquisition_cost: Decimal::ZERO,
                accumulated_depreciation: Decimal::ZERO,
                book_value: Decimal::ZERO,
            });
        total.asset_count += 1;
        total.acquisition_cost += line.acquisition_cost;
        total.accumulated_depreciation += line.accumulated_depreciation;
        total.book_value += line.book_value;
    }
    totals.into_values().collect()
}

fn scope_error(asset_id: &str, error: FixedAssetError) -> FixedAssetError {
    match error {
        FixedAssetError::InvalidInput { field, reason } => FixedAssetError::InvalidInput {
            field: format!("assets[{asset_id}].{field}"),
            reason,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depreciation::DepreciationMethod;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(id: &str, cost: Money, currency: Currency) -> AssetRecord {
        AssetRecord {
            asset_id: id.to_string(),
            description: None,
            currency,
            financials: AssetFinancials {
                acquisition_cost: cost,
                salvage_value: dec!(0),
                useful_life_months: 12,
                method: DepreciationMethod::StraightLine,
                start_date: d(2024, 1, 1),
            },
            prior_accrual: None,
            unit_usage: Vec::new(),
        }
    }

    #[test]
    fn test_register_lines_and_totals() {
        let input = RegisterInput {
            as_of: d(2024, 6, 30),
            assets: vec![
                record("FA-001", dec!(12000), Currency::PHP),
                record("FA-002", dec!(24000), Currency::PHP),
                record("FA-003", dec!(1200), Currency::USD),
            ],
        };
        let out = book_value_register(&input).unwrap();
        let r = &out.result;

        assert_eq!(r.lines.len(), 3);
        assert_eq!(r.lines[0].book_value, dec!(6000));
        assert_eq!(r.lines[1].accumulated_depreciation, dec!(12000));

        assert_eq!(r.totals.len(), 2);
        let php = &r.totals[0];
        assert_eq!(php.currency, Currency::PHP);
        assert_eq!(php.asset_count, 2);
        assert_eq!(php.book_value, dec!(18000));
        assert_eq!(r.totals[1].book_value, dec!(600));
    }

    #[test]
    fn test_register_counts_prior_depreciation() {
        let mut asset = record("FA-010", dec!(50000), Currency::PHP);
        asset.financials.useful_life_months = 60;
        asset.financials.start_date = d(2022, 1, 1);
        asset.prior_accrual = Some(PriorAccrual {
            prior_depreciation_amount: dec!(20000),
            prior_depreciation_months: 24,
            entry_book_value: dec!(30000),
            tolerance: None,
            entry_date: None,
        });
        let input = RegisterInput {
            as_of: d(2024, 12, 31),
            assets: vec![asset],
        };
        let out = book_value_register(&input).unwrap();
        let line = &out.result.lines[0];

        // 12 re-based periods at 833.33 after entry on 2024-01-01
        assert_eq!(line.book_value, dec!(20000.04));
        assert_eq!(line.accumulated_depreciation, dec!(29999.96));
    }

    #[test]
    fn test_register_before_acquisition_ignores_prior_depreciation() {
        let mut asset = record("FA-011", dec!(50000), Currency::PHP);
        asset.financials.useful_life_months = 60;
        asset.financials.start_date = d(2022, 1, 1);
        asset.prior_accrual = Some(PriorAccrual {
            prior_depreciation_amount: dec!(20000),
            prior_depreciation_months: 24,
            entry_book_value: dec!(30000),
            tolerance: None,
            entry_date: None,
        });
        let input = RegisterInput {
            as_of: d(2021, 6, 30),
            assets: vec![asset],
        };
        let out = book_value_register(&input).unwrap();
        let line = &out.result.lines[0];

        assert_eq!(line.book_value, dec!(50000));
        assert_eq!(line.accumulated_depreciation, dec!(0));
        assert!(!line.fully_depreciated);
        assert_eq!(out.result.totals[0].book_value, dec!(50000));
    }

    #[test]
    fn test_register_error_names_asset() {
        let mut bad = record("FA-BAD", dec!(1000), Currency::PHP);
        bad.financials.useful_life_months = 0;
        let input = RegisterInput {
            as_of: d(2024, 6, 30),
            assets: vec![record("FA-001", dec!(1000), Currency::PHP), bad],
        };
        match book_value_register(&input) {
            Err(FixedAssetError::InvalidInput { field, .. }) => {
                assert_eq!(field, "assets[FA-BAD].useful_life_months")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_register_rejects_duplicate_ids() {
        let input = RegisterInput {
            as_of: d(2024, 6, 30),
            assets: vec![
                record("FA-001", dec!(1000), Currency::PHP),
                record("FA-001", dec!(2000), Currency::PHP),
            ],
        };
        assert!(book_value_register(&input).is_err());
    }

    #[test]
    fn test_register_prefixes_warnings_with_asset_id() {
        let mut asset = record("FA-UOP", dec!(1000), Currency::PHP);
        asset.financials.method = DepreciationMethod::UnitsOfProduction {
            total_expected_units: Some(100),
        };
        let input = RegisterInput {
            as_of: d(2024, 6, 30),
            assets: vec![asset],
        };
        let out = book_value_register(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].starts_with("FA-UOP: "));
        assert_eq!(out.result.lines[0].book_value, dec!(1000));
    }
}
