//! Fixed-asset depreciation engine.
//!
//! Pure, synchronous calculations: schedule generation for straight-line,
//! declining-balance, sum-of-years'-digits and units-of-production methods,
//! book value lookup as of a date, re-basing of assets that enter the
//! register with depreciation already accrued, and register-wide reporting.

pub mod error;
pub mod types;

#[cfg(feature = "depreciation")]
pub mod depreciation;

#[cfg(feature = "register")]
pub mod register;

pub use error::FixedAssetError;
pub use types::*;

/// Standard result type for all fixed-asset operations
pub type FixedAssetResult<T> = Result<T, FixedAssetError>;
