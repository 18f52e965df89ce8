pub mod depreciation;
pub mod register;
