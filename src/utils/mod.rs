pub mod parsing;
pub mod units;
