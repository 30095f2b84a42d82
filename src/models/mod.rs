pub mod day_summary;
pub mod filter;
pub mod makeup;
pub mod punch;
pub mod user;
