mod config;
mod constants;
mod data;
mod error;
pub mod stats;

pub use config::*;
pub use constants::*;
pub use data::*;
pub use error::*;
pub use stats::{summarize, StatisticsSummary};
