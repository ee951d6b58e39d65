//! coinscope - composite crypto scoring and ranking
//!
//! Daily closes, cached news sentiment and market-cap data are merged into a
//! bounded score per coin, ranked, and appended to a capped JSON history.

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use types::*;
