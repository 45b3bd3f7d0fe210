//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod ratio;

// Re-export main types for cleaner imports
pub use currency::{CurrencyCode, Ratio};
pub use error::FetchRatioError;
pub use ratio::RatioProvider;
