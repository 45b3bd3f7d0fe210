//! Exchange ratio abstractions

use crate::core::currency::Ratio;
use crate::core::error::FetchRatioError;
use async_trait::async_trait;

/// A source of exchange ratios between two currencies.
#[async_trait]
pub trait RatioProvider: Send + Sync {
    /// Returns how many units of `target` equal one unit of `reference`.
    async fn fetch_ratio(&self, reference: &str, target: &str) -> Result<Ratio, FetchRatioError>;
}
