use thiserror::Error;

/// Ways fetching an exchange ratio can fail.
#[derive(Debug, Error)]
pub enum FetchRatioError {
    /// Raised before any request is made.
    #[error("The currency code {code} is not valid")]
    InvalidCurrency { code: String },

    /// Transport failure or non-success HTTP status.
    #[error("Request to {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// The page no longer contains a usable amount.
    #[error("Cannot parse response from google finance converter: {0}")]
    Parse(String),
}

impl FetchRatioError {
    /// Only transport level failures are worth retrying by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchRatioError::Fetch { .. })
    }
}
