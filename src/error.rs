use thiserror::Error;

/// Errors from cost calculation. These are deterministic and caller-facing:
/// there is no sensible default cost without a usable rate table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CostError {
    #[error("invalid price data: rate is missing")]
    InvalidRate,

    #[error("no pricing tiers available")]
    NoPricingTiers,

    #[error("usage amount must be non-negative")]
    InvalidUsage,
}

/// Errors from fetching documentation pages. These never escape the
/// free tier resolver; they are logged and downgraded to "no data".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("URL must be under {0}")]
    UntrustedSource(String),

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("page returned status {0}")]
    Status(reqwest::StatusCode),
}
