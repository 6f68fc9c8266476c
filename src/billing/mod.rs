pub mod calculator;
pub mod estimator;
pub mod types;

pub use calculator::calculate_cost;
pub use estimator::{CostEstimate, CostEstimator};
pub use types::{Money, PricingTier, Rate};
