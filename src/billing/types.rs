use serde::{Deserialize, Serialize};

/// A monetary value as the Cloud Billing API reports it: whole currency
/// units plus a fractional part in billionths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Money {
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    pub units: i64,
    #[serde(default)]
    pub nanos: i64,
}

impl Money {
    pub fn new(currency_code: &str, units: i64, nanos: i64) -> Self {
        Self {
            currency_code: currency_code.to_string(),
            units,
            nanos,
        }
    }

    /// Price per unit as a decimal (`units + nanos/1e9`).
    pub fn per_unit(&self) -> f64 {
        self.units as f64 + self.nanos as f64 / 1e9
    }
}

/// One volume bracket of a rate table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingTier {
    /// Usage threshold at which this tier begins.
    pub start_amount: f64,
    pub list_price: Money,
}

/// An ordered rate table for one SKU. Tiers are sorted by ascending
/// `start_amount` with strictly increasing thresholds; the last tier
/// has no upper bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rate {
    pub tiers: Vec<PricingTier>,
    /// Canonical usage unit for this rate (e.g. "s", "By", "count").
    #[serde(default)]
    pub usage_unit: String,
    #[serde(default)]
    pub currency_code: String,
}

impl Rate {
    /// Flat single-tier rate starting at zero.
    pub fn flat(currency_code: &str, usage_unit: &str, units: i64, nanos: i64) -> Self {
        Self {
            tiers: vec![PricingTier {
                start_amount: 0.0,
                list_price: Money::new(currency_code, units, nanos),
            }],
            usage_unit: usage_unit.to_string(),
            currency_code: currency_code.to_string(),
        }
    }

    pub fn is_tiered(&self) -> bool {
        self.tiers.len() > 1
    }
}
