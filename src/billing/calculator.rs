use crate::billing::Rate;
use crate::error::CostError;

/// Calculate the total cost for a usage amount against a tiered rate table.
///
/// Usage is billed progressively: each tier covers the range from its
/// `start_amount` up to the next tier's `start_amount` (the last tier is
/// unbounded), and the quantity falling inside a tier is priced at that
/// tier's per-unit rate. A tier whose computed range is zero or negative
/// is skipped.
pub fn calculate_cost(rate: Option<&Rate>, usage_amount: f64) -> Result<f64, CostError> {
    let rate = rate.ok_or(CostError::InvalidRate)?;

    if rate.tiers.is_empty() {
        return Err(CostError::NoPricingTiers);
    }

    let mut total_cost = 0.0;
    let mut remaining_usage = usage_amount;

    for (i, tier) in rate.tiers.iter().enumerate() {
        let start_amount = tier.start_amount;

        let end_amount = match rate.tiers.get(i + 1) {
            Some(next) => next.start_amount,
            // Unbounded last tier: wide enough to absorb all remaining usage
            None => remaining_usage + start_amount + 1.0,
        };

        let tier_range = end_amount - start_amount;
        if tier_range <= 0.0 {
            continue;
        }

        let usage_in_tier = remaining_usage.min(tier_range);

        total_cost += usage_in_tier * tier.list_price.per_unit();
        remaining_usage -= usage_in_tier;

        if remaining_usage <= 0.0 {
            break;
        }
    }

    Ok(total_cost)
}
