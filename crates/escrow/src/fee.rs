//! Platform fee calculation
//!
//! The commission is tiered on the total contract value and frozen into
//! the payment at order creation; later changes to this table never touch
//! existing payments.

use crate::types::PaymentAmount;

/// One fee tier: applies to totals up to `max_total` (inclusive)
#[derive(Debug, Clone, PartialEq)]
pub struct FeeTier {
    /// Upper bound of the tier, inclusive; `None` means no upper bound
    pub max_total: Option<f64>,
    /// Commission rate applied to the full total
    pub rate: f64,
}

/// The platform fee table.
///
/// The top two tiers currently share a rate; the table is kept exactly as
/// the fee schedule defines it.
pub fn default_fee_tiers() -> Vec<FeeTier> {
    vec![
        // Up to 10,000: 5%
        FeeTier {
            max_total: Some(10_000.0),
            rate: 0.05,
        },
        // 10,001 - 100,000: 2.5%
        FeeTier {
            max_total: Some(100_000.0),
            rate: 0.025,
        },
        // Above 100,000: 2.5%
        FeeTier {
            max_total: None,
            rate: 0.025,
        },
    ]
}

/// Platform fee for a total contract value
pub fn platform_fee(total: f64) -> f64 {
    for tier in default_fee_tiers() {
        match tier.max_total {
            Some(max) if total <= max => return total * tier.rate,
            Some(_) => continue,
            None => return total * tier.rate,
        }
    }
    0.0
}

/// Split a total into the frozen payment amount
pub fn split_amount(total: f64) -> PaymentAmount {
    let platform_fee = platform_fee(total);
    PaymentAmount {
        total,
        seller_amount: total - platform_fee,
        platform_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }

    #[test]
    fn test_fee_at_tier_boundaries() {
        assert_close(platform_fee(10_000.0), 500.0); // 5%
        assert_close(platform_fee(10_001.0), 250.025); // 2.5%
        assert_close(platform_fee(100_000.0), 2_500.0); // 2.5%
        assert_close(platform_fee(100_001.0), 2_500.025); // 2.5%
    }

    #[test]
    fn test_worked_example() {
        let amount = split_amount(200_000.0);
        assert_close(amount.platform_fee, 5_000.0);
        assert_close(amount.seller_amount, 195_000.0);
    }

    #[test]
    fn test_split_sums_to_total() {
        for total in [10_000.0, 10_001.0, 100_000.0, 100_001.0, 45_000.0] {
            let amount = split_amount(total);
            assert_close(amount.seller_amount + amount.platform_fee, amount.total);
            assert!(amount.seller_amount <= amount.total);
        }
    }

    #[test]
    fn test_tier_table_shape() {
        let tiers = default_fee_tiers();
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0].max_total, Some(10_000.0));
        assert_eq!(tiers[2].max_total, None);
        // The top two tiers share a rate
        assert_eq!(tiers[1].rate, tiers[2].rate);
    }
}
