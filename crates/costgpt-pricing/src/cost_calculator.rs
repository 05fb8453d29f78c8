//! Cost calculator module for computing call costs
//!
//! Costs are `tokens / 1_000_000 * price_per_million`, computed in `f64` and
//! never rounded here; rounding is a presentation concern.
//!
//! # Examples
//!
//! ```
//! use costgpt_pricing::CostCalculator;
//! use costgpt_core::TokenCounts;
//!
//! let calculator = CostCalculator::default();
//! let cost = calculator.calculate("gpt-4o", &TokenCounts::new(1000, 500));
//! assert!((cost.total_cost - 0.0075).abs() < 1e-12);
//!
//! // Unknown models are priced at zero rather than failing
//! let cost = calculator.calculate("unknown-model-xyz", &TokenCounts::new(100, 100));
//! assert_eq!(cost.total_cost, 0.0);
//! ```

use crate::catalog::PriceCatalog;
use costgpt_core::types::{CostBreakdown, PriceEntry, TokenCounts};
use std::sync::Arc;
use tracing::debug;

/// Calculates costs based on token usage and catalog prices
#[derive(Debug, Clone)]
pub struct CostCalculator {
    /// Price catalog used for resolution
    catalog: Arc<PriceCatalog>,
}

impl CostCalculator {
    /// Create a new CostCalculator over a catalog
    pub fn new(catalog: Arc<PriceCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve `model_name` and price the tokens
    ///
    /// Never fails: an unresolved model yields a zero breakdown.
    pub fn calculate(&self, model_name: &str, tokens: &TokenCounts) -> CostBreakdown {
        Self::compute_cost(self.catalog.resolve(model_name), tokens)
    }

    /// Price tokens against a resolved entry, or at zero when unresolved
    ///
    /// This is a pure function; `total_cost` is exactly
    /// `input_cost + output_cost`.
    pub fn compute_cost(entry: Option<&PriceEntry>, tokens: &TokenCounts) -> CostBreakdown {
        let Some(entry) = entry else {
            return CostBreakdown::zero();
        };

        let cost = CostBreakdown::from_pricing(tokens, &entry.pricing);

        debug!(
            "Calculated cost: ${:.6} for {} total tokens on {}",
            cost.total_cost,
            tokens.total(),
            entry.model
        );

        cost
    }
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self::new(Arc::new(PriceCatalog::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn calculator() -> CostCalculator {
        CostCalculator::default()
    }

    #[test]
    fn test_gpt_4o_scenario() {
        let cost = calculator().calculate("gpt-4o", &TokenCounts::new(1000, 500));

        // 1000 / 1M * 2.50 = 0.0025, 500 / 1M * 10.00 = 0.005
        assert!((cost.input_cost - 0.0025).abs() < 1e-12);
        assert!((cost.output_cost - 0.005).abs() < 1e-12);
        assert!((cost.total_cost - 0.0075).abs() < 1e-12);
        assert_eq!(cost.total_cost, cost.input_cost + cost.output_cost);
    }

    #[test]
    fn test_unknown_model_costs_nothing() {
        let cost = calculator().calculate("unknown-model-xyz", &TokenCounts::new(100, 100));
        assert_eq!(cost, CostBreakdown::zero());
    }

    #[test]
    fn test_alias_matches_canonical_cost() {
        let tokens = TokenCounts::new(12_345, 6_789);
        let calc = calculator();
        assert_eq!(
            calc.calculate("claude-3.5-sonnet", &tokens),
            calc.calculate("claude-3-5-sonnet-20241022", &tokens)
        );
    }

    #[test]
    fn test_zero_tokens() {
        let cost = calculator().calculate("claude-opus-4-20250514", &TokenCounts::new(0, 0));
        assert_eq!(cost.total_cost, 0.0);
    }

    #[test]
    fn test_very_large_token_counts() {
        let cost = calculator().calculate(
            "claude-opus-4-20250514",
            &TokenCounts::new(10_000_000, 5_000_000),
        );
        // 10 * 15 + 5 * 75 = 525
        assert!((cost.total_cost - 525.0).abs() < 1e-9);
    }

    #[test]
    fn test_precision_edge_cases() {
        let entry = PriceEntry::new("tiny", 0.000_001, 0.000_002);
        let cost = CostCalculator::compute_cost(Some(&entry), &TokenCounts::new(1, 1));
        assert!(cost.total_cost > 0.0);
        assert!(cost.total_cost < 1e-11);
    }

    proptest! {
        #[test]
        fn test_costs_never_negative(
            input in 0u64..100_000_000,
            output in 0u64..100_000_000,
            input_price in 0.0f64..100.0,
            output_price in 0.0f64..100.0,
        ) {
            let entry = PriceEntry::new("m", input_price, output_price);
            let cost = CostCalculator::compute_cost(Some(&entry), &TokenCounts::new(input, output));
            prop_assert!(cost.input_cost >= 0.0);
            prop_assert!(cost.output_cost >= 0.0);
            prop_assert_eq!(cost.total_cost, cost.input_cost + cost.output_cost);
        }
    }
}
