//! Static price catalog and cost calculator for costgpt
//!
//! This crate owns the versioned price snapshot, resolves raw model names
//! against it (aliases, exact ids, then prefix matching), and turns token
//! counts into a [`costgpt_core::CostBreakdown`].

pub mod catalog;
pub mod cost_calculator;

pub use catalog::{PRICING_SNAPSHOT, PriceCatalog};
pub use cost_calculator::CostCalculator;
