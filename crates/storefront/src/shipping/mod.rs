//! Multi-supplier shipping cost calculation.
//!
//! Cocúfum products are dropshipped from several suppliers, each with its own
//! shipping rule. The calculator classifies cart lines by product tag,
//! groups them per supplier, and computes per-supplier and aggregate shipping
//! costs plus progress toward each free-shipping threshold.

pub mod calculator;
pub mod suppliers;

pub use calculator::{ShippingCalculator, ShippingCostSummary, SupplierShippingGroup};
pub use suppliers::{ShippingRule, SupplierConfig, SupplierPatch};
