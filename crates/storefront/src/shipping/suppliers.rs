//! Dropship supplier configuration.

use cocufum_core::SupplierId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billing policy attached to a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRule {
    /// Flat shipping charge applied per supplier group when the
    /// free-shipping threshold is not met.
    pub base_rate: Decimal,
    /// Per-extra-item surcharge. Zero for flat-rate suppliers; the general
    /// formula is `base_rate + max(0, item_count - 1) * additional_rate`.
    pub additional_rate: Decimal,
    /// Supplier-group subtotal at or above which shipping is free
    /// (inclusive boundary).
    pub free_shipping_threshold: Decimal,
    /// Allowed destination countries (informational; not enforced).
    pub countries: Vec<String>,
    /// Whether this rule participates in classification and calculation.
    pub active: bool,
}

/// One dropship supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierConfig {
    /// Unique supplier identifier.
    pub id: SupplierId,
    /// Display name.
    pub name: String,
    /// Product classification tag matched against a product's tag set.
    /// Unique across active suppliers; first match wins.
    pub tag: String,
    /// Presentation hint: badge color.
    pub color: String,
    /// Presentation hint: icon name.
    pub icon: String,
    /// Shipping rule for this supplier.
    pub rule: ShippingRule,
}

/// Partial update for a supplier; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub tag: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub rule: Option<ShippingRule>,
}

/// The Cocúfum supplier roster.
///
/// Artisan Ceramics is the only tiered supplier (non-zero per-extra-item
/// surcharge); the others ship at a flat rate below their thresholds.
#[must_use]
pub fn default_suppliers() -> Vec<SupplierConfig> {
    vec![
        SupplierConfig {
            id: SupplierId::new("beach-lifestyle"),
            name: "Beach & Lifestyle".to_string(),
            tag: "towels-supplier".to_string(),
            color: "#0e7490".to_string(),
            icon: "beach-umbrella".to_string(),
            rule: ShippingRule {
                base_rate: Decimal::new(750, 2),
                additional_rate: Decimal::ZERO,
                free_shipping_threshold: Decimal::new(7500, 2),
                countries: european_destinations(),
                active: true,
            },
        },
        SupplierConfig {
            id: SupplierId::new("home-fragrance"),
            name: "Home & Fragrance".to_string(),
            tag: "oils-supplier".to_string(),
            color: "#b45309".to_string(),
            icon: "droplet".to_string(),
            rule: ShippingRule {
                base_rate: Decimal::new(999, 2),
                additional_rate: Decimal::ZERO,
                free_shipping_threshold: Decimal::new(7500, 2),
                countries: european_destinations(),
                active: true,
            },
        },
        SupplierConfig {
            id: SupplierId::new("artisan-ceramics"),
            name: "Artisan Ceramics".to_string(),
            tag: "ceramics-supplier".to_string(),
            color: "#7c3aed".to_string(),
            icon: "vase".to_string(),
            rule: ShippingRule {
                base_rate: Decimal::new(690, 2),
                additional_rate: Decimal::new(250, 2),
                free_shipping_threshold: Decimal::new(12000, 2),
                countries: vec!["ES".to_string(), "PT".to_string()],
                active: true,
            },
        },
    ]
}

fn european_destinations() -> Vec<String> {
    ["ES", "PT", "FR", "DE", "IT", "NL", "BE"]
        .into_iter()
        .map(String::from)
        .collect()
}
