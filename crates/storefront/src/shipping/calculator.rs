//! Shipping cost calculator.
//!
//! Pure computation over a cart snapshot and the supplier configuration.
//! Monetary values stay as `Decimal` throughout - no intermediate rounding;
//! presentation layers round to two decimals at render time.

use cocufum_core::SupplierId;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::shopify::types::CartLine;

use super::suppliers::{SupplierConfig, SupplierPatch, default_suppliers};

/// Cost breakdown for one supplier's share of the cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierShippingGroup {
    /// The supplier this group bills against.
    pub supplier: SupplierConfig,
    /// Cart lines attributed to this supplier, in cart order.
    pub lines: Vec<CartLine>,
    /// Sum of unit price x quantity over the group's lines.
    pub subtotal: Decimal,
    /// Sum of quantities (not line count).
    pub item_count: i64,
    /// Shipping charged for this group.
    pub shipping_cost: Decimal,
    /// Whether the group's subtotal reached the free-shipping threshold.
    pub has_free_shipping: bool,
    /// Remaining subtotal needed for free shipping (zero once reached).
    pub amount_to_free_shipping: Decimal,
}

/// Aggregate shipping summary for a cart, recomputed from scratch on every
/// cart change and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingCostSummary {
    /// Per-supplier cost breakdowns.
    pub groups: Vec<SupplierShippingGroup>,
    /// Sum of each group's shipping cost.
    pub total_shipping: Decimal,
    /// Sum of quantities across all groups.
    pub total_items: i64,
    /// Sum of subtotals across all groups.
    pub total_subtotal: Decimal,
    /// True exactly when `total_shipping` is zero (every group free, or
    /// empty cart).
    pub has_free_shipping: bool,
}

/// Classifies cart items by supplier tag and computes shipping costs.
///
/// Holds the supplier collection in memory; construct one per consumer
/// (dependency injection) rather than sharing a global instance.
#[derive(Debug, Clone)]
pub struct ShippingCalculator {
    suppliers: Vec<SupplierConfig>,
}

impl ShippingCalculator {
    /// Create a calculator over an explicit supplier configuration.
    #[must_use]
    pub const fn new(suppliers: Vec<SupplierConfig>) -> Self {
        Self { suppliers }
    }

    /// Create a calculator over the Cocúfum supplier roster.
    #[must_use]
    pub fn with_default_suppliers() -> Self {
        Self::new(default_suppliers())
    }

    /// The configured suppliers, in configuration order.
    #[must_use]
    pub fn suppliers(&self) -> &[SupplierConfig] {
        &self.suppliers
    }

    fn active_suppliers(&self) -> impl Iterator<Item = &SupplierConfig> {
        self.suppliers.iter().filter(|s| s.rule.active)
    }

    /// Resolve the supplier for a product's tag set.
    ///
    /// Iterates active suppliers in configuration order and returns the first
    /// whose `tag` appears in the product's tags. When nothing matches, the
    /// **first active supplier** is returned as the default bucket - untagged
    /// or unrecognized products are deliberately attributed to it rather than
    /// dropped. Returns `None` only when no active supplier is configured.
    #[must_use]
    pub fn resolve_supplier_or_default(&self, tags: &[String]) -> Option<&SupplierConfig> {
        self.active_suppliers()
            .find(|supplier| tags.iter().any(|tag| *tag == supplier.tag))
            .or_else(|| self.active_suppliers().next())
    }

    /// Group cart lines per supplier.
    ///
    /// Buckets appear in order of first appearance; cart line order is
    /// preserved within each bucket. Lines that resolve to no supplier
    /// (empty configuration) are dropped.
    #[must_use]
    pub fn group_lines_by_supplier<'a>(
        &'a self,
        lines: &'a [CartLine],
    ) -> Vec<(&'a SupplierConfig, Vec<&'a CartLine>)> {
        let mut groups: Vec<(&SupplierConfig, Vec<&CartLine>)> = Vec::new();

        for line in lines {
            let Some(supplier) = self.resolve_supplier_or_default(&line.merchandise.product.tags)
            else {
                continue;
            };

            match groups.iter_mut().find(|(s, _)| s.id == supplier.id) {
                Some((_, bucket)) => bucket.push(line),
                None => groups.push((supplier, vec![line])),
            }
        }

        groups
    }

    /// Compute the full shipping summary for a cart snapshot.
    ///
    /// Never fails: lines with malformed or missing price data contribute
    /// zero to their group's subtotal (their quantities still count).
    #[must_use]
    pub fn calculate(&self, lines: &[CartLine]) -> ShippingCostSummary {
        let mut groups = Vec::new();
        let mut total_shipping = Decimal::ZERO;
        let mut total_items = 0i64;
        let mut total_subtotal = Decimal::ZERO;

        for (supplier, bucket) in self.group_lines_by_supplier(lines) {
            let subtotal: Decimal = bucket
                .iter()
                .map(|line| {
                    line.cost.amount_per_quantity.decimal().unwrap_or_default()
                        * Decimal::from(line.quantity)
                })
                .sum();
            let item_count: i64 = bucket.iter().map(|line| line.quantity).sum();

            let rule = &supplier.rule;
            let has_free_shipping = subtotal >= rule.free_shipping_threshold;
            let amount_to_free_shipping =
                (rule.free_shipping_threshold - subtotal).max(Decimal::ZERO);
            let shipping_cost = if has_free_shipping {
                Decimal::ZERO
            } else {
                let extra_items = Decimal::from((item_count - 1).max(0));
                rule.base_rate + extra_items * rule.additional_rate
            };

            total_shipping += shipping_cost;
            total_items += item_count;
            total_subtotal += subtotal;

            groups.push(SupplierShippingGroup {
                supplier: supplier.clone(),
                lines: bucket.into_iter().cloned().collect(),
                subtotal,
                item_count,
                shipping_cost,
                has_free_shipping,
                amount_to_free_shipping,
            });
        }

        ShippingCostSummary {
            groups,
            total_shipping,
            total_items,
            total_subtotal,
            has_free_shipping: total_shipping.is_zero(),
        }
    }

    // =========================================================================
    // Administrative mutators
    // =========================================================================

    /// Append a supplier to the configuration. The id is assumed unique.
    pub fn add_supplier(&mut self, supplier: SupplierConfig) {
        self.suppliers.push(supplier);
    }

    /// Shallow-merge a patch into the supplier with the given id.
    ///
    /// Returns `false` (and changes nothing) when no supplier matches.
    pub fn update_supplier(&mut self, id: &SupplierId, patch: SupplierPatch) -> bool {
        let Some(supplier) = self.suppliers.iter_mut().find(|s| &s.id == id) else {
            return false;
        };

        if let Some(name) = patch.name {
            supplier.name = name;
        }
        if let Some(tag) = patch.tag {
            supplier.tag = tag;
        }
        if let Some(color) = patch.color {
            supplier.color = color;
        }
        if let Some(icon) = patch.icon {
            supplier.icon = icon;
        }
        if let Some(rule) = patch.rule {
            supplier.rule = rule;
        }
        true
    }

    /// Remove the supplier with the given id.
    ///
    /// Returns `false` when no supplier matches.
    pub fn remove_supplier(&mut self, id: &SupplierId) -> bool {
        let Some(index) = self.suppliers.iter().position(|s| &s.id == id) else {
            return false;
        };
        self.suppliers.remove(index);
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shipping::suppliers::ShippingRule;
    use crate::shopify::types::{
        CartLine, CartLineCost, CartMerchandise, CartMerchandiseProduct,
    };
    use cocufum_core::{CartLineId, Money, VariantId};

    fn line(id: &str, tags: &[&str], unit_price: &str, quantity: i64) -> CartLine {
        let price = Money::new(unit_price, "EUR");
        CartLine {
            id: CartLineId::new(format!("gid://shopify/CartLine/{id}")),
            quantity,
            cost: CartLineCost {
                amount_per_quantity: price.clone(),
                subtotal_amount: price.clone(),
                total_amount: price.clone(),
            },
            merchandise: CartMerchandise {
                id: VariantId::new(format!("gid://shopify/ProductVariant/{id}")),
                title: "Default Title".to_string(),
                available_for_sale: true,
                price,
                image: None,
                product: CartMerchandiseProduct {
                    id: format!("gid://shopify/Product/{id}"),
                    handle: format!("product-{id}"),
                    title: format!("Product {id}"),
                    vendor: "Cocúfum".to_string(),
                    tags: tags.iter().map(ToString::to_string).collect(),
                    featured_image: None,
                },
            },
        }
    }

    fn calculator() -> ShippingCalculator {
        ShippingCalculator::with_default_suppliers()
    }

    fn group<'a>(
        summary: &'a ShippingCostSummary,
        supplier_id: &str,
    ) -> &'a SupplierShippingGroup {
        summary
            .groups
            .iter()
            .find(|g| g.supplier.id.as_str() == supplier_id)
            .unwrap()
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let calc = calculator();
        let tags = vec!["summer".to_string(), "oils-supplier".to_string()];

        let first = calc.resolve_supplier_or_default(&tags).unwrap();
        let second = calc.resolve_supplier_or_default(&tags).unwrap();

        assert_eq!(first.id.as_str(), "home-fragrance");
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_unmatched_tags_fall_back_to_first_active_supplier() {
        let calc = calculator();
        let tags = vec!["no-such-tag".to_string()];

        let supplier = calc.resolve_supplier_or_default(&tags).unwrap();
        assert_eq!(supplier.id.as_str(), "beach-lifestyle");
    }

    #[test]
    fn test_empty_configuration_resolves_to_none() {
        let calc = ShippingCalculator::new(Vec::new());
        assert!(calc.resolve_supplier_or_default(&["towels-supplier".to_string()]).is_none());
    }

    #[test]
    fn test_inactive_suppliers_are_skipped() {
        let mut suppliers = default_suppliers();
        suppliers[0].rule.active = false;
        let calc = ShippingCalculator::new(suppliers);

        // The inactive supplier's own tag no longer matches it
        let supplier = calc
            .resolve_supplier_or_default(&["towels-supplier".to_string()])
            .unwrap();
        assert_eq!(supplier.id.as_str(), "home-fragrance");

        // And the fallback is now the first *active* supplier
        let fallback = calc.resolve_supplier_or_default(&[]).unwrap();
        assert_eq!(fallback.id.as_str(), "home-fragrance");
    }

    #[test]
    fn test_grouping_preserves_cart_order() {
        let calc = calculator();
        let lines = vec![
            line("1", &["towels-supplier"], "20.00", 1),
            line("2", &["oils-supplier"], "30.00", 1),
            line("3", &["towels-supplier"], "15.00", 1),
        ];

        let groups = calc.group_lines_by_supplier(&lines);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0.id.as_str(), "beach-lifestyle");
        let towel_ids: Vec<_> = groups[0].1.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(
            towel_ids,
            vec!["gid://shopify/CartLine/1", "gid://shopify/CartLine/3"]
        );
        assert_eq!(groups[1].0.id.as_str(), "home-fragrance");
    }

    #[test]
    fn test_lines_dropped_when_no_suppliers_configured() {
        let calc = ShippingCalculator::new(Vec::new());
        let summary = calc.calculate(&[line("1", &["towels-supplier"], "20.00", 2)]);

        assert!(summary.groups.is_empty());
        assert_eq!(summary.total_items, 0);
        assert!(summary.has_free_shipping);
    }

    #[test]
    fn test_worked_example_two_suppliers() {
        // 2 towels at 20.00 (subtotal 40.00, below 75.00) plus 1 oil at
        // 30.00 (below 75.00): 7.50 + 9.99 shipping
        let calc = calculator();
        let lines = vec![
            line("1", &["towels-supplier"], "20.00", 2),
            line("2", &["oils-supplier"], "30.00", 1),
        ];

        let summary = calc.calculate(&lines);

        let towels = group(&summary, "beach-lifestyle");
        assert_eq!(towels.subtotal, Decimal::new(4000, 2));
        assert_eq!(towels.item_count, 2);
        assert_eq!(towels.shipping_cost, Decimal::new(750, 2));
        assert!(!towels.has_free_shipping);
        assert_eq!(towels.amount_to_free_shipping, Decimal::new(3500, 2));

        let oils = group(&summary, "home-fragrance");
        assert_eq!(oils.shipping_cost, Decimal::new(999, 2));

        assert_eq!(summary.total_shipping, Decimal::new(1749, 2));
        assert_eq!(summary.total_subtotal, Decimal::new(7000, 2));
        assert_eq!(summary.total_items, 3);
        assert!(!summary.has_free_shipping);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let calc = calculator();
        // 3 towels at 25.00 = exactly 75.00
        let summary = calc.calculate(&[line("1", &["towels-supplier"], "25.00", 3)]);

        let towels = group(&summary, "beach-lifestyle");
        assert!(towels.has_free_shipping);
        assert_eq!(towels.shipping_cost, Decimal::ZERO);
        assert_eq!(towels.amount_to_free_shipping, Decimal::ZERO);
        assert!(summary.has_free_shipping);
    }

    #[test]
    fn test_tiered_rate_formula() {
        let calc = calculator();

        // Single item pays exactly the base rate
        let summary = calc.calculate(&[line("1", &["ceramics-supplier"], "30.00", 1)]);
        assert_eq!(
            group(&summary, "artisan-ceramics").shipping_cost,
            Decimal::new(690, 2)
        );

        // 3 items below threshold: 6.90 + 2 * 2.50 = 11.90
        let summary = calc.calculate(&[line("1", &["ceramics-supplier"], "30.00", 3)]);
        assert_eq!(
            group(&summary, "artisan-ceramics").shipping_cost,
            Decimal::new(1190, 2)
        );
    }

    #[test]
    fn test_flat_rate_ignores_item_count() {
        let calc = calculator();
        let summary = calc.calculate(&[line("1", &["towels-supplier"], "10.00", 5)]);
        assert_eq!(
            group(&summary, "beach-lifestyle").shipping_cost,
            Decimal::new(750, 2)
        );
    }

    #[test]
    fn test_aggregate_free_shipping_requires_every_group() {
        let calc = calculator();
        let lines = vec![
            line("1", &["towels-supplier"], "80.00", 1), // free
            line("2", &["oils-supplier"], "30.00", 1),   // 9.99
        ];

        let summary = calc.calculate(&lines);
        assert!(group(&summary, "beach-lifestyle").has_free_shipping);
        assert_eq!(summary.total_shipping, Decimal::new(999, 2));
        assert!(!summary.has_free_shipping);
    }

    #[test]
    fn test_empty_cart_has_free_shipping() {
        let summary = calculator().calculate(&[]);
        assert!(summary.groups.is_empty());
        assert_eq!(summary.total_shipping, Decimal::ZERO);
        assert_eq!(summary.total_subtotal, Decimal::ZERO);
        assert!(summary.has_free_shipping);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let calc = calculator();
        let lines = vec![
            line("1", &["towels-supplier"], "20.00", 2),
            line("2", &["ceramics-supplier"], "33.33", 2),
        ];

        assert_eq!(calc.calculate(&lines), calc.calculate(&lines));
    }

    #[test]
    fn test_malformed_price_contributes_zero() {
        let calc = calculator();
        let lines = vec![
            line("1", &["towels-supplier"], "not-a-price", 2),
            line("2", &["towels-supplier"], "20.00", 1),
        ];

        let summary = calc.calculate(&lines);
        let towels = group(&summary, "beach-lifestyle");
        assert_eq!(towels.subtotal, Decimal::new(2000, 2));
        // Quantities still count even when the price is unusable
        assert_eq!(towels.item_count, 3);
    }

    #[test]
    fn test_add_supplier_appends() {
        let mut calc = calculator();
        calc.add_supplier(SupplierConfig {
            id: SupplierId::new("glassware"),
            name: "Glassware".to_string(),
            tag: "glass-supplier".to_string(),
            color: "#334155".to_string(),
            icon: "glass".to_string(),
            rule: ShippingRule {
                base_rate: Decimal::new(500, 2),
                additional_rate: Decimal::ZERO,
                free_shipping_threshold: Decimal::new(5000, 2),
                countries: vec!["ES".to_string()],
                active: true,
            },
        });

        assert_eq!(calc.suppliers().len(), 4);
        let supplier = calc
            .resolve_supplier_or_default(&["glass-supplier".to_string()])
            .unwrap();
        assert_eq!(supplier.id.as_str(), "glassware");
    }

    #[test]
    fn test_update_supplier_merges_patch() {
        let mut calc = calculator();
        let id = SupplierId::new("home-fragrance");

        let updated = calc.update_supplier(
            &id,
            SupplierPatch {
                name: Some("Home, Oils & Fragrance".to_string()),
                ..SupplierPatch::default()
            },
        );

        assert!(updated);
        let supplier = calc.suppliers().iter().find(|s| s.id == id).unwrap();
        assert_eq!(supplier.name, "Home, Oils & Fragrance");
        // Untouched fields survive
        assert_eq!(supplier.tag, "oils-supplier");
    }

    #[test]
    fn test_update_missing_supplier_is_false() {
        let mut calc = calculator();
        assert!(!calc.update_supplier(&SupplierId::new("nope"), SupplierPatch::default()));
    }

    #[test]
    fn test_remove_supplier() {
        let mut calc = calculator();
        assert!(calc.remove_supplier(&SupplierId::new("artisan-ceramics")));
        assert_eq!(calc.suppliers().len(), 2);
        assert!(!calc.remove_supplier(&SupplierId::new("artisan-ceramics")));
    }
}
