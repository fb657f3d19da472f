//! End-to-end shipping flow: cart session feeding the shipping calculator.
//!
//! Mirrors the checkout page flow: the session holds the live cart snapshot
//! and the calculator derives the shipping summary from its lines.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rust_decimal::Decimal;

use cocufum_core::VariantId;
use cocufum_integration_tests::FakeCartApi;
use cocufum_storefront::services::cart::{CartSession, InMemoryCartIdStore};
use cocufum_storefront::shipping::ShippingCalculator;

fn stocked_api() -> Arc<FakeCartApi> {
    let api = Arc::new(FakeCartApi::new());
    api.stock_variant("gid://shopify/ProductVariant/1", "Striped Beach Towel", "20.00", &["towels-supplier"]);
    api.stock_variant("gid://shopify/ProductVariant/2", "Lavender Oil", "30.00", &["oils-supplier"]);
    api.stock_variant("gid://shopify/ProductVariant/3", "Glazed Vase", "45.00", &["ceramics-supplier"]);
    api
}

fn variant(n: u64) -> VariantId {
    VariantId::new(format!("gid://shopify/ProductVariant/{n}"))
}

#[tokio::test]
async fn test_cart_contents_drive_shipping_summary() {
    let api = stocked_api();
    let session = CartSession::new(Arc::clone(&api), Box::new(InMemoryCartIdStore::default()));
    let calculator = ShippingCalculator::with_default_suppliers();

    // 2 towels at 20.00 and 1 oil at 30.00
    session.add_item(variant(1), 2).await.unwrap();
    session.add_item(variant(2), 1).await.unwrap();

    let cart = session.snapshot().unwrap();
    let summary = calculator.calculate(&cart.lines);

    assert_eq!(summary.groups.len(), 2);
    assert_eq!(summary.total_subtotal, Decimal::new(7000, 2));
    assert_eq!(summary.total_items, 3);
    // 7.50 for towels plus 9.99 for oils, both below their thresholds
    assert_eq!(summary.total_shipping, Decimal::new(1749, 2));
    assert!(!summary.has_free_shipping);

    let towels = summary
        .groups
        .iter()
        .find(|g| g.supplier.id.as_str() == "beach-lifestyle")
        .unwrap();
    assert_eq!(towels.amount_to_free_shipping, Decimal::new(3500, 2));
}

#[tokio::test]
async fn test_summary_updates_as_cart_changes() {
    let api = stocked_api();
    let session = CartSession::new(Arc::clone(&api), Box::new(InMemoryCartIdStore::default()));
    let calculator = ShippingCalculator::with_default_suppliers();

    session.add_item(variant(1), 2).await.unwrap();
    let before = calculator.calculate(&session.snapshot().unwrap().lines);
    assert!(!before.has_free_shipping);

    // Two more towels push the group past the 75.00 threshold
    session.add_item(variant(1), 2).await.unwrap();
    let after = calculator.calculate(&session.snapshot().unwrap().lines);

    assert_eq!(after.total_subtotal, Decimal::new(8000, 2));
    assert_eq!(after.total_shipping, Decimal::ZERO);
    assert!(after.has_free_shipping);
}

#[tokio::test]
async fn test_tiered_supplier_in_full_flow() {
    let api = stocked_api();
    let session = CartSession::new(Arc::clone(&api), Box::new(InMemoryCartIdStore::default()));
    let calculator = ShippingCalculator::with_default_suppliers();

    // 2 vases at 45.00: below the 120.00 threshold, so 6.90 + 1 * 2.50
    session.add_item(variant(3), 2).await.unwrap();

    let summary = calculator.calculate(&session.snapshot().unwrap().lines);
    let ceramics = summary
        .groups
        .iter()
        .find(|g| g.supplier.id.as_str() == "artisan-ceramics")
        .unwrap();

    assert_eq!(ceramics.shipping_cost, Decimal::new(940, 2));
    assert_eq!(ceramics.amount_to_free_shipping, Decimal::new(3000, 2));
}

#[tokio::test]
async fn test_line_removal_reassigns_costs() {
    let api = stocked_api();
    let session = CartSession::new(Arc::clone(&api), Box::new(InMemoryCartIdStore::default()));
    let calculator = ShippingCalculator::with_default_suppliers();

    session.add_item(variant(1), 1).await.unwrap();
    let cart = session.add_item(variant(2), 1).await.unwrap();
    let oil_line = cart
        .lines
        .iter()
        .find(|l| l.merchandise.id == variant(2))
        .unwrap()
        .id
        .clone();

    session.remove_item(&oil_line).await.unwrap();
    let summary = calculator.calculate(&session.snapshot().unwrap().lines);

    // Only the towel group remains
    assert_eq!(summary.groups.len(), 1);
    assert_eq!(summary.total_shipping, Decimal::new(750, 2));
}
