//! Wire representation of Storefront API responses.
//!
//! Serde mirrors of the GraphQL selection sets in [`super::documents`], plus
//! conversions into the domain types in [`crate::shopify::types`]. Keeping
//! the wire shape separate lets the rest of the crate work with clean types
//! regardless of how Shopify nests its payloads.

use cocufum_core::{CartId, CartLineId, Money, VariantId};
use serde::Deserialize;

use crate::shopify::types::{
    Cart, CartCost, CartLine, CartLineCost, CartMerchandise, CartMerchandiseProduct, Image,
};
use crate::shopify::{GraphQLError, GraphQLErrorLocation};

// =============================================================================
// GraphQL envelope
// =============================================================================

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub(super) struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<WireGraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireGraphQlError {
    pub message: String,
    #[serde(default)]
    pub locations: Vec<WireGraphQlErrorLocation>,
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireGraphQlErrorLocation {
    pub line: i64,
    pub column: i64,
}

impl From<WireGraphQlError> for GraphQLError {
    fn from(e: WireGraphQlError) -> Self {
        Self {
            message: e.message,
            locations: e
                .locations
                .into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: l.line,
                    column: l.column,
                })
                .collect(),
            path: e.path,
        }
    }
}

// =============================================================================
// Operation payloads
// =============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct CartQueryData {
    pub cart: Option<WireCart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CartCreateData {
    pub cart_create: Option<WireCartPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CartLinesAddData {
    pub cart_lines_add: Option<WireCartPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CartLinesUpdateData {
    pub cart_lines_update: Option<WireCartPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CartLinesRemoveData {
    pub cart_lines_remove: Option<WireCartPayload>,
}

/// Mutation payload: the updated cart plus any user errors.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireCartPayload {
    pub cart: Option<WireCart>,
    #[serde(default)]
    pub user_errors: Vec<WireUserError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireUserError {
    pub message: String,
}

/// Join user error messages into a single display string.
pub(super) fn join_user_errors(errors: &[WireUserError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Cart wire types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireCart {
    pub id: String,
    pub checkout_url: String,
    pub created_at: String,
    pub updated_at: String,
    pub note: Option<String>,
    pub total_quantity: i64,
    pub cost: WireCartCost,
    pub lines: WireCartLines,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireCartCost {
    pub subtotal_amount: WireMoney,
    pub total_amount: WireMoney,
    pub total_tax_amount: Option<WireMoney>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireCartLines {
    pub nodes: Vec<WireCartLine>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireCartLine {
    pub id: String,
    pub quantity: i64,
    pub cost: WireCartLineCost,
    pub merchandise: WireMerchandise,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireCartLineCost {
    pub amount_per_quantity: WireMoney,
    pub subtotal_amount: WireMoney,
    pub total_amount: WireMoney,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireMerchandise {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub price: WireMoney,
    pub image: Option<WireImage>,
    pub product: WireMerchandiseProduct,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireMerchandiseProduct {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub vendor: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub featured_image: Option<WireImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireImage {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireMoney {
    pub amount: String,
    pub currency_code: String,
}

// =============================================================================
// Conversions into domain types
// =============================================================================

pub(super) fn convert_cart(cart: WireCart) -> Cart {
    Cart {
        id: CartId::new(cart.id),
        checkout_url: cart.checkout_url,
        created_at: cart.created_at,
        updated_at: cart.updated_at,
        note: cart.note,
        total_quantity: cart.total_quantity,
        cost: CartCost {
            subtotal: convert_money(cart.cost.subtotal_amount),
            total: convert_money(cart.cost.total_amount),
            total_tax: cart.cost.total_tax_amount.map(convert_money),
        },
        lines: cart.lines.nodes.into_iter().map(convert_cart_line).collect(),
    }
}

fn convert_cart_line(line: WireCartLine) -> CartLine {
    CartLine {
        id: CartLineId::new(line.id),
        quantity: line.quantity,
        cost: CartLineCost {
            amount_per_quantity: convert_money(line.cost.amount_per_quantity),
            subtotal_amount: convert_money(line.cost.subtotal_amount),
            total_amount: convert_money(line.cost.total_amount),
        },
        merchandise: convert_merchandise(line.merchandise),
    }
}

fn convert_merchandise(merchandise: WireMerchandise) -> CartMerchandise {
    CartMerchandise {
        id: VariantId::new(merchandise.id),
        title: merchandise.title,
        available_for_sale: merchandise.available_for_sale,
        price: convert_money(merchandise.price),
        image: merchandise.image.map(convert_image),
        product: CartMerchandiseProduct {
            id: merchandise.product.id,
            handle: merchandise.product.handle,
            title: merchandise.product.title,
            vendor: merchandise.product.vendor,
            tags: merchandise.product.tags,
            featured_image: merchandise.product.featured_image.map(convert_image),
        },
    }
}

fn convert_image(image: WireImage) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text,
    }
}

fn convert_money(money: WireMoney) -> Money {
    Money {
        amount: money.amount,
        currency_code: money.currency_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_deserializes_and_converts() {
        let json = serde_json::json!({
            "id": "gid://shopify/Cart/abc",
            "checkoutUrl": "https://cocufum.myshopify.com/checkouts/abc",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "note": null,
            "totalQuantity": 2,
            "cost": {
                "subtotalAmount": { "amount": "40.0", "currencyCode": "EUR" },
                "totalAmount": { "amount": "40.0", "currencyCode": "EUR" },
                "totalTaxAmount": null
            },
            "lines": {
                "nodes": [{
                    "id": "gid://shopify/CartLine/1",
                    "quantity": 2,
                    "cost": {
                        "amountPerQuantity": { "amount": "20.0", "currencyCode": "EUR" },
                        "subtotalAmount": { "amount": "40.0", "currencyCode": "EUR" },
                        "totalAmount": { "amount": "40.0", "currencyCode": "EUR" }
                    },
                    "merchandise": {
                        "id": "gid://shopify/ProductVariant/1",
                        "title": "Default Title",
                        "availableForSale": true,
                        "price": { "amount": "20.0", "currencyCode": "EUR" },
                        "image": null,
                        "product": {
                            "id": "gid://shopify/Product/1",
                            "handle": "striped-beach-towel",
                            "title": "Striped Beach Towel",
                            "vendor": "Cocúfum",
                            "tags": ["towels-supplier", "summer"],
                            "featuredImage": null
                        }
                    }
                }]
            }
        });

        let wire: WireCart = serde_json::from_value(json).expect("deserialize");
        let cart = convert_cart(wire);

        assert_eq!(cart.id.as_str(), "gid://shopify/Cart/abc");
        assert_eq!(cart.total_quantity, 2);
        assert_eq!(cart.lines.len(), 1);
        let line = cart.lines.first().expect("one line");
        assert_eq!(line.merchandise.product.tags, vec!["towels-supplier", "summer"]);
        assert_eq!(line.cost.amount_per_quantity.amount, "20.0");
    }

    #[test]
    fn test_join_user_errors() {
        let errors = vec![
            WireUserError { message: "Variant is sold out".to_string() },
            WireUserError { message: "Invalid quantity".to_string() },
        ];
        assert_eq!(
            join_user_errors(&errors),
            "Variant is sold out; Invalid quantity"
        );
    }
}
