//! Integration test harness for the Cocúfum storefront.
//!
//! Provides [`FakeCartApi`], an in-memory stand-in for the Shopify
//! Storefront API. It mirrors the observable cart semantics the session
//! layer depends on:
//!
//! - adding the same variant twice merges into one line
//! - mutations against an unknown cart id fail with a not-found error
//! - carts can be expired out from under the session to exercise recovery
//!
//! Tests drive `CartSession` against this fake, so they cover the real
//! session logic without network access.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;

use cocufum_core::{CartId, CartLineId, Money, VariantId};
use cocufum_storefront::services::cart::CartApi;
use cocufum_storefront::shopify::ShopifyError;
use cocufum_storefront::shopify::types::{
    Cart, CartCost, CartLine, CartLineCost, CartLineInput, CartLineUpdateInput, CartMerchandise,
    CartMerchandiseProduct,
};

/// A variant in the fake catalog.
#[derive(Debug, Clone)]
pub struct FakeVariant {
    pub title: String,
    pub handle: String,
    pub price: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
struct FakeLine {
    id: u64,
    variant_id: VariantId,
    quantity: i64,
}

#[derive(Debug, Default)]
struct FakeState {
    catalog: HashMap<String, FakeVariant>,
    carts: HashMap<String, Vec<FakeLine>>,
    next_cart: u64,
    next_line: u64,
    create_failures: Vec<ShopifyError>,
    add_failures: Vec<ShopifyError>,
}

/// In-memory fake of the Storefront cart API.
#[derive(Debug, Default)]
pub struct FakeCartApi {
    state: Mutex<FakeState>,
}

impl FakeCartApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a purchasable variant.
    pub fn stock_variant(&self, variant_id: &str, title: &str, price: &str, tags: &[&str]) {
        self.lock().catalog.insert(
            variant_id.to_string(),
            FakeVariant {
                title: title.to_string(),
                handle: title.to_lowercase().replace(' ', "-"),
                price: price.to_string(),
                tags: tags.iter().map(ToString::to_string).collect(),
            },
        );
    }

    /// Delete a cart as if Shopify had expired it.
    pub fn expire_cart(&self, cart_id: &CartId) {
        self.lock().carts.remove(cart_id.as_str());
    }

    /// Queue a failure for the next `create_cart` call.
    pub fn fail_next_create(&self, error: ShopifyError) {
        self.lock().create_failures.push(error);
    }

    /// Queue a failure for the next `add_to_cart` call.
    pub fn fail_next_add(&self, error: ShopifyError) {
        self.lock().add_failures.push(error);
    }

    /// Ids of carts that currently exist on the fake backend.
    #[must_use]
    pub fn live_cart_ids(&self) -> Vec<CartId> {
        self.lock().carts.keys().map(CartId::new).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn missing_cart_error(cart_id: &CartId) -> ShopifyError {
    ShopifyError::NotFound(format!("Cart not found: {cart_id}"))
}

fn build_cart(state: &FakeState, cart_id: &str, lines: &[FakeLine]) -> Cart {
    let cart_lines: Vec<CartLine> = lines
        .iter()
        .map(|line| build_cart_line(state, line))
        .collect();

    let subtotal: Decimal = cart_lines
        .iter()
        .map(|l| l.cost.total_amount.decimal().unwrap_or_default())
        .sum();
    let total_quantity = cart_lines.iter().map(|l| l.quantity).sum();

    Cart {
        id: CartId::new(cart_id),
        checkout_url: format!("https://cocufum.myshopify.com/checkouts/{cart_id}"),
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: "2026-01-01T00:00:00Z".to_string(),
        note: None,
        total_quantity,
        cost: CartCost {
            subtotal: Money::new(subtotal.to_string(), "EUR"),
            total: Money::new(subtotal.to_string(), "EUR"),
            total_tax: None,
        },
        lines: cart_lines,
    }
}

fn build_cart_line(state: &FakeState, line: &FakeLine) -> CartLine {
    let variant = state
        .catalog
        .get(line.variant_id.as_str())
        .cloned()
        .unwrap_or(FakeVariant {
            title: "Unknown".to_string(),
            handle: "unknown".to_string(),
            price: "0.00".to_string(),
            tags: Vec::new(),
        });

    let unit = variant.price.parse::<Decimal>().unwrap_or_default();
    let total = unit * Decimal::from(line.quantity);

    CartLine {
        id: CartLineId::new(format!("gid://shopify/CartLine/{}", line.id)),
        quantity: line.quantity,
        cost: CartLineCost {
            amount_per_quantity: Money::new(variant.price.clone(), "EUR"),
            subtotal_amount: Money::new(total.to_string(), "EUR"),
            total_amount: Money::new(total.to_string(), "EUR"),
        },
        merchandise: CartMerchandise {
            id: line.variant_id.clone(),
            title: "Default Title".to_string(),
            available_for_sale: true,
            price: Money::new(variant.price.clone(), "EUR"),
            image: None,
            product: CartMerchandiseProduct {
                id: format!("gid://shopify/Product/{}", variant.handle),
                handle: variant.handle.clone(),
                title: variant.title.clone(),
                vendor: "Cocúfum".to_string(),
                tags: variant.tags.clone(),
                featured_image: None,
            },
        },
    }
}

fn apply_add(state: &mut FakeState, cart_id: &str, inputs: Vec<CartLineInput>) {
    for input in inputs {
        state.next_line += 1;
        let next_line = state.next_line;
        let Some(lines) = state.carts.get_mut(cart_id) else {
            continue;
        };
        // Shopify merges repeated variants into a single line
        match lines
            .iter_mut()
            .find(|l| l.variant_id == input.merchandise_id)
        {
            Some(existing) => existing.quantity += input.quantity,
            None => lines.push(FakeLine {
                id: next_line,
                variant_id: input.merchandise_id,
                quantity: input.quantity,
            }),
        }
    }
}

#[async_trait]
impl CartApi for FakeCartApi {
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let mut state = self.lock();
        if !state.create_failures.is_empty() {
            return Err(state.create_failures.remove(0));
        }

        state.next_cart += 1;
        let cart_id = format!("gid://shopify/Cart/{}", state.next_cart);
        state.carts.insert(cart_id.clone(), Vec::new());
        apply_add(&mut state, &cart_id, lines);

        let cart_lines = state.carts[&cart_id].clone();
        Ok(build_cart(&state, &cart_id, &cart_lines))
    }

    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        let state = self.lock();
        Ok(state
            .carts
            .get(cart_id.as_str())
            .map(|lines| build_cart(&state, cart_id.as_str(), lines)))
    }

    async fn add_to_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let mut state = self.lock();
        if !state.add_failures.is_empty() {
            return Err(state.add_failures.remove(0));
        }
        if !state.carts.contains_key(cart_id.as_str()) {
            return Err(missing_cart_error(cart_id));
        }

        for input in &lines {
            if !state.catalog.contains_key(input.merchandise_id.as_str()) {
                return Err(ShopifyError::UserError(
                    "The merchandise you are trying to add is unavailable".to_string(),
                ));
            }
        }

        apply_add(&mut state, cart_id.as_str(), lines);
        let cart_lines = state.carts[cart_id.as_str()].clone();
        Ok(build_cart(&state, cart_id.as_str(), &cart_lines))
    }

    async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        let mut state = self.lock();
        let Some(cart_lines) = state.carts.get_mut(cart_id.as_str()) else {
            return Err(missing_cart_error(cart_id));
        };

        for update in lines {
            let line_id = update
                .id
                .as_str()
                .rsplit('/')
                .next()
                .and_then(|s| s.parse::<u64>().ok());
            match cart_lines.iter_mut().find(|l| Some(l.id) == line_id) {
                Some(line) => line.quantity = update.quantity,
                None => {
                    return Err(ShopifyError::UserError(
                        "The specified line could not be found".to_string(),
                    ));
                }
            }
        }

        let cart_lines = state.carts[cart_id.as_str()].clone();
        Ok(build_cart(&state, cart_id.as_str(), &cart_lines))
    }

    async fn remove_from_cart(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        let mut state = self.lock();
        let Some(cart_lines) = state.carts.get_mut(cart_id.as_str()) else {
            return Err(missing_cart_error(cart_id));
        };

        let targets: Vec<u64> = line_ids
            .iter()
            .filter_map(|id| id.as_str().rsplit('/').next())
            .filter_map(|s| s.parse().ok())
            .collect();
        cart_lines.retain(|l| !targets.contains(&l.id));

        let cart_lines = state.carts[cart_id.as_str()].clone();
        Ok(build_cart(&state, cart_id.as_str(), &cart_lines))
    }
}
