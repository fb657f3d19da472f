//! Cart route handlers.
//!
//! Every mutation responds with the full cart payload (snapshot plus shipping
//! summary) so clients can re-render from a single source of truth.

use axum::{
    Json,
    extract::{Path, State},
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cocufum_core::{CartLineId, VariantId};

use crate::error::{AppError, Result};
use crate::shipping::ShippingCostSummary;
use crate::shopify::types::Cart;
use crate::state::AppState;

/// Cart payload returned by every cart endpoint.
#[derive(Debug, Serialize)]
pub struct CartPayload {
    /// The current cart, absent until a session is established.
    pub cart: Option<Cart>,
    /// Total item count across all lines.
    pub count: i64,
    /// Shipping summary for the current cart contents.
    pub shipping: ShippingCostSummary,
    /// Whether the cart drawer should be shown.
    pub open: bool,
}

/// Request body for adding a variant to the cart.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub variant_id: VariantId,
    /// Defaults to 1.
    pub quantity: Option<i64>,
}

/// Request body for changing a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub line_id: CartLineId,
    pub quantity: i64,
}

/// Build the cart payload from the current session state.
///
/// The shipping summary is recomputed from the snapshot on every call;
/// nothing about it is cached or persisted.
fn cart_payload(state: &AppState) -> CartPayload {
    let cart = state.cart().snapshot();
    let lines = cart.as_ref().map(|c| c.lines.as_slice()).unwrap_or(&[]);
    let shipping = state.with_shipping(|calc| calc.calculate(lines));

    CartPayload {
        count: state.cart().cart_count(),
        open: state.cart().is_open(),
        cart,
        shipping,
    }
}

/// GET /cart - cart snapshot with shipping summary.
///
/// Establishes a cart session on first call (loading the stored cart or
/// creating a fresh one).
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<CartPayload>> {
    state.cart().ensure_initialized().await?;
    Ok(Json(cart_payload(&state)))
}

/// POST /cart/items - add a variant to the cart.
#[instrument(skip(state), fields(variant_id = %request.variant_id))]
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartPayload>> {
    let quantity = request.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }

    state.cart().add_item(request.variant_id, quantity).await?;
    Ok(Json(cart_payload(&state)))
}

/// PATCH /cart/items - change a line's quantity.
///
/// A quantity below one removes the line, matching the behavior of a
/// stepper control decremented past zero.
#[instrument(skip(state), fields(line_id = %request.line_id))]
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartPayload>> {
    if request.quantity < 1 {
        state.cart().remove_item(&request.line_id).await?;
    } else {
        state
            .cart()
            .update_quantity(&request.line_id, request.quantity)
            .await?;
    }
    Ok(Json(cart_payload(&state)))
}

/// DELETE /cart/items/{line_id} - remove a line.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(line_id): Path<CartLineId>,
) -> Result<Json<CartPayload>> {
    state.cart().remove_item(&line_id).await?;
    Ok(Json(cart_payload(&state)))
}

/// GET /cart/count - item count badge.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Json<CartCount> {
    Json(CartCount {
        count: state.cart().cart_count(),
        loading: state.cart().is_loading(),
    })
}

/// Response body for the count badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: i64,
    pub loading: bool,
}

/// GET /cart/checkout - redirect to Shopify checkout.
#[instrument(skip(state))]
pub async fn checkout(State(state): State<AppState>) -> Result<Redirect> {
    let cart: Cart = state.cart().ensure_initialized().await?;
    Ok(Redirect::to(&cart.checkout_url))
}
