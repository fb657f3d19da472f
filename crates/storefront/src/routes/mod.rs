//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Health check
//!
//! # Cart (JSON)
//! GET    /cart                  - Cart snapshot with shipping summary
//! POST   /cart/items            - Add a variant to the cart
//! PATCH  /cart/items            - Change a line's quantity
//! DELETE /cart/items/{line_id}  - Remove a line
//! GET    /cart/count            - Item count badge
//! GET    /cart/checkout         - Redirect to Shopify checkout
//! ```

pub mod cart;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/items", post(cart::add).patch(cart::update))
        .route("/cart/items/{line_id}", delete(cart::remove))
        .route("/cart/count", get(cart::count))
        .route("/cart/checkout", get(cart::checkout))
}

/// Create the complete application router.
pub fn routes() -> Router<AppState> {
    Router::new().merge(cart_routes())
}
