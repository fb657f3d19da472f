//! Application state shared across handlers.

use std::sync::{Arc, PoisonError, RwLock};

use crate::config::StorefrontConfig;
use crate::services::cart::{CartSession, InMemoryCartIdStore};
use crate::shipping::ShippingCalculator;
use crate::shopify::StorefrontClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the cart session and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cart: CartSession<StorefrontClient>,
    shipping: RwLock<ShippingCalculator>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let storefront = StorefrontClient::new(&config.shopify);
        let cart = CartSession::new(storefront, Box::new(InMemoryCartIdStore::default()));
        let shipping = RwLock::new(ShippingCalculator::with_default_suppliers());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                cart,
                shipping,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the cart session.
    #[must_use]
    pub fn cart(&self) -> &CartSession<StorefrontClient> {
        &self.inner.cart
    }

    /// Run a closure against the shipping calculator.
    ///
    /// Scoped access keeps the lock guard out of handler bodies so it can
    /// never be held across an await point.
    pub fn with_shipping<R>(&self, f: impl FnOnce(&ShippingCalculator) -> R) -> R {
        let calculator = self
            .inner
            .shipping
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&calculator)
    }

    /// Run a closure against the shipping calculator with mutable access.
    pub fn with_shipping_mut<R>(&self, f: impl FnOnce(&mut ShippingCalculator) -> R) -> R {
        let mut calculator = self
            .inner
            .shipping
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut calculator)
    }
}
