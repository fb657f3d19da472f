//! Cart session management.
//!
//! Wraps the Storefront cart API in a session that owns the current cart id
//! and snapshot, recreates carts that Shopify has expired, and serializes
//! mutations so concurrent UI actions cannot interleave against a cart id
//! that is being replaced mid-flight.

mod error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use cocufum_core::{CartId, CartLineId, VariantId};

use crate::shopify::ShopifyError;
use crate::shopify::types::{Cart, CartLineInput, CartLineUpdateInput};

pub use error::CartError;

// =============================================================================
// CartApi
// =============================================================================

/// Cart operations against the Storefront API.
///
/// [`crate::shopify::StorefrontClient`] is the production implementation;
/// tests substitute an in-memory fake.
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError>;

    /// `Ok(None)` means the id no longer resolves to a live cart.
    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError>;

    async fn add_to_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError>;

    async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError>;

    async fn remove_from_cart(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError>;
}

#[async_trait]
impl<T: CartApi> CartApi for Arc<T> {
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        (**self).create_cart(lines).await
    }

    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        (**self).get_cart(cart_id).await
    }

    async fn add_to_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        (**self).add_to_cart(cart_id, lines).await
    }

    async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        (**self).update_cart_lines(cart_id, lines).await
    }

    async fn remove_from_cart(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        (**self).remove_from_cart(cart_id, line_ids).await
    }
}

// =============================================================================
// CartIdStore
// =============================================================================

/// Persistence for the current cart id across sessions.
///
/// The store is advisory: a stored id may point at a cart Shopify has since
/// expired, and the session recovers from that transparently.
pub trait CartIdStore: Send + Sync {
    fn get(&self) -> Option<CartId>;
    fn set(&self, cart_id: &CartId);
    fn clear(&self);
}

/// Process-local cart id store.
#[derive(Debug, Default)]
pub struct InMemoryCartIdStore {
    slot: std::sync::Mutex<Option<CartId>>,
}

impl InMemoryCartIdStore {
    /// A store pre-seeded with a cart id, as if persisted by a prior session.
    #[must_use]
    pub fn with_cart_id(cart_id: CartId) -> Self {
        Self {
            slot: std::sync::Mutex::new(Some(cart_id)),
        }
    }
}

impl CartIdStore for InMemoryCartIdStore {
    fn get(&self) -> Option<CartId> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, cart_id: &CartId) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(cart_id.clone());
    }

    fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

// =============================================================================
// CartSession
// =============================================================================

/// Cart session: the single authority over cart state for this process.
///
/// All mutations funnel through an internal async mutex, so at most one
/// cart operation is in flight at a time. The snapshot is only ever replaced
/// with a cart returned by a successful API call.
pub struct CartSession<A: CartApi> {
    api: A,
    ids: Box<dyn CartIdStore>,
    /// Serializes initialization and mutations.
    mutations: tokio::sync::Mutex<()>,
    snapshot: RwLock<Option<Cart>>,
    busy: AtomicBool,
    open: AtomicBool,
}

/// Clears the busy flag when the operation ends, on any path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<A: CartApi> CartSession<A> {
    pub fn new(api: A, ids: Box<dyn CartIdStore>) -> Self {
        Self {
            api,
            ids,
            mutations: tokio::sync::Mutex::new(()),
            snapshot: RwLock::new(None),
            busy: AtomicBool::new(false),
            open: AtomicBool::new(false),
        }
    }

    /// Ensure a live cart exists, loading or creating one as needed.
    ///
    /// Idempotent: once a snapshot is held, this returns it without touching
    /// the network.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Initialization`] when neither loading nor
    /// creating a cart succeeds.
    pub async fn ensure_initialized(&self) -> Result<Cart, CartError> {
        let _busy = self.mark_busy();
        let _permit = self.mutations.lock().await;

        if let Some(cart) = self.read_snapshot() {
            return Ok(cart);
        }
        self.initialize().await
    }

    /// Load the stored cart or create a fresh one. Caller holds the
    /// mutation lock.
    async fn initialize(&self) -> Result<Cart, CartError> {
        if let Some(cart_id) = self.ids.get() {
            match self.api.get_cart(&cart_id).await {
                Ok(Some(cart)) => {
                    self.commit(cart.clone());
                    return Ok(cart);
                }
                Ok(None) => {
                    // Expired or invalid cart id: recreate silently
                    tracing::info!(%cart_id, "stored cart no longer exists, creating a new one");
                    self.ids.clear();
                }
                Err(e) => return Err(CartError::Initialization(e)),
            }
        }

        self.create_fresh_cart().await
    }

    /// Create an empty cart and make it current. Caller holds the
    /// mutation lock.
    async fn create_fresh_cart(&self) -> Result<Cart, CartError> {
        let cart = self
            .api
            .create_cart(Vec::new())
            .await
            .map_err(CartError::Initialization)?;

        self.ids.set(&cart.id);
        self.commit(cart.clone());
        Ok(cart)
    }

    /// Add a variant to the cart, opening the cart drawer on success.
    ///
    /// When the cart id turns out to be stale (expired between page load and
    /// the click), a fresh cart is created and the add is retried exactly
    /// once.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Initialization`] when no cart could be
    /// established, [`CartError::Modification`] when the add itself fails.
    pub async fn add_item(&self, variant_id: VariantId, quantity: i64) -> Result<Cart, CartError> {
        let _busy = self.mark_busy();
        let _permit = self.mutations.lock().await;

        let cart = match self.read_snapshot() {
            Some(cart) => cart,
            None => self.initialize().await?,
        };

        let lines = vec![CartLineInput {
            merchandise_id: variant_id.clone(),
            quantity,
        }];

        let cart = match self.api.add_to_cart(&cart.id, lines.clone()).await {
            Ok(cart) => cart,
            Err(e) if e.indicates_missing_cart() => {
                tracing::warn!(cart_id = %cart.id, error = %e, "cart vanished during add, retrying with a fresh cart");
                self.ids.clear();
                self.clear_snapshot();
                let fresh = self.create_fresh_cart().await?;
                self.api
                    .add_to_cart(&fresh.id, lines)
                    .await
                    .map_err(CartError::Modification)?
            }
            Err(e) => return Err(CartError::Modification(e)),
        };

        self.commit(cart.clone());
        self.open.store(true, Ordering::Release);
        Ok(cart)
    }

    /// Remove a line from the cart.
    ///
    /// With no cart established there is nothing to remove; this is a
    /// logged no-op rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Modification`] when the removal fails.
    pub async fn remove_item(&self, line_id: &CartLineId) -> Result<(), CartError> {
        let _busy = self.mark_busy();
        let _permit = self.mutations.lock().await;

        let Some(cart) = self.read_snapshot() else {
            tracing::warn!(%line_id, "remove requested with no cart, ignoring");
            return Ok(());
        };

        let cart = self
            .api
            .remove_from_cart(&cart.id, vec![line_id.clone()])
            .await
            .map_err(CartError::Modification)?;

        self.commit(cart);
        Ok(())
    }

    /// Set the quantity of an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Modification`] when the update fails.
    pub async fn update_quantity(
        &self,
        line_id: &CartLineId,
        quantity: i64,
    ) -> Result<(), CartError> {
        let _busy = self.mark_busy();
        let _permit = self.mutations.lock().await;

        let Some(cart) = self.read_snapshot() else {
            tracing::warn!(%line_id, "quantity update requested with no cart, ignoring");
            return Ok(());
        };

        let lines = vec![CartLineUpdateInput {
            id: line_id.clone(),
            quantity,
        }];

        let cart = self
            .api
            .update_cart_lines(&cart.id, lines)
            .await
            .map_err(CartError::Modification)?;

        self.commit(cart);
        Ok(())
    }

    /// The current cart snapshot, if a cart has been established.
    #[must_use]
    pub fn snapshot(&self) -> Option<Cart> {
        self.read_snapshot()
    }

    /// Total item count across all lines (zero with no cart).
    #[must_use]
    pub fn cart_count(&self) -> i64 {
        self.read_snapshot()
            .map_or(0, |cart| cart.lines.iter().map(|l| l.quantity).sum())
    }

    /// Whether a cart operation is currently in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Open the cart drawer.
    pub fn open_cart(&self) {
        self.open.store(true, Ordering::Release);
    }

    /// Close the cart drawer.
    pub fn close_cart(&self) {
        self.open.store(false, Ordering::Release);
    }

    /// Whether the cart drawer is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn mark_busy(&self) -> BusyGuard<'_> {
        self.busy.store(true, Ordering::Release);
        BusyGuard(&self.busy)
    }

    fn read_snapshot(&self) -> Option<Cart> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear_snapshot(&self) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Replace the snapshot with a cart returned by a successful API call.
    fn commit(&self, cart: Cart) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(cart);
    }
}
