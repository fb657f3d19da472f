//! Cart session error types.

use crate::shopify::ShopifyError;

/// Failure modes of the cart session, split by phase so callers can
/// distinguish "no cart at all" from "cart exists but the change failed".
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// No usable cart could be established (load and create both failed).
    #[error("could not establish a cart session: {0}")]
    Initialization(#[source] ShopifyError),

    /// A mutation against an established cart failed.
    #[error("cart update failed: {0}")]
    Modification(#[source] ShopifyError),
}

impl CartError {
    /// The underlying Shopify failure.
    #[must_use]
    pub const fn source_error(&self) -> &ShopifyError {
        match self {
            Self::Initialization(e) | Self::Modification(e) => e,
        }
    }
}
