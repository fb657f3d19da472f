//! Shopify Storefront API client implementation.
//!
//! Executes hand-written GraphQL documents over `reqwest` against the
//! Storefront endpoint. Cart operations are never cached (mutable state).

mod documents;
mod wire;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;

use cocufum_core::{CartId, CartLineId};

use crate::config::ShopifyStorefrontConfig;
use crate::services::cart::CartApi;
use crate::shopify::types::{Cart, CartLineInput, CartLineUpdateInput};
use crate::shopify::{GraphQLError, ShopifyError};

use wire::{
    CartCreateData, CartLinesAddData, CartLinesRemoveData, CartLinesUpdateData, CartQueryData,
    GraphQlResponse, WireCartPayload, convert_cart, join_user_errors,
};

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides type-safe access to cart operations. Cheap to clone.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let endpoint = format!(
            "https://{}/api/{}/graphql.json",
            config.store, config.api_version
        );

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint,
                access_token: config.storefront_private_token.expose_secret().to_string(),
            }),
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let request_body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            // See: https://shopify.dev/docs/storefronts/headless/building-with-the-storefront-api/getting-started
            .header(
                "Shopify-Storefront-Private-Token",
                &self.inner.access_token,
            )
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![GraphQLError::from_message(
                format!(
                    "HTTP {status}: {}",
                    response_text.chars().take(200).collect::<String>()
                ),
            )]));
        }

        let response: GraphQlResponse<T> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        // Check for GraphQL errors
        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            tracing::debug!(count = errors.len(), "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(GraphQLError::from).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::GraphQL(vec![GraphQLError::from_message("No data in response")])
        })
    }

    /// Unwrap a cart mutation payload, surfacing user errors and missing
    /// carts as typed failures.
    fn unwrap_payload(
        payload: Option<WireCartPayload>,
        cart_id: Option<&CartId>,
        operation: &str,
    ) -> Result<Cart, ShopifyError> {
        let Some(result) = payload else {
            return Err(ShopifyError::GraphQL(vec![GraphQLError::from_message(
                format!("{operation}: empty mutation payload"),
            )]));
        };

        if !result.user_errors.is_empty() {
            return Err(ShopifyError::UserError(join_user_errors(
                &result.user_errors,
            )));
        }

        result.cart.map(convert_cart).ok_or_else(|| match cart_id {
            // A null cart with no user errors means the id no longer
            // resolves to a live cart
            Some(id) => ShopifyError::NotFound(format!("Cart not found: {id}")),
            None => ShopifyError::GraphQL(vec![GraphQLError::from_message(format!(
                "{operation}: no cart in payload"
            ))]),
        })
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self, lines))]
    pub async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let variables = serde_json::json!({
            "input": { "lines": lines },
        });

        let data: CartCreateData = self
            .execute(&documents::with_cart_fields(documents::CREATE_CART), variables)
            .await?;

        Self::unwrap_payload(data.cart_create, None, "cartCreate")
    }

    /// Get an existing cart.
    ///
    /// Returns `Ok(None)` when the id no longer resolves to a live cart
    /// (expired or invalid) - an expected, recoverable outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request itself fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        let variables = serde_json::json!({ "cartId": cart_id });

        let data: CartQueryData = self
            .execute(&documents::with_cart_fields(documents::GET_CART), variables)
            .await?;

        Ok(data.cart.map(convert_cart))
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn add_to_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = serde_json::json!({
            "cartId": cart_id,
            "lines": lines,
        });

        let data: CartLinesAddData = self
            .execute(&documents::with_cart_fields(documents::ADD_TO_CART), variables)
            .await?;

        Self::unwrap_payload(data.cart_lines_add, Some(cart_id), "cartLinesAdd")
    }

    /// Update cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id))]
    pub async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = serde_json::json!({
            "cartId": cart_id,
            "lines": lines,
        });

        let data: CartLinesUpdateData = self
            .execute(
                &documents::with_cart_fields(documents::UPDATE_CART_LINES),
                variables,
            )
            .await?;

        Self::unwrap_payload(data.cart_lines_update, Some(cart_id), "cartLinesUpdate")
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id))]
    pub async fn remove_from_cart(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        let variables = serde_json::json!({
            "cartId": cart_id,
            "lineIds": line_ids,
        });

        let data: CartLinesRemoveData = self
            .execute(
                &documents::with_cart_fields(documents::REMOVE_FROM_CART),
                variables,
            )
            .await?;

        Self::unwrap_payload(data.cart_lines_remove, Some(cart_id), "cartLinesRemove")
    }
}

#[async_trait]
impl CartApi for StorefrontClient {
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        Self::create_cart(self, lines).await
    }

    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        Self::get_cart(self, cart_id).await
    }

    async fn add_to_cart(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        Self::add_to_cart(self, cart_id, lines).await
    }

    async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        Self::update_cart_lines(self, cart_id, lines).await
    }

    async fn remove_from_cart(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<Cart, ShopifyError> {
        Self::remove_from_cart(self, cart_id, line_ids).await
    }
}
