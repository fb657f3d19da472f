//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - Shopify is source of truth - NO local sync, direct API calls
//! - Hand-written GraphQL documents with typed serde response structs
//! - Cart snapshots are never cached (mutable state)
//!
//! # Example
//!
//! ```rust,ignore
//! use cocufum_storefront::shopify::StorefrontClient;
//! use cocufum_storefront::shopify::types::CartLineInput;
//!
//! let client = StorefrontClient::new(&config.shopify);
//!
//! // Create a cart and add an item
//! let cart = client.create_cart(Vec::new()).await?;
//! let cart = client.add_to_cart(&cart.id, vec![CartLineInput {
//!     merchandise_id: variant_id,
//!     quantity: 1,
//! }]).await?;
//! ```

mod storefront;
pub mod types;

pub use storefront::StorefrontClient;

use thiserror::Error;

/// Errors that can occur when interacting with the Storefront API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),
}

impl ShopifyError {
    /// Whether this error signals that the remote cart id is invalid or the
    /// cart has expired.
    ///
    /// The cart session uses this to decide between "recreate the cart and
    /// retry" and "surface the failure to the caller".
    #[must_use]
    pub fn indicates_missing_cart(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::UserError(message) => mentions_missing_cart(message),
            Self::GraphQL(errors) => errors.iter().any(|e| mentions_missing_cart(&e.message)),
            _ => false,
        }
    }
}

/// Check an error message for the phrasings Shopify uses for invalid cart ids.
fn mentions_missing_cart(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("does not exist") || message.contains("could not find cart")
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// Build an error carrying only a message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
