//! GraphQL documents for the Storefront API cart operations.
//!
//! The cart selection set is shared across every operation so that each
//! response deserializes into the same wire shape.

/// Shared cart selection set.
const CART_FIELDS: &str = r"
fragment CartFields on Cart {
  id
  checkoutUrl
  createdAt
  updatedAt
  note
  totalQuantity
  cost {
    subtotalAmount { amount currencyCode }
    totalAmount { amount currencyCode }
    totalTaxAmount { amount currencyCode }
  }
  lines(first: 250) {
    nodes {
      id
      quantity
      cost {
        amountPerQuantity { amount currencyCode }
        subtotalAmount { amount currencyCode }
        totalAmount { amount currencyCode }
      }
      merchandise {
        ... on ProductVariant {
          id
          title
          availableForSale
          price { amount currencyCode }
          image { url altText }
          product {
            id
            handle
            title
            vendor
            tags
            featuredImage { url altText }
          }
        }
      }
    }
  }
}";

pub(super) const CREATE_CART: &str = r"
mutation createCart($input: CartInput!) {
  cartCreate(input: $input) {
    cart { ...CartFields }
    userErrors { field message }
  }
}";

pub(super) const GET_CART: &str = r"
query getCart($cartId: ID!) {
  cart(id: $cartId) { ...CartFields }
}";

pub(super) const ADD_TO_CART: &str = r"
mutation addToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { field message }
  }
}";

pub(super) const UPDATE_CART_LINES: &str = r"
mutation updateCartLines($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { field message }
  }
}";

pub(super) const REMOVE_FROM_CART: &str = r"
mutation removeFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { ...CartFields }
    userErrors { field message }
  }
}";

/// Append the shared cart fragment to an operation.
pub(super) fn with_cart_fields(operation: &str) -> String {
    format!("{operation}\n{CART_FIELDS}")
}
