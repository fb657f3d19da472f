//! Cocúfum Storefront library.
//!
//! This crate provides the storefront core as a library, allowing it to be
//! tested and reused: the Shopify Storefront API client, the multi-supplier
//! shipping calculator, and the cart synchronization layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod shipping;
pub mod shopify;
pub mod state;
