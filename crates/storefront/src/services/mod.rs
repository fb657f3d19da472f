//! Application services.

pub mod cart;
