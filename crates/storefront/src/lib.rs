//! Shopfront storefront library.
//!
//! This crate provides the commerce backend client and the client-side cart
//! store:
//!
//! - [`config`] - Environment configuration and backend selection
//! - [`shopify`] - Storefront API client, in-memory backend, domain types
//! - [`cart`] - Cart store and its local persistence

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod shopify;

pub use cart::{CartState, CartStorage, CartStore, CartStoreError};
pub use config::StorefrontConfig;
pub use shopify::{MockStorefront, StorefrontApi, StorefrontClient, connect};
