//! Shopfront Core - Shared types library.
//!
//! This crate provides the types shared by the Shopfront components:
//! - `storefront` - Commerce backend client and cart store
//! - `cli` - Terminal presentation of the catalog and cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Opaque backend identifiers, money formatting, free shipping

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
