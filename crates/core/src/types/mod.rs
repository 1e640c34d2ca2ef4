//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod shipping;

pub use id::*;
pub use price::{CurrencyFormat, format_money, parse_amount};
pub use shipping::{
    FREE_SHIPPING_THRESHOLD, free_shipping_progress, is_eligible_for_free_shipping,
    remaining_for_free_shipping,
};
