//! Free-shipping threshold helpers.
//!
//! The threshold is currency-agnostic: it is compared against the cart
//! subtotal amount string as returned by the backend. Subtotals that do not
//! parse are treated as zero.

use rust_decimal::Decimal;

use super::price::parse_amount;

/// Subtotal at or above which an order ships for free (79.00).
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(7900, 0, 0, false, 2);

fn subtotal_value(subtotal: &str) -> Decimal {
    parse_amount(subtotal).unwrap_or(Decimal::ZERO)
}

/// Whether a subtotal qualifies for free shipping.
#[must_use]
pub fn is_eligible_for_free_shipping(subtotal: &str) -> bool {
    subtotal_value(subtotal) >= FREE_SHIPPING_THRESHOLD
}

/// Amount still needed to reach free shipping, never negative.
#[must_use]
pub fn remaining_for_free_shipping(subtotal: &str) -> Decimal {
    (FREE_SHIPPING_THRESHOLD - subtotal_value(subtotal)).max(Decimal::ZERO)
}

/// Progress toward free shipping as a percentage in `0..=100`.
#[must_use]
pub fn free_shipping_progress(subtotal: &str) -> Decimal {
    let percent = subtotal_value(subtotal) / FREE_SHIPPING_THRESHOLD * Decimal::ONE_HUNDRED;
    percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}
