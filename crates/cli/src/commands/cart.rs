//! Cart commands.
//!
//! Each command restores the persisted cart, reconciles it with the backend,
//! performs one action, and renders the resulting snapshot. Store failures
//! are shown as a banner above the view and then cleared.

use clap::Subcommand;
use shopfront_core::{LineId, MerchandiseId};
use shopfront_storefront::CartStore;

use crate::commands::Output;
use crate::render;

/// Cart actions.
#[derive(Debug, Clone, Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add merchandise (a product variant id) to the cart
    Add {
        /// Variant id, as listed by `shopfront product <HANDLE>`
        merchandise_id: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Set a line's quantity (0 or less removes it)
    Update {
        /// Cart line id, as listed by `shopfront cart show`
        line_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line from the cart
    Remove {
        /// Cart line id
        line_id: String,
    },
    /// Print the checkout URL
    Checkout,
}

/// Run a cart action against the store.
pub async fn run(store: &CartStore, action: CartAction) -> Output {
    if store.initialize().await.is_err() {
        return finish(store, None);
    }

    let result = match action {
        CartAction::Show => Ok(()),
        CartAction::Checkout => return checkout(store),
        CartAction::Add {
            merchandise_id,
            quantity,
        } => store
            .add_item(MerchandiseId::new(merchandise_id), quantity)
            .await
            .map(drop),
        CartAction::Update { line_id, quantity } => store
            .update_item(LineId::new(line_id), quantity)
            .await
            .map(drop),
        CartAction::Remove { line_id } => store.remove_item(LineId::new(line_id)).await.map(drop),
    };

    finish(store, result.err().map(|e| e.to_string()))
}

fn checkout(store: &CartStore) -> Output {
    match store.checkout_url() {
        Some(url) if store.total_items() > 0 => Output::ok(format!("Checkout: {url}")),
        _ => Output::ok("Your cart is empty".to_string()),
    }
}

/// Render the snapshot, then clear any error it carried.
fn finish(store: &CartStore, failure: Option<String>) -> Output {
    let state = store.snapshot();
    let success = failure.is_none() && state.error.is_none();
    let text = render::cart_view(&state, &store.free_shipping());
    store.clear_error();
    Output { text, success }
}
