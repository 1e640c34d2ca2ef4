//! Shopfront CLI - Browse the catalog and manage a cart from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse against the mock demo backend (carts kept under STOREFRONT_DATA_DIR)
//! STOREFRONT_BACKEND=mock shopfront products
//!
//! # Search and sort
//! shopfront products --query manicure --sort price --reverse
//!
//! # Show a product with its variant ids
//! shopfront product classic-manicure
//!
//! # Cart
//! shopfront cart add gid://shopify/ProductVariant/1 --quantity 2
//! shopfront cart show
//! shopfront cart checkout
//! ```
//!
//! # Commands
//!
//! - `products` - List products
//! - `product` - Show a product
//! - `collections` - List collections
//! - `collection` - Show a collection and its products
//! - `cart` - Show and change the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_storefront::cart::{CartStorage, CartStore};
use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::shopify::{self, ProductSortKey, ProductsQuery};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod render;

use commands::Output;
use commands::cart::CartAction;
use error::CliError;

/// Products embedded in a collection page.
const DEFAULT_COLLECTION_PRODUCTS: i64 = 20;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Search query
        #[arg(short, long)]
        query: Option<String>,

        /// Sort key (title, price, best-selling, created-at, ...)
        #[arg(short, long, default_value = "created-at")]
        sort: ProductSortKey,

        /// Reverse the sort order
        #[arg(short, long)]
        reverse: bool,

        /// Page size
        #[arg(short, long, default_value_t = ProductsQuery::DEFAULT_PAGE_SIZE)]
        first: i64,

        /// Cursor from a previous page
        #[arg(short, long)]
        after: Option<String>,
    },
    /// Show a product
    Product {
        /// Product handle
        handle: String,
    },
    /// List collections
    Collections,
    /// Show a collection
    Collection {
        /// Collection handle
        handle: String,

        /// Number of products to show
        #[arg(short, long, default_value_t = DEFAULT_COLLECTION_PRODUCTS)]
        first: i64,
    },
    /// Show and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_storefront=info,shopfront_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _sentry_guard = init_sentry(&config);

    match run(cli, &config).await {
        Ok(output) => {
            print_output(&output.text);
            if output.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            e.capture();
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_output(text: &str) {
    println!("{text}");
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<Output, CliError> {
    let api = shopify::connect(config).await;

    match cli.command {
        Commands::Products {
            query,
            sort,
            reverse,
            first,
            after,
        } => {
            let query = ProductsQuery {
                query,
                sort_key: sort,
                reverse,
                first,
                after,
            };
            commands::catalog::products(api.as_ref(), query).await
        }
        Commands::Product { handle } => commands::catalog::product(api.as_ref(), &handle).await,
        Commands::Collections => commands::catalog::collections(api.as_ref()).await,
        Commands::Collection { handle, first } => {
            commands::catalog::collection(api.as_ref(), &handle, first).await
        }
        Commands::Cart { action } => {
            let store = CartStore::restore(api, CartStorage::new(&config.data_dir)).await;
            Ok(commands::cart::run(&store, action).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_parse_products_flags() {
        let cli = Cli::try_parse_from([
            "shopfront", "products", "--sort", "price", "--reverse", "--first", "5",
        ])
        .unwrap();
        let Commands::Products {
            sort,
            reverse,
            first,
            ..
        } = cli.command
        else {
            panic!("expected products command");
        };
        assert_eq!(sort, ProductSortKey::Price);
        assert!(reverse);
        assert_eq!(first, 5);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_parse_negative_update() {
        let cli = Cli::try_parse_from(["shopfront", "cart", "update", "line-1", "-1"]).unwrap();
        let Commands::Cart {
            action: CartAction::Update { quantity, .. },
        } = cli.command
        else {
            panic!("expected cart update");
        };
        assert_eq!(quantity, -1);
    }
}
