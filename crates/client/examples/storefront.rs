//! Run the launch sequence against a real backend and print the result.
//!
//! ```bash
//! MINISHOP_API_URL=http://localhost:8000/api/v1 cargo run --example storefront
//! ```
//!
//! Uses the detached host, so the backend will answer 401 unless it runs
//! with identity checks disabled.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use minishop_client::api::RemoteClient;
use minishop_client::bootstrap::AppBootstrap;
use minishop_client::config::ClientConfig;
use minishop_client::host::DetachedHost;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minishop_client=debug".into()),
        )
        .init();

    let config = ClientConfig::from_env()?;
    let host = Arc::new(DetachedHost);
    let api = RemoteClient::new(&config, host.as_ref())?;

    let app = AppBootstrap::new(api, host);
    app.run().await;

    match app.config().get() {
        Some(shop) => println!("shop: {} ({})", shop.shop_name, shop.currency),
        None => println!("shop config unavailable"),
    }
    println!(
        "cart: {} items, total {}",
        app.cart().total_items(),
        app.cart().total_price()
    );
    for line in app.cart().lines() {
        println!("  {} x{}", line.product.name, line.quantity);
    }
    println!("favorites: {}", app.favorites().items().len());

    Ok(())
}
