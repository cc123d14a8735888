//! # pharma-cart
//!
//! Pharmacy storefront API with simulated payments and prescription review.
//!
//! ## Usage
//!
//! ```bash
//! # Optional tuning
//! export RX_PAYMENT_DELAY_MS=2000
//! export RX_REVIEW_DELAY_MS=2000
//! export RX_AUTO_APPROVE=true
//!
//! # Run the server (reads config/products.toml and config/store.toml)
//! pharma-cart
//! ```

use rx_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Store: {}", state.settings.name);
    info!("Products loaded: {}", state.catalog.len());
    info!(
        "Payment methods: {:?}",
        state.checkout.strategies().providers()
    );

    let app = routes::create_router(state);

    info!("pharma-cart {} listening on http://{}", env!("CARGO_PKG_VERSION"), addr);

    if !is_prod {
        info!("Catalog: GET http://{}/api/v1/products", addr);
        info!("Cart: GET http://{}/api/v1/cart", addr);
        info!("Checkout: POST http://{}/api/v1/checkout", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
