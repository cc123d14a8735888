//! # rx-api
//!
//! HTTP API layer for pharma-cart-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server around a single session cart
//! - REST endpoints for the catalog, cart, prescriptions and checkout
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/products` | Search products (`category`, `q`) |
//! | GET | `/api/v1/products/{id}` | Get product |
//! | GET | `/api/v1/cart` | Cart with totals |
//! | POST | `/api/v1/cart/items` | Add to cart |
//! | PUT | `/api/v1/cart/items/{id}` | Set quantity |
//! | DELETE | `/api/v1/cart/items/{id}` | Remove from cart |
//! | DELETE | `/api/v1/cart` | Clear cart |
//! | POST | `/api/v1/prescriptions/{id}` | Upload prescription |
//! | GET | `/api/v1/prescriptions` | List prescriptions |
//! | POST | `/api/v1/checkout` | Place order |
//! | GET | `/api/v1/orders` | Order history |
//! | GET | `/api/v1/orders/{id}` | Get order |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
