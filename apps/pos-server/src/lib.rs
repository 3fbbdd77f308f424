//! # SGVentas Server
//!
//! JSON-over-HTTP front end for the shop: catalog, scan-and-checkout,
//! supplier and expense ledgers, and the daily cash cut.
//!
//! ## Module Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    sgventas-server                                      │
//! │                                                                         │
//! │  main.rs ──► config::ServerConfig::load ──► Database::new               │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                         build_router(AppState)                          │
//! │                                   │                                     │
//! │      ┌────────────┬───────────────┼──────────────┬────────────┐        │
//! │      ▼            ▼               ▼              ▼            ▼         │
//! │   catalog       cart            sale          ledger       report       │
//! │      │            │               │              │            │         │
//! │      └────────────┴───────┬───────┴──────────────┴────────────┘         │
//! │                           ▼                                             │
//! │              state::{DbState, SessionState, ConfigState}                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use commands::{cart, catalog, ledger, report, sale, system};
pub use config::ServerConfig;
pub use error::{ApiError, ErrorCode};
pub use state::AppState;

/// Every route the server answers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(system::health))
        .route("/api/config", get(system::config))
        // Catalog
        .route(
            "/api/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/api/products/{barcode}",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        // Sessions and carts
        .route("/api/sessions", post(cart::create_session))
        .route("/api/sessions/{id}", delete(cart::delete_session))
        .route(
            "/api/sessions/{id}/cart",
            get(cart::get_cart).delete(cart::clear_cart),
        )
        .route("/api/sessions/{id}/cart/scan", post(cart::scan))
        .route(
            "/api/sessions/{id}/cart/lines/{index}",
            delete(cart::remove_line),
        )
        .route("/api/sessions/{id}/checkout", post(sale::checkout))
        // Sales history
        .route("/api/sales", get(sale::list_sales))
        .route("/api/sales/{id}", get(sale::get_sale))
        // Ledgers
        .route(
            "/api/suppliers",
            get(ledger::list_suppliers).post(ledger::create_supplier),
        )
        .route(
            "/api/suppliers/{index}",
            put(ledger::update_supplier).delete(ledger::delete_supplier),
        )
        .route(
            "/api/expenses",
            get(ledger::list_expenses).post(ledger::create_expense),
        )
        .route(
            "/api/expenses/{index}",
            put(ledger::update_expense).delete(ledger::delete_expense),
        )
        // Reports
        .route("/api/reports/daily", get(report::daily_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
