//! # sgventas-db: Persistence Layer for SGVentas
//!
//! SQLite (via sqlx) for the catalog and sales, JSON files for the supplier
//! and expense ledgers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SGVentas Data Flow                               │
//! │                                                                         │
//! │  pos-server handler (POST /api/sessions/{id}/checkout)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   sgventas-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 001_initial  │  │   │
//! │  │   │ JsonStore ×2  │◄───│ SupplierRepo  │    │   _schema    │  │   │
//! │  │   │               │    │ ExpenseRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  sgventas.db (WAL)                 suppliers.json, expenses.json       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool and ledger file configuration
//! - [`migrations`] - Embedded database migrations
//! - [`json_store`] - Locked, atomically rewritten JSON array files
//! - [`error`] - Persistence error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sgventas_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("data/sgventas.db")).await?;
//! let products = db.products().list(None).await?;
//! let sale = db.sales().record_sale(&cart, today, OversellPolicy::Reject).await?;
//! ```

pub mod error;
pub mod json_store;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use json_store::JsonStore;
pub use pool::{Database, DbConfig};

pub use repository::expense::ExpenseRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::supplier::SupplierRepository;
