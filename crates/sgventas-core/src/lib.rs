//! # sgventas-core: Pure Business Logic for SGVentas
//!
//! This crate holds the point-of-sale rules as pure functions with zero I/O
//! dependencies. Persistence lives in `sgventas-db`, the HTTP surface in
//! `apps/pos-server`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SGVentas Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Web client (Catalog / POS / Records)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pos-server commands                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sgventas-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ ledger  │ │ report  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          sgventas-db (SQLite catalog/sales, JSON ledger)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Expense, Supplier)
//! - [`money`] - Integer-cent money type and decimal text parsing
//! - [`cart`] - Session cart and its totals
//! - [`ledger`] - Index-addressed supplier and expense list rules
//! - [`report`] - Daily cash cut
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use sgventas_core::money::Money;
//!
//! let price = Money::parse_decimal("12.5").unwrap();
//! assert_eq!(price.cents(), 1250);
//! assert_eq!((price * 3_i64).to_string(), "$37.50");
//! ```

pub mod cart;
pub mod error;
pub mod ledger;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine, CartLineView, CartSnapshot, CartTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::DailyReport;
pub use types::*;

/// Product code used for manual-amount cart lines.
pub const MANUAL_ENTRY_CODE: &str = "INGRESO";

/// Display name used for manual-amount cart lines.
pub const MANUAL_ENTRY_NAME: &str = "VARIOS";

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product in a cart.
///
/// Guards against a scanner or a slipped key turning 10 into 1000.
pub const MAX_ITEM_QUANTITY: i64 = 999;
