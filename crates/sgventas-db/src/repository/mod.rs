//! # Repository Module
//!
//! Persistence behind one small API per record type.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories                                         │
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.products().list(Some("coca"))                              │
//! │       ▼                                                                 │
//! │  ProductRepository ─┐                                                   │
//! │  SaleRepository ────┴──► SQLite (SqlitePool)                            │
//! │                                                                         │
//! │  SupplierRepository ─┐                                                  │
//! │  ExpenseRepository ──┴─► JsonStore ──► suppliers.json / expenses.json   │
//! │                                                                         │
//! │  Rules (uniqueness, index bounds, stock) come from sgventas-core;      │
//! │  repositories only load, apply, and save.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and stock edits
//! - [`SaleRepository`](sale::SaleRepository) - Checkout transaction and sale history
//! - [`SupplierRepository`](supplier::SupplierRepository) - Supplier ledger
//! - [`ExpenseRepository`](expense::ExpenseRepository) - Expense ledger

pub mod expense;
pub mod product;
pub mod sale;
pub mod supplier;
