//! # Domain Types
//!
//! Core domain types used throughout SGVentas.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  SQLite-backed                         JSON-ledger-backed               │
//! │  ┌─────────────────┐ ┌──────────────┐  ┌──────────────┐ ┌────────────┐ │
//! │  │    Product      │ │    Sale      │  │   Supplier   │ │  Expense   │ │
//! │  │  barcode (key)  │ │  id (UUID)   │  │  name (key,  │ │  supplier  │ │
//! │  │  name           │ │  receipt_no  │  │   no case)   │ │  amount    │ │
//! │  │  price_cents    │ │  total_cents │  │  delivery    │ │  date      │ │
//! │  │  stock          │ │  SaleItem[]  │  │   days       │ │            │ │
//! │  └─────────────────┘ └──────────────┘  └──────────────┘ └────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Form-input types (`NewProduct`, `ProductUpdate`) are built through
//! constructors that run validation, so holding one means the input is valid.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    parse_positive_amount, validate_barcode, validate_product_name, validate_stock,
};
use crate::MANUAL_ENTRY_CODE;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog, keyed by its barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Barcode as scanned (EAN-13, UPC-A, or any in-house code).
    pub barcode: String,

    /// Display name shown to the cashier and on the sale record.
    pub name: String,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether `quantity` units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Validated input for registering a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub barcode: String,
    pub name: String,
    pub price: Money,
    pub stock: i64,
}

impl NewProduct {
    /// Validates the registration form.
    ///
    /// ## Rules
    /// - barcode and name are required (surrounding whitespace is trimmed)
    /// - price must parse as a positive decimal
    /// - initial stock must not be negative
    pub fn from_form(
        barcode: &str,
        name: &str,
        price_text: &str,
        stock: i64,
    ) -> Result<Self, ValidationError> {
        validate_barcode(barcode)?;
        if barcode.trim().eq_ignore_ascii_case(MANUAL_ENTRY_CODE) {
            return Err(ValidationError::invalid_format(
                "barcode",
                format!("'{}' is reserved for manual amounts", MANUAL_ENTRY_CODE),
            ));
        }
        validate_product_name(name)?;
        let price = parse_positive_amount("price", price_text)?;
        validate_stock(stock)?;

        Ok(NewProduct {
            barcode: barcode.trim().to_string(),
            name: name.trim().to_string(),
            price,
            stock,
        })
    }
}

/// How an edit changes the stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    /// Top-up: add to whatever is on hand.
    Add(i64),
    /// Overwrite with a counted value.
    Set(i64),
}

impl StockChange {
    /// Resolves the edit form's two stock inputs.
    ///
    /// A positive "add stock" wins; otherwise a given "new stock"
    /// overwrites. With neither, stock is left as it is (`Add(0)`).
    pub fn from_form(add_stock: i64, new_stock: Option<i64>) -> Result<Self, ValidationError> {
        validate_stock(add_stock)?;
        if add_stock > 0 {
            return Ok(StockChange::Add(add_stock));
        }
        match new_stock {
            Some(stock) => {
                validate_stock(stock)?;
                Ok(StockChange::Set(stock))
            }
            None => Ok(StockChange::Add(0)),
        }
    }
}

/// Validated input for editing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Money,
    pub stock: StockChange,
}

impl ProductUpdate {
    pub fn from_form(
        name: &str,
        price_text: &str,
        add_stock: i64,
        new_stock: Option<i64>,
    ) -> Result<Self, ValidationError> {
        validate_product_name(name)?;
        let price = parse_positive_amount("price", price_text)?;
        let stock = StockChange::from_form(add_stock, new_stock)?;

        Ok(ProductUpdate {
            name: name.trim().to_string(),
            price,
            stock,
        })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale. Append-only once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,

    /// Human-readable receipt number: `YYYYMMDD-NNNN`.
    pub receipt_number: String,

    /// Store-local day the sale counts towards in the cash cut.
    #[ts(as = "String")]
    pub business_date: NaiveDate,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    pub total_cents: i64,

    /// Units sold across all lines.
    pub item_count: i64,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line of a sale. Product data is frozen at checkout time, so later
/// catalog edits or deletions never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub sale_id: String,
    /// Position of the line in the cart at checkout.
    pub line_no: i64,
    pub barcode: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
    /// Manual `INGRESO` amount rather than a catalog product.
    pub is_manual: bool,
}

/// A sale together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// What to do when checkout finds less stock than the cart holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OversellPolicy {
    /// Fail the checkout and roll back.
    #[default]
    Reject,
    /// Sell anyway and floor the stock at zero.
    Clamp,
}

impl FromStr for OversellPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(OversellPolicy::Reject),
            "clamp" => Ok(OversellPolicy::Clamp),
            other => Err(ValidationError::invalid_format(
                "oversell_policy",
                format!("expected 'reject' or 'clamp', got '{}'", other),
            )),
        }
    }
}

// =============================================================================
// Supplier & Expense
// =============================================================================

/// Day of the week a supplier delivers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// The weekday a calendar date falls on.
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        };
        f.write_str(name)
    }
}

impl FromStr for Weekday {
    type Err = ValidationError;

    /// Accepts full names and three-letter abbreviations, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let day = match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Weekday::Monday,
            "tuesday" | "tue" => Weekday::Tuesday,
            "wednesday" | "wed" => Weekday::Wednesday,
            "thursday" | "thu" => Weekday::Thursday,
            "friday" | "fri" => Weekday::Friday,
            "saturday" | "sat" => Weekday::Saturday,
            "sunday" | "sun" => Weekday::Sunday,
            _ => {
                return Err(ValidationError::invalid_format(
                    "delivery day",
                    format!("'{}' is not a weekday", s.trim()),
                ))
            }
        };
        Ok(day)
    }
}

/// A supplier and the weekdays it delivers on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplier {
    /// Unique under case-insensitive comparison.
    pub name: String,
    /// Sorted, without duplicates.
    #[serde(default)]
    pub delivery_days: Vec<Weekday>,
}

impl Supplier {
    pub fn delivers_on(&self, day: Weekday) -> bool {
        self.delivery_days.contains(&day)
    }
}

/// Money paid out to a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    /// Canonical name of a registered supplier.
    pub supplier: String,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
