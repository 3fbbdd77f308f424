//! # Error Types
//!
//! Domain-specific error types for sgventas-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sgventas-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  sgventas-db errors (separate crate)                                   │
//! │  └── DbError          - SQLite and ledger file failures                │
//! │                                                                         │
//! │  pos-server errors                                                     │
//! │  └── ApiError         - What the client sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product carries this barcode.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Not enough stock to cover the requested quantity.
    ///
    /// ## When This Occurs
    /// ```text
    /// Scan 5 × COKE-330
    ///      │
    ///      ▼
    /// stock = 3, already in cart = 0
    ///      │
    ///      ▼
    /// InsufficientStock { barcode: "COKE-330", available: 3, requested: 5 }
    /// ```
    /// Raised at scan time and again inside the checkout transaction, since
    /// stock may have moved between the two.
    #[error("Insufficient stock for {barcode}: available {available}, requested {requested}")]
    InsufficientStock {
        barcode: String,
        available: i64,
        requested: i64,
    },

    /// Cart line index outside the listed lines.
    #[error("Cart line {0} does not exist")]
    CartLineNotFound(usize),

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A line subtotal or the cart total does not fit in an `i64` of cents.
    #[error("Amount is too large to total")]
    AmountOverflow,

    /// Expense names a supplier that is not registered.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    /// Listed index outside a supplier or expense list.
    #[error("{kind} #{index} not found")]
    RecordNotFound { kind: &'static str, index: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any state changes, so a rejected form never leaves a
/// half-applied write behind.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Amount above the largest accepted price or payment.
    #[error("{field} must not exceed {max}")]
    TooLarge { field: String, max: Money },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. a price that is not a number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (barcode, supplier name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
