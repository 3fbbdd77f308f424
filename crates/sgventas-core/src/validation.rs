//! # Validation Module
//!
//! Input validation for form fields coming in from the client.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (axum)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: field rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Domain (cart, ledger)                                        │
//! │  └── Stock, uniqueness, and index checks                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── PRIMARY KEY on barcode                                            │
//! │  └── CHECK (stock >= 0)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sgventas_core::validation::{parse_positive_amount, validate_barcode};
//!
//! validate_barcode("7501055363057").unwrap();
//! let amount = parse_positive_amount("amount", "250.00").unwrap();
//! assert_eq!(amount.cents(), 25000);
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest barcode accepted.
pub const MAX_BARCODE_LEN: usize = 50;

/// Longest product or supplier name accepted.
pub const MAX_NAME_LEN: usize = 200;

/// Largest price or amount accepted, in cents ($100,000,000.00).
///
/// At this cap a full cart (`MAX_CART_ITEMS` lines of `MAX_ITEM_QUANTITY`)
/// still totals well inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 50 characters
///
/// ```rust
/// use sgventas_core::validation::validate_barcode;
///
/// assert!(validate_barcode("7501000111206").is_ok());
/// assert!(validate_barcode("   ").is_err());
/// assert!(validate_barcode(&"9".repeat(51)).is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    validate_text("barcode", barcode, MAX_BARCODE_LEN)
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, MAX_NAME_LEN)
}

/// Validates a supplier name.
pub fn validate_supplier_name(name: &str) -> ValidationResult<()> {
    validate_text("supplier", name, MAX_NAME_LEN)
}

/// Normalizes a search query.
///
/// Returns `None` for a blank query, which callers treat as "no filter".
pub fn validate_search_query(query: &str) -> ValidationResult<Option<String>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(None);
    }
    if query.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(Some(query.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a scanned quantity.
///
/// ## Rules
/// - At least 1
/// - At most `MAX_ITEM_QUANTITY`
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 1 || qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a stock figure (initial stock, top-up, or overwrite).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Parses a price or amount typed as decimal text, requiring it to be > 0
/// and at most `MAX_AMOUNT_CENTS`.
///
/// ```rust
/// use sgventas_core::validation::parse_positive_amount;
///
/// assert_eq!(parse_positive_amount("price", "12.5").unwrap().cents(), 1250);
/// assert!(parse_positive_amount("price", "abc").is_err());
/// assert!(parse_positive_amount("price", "0").is_err());
/// assert!(parse_positive_amount("price", "90000000000000000").is_err());
/// ```
pub fn parse_positive_amount(field: &str, text: &str) -> ValidationResult<Money> {
    if text.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    let amount = Money::parse_decimal(text).ok_or_else(|| {
        ValidationError::invalid_format(field, format!("'{}' is not a number", text.trim()))
    })?;

    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if amount.cents() > MAX_AMOUNT_CENTS {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: Money::from_cents(MAX_AMOUNT_CENTS),
        });
    }

    Ok(amount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("ABC-123").is_ok());
        assert!(matches!(
            validate_barcode(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_barcode(&"1".repeat(MAX_BARCODE_LEN + 1)),
            Err(ValidationError::TooLong { max: 50, .. })
        ));
    }

    #[test]
    fn test_validate_names() {
        assert!(validate_product_name("Leche entera 1L").is_ok());
        assert!(validate_product_name("  ").is_err());
        assert!(validate_supplier_name("Bimbo").is_ok());
        assert!(validate_supplier_name("").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  ").unwrap(), None);
        assert_eq!(
            validate_search_query(" coca ").unwrap(),
            Some("coca".to_string())
        );
        assert!(validate_search_query(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(500).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_parse_positive_amount() {
        assert_eq!(
            parse_positive_amount("amount", "$1,250.00").unwrap().cents(),
            125_000
        );
        assert!(matches!(
            parse_positive_amount("amount", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_positive_amount("amount", "twelve"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_positive_amount("amount", "-5"),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            parse_positive_amount("amount", "0.00"),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_parse_positive_amount_caps_huge_values() {
        assert_eq!(
            parse_positive_amount("amount", "100,000,000.00").unwrap().cents(),
            MAX_AMOUNT_CENTS
        );
        assert!(matches!(
            parse_positive_amount("amount", "100000000.01"),
            Err(ValidationError::TooLarge { .. })
        ));
        assert!(matches!(
            parse_positive_amount("price", "90000000000000000.00"),
            Err(ValidationError::TooLarge { .. })
        ));

        let max_line = MAX_AMOUNT_CENTS * crate::MAX_ITEM_QUANTITY;
        assert!(max_line.checked_mul(crate::MAX_CART_ITEMS as i64).is_some());
    }
}
