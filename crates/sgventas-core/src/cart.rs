//! # Cart
//!
//! The per-session shopping cart.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action           Method                  Cart Change           │
//! │  ──────────────           ──────                  ───────────           │
//! │                                                                         │
//! │  Scan barcode ───────────► scan(Some(p), None) ──► merge or push line   │
//! │                                                                         │
//! │  Type amount ────────────► scan(None, Some(m)) ──► push INGRESO line    │
//! │                                                                         │
//! │  Click Remove ───────────► remove_line(i) ───────► lines.remove(i)      │
//! │                                                                         │
//! │  Click Clear ────────────► clear() ──────────────► lines.clear()        │
//! │                                                                         │
//! │  Checkout ───────────────► (sgventas-db) ────────► clear() after commit │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart never touches the database. Callers look the product up first
//! and hand the current row to [`Cart::scan`], which checks the stock it
//! carries against what the cart already holds.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_quantity;
use crate::{MANUAL_ENTRY_CODE, MANUAL_ENTRY_NAME, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart.
///
/// Name and price are frozen when the line is added. A price edit in the
/// catalog while the cart is open does not change what the customer pays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Product barcode, or `INGRESO` for a manual amount.
    pub barcode: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
        }
    }

    /// An `INGRESO` / `VARIOS` line for a typed amount.
    pub fn manual(amount: Money) -> Self {
        CartLine {
            barcode: MANUAL_ENTRY_CODE.to_string(),
            name: MANUAL_ENTRY_NAME.to_string(),
            unit_price_cents: amount.cents(),
            quantity: 1,
        }
    }

    #[inline]
    pub fn is_manual(&self) -> bool {
        self.barcode == MANUAL_ENTRY_CODE
    }

    /// Unit price × quantity.
    pub fn subtotal(&self) -> CoreResult<Money> {
        Money::from_cents(self.unit_price_cents)
            .checked_multiply_quantity(self.quantity)
            .ok_or(CoreError::AmountOverflow)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Product lines are unique by barcode (scanning again raises the quantity)
/// - Manual lines are never merged; each typed amount is its own line
/// - At most `MAX_CART_ITEMS` lines and `MAX_ITEM_QUANTITY` per product
/// - A product line never holds more than the stock seen when it was scanned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units of `barcode` already in the cart.
    pub fn quantity_of(&self, barcode: &str) -> i64 {
        self.lines
            .iter()
            .filter(|l| !l.is_manual() && l.barcode == barcode)
            .map(|l| l.quantity)
            .sum()
    }

    /// Applies one scan: a product with a quantity, a manual amount, or both.
    ///
    /// Every input is checked before anything is added, so a scan either
    /// lands completely or leaves the cart untouched. The new lines are
    /// staged on a copy and only kept if the cart still totals.
    ///
    /// ## Errors
    /// - `Validation(Required)` when neither input is given
    /// - `Validation(OutOfRange)` for a quantity below 1 or above the cap
    /// - `InsufficientStock` when cart quantity + `quantity` exceeds stock
    /// - `QuantityTooLarge` / `CartTooLarge` for the cart caps
    /// - `AmountOverflow` when the new total would not fit
    pub fn scan(
        &mut self,
        product: Option<(&Product, i64)>,
        manual: Option<Money>,
    ) -> CoreResult<()> {
        if product.is_none() && manual.is_none() {
            return Err(ValidationError::required("barcode or amount").into());
        }

        let mut new_lines = 0;
        if let Some((product, quantity)) = product {
            self.check_product(product, quantity)?;
            if self.quantity_of(&product.barcode) == 0 {
                new_lines += 1;
            }
        }
        if let Some(amount) = manual {
            if !amount.is_positive() {
                return Err(ValidationError::MustBePositive {
                    field: "amount".to_string(),
                }
                .into());
            }
            new_lines += 1;
        }
        if self.lines.len() + new_lines > MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        let mut staged = self.lines.clone();
        if let Some((product, quantity)) = product {
            push_product(&mut staged, product, quantity);
        }
        if let Some(amount) = manual {
            staged.push(CartLine::manual(amount));
        }
        total_of(&staged)?;

        self.lines = staged;
        Ok(())
    }

    /// Adds a product line, or raises the quantity of an existing one.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        self.scan(Some((product, quantity)), None)
    }

    /// Adds a manual `INGRESO` line.
    pub fn add_manual(&mut self, amount: Money) -> CoreResult<()> {
        self.scan(None, Some(amount))
    }

    fn check_product(&self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let requested = self.quantity_of(&product.barcode) + quantity;
        if requested > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_ITEM_QUANTITY,
            });
        }
        if !product.can_sell(requested) {
            return Err(CoreError::InsufficientStock {
                barcode: product.barcode.clone(),
                available: product.stock,
                requested,
            });
        }
        Ok(())
    }

    /// Removes the line at a listed (0-based) index.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::CartLineNotFound(index));
        }
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Σ line subtotals.
    pub fn total(&self) -> CoreResult<Money> {
        total_of(&self.lines)
    }

    pub fn totals(&self) -> CoreResult<CartTotals> {
        Ok(CartTotals {
            line_count: self.lines.len(),
            total_quantity: self.lines.iter().map(|l| l.quantity).sum(),
            total_cents: self.total()?.cents(),
        })
    }

    /// The cart as the client sees it: numbered lines plus totals.
    pub fn snapshot(&self) -> CoreResult<CartSnapshot> {
        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| -> CoreResult<CartLineView> {
                Ok(CartLineView {
                    index,
                    subtotal_cents: line.subtotal()?.cents(),
                    is_manual: line.is_manual(),
                    line: line.clone(),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(CartSnapshot {
            lines,
            totals: self.totals()?,
        })
    }
}

fn push_product(lines: &mut Vec<CartLine>, product: &Product, quantity: i64) {
    match lines
        .iter_mut()
        .find(|l| !l.is_manual() && l.barcode == product.barcode)
    {
        Some(line) => line.quantity += quantity,
        None => lines.push(CartLine::from_product(product, quantity)),
    }
}

fn total_of(lines: &[CartLine]) -> CoreResult<Money> {
    lines.iter().try_fold(Money::zero(), |total, line| {
        total
            .checked_add(line.subtotal()?)
            .ok_or(CoreError::AmountOverflow)
    })
}

// =============================================================================
// Views
// =============================================================================

/// Cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLineView {
    pub index: usize,
    #[serde(flatten)]
    pub line: CartLine,
    pub subtotal_cents: i64,
    pub is_manual: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSnapshot {
    pub lines: Vec<CartLineView>,
    pub totals: CartTotals,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(barcode: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            barcode: barcode.to_string(),
            name: format!("Product {}", barcode),
            price_cents,
            stock,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_scan_merges_same_barcode() {
        let soda = product("7501", 1850, 10);
        let mut cart = Cart::new();

        cart.add_product(&soda, 2).unwrap();
        cart.add_product(&soda, 3).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of("7501"), 5);
        assert_eq!(cart.total().unwrap().cents(), 5 * 1850);
    }

    #[test]
    fn test_scan_counts_cart_quantity_against_stock() {
        let bread = product("1001", 500, 4);
        let mut cart = Cart::new();

        cart.add_product(&bread, 3).unwrap();
        let err = cart.add_product(&bread, 2).unwrap_err();

        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 4);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(cart.quantity_of("1001"), 3);
    }

    #[test]
    fn test_scan_rejects_bad_quantity() {
        let bread = product("1001", 500, 4);
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_product(&bread, 0),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_manual_lines_are_not_merged() {
        let mut cart = Cart::new();
        cart.add_manual(Money::from_cents(2000)).unwrap();
        cart.add_manual(Money::from_cents(350)).unwrap();

        assert_eq!(cart.lines().len(), 2);
        assert!(cart.lines().iter().all(CartLine::is_manual));
        assert_eq!(cart.lines()[0].name, MANUAL_ENTRY_NAME);
        assert_eq!(cart.lines()[0].quantity, 1);
        assert_eq!(cart.total().unwrap().cents(), 2350);
    }

    #[test]
    fn test_combined_scan_is_all_or_nothing() {
        let milk = product("2002", 2600, 1);
        let mut cart = Cart::new();

        let err = cart.scan(Some((&milk, 2)), Some(Money::from_cents(1000)));
        assert!(matches!(err, Err(CoreError::InsufficientStock { .. })));
        assert!(cart.is_empty());

        let err = cart.scan(Some((&milk, 1)), Some(Money::from_cents(-100)));
        assert!(err.is_err());
        assert!(cart.is_empty());

        cart.scan(Some((&milk, 1)), Some(Money::from_cents(1000)))
            .unwrap();
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total().unwrap().cents(), 3600);
    }

    #[test]
    fn test_scan_requires_some_input() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.scan(None, None),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_remove_line_by_index() {
        let a = product("A", 100, 5);
        let b = product("B", 200, 5);
        let mut cart = Cart::new();
        cart.add_product(&a, 1).unwrap();
        cart.add_product(&b, 1).unwrap();

        let removed = cart.remove_line(0).unwrap();
        assert_eq!(removed.barcode, "A");
        assert_eq!(cart.lines()[0].barcode, "B");

        assert!(matches!(
            cart.remove_line(1),
            Err(CoreError::CartLineNotFound(1))
        ));
    }

    #[test]
    fn test_cart_line_cap() {
        let mut cart = Cart::new();
        for _ in 0..MAX_CART_ITEMS {
            cart.add_manual(Money::from_cents(100)).unwrap();
        }
        assert!(matches!(
            cart.add_manual(Money::from_cents(100)),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_totals_and_snapshot() {
        let a = product("A", 250, 10);
        let mut cart = Cart::new();
        cart.add_product(&a, 4).unwrap();
        cart.add_manual(Money::from_cents(1000)).unwrap();

        let totals = cart.totals().unwrap();
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.total_quantity, 5);
        assert_eq!(totals.total_cents, 2000);

        let snapshot = cart.snapshot().unwrap();
        assert_eq!(snapshot.lines[1].index, 1);
        assert!(snapshot.lines[1].is_manual);
        assert_eq!(snapshot.lines[0].subtotal_cents, 1000);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total().unwrap(), Money::zero());
    }

    #[test]
    fn test_overflowing_scan_leaves_cart_untouched() {
        let gold = product("GOLD", 9_000_000_000_000_000_000, 10);
        let mut cart = Cart::new();

        assert!(matches!(
            cart.add_product(&gold, 2),
            Err(CoreError::AmountOverflow)
        ));
        assert!(cart.is_empty());

        cart.add_product(&gold, 1).unwrap();
        assert!(matches!(
            cart.add_product(&gold, 1),
            Err(CoreError::AmountOverflow)
        ));
        assert_eq!(cart.quantity_of("GOLD"), 1);
    }

    #[test]
    fn test_overflowing_manual_amount_is_rejected() {
        let huge = Money::from_cents(9_000_000_000_000_000_000);
        let mut cart = Cart::new();

        cart.add_manual(huge).unwrap();
        assert!(matches!(
            cart.add_manual(huge),
            Err(CoreError::AmountOverflow)
        ));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total().unwrap(), huge);
    }
}
