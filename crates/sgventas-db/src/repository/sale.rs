//! # Sale Repository
//!
//! Checkout and sale history.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(cart, business_date, policy)                               │
//! │                                                                         │
//! │  BEGIN IMMEDIATE                                                        │
//! │   │                                                                     │
//! │   ├─► for each product line (manual INGRESO lines skipped):             │
//! │   │     UPDATE products SET stock = stock - q                           │
//! │   │       WHERE barcode = ? AND stock >= q                              │
//! │   │     0 rows?  ── Reject ──► error, ROLLBACK (nothing changed)        │
//! │   │              └─ Clamp ───► stock = MAX(stock - q, 0), warn          │
//! │   │                                                                     │
//! │   ├─► receipt number = YYYYMMDD-(sales that day + 1)                    │
//! │   ├─► INSERT sales                                                      │
//! │   ├─► INSERT sale_items (frozen name and price per line)                │
//! │   │                                                                     │
//! │  COMMIT ──► caller clears the cart                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transaction takes SQLite's write lock up front, so a cart of only
//! manual lines still waits its turn before counting the day's sales for
//! the receipt number. Concurrent checkouts queue on the busy timeout
//! instead of failing with `database is locked`.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use sgventas_core::{Cart, CoreError, OversellPolicy, Sale, SaleDetail, SaleItem};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const SALE_COLUMNS: &str = "id, receipt_number, business_date, created_at, total_cents, item_count";
const ITEM_COLUMNS: &str =
    "sale_id, line_no, barcode, name, unit_price_cents, quantity, line_total_cents, is_manual";

/// Repository for sales.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records the cart as a sale in one transaction.
    ///
    /// ## Returns
    /// * `Ok(SaleDetail)` - Committed sale with its lines
    /// * `Err(Domain(EmptyCart))` - Nothing to sell
    /// * `Err(Domain(InsufficientStock))` - Stock moved since scanning (Reject)
    /// * `Err(Domain(ProductNotFound))` - Product deleted since scanning (Reject)
    /// * `Err(Domain(AmountOverflow))` - Cart total does not fit in cents
    ///
    /// On error nothing is written. The cart is left for the caller to clear.
    pub async fn record_sale(
        &self,
        cart: &Cart,
        business_date: NaiveDate,
        policy: OversellPolicy,
    ) -> DbResult<SaleDetail> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let total = cart.total()?;
        let line_totals = cart
            .lines()
            .iter()
            .map(|line| line.subtotal())
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // Quantities per barcode; lines are already merged, this keeps it exact.
        let mut wanted: BTreeMap<&str, i64> = BTreeMap::new();
        for line in cart.lines().iter().filter(|l| !l.is_manual()) {
            *wanted.entry(line.barcode.as_str()).or_insert(0) += line.quantity;
        }

        let now = Utc::now();
        for (barcode, quantity) in &wanted {
            take_stock(&mut tx, barcode, *quantity, policy, now).await?;
        }

        let sold_today: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE business_date = ?1")
                .bind(business_date)
                .fetch_one(&mut *tx)
                .await?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            receipt_number: receipt_number(business_date, sold_today + 1),
            business_date,
            created_at: now,
            total_cents: total.cents(),
            item_count: cart.lines().iter().map(|l| l.quantity).sum(),
        };

        sqlx::query(&format!(
            "INSERT INTO sales ({SALE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        ))
        .bind(&sale.id)
        .bind(&sale.receipt_number)
        .bind(sale.business_date)
        .bind(sale.created_at)
        .bind(sale.total_cents)
        .bind(sale.item_count)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(cart.lines().len());
        for (line_no, (line, line_total)) in cart.lines().iter().zip(line_totals).enumerate() {
            let item = SaleItem {
                sale_id: sale.id.clone(),
                line_no: line_no as i64,
                barcode: line.barcode.clone(),
                name: line.name.clone(),
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
                line_total_cents: line_total.cents(),
                is_manual: line.is_manual(),
            };

            sqlx::query(&format!(
                "INSERT INTO sale_items ({ITEM_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
            ))
            .bind(&item.sale_id)
            .bind(item.line_no)
            .bind(&item.barcode)
            .bind(&item.name)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .bind(item.is_manual)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale.id,
            receipt = %sale.receipt_number,
            total_cents = sale.total_cents,
            lines = items.len(),
            "Sale recorded"
        );

        Ok(SaleDetail { sale, items })
    }

    /// Gets a sale header by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets the lines of a sale in cart order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY line_no"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets a sale with its lines, or `NotFound`.
    pub async fn get_detail(&self, id: &str) -> DbResult<SaleDetail> {
        let sale = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;
        let items = self.get_items(id).await?;

        Ok(SaleDetail { sale, items })
    }

    /// Sales of a business day, oldest first.
    pub async fn list_for_day(&self, date: NaiveDate) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE business_date = ?1 ORDER BY receipt_number"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        debug!(date = %date, count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Lines of every sale of a business day.
    pub async fn items_for_day(&self, date: NaiveDate) -> DbResult<Vec<SaleItem>> {
        let columns = ITEM_COLUMNS
            .split(", ")
            .map(|c| format!("i.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {columns} FROM sale_items i \
             INNER JOIN sales s ON s.id = i.sale_id \
             WHERE s.business_date = ?1 \
             ORDER BY s.receipt_number, i.line_no"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

/// Takes `quantity` units of `barcode` out of stock inside the checkout
/// transaction, applying the oversell policy on a shortfall.
async fn take_stock(
    tx: &mut Transaction<'_, Sqlite>,
    barcode: &str,
    quantity: i64,
    policy: OversellPolicy,
    now: chrono::DateTime<Utc>,
) -> DbResult<()> {
    let taken = sqlx::query(
        "UPDATE products SET stock = stock - ?1, updated_at = ?2 \
         WHERE barcode = ?3 AND stock >= ?1",
    )
    .bind(quantity)
    .bind(now)
    .bind(barcode)
    .execute(&mut **tx)
    .await?;

    if taken.rows_affected() == 1 {
        return Ok(());
    }

    let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE barcode = ?1")
        .bind(barcode)
        .fetch_optional(&mut **tx)
        .await?;

    match (policy, available) {
        (OversellPolicy::Reject, None) => Err(CoreError::ProductNotFound(barcode.to_string()).into()),
        (OversellPolicy::Reject, Some(available)) => Err(CoreError::InsufficientStock {
            barcode: barcode.to_string(),
            available,
            requested: quantity,
        }
        .into()),
        (OversellPolicy::Clamp, None) => {
            warn!(barcode = %barcode, quantity, "Selling product no longer in catalog");
            Ok(())
        }
        (OversellPolicy::Clamp, Some(available)) => {
            warn!(
                barcode = %barcode,
                available,
                requested = quantity,
                "Oversold, clamping stock at zero"
            );
            sqlx::query("UPDATE products SET stock = 0, updated_at = ?1 WHERE barcode = ?2")
                .bind(now)
                .bind(barcode)
                .execute(&mut **tx)
                .await?;
            Ok(())
        }
    }
}

/// `YYYYMMDD-NNNN`, numbered from 1 within the business day.
fn receipt_number(date: NaiveDate, sequence: i64) -> String {
    format!("{}-{:04}", date.format("%Y%m%d"), sequence)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use sgventas_core::{Money, NewProduct, Product, ProductUpdate};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    async fn seeded() -> (Database, Product, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let soda = db
            .products()
            .create(&NewProduct::from_form("7501", "Coca-Cola", "18.50", 10).unwrap())
            .await
            .unwrap();
        let bread = db
            .products()
            .create(&NewProduct::from_form("1001", "Bolillo", "3", 2).unwrap())
            .await
            .unwrap();
        (db, soda, bread)
    }

    async fn set_bread_stock(db: &Database, stock: i64) {
        let count = ProductUpdate::from_form("Bolillo", "3", 0, Some(stock)).unwrap();
        db.products().update("1001", &count).await.unwrap();
    }

    #[test]
    fn test_receipt_number_format() {
        assert_eq!(receipt_number(day(), 1), "20240315-0001");
        assert_eq!(receipt_number(day(), 123), "20240315-0123");
    }

    #[tokio::test]
    async fn test_checkout_decrements_stock_and_records_lines() {
        let (db, soda, bread) = seeded().await;
        let mut cart = Cart::new();
        cart.add_product(&soda, 3).unwrap();
        cart.add_product(&bread, 2).unwrap();
        cart.add_manual(Money::from_cents(2000)).unwrap();

        let detail = db
            .sales()
            .record_sale(&cart, day(), OversellPolicy::Reject)
            .await
            .unwrap();

        assert_eq!(detail.sale.receipt_number, "20240315-0001");
        assert_eq!(detail.sale.total_cents, 3 * 1850 + 2 * 300 + 2000);
        assert_eq!(detail.sale.item_count, 6);
        let line_sum: i64 = detail.items.iter().map(|i| i.line_total_cents).sum();
        assert_eq!(line_sum, detail.sale.total_cents);
        assert!(detail.items[2].is_manual);
        assert_eq!(detail.items[2].barcode, "INGRESO");

        assert_eq!(db.products().require("7501").await.unwrap().stock, 7);
        assert_eq!(db.products().require("1001").await.unwrap().stock, 0);

        let stored = db.sales().get_detail(&detail.sale.id).await.unwrap();
        assert_eq!(stored, detail);
    }

    #[tokio::test]
    async fn test_rejected_checkout_changes_nothing() {
        let (db, soda, bread) = seeded().await;
        let mut cart = Cart::new();
        cart.add_product(&soda, 4).unwrap();
        cart.add_product(&bread, 2).unwrap();

        // Someone else sells the last bread first.
        set_bread_stock(&db, 1).await;

        let err = db
            .sales()
            .record_sale(&cart, day(), OversellPolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 1,
                requested: 2,
                ..
            })
        ));

        assert_eq!(db.products().require("7501").await.unwrap().stock, 10);
        assert_eq!(db.products().require("1001").await.unwrap().stock, 1);
        assert!(db.sales().list_for_day(day()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clamp_policy_floors_stock_at_zero() {
        let (db, _soda, bread) = seeded().await;
        let mut cart = Cart::new();
        cart.add_product(&bread, 2).unwrap();
        set_bread_stock(&db, 1).await;

        let detail = db
            .sales()
            .record_sale(&cart, day(), OversellPolicy::Clamp)
            .await
            .unwrap();
        assert_eq!(detail.sale.total_cents, 600);
        assert_eq!(db.products().require("1001").await.unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_deleted_product_is_rejected() {
        let (db, soda, _bread) = seeded().await;
        let mut cart = Cart::new();
        cart.add_product(&soda, 1).unwrap();
        db.products().delete("7501").await.unwrap();

        let err = db
            .sales()
            .record_sale(&cart, day(), OversellPolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let (db, _, _) = seeded().await;
        let err = db
            .sales()
            .record_sale(&Cart::new(), day(), OversellPolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_receipts_count_per_day() {
        let (db, soda, _) = seeded().await;
        let mut cart = Cart::new();
        cart.add_product(&soda, 1).unwrap();

        let next_day = day().succ_opt().unwrap();
        let sales = db.sales();
        let first = sales.record_sale(&cart, day(), OversellPolicy::Reject).await.unwrap();
        let second = sales.record_sale(&cart, day(), OversellPolicy::Reject).await.unwrap();
        let other = sales.record_sale(&cart, next_day, OversellPolicy::Reject).await.unwrap();

        assert_eq!(first.sale.receipt_number, "20240315-0001");
        assert_eq!(second.sale.receipt_number, "20240315-0002");
        assert_eq!(other.sale.receipt_number, "20240316-0001");

        assert_eq!(sales.list_for_day(day()).await.unwrap().len(), 2);
        assert_eq!(sales.items_for_day(day()).await.unwrap().len(), 2);
        assert!(matches!(
            sales.get_detail("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_manual_checkouts_all_commit() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("pos.db")).ledger_dir(dir.path()))
            .await
            .unwrap();

        let mut cart = Cart::new();
        cart.add_manual(Money::from_cents(500)).unwrap();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let sales = db.sales();
                let cart = cart.clone();
                tokio::spawn(async move {
                    sales.record_sale(&cart, day(), OversellPolicy::Reject).await
                })
            })
            .collect();

        let mut receipts = Vec::new();
        for handle in handles {
            let detail = handle.await.unwrap().unwrap();
            receipts.push(detail.sale.receipt_number);
        }
        receipts.sort();
        receipts.dedup();
        assert_eq!(receipts.len(), 20);
        assert_eq!(receipts[19], "20240315-0020");
        assert_eq!(db.sales().list_for_day(day()).await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_overflowing_cart_is_rejected_before_writing() {
        let (db, _, _) = seeded().await;
        let mut cart = Cart::new();
        cart.add_manual(Money::from_cents(9_000_000_000_000_000_000))
            .unwrap();
        let mut forged = serde_json::to_value(&cart).unwrap();
        let line = forged["lines"][0].clone();
        forged["lines"].as_array_mut().unwrap().push(line);
        let forged: Cart = serde_json::from_value(forged).unwrap();

        let err = db
            .sales()
            .record_sale(&forged, day(), OversellPolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::AmountOverflow)));
        assert!(db.sales().list_for_day(day()).await.unwrap().is_empty());
    }
}
