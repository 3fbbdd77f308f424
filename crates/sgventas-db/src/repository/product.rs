//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Name-ordered listing with a case-insensitive name filter
//! - Lookup by barcode (the scan path)
//! - Register, edit (with a stock top-up or overwrite), delete
//!
//! ## Stock Edits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Edit form: add_stock = 12, new_stock = 40                          │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  StockChange::from_form ──► Add(12)   (a positive top-up wins)      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  UPDATE products SET stock = stock + 12 ...                         │
//! │                                                                     │
//! │  Edit form: add_stock = 0, new_stock = 40  ──► Set(40)              │
//! │  UPDATE products SET stock = 40 ...                                 │
//! │                                                                     │
//! │  Edit form: add_stock = 0, no new_stock    ──► Add(0)  (unchanged)  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The top-up is computed in SQL, so a sale committed between loading the
//! edit form and saving it is not overwritten.

use chrono::Utc;
use sgventas_core::{CoreError, NewProduct, Product, ProductUpdate, StockChange};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = "barcode, name, price_cents, stock, created_at, updated_at";

fn not_found(barcode: &str) -> DbError {
    CoreError::ProductNotFound(barcode.to_string()).into()
}

/// Repository for catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let drinks = repo.list(Some("cola")).await?;
/// let scanned = repo.get_by_barcode("7501055363057").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products ordered by name.
    ///
    /// ## Arguments
    /// * `filter` - Optional text the name must contain, ignoring case
    pub async fn list(&self, filter: Option<&str>) -> DbResult<Vec<Product>> {
        let filter = filter.map(str::trim).filter(|f| !f.is_empty());
        debug!(filter = ?filter, "Listing products");

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ?1 IS NULL OR instr(lower(name), lower(?1)) > 0 \
             ORDER BY name COLLATE NOCASE, barcode"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(filter)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its barcode.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - No product carries this barcode
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Like [`get_by_barcode`](Self::get_by_barcode) but a missing product
    /// is an error.
    pub async fn require(&self, barcode: &str) -> DbResult<Product> {
        self.get_by_barcode(barcode)
            .await?
            .ok_or_else(|| not_found(barcode.trim()))
    }

    /// Registers a product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored row
    /// * `Err(DbError::UniqueViolation)` - Barcode already registered
    pub async fn create(&self, new: &NewProduct) -> DbResult<Product> {
        debug!(barcode = %new.barcode, "Inserting product");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&new.barcode)
            .bind(&new.name)
            .bind(new.price.cents())
            .bind(new.stock)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("barcode", &new.barcode),
                other => other,
            })?;

        info!(barcode = %product.barcode, name = %product.name, "Product registered");
        Ok(product)
    }

    /// Applies an edit: name, price, and a stock top-up or overwrite.
    pub async fn update(&self, barcode: &str, update: &ProductUpdate) -> DbResult<Product> {
        debug!(barcode = %barcode, stock = ?update.stock, "Updating product");

        let (stock_expr, stock_value) = match update.stock {
            StockChange::Add(n) => ("stock + ?3", n),
            StockChange::Set(n) => ("?3", n),
        };
        let sql = format!(
            "UPDATE products SET name = ?1, price_cents = ?2, stock = {stock_expr}, updated_at = ?4 \
             WHERE barcode = ?5 RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&update.name)
            .bind(update.price.cents())
            .bind(stock_value)
            .bind(Utc::now())
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(barcode))?;

        info!(barcode = %barcode, stock = product.stock, "Product updated");
        Ok(product)
    }

    /// Deletes a product. Past sales keep their own copy of the line.
    pub async fn delete(&self, barcode: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE barcode = ?1")
            .bind(barcode)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(barcode));
        }

        info!(barcode = %barcode, "Product deleted");
        Ok(())
    }

    /// Number of products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_product(barcode: &str, name: &str, price: &str, stock: i64) -> NewProduct {
        NewProduct::from_form(barcode, name, price, stock).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let repo = db.products();

        let created = repo
            .create(&new_product("7501", "Coca-Cola 600ml", "18.50", 24))
            .await
            .unwrap();
        assert_eq!(created.price_cents, 1850);

        let fetched = repo.get_by_barcode("7501").await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(repo.get_by_barcode("nope").await.unwrap().is_none());
        assert!(matches!(
            repo.require("nope").await,
            Err(DbError::Domain(CoreError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let db = db().await;
        let repo = db.products();
        repo.create(&new_product("7501", "Coca-Cola", "18", 1))
            .await
            .unwrap();

        let err = repo
            .create(&new_product("7501", "Pepsi", "17", 1))
            .await
            .unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "barcode");
                assert_eq!(value, "7501");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_orders_by_name_and_filters() {
        let db = db().await;
        let repo = db.products();
        repo.create(&new_product("3", "pan blanco", "35", 5)).await.unwrap();
        repo.create(&new_product("1", "Coca-Cola", "18", 5)).await.unwrap();
        repo.create(&new_product("2", "Agua 1L", "12", 5)).await.unwrap();

        let names: Vec<_> = repo
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Agua 1L", "Coca-Cola", "pan blanco"]);

        let filtered = repo.list(Some("COCA")).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].barcode, "1");

        assert_eq!(repo.list(Some("  ")).await.unwrap().len(), 3);
        assert!(repo.list(Some("%")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_adds_or_sets_stock() {
        let db = db().await;
        let repo = db.products();
        repo.create(&new_product("9", "Leche", "26", 10)).await.unwrap();

        let topped_up = ProductUpdate::from_form("Leche entera", "27.5", 5, None).unwrap();
        let product = repo.update("9", &topped_up).await.unwrap();
        assert_eq!(product.name, "Leche entera");
        assert_eq!(product.price_cents, 2750);
        assert_eq!(product.stock, 15);

        let counted = ProductUpdate::from_form("Leche entera", "27.5", 0, Some(3)).unwrap();
        assert_eq!(repo.update("9", &counted).await.unwrap().stock, 3);

        let renamed = ProductUpdate::from_form("Leche deslactosada", "28", 0, None).unwrap();
        let product = repo.update("9", &renamed).await.unwrap();
        assert_eq!(product.name, "Leche deslactosada");
        assert_eq!(product.stock, 3);

        assert!(repo.update("missing", &counted).await.is_err());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let repo = db.products();
        repo.create(&new_product("5", "Huevo", "3", 0)).await.unwrap();

        repo.delete("5").await.unwrap();
        assert!(repo.get_by_barcode("5").await.unwrap().is_none());
        assert!(matches!(
            repo.delete("5").await,
            Err(DbError::Domain(CoreError::ProductNotFound(_)))
        ));
    }
}
