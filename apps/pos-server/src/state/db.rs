//! # Database State
//!
//! `Database` holds a `SqlitePool` plus the two ledger stores, all of which
//! are safe to share; handlers run queries concurrently without extra
//! locking.
//!
//! ```rust,ignore
//! async fn list_products(State(db): State<DbState>) -> Result<Json<Vec<ProductDto>>, ApiError> {
//!     let products = db.inner().products().list(None).await?;
//!     ...
//! }
//! ```

use sgventas_db::Database;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
