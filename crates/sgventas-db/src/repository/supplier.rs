//! # Supplier Repository
//!
//! The supplier list in `suppliers.json`, addressed by listed index.

use std::sync::Arc;

use chrono::NaiveDate;
use sgventas_core::ledger::{self, Indexed};
use sgventas_core::{Supplier, Weekday};
use tracing::info;

use crate::error::DbResult;
use crate::json_store::JsonStore;

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    store: Arc<JsonStore<Supplier>>,
}

impl SupplierRepository {
    pub fn new(store: Arc<JsonStore<Supplier>>) -> Self {
        SupplierRepository { store }
    }

    /// Every supplier, in stored order.
    pub async fn all(&self) -> DbResult<Vec<Supplier>> {
        self.store.read().await
    }

    /// Suppliers matching a name fragment and/or a delivery day.
    pub async fn list(
        &self,
        query: Option<&str>,
        day: Option<Weekday>,
    ) -> DbResult<Vec<Indexed<Supplier>>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let suppliers = self.store.read().await?;
        Ok(ledger::filter_suppliers(&suppliers, query, day))
    }

    /// Suppliers that deliver on the weekday of `date`.
    pub async fn delivering_on(&self, date: NaiveDate) -> DbResult<Vec<Indexed<Supplier>>> {
        self.list(None, Some(Weekday::of(date))).await
    }

    pub async fn create(&self, name: &str, days: Vec<Weekday>) -> DbResult<Indexed<Supplier>> {
        let created = self
            .store
            .update(|list| ledger::create_supplier(list, name, days))
            .await?;

        info!(index = created.index, name = %created.record.name, "Supplier registered");
        Ok(created)
    }

    pub async fn update(
        &self,
        index: usize,
        name: &str,
        days: Vec<Weekday>,
    ) -> DbResult<Indexed<Supplier>> {
        let updated = self
            .store
            .update(|list| ledger::update_supplier(list, index, name, days))
            .await?;

        info!(index, name = %updated.record.name, "Supplier updated");
        Ok(updated)
    }

    pub async fn delete(&self, index: usize) -> DbResult<Supplier> {
        let removed = self
            .store
            .update(|list| ledger::delete_supplier(list, index))
            .await?;

        info!(index, name = %removed.name, "Supplier deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use sgventas_core::{CoreError, ValidationError};
    use tempfile::TempDir;

    async fn db(dir: &TempDir) -> Database {
        Database::new(DbConfig::in_memory().ledger_dir(dir.path()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_crud_by_index() {
        let dir = TempDir::new().unwrap();
        let db = db(&dir).await;
        let repo = db.suppliers();

        repo.create("Bimbo", vec![Weekday::Monday, Weekday::Thursday])
            .await
            .unwrap();
        repo.create("Lala", vec![Weekday::Friday]).await.unwrap();

        let updated = repo.update(1, "Lala Norte", vec![]).await.unwrap();
        assert_eq!(updated.index, 1);

        let removed = repo.delete(0).await.unwrap();
        assert_eq!(removed.name, "Bimbo");

        let remaining = repo.all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Lala Norte");
        assert!(dir.path().join("suppliers.json").exists());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let dir = TempDir::new().unwrap();
        let db = db(&dir).await;
        let repo = db.suppliers();
        repo.create("Bimbo", vec![]).await.unwrap();

        let err = repo.create("bimbo", vec![]).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
        assert_eq!(repo.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delivering_on() {
        let dir = TempDir::new().unwrap();
        let db = db(&dir).await;
        let repo = db.suppliers();
        repo.create("Bimbo", vec![Weekday::Friday]).await.unwrap();
        repo.create("Lala", vec![Weekday::Monday]).await.unwrap();

        // 2024-03-15 is a Friday.
        let friday = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let due = repo.delivering_on(friday).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].record.name, "Bimbo");

        assert_eq!(repo.list(Some("la"), None).await.unwrap()[0].index, 1);
    }
}
