//! # Expense Repository
//!
//! The expense list in `expenses.json`, addressed by listed index.
//!
//! Every write resolves the supplier against the current supplier list and
//! stores its canonical spelling.

use std::sync::Arc;

use chrono::NaiveDate;
use sgventas_core::ledger::{self, Indexed};
use sgventas_core::{Expense, Supplier};
use tracing::info;

use crate::error::DbResult;
use crate::json_store::JsonStore;

#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    store: Arc<JsonStore<Expense>>,
    suppliers: Arc<JsonStore<Supplier>>,
}

impl ExpenseRepository {
    pub fn new(store: Arc<JsonStore<Expense>>, suppliers: Arc<JsonStore<Supplier>>) -> Self {
        ExpenseRepository { store, suppliers }
    }

    /// Expenses on `date` and/or paid to `supplier`.
    pub async fn list(
        &self,
        date: Option<NaiveDate>,
        supplier: Option<&str>,
    ) -> DbResult<Vec<Indexed<Expense>>> {
        let supplier = supplier.map(str::trim).filter(|s| !s.is_empty());
        let expenses = self.store.read().await?;
        Ok(ledger::filter_expenses(&expenses, date, supplier))
    }

    /// Every expense dated `date`.
    pub async fn for_day(&self, date: NaiveDate) -> DbResult<Vec<Expense>> {
        let expenses = self.store.read().await?;
        Ok(expenses.into_iter().filter(|e| e.date == date).collect())
    }

    pub async fn create(
        &self,
        supplier: &str,
        amount_text: &str,
        date: NaiveDate,
    ) -> DbResult<Indexed<Expense>> {
        let suppliers = self.suppliers.read().await?;
        let created = self
            .store
            .update(|list| ledger::create_expense(list, &suppliers, supplier, amount_text, date))
            .await?;

        info!(
            index = created.index,
            supplier = %created.record.supplier,
            amount_cents = created.record.amount_cents,
            "Expense recorded"
        );
        Ok(created)
    }

    pub async fn update(
        &self,
        index: usize,
        supplier: &str,
        amount_text: &str,
        date: NaiveDate,
    ) -> DbResult<Indexed<Expense>> {
        let suppliers = self.suppliers.read().await?;
        let updated = self
            .store
            .update(|list| {
                ledger::update_expense(list, &suppliers, index, supplier, amount_text, date)
            })
            .await?;

        info!(index, supplier = %updated.record.supplier, "Expense updated");
        Ok(updated)
    }

    pub async fn delete(&self, index: usize) -> DbResult<Expense> {
        let removed = self
            .store
            .update(|list| ledger::delete_expense(list, index))
            .await?;

        info!(index, supplier = %removed.supplier, "Expense deleted");
        Ok(removed)
    }
}
