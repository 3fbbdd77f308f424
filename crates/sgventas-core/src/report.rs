//! # Daily Report (Cash Cut)
//!
//! End-of-day summary of what came in and what went out.
//!
//! ```text
//!   sales (business_date = D) ──┐
//!   sale_items of those sales ──┼──► DailyReport::build(D, ..) ──► net = sales − expenses
//!   expenses (date = D) ────────┘
//! ```
//!
//! Inputs outside day `D` are ignored, so callers may pass wider slices.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Expense, Sale, SaleItem};

/// Expenses paid to one supplier on the report day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierTotal {
    pub supplier: String,
    pub count: usize,
    pub total_cents: i64,
}

/// The cash cut for one business day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyReport {
    #[ts(as = "String")]
    pub date: NaiveDate,

    pub sale_count: usize,
    /// Catalog units sold. Manual lines are not counted.
    pub units_sold: i64,
    pub sales_total_cents: i64,
    /// Part of `sales_total_cents` that came from manual `INGRESO` lines.
    pub manual_income_cents: i64,

    pub expense_count: usize,
    pub expenses_total_cents: i64,
    /// Sorted by supplier name.
    pub expenses_by_supplier: Vec<SupplierTotal>,

    /// Sales total minus expenses total. May be negative.
    pub net_cents: i64,
}

impl DailyReport {
    pub fn build(
        date: NaiveDate,
        sales: &[Sale],
        items: &[SaleItem],
        expenses: &[Expense],
    ) -> Self {
        let day_sales: Vec<&Sale> = sales.iter().filter(|s| s.business_date == date).collect();
        let sale_ids: HashSet<&str> = day_sales.iter().map(|s| s.id.as_str()).collect();
        let day_items = items.iter().filter(|i| sale_ids.contains(i.sale_id.as_str()));

        let sales_total: Money = day_sales.iter().map(|s| s.total()).sum();

        let mut units_sold = 0;
        let mut manual_income = Money::zero();
        for item in day_items {
            if item.is_manual {
                manual_income += Money::from_cents(item.line_total_cents);
            } else {
                units_sold += item.quantity;
            }
        }

        let mut by_supplier: BTreeMap<&str, SupplierTotal> = BTreeMap::new();
        let mut expenses_total = Money::zero();
        let mut expense_count = 0;
        for expense in expenses.iter().filter(|e| e.date == date) {
            expense_count += 1;
            expenses_total += expense.amount();

            let entry = by_supplier
                .entry(expense.supplier.as_str())
                .or_insert_with(|| SupplierTotal {
                    supplier: expense.supplier.clone(),
                    count: 0,
                    total_cents: 0,
                });
            entry.count += 1;
            entry.total_cents += expense.amount_cents;
        }

        DailyReport {
            date,
            sale_count: day_sales.len(),
            units_sold,
            sales_total_cents: sales_total.cents(),
            manual_income_cents: manual_income.cents(),
            expense_count,
            expenses_total_cents: expenses_total.cents(),
            expenses_by_supplier: by_supplier.into_values().collect(),
            net_cents: (sales_total - expenses_total).cents(),
        }
    }

    pub fn sales_total(&self) -> Money {
        Money::from_cents(self.sales_total_cents)
    }

    pub fn expenses_total(&self) -> Money {
        Money::from_cents(self.expenses_total_cents)
    }

    pub fn net(&self) -> Money {
        Money::from_cents(self.net_cents)
    }
}
