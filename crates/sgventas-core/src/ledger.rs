//! # Ledger Rules
//!
//! Supplier and expense lists are plain ordered lists addressed by their
//! listed (0-based) index. These functions hold the rules; `sgventas-db`
//! owns loading and saving the lists.
//!
//! ```text
//! suppliers.json            expenses.json
//! [0] Bimbo     mon,thu     [0] Bimbo   $1,250.00  2024-03-14
//! [1] Coca-Cola fri         [1] Lala      $830.50  2024-03-15
//!      ▲                         │
//!      └──── supplier must ──────┘
//!            be registered
//! ```
//!
//! Filtering never renumbers: a filtered list still carries each record's
//! index in the full list, so edit and delete always hit the right record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Expense, Supplier, Weekday};
use crate::validation::{parse_positive_amount, validate_supplier_name};

/// A record together with its listed index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indexed<T> {
    pub index: usize,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Indexed<T> {
    pub fn new(index: usize, record: T) -> Self {
        Indexed { index, record }
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn check_index<T>(list: &[T], index: usize, kind: &'static str) -> CoreResult<()> {
    if index >= list.len() {
        return Err(CoreError::RecordNotFound { kind, index });
    }
    Ok(())
}

// =============================================================================
// Suppliers
// =============================================================================

/// Sorts delivery days Monday first and drops repeats.
pub fn normalize_days(mut days: Vec<Weekday>) -> Vec<Weekday> {
    days.sort();
    days.dedup();
    days
}

fn check_unique_supplier(
    suppliers: &[Supplier],
    name: &str,
    skip: Option<usize>,
) -> CoreResult<()> {
    let taken = suppliers
        .iter()
        .enumerate()
        .any(|(i, s)| Some(i) != skip && same_name(&s.name, name));
    if taken {
        return Err(ValidationError::Duplicate {
            field: "supplier".to_string(),
            value: name.trim().to_string(),
        }
        .into());
    }
    Ok(())
}

/// Appends a supplier. Names are unique ignoring case.
pub fn create_supplier(
    suppliers: &mut Vec<Supplier>,
    name: &str,
    days: Vec<Weekday>,
) -> CoreResult<Indexed<Supplier>> {
    validate_supplier_name(name)?;
    check_unique_supplier(suppliers, name, None)?;

    let supplier = Supplier {
        name: name.trim().to_string(),
        delivery_days: normalize_days(days),
    };
    suppliers.push(supplier.clone());
    Ok(Indexed::new(suppliers.len() - 1, supplier))
}

/// Replaces the supplier at `index`. Keeping the same name (in any case)
/// is not a conflict.
pub fn update_supplier(
    suppliers: &mut [Supplier],
    index: usize,
    name: &str,
    days: Vec<Weekday>,
) -> CoreResult<Indexed<Supplier>> {
    check_index(suppliers, index, "Supplier")?;
    validate_supplier_name(name)?;
    check_unique_supplier(suppliers, name, Some(index))?;

    let supplier = Supplier {
        name: name.trim().to_string(),
        delivery_days: normalize_days(days),
    };
    suppliers[index] = supplier.clone();
    Ok(Indexed::new(index, supplier))
}

/// Removes the supplier at `index`. Later records shift down by one.
pub fn delete_supplier(suppliers: &mut Vec<Supplier>, index: usize) -> CoreResult<Supplier> {
    check_index(suppliers, index, "Supplier")?;
    Ok(suppliers.remove(index))
}

/// Looks a supplier up by name, ignoring case.
pub fn find_supplier<'a>(suppliers: &'a [Supplier], name: &str) -> CoreResult<&'a Supplier> {
    suppliers
        .iter()
        .find(|s| same_name(&s.name, name))
        .ok_or_else(|| CoreError::SupplierNotFound(name.trim().to_string()))
}

/// Suppliers whose name contains `query` (ignoring case) and that deliver
/// on `day`, each with its index in the full list.
pub fn filter_suppliers(
    suppliers: &[Supplier],
    query: Option<&str>,
    day: Option<Weekday>,
) -> Vec<Indexed<Supplier>> {
    let needle = query.map(|q| q.trim().to_lowercase());
    suppliers
        .iter()
        .enumerate()
        .filter(|(_, s)| match &needle {
            Some(n) => s.name.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .filter(|(_, s)| day.map_or(true, |d| s.delivers_on(d)))
        .map(|(i, s)| Indexed::new(i, s.clone()))
        .collect()
}

// =============================================================================
// Expenses
// =============================================================================

fn build_expense(
    suppliers: &[Supplier],
    supplier: &str,
    amount_text: &str,
    date: NaiveDate,
) -> CoreResult<Expense> {
    validate_supplier_name(supplier)?;
    let amount = parse_positive_amount("amount", amount_text)?;
    let canonical = find_supplier(suppliers, supplier)?;

    Ok(Expense {
        supplier: canonical.name.clone(),
        amount_cents: amount.cents(),
        date,
    })
}

/// Appends an expense paid to a registered supplier.
pub fn create_expense(
    expenses: &mut Vec<Expense>,
    suppliers: &[Supplier],
    supplier: &str,
    amount_text: &str,
    date: NaiveDate,
) -> CoreResult<Indexed<Expense>> {
    let expense = build_expense(suppliers, supplier, amount_text, date)?;
    expenses.push(expense.clone());
    Ok(Indexed::new(expenses.len() - 1, expense))
}

/// Replaces the expense at `index`.
pub fn update_expense(
    expenses: &mut [Expense],
    suppliers: &[Supplier],
    index: usize,
    supplier: &str,
    amount_text: &str,
    date: NaiveDate,
) -> CoreResult<Indexed<Expense>> {
    check_index(expenses, index, "Expense")?;
    let expense = build_expense(suppliers, supplier, amount_text, date)?;
    expenses[index] = expense.clone();
    Ok(Indexed::new(index, expense))
}

/// Removes the expense at `index`.
pub fn delete_expense(expenses: &mut Vec<Expense>, index: usize) -> CoreResult<Expense> {
    check_index(expenses, index, "Expense")?;
    Ok(expenses.remove(index))
}

/// Expenses on `date` paid to `supplier` (name compared ignoring case).
pub fn filter_expenses(
    expenses: &[Expense],
    date: Option<NaiveDate>,
    supplier: Option<&str>,
) -> Vec<Indexed<Expense>> {
    expenses
        .iter()
        .enumerate()
        .filter(|(_, e)| date.map_or(true, |d| e.date == d))
        .filter(|(_, e)| supplier.map_or(true, |s| same_name(&e.supplier, s)))
        .map(|(i, e)| Indexed::new(i, e.clone()))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn suppliers() -> Vec<Supplier> {
        let mut list = Vec::new();
        create_supplier(&mut list, "Bimbo", vec![Weekday::Thursday, Weekday::Monday]).unwrap();
        create_supplier(&mut list, "Coca-Cola", vec![Weekday::Friday]).unwrap();
        list
    }

    #[test]
    fn test_create_supplier_normalizes() {
        let mut list = Vec::new();
        let created = create_supplier(
            &mut list,
            "  Lala ",
            vec![Weekday::Sunday, Weekday::Monday, Weekday::Sunday],
        )
        .unwrap();

        assert_eq!(created.index, 0);
        assert_eq!(created.record.name, "Lala");
        assert_eq!(
            created.record.delivery_days,
            vec![Weekday::Monday, Weekday::Sunday]
        );
    }

    #[test]
    fn test_supplier_names_unique_ignoring_case() {
        let mut list = suppliers();
        let err = create_supplier(&mut list, "BIMBO", vec![]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));
        assert_eq!(list.len(), 2);

        // Renaming onto another supplier is a conflict, re-casing itself is not.
        assert!(update_supplier(&mut list, 1, "bimbo", vec![]).is_err());
        let renamed = update_supplier(&mut list, 0, "BIMBO", vec![Weekday::Tuesday]).unwrap();
        assert_eq!(renamed.record.name, "BIMBO");
        assert_eq!(list[0].delivery_days, vec![Weekday::Tuesday]);
    }

    #[test]
    fn test_supplier_edit_and_delete_by_index() {
        let mut list = suppliers();
        assert!(matches!(
            update_supplier(&mut list, 5, "X", vec![]),
            Err(CoreError::RecordNotFound { kind: "Supplier", index: 5 })
        ));

        let removed = delete_supplier(&mut list, 0).unwrap();
        assert_eq!(removed.name, "Bimbo");
        assert_eq!(list[0].name, "Coca-Cola");
        assert!(delete_supplier(&mut list, 1).is_err());
    }

    #[test]
    fn test_filter_suppliers_keeps_original_index() {
        let list = suppliers();

        let by_name = filter_suppliers(&list, Some("cola"), None);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].index, 1);

        let thursday = filter_suppliers(&list, None, Some(Weekday::Thursday));
        assert_eq!(thursday.len(), 1);
        assert_eq!(thursday[0].record.name, "Bimbo");

        assert_eq!(filter_suppliers(&list, None, None).len(), 2);
        assert!(filter_suppliers(&list, Some("bim"), Some(Weekday::Friday)).is_empty());
    }

    #[test]
    fn test_expense_uses_canonical_supplier_name() {
        let list = suppliers();
        let mut expenses = Vec::new();

        let created = create_expense(&mut expenses, &list, "coca-cola", "830.50", date(15)).unwrap();
        assert_eq!(created.record.supplier, "Coca-Cola");
        assert_eq!(created.record.amount_cents, 83_050);

        let err = create_expense(&mut expenses, &list, "Sabritas", "10", date(15)).unwrap_err();
        assert!(matches!(err, CoreError::SupplierNotFound(_)));

        let err = create_expense(&mut expenses, &list, "Bimbo", "0", date(15)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));
        assert_eq!(expenses.len(), 1);
    }

    #[test]
    fn test_expense_edit_and_delete_by_index() {
        let list = suppliers();
        let mut expenses = Vec::new();
        create_expense(&mut expenses, &list, "Bimbo", "100", date(14)).unwrap();
        create_expense(&mut expenses, &list, "Coca-Cola", "200", date(15)).unwrap();

        let updated = update_expense(&mut expenses, &list, 1, "Bimbo", "250", date(16)).unwrap();
        assert_eq!(updated.index, 1);
        assert_eq!(expenses[1].supplier, "Bimbo");
        assert_eq!(expenses[1].amount_cents, 25_000);
        assert_eq!(expenses[1].date, date(16));

        // A failed edit leaves the record alone.
        assert!(update_expense(&mut expenses, &list, 0, "Nobody", "5", date(1)).is_err());
        assert_eq!(expenses[0].amount_cents, 10_000);

        let removed = delete_expense(&mut expenses, 0).unwrap();
        assert_eq!(removed.amount_cents, 10_000);
        assert_eq!(expenses.len(), 1);
        assert!(matches!(
            delete_expense(&mut expenses, 3),
            Err(CoreError::RecordNotFound { kind: "Expense", index: 3 })
        ));
    }

    #[test]
    fn test_filter_expenses() {
        let list = suppliers();
        let mut expenses = Vec::new();
        create_expense(&mut expenses, &list, "Bimbo", "100", date(14)).unwrap();
        create_expense(&mut expenses, &list, "Coca-Cola", "200", date(15)).unwrap();
        create_expense(&mut expenses, &list, "Bimbo", "300", date(15)).unwrap();

        let on_15th = filter_expenses(&expenses, Some(date(15)), None);
        assert_eq!(on_15th.iter().map(|e| e.index).collect::<Vec<_>>(), vec![1, 2]);

        let bimbo_15th = filter_expenses(&expenses, Some(date(15)), Some("bimbo"));
        assert_eq!(bimbo_15th.len(), 1);
        assert_eq!(bimbo_15th[0].index, 2);
    }

    #[test]
    fn test_indexed_serializes_flat() {
        let item = Indexed::new(
            3,
            Supplier {
                name: "Lala".to_string(),
                delivery_days: vec![Weekday::Monday],
            },
        );
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["index"], 3);
        assert_eq!(json["name"], "Lala");
        assert_eq!(json["delivery_days"][0], "monday");
    }
}
