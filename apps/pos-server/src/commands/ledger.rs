//! # Ledger Handlers
//!
//! Suppliers and expenses. Records are addressed by their index in the
//! full, unfiltered list; filtered listings report that same index so an
//! edit or delete issued from a filtered view hits the intended record.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sgventas_core::ledger::Indexed;
use sgventas_core::{Expense, Supplier, ValidationError, Weekday};

use super::{
    business_date, parse_date_or_today, parse_optional_date, AmountInput, ApiJson, ApiPath,
    ApiQuery, ApiResult,
};
use crate::state::DbState;

// =============================================================================
// Suppliers
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SupplierQuery {
    pub q: Option<String>,
    /// Weekday name (`friday`, `fri`) or `today`.
    pub day: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SupplierRequest {
    pub name: String,
    #[serde(default)]
    pub delivery_days: Vec<String>,
}

fn parse_day(text: &str) -> Result<Weekday, ValidationError> {
    if text.trim().eq_ignore_ascii_case("today") {
        return Ok(Weekday::of(business_date()));
    }
    text.parse()
}

fn parse_days(days: &[String]) -> Result<Vec<Weekday>, ValidationError> {
    days.iter().map(|d| d.parse()).collect()
}

/// `GET /api/suppliers?q=&day=`
pub async fn list_suppliers(
    State(db): State<DbState>,
    ApiQuery(query): ApiQuery<SupplierQuery>,
) -> ApiResult<Json<Vec<Indexed<Supplier>>>> {
    let day = match query.day.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(text) => Some(parse_day(text)?),
        None => None,
    };
    let suppliers = db.inner().suppliers().list(query.q.as_deref(), day).await?;
    Ok(Json(suppliers))
}

pub async fn create_supplier(
    State(db): State<DbState>,
    ApiJson(req): ApiJson<SupplierRequest>,
) -> ApiResult<(StatusCode, Json<Indexed<Supplier>>)> {
    let days = parse_days(&req.delivery_days)?;
    let created = db.inner().suppliers().create(&req.name, days).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_supplier(
    State(db): State<DbState>,
    ApiPath(index): ApiPath<usize>,
    ApiJson(req): ApiJson<SupplierRequest>,
) -> ApiResult<Json<Indexed<Supplier>>> {
    let days = parse_days(&req.delivery_days)?;
    let updated = db.inner().suppliers().update(index, &req.name, days).await?;
    Ok(Json(updated))
}

/// Removes the supplier and returns it. Later indexes shift down by one.
pub async fn delete_supplier(
    State(db): State<DbState>,
    ApiPath(index): ApiPath<usize>,
) -> ApiResult<Json<Supplier>> {
    let removed = db.inner().suppliers().delete(index).await?;
    Ok(Json(removed))
}

// =============================================================================
// Expenses
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ExpenseQuery {
    pub date: Option<String>,
    pub supplier: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    pub supplier: String,
    pub amount: AmountInput,
    /// `YYYY-MM-DD`; today when omitted.
    pub date: Option<String>,
}

/// `GET /api/expenses?date=&supplier=`
pub async fn list_expenses(
    State(db): State<DbState>,
    ApiQuery(query): ApiQuery<ExpenseQuery>,
) -> ApiResult<Json<Vec<Indexed<Expense>>>> {
    let date = parse_optional_date("date", query.date.as_deref())?;
    let expenses = db
        .inner()
        .expenses()
        .list(date, query.supplier.as_deref())
        .await?;
    Ok(Json(expenses))
}

pub async fn create_expense(
    State(db): State<DbState>,
    ApiJson(req): ApiJson<ExpenseRequest>,
) -> ApiResult<(StatusCode, Json<Indexed<Expense>>)> {
    let date = parse_date_or_today("date", req.date.as_deref())?;
    let created = db
        .inner()
        .expenses()
        .create(&req.supplier, &req.amount.to_text(), date)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_expense(
    State(db): State<DbState>,
    ApiPath(index): ApiPath<usize>,
    ApiJson(req): ApiJson<ExpenseRequest>,
) -> ApiResult<Json<Indexed<Expense>>> {
    let date = parse_date_or_today("date", req.date.as_deref())?;
    let updated = db
        .inner()
        .expenses()
        .update(index, &req.supplier, &req.amount.to_text(), date)
        .await?;
    Ok(Json(updated))
}

pub async fn delete_expense(
    State(db): State<DbState>,
    ApiPath(index): ApiPath<usize>,
) -> ApiResult<Json<Expense>> {
    let removed = db.inner().expenses().delete(index).await?;
    Ok(Json(removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_days() {
        let days = parse_days(&["Mon".into(), "friday".into()]).unwrap();
        assert_eq!(days, vec![Weekday::Monday, Weekday::Friday]);
        assert!(parse_days(&["someday".into()]).is_err());
        assert_eq!(parse_day("TODAY").unwrap(), Weekday::of(business_date()));
    }
}
