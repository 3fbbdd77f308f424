//! # HTTP Handlers
//!
//! One module per screen of the shop.
//!
//! | Module       | Routes                                   |
//! |--------------|------------------------------------------|
//! | [`catalog`]  | `/api/products`                          |
//! | [`cart`]     | `/api/sessions`, `/api/sessions/{id}/cart` |
//! | [`sale`]     | `/api/sessions/{id}/checkout`, `/api/sales` |
//! | [`ledger`]   | `/api/suppliers`, `/api/expenses`        |
//! | [`report`]   | `/api/reports/daily`                     |
//! | [`system`]   | `/api/health`, `/api/config`             |
//!
//! Handlers stay thin: parse the request, call into `sgventas-core` or a
//! repository, shape the response.

pub mod cart;
pub mod catalog;
pub mod ledger;
pub mod report;
pub mod sale;
pub mod system;

use axum::extract::{FromRequest, FromRequestParts};
use chrono::NaiveDate;
use serde::Deserialize;
use sgventas_core::ValidationError;

use crate::error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body whose rejections come back as [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejections come back as [`ApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string whose rejections come back as [`ApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// A money amount as typed by the cashier (`"12.50"`) or sent as a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(f64),
}

impl AmountInput {
    pub fn to_text(&self) -> String {
        match self {
            AmountInput::Text(text) => text.clone(),
            AmountInput::Number(n) => n.to_string(),
        }
    }
}

/// The store-local day that new sales and expenses are booked to.
pub fn business_date() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parses an optional `YYYY-MM-DD` query value. Blank means absent.
pub fn parse_optional_date(field: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::invalid_format(field, "expected YYYY-MM-DD").into()),
    }
}

/// Like [`parse_optional_date`], defaulting to today.
pub fn parse_date_or_today(field: &str, value: Option<&str>) -> ApiResult<NaiveDate> {
    Ok(parse_optional_date(field, value)?.unwrap_or_else(business_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_input_accepts_text_and_numbers() {
        let text: AmountInput = serde_json::from_str(r#""12.50""#).unwrap();
        assert_eq!(text.to_text(), "12.50");
        let number: AmountInput = serde_json::from_str("12.5").unwrap();
        assert_eq!(number.to_text(), "12.5");
    }

    #[test]
    fn test_parse_dates() {
        assert_eq!(parse_optional_date("date", None).unwrap(), None);
        assert_eq!(parse_optional_date("date", Some("  ")).unwrap(), None);
        assert_eq!(
            parse_optional_date("date", Some("2024-03-15")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert!(parse_optional_date("date", Some("15/03/2024")).is_err());
        assert_eq!(parse_date_or_today("date", None).unwrap(), business_date());
    }
}
