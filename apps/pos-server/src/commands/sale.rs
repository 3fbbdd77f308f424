//! # Sale Handlers
//!
//! Checkout turns a session's cart into a recorded sale; the history
//! endpoints read sales back by day or by id.
//!
//! ## Checkout
//! ```text
//! POST /api/sessions/{id}/checkout
//!      │
//!      ▼
//! lock session cart (held until the response is built)
//!      │
//!      ▼
//! SaleRepository::record_sale(cart, today, oversell policy)
//!      │  one SQL transaction: stock, receipt number, sale, items
//!      ├── error ──► cart kept as is, nothing written
//!      ▼
//! cart.clear() ──► 201 + receipt
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sgventas_core::{Sale, SaleDetail};
use tracing::info;
use uuid::Uuid;

use super::{business_date, parse_date_or_today, ApiPath, ApiQuery, ApiResult};
use crate::state::{ConfigState, DbState, SessionState};

/// A sale with its lines and formatted total.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptDto {
    #[serde(flatten)]
    pub detail: SaleDetail,
    pub total: String,
}

impl ReceiptDto {
    pub fn new(detail: SaleDetail, config: &ConfigState) -> Self {
        ReceiptDto {
            total: config.format_currency(detail.sale.total()),
            detail,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    pub date: Option<String>,
}

pub async fn checkout(
    State(db): State<DbState>,
    State(sessions): State<SessionState>,
    State(config): State<ConfigState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<(StatusCode, Json<ReceiptDto>)> {
    let cart = sessions.get(id).await?;
    let mut cart = cart.lock().await;

    let detail = db
        .inner()
        .sales()
        .record_sale(&cart, business_date(), config.sales.oversell_policy)
        .await?;
    cart.clear();

    info!(
        session = %id,
        receipt = %detail.sale.receipt_number,
        total = %config.format_currency(detail.sale.total()),
        "Checkout complete"
    );
    Ok((StatusCode::CREATED, Json(ReceiptDto::new(detail, &config))))
}

/// `GET /api/sales?date=`: one day's sales in receipt order. Defaults to today.
pub async fn list_sales(
    State(db): State<DbState>,
    ApiQuery(query): ApiQuery<SalesQuery>,
) -> ApiResult<Json<Vec<Sale>>> {
    let date = parse_date_or_today("date", query.date.as_deref())?;
    let sales = db.inner().sales().list_for_day(date).await?;
    Ok(Json(sales))
}

pub async fn get_sale(
    State(db): State<DbState>,
    State(config): State<ConfigState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<ReceiptDto>> {
    let detail = db.inner().sales().get_detail(&id).await?;
    Ok(Json(ReceiptDto::new(detail, &config)))
}
