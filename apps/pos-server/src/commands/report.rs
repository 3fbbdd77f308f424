//! # Report Handlers
//!
//! The daily cash cut: sales and expenses for one business day.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use sgventas_core::DailyReport;
use tracing::debug;

use super::{parse_date_or_today, ApiQuery, ApiResult};
use crate::state::{ConfigState, DbState};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub date: Option<String>,
}

/// Report figures plus their formatted amounts.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReportDto {
    #[serde(flatten)]
    pub report: DailyReport,
    pub sales_total: String,
    pub expenses_total: String,
    pub net: String,
}

/// `GET /api/reports/daily?date=`. Defaults to today.
pub async fn daily_report(
    State(db): State<DbState>,
    State(config): State<ConfigState>,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> ApiResult<Json<DailyReportDto>> {
    let date = parse_date_or_today("date", query.date.as_deref())?;
    let db = db.inner();

    let sales = db.sales().list_for_day(date).await?;
    let items = db.sales().items_for_day(date).await?;
    let expenses = db.expenses().for_day(date).await?;
    let report = DailyReport::build(date, &sales, &items, &expenses);

    debug!(
        %date,
        sales = report.sale_count,
        expenses = report.expense_count,
        net_cents = report.net_cents,
        "Built daily report"
    );
    Ok(Json(DailyReportDto {
        sales_total: config.format_currency(report.sales_total()),
        expenses_total: config.format_currency(report.expenses_total()),
        net: config.format_currency(report.net()),
        report,
    }))
}
