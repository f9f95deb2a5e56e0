//! # Report Routes
//!
//! Read-only views over a day or a month.
//!
//! ## Period Resolution
//! ```text
//! /sales/today             → PeriodKey::Day(clock.today())
//! /sales/month             → PeriodKey::Month(current month)
//! /sales/month?filter=     → current month (blank filter)
//! /sales/month?filter=2024-05
//!                          → PeriodKey::Month(2024-05)
//! /sales/month?filter=May  → 400 VALIDATION_ERROR
//! /export/today|month      → same as above, as CSV
//! /export/week             → 400 UNKNOWN_PERIOD
//! ```

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::export::sales_csv;
use crate::ledger::{month_chart, period_report, PeriodReport};
use crate::state::AppState;
use gustanto_core::{DailyBreakdown, ExportPeriod, Money, PeriodKey, Sale, YearMonth};

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    #[serde(default)]
    pub filter: Option<String>,
}

impl MonthQuery {
    /// The requested month, or the current one when absent or blank.
    fn resolve(&self, state: &AppState) -> ApiResult<YearMonth> {
        match self.filter.as_deref().map(str::trim) {
            Some(filter) if !filter.is_empty() => Ok(filter.parse::<YearMonth>()?),
            _ => Ok(YearMonth::of(state.today())),
        }
    }
}

/// Rows plus totals. `R` is `(item, price)` for a day and
/// `(item, price, timestamp)` for a month; both serialize as JSON arrays.
#[derive(Debug, Serialize)]
pub struct SalesReport<R> {
    pub sales: Vec<R>,
    pub total_sales: Money,
    pub expenses: Money,
    pub net_profit: Money,
}

impl<R> SalesReport<R> {
    fn from_report(report: PeriodReport, row: impl Fn(Sale) -> R) -> Self {
        let summary = report.summary;
        SalesReport {
            sales: report.sales.into_iter().map(row).collect(),
            total_sales: summary.total_sales(),
            expenses: summary.total_expenses(),
            net_profit: summary.net_profit(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales/today", get(sales_today))
        .route("/sales/month", get(sales_month))
        .route("/export/{period}", get(export_sales))
        .route("/chart/month", get(chart_month))
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /sales/today`
async fn sales_today(
    State(state): State<AppState>,
) -> ApiResult<Json<SalesReport<(String, Money)>>> {
    let period = PeriodKey::Day(state.today());
    let report = period_report(&state.db, &period).await?;

    Ok(Json(SalesReport::from_report(report, |s| (s.item, s.price))))
}

/// `GET /sales/month?filter=YYYY-MM`
async fn sales_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<SalesReport<(String, Money, String)>>> {
    let period = PeriodKey::Month(query.resolve(&state)?);
    let report = period_report(&state.db, &period).await?;

    Ok(Json(SalesReport::from_report(report, |s| {
        (s.item, s.price, s.timestamp)
    })))
}

/// `GET /export/{period}`: CSV attachment, built in memory.
async fn export_sales(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let export: ExportPeriod = period.parse()?;
    let key = export.resolve(state.today());
    let report = period_report(&state.db, &key).await?;

    let body = sales_csv(&report.sales).map_err(|e| {
        tracing::error!("CSV export failed: {}", e);
        ApiError::internal("Failed to build export")
    })?;

    debug!(period = export.as_str(), rows = report.sales.len(), "Exported sales");

    let disposition = format!("attachment; filename=\"sales_{}.csv\"", export.as_str());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// `GET /chart/month?filter=YYYY-MM`
async fn chart_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<Vec<DailyBreakdown>>> {
    let month = query.resolve(&state)?;
    Ok(Json(month_chart(&state.db, month).await?))
}
