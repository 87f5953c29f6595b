//! Reports API endpoints

use axum::extract::{Query, State};
use axum::Json;
use ledgerdash_core::{MonthlySeries, PieChart, Report, Reporting};
use serde::Serialize;
use std::collections::HashMap;

use crate::routes::requested_range;
use crate::{ApiError, AppState, CurrentUser};

/// Report plus the chart payloads the dashboard draws from
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: Report,
    pub pie: PieChart,
    pub monthly: MonthlySeries,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            pie: report.pie_chart(),
            monthly: report.monthly_series,
            report,
        }
    }
}

/// GET /api/report?from=&to=
pub async fn api_report(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ReportResponse>, ApiError> {
    let user = user.ok_or(ApiError::Unauthorized)?;
    let range = requested_range(&state, &params);
    let report = state.store.report(user.id, &range).await?;
    Ok(Json(report.into()))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use ledgerdash_core::{TransactionInput, Variant};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_report_requires_session() {
        let state = state().await;
        let response = get(&state, "/api/report", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_report_json_shape() {
        let state = state().await;
        let store = &state.store;
        let groceries = store.add_category(ALICE, Variant::Expense, "Groceries", None).await.unwrap();
        store
            .add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("40")).with_category(groceries).on(d(2024, 3, 5)))
            .await
            .unwrap();
        store
            .add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("12.5")).with_category(groceries).on(d(2024, 3, 20)))
            .await
            .unwrap();
        store
            .add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("10")).on(d(2024, 3, 21)))
            .await
            .unwrap();
        store
            .add_transaction(ALICE, Variant::Income, TransactionInput::new(dec("100")).on(d(2024, 3, 1)))
            .await
            .unwrap();
        store
            .add_transaction(BOB, Variant::Income, TransactionInput::new(dec("999")).on(d(2024, 3, 1)))
            .await
            .unwrap();

        let cookie = login_as(&state, ALICE, "alice").await;
        let response = get(&state, "/api/report?from=2024-03-01&to=2024-03-31", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["totals"]["income"], 100.0);
        assert_eq!(json["totals"]["expense"], 62.5);
        assert_eq!(json["totals"]["balance"], 37.5);
        assert_eq!(json["pie"]["labels"], serde_json::json!(["Groceries", "Uncategorized"]));
        assert_eq!(json["pie"]["data"], serde_json::json!([52.5, 10.0]));
        assert_eq!(json["monthly"]["expense"][2], 62.5);
        assert_eq!(json["monthly"]["income"].as_array().unwrap().len(), 12);
        assert_eq!(json["period"]["from"], "2024-03-01");
    }

    #[tokio::test]
    async fn test_report_cents_do_not_drift() {
        let state = state().await;
        for amount in ["0.10", "0.20"] {
            state
                .store
                .add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec(amount)).on(d(2024, 3, 1)))
                .await
                .unwrap();
        }

        let cookie = login_as(&state, ALICE, "alice").await;
        let response = get(&state, "/api/report", Some(&cookie)).await;
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["totals"]["expense"], 0.3);
        assert_eq!(json["totals"]["balance"], -0.3);
        assert_eq!(json["pie"]["data"], serde_json::json!([0.3]));
    }
}
