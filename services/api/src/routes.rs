use crate::infra::{deserialize_optional_instant, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use placement_analytics::error::AppError;
use placement_analytics::import::PlacementCsvImporter;
use placement_analytics::placements::{
    AnalyticsPolicy, PlacementAnalytics, PlacementReport, PolicyPreset, ReportScope,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::Cursor;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlacementReportRequest {
    /// Decoded placement items as the portal returns them.
    #[serde(default)]
    pub(crate) records: Option<Vec<Value>>,
    /// Raw CSV export; appended after `records` when both are sent.
    #[serde(default)]
    pub(crate) csv: Option<String>,
    #[serde(default)]
    pub(crate) scope: ReportScope,
    /// Full policy override; wins over `preset`.
    #[serde(default)]
    pub(crate) policy: Option<AnalyticsPolicy>,
    #[serde(default)]
    pub(crate) preset: Option<PolicyPreset>,
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub(crate) now: Option<DateTime<Utc>>,
}

pub(crate) fn router() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/placements/report",
            axum::routing::post(placement_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn placement_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<PlacementReportRequest>,
) -> Result<Json<PlacementReport>, AppError> {
    let PlacementReportRequest {
        records,
        csv,
        scope,
        policy,
        preset,
        now,
    } = payload;

    let mut items = records.unwrap_or_default();
    if let Some(csv) = csv {
        items.extend(PlacementCsvImporter::from_reader(Cursor::new(csv.into_bytes()))?);
    }

    let configured = state.analytics.as_ref();
    let policy = policy
        .or_else(|| preset.map(AnalyticsPolicy::from_preset))
        .unwrap_or_else(|| configured.policy().clone());
    let engine = PlacementAnalytics::new(policy, *configured.calendar());

    let report = engine.report(&items, &scope, now.unwrap_or_else(Utc::now));
    info!(
        records = report.kpis.total_records,
        scoped = report.kpis.scoped_placements,
        range = scope.date_range.code(),
        "placement report built"
    );

    Ok(Json(report))
}
