use axum::extract::{Query, State};
use axum::Json;
use leadflow_core::config::Config;
use leadflow_core::kpi;
use leadflow_core::lead::Lead;
use leadflow_core::LeadflowError;

use crate::error::AppError;
use crate::state::AppState;

/// Dashboard KPIs are computed over live (non-deleted) leads.
fn live_leads(root: &std::path::Path) -> Result<Vec<Lead>, LeadflowError> {
    Ok(Lead::list(root)?
        .into_iter()
        .filter(|l| !l.is_deleted())
        .collect())
}

/// GET /api/kpis — stage counts, conversion rate, pipeline values.
pub async fn get_kpis(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let leads = live_leads(&root)?;
        Ok::<_, LeadflowError>(serde_json::json!(kpi::pipeline_kpis(&leads)))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/kpis/funnel — per-stage counts and share.
pub async fn get_funnel(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let leads = live_leads(&root)?;
        Ok::<_, LeadflowError>(serde_json::json!(kpi::conversion_funnel(&leads)))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize, Default)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// GET /api/kpis/utm — top UTM sources by lead count.
pub async fn get_utm_performance(
    State(app): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        let leads = live_leads(&root)?;
        let limit = query.limit.unwrap_or(config.utm_limit);
        Ok::<_, LeadflowError>(serde_json::json!(kpi::utm_performance(&leads, limit)))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize, Default)]
pub struct TrendQuery {
    pub days: Option<u32>,
}

/// GET /api/kpis/trends — leads created per status per day.
pub async fn get_trends(
    State(app): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        let leads = live_leads(&root)?;
        let days = query.days.unwrap_or(config.trend_days);
        let today = chrono::Utc::now().date_naive();
        Ok::<_, LeadflowError>(serde_json::json!(kpi::status_trend(&leads, days, today)))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/kpis/activity — newest events across all leads.
pub async fn get_activity(
    State(app): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let config = Config::load(&root)?;
        let leads = Lead::list(&root)?;
        let limit = query.limit.unwrap_or(config.activity_limit);
        Ok::<_, LeadflowError>(serde_json::json!(kpi::recent_activity(&leads, limit)))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
