use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use leadflow_core::lead::{Lead, NewLead};
use leadflow_core::LeadflowError;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/webhook/leads — external lead ingestion (ad platforms, landing
/// pages). `name` is required; contact and UTM fields are optional. The
/// created lead always starts at the taxonomy's initial status.
pub async fn ingest_lead(
    State(app): State<AppState>,
    Json(payload): Json<NewLead>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let lead = Lead::create(&root, payload)?;
        Ok::<_, LeadflowError>(serde_json::json!({
            "id": lead.id,
            "status": lead.status,
            "created_at": lead.created_at,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok((StatusCode::CREATED, Json(result)))
}
