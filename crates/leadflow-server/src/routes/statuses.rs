use axum::Json;
use leadflow_core::flow;
use leadflow_core::status::{LeadStatus, PipelineStage};

use crate::error::AppError;

/// GET /api/statuses — the full taxonomy: stages in order, each with its
/// statuses (display config, hidden flag, advisory quick actions).
pub async fn get_statuses() -> Result<Json<serde_json::Value>, AppError> {
    let stages: Vec<serde_json::Value> = PipelineStage::all()
        .iter()
        .map(|&stage| {
            let statuses: Vec<serde_json::Value> = stage
                .statuses()
                .iter()
                .map(|&status| status_json(status))
                .collect();
            serde_json::json!({
                "stage": stage,
                "label": stage.label(),
                "progress_index": stage.progress_index(),
                "statuses": statuses,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "default_status": LeadStatus::DEFAULT,
        "stages": stages,
    })))
}

fn status_json(status: LeadStatus) -> serde_json::Value {
    let config = status.config();
    serde_json::json!({
        "status": status,
        "label": config.label,
        "color": config.color,
        "css_class": config.css_class,
        "hidden": flow::is_hidden(status),
        "quick_actions": flow::quick_actions(Some(status.as_str())),
    })
}
