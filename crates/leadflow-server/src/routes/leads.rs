use axum::extract::{Path, Query, State};
use axum::Json;
use leadflow_core::lead::{Lead, LeadFilter, LeadUpdate, NewLead};
use leadflow_core::status::LeadStatus;
use leadflow_core::{paths, LeadflowError};

use crate::error::AppError;
use crate::state::AppState;

/// Summary shape shared by the list endpoint.
pub(crate) fn lead_summary(lead: &Lead) -> serde_json::Value {
    serde_json::json!({
        "id": lead.id,
        "name": lead.name,
        "email": lead.email,
        "phone": lead.phone,
        "status": lead.status,
        "status_label": lead.status_config().label,
        "stage": lead.stage(),
        "expected_revenue": lead.expected_revenue,
        "probability": lead.probability,
        "utm_source": lead.utm_source,
        "deleted": lead.is_deleted(),
        "created_at": lead.created_at,
        "updated_at": lead.updated_at,
    })
}

fn lead_detail(lead: &Lead) -> serde_json::Value {
    serde_json::json!({
        "id": lead.id,
        "name": lead.name,
        "first_name": lead.first_name,
        "last_name": lead.last_name,
        "email": lead.email,
        "phone": lead.phone,
        "source": lead.source,
        "status": lead.status,
        "status_label": lead.status_config().label,
        "stage": lead.stage(),
        "quick_actions": lead.quick_actions(),
        "expected_revenue": lead.expected_revenue,
        "probability": lead.probability,
        "utm_source": lead.utm_source,
        "utm_medium": lead.utm_medium,
        "utm_campaign": lead.utm_campaign,
        "utm_content": lead.utm_content,
        "utm_term": lead.utm_term,
        "notes": lead.notes,
        "events": lead.events,
        "created_at": lead.created_at,
        "updated_at": lead.updated_at,
        "deleted_at": lead.deleted_at,
    })
}

#[derive(serde::Deserialize, Default)]
pub struct ListQuery {
    pub status: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
    pub utm_source: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}

/// GET /api/leads — list leads with optional filters.
pub async fn list_leads(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let statuses = match query.status.as_deref() {
        Some(s) => vec![s.parse::<LeadStatus>()?],
        None => Vec::new(),
    };
    let filter = LeadFilter {
        statuses,
        include_deleted: query.include_deleted,
        utm_source: query.utm_source,
        search: query.search,
        offset: query.offset,
        limit: query.limit,
        ..LeadFilter::default()
    };

    let result = tokio::task::spawn_blocking(move || {
        let leads = Lead::list_filtered(&root, &filter)?;
        let list: Vec<serde_json::Value> = leads.iter().map(lead_summary).collect();
        Ok::<_, LeadflowError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/leads — create a lead. Status always starts at the initial
/// status regardless of the payload.
pub async fn create_lead(
    State(app): State<AppState>,
    Json(input): Json<NewLead>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let lead = Lead::create(&root, input)?;
        Ok::<_, LeadflowError>(lead_detail(&lead))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/leads/:id — full lead detail with notes, events, and the
/// advisory quick actions for its current status.
pub async fn get_lead(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let lead = Lead::load(&root, paths::parse_lead_id(&id)?)?;
        Ok::<_, LeadflowError>(lead_detail(&lead))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// PUT /api/leads/:id — partial field update.
pub async fn update_lead(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<LeadUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut lead = Lead::load(&root, paths::parse_lead_id(&id)?)?;
        lead.update(changes)?;
        lead.save(&root)?;
        Ok::<_, LeadflowError>(lead_detail(&lead))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct SetStatusBody {
    pub status: String,
    /// Opt-in: reject targets the transition graph does not suggest.
    #[serde(default)]
    pub strict: bool,
}

/// POST /api/leads/:id/status — overwrite the status. The transition graph
/// is advisory; any valid status is accepted unless `strict` is set.
pub async fn set_status(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SetStatusBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let target: LeadStatus = body.status.parse()?;
        let mut lead = Lead::load(&root, paths::parse_lead_id(&id)?)?;
        if body.strict {
            lead.set_status_strict(target)?;
        } else {
            lead.set_status(target);
        }
        lead.save(&root)?;
        Ok::<_, LeadflowError>(lead_detail(&lead))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/leads/:id — soft delete.
pub async fn delete_lead(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut lead = Lead::load(&root, paths::parse_lead_id(&id)?)?;
        lead.soft_delete()?;
        lead.save(&root)?;
        Ok::<_, LeadflowError>(serde_json::json!({ "id": lead.id, "deleted": true }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/leads/:id/restore — undo a soft delete.
pub async fn restore_lead(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut lead = Lead::load(&root, paths::parse_lead_id(&id)?)?;
        lead.restore()?;
        lead.save(&root)?;
        Ok::<_, LeadflowError>(lead_detail(&lead))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct NoteBody {
    pub body: String,
}

/// POST /api/leads/:id/notes — add a note.
pub async fn add_note(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<NoteBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut lead = Lead::load(&root, paths::parse_lead_id(&id)?)?;
        let note_id = lead.add_note(body.body);
        lead.save(&root)?;
        Ok::<_, LeadflowError>(serde_json::json!({ "id": lead.id, "note_id": note_id }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// PUT /api/leads/:id/notes/:note_id — edit a note.
pub async fn update_note(
    State(app): State<AppState>,
    Path((id, note_id)): Path<(String, String)>,
    Json(body): Json<NoteBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut lead = Lead::load(&root, paths::parse_lead_id(&id)?)?;
        lead.edit_note(&note_id, body.body)?;
        lead.save(&root)?;
        Ok::<_, LeadflowError>(serde_json::json!({ "id": lead.id, "note_id": note_id }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/leads/:id/notes/:note_id — remove a note. The audit event
/// stays on the lead.
pub async fn delete_note(
    State(app): State<AppState>,
    Path((id, note_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut lead = Lead::load(&root, paths::parse_lead_id(&id)?)?;
        lead.remove_note(&note_id)?;
        lead.save(&root)?;
        Ok::<_, LeadflowError>(serde_json::json!({ "id": lead.id, "note_id": note_id }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
