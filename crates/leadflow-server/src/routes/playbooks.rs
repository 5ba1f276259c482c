use axum::extract::{Path, Query, State};
use axum::Json;
use leadflow_core::playbook::Playbook;
use leadflow_core::LeadflowError;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize, Default)]
pub struct ListQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

/// GET /api/playbooks — list playbooks.
pub async fn list_playbooks(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let playbooks = Playbook::list(&root, query.include_deleted)?;
        let list: Vec<serde_json::Value> = playbooks
            .iter()
            .map(|p| {
                serde_json::json!({
                    "slug": p.slug,
                    "title": p.title,
                    "category": p.category,
                    "deleted": p.deleted_at.is_some(),
                    "updated_at": p.updated_at,
                })
            })
            .collect();
        Ok::<_, LeadflowError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct CreatePlaybookBody {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub content: String,
}

/// POST /api/playbooks — create a playbook.
pub async fn create_playbook(
    State(app): State<AppState>,
    Json(body): Json<CreatePlaybookBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let playbook =
            Playbook::create(&root, &body.slug, body.title, body.category, &body.content)?;
        Ok::<_, LeadflowError>(serde_json::json!({
            "slug": playbook.slug,
            "title": playbook.title,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/playbooks/:slug — manifest plus markdown body.
pub async fn get_playbook(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let playbook = Playbook::load(&root, &slug)?;
        let content = playbook.read_content(&root)?;
        Ok::<_, LeadflowError>(serde_json::json!({
            "slug": playbook.slug,
            "title": playbook.title,
            "category": playbook.category,
            "content": content,
            "created_at": playbook.created_at,
            "updated_at": playbook.updated_at,
            "deleted_at": playbook.deleted_at,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct UpdatePlaybookBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<Option<String>>,
    #[serde(default)]
    pub content: Option<String>,
}

/// PUT /api/playbooks/:slug — update title, category, and/or content.
pub async fn update_playbook(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<UpdatePlaybookBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut playbook = Playbook::load(&root, &slug)?;
        if let Some(title) = body.title {
            playbook.rename(title);
        }
        if let Some(category) = body.category {
            playbook.set_category(category);
        }
        if let Some(content) = body.content {
            playbook.write_content(&root, &content)?;
        }
        playbook.save(&root)?;
        Ok::<_, LeadflowError>(serde_json::json!({
            "slug": playbook.slug,
            "title": playbook.title,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/playbooks/:slug — soft delete.
pub async fn delete_playbook(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut playbook = Playbook::load(&root, &slug)?;
        playbook.soft_delete()?;
        playbook.save(&root)?;
        Ok::<_, LeadflowError>(serde_json::json!({ "slug": slug, "deleted": true }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/playbooks/:slug/restore — undo a soft delete.
pub async fn restore_playbook(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut playbook = Playbook::load(&root, &slug)?;
        playbook.restore()?;
        playbook.save(&root)?;
        Ok::<_, LeadflowError>(serde_json::json!({ "slug": slug, "deleted": false }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
