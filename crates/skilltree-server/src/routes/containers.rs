use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use skilltree_core::types::ContainerKind;
use uuid::Uuid;

use super::blocking;
use crate::auth::Caller;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateContainerBody {
    pub kind: String,
    #[serde(default)]
    pub title: String,
}

/// GET /api/containers?kind= - the caller's areas and projects.
pub async fn list_containers(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let result = blocking(move || {
        let kind = query
            .kind
            .as_deref()
            .map(str::parse::<ContainerKind>)
            .transpose()?;
        let list = engine.list_containers(&caller.0, kind)?;
        Ok(serde_json::to_value(list)?)
    })
    .await?;
    Ok(Json(result))
}

/// POST /api/containers - create an area or project with its first level.
pub async fn create_container(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<CreateContainerBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let (created, result) = blocking(move || {
        let kind: ContainerKind = body.kind.parse()?;
        let (container, skills) = engine.create_container(&caller.0, kind, &body.title)?;
        let id = container.id;
        let value = serde_json::json!({
            "container": container,
            "skills": skills,
        });
        Ok((id, value))
    })
    .await?;
    app.notify(created);
    Ok(Json(result))
}

/// GET /api/containers/{id}
pub async fn get_container(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let result = blocking(move || {
        let container = engine.get_container(&caller.0, id)?;
        Ok(serde_json::to_value(container)?)
    })
    .await?;
    Ok(Json(result))
}

/// DELETE /api/containers/{id} - also drops nested sub-trees.
pub async fn delete_container(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let removed = blocking(move || engine.delete_container(&caller.0, id)).await?;
    app.notify(id);
    Ok(Json(serde_json::json!({
        "deleted": id,
        "containers_removed": removed,
    })))
}

/// POST /api/containers/{id}/reconcile - run one auto-unlock pass now.
pub async fn reconcile(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let promoted = blocking(move || engine.reconcile(&caller.0, id)).await?;
    if !promoted.is_empty() {
        app.notify(id);
    }
    Ok(Json(serde_json::json!({ "promoted": promoted })))
}

/// GET /api/containers/{id}/check - consistency report.
pub async fn check(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let result = blocking(move || {
        let report = engine.check_consistency(&caller.0, id)?;
        Ok(serde_json::to_value(report)?)
    })
    .await?;
    Ok(Json(result))
}
