use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use skilltree_core::skill::{NewSkill, SkillPatch};
use skilltree_core::types::Direction;
use uuid::Uuid;

use super::blocking;
use crate::auth::Caller;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MoveBody {
    pub direction: String,
}

#[derive(Debug, Deserialize)]
pub struct InsertBody {
    #[serde(default)]
    pub title: String,
}

/// GET /api/containers/{id}/skills - visible skills after a reconciliation
/// pass. `{id}` may be a parent skill; an unstarted sub-tree lists empty.
pub async fn list_skills(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let result = blocking(move || {
        let skills = engine.list_skills(&caller.0, id)?;
        Ok(serde_json::to_value(skills)?)
    })
    .await?;
    Ok(Json(result))
}

/// POST /api/containers/{id}/skills - non-positional create, at most five
/// per level.
pub async fn create_skill(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(body): Json<NewSkill>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let (container, result) = blocking(move || {
        let skill = engine.create_skill(&caller.0, id, body)?;
        Ok((skill.skill.container.id(), serde_json::to_value(skill)?))
    })
    .await?;
    app.notify(container);
    Ok(Json(result))
}

/// PATCH /api/skills/{id}
pub async fn update_skill(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(body): Json<SkillPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let (container, result) = blocking(move || {
        let skill = engine.update_skill(&caller.0, id, body)?;
        Ok((skill.skill.container.id(), serde_json::to_value(skill)?))
    })
    .await?;
    app.notify(container);
    Ok(Json(result))
}

/// DELETE /api/skills/{id}
pub async fn delete_skill(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let removed = blocking(move || engine.delete_skill(&caller.0, id)).await?;
    app.notify(removed.container.id());
    Ok(Json(serde_json::json!({
        "deleted": removed.id,
        "level": removed.level,
    })))
}

/// POST /api/skills/{id}/toggle - a refused toggle is a normal response
/// with `rejected: true`.
pub async fn toggle(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let (changed, result) = blocking(move || {
        let toggled = engine.toggle_status(&caller.0, id)?;
        let changed = match toggled.outcome {
            skilltree_core::status::ToggleOutcome::Changed { .. } => {
                Some(engine.skill_container(&caller.0, id)?)
            }
            _ => None,
        };
        let rejected = toggled.outcome.is_rejected();
        let mut value = serde_json::to_value(toggled)?;
        value["rejected"] = serde_json::Value::Bool(rejected);
        Ok((changed, value))
    })
    .await?;
    if let Some(container) = changed {
        app.notify(container);
    }
    Ok(Json(result))
}

/// POST /api/skills/{id}/move - `{"direction": "up" | "down"}`.
pub async fn move_skill(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let (moved, container) = blocking(move || {
        let direction: Direction = body.direction.parse()?;
        let moved = engine.move_skill(&caller.0, id, direction)?;
        Ok((moved, engine.skill_container(&caller.0, id)?))
    })
    .await?;
    if moved {
        app.notify(container);
    }
    Ok(Json(serde_json::json!({ "moved": moved })))
}

/// POST /api/skills/{id}/insert-below
pub async fn insert_below(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(body): Json<InsertBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let (container, result) = blocking(move || {
        let skill = engine.insert_skill_below(&caller.0, id, &body.title)?;
        Ok((skill.skill.container.id(), serde_json::to_value(skill)?))
    })
    .await?;
    app.notify(container);
    Ok(Json(result))
}
