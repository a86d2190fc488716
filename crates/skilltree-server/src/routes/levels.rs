use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use super::blocking;
use crate::auth::Caller;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateLevelBody {
    pub level: u32,
    #[serde(default)]
    pub start_y: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SubtitleBody {
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// POST /api/containers/{id}/levels - generate or re-open a level. Safe to
/// retry: a second call returns the same skills. `{id}` may also be a
/// parent skill, whose sub-tree is created on first use.
pub async fn generate_level(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(body): Json<GenerateLevelBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let (container, result) = blocking(move || {
        let generated = engine.generate_level(&caller.0, id, body.level, body.start_y)?;
        Ok((generated.container.id, serde_json::to_value(generated)?))
    })
    .await?;
    app.notify(container);
    Ok(Json(result))
}

/// PUT /api/containers/{id}/levels/{level}/subtitle
pub async fn set_subtitle(
    State(app): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((id, level)): Path<(Uuid, u32)>,
    Json(body): Json<SubtitleBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = app.engine.clone();
    let (container, result) = blocking(move || {
        let container =
            engine.set_level_subtitle(&caller.0, id, level, &body.label, &body.description)?;
        Ok((container.id, serde_json::to_value(container)?))
    })
    .await?;
    app.notify(container);
    Ok(Json(result))
}
