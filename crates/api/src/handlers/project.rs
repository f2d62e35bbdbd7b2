//! Handlers for the `/projects` resource.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use pad_core::mapper::{EntityMapper, ProjectDocument};
use pad_core::transform::{transform_batch, transform_single, Envelope};
use pad_core::types::DbId;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api-ld/v3/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Envelope<Vec<ProjectDocument>>>> {
    let projects = state.source.projects().await?;

    let mapper = EntityMapper::new(&state.ontology);
    let batch = transform_batch(&projects, |project| Ok(mapper.map_project(project)));

    Ok(Json(batch.into_envelope(|count| {
        format!("Retrieved {count} PAD projects in semantic JSON-LD format.")
    })))
}

/// GET /api-ld/v3/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<Envelope<ProjectDocument>>> {
    let Path(id) = path?;
    let project = state.source.project(id).await?;

    let mapper = EntityMapper::new(&state.ontology);
    let document = transform_single(project.as_ref(), id, |project| {
        Ok(mapper.map_project(project))
    })?;

    Ok(Json(Envelope::ok(
        document,
        format!("Retrieved PAD project {id} in semantic JSON-LD format."),
    )))
}
