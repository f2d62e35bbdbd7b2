//! Handlers for the `/cards` resource.

use std::collections::{BTreeSet, HashMap};

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use futures::future::try_join_all;
use pad_core::error::CoreError;
use pad_core::mapper::{CardDocument, EntityMapper};
use pad_core::transform::{transform_batch, transform_single, Envelope};
use pad_core::types::DbId;
use pad_upstream::RecordSource;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api-ld/v3/cards/by-sample/{sample_id}
///
/// Cards that cannot be mapped are reported in the summary; the call only
/// fails (422) when none of the matching cards could be mapped.
pub async fn list_by_sample(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<(StatusCode, Json<Envelope<Vec<CardDocument>>>)> {
    let Path(sample_id) = path?;
    let cards = state.source.cards_by_sample(sample_id).await?;
    let project_names =
        project_names(state.source.as_ref(), cards.iter().map(|card| card.project_id)).await?;

    let mapper = EntityMapper::new(&state.ontology);
    let batch = transform_batch(&cards, |card| mapper.map_card(card, &project_names));
    if !batch.failures.is_empty() {
        tracing::warn!(
            sample_id,
            failed = batch.failures.len(),
            total = batch.total(),
            "Some cards could not be mapped"
        );
    }

    let envelope = batch.into_envelope(|count| {
        format!("Retrieved {count} PAD cards for sample {sample_id} in semantic JSON-LD format.")
    });
    let status = if envelope.success {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(envelope)))
}

/// GET /api-ld/v3/cards/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<Envelope<CardDocument>>> {
    let Path(id) = path?;
    let card = state.source.card(id).await?;
    let project_names =
        project_names(state.source.as_ref(), card.iter().map(|card| card.project_id)).await?;

    let mapper = EntityMapper::new(&state.ontology);
    let document = transform_single(card.as_ref(), id, |card| {
        mapper.map_card(card, &project_names)
    })?;

    Ok(Json(Envelope::ok(
        document,
        format!("Retrieved PAD card {id} in semantic JSON-LD format."),
    )))
}

/// Look up the name of every distinct project, concurrently.
///
/// Ids with no project are left out of the map, so mapping a card that
/// points at one fails with a dangling-reference error.
async fn project_names(
    source: &dyn RecordSource,
    project_ids: impl IntoIterator<Item = DbId>,
) -> Result<HashMap<DbId, String>, CoreError> {
    let distinct: BTreeSet<DbId> = project_ids.into_iter().collect();
    tracing::debug!(count = distinct.len(), "Resolving project names");

    let lookups = distinct
        .into_iter()
        .map(|id| async move { source.project(id).await.map(|project| (id, project)) });
    let found = try_join_all(lookups).await?;

    Ok(found
        .into_iter()
        .filter_map(|(id, project)| project.map(|project| (id, project.project_name)))
        .collect())
}
