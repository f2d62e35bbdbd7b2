//! Handlers for the `/neural-networks` resource.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use pad_core::mapper::{EntityMapper, NeuralNetworkDocument};
use pad_core::transform::{transform_batch, transform_single, Envelope};
use pad_core::types::DbId;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api-ld/v3/neural-networks
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<Vec<NeuralNetworkDocument>>>> {
    let networks = state.source.neural_networks().await?;

    let mapper = EntityMapper::new(&state.ontology);
    let batch = transform_batch(&networks, |network| Ok(mapper.map_neural_network(network)));

    Ok(Json(batch.into_envelope(|count| {
        format!("Retrieved {count} PAD neural networks in semantic JSON-LD format.")
    })))
}

/// GET /api-ld/v3/neural-networks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<Envelope<NeuralNetworkDocument>>> {
    let Path(id) = path?;
    let network = state.source.neural_network(id).await?;

    let mapper = EntityMapper::new(&state.ontology);
    let document = transform_single(network.as_ref(), id, |network| {
        Ok(mapper.map_neural_network(network))
    })?;

    Ok(Json(Envelope::ok(
        document,
        format!("Retrieved PAD neural network {id} in semantic JSON-LD format."),
    )))
}
