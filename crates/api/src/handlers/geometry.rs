//! Handler for the scaled card layout.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use pad_core::geometry::Layout;
use pad_core::transform::Envelope;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GeometryParams {
    /// Target card width in pixels; the configured display width when absent.
    pub width: Option<u32>,
}

/// GET /api-ld/v3/geometry?width=N
pub async fn scaled(
    State(state): State<AppState>,
    query: Result<Query<GeometryParams>, QueryRejection>,
) -> AppResult<Json<Envelope<Layout>>> {
    let Query(params) = query?;
    let width = params.width.unwrap_or(state.config.display_width);

    let layout = state.layout.scale_to_width(width)?;
    tracing::debug!(width, lanes = layout.lane_count(), "Scaled card layout");

    Ok(Json(Envelope::ok(
        layout,
        format!("PAD card layout scaled to a width of {width} pixels."),
    )))
}
