pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api-ld/v3` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /cards/by-sample/{sample_id}    cards of one sample as JSON-LD
/// /cards/{id}                     single card as JSON-LD
///
/// /projects                       all projects as JSON-LD
/// /projects/{id}                  single project as JSON-LD
///
/// /neural-networks                all neural networks as JSON-LD
/// /neural-networks/{id}           single neural network as JSON-LD
///
/// /geometry?width=N               card layout scaled to N pixels wide
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cards/by-sample/{sample_id}",
            get(handlers::card::list_by_sample),
        )
        .route("/cards/{id}", get(handlers::card::get_by_id))
        .route("/projects", get(handlers::project::list))
        .route("/projects/{id}", get(handlers::project::get_by_id))
        .route("/neural-networks", get(handlers::neural_network::list))
        .route(
            "/neural-networks/{id}",
            get(handlers::neural_network::get_by_id),
        )
        .route("/geometry", get(handlers::geometry::scaled))
}
