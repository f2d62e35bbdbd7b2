use std::sync::Arc;

use pad_core::geometry::Layout;
use pad_core::ontology::OntologyContext;
use pad_upstream::RecordSource;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). The layout and
/// ontology are loaded once at startup and never change.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Where card and project records are read from.
    pub source: Arc<dyn RecordSource>,
    /// Reference card layout that geometry requests are scaled from.
    pub layout: Arc<Layout>,
    /// Vocabulary used for every semantic document.
    pub ontology: Arc<OntologyContext>,
}
