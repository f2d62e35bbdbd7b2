#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use pad_core::error::CoreError;
use pad_core::geometry::Layout;
use pad_core::ontology::OntologyContext;
use pad_core::records::{CardRecord, NeuralNetworkRecord, ProjectRecord};
use pad_core::types::DbId;
use pad_upstream::RecordSource;
use serde_json::{json, Value};
use tower::ServiceExt;

use pad_api::app;
use pad_api::config::ServerConfig;
use pad_api::state::AppState;

// ---------------------------------------------------------------------------
// In-memory record source
// ---------------------------------------------------------------------------

/// Record source backed by plain vectors. When `outage` is set every call
/// fails as an unreachable upstream with that message.
#[derive(Debug, Default)]
pub struct MemorySource {
    pub cards: Vec<CardRecord>,
    pub projects: Vec<ProjectRecord>,
    pub neural_networks: Vec<NeuralNetworkRecord>,
    pub outage: Option<String>,
}

impl MemorySource {
    pub fn with_cards(mut self, cards: impl IntoIterator<Item = CardRecord>) -> Self {
        self.cards.extend(cards);
        self
    }

    pub fn with_projects(mut self, projects: impl IntoIterator<Item = ProjectRecord>) -> Self {
        self.projects.extend(projects);
        self
    }

    pub fn with_neural_networks(
        mut self,
        networks: impl IntoIterator<Item = NeuralNetworkRecord>,
    ) -> Self {
        self.neural_networks.extend(networks);
        self
    }

    pub fn down(message: &str) -> Self {
        Self {
            outage: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn available(&self) -> Result<(), CoreError> {
        match &self.outage {
            Some(message) => Err(CoreError::UpstreamUnavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn card(&self, id: DbId) -> Result<Option<CardRecord>, CoreError> {
        self.available()?;
        Ok(self
            .cards
            .iter()
            .find(|card| card.id == id && !card.deleted)
            .cloned())
    }

    async fn cards_by_sample(&self, sample_id: i64) -> Result<Vec<CardRecord>, CoreError> {
        self.available()?;
        Ok(self
            .cards
            .iter()
            .filter(|card| card.sample_id == sample_id && !card.deleted)
            .cloned()
            .collect())
    }

    async fn projects(&self) -> Result<Vec<ProjectRecord>, CoreError> {
        self.available()?;
        Ok(self.projects.clone())
    }

    async fn project(&self, id: DbId) -> Result<Option<ProjectRecord>, CoreError> {
        self.available()?;
        Ok(self.projects.iter().find(|project| project.id == id).cloned())
    }

    async fn neural_networks(&self) -> Result<Vec<NeuralNetworkRecord>, CoreError> {
        self.available()?;
        Ok(self.neural_networks.clone())
    }

    async fn neural_network(&self, id: DbId) -> Result<Option<NeuralNetworkRecord>, CoreError> {
        self.available()?;
        Ok(self
            .neural_networks
            .iter()
            .find(|network| network.id == id)
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A card as the PAD service would return it.
pub fn card(id: DbId, sample_id: i64, project_id: DbId) -> CardRecord {
    serde_json::from_value(json!({
        "id": id,
        "sample_name": "amoxicillin",
        "test_name": "12LanePADKenya2015",
        "user_name": "pad-tech",
        "date_of_creation": "2023-04-18 09:30:05.123",
        "raw_file_location": format!("/var/www/html/images/padimages/raw/{id}.png"),
        "processed_file_location": null,
        "camera_type_1": "Pixel 6",
        "notes": "",
        "sample_id": sample_id,
        "quantity": 80,
        "project_id": project_id,
        "deleted": false
    }))
    .expect("card fixture is valid")
}

pub fn deleted_card(id: DbId, sample_id: i64, project_id: DbId) -> CardRecord {
    CardRecord {
        deleted: true,
        ..card(id, sample_id, project_id)
    }
}

/// A project; `extra` is merged over the base record (flags, sample names).
pub fn project(id: DbId, name: &str, extra: Value) -> ProjectRecord {
    let mut record = json!({
        "id": id,
        "user_name": "pad-admin",
        "project_name": name,
        "annotation": null,
        "test_name": "12LanePADKenya2015",
        "sample_names": ["amoxicillin", "albendazole"],
        "neutral_filler": "lactose",
        "notes": ""
    });
    if let (Some(base), Value::Object(extra)) = (record.as_object_mut(), extra) {
        base.extend(extra);
    }
    serde_json::from_value(record).expect("project fixture is valid")
}

pub fn neural_network(id: DbId, name: &str, drugs: &[&str]) -> NeuralNetworkRecord {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "drugs": drugs,
        "description": null
    }))
    .expect("neural network fixture is valid")
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        pad_api_url: "http://pad.invalid".to_string(),
        pad_api_timeout_secs: 5,
        pad_page_size: 100,
        pad_max_pages: 50,
        display_width: 300,
        layout_path: None,
        ontology_vocab: None,
    }
}

/// Build the full application router over `source`, with the built-in
/// layout and the PAD vocabulary.
pub fn build_test_app(source: MemorySource) -> Router {
    let state = AppState {
        config: Arc::new(test_config()),
        source: Arc::new(source),
        layout: Arc::new(Layout::reference()),
        ontology: Arc::new(OntologyContext::pad()),
    };
    app::build_router(state)
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
