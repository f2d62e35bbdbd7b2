//! The record-store interface consumed by the HTTP layer.

use async_trait::async_trait;
use pad_core::error::CoreError;
use pad_core::records::{CardRecord, NeuralNetworkRecord, ProjectRecord};
use pad_core::types::DbId;

use crate::api::PadApi;

/// Read access to card, project and neural-network records.
///
/// Soft-deleted cards are invisible through this interface: they are left out
/// of listings and a lookup by id reports them as missing.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn card(&self, id: DbId) -> Result<Option<CardRecord>, CoreError>;

    async fn cards_by_sample(&self, sample_id: i64) -> Result<Vec<CardRecord>, CoreError>;

    async fn projects(&self) -> Result<Vec<ProjectRecord>, CoreError>;

    async fn project(&self, id: DbId) -> Result<Option<ProjectRecord>, CoreError>;

    async fn neural_networks(&self) -> Result<Vec<NeuralNetworkRecord>, CoreError>;

    async fn neural_network(&self, id: DbId) -> Result<Option<NeuralNetworkRecord>, CoreError>;
}

#[async_trait]
impl RecordSource for PadApi {
    async fn card(&self, id: DbId) -> Result<Option<CardRecord>, CoreError> {
        let card = self.get_card(id).await?;
        Ok(card.filter(|card| !card.deleted))
    }

    /// The v2 API has no sample filter, so the card listing is scanned.
    async fn cards_by_sample(&self, sample_id: i64) -> Result<Vec<CardRecord>, CoreError> {
        let cards = self.all_cards().await?;
        Ok(cards
            .into_iter()
            .filter(|card| card.sample_id == sample_id && !card.deleted)
            .collect())
    }

    async fn projects(&self) -> Result<Vec<ProjectRecord>, CoreError> {
        Ok(self.all_projects().await?)
    }

    async fn project(&self, id: DbId) -> Result<Option<ProjectRecord>, CoreError> {
        Ok(self.get_project(id).await?)
    }

    async fn neural_networks(&self) -> Result<Vec<NeuralNetworkRecord>, CoreError> {
        Ok(self.all_neural_networks().await?)
    }

    async fn neural_network(&self, id: DbId) -> Result<Option<NeuralNetworkRecord>, CoreError> {
        Ok(self.get_neural_network(id).await?)
    }
}
