//! Mapping of store records into JSON-LD documents bound to the PAD ontology.
//!
//! Scalar fields that name a concept (sample, test, operator, project) are
//! wrapped in small typed sub-objects so that linked-data tooling can attach
//! them to the right class. The wire shape of these documents is a
//! compatibility contract with downstream semantic-web consumers.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::ontology::OntologyContext;
use crate::records::{CardRecord, NeuralNetworkRecord, ProjectRecord, Record};
use crate::types::{format_timestamp, DbId};

/* --------------------------------------------------------------------------
Type tags
-------------------------------------------------------------------------- */

pub const TYPE_CARD: &str = "AnalyticalCard";
pub const TYPE_PROJECT: &str = "Project";
pub const TYPE_SAMPLE: &str = "Sample";
pub const TYPE_TEST: &str = "TestType";
pub const TYPE_PERSON: &str = "Person";
pub const TYPE_NEURAL_NETWORK: &str = "NeuralNetwork";

/* --------------------------------------------------------------------------
Foreign-key resolution
-------------------------------------------------------------------------- */

/// Looks up the display name of a project by id.
///
/// Implementations fail with [`CoreError::NotFound`] for unknown ids. Any
/// other error is passed through the mapper unchanged.
pub trait ProjectNameResolver {
    fn resolve_project_name(&self, project_id: DbId) -> Result<String, CoreError>;
}

impl ProjectNameResolver for HashMap<DbId, String> {
    fn resolve_project_name(&self, project_id: DbId) -> Result<String, CoreError> {
        self.get(&project_id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: ProjectRecord::ENTITY,
                id: project_id,
            })
    }
}

/* --------------------------------------------------------------------------
Documents
-------------------------------------------------------------------------- */

/// `{"@type": ..., "name": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedName {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
}

impl TypedName {
    fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}

/// A dereferenced project reference on a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRef {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub id: DbId,
}

/// One drug tested by a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugSample {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub drug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardDocument {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub id: DbId,
    pub sample: TypedName,
    pub test: TypedName,
    pub user: TypedName,
    pub project: ProjectRef,
    pub date_of_creation: Option<String>,
    pub processing_date: Option<String>,
    pub raw_image_path: String,
    pub image_path: Option<String>,
    pub camera: String,
    pub notes: String,
    pub sample_id: i64,
    pub quantity: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<DbId>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDocument {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub id: DbId,
    pub name: String,
    pub annotation: Option<String>,
    pub user: TypedName,
    pub test: TypedName,
    pub samples: Vec<DrugSample>,
    pub neutral_filler: Option<String>,
    pub concentrations: Vec<u8>,
    pub notes: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeuralNetworkDocument {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub network_id: DbId,
    pub name: String,
    pub drugs: Vec<DrugSample>,
    pub description: String,
}

/// Any document produced by [`EntityMapper`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SemanticDocument {
    Card(CardDocument),
    Project(ProjectDocument),
    NeuralNetwork(NeuralNetworkDocument),
}

impl From<CardDocument> for SemanticDocument {
    fn from(doc: CardDocument) -> Self {
        SemanticDocument::Card(doc)
    }
}

impl From<ProjectDocument> for SemanticDocument {
    fn from(doc: ProjectDocument) -> Self {
        SemanticDocument::Project(doc)
    }
}

impl From<NeuralNetworkDocument> for SemanticDocument {
    fn from(doc: NeuralNetworkDocument) -> Self {
        SemanticDocument::NeuralNetwork(doc)
    }
}

/* --------------------------------------------------------------------------
Mapper
-------------------------------------------------------------------------- */

/// Builds semantic documents against a shared ontology context.
#[derive(Debug, Clone, Copy)]
pub struct EntityMapper<'a> {
    context: &'a OntologyContext,
}

impl<'a> EntityMapper<'a> {
    pub fn new(context: &'a OntologyContext) -> Self {
        Self { context }
    }

    /// Map a card, dereferencing its project through `resolver`.
    ///
    /// An unknown project id fails with [`CoreError::ReferenceNotFound`].
    pub fn map_card<R>(&self, card: &CardRecord, resolver: &R) -> Result<CardDocument, CoreError>
    where
        R: ProjectNameResolver + ?Sized,
    {
        let project_name = resolver
            .resolve_project_name(card.project_id)
            .map_err(|err| match err {
                CoreError::NotFound { entity, id } => CoreError::ReferenceNotFound { entity, id },
                other => other,
            })?;

        Ok(CardDocument {
            context: self.context.to_json(),
            kind: TYPE_CARD,
            id: card.id,
            sample: TypedName::new(TYPE_SAMPLE, &card.sample_name),
            test: TypedName::new(TYPE_TEST, &card.test_name),
            user: TypedName::new(TYPE_PERSON, &card.user_name),
            project: ProjectRef {
                kind: TYPE_PROJECT,
                name: project_name,
                id: card.project_id,
            },
            date_of_creation: card.date_of_creation.as_ref().map(format_timestamp),
            processing_date: card.processing_date.as_ref().map(format_timestamp),
            raw_image_path: card.raw_file_location.clone(),
            image_path: card.processed_file_location.clone(),
            camera: card.camera_type_1.clone(),
            notes: card.notes.clone(),
            sample_id: card.sample_id,
            quantity: card.quantity,
            issue_id: card.issue_id,
            description: format!("PAD card with sample_id {}.", card.sample_id),
        })
    }

    /// Map a project. Never fails: an unrecognized sample-name shape maps to
    /// an empty sample list.
    pub fn map_project(&self, project: &ProjectRecord) -> ProjectDocument {
        if project.sample_names.is_malformed() {
            tracing::warn!(
                project_id = project.id,
                "Unrecognized sample_names shape, mapping as empty list"
            );
        }

        let samples = drug_samples(project.sample_names.names());

        let concentrations = project.concentrations.percentages();
        let description = format!(
            "PAD project tested at concentrations {}.",
            describe_concentrations(&concentrations)
        );

        ProjectDocument {
            context: self.context.to_json(),
            kind: TYPE_PROJECT,
            id: project.id,
            name: project.project_name.clone(),
            annotation: project.annotation.clone(),
            user: TypedName::new(TYPE_PERSON, &project.user_name),
            test: TypedName::new(TYPE_TEST, &project.test_name),
            samples,
            neutral_filler: project.neutral_filler.clone(),
            concentrations,
            notes: project.notes.clone(),
            description,
        }
    }

    /// Map a neural network. A network stored without a description gets
    /// one naming how many drugs it reads.
    pub fn map_neural_network(&self, network: &NeuralNetworkRecord) -> NeuralNetworkDocument {
        let description = if network.description.trim().is_empty() {
            format!(
                "PAD neural network {} reading {} drugs.",
                network.name,
                network.drugs.len()
            )
        } else {
            network.description.clone()
        };

        NeuralNetworkDocument {
            context: self.context.to_json(),
            kind: TYPE_NEURAL_NETWORK,
            network_id: network.id,
            name: network.name.clone(),
            drugs: drug_samples(&network.drugs),
            description,
        }
    }
}

fn drug_samples(names: &[String]) -> Vec<DrugSample> {
    names
        .iter()
        .map(|drug| DrugSample {
            kind: TYPE_SAMPLE,
            drug: drug.clone(),
        })
        .collect()
}

fn describe_concentrations(levels: &[u8]) -> String {
    if levels.is_empty() {
        return "none".to_string();
    }
    levels
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
