//! Batch orchestration of the entity mapper and the response envelope.
//!
//! Every call answers with an [`Envelope`]. Listing calls never fail for an
//! empty result; single-entity lookups fail with `NotFound` when the record
//! is missing. A record that cannot be mapped (e.g. a dangling project
//! reference) is recorded as a failure without aborting the rest of its
//! batch.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;
use crate::records::Record;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Envelope
-------------------------------------------------------------------------- */

/// `{ "success", "data", "error", "summary" }` wrapper used by every call.
///
/// `error` is empty on success; `summary` is always a human-readable sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    pub error: String,
    pub summary: String,
}

impl<T> Envelope<T> {
    pub fn ok(data: T, summary: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            error: String::new(),
            summary: summary.into(),
        }
    }
}

impl<T: Default> Envelope<T> {
    /// A failed envelope with an empty payload.
    pub fn failure(error: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            success: false,
            data: T::default(),
            error: error.into(),
            summary: summary.into(),
        }
    }

    /// A failed envelope describing `err`.
    pub fn from_error(err: &CoreError) -> Self {
        Self::failure(error_message(err), error_summary(err))
    }
}

/// Text for the `error` field. Upstream failures are surfaced verbatim.
pub fn error_message(err: &CoreError) -> String {
    match err {
        CoreError::UpstreamUnavailable(message) => message.clone(),
        other => other.to_string(),
    }
}

/// Sentence for the `summary` field of a failed call.
pub fn error_summary(err: &CoreError) -> String {
    match err {
        CoreError::NotFound { entity, id } => format!("No PAD {entity} found with id {id}."),
        CoreError::ReferenceNotFound { entity, id } => {
            format!("The requested record references a missing PAD {entity} ({id}).")
        }
        CoreError::UpstreamUnavailable(_) => "The PAD data source could not be reached.".to_string(),
        CoreError::Validation(_) => "The request was rejected as invalid.".to_string(),
        CoreError::Internal(_) => "The request could not be completed.".to_string(),
    }
}

/* --------------------------------------------------------------------------
Batch
-------------------------------------------------------------------------- */

/// A record that could not be mapped.
#[derive(Debug)]
pub struct RecordFailure {
    pub entity: &'static str,
    pub id: DbId,
    pub error: CoreError,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.entity, self.id, self.error)
    }
}

/// Outcome of mapping a batch: documents in input order plus failures.
#[derive(Debug)]
pub struct Batch<D> {
    pub documents: Vec<D>,
    pub failures: Vec<RecordFailure>,
}

impl<D> Batch<D> {
    /// Number of input records.
    pub fn total(&self) -> usize {
        self.documents.len() + self.failures.len()
    }

    /// Assemble the envelope. `describe` receives the number of mapped
    /// documents and produces the success summary.
    ///
    /// A batch where every record failed is a failed envelope; a batch with
    /// no records at all is a successful, empty one.
    pub fn into_envelope(self, describe: impl FnOnce(usize) -> String) -> Envelope<Vec<D>> {
        if self.documents.is_empty() && !self.failures.is_empty() {
            let entity = self.failures[0].entity;
            return Envelope::failure(
                self.failure_reasons(),
                format!(
                    "None of the {} requested PAD {entity} records could be mapped.",
                    self.failures.len()
                ),
            );
        }

        let mut summary = describe(self.documents.len());
        if !self.failures.is_empty() {
            let noun = if self.failures.len() == 1 { "record" } else { "records" };
            summary.push_str(&format!(
                " {} {noun} could not be mapped ({}).",
                self.failures.len(),
                self.failure_reasons()
            ));
        }
        Envelope::ok(self.documents, summary)
    }

    fn failure_reasons(&self) -> String {
        self.failures
            .iter()
            .map(RecordFailure::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Map every record, keeping successes in input order and recording a
/// failure for each record that cannot be mapped.
pub fn transform_batch<'r, R, D, F>(records: impl IntoIterator<Item = &'r R>, mut map: F) -> Batch<D>
where
    R: Record + 'r,
    F: FnMut(&R) -> Result<D, CoreError>,
{
    let mut documents = Vec::new();
    let mut failures = Vec::new();

    for record in records {
        match map(record) {
            Ok(doc) => documents.push(doc),
            Err(error) => failures.push(RecordFailure {
                entity: R::ENTITY,
                id: record.id(),
                error,
            }),
        }
    }

    Batch { documents, failures }
}

/// Map a single looked-up record. A missing record fails with `NotFound`.
pub fn transform_single<R, D, F>(record: Option<&R>, id: DbId, map: F) -> Result<D, CoreError>
where
    R: Record,
    F: FnOnce(&R) -> Result<D, CoreError>,
{
    let record = record.ok_or(CoreError::NotFound {
        entity: R::ENTITY,
        id,
    })?;
    map(record)
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use serde_json::{json, Value};

    use super::*;
    use crate::mapper::EntityMapper;
    use crate::ontology::OntologyContext;
    use crate::records::{CardRecord, ProjectRecord};

    fn card(id: DbId, project_id: DbId) -> CardRecord {
        serde_json::from_value(json!({
            "id": id,
            "sample_name": "amoxicillin",
            "test_name": "12LanePADKenya2015",
            "sample_id": 73,
            "project_id": project_id
        }))
        .unwrap()
    }

    fn project_names() -> HashMap<DbId, String> {
        HashMap::from([(12, "FHI360".to_string())])
    }

    // -- batches --

    #[test]
    fn batch_with_one_dangling_reference_keeps_the_rest() {
        let context = OntologyContext::pad();
        let mapper = EntityMapper::new(&context);
        let names = project_names();
        let cards = vec![card(1, 12), card(2, 99), card(3, 12)];

        let batch = transform_batch(&cards, |c| mapper.map_card(c, &names));
        assert_eq!(batch.total(), 3);
        assert_eq!(batch.documents.len(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].id, 2);
        assert_matches!(
            batch.failures[0].error,
            CoreError::ReferenceNotFound { id: 99, .. }
        );

        let envelope = batch.into_envelope(|n| format!("Retrieved {n} PAD cards."));
        assert!(envelope.success);
        assert!(envelope.error.is_empty());
        let ids: Vec<_> = envelope.data.iter().map(|doc| doc.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(envelope.summary.starts_with("Retrieved 2 PAD cards."));
        assert!(envelope.summary.contains("1 record could not be mapped"));
    }

    #[test]
    fn batch_where_everything_fails_is_a_failure() {
        let context = OntologyContext::pad();
        let mapper = EntityMapper::new(&context);
        let names: HashMap<DbId, String> = HashMap::new();
        let cards = vec![card(1, 12), card(2, 12)];

        let envelope = transform_batch(&cards, |c| mapper.map_card(c, &names))
            .into_envelope(|n| format!("Retrieved {n} PAD cards."));
        assert!(!envelope.success);
        assert!(envelope.data.is_empty());
        assert!(envelope.error.contains("Card 1"));
        assert!(envelope.error.contains("Card 2"));
        assert!(envelope.summary.contains("None of the 2"));
    }

    #[test]
    fn empty_batch_is_a_successful_empty_listing() {
        let context = OntologyContext::pad();
        let mapper = EntityMapper::new(&context);
        let projects: Vec<ProjectRecord> = Vec::new();

        let envelope = transform_batch(&projects, |p| Ok(mapper.map_project(p)))
            .into_envelope(|n| format!("Retrieved {n} PAD projects."));
        assert!(envelope.success);
        assert!(envelope.data.is_empty());
        assert_eq!(envelope.summary, "Retrieved 0 PAD projects.");
    }

    // -- single lookups --

    #[test]
    fn missing_single_record_is_not_found() {
        let result = transform_single::<ProjectRecord, (), _>(None, 404, |_| Ok(()));
        assert_matches!(
            result,
            Err(CoreError::NotFound { entity: "Project", id: 404 })
        );
    }

    #[test]
    fn present_single_record_is_mapped() {
        let context = OntologyContext::pad();
        let mapper = EntityMapper::new(&context);
        let record = card(5, 12);
        let doc = transform_single(Some(&record), 5, |c| mapper.map_card(c, &project_names()))
            .unwrap();
        assert_eq!(doc.id, 5);
        assert_eq!(doc.project.name, "FHI360");
    }

    // -- envelopes --

    #[test]
    fn envelope_wire_shape() {
        let envelope = Envelope::ok(vec![1, 2], "Two numbers.");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": true, "data": [1, 2], "error": "", "summary": "Two numbers."})
        );
    }

    #[test]
    fn error_envelopes_have_empty_payloads() {
        let not_found: Envelope<Vec<Value>> =
            Envelope::from_error(&CoreError::NotFound { entity: "Project", id: 3 });
        assert!(!not_found.success);
        assert!(not_found.data.is_empty());
        assert_eq!(not_found.error, "Project with id 3 not found");
        assert_eq!(not_found.summary, "No PAD Project found with id 3.");

        let upstream: Envelope<Vec<Value>> =
            Envelope::from_error(&CoreError::UpstreamUnavailable("timed out".to_string()));
        assert_eq!(upstream.error, "timed out");
    }
}
