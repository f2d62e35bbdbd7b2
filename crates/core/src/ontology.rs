//! The PAD ontology context bound into every semantic document.
//!
//! The context maps local field names to predicates of the PAD vocabulary.
//! It is built once at startup and shared read-only by every mapping call.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Base URI of the PAD vocabulary.
pub const PAD_VOCAB: &str = "https://pad.crc.nd.edu/ontology#";

/// Local field name -> vocabulary predicate.
const PAD_TERMS: &[(&str, &str)] = &[
    ("sample", "hasSample"),
    ("samples", "hasSample"),
    ("drug", "drugName"),
    ("test", "usesTestType"),
    ("user", "operatedBy"),
    ("project", "belongsToProject"),
    ("name", "name"),
    ("annotation", "annotation"),
    ("date_of_creation", "dateCreated"),
    ("processing_date", "dateProcessed"),
    ("raw_image_path", "rawImage"),
    ("image_path", "processedImage"),
    ("camera", "cameraType"),
    ("notes", "notes"),
    ("sample_id", "sampleId"),
    ("quantity", "concentration"),
    ("concentrations", "concentrationLevels"),
    ("neutral_filler", "neutralFiller"),
    ("issue_id", "issue"),
    ("network_id", "networkId"),
    ("drugs", "detectsDrug"),
    ("description", "description"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyContext {
    vocab: String,
    terms: IndexMap<String, String>,
}

impl OntologyContext {
    pub fn new(vocab: impl Into<String>, terms: IndexMap<String, String>) -> Self {
        Self {
            vocab: vocab.into(),
            terms,
        }
    }

    /// The standard PAD context.
    pub fn pad() -> Self {
        Self::pad_with_vocab(PAD_VOCAB)
    }

    /// The standard PAD terms under a different vocabulary base (e.g. a
    /// staging deployment of the ontology).
    pub fn pad_with_vocab(vocab: impl Into<String>) -> Self {
        let terms = PAD_TERMS
            .iter()
            .map(|(field, predicate)| (field.to_string(), predicate.to_string()))
            .collect();
        Self::new(vocab, terms)
    }

    pub fn vocab(&self) -> &str {
        &self.vocab
    }

    /// Predicate bound to a local field name.
    pub fn predicate(&self, field: &str) -> Option<&str> {
        self.terms.get(field).map(String::as_str)
    }

    /// The `@context` object: `@vocab` plus one entry per term.
    pub fn to_json(&self) -> Value {
        let mut context = Map::with_capacity(self.terms.len() + 1);
        context.insert("@vocab".to_string(), Value::String(self.vocab.clone()));
        for (field, predicate) in &self.terms {
            context.insert(field.clone(), Value::String(predicate.clone()));
        }
        Value::Object(context)
    }
}

impl Default for OntologyContext {
    fn default() -> Self {
        Self::pad()
    }
}
