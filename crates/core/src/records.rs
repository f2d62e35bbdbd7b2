//! Card and project records as delivered by the PAD record store.
//!
//! Historical rows are often partially populated, so deserialization is
//! deliberately lenient: `null` strings become empty, missing flags take their
//! documented defaults and timestamps are accepted in the handful of textual
//! forms the store has produced over time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::concentration::ConcentrationFlags;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Quantity assumed for cards that do not record one (full strength).
pub const DEFAULT_QUANTITY: i16 = 100;

/// Common identity of store records.
pub trait Record {
    /// Entity label used in errors and summaries.
    const ENTITY: &'static str;

    fn id(&self) -> DbId;
}

/* --------------------------------------------------------------------------
Card
-------------------------------------------------------------------------- */

/// One physical test card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: DbId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sample_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub test_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub date_of_creation: Option<Timestamp>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw_file_location: String,
    #[serde(default)]
    pub processed_file_location: Option<String>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub processing_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub camera_type_1: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sample_id: i64,
    #[serde(default = "default_quantity", deserialize_with = "quantity_or_default")]
    pub quantity: i16,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_id: DbId,
    #[serde(default)]
    pub issue_id: Option<DbId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deleted: bool,
}

impl Record for CardRecord {
    const ENTITY: &'static str = "Card";

    fn id(&self) -> DbId {
        self.id
    }
}

/* --------------------------------------------------------------------------
Project
-------------------------------------------------------------------------- */

/// Sample names of a project as stored upstream.
///
/// Two shapes exist in historical data: a bare list and a container holding
/// the list under `sample_names`. Anything else is kept as `Malformed` and
/// reads as an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleNames {
    List(Vec<String>),
    Wrapped { sample_names: Vec<String> },
    Malformed(Value),
}

impl SampleNames {
    pub fn names(&self) -> &[String] {
        match self {
            SampleNames::List(names) | SampleNames::Wrapped { sample_names: names } => names,
            SampleNames::Malformed(_) => &[],
        }
    }

    /// True for a present but unrecognized shape. An explicit `null` is an
    /// absent list, not a malformed one.
    pub fn is_malformed(&self) -> bool {
        matches!(self, SampleNames::Malformed(value) if !value.is_null())
    }
}

impl Default for SampleNames {
    fn default() -> Self {
        SampleNames::List(Vec::new())
    }
}

/// A project grouping cards tested against a set of drugs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: DbId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_name: String,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub test_name: String,
    #[serde(default)]
    pub sample_names: SampleNames,
    #[serde(default)]
    pub neutral_filler: Option<String>,
    #[serde(flatten)]
    pub concentrations: ConcentrationFlags,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
}

impl Record for ProjectRecord {
    const ENTITY: &'static str = "Project";

    fn id(&self) -> DbId {
        self.id
    }
}

/* --------------------------------------------------------------------------
Neural network
-------------------------------------------------------------------------- */

/// A trained classifier that reads lane colours for a set of drugs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralNetworkRecord {
    pub id: DbId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "string_list_or_empty")]
    pub drugs: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

impl Record for NeuralNetworkRecord {
    const ENTITY: &'static str = "NeuralNetwork";

    fn id(&self) -> DbId {
        self.id
    }
}

/* --------------------------------------------------------------------------
Lenient field parsing
-------------------------------------------------------------------------- */

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 (the offset is dropped, wall-clock time kept) and
/// `YYYY-MM-DD[T ]HH:MM:SS[.fff]`.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(with_offset) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| CoreError::Validation(format!("Unrecognized timestamp: '{raw}'")))
}

fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => match parse_timestamp(text) {
            Ok(ts) => Ok(Some(ts)),
            Err(err) => {
                tracing::warn!(
                    raw = text,
                    error = %err,
                    "Unreadable stored timestamp, treating as absent"
                );
                Ok(None)
            }
        },
    }
}

/// A list of names; any other stored shape reads as an empty list.
fn string_list_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_value::<Vec<String>>(raw) {
        Ok(names) => Ok(names),
        Err(err) => {
            tracing::warn!(error = %err, "Unrecognized name list, treating as empty");
            Ok(Vec::new())
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn quantity_or_default<'de, D>(deserializer: D) -> Result<i16, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i16>::deserialize(deserializer)?.unwrap_or(DEFAULT_QUANTITY))
}

fn default_quantity() -> i16 {
    DEFAULT_QUANTITY
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
