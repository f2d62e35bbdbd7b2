use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Referenced {entity} with id {id} does not exist")]
    ReferenceNotFound { entity: &'static str, id: DbId },

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
