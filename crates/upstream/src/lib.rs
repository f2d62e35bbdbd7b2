//! Client side of the PAD web service.
//!
//! [`api::PadApi`] talks to the v2 REST endpoints; [`source::RecordSource`]
//! is the narrow read interface the HTTP layer depends on.

pub mod api;
pub mod source;

pub use api::{PadApi, PadApiError, Paging};
pub use source::RecordSource;
