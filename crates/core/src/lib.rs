//! Semantic transformation layer for Paper Analytical Device (PAD) data.
//!
//! Pure, synchronous building blocks: card-layout scaling, concentration
//! encoding, JSON-LD mapping of card/project records and envelope assembly.
//! Nothing in this crate performs I/O or holds shared mutable state.

pub mod concentration;
pub mod error;
pub mod geometry;
pub mod mapper;
pub mod ontology;
pub mod pixel;
pub mod records;
pub mod transform;
pub mod types;
