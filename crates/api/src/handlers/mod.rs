pub mod card;
pub mod geometry;
pub mod neural_network;
pub mod project;
