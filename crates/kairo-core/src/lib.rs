//! Core crate for Kairo: shared types, configuration, and the response
//! normalizer that turns model text into schedule records.

pub mod config;
pub mod normalize;
pub mod types;
pub mod utils;

pub use normalize::{normalize, normalize_chat, normalize_extraction, NormalizeError};
