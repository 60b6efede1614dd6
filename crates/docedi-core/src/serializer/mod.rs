//! Serializers for persisted extraction output.

pub mod json;

pub use json::{JsonOptions, JsonSerializer, COMBINED_RESULTS_FILE};
