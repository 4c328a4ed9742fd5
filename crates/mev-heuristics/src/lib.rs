//! MEV relay heuristics for block classification.

pub mod relay;

pub use relay::{BlockClassification, RelayClassifier, DEFAULT_RELAYS};
