//! Observability for the validator rewards API.

pub mod metrics;
pub mod logging;

pub use metrics::Metrics;
pub use logging::{endpoint_host, init_logging};
