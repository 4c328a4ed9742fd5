//! Structured logging setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Initialize JSON structured logging.
///
/// An explicit `log_level` (e.g. "info", "validator_api_rewards=debug") wins
/// over `RUST_LOG`; with neither set the filter defaults to `info`.
pub fn init_logging(log_level: Option<&str>) -> anyhow::Result<()> {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .try_init()?;

    Ok(())
}

/// Host (and port) of an upstream endpoint, for logging.
///
/// Node provider URLs carry API keys in the path or query, so only the
/// authority is ever logged.
pub fn endpoint_host(endpoint: &str) -> String {
    match Url::parse(endpoint) {
        Ok(url) => match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => "<no host>".to_string(),
        },
        Err(_) => "<invalid url>".to_string(),
    }
}
