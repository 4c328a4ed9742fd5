//! Beacon node REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::{debug, info};
use validator_api_telemetry::{endpoint_host, Metrics};

use crate::types::{
    BlockEnvelope, HeadersEnvelope, SyncCommitteeEnvelope, ValidatorEnvelope, ValidatorsEnvelope,
};
use crate::{BeaconAdapter, BeaconBlock, BeaconError, BeaconResult, Gwei, Slot, ValidatorIndex};

/// [`BeaconAdapter`] backed by a beacon node's standard REST API.
pub struct HttpBeaconClient {
    client: Client,
    base_url: String,
    metrics: Metrics,
}

impl HttpBeaconClient {
    /// Create a new beacon client.
    ///
    /// # Arguments
    /// * `base_url` - Beacon node REST base URL
    /// * `timeout` - Applied to every outbound request
    /// * `metrics` - Metrics collector
    pub fn new(base_url: &str, timeout: Duration, metrics: Metrics) -> BeaconResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        info!("Initialized beacon client for {}", endpoint_host(base_url));

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            metrics,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, path: &str) -> BeaconResult<T> {
        let start = Instant::now();
        // reqwest errors embed the full URL, which may carry a provider key
        let result = self.fetch(path).await.map_err(|e| match e {
            BeaconError::Network(e) => BeaconError::Network(e.without_url()),
            e => e,
        });
        self.metrics
            .observe_upstream_latency(operation, start.elapsed().as_secs_f64());
        if result.is_err() {
            self.metrics.inc_upstream_errors();
        }
        result
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> BeaconResult<T> {
        debug!("GET {}", path);

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BeaconError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl BeaconAdapter for HttpBeaconClient {
    async fn get_block(&self, slot: Slot) -> BeaconResult<BeaconBlock> {
        let path = format!("/eth/v2/beacon/blocks/{}", slot);
        match self.get_json::<BlockEnvelope>("get_beacon_block", &path).await {
            Ok(envelope) => Ok(envelope.into()),
            Err(BeaconError::Status { status: 404, .. }) => Err(BeaconError::SlotNotFound(slot)),
            Err(e) => Err(e),
        }
    }

    async fn get_effective_balance(&self, index: ValidatorIndex) -> BeaconResult<Gwei> {
        let path = format!("/eth/v1/beacon/states/head/validators/{}", index);
        let envelope: ValidatorEnvelope = self.get_json("get_validator", &path).await?;
        Ok(envelope.data.validator.effective_balance)
    }

    async fn get_total_effective_balance(&self) -> BeaconResult<Gwei> {
        let envelope: ValidatorsEnvelope = self
            .get_json("get_validators", "/eth/v1/beacon/states/head/validators")
            .await?;

        let count = envelope.data.len();
        let total = envelope
            .data
            .iter()
            .try_fold(0u64, |acc, entry| acc.checked_add(entry.validator.effective_balance))
            .ok_or_else(|| BeaconError::Unexpected("total effective balance overflows u64".to_string()))?;

        debug!("Summed effective balance of {} validators: {} Gwei", count, total);
        Ok(total)
    }

    async fn get_head_slot(&self) -> BeaconResult<Slot> {
        let envelope: HeadersEnvelope = self
            .get_json("get_headers", "/eth/v1/beacon/headers")
            .await?;

        envelope
            .data
            .first()
            .map(|entry| entry.header.message.slot)
            .ok_or_else(|| BeaconError::Unexpected("beacon node returned no headers".to_string()))
    }

    async fn get_sync_committee(&self, slot: Slot) -> BeaconResult<Vec<String>> {
        let path = format!("/eth/v1/beacon/states/{}/sync_committees", slot);
        let envelope: SyncCommitteeEnvelope = self.get_json("get_sync_committee", &path).await?;
        Ok(envelope.data.validators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;

    /// An endpoint that accepts connections and never answers.
    async fn silent_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{}/secret-key", addr)
    }

    fn client_for(server: &mockito::Server) -> HttpBeaconClient {
        HttpBeaconClient::new(&server.url(), Duration::from_secs(5), Metrics::new().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_get_block_maps_404_to_slot_not_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/eth/v2/beacon/blocks/42")
            .with_status(404)
            .with_body(r#"{"code":404,"message":"NOT_FOUND: beacon block at slot 42"}"#)
            .create_async()
            .await;

        let err = client_for(&server).get_block(42).await.unwrap_err();
        assert!(matches!(err, BeaconError::SlotNotFound(42)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_block_rejects_malformed_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/eth/v2/beacon/blocks/7")
            .with_status(200)
            .with_body("{\"data\":")
            .create_async()
            .await;

        let err = client_for(&server).get_block(7).await.unwrap_err();
        assert!(matches!(err, BeaconError::Decode(_)));
    }

    #[tokio::test]
    async fn test_get_effective_balance() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/eth/v1/beacon/states/head/validators/99")
            .with_status(200)
            .with_body(
                r#"{"data":{"index":"99","balance":"32001000000","status":"active_ongoing",
                    "validator":{"pubkey":"0xaa","effective_balance":"32000000000","slashed":false}}}"#,
            )
            .create_async()
            .await;

        let balance = client_for(&server).get_effective_balance(99).await.unwrap();
        assert_eq!(balance, 32_000_000_000);
    }

    #[tokio::test]
    async fn test_get_effective_balance_fails_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/eth/v1/beacon/states/head/validators/5")
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server).get_effective_balance(5).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_total_effective_balance_sums_all_validators() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/eth/v1/beacon/states/head/validators")
            .with_status(200)
            .with_body(
                r#"{"data":[
                    {"index":"0","validator":{"effective_balance":"32000000000"}},
                    {"index":"1","validator":{"effective_balance":"31000000000"}},
                    {"index":"2","validator":{"effective_balance":"16000000000"}}
                ]}"#,
            )
            .create_async()
            .await;

        let total = client_for(&server).get_total_effective_balance().await.unwrap();
        assert_eq!(total, 79_000_000_000);
    }

    #[tokio::test]
    async fn test_head_slot_and_sync_committee() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/eth/v1/beacon/headers")
            .with_status(200)
            .with_body(r#"{"data":[{"root":"0x01","canonical":true,"header":{"message":{"slot":"8000"}}}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/eth/v1/beacon/states/7999/sync_committees")
            .with_status(200)
            .with_body(r#"{"data":{"validators":["1","2","3"],"validator_aggregates":[["1","2","3"]]}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.get_head_slot().await.unwrap(), 8000);
        assert_eq!(client.get_sync_committee(7999).await.unwrap(), vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_empty_headers_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/eth/v1/beacon/headers")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let err = client_for(&server).get_head_slot().await.unwrap_err();
        assert!(matches!(err, BeaconError::Unexpected(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_a_network_error() {
        let endpoint = silent_endpoint().await;
        let client =
            HttpBeaconClient::new(&endpoint, Duration::from_millis(200), Metrics::new().unwrap()).unwrap();

        let err = client.get_block(1).await.unwrap_err();
        assert!(matches!(&err, BeaconError::Network(e) if e.is_timeout()));
        assert!(!err.to_string().contains("secret-key"));
    }

    #[tokio::test]
    async fn test_total_effective_balance_overflow() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/eth/v1/beacon/states/head/validators")
            .with_status(200)
            .with_body(
                r#"{"data":[
                    {"index":"0","validator":{"effective_balance":"18446744073709551615"}},
                    {"index":"1","validator":{"effective_balance":"1"}}
                ]}"#,
            )
            .create_async()
            .await;

        let err = client_for(&server).get_total_effective_balance().await.unwrap_err();
        assert!(matches!(err, BeaconError::Unexpected(_)));
    }

    #[tokio::test]
    async fn test_status_error_names_path_only() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/key123/eth/v1/beacon/states/head/validators/5")
            .with_status(503)
            .create_async()
            .await;

        let client = HttpBeaconClient::new(
            &format!("{}/key123", server.url()),
            Duration::from_secs(5),
            Metrics::new().unwrap(),
        )
        .unwrap();

        let err = client.get_effective_balance(5).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Beacon node returned status 503 for /eth/v1/beacon/states/head/validators/5"
        );
    }
}
