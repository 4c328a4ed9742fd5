//! Beacon node integration for the validator rewards API.
//!
//! Beacon data is reached through the [`BeaconAdapter`] trait so the reward
//! and duties services can run against an HTTP beacon node
//! ([`HttpBeaconClient`]) or against an in-memory double in tests.

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use alloy::primitives::Address;
pub use client::HttpBeaconClient;
pub use types::BeaconBlock;

/// Represents a slot number in the beacon chain.
pub type Slot = u64;

/// Represents a validator index in the beacon chain.
pub type ValidatorIndex = u64;

/// Amount in Gwei.
pub type Gwei = u64;

/// Error type for beacon chain operations.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("Slot not found: {0}")]
    SlotNotFound(Slot),
    #[error("Beacon node returned status {status} for {path}")]
    Status { path: String, status: u16 },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

impl BeaconError {
    /// HTTP status reported by the beacon node, if the failure was a non-success reply.
    pub fn status(&self) -> Option<u16> {
        match self {
            BeaconError::Status { status, .. } => Some(*status),
            BeaconError::SlotNotFound(_) => Some(404),
            _ => None,
        }
    }
}

/// Result type for beacon chain operations.
pub type BeaconResult<T> = Result<T, BeaconError>;

/// Trait for beacon chain adapters.
///
/// Every call reads the current state of the node; implementations must not
/// cache across calls.
#[async_trait]
pub trait BeaconAdapter: Send + Sync {
    /// Get the canonical block for a slot.
    ///
    /// Fails with [`BeaconError::SlotNotFound`] when the node has no block
    /// for the slot (e.g. a missed proposal).
    async fn get_block(&self, slot: Slot) -> BeaconResult<BeaconBlock>;

    /// Get the effective balance of a validator at the head state.
    async fn get_effective_balance(&self, index: ValidatorIndex) -> BeaconResult<Gwei>;

    /// Sum of effective balances across every validator known at the head state.
    ///
    /// This downloads the full validator set and can be a very large response.
    async fn get_total_effective_balance(&self) -> BeaconResult<Gwei>;

    /// Slot of the current chain head.
    async fn get_head_slot(&self) -> BeaconResult<Slot>;

    /// Validators in the sync committee for the state at `slot`.
    async fn get_sync_committee(&self, slot: Slot) -> BeaconResult<Vec<String>>;
}
