//! Sync committee duty lookup.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use validator_api_beacon::{BeaconAdapter, BeaconError, Slot};

use crate::parse_slot;

/// Validators on sync committee duty at a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncDuties {
    pub slot: Slot,
    pub validators: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DutiesError {
    #[error("Invalid slot number")]
    InvalidSlot(String),
    #[error("Failed to fetch latest slot")]
    HeadSlot(#[source] BeaconError),
    #[error("Requested slot is too far in the future to have duties available")]
    FutureSlot { requested: Slot, head: Slot },
    #[error("{}", upstream_message(.status))]
    Upstream { status: u16 },
    #[error("Failed to parse response")]
    Decode(#[source] BeaconError),
    #[error("Failed to fetch data")]
    Fetch(#[source] BeaconError),
}

fn upstream_message(status: &u16) -> &'static str {
    match *status {
        404 => "Slot not found or no duties available",
        500 => "Unexpected server error",
        _ => "Unexpected upstream status",
    }
}

impl DutiesError {
    /// HTTP status to report. Upstream failures are proxied verbatim.
    pub fn status_code(&self) -> u16 {
        match self {
            DutiesError::InvalidSlot(_) | DutiesError::FutureSlot { .. } => 400,
            DutiesError::Upstream { status } => *status,
            DutiesError::HeadSlot(_) | DutiesError::Decode(_) | DutiesError::Fetch(_) => 500,
        }
    }
}

/// Looks up sync committee membership for slots up to the chain head.
pub struct SyncDutiesService {
    beacon: Arc<dyn BeaconAdapter>,
}

impl SyncDutiesService {
    pub fn new(beacon: Arc<dyn BeaconAdapter>) -> Self {
        Self { beacon }
    }

    pub async fn sync_duties(&self, slot_param: &str) -> Result<SyncDuties, DutiesError> {
        let slot =
            parse_slot(slot_param).ok_or_else(|| DutiesError::InvalidSlot(slot_param.to_string()))?;

        let head = self
            .beacon
            .get_head_slot()
            .await
            .map_err(DutiesError::HeadSlot)?;
        if slot > head {
            debug!("Slot {} is beyond head slot {}", slot, head);
            return Err(DutiesError::FutureSlot {
                requested: slot,
                head,
            });
        }

        let validators = self
            .beacon
            .get_sync_committee(slot)
            .await
            .map_err(|e| {
                warn!("Sync committee lookup for slot {} failed: {}", slot, e);
                match e {
                    BeaconError::Decode(_) => DutiesError::Decode(e),
                    _ => match e.status() {
                        Some(status) => DutiesError::Upstream { status },
                        None => DutiesError::Fetch(e),
                    },
                }
            })?;

        Ok(SyncDuties { slot, validators })
    }
}
