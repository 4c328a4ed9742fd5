//! Block reward attribution and sync duty lookups.
//!
//! [`RewardService`] is the entry point for reward attribution: it fetches
//! the block for a slot, classifies it, prices the proposer's base issuance
//! and the block's fee or MEV component, and sums them. Nothing is cached;
//! every call reads the upstream nodes from scratch.

pub mod calculator;
pub mod duties;
pub mod service;

use validator_api_beacon::Slot;

pub use duties::{DutiesError, SyncDuties, SyncDutiesService};
pub use service::{BlockReward, RewardError, RewardService};

/// Parse a slot path parameter as a non-negative integer.
pub fn parse_slot(param: &str) -> Option<Slot> {
    param.parse().ok()
}
