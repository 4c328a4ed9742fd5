//! Beacon API records.
//!
//! The beacon REST API encodes integers as decimal strings; the wire structs
//! below mirror the JSON and are converted into the public types.

use alloy::primitives::Address;
use serde::{Deserialize, Deserializer};

use crate::{BeaconError, BeaconResult, Gwei, Slot, ValidatorIndex};

/// Canonical beacon block, reduced to the fields reward attribution needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconBlock {
    pub slot: Slot,
    pub fee_recipient: Address,
    /// Raw `0x`-prefixed extra data of the execution payload.
    pub extra_data: String,
    /// Withdrawal amounts in Gwei.
    pub withdrawals: Vec<Gwei>,
    proposer_index: String,
    block_number: String,
}

impl BeaconBlock {
    pub fn new(
        slot: Slot,
        proposer_index: impl Into<String>,
        fee_recipient: Address,
        block_number: impl Into<String>,
        extra_data: impl Into<String>,
        withdrawals: Vec<Gwei>,
    ) -> Self {
        Self {
            slot,
            fee_recipient,
            extra_data: extra_data.into(),
            withdrawals,
            proposer_index: proposer_index.into(),
            block_number: block_number.into(),
        }
    }

    /// Index of the validator that proposed the block.
    pub fn proposer_index(&self) -> BeaconResult<ValidatorIndex> {
        self.proposer_index.parse().map_err(|_| BeaconError::InvalidField {
            field: "proposer_index",
            value: self.proposer_index.clone(),
        })
    }

    /// Number of the execution-layer block carried in the payload.
    pub fn execution_block_number(&self) -> BeaconResult<u64> {
        self.block_number.parse().map_err(|_| BeaconError::InvalidField {
            field: "block_number",
            value: self.block_number.clone(),
        })
    }

    pub fn withdrawal_total(&self) -> Gwei {
        self.withdrawals.iter().fold(0, |acc: Gwei, amount| acc.saturating_add(*amount))
    }
}

fn quoted_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlockEnvelope {
    data: SignedBlock,
}

#[derive(Debug, Deserialize)]
struct SignedBlock {
    message: BlockMessage,
}

#[derive(Debug, Deserialize)]
struct BlockMessage {
    #[serde(deserialize_with = "quoted_u64")]
    slot: Slot,
    proposer_index: String,
    body: BlockBody,
}

#[derive(Debug, Deserialize)]
struct BlockBody {
    execution_payload: ExecutionPayload,
}

#[derive(Debug, Deserialize)]
struct ExecutionPayload {
    fee_recipient: Address,
    block_number: String,
    extra_data: String,
    #[serde(default)]
    withdrawals: Vec<Withdrawal>,
}

#[derive(Debug, Deserialize)]
struct Withdrawal {
    #[serde(deserialize_with = "quoted_u64")]
    amount: Gwei,
}

impl From<BlockEnvelope> for BeaconBlock {
    fn from(envelope: BlockEnvelope) -> Self {
        let message = envelope.data.message;
        let payload = message.body.execution_payload;
        BeaconBlock::new(
            message.slot,
            message.proposer_index,
            payload.fee_recipient,
            payload.block_number,
            payload.extra_data,
            payload.withdrawals.into_iter().map(|w| w.amount).collect(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidatorEnvelope {
    pub data: ValidatorEntry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidatorsEnvelope {
    pub data: Vec<ValidatorEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidatorEntry {
    pub validator: ValidatorRecord,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidatorRecord {
    #[serde(deserialize_with = "quoted_u64")]
    pub effective_balance: Gwei,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HeadersEnvelope {
    pub data: Vec<HeaderEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HeaderEntry {
    pub header: SignedHeader,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignedHeader {
    pub message: HeaderMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HeaderMessage {
    #[serde(deserialize_with = "quoted_u64")]
    pub slot: Slot,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SyncCommitteeEnvelope {
    pub data: SyncCommittee,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SyncCommittee {
    pub validators: Vec<String>,
}
