//! End-to-end block reward computation for a slot.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use validator_api_beacon::{BeaconAdapter, BeaconError, Slot, ValidatorIndex};
use validator_api_execution::{ExecutionAdapter, ExecutionError};
use validator_api_heuristics::{BlockClassification, RelayClassifier};
use validator_api_telemetry::Metrics;

use crate::calculator::{self, CalculationError};
use crate::parse_slot;

/// Reward attributed to the proposer of a slot's block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReward {
    pub status: BlockClassification,
    /// Gwei, with exactly three decimals.
    pub reward: String,
}

/// Failure of one step of the reward pipeline.
///
/// Each variant's message names the step that failed; the first failure
/// aborts the computation.
#[derive(Debug, thiserror::Error)]
pub enum RewardError {
    #[error("Invalid slot number")]
    InvalidSlot(String),
    #[error("Failed to fetch block data: {0}")]
    FetchBlock(#[source] BeaconError),
    #[error("Invalid proposer index: {0}")]
    InvalidProposerIndex(#[source] BeaconError),
    #[error("Failed to calculate base reward: failed to fetch validator balance: {0}")]
    ValidatorBalance(#[source] BeaconError),
    #[error("Failed to calculate base reward: failed to fetch total staked: {0}")]
    TotalStake(#[source] BeaconError),
    #[error("Failed to calculate base reward: {0}")]
    BaseReward(#[source] CalculationError),
    #[error("Invalid block number: {0}")]
    InvalidBlockNumber(#[source] BeaconError),
    #[error("Failed to fetch block details: {0}")]
    FetchExecutionBlock(#[source] ExecutionError),
    #[error("Failed to calculate proposer payment: {0}")]
    ProposerPayment(#[source] CalculationError),
    #[error("Failed to calculate transaction fees: {0}")]
    TransactionFees(#[source] CalculationError),
    #[error("Failed to combine block reward: {0}")]
    Combine(#[source] CalculationError),
}

impl RewardError {
    /// Whether the request itself was invalid, as opposed to an upstream or
    /// arithmetic failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, RewardError::InvalidSlot(_))
    }

    pub fn status_code(&self) -> u16 {
        if self.is_validation() {
            400
        } else {
            500
        }
    }
}

/// Computes block rewards from a beacon node and an execution endpoint.
///
/// The service holds no mutable state; concurrent calls are independent.
pub struct RewardService {
    beacon: Arc<dyn BeaconAdapter>,
    execution: Arc<dyn ExecutionAdapter>,
    classifier: RelayClassifier,
    metrics: Metrics,
}

impl RewardService {
    pub fn new(
        beacon: Arc<dyn BeaconAdapter>,
        execution: Arc<dyn ExecutionAdapter>,
        classifier: RelayClassifier,
        metrics: Metrics,
    ) -> Self {
        Self {
            beacon,
            execution,
            classifier,
            metrics,
        }
    }

    /// Compute the reward for the block at `slot_param`.
    ///
    /// The slot is validated before any upstream call is made.
    pub async fn block_reward(&self, slot_param: &str) -> Result<BlockReward, RewardError> {
        let result = self.compute(slot_param).await;

        match &result {
            Ok(reward) => {
                self.metrics.inc_blocks_classified(reward.status.as_str());
                info!(
                    "Slot {}: {} with reward {} Gwei",
                    slot_param,
                    reward.status.as_str(),
                    reward.reward
                );
            }
            Err(e) if e.is_validation() => debug!("Rejected slot parameter {:?}", slot_param),
            Err(e) => {
                self.metrics.inc_reward_failures();
                warn!("Block reward for slot {} failed: {}", slot_param, e);
            }
        }

        result
    }

    async fn compute(&self, slot_param: &str) -> Result<BlockReward, RewardError> {
        let slot: Slot =
            parse_slot(slot_param).ok_or_else(|| RewardError::InvalidSlot(slot_param.to_string()))?;

        let block = self
            .beacon
            .get_block(slot)
            .await
            .map_err(RewardError::FetchBlock)?;

        let status = self.classifier.classify(&block.extra_data);
        debug!(
            "Slot {} fee recipient {} classified as {} ({} Gwei withdrawn)",
            slot,
            block.fee_recipient,
            status.as_str(),
            block.withdrawal_total()
        );

        let proposer = block
            .proposer_index()
            .map_err(RewardError::InvalidProposerIndex)?;
        let base_reward = self.base_reward(proposer).await?;

        let block_number = block
            .execution_block_number()
            .map_err(RewardError::InvalidBlockNumber)?;
        let execution_block = self
            .execution
            .get_block_by_number(block_number)
            .await
            .map_err(RewardError::FetchExecutionBlock)?;

        let block_component = match status {
            BlockClassification::MevRelay => calculator::proposer_payment(&execution_block)
                .map_err(RewardError::ProposerPayment)?,
            BlockClassification::Vanilla => calculator::transaction_fees(&execution_block)
                .map_err(RewardError::TransactionFees)?,
        };
        debug!(
            "Slot {}: base reward {} Gwei, block component {} Wei",
            slot, base_reward, block_component
        );

        let total = calculator::total_reward_gwei(base_reward, block_component)
            .map_err(RewardError::Combine)?;

        Ok(BlockReward {
            status,
            reward: calculator::format_reward(total),
        })
    }

    async fn base_reward(&self, proposer: ValidatorIndex) -> Result<f64, RewardError> {
        let effective_balance = self
            .beacon
            .get_effective_balance(proposer)
            .await
            .map_err(RewardError::ValidatorBalance)?;

        let total_stake = self
            .beacon
            .get_total_effective_balance()
            .await
            .map_err(RewardError::TotalStake)?;

        calculator::base_reward(effective_balance, total_stake).map_err(RewardError::BaseReward)
    }
}
