//! Reward arithmetic.
//!
//! The base reward is the simplified issuance approximation
//! `BASE_REWARD_FACTOR * min(effective_balance, MAX_EFFECTIVE_BALANCE) / sqrt(total_stake)`,
//! computed in Gwei as an `f64`. The block component (MEV payment or tips)
//! is exact integer Wei. [`total_reward_gwei`] adds the two and divides the
//! sum by 1e9; the base reward is therefore scaled down a second time.
//! Published reward figures depend on this combination, so it is kept as is.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use validator_api_beacon::Gwei;
use validator_api_execution::{ExecutionBlock, HexError};

pub const BASE_REWARD_FACTOR: u64 = 64;
pub const MAX_EFFECTIVE_BALANCE_GWEI: Gwei = 32_000_000_000;
pub const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Decimal places in a formatted reward.
pub const REWARD_DECIMALS: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum CalculationError {
    #[error("failed to parse {field}: {source}")]
    Hex {
        field: &'static str,
        #[source]
        source: HexError,
    },
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("total network stake is zero")]
    EmptyValidatorSet,
    #[error("reward arithmetic overflowed")]
    Overflow,
}

fn parsed(field: &'static str, value: Result<u64, HexError>) -> Result<i128, CalculationError> {
    value
        .map(i128::from)
        .map_err(|source| CalculationError::Hex { field, source })
}

/// Base issuance reward in Gwei for a validator.
///
/// The effective balance is clamped to [`MAX_EFFECTIVE_BALANCE_GWEI`].
pub fn base_reward(effective_balance: Gwei, total_stake: Gwei) -> Result<f64, CalculationError> {
    if total_stake == 0 {
        return Err(CalculationError::EmptyValidatorSet);
    }

    let balance = effective_balance.min(MAX_EFFECTIVE_BALANCE_GWEI);
    Ok((BASE_REWARD_FACTOR as f64 * balance as f64) / (total_stake as f64).sqrt())
}

/// MEV payment in Wei: `maxPriorityFeePerGas * gas` over fee-market transactions.
///
/// Transactions without a priority fee, or without a gas figure, are left out
/// of the sum entirely.
pub fn proposer_payment(block: &ExecutionBlock) -> Result<i128, CalculationError> {
    let mut payment: i128 = 0;

    for tx in &block.transactions {
        let Some(priority_fee) = tx.max_priority_fee_per_gas() else {
            continue;
        };
        let priority_fee = parsed("maxPriorityFeePerGas", priority_fee)?;

        let Some(gas) = tx.gas() else {
            continue;
        };
        let gas = parsed("gas", gas)?;

        payment = priority_fee
            .checked_mul(gas)
            .and_then(|p| payment.checked_add(p))
            .ok_or(CalculationError::Overflow)?;
    }

    Ok(payment)
}

/// Tip total in Wei: `(gasPrice - baseFeePerGas) * gas` over every transaction.
///
/// Tips below the base fee are negative and are summed as such, so the
/// total may be negative.
pub fn transaction_fees(block: &ExecutionBlock) -> Result<i128, CalculationError> {
    let base_fee = block
        .base_fee_per_gas()
        .ok_or(CalculationError::MissingField("baseFeePerGas"))?;
    let base_fee = parsed("baseFeePerGas", base_fee)?;

    let mut total: i128 = 0;

    for tx in &block.transactions {
        let gas = tx.gas().ok_or(CalculationError::MissingField("gas"))?;
        let gas = parsed("gas", gas)?;

        let gas_price = tx.gas_price().ok_or(CalculationError::MissingField("gasPrice"))?;
        let gas_price = parsed("gasPrice", gas_price)?;

        let tip = gas_price - base_fee;
        total = tip
            .checked_mul(gas)
            .and_then(|fee| total.checked_add(fee))
            .ok_or(CalculationError::Overflow)?;
    }

    Ok(total)
}

/// `(base_reward + block_component_wei) / 1e9`, rounded half-to-even to
/// [`REWARD_DECIMALS`] places.
pub fn total_reward_gwei(base_reward: f64, block_component_wei: i128) -> Result<Decimal, CalculationError> {
    let base = Decimal::from_f64(base_reward).ok_or(CalculationError::Overflow)?;
    let component = Decimal::try_from_i128_with_scale(block_component_wei, 0)
        .map_err(|_| CalculationError::Overflow)?;

    base.checked_add(component)
        .and_then(|sum| sum.checked_div(Decimal::from(WEI_PER_GWEI)))
        .map(|gwei| gwei.round_dp_with_strategy(REWARD_DECIMALS, RoundingStrategy::MidpointNearestEven))
        .ok_or(CalculationError::Overflow)
}

/// Render a reward with exactly [`REWARD_DECIMALS`] decimal digits.
pub fn format_reward(reward: Decimal) -> String {
    let rounded = reward.round_dp_with_strategy(REWARD_DECIMALS, RoundingStrategy::MidpointNearestEven);
    format!("{:.3}", rounded)
}
