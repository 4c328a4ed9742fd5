//! Execution block records.
//!
//! Decoding is tolerant: fields the reward arithmetic does not use are
//! ignored and the fee fields are optional, so legacy and fee-market
//! transactions decode into the same record. Values stay as raw hex
//! quantities until the arithmetic asks for them.

use serde::Deserialize;

use crate::quantity::{hex_to_u64, HexError};

/// Execution block as returned by `eth_getBlockByNumber` with full transactions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionBlock {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub base_fee_per_gas: Option<String>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// A transaction, reduced to its fee fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub gas_price: Option<String>,
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<String>,
    /// Gas limit of the transaction; used as the gas figure in reward arithmetic.
    #[serde(default)]
    pub gas: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl ExecutionBlock {
    /// Base fee per gas; `None` when the field is absent or empty (pre-London blocks).
    pub fn base_fee_per_gas(&self) -> Option<Result<u64, HexError>> {
        present(&self.base_fee_per_gas).map(hex_to_u64)
    }
}

impl Transaction {
    pub fn gas_price(&self) -> Option<Result<u64, HexError>> {
        present(&self.gas_price).map(hex_to_u64)
    }

    pub fn max_priority_fee_per_gas(&self) -> Option<Result<u64, HexError>> {
        present(&self.max_priority_fee_per_gas).map(hex_to_u64)
    }

    pub fn gas(&self) -> Option<Result<u64, HexError>> {
        present(&self.gas).map(hex_to_u64)
    }
}
