//! Block and transaction records as returned by `eth_getBlockByNumber`.
//!
//! Every numeric field stays a `0x`-prefixed hex string exactly as the node
//! sent it. Fields that some clients omit default to empty rather than
//! failing the whole decode, and so do the fields a node reports as `null`
//! for a pending block.

use serde::{Deserialize, Deserializer, Serialize};

/// A block record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Block {
    #[serde(deserialize_with = "null_as_empty")]
    pub number: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub hash: String,
    pub parent_hash: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub nonce: String,
    pub sha3_uncles: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub logs_bloom: String,
    pub transactions_root: String,
    pub state_root: String,
    pub receipts_root: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub miner: String,
    pub difficulty: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub total_difficulty: String,
    pub extra_data: String,
    pub size: String,
    pub gas_limit: String,
    pub gas_used: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mix_hash: Option<String>,
    pub transactions: Vec<BlockTransaction>,
    pub uncles: Vec<String>,
}

/// An entry of a block's transaction list: a full object when the block was
/// requested with `includeTransactions = true`, otherwise just the hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransaction {
    Full(Box<Transaction>),
    Hash(String),
}

impl BlockTransaction {
    pub fn hash(&self) -> &str {
        match self {
            Self::Full(tx) => &tx.hash,
            Self::Hash(h) => h,
        }
    }
}

/// A transaction inside a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    #[serde(deserialize_with = "null_as_empty")]
    pub block_hash: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub block_number: String,
    pub from: String,
    pub gas: String,
    pub gas_price: String,
    pub hash: String,
    pub input: String,
    pub nonce: String,
    /// `None` for contract creation.
    pub to: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub transaction_index: String,
    pub value: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    pub v: String,
    pub r: String,
    pub s: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Parse a `0x`-prefixed hex quantity. Only used for observability; the
/// gateway itself never converts hex fields.
pub fn parse_hex_quantity(value: &str) -> Option<u64> {
    let digits = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X"))?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}
