//! Platform-facing request envelopes.
//!
//! Every envelope is `{request_id, chain_id, source, destination, fee?}`; the destination and fee
//! blocks are sum types tagged with the platform's `destination_type` / `fee_type` discriminators.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::chains::solana::SolInstruction;

pub const REQUEST_ID_PREFIX: &str = "coboweb3-";

/// Mint a fresh request id. Never reuse one across retries.
pub fn new_request_id() -> String {
    format!("{REQUEST_ID_PREFIX}{}", Uuid::new_v4())
}

/// The sending wallet/address identity block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// The wallet subtype as reported by the platform (e.g. `Org-Controlled`).
    pub source_type: String,
    pub wallet_id: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "destination_type")]
pub enum Destination {
    #[serde(rename = "EVM_Contract")]
    EvmContract {
        address: String,
        calldata: String,
        value: String,
    },
    #[serde(rename = "EVM_EIP_712_Signature")]
    EvmEip712Signature { structured_data: Value },
    #[serde(rename = "EVM_EIP_191_Signature")]
    EvmEip191Signature { message: String },
    #[serde(rename = "SOL_Contract")]
    SolContract { instructions: Vec<SolInstruction> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fee_type")]
pub enum Fee {
    #[serde(rename = "EVM_EIP_1559")]
    Eip1559 {
        token_id: String,
        max_fee_per_gas: String,
        max_priority_fee_per_gas: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gas_limit: Option<String>,
    },
    #[serde(rename = "EVM_Legacy")]
    Legacy {
        token_id: String,
        gas_price: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gas_limit: Option<String>,
    },
}

impl Fee {
    pub fn gas_limit(&self) -> Option<&str> {
        match self {
            Self::Eip1559 { gas_limit, .. } | Self::Legacy { gas_limit, .. } => gas_limit.as_deref(),
        }
    }

    pub fn token_id(&self) -> &str {
        match self {
            Self::Eip1559 { token_id, .. } | Self::Legacy { token_id, .. } => token_id,
        }
    }
}

/// Contract-call submission (EVM or Solana).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractCallParams {
    pub request_id: String,
    pub chain_id: String,
    pub source: Source,
    pub destination: Destination,
    /// Absent means "let the platform estimate", not "zero fee".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,
}

/// Message-signature request (EIP-712 typed data or EIP-191 personal message).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSignParams {
    pub request_id: String,
    pub chain_id: String,
    pub source: Source,
    pub destination: Destination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    ContractCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateFeeParams {
    pub request_id: String,
    pub request_type: RequestType,
    pub chain_id: String,
    pub source: Source,
    pub destination: Destination,
}
