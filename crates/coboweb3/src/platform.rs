//! The remote platform as seen by the core: a narrow async interface plus the handful of
//! response fields the core actually reads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use thiserror::Error;

use crate::envelope::{ContractCallParams, EstimateFeeParams, MessageSignParams};

#[cfg(test)]
pub(crate) mod fake;
pub mod http;

/// Status the platform reports for an accepted contract call.
pub const SUBMITTED_STATUS: &str = "Submitted";

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("platform returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decode platform response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("platform client config: {0}")]
    Config(String),
}

impl PlatformError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "platform_http",
            Self::Status { .. } => "platform_status",
            Self::Decode(_) => "platform_decode",
            Self::Config(_) => "platform_config",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub wallet_id: String,
    pub name: String,
    /// e.g. `MPC`, `Custodial`.
    pub wallet_type: String,
    /// e.g. `Org-Controlled`; doubles as the envelope `source_type`.
    pub wallet_subtype: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub address: String,
    /// Platform chain token (e.g. `ETH`, `SOL`).
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub token_id: String,
    #[serde(default)]
    pub balance: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    pub request_id: String,
    #[serde(default)]
    pub transaction_id: String,
    pub status: String,
}

impl SubmitResult {
    pub fn is_submitted(&self) -> bool {
        self.status == SUBMITTED_STATUS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Transport, authentication and decoding live behind this trait; the core adds no retries.
pub trait PlatformClient {
    fn list_enabled_tokens(&self) -> impl Future<Output = Result<Vec<Value>, PlatformError>> + Send;

    fn list_enabled_chains(&self) -> impl Future<Output = Result<Vec<Value>, PlatformError>> + Send;

    fn list_wallets(&self)
        -> impl Future<Output = Result<Vec<WalletRecord>, PlatformError>> + Send;

    fn get_wallet_by_id(
        &self,
        wallet_id: &str,
    ) -> impl Future<Output = Result<WalletRecord, PlatformError>> + Send;

    fn list_addresses(
        &self,
        wallet_id: &str,
    ) -> impl Future<Output = Result<Vec<AddressRecord>, PlatformError>> + Send;

    fn list_token_balances(
        &self,
        wallet_id: &str,
        address: &str,
    ) -> impl Future<Output = Result<Vec<BalanceRecord>, PlatformError>> + Send;

    fn submit_contract_call(
        &self,
        params: &ContractCallParams,
    ) -> impl Future<Output = Result<SubmitResult, PlatformError>> + Send;

    fn estimate_fee(
        &self,
        params: &EstimateFeeParams,
    ) -> impl Future<Output = Result<Value, PlatformError>> + Send;

    fn get_transaction_by_id(
        &self,
        transaction_id: &str,
    ) -> impl Future<Output = Result<TransactionRecord, PlatformError>> + Send;

    fn submit_message_sign(
        &self,
        params: &MessageSignParams,
    ) -> impl Future<Output = Result<SubmitResult, PlatformError>> + Send;
}
