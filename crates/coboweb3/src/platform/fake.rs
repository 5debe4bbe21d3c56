use serde_json::{json, Value};
use std::sync::{Mutex, PoisonError};

use super::{
    AddressRecord, BalanceRecord, PlatformClient, PlatformError, SubmitResult, TransactionRecord,
    WalletRecord, SUBMITTED_STATUS,
};
use crate::envelope::{ContractCallParams, EstimateFeeParams, MessageSignParams};

pub const MPC_WALLET_ID: &str = "w-mpc";
pub const CUSTODIAL_WALLET_ID: &str = "w-custodial";

/// In-memory platform that records every request it sees.
#[derive(Debug, Default)]
pub struct FakePlatform {
    wallets: Vec<WalletRecord>,
    addresses: Vec<(String, AddressRecord)>,
    submit_status: String,
    calls: Mutex<usize>,
    contract_calls: Mutex<Vec<ContractCallParams>>,
    sign_calls: Mutex<Vec<MessageSignParams>>,
}

fn wallet(id: &str, wallet_type: &str, subtype: &str) -> WalletRecord {
    WalletRecord {
        wallet_id: id.to_owned(),
        name: format!("{wallet_type} wallet"),
        wallet_type: wallet_type.to_owned(),
        wallet_subtype: subtype.to_owned(),
    }
}

fn address(wallet_id: &str, address: &str, chain: &str) -> (String, AddressRecord) {
    (
        wallet_id.to_owned(),
        AddressRecord {
            address: address.to_owned(),
            chain_id: chain.to_owned(),
        },
    )
}

fn not_found(what: &str) -> PlatformError {
    PlatformError::Status {
        status: 404,
        body: format!("{what} not found"),
    }
}

impl FakePlatform {
    /// An MPC wallet holding an EVM, a Solana and a BTC address, and a custodial wallet
    /// holding the same EVM address.
    pub fn seeded() -> Self {
        let evm = "0xF0109fC8DF283027b6285cc889F5aA624EaC1F55";
        Self {
            wallets: vec![
                wallet(MPC_WALLET_ID, "MPC", "Org-Controlled"),
                wallet(CUSTODIAL_WALLET_ID, "Custodial", "Asset"),
            ],
            addresses: vec![
                address(MPC_WALLET_ID, evm, "ETH"),
                address(
                    MPC_WALLET_ID,
                    "E4MhQWiqCLER3fFZNf8LyQFpLWW3BRxtsR5eps3c3vNS",
                    "SOL",
                ),
                address(
                    MPC_WALLET_ID,
                    "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq",
                    "BTC",
                ),
                address(CUSTODIAL_WALLET_ID, evm, "ETH"),
            ],
            submit_status: SUBMITTED_STATUS.to_owned(),
            ..Self::default()
        }
    }

    pub fn with_submit_status(mut self, status: &str) -> Self {
        status.clone_into(&mut self.submit_status);
        self
    }

    /// Total platform requests so far.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contract_calls(&self) -> Vec<ContractCallParams> {
        self.contract_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sign_calls(&self) -> Vec<MessageSignParams> {
        self.sign_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn hit(&self) {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn result(&self, request_id: &str, status: &str) -> SubmitResult {
        SubmitResult {
            request_id: request_id.to_owned(),
            transaction_id: format!("tx-{}", self.calls()),
            status: status.to_owned(),
        }
    }
}

impl PlatformClient for FakePlatform {
    async fn list_enabled_tokens(&self) -> Result<Vec<Value>, PlatformError> {
        self.hit();
        Ok(vec![json!({"token_id": "ETH", "chain_id": "ETH"})])
    }

    async fn list_enabled_chains(&self) -> Result<Vec<Value>, PlatformError> {
        self.hit();
        Ok(vec![json!({"chain_id": "ETH"}), json!({"chain_id": "SOL"})])
    }

    async fn list_wallets(&self) -> Result<Vec<WalletRecord>, PlatformError> {
        self.hit();
        Ok(self.wallets.clone())
    }

    async fn get_wallet_by_id(&self, wallet_id: &str) -> Result<WalletRecord, PlatformError> {
        self.hit();
        self.wallets
            .iter()
            .find(|w| w.wallet_id == wallet_id)
            .cloned()
            .ok_or_else(|| not_found("wallet"))
    }

    async fn list_addresses(&self, wallet_id: &str) -> Result<Vec<AddressRecord>, PlatformError> {
        self.hit();
        Ok(self
            .addresses
            .iter()
            .filter(|(w, _)| w == wallet_id)
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn list_token_balances(
        &self,
        _wallet_id: &str,
        address: &str,
    ) -> Result<Vec<BalanceRecord>, PlatformError> {
        self.hit();
        let token = self
            .addresses
            .iter()
            .find(|(_, a)| a.address == address)
            .map(|(_, a)| a.chain_id.clone())
            .ok_or_else(|| not_found("address"))?;
        Ok(vec![BalanceRecord {
            token_id: token,
            balance: json!({"total": "1.5", "available": "1.5"}),
        }])
    }

    async fn submit_contract_call(
        &self,
        params: &ContractCallParams,
    ) -> Result<SubmitResult, PlatformError> {
        self.hit();
        self.contract_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(params.clone());
        Ok(self.result(&params.request_id, &self.submit_status))
    }

    async fn estimate_fee(&self, params: &EstimateFeeParams) -> Result<Value, PlatformError> {
        self.hit();
        Ok(json!({
            "fee_type": "EVM_EIP_1559",
            "token_id": params.chain_id,
            "recommended": {"max_fee_per_gas": "30000000000", "max_priority_fee_per_gas": "1000000000", "gas_limit": "21000"},
        }))
    }

    async fn get_transaction_by_id(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionRecord, PlatformError> {
        self.hit();
        Ok(TransactionRecord {
            transaction_id: transaction_id.to_owned(),
            request_id: None,
            status: "Completed".to_owned(),
            extra: serde_json::Map::new(),
        })
    }

    async fn submit_message_sign(
        &self,
        params: &MessageSignParams,
    ) -> Result<SubmitResult, PlatformError> {
        self.hit();
        self.sign_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(params.clone());
        Ok(self.result(&params.request_id, SUBMITTED_STATUS))
    }
}
