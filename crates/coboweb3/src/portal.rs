use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{Environment, PortalConfig};
use crate::envelope::{ContractCallParams, EstimateFeeParams, MessageSignParams};
use crate::errors::PortalError;
use crate::platform::{
    http::HttpPlatform, AddressRecord, BalanceRecord, PlatformClient, SubmitResult,
    TransactionRecord,
};
use crate::wallet::{AddressWallet, Wallet};

/// One accepted contract call, kept for the current session only.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedCall {
    /// Environment the call was sent to.
    pub environment: Environment,
    pub envelope: ContractCallParams,
    pub result: SubmitResult,
    pub submitted_at: String,
}

/// Facade over the platform: wraps raw records into entity types and keeps the session's
/// submitted-call log.
///
/// Submitting takes `&mut self`; sharing one client across tasks needs the caller's own lock.
#[derive(Debug)]
pub struct PortalClient<P> {
    environment: Environment,
    platform: P,
    submitted: Vec<SubmittedCall>,
}

impl PortalClient<HttpPlatform> {
    /// Build an HTTP-backed client. The key is handed to the request signer and not kept here.
    pub fn connect(cfg: &PortalConfig, api_private_key: &SecretString) -> Result<Self, PortalError> {
        let platform = HttpPlatform::new(cfg.effective_base_url(), api_private_key, &cfg.http)?;
        info!(
            environment = cfg.environment.as_str(),
            base_url = cfg.effective_base_url(),
            "portal client ready"
        );
        Ok(Self::with_platform(cfg.environment, platform))
    }
}

impl<P: PlatformClient> PortalClient<P> {
    pub const fn with_platform(environment: Environment, platform: P) -> Self {
        Self {
            environment,
            platform,
            submitted: Vec::new(),
        }
    }

    pub const fn platform(&self) -> &P {
        &self.platform
    }

    pub async fn list_enabled_tokens(&self) -> Result<Vec<Value>, PortalError> {
        Ok(self.platform.list_enabled_tokens().await?)
    }

    pub async fn list_enabled_chains(&self) -> Result<Vec<Value>, PortalError> {
        Ok(self.platform.list_enabled_chains().await?)
    }

    pub async fn list_wallets(&self) -> Result<Vec<Arc<Wallet>>, PortalError> {
        let records = self.platform.list_wallets().await?;
        Ok(records
            .into_iter()
            .map(|r| Arc::new(Wallet::from(r)))
            .collect())
    }

    pub async fn get_wallet(&self, wallet_id: &str) -> Result<Arc<Wallet>, PortalError> {
        let record = self.platform.get_wallet_by_id(wallet_id).await?;
        Ok(Arc::new(Wallet::from(record)))
    }

    pub async fn list_addresses(&self, wallet_id: &str) -> Result<Vec<AddressRecord>, PortalError> {
        Ok(self.platform.list_addresses(wallet_id).await?)
    }

    pub async fn list_token_balances(
        &self,
        wallet_id: &str,
        address: &str,
    ) -> Result<Vec<BalanceRecord>, PortalError> {
        Ok(self
            .platform
            .list_token_balances(wallet_id, address)
            .await?)
    }

    /// Every address of `wallet`, each classified into its chain family.
    pub async fn address_wallets(
        &self,
        wallet: &Arc<Wallet>,
    ) -> Result<Vec<AddressWallet>, PortalError> {
        let records = self.list_addresses(&wallet.id).await?;
        Ok(records
            .into_iter()
            .map(|r| AddressWallet::new(Arc::clone(wallet), r))
            .collect())
    }

    pub async fn address_wallet(
        &self,
        wallet: &Arc<Wallet>,
        address: &str,
    ) -> Result<AddressWallet, PortalError> {
        self.address_wallets(wallet)
            .await?
            .into_iter()
            .find(|aw| aw.address() == address)
            .ok_or_else(|| PortalError::AddressNotFound {
                address: address.to_owned(),
                wallet_id: wallet.id.clone(),
            })
    }

    /// Submit a contract call. Only calls the platform reports as `Submitted` are accepted and
    /// logged; anything else is a `SubmissionRejected` carrying the status.
    pub async fn submit_contract_call(
        &mut self,
        params: ContractCallParams,
    ) -> Result<SubmitResult, PortalError> {
        info!(
            environment = self.environment.as_str(),
            request_id = %params.request_id,
            chain_id = %params.chain_id,
            wallet_id = %params.source.wallet_id,
            has_fee = params.fee.is_some(),
            "submitting contract call"
        );
        let result = self.platform.submit_contract_call(&params).await?;
        if !result.is_submitted() {
            warn!(
                request_id = %params.request_id,
                status = %result.status,
                "contract call rejected"
            );
            return Err(PortalError::SubmissionRejected {
                status: result.status,
            });
        }
        self.submitted.push(SubmittedCall {
            environment: self.environment,
            envelope: params,
            result: result.clone(),
            submitted_at: chrono::Utc::now().to_rfc3339(),
        });
        Ok(result)
    }

    /// Pass-through of the platform's estimate.
    pub async fn estimate_fee(&self, params: &EstimateFeeParams) -> Result<Value, PortalError> {
        debug!(chain_id = %params.chain_id, "estimating fee");
        Ok(self.platform.estimate_fee(params).await?)
    }

    pub async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionRecord, PortalError> {
        Ok(self.platform.get_transaction_by_id(transaction_id).await?)
    }

    pub async fn sign_message(&self, params: &MessageSignParams) -> Result<SubmitResult, PortalError> {
        info!(
            request_id = %params.request_id,
            chain_id = %params.chain_id,
            "submitting message sign"
        );
        Ok(self.platform.submit_message_sign(params).await?)
    }

    /// Contract calls accepted during this session, oldest first.
    pub fn submitted_calls(&self) -> &[SubmittedCall] {
        &self.submitted
    }
}
