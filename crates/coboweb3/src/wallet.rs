use serde::Serialize;
use serde_json::Value;
use std::{fmt, sync::Arc};

use crate::chains::{
    evm::{self, EvmTransaction},
    solana::{self, SolInstruction},
};
use crate::dispatch::{classify, ChainFamily};
use crate::envelope::{ContractCallParams, EstimateFeeParams, MessageSignParams, Source};
use crate::errors::PortalError;
use crate::platform::{AddressRecord, BalanceRecord, PlatformClient, SubmitResult, WalletRecord};
use crate::portal::PortalClient;

/// The custodial wallet type that may send and sign.
pub const MPC_WALLET_TYPE: &str = "MPC";

/// A snapshot of a platform wallet at fetch time. Never refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wallet {
    pub id: String,
    pub name: String,
    pub wallet_type: String,
    pub wallet_subtype: String,
}

impl From<WalletRecord> for Wallet {
    fn from(r: WalletRecord) -> Self {
        Self {
            id: r.wallet_id,
            name: r.name,
            wallet_type: r.wallet_type,
            wallet_subtype: r.wallet_subtype,
        }
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} ({}, {}, {})>",
            self.name, self.wallet_type, self.wallet_subtype, self.id
        )
    }
}

impl Wallet {
    pub fn is_mpc(&self) -> bool {
        self.wallet_type == MPC_WALLET_TYPE
    }

    fn ensure_mpc(&self) -> Result<(), PortalError> {
        if self.is_mpc() {
            Ok(())
        } else {
            Err(PortalError::UnsupportedWalletType(self.wallet_type.clone()))
        }
    }
}

/// One (wallet, address, chain token) triple.
#[derive(Debug, Clone)]
pub struct AddressInfo {
    wallet: Arc<Wallet>,
    address: String,
    chain_token: String,
}

impl AddressInfo {
    pub fn new(wallet: Arc<Wallet>, record: AddressRecord) -> Self {
        Self {
            wallet,
            address: record.address,
            chain_token: record.chain_id,
        }
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn chain_token(&self) -> &str {
        &self.chain_token
    }

    pub fn source(&self) -> Source {
        Source {
            source_type: self.wallet.wallet_subtype.clone(),
            wallet_id: self.wallet.id.clone(),
            address: self.address.clone(),
        }
    }

    pub async fn balances<P: PlatformClient>(
        &self,
        portal: &PortalClient<P>,
    ) -> Result<Vec<BalanceRecord>, PortalError> {
        portal
            .list_token_balances(&self.wallet.id, &self.address)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct EvmAddressWallet(AddressInfo);

impl EvmAddressWallet {
    pub const fn info(&self) -> &AddressInfo {
        &self.0
    }

    /// Validate and build the contract-call envelope without submitting it.
    pub fn build_transaction(&self, tx: &EvmTransaction) -> Result<ContractCallParams, PortalError> {
        self.0.wallet.ensure_mpc()?;
        evm::contract_call(self.0.source(), &self.0.chain_token, tx)
    }

    pub async fn send_transaction<P: PlatformClient>(
        &self,
        portal: &mut PortalClient<P>,
        tx: &EvmTransaction,
    ) -> Result<SubmitResult, PortalError> {
        let params = self.build_transaction(tx)?;
        portal.submit_contract_call(params).await
    }

    pub fn build_typed_data_sign(&self, typed_data: Value) -> Result<MessageSignParams, PortalError> {
        self.0.wallet.ensure_mpc()?;
        Ok(evm::typed_data_sign(
            self.0.source(),
            &self.0.chain_token,
            typed_data,
        ))
    }

    pub async fn sign_typed_data<P: PlatformClient>(
        &self,
        portal: &PortalClient<P>,
        typed_data: Value,
    ) -> Result<SubmitResult, PortalError> {
        let params = self.build_typed_data_sign(typed_data)?;
        portal.sign_message(&params).await
    }

    /// Text callers pass `&str`; raw callers pass bytes.
    pub fn build_personal_sign(&self, message: &[u8]) -> Result<MessageSignParams, PortalError> {
        self.0.wallet.ensure_mpc()?;
        Ok(evm::personal_sign(
            self.0.source(),
            &self.0.chain_token,
            message,
        ))
    }

    pub async fn personal_sign<P: PlatformClient>(
        &self,
        portal: &PortalClient<P>,
        message: &[u8],
    ) -> Result<SubmitResult, PortalError> {
        let params = self.build_personal_sign(message)?;
        portal.sign_message(&params).await
    }

    /// Fee estimation needs no MPC wallet.
    pub fn build_estimate_fee(&self, tx: &EvmTransaction) -> Result<EstimateFeeParams, PortalError> {
        evm::estimate_fee_params(self.0.source(), &self.0.chain_token, tx)
    }

    pub async fn estimate_fee<P: PlatformClient>(
        &self,
        portal: &PortalClient<P>,
        tx: &EvmTransaction,
    ) -> Result<Value, PortalError> {
        let params = self.build_estimate_fee(tx)?;
        portal.estimate_fee(&params).await
    }
}

#[derive(Debug, Clone)]
pub struct SolanaAddressWallet(AddressInfo);

impl SolanaAddressWallet {
    pub const fn info(&self) -> &AddressInfo {
        &self.0
    }

    pub fn build_transaction(
        &self,
        instructions: &[SolInstruction],
    ) -> Result<ContractCallParams, PortalError> {
        self.0.wallet.ensure_mpc()?;
        Ok(solana::contract_call(
            self.0.source(),
            &self.0.chain_token,
            instructions,
        ))
    }

    pub async fn send_transaction<P: PlatformClient>(
        &self,
        portal: &mut PortalClient<P>,
        instructions: &[SolInstruction],
    ) -> Result<SubmitResult, PortalError> {
        let params = self.build_transaction(instructions)?;
        portal.submit_contract_call(params).await
    }
}

/// An address of a wallet, tagged with its chain family once at construction.
#[derive(Debug, Clone)]
pub enum AddressWallet {
    Generic(AddressInfo),
    Evm(EvmAddressWallet),
    Solana(SolanaAddressWallet),
}

impl AddressWallet {
    pub fn new(wallet: Arc<Wallet>, record: AddressRecord) -> Self {
        let family = classify(&record.address, &record.chain_id);
        let info = AddressInfo::new(wallet, record);
        match family {
            ChainFamily::Evm => Self::Evm(EvmAddressWallet(info)),
            ChainFamily::Solana => Self::Solana(SolanaAddressWallet(info)),
            ChainFamily::Generic => Self::Generic(info),
        }
    }

    pub const fn family(&self) -> ChainFamily {
        match self {
            Self::Generic(_) => ChainFamily::Generic,
            Self::Evm(_) => ChainFamily::Evm,
            Self::Solana(_) => ChainFamily::Solana,
        }
    }

    pub const fn info(&self) -> &AddressInfo {
        match self {
            Self::Generic(info) => info,
            Self::Evm(w) => w.info(),
            Self::Solana(w) => w.info(),
        }
    }

    pub fn address(&self) -> &str {
        self.info().address()
    }

    pub fn as_evm(&self, operation: &'static str) -> Result<&EvmAddressWallet, PortalError> {
        match self {
            Self::Evm(w) => Ok(w),
            Self::Generic(_) | Self::Solana(_) => Err(PortalError::UnsupportedOperation {
                operation,
                family: self.family(),
            }),
        }
    }

    pub fn as_solana(&self, operation: &'static str) -> Result<&SolanaAddressWallet, PortalError> {
        match self {
            Self::Solana(w) => Ok(w),
            Self::Generic(_) | Self::Evm(_) => Err(PortalError::UnsupportedOperation {
                operation,
                family: self.family(),
            }),
        }
    }

    pub async fn balances<P: PlatformClient>(
        &self,
        portal: &PortalClient<P>,
    ) -> Result<Vec<BalanceRecord>, PortalError> {
        self.info().balances(portal).await
    }

    pub async fn send_evm_transaction<P: PlatformClient>(
        &self,
        portal: &mut PortalClient<P>,
        tx: &EvmTransaction,
    ) -> Result<SubmitResult, PortalError> {
        self.as_evm("send_evm_transaction")?
            .send_transaction(portal, tx)
            .await
    }

    pub async fn send_solana_transaction<P: PlatformClient>(
        &self,
        portal: &mut PortalClient<P>,
        instructions: &[SolInstruction],
    ) -> Result<SubmitResult, PortalError> {
        self.as_solana("send_solana_transaction")?
            .send_transaction(portal, instructions)
            .await
    }

    pub async fn sign_typed_data<P: PlatformClient>(
        &self,
        portal: &PortalClient<P>,
        typed_data: Value,
    ) -> Result<SubmitResult, PortalError> {
        self.as_evm("sign_typed_data")?
            .sign_typed_data(portal, typed_data)
            .await
    }

    pub async fn personal_sign<P: PlatformClient>(
        &self,
        portal: &PortalClient<P>,
        message: &[u8],
    ) -> Result<SubmitResult, PortalError> {
        self.as_evm("personal_sign")?
            .personal_sign(portal, message)
            .await
    }

    pub async fn estimate_fee<P: PlatformClient>(
        &self,
        portal: &PortalClient<P>,
        tx: &EvmTransaction,
    ) -> Result<Value, PortalError> {
        self.as_evm("estimate_fee")?.estimate_fee(portal, tx).await
    }
}

impl fmt::Display for AddressWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}>", self.family(), self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wallet(wallet_type: &str) -> Arc<Wallet> {
        Arc::new(Wallet {
            id: "w-1".into(),
            name: "ops".into(),
            wallet_type: wallet_type.into(),
            wallet_subtype: "Org-Controlled".into(),
        })
    }

    fn record(address: &str, chain: &str) -> AddressRecord {
        AddressRecord {
            address: address.into(),
            chain_id: chain.into(),
        }
    }

    #[test]
    fn family_is_fixed_at_construction() {
        let w = wallet("MPC");
        let evm = AddressWallet::new(
            Arc::clone(&w),
            record("0xF0109fC8DF283027b6285cc889F5aA624EaC1F55", "ETH"),
        );
        let sol = AddressWallet::new(
            Arc::clone(&w),
            record("E4MhQWiqCLER3fFZNf8LyQFpLWW3BRxtsR5eps3c3vNS", "SOL"),
        );
        let btc = AddressWallet::new(w, record("bc1qxyz", "BTC"));
        assert_eq!(evm.family(), ChainFamily::Evm);
        assert_eq!(sol.family(), ChainFamily::Solana);
        assert_eq!(btc.family(), ChainFamily::Generic);
        assert_eq!(btc.to_string(), "<generic bc1qxyz>");
    }

    #[test]
    fn source_uses_wallet_subtype() {
        let info = AddressInfo::new(wallet("MPC"), record("0xabc", "ETH"));
        assert_eq!(
            info.source(),
            Source {
                source_type: "Org-Controlled".into(),
                wallet_id: "w-1".into(),
                address: "0xabc".into(),
            }
        );
    }

    #[test]
    fn generic_address_rejects_chain_operations() {
        let btc = AddressWallet::new(wallet("MPC"), record("bc1qxyz", "BTC"));
        assert!(matches!(
            btc.as_evm("personal_sign"),
            Err(PortalError::UnsupportedOperation {
                operation: "personal_sign",
                family: ChainFamily::Generic
            })
        ));
        assert!(matches!(
            btc.as_solana("send_solana_transaction"),
            Err(PortalError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn non_mpc_wallet_cannot_build_sends_or_signatures() -> eyre::Result<()> {
        let aw = AddressWallet::new(
            wallet("Custodial"),
            record("0xF0109fC8DF283027b6285cc889F5aA624EaC1F55", "ETH"),
        );
        let evm = aw.as_evm("test")?;
        let tx: EvmTransaction = serde_json::from_value(json!({"to": "0x01", "value": "1"}))?;
        assert!(matches!(
            evm.build_transaction(&tx),
            Err(PortalError::UnsupportedWalletType(t)) if t == "Custodial"
        ));
        assert!(matches!(
            evm.build_personal_sign(b"hi"),
            Err(PortalError::UnsupportedWalletType(_))
        ));
        assert!(evm.build_estimate_fee(&tx).is_ok());
        Ok(())
    }

    #[test]
    fn wallet_display_matches_summary_format() {
        assert_eq!(
            wallet("MPC").to_string(),
            "<ops (MPC, Org-Controlled, w-1)>"
        );
    }
}
