//! Typed client for a custodial multi-chain wallet platform.
//!
//! Wallets are fetched through [`PortalClient`], each address is classified once into a chain
//! family, and EVM or Solana operations are turned into the platform's request envelopes before
//! anything goes over the wire.

#![expect(
    clippy::multiple_crate_versions,
    reason = "transitive dependency duplication"
)]

pub mod amount;
pub mod chains;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod errors;
pub mod paths;
pub mod platform;
pub mod portal;
pub mod store;
pub mod wallet;

pub use dispatch::ChainFamily;
pub use errors::{ErrorReport, PortalError};
pub use platform::{PlatformClient, PlatformError};
pub use portal::{PortalClient, SubmittedCall};
pub use wallet::{AddressWallet, EvmAddressWallet, SolanaAddressWallet, Wallet};
