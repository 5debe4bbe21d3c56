//! Chain-family request builders and the native chain id table.

pub mod evm;
pub mod registry;
pub mod solana;
