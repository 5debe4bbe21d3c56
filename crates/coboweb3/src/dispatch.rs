use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chains::registry::SOLANA_CHAIN_TOKENS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Address and balance operations only.
    Generic,
    Evm,
    Solana,
}

impl ChainFamily {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Evm => "evm",
            Self::Solana => "solana",
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `0x` followed by 40 hex characters. Only the prefix is checked.
fn looks_like_evm_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .and_then(|rest| rest.as_bytes().get(..40))
        .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
}

/// Classify an address record by its address shape, then its chain token. First match wins.
pub fn classify(address: &str, chain_token: &str) -> ChainFamily {
    if looks_like_evm_address(address) {
        return ChainFamily::Evm;
    }
    if SOLANA_CHAIN_TOKENS.contains(&chain_token) {
        return ChainFamily::Solana;
    }
    ChainFamily::Generic
}
