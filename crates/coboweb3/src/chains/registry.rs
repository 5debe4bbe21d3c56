use crate::errors::PortalError;

/// Platform chain tokens that identify Solana mainnet and testnet addresses.
pub const SOLANA_CHAIN_TOKENS: [&str; 2] = ["SOL", "TSOL"];

/// A single native EVM chain id and the platform token it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainEntry {
    pub chain_id: u64,
    pub token: &'static str,
    pub name: &'static str,
}

/// Every EVM chain the platform token table knows about. No heuristic fallback.
const CHAIN_TABLE: &[ChainEntry] = &[
    ChainEntry {
        chain_id: 1,
        token: "ETH",
        name: "Ethereum",
    },
    ChainEntry {
        chain_id: 42161,
        token: "ARBITRUM_ETH",
        name: "Arbitrum One",
    },
    ChainEntry {
        chain_id: 56,
        token: "BSC_BNB",
        name: "BNB Smart Chain",
    },
    ChainEntry {
        chain_id: 8453,
        token: "BASE_ETH",
        name: "Base",
    },
    ChainEntry {
        chain_id: 43114,
        token: "AVAXC",
        name: "Avalanche C-Chain",
    },
    ChainEntry {
        chain_id: 11_155_111,
        token: "SETH",
        name: "Sepolia",
    },
    ChainEntry {
        chain_id: 137,
        token: "MATIC",
        name: "Polygon",
    },
    ChainEntry {
        chain_id: 10,
        token: "OPTIMISM_ETH",
        name: "Optimism",
    },
];

pub const fn entries() -> &'static [ChainEntry] {
    CHAIN_TABLE
}

/// Map a native chain id to the platform chain token.
pub fn lookup(chain_id: u64) -> Result<&'static str, PortalError> {
    CHAIN_TABLE
        .iter()
        .find(|e| e.chain_id == chain_id)
        .map(|e| e.token)
        .ok_or(PortalError::UnknownChainId(chain_id))
}

/// Reverse lookup: the native chain id behind a platform token, if it is an EVM chain we know.
pub fn native_chain_id(token: &str) -> Option<u64> {
    CHAIN_TABLE
        .iter()
        .find(|e| e.token == token)
        .map(|e| e.chain_id)
}

/// An explicit native chain id wins; otherwise the address record's own token is used as-is.
pub fn resolve(explicit: Option<u64>, fallback_token: &str) -> Result<String, PortalError> {
    match explicit {
        Some(id) => lookup(id).map(str::to_owned),
        None => Ok(fallback_token.to_owned()),
    }
}
