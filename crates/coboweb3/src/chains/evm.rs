use alloy::primitives::U256;
use base64::Engine as _;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::amount;
use crate::chains::registry;
use crate::envelope::{
    new_request_id, ContractCallParams, Destination, EstimateFeeParams, Fee, MessageSignParams,
    RequestType, Source,
};
use crate::errors::PortalError;

/// Transaction `type` marker for EIP-1559 transactions.
pub const EIP1559_TX_TYPE: u64 = 2;

/// A numeric transaction field, kept as the caller wrote it (decimal or `0x`-hex).
///
/// Accepts JSON strings and unsigned integers; always serializes as a string, which is what the
/// platform expects for fee and value fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quantity(String);

impl Quantity {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_u256(&self) -> eyre::Result<U256> {
        amount::parse_quantity_u256(&self.0)
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.to_u256().ok().and_then(|v| u64::try_from(v).ok())
    }
}

impl From<u64> for Quantity {
    fn from(v: u64) -> Self {
        Self(v.to_string())
    }
}

impl From<&str> for Quantity {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct QuantityVisitor;

impl de::Visitor<'_> for QuantityVisitor {
    type Value = Quantity;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer or a decimal/hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
        Ok(Quantity(v.to_string()))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Quantity, E> {
        Ok(Quantity(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
        u64::try_from(v)
            .map(Quantity::from)
            .map_err(|e| E::custom(format!("negative quantity {v}: {e}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Quantity, E> {
        Err(E::custom(format!(
            "quantity {v} is fractional or too large for a JSON number (max {}); pass it as a decimal or 0x string",
            u64::MAX
        )))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
        Ok(Quantity(v.trim().to_owned()))
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }
}

/// An EVM transaction as a dapp or library would describe it (`eth_sendTransaction` shape).
///
/// Every field is optional here; the builder decides which ones are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvmTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Quantity>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<Quantity>,
}

impl EvmTransaction {
    /// The explicit native chain id, if any. `0` counts as unset.
    pub fn native_chain_id(&self) -> Result<Option<u64>, PortalError> {
        let id = self
            .chain_id
            .as_ref()
            .map(|q| {
                q.to_u64()
                    .ok_or_else(|| PortalError::malformed(format!("invalid chainId: {q}")))
            })
            .transpose()?;
        Ok(id.filter(|&id| id != 0))
    }

    fn is_eip1559_type(&self) -> Result<bool, PortalError> {
        match &self.tx_type {
            None => Ok(false),
            Some(t) => t
                .to_u64()
                .map(|v| v == EIP1559_TX_TYPE)
                .ok_or_else(|| PortalError::malformed(format!("invalid type: {t}"))),
        }
    }

    fn to_address(&self) -> Result<&str, PortalError> {
        self.to
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PortalError::malformed("missing `to`"))
    }

    fn calldata(&self) -> String {
        self.data.clone().unwrap_or_default()
    }
}

/// Platform chain token for this transaction: explicit `chainId` through the registry, else the
/// address record's own token.
pub fn resolve_chain_token(tx: &EvmTransaction, fallback_token: &str) -> Result<String, PortalError> {
    registry::resolve(tx.native_chain_id()?, fallback_token)
}

/// `EVM_Contract` destination with the value scaled from wei to a decimal ether string.
pub fn contract_destination(tx: &EvmTransaction) -> Result<Destination, PortalError> {
    let address = tx.to_address()?.to_owned();
    let value = match &tx.value {
        Some(v) => amount::wei_to_ether_string(v.as_str())
            .map_err(|e| PortalError::malformed(format!("invalid value {v}: {e}")))?,
        None => "0".to_owned(),
    };
    Ok(Destination::EvmContract {
        address,
        calldata: tx.calldata(),
        value,
    })
}

/// `EVM_Contract` destination for fee estimation: the value stays in base units.
pub fn estimate_destination(tx: &EvmTransaction) -> Result<Destination, PortalError> {
    let address = tx.to_address()?.to_owned();
    let value = match &tx.value {
        Some(v) => v
            .to_u256()
            .map_err(|e| PortalError::malformed(format!("invalid value {v}: {e}")))?
            .to_string(),
        None => "0".to_owned(),
    };
    Ok(Destination::EvmContract {
        address,
        calldata: tx.calldata(),
        value,
    })
}

/// Check a fee field parses as an unsigned quantity. The wire value stays as the caller wrote it.
fn fee_quantity(field: &str, q: Option<&Quantity>) -> Result<Option<String>, PortalError> {
    q.map(|q| {
        q.to_u256()
            .map(|_| q.as_str().to_owned())
            .map_err(|e| PortalError::malformed(format!("invalid {field}: {q}: {e}")))
    })
    .transpose()
}

/// Infer the fee shape from the fee fields the caller supplied.
///
/// EIP-1559 fields win over `gasPrice` when both are present. `None` means the platform estimates.
pub fn fee(tx: &EvmTransaction, token_id: &str) -> Result<Option<Fee>, PortalError> {
    if tx.is_eip1559_type()? {
        if tx.max_fee_per_gas.is_none() {
            return Err(PortalError::malformed(
                "type 0x2 transaction is missing maxFeePerGas",
            ));
        }
        if tx.max_priority_fee_per_gas.is_none() {
            return Err(PortalError::malformed(
                "type 0x2 transaction is missing maxPriorityFeePerGas",
            ));
        }
    }

    let gas_limit = fee_quantity("gas", tx.gas.as_ref())?;
    let max_fee = fee_quantity("maxFeePerGas", tx.max_fee_per_gas.as_ref())?;
    let priority = fee_quantity("maxPriorityFeePerGas", tx.max_priority_fee_per_gas.as_ref())?;
    let gas_price = fee_quantity("gasPrice", tx.gas_price.as_ref())?;
    let fee = match (max_fee, priority, gas_price) {
        (Some(max_fee_per_gas), Some(max_priority_fee_per_gas), _) => Some(Fee::Eip1559 {
            token_id: token_id.to_owned(),
            max_fee_per_gas,
            max_priority_fee_per_gas,
            gas_limit,
        }),
        (_, _, Some(gas_price)) => Some(Fee::Legacy {
            token_id: token_id.to_owned(),
            gas_price,
            gas_limit,
        }),
        (_, _, None) => None,
    };
    Ok(fee)
}

/// Build the contract-call envelope for an EVM transaction.
pub fn contract_call(
    source: Source,
    fallback_token: &str,
    tx: &EvmTransaction,
) -> Result<ContractCallParams, PortalError> {
    let chain_id = resolve_chain_token(tx, fallback_token)?;
    let fee = fee(tx, &chain_id)?;
    let destination = contract_destination(tx)?;
    Ok(ContractCallParams {
        request_id: new_request_id(),
        chain_id,
        source,
        destination,
        fee,
    })
}

pub fn estimate_fee_params(
    source: Source,
    fallback_token: &str,
    tx: &EvmTransaction,
) -> Result<EstimateFeeParams, PortalError> {
    Ok(EstimateFeeParams {
        request_id: new_request_id(),
        request_type: RequestType::ContractCall,
        chain_id: resolve_chain_token(tx, fallback_token)?,
        source,
        destination: estimate_destination(tx)?,
    })
}

/// EIP-712 typed-data signature request. The typed data is passed through verbatim.
pub fn typed_data_sign(source: Source, chain_token: &str, typed_data: Value) -> MessageSignParams {
    MessageSignParams {
        request_id: new_request_id(),
        chain_id: chain_token.to_owned(),
        source,
        destination: Destination::EvmEip712Signature {
            structured_data: typed_data,
        },
    }
}

/// EIP-191 personal-message signature request. Text callers pass its UTF-8 bytes.
pub fn personal_sign(source: Source, chain_token: &str, message: &[u8]) -> MessageSignParams {
    MessageSignParams {
        request_id: new_request_id(),
        chain_id: chain_token.to_owned(),
        source,
        destination: Destination::EvmEip191Signature {
            message: base64::engine::general_purpose::STANDARD.encode(message),
        },
    }
}
