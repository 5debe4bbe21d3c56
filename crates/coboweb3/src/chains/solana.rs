use serde::{Deserialize, Serialize};

use crate::envelope::{new_request_id, ContractCallParams, Destination, Source};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolAccountMeta {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// One program invocation. `data` is the base64-encoded instruction data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolInstruction {
    pub program_id: String,
    #[serde(default)]
    pub accounts: Vec<SolAccountMeta>,
    #[serde(default)]
    pub data: String,
}

/// Build a `SOL_Contract` envelope. Instruction order is preserved; Solana fees are always left
/// to the platform.
pub fn contract_call(
    source: Source,
    chain_token: &str,
    instructions: &[SolInstruction],
) -> ContractCallParams {
    ContractCallParams {
        request_id: new_request_id(),
        chain_id: chain_token.to_owned(),
        source,
        destination: Destination::SolContract {
            instructions: instructions.to_vec(),
        },
        fee: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MEMO_PROGRAM: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";
    const SIGNER: &str = "E4MhQWiqCLER3fFZNf8LyQFpLWW3BRxtsR5eps3c3vNS";

    fn source() -> Source {
        Source {
            source_type: "Org-Controlled".into(),
            wallet_id: "w-sol".into(),
            address: SIGNER.into(),
        }
    }

    fn memo(data: &str) -> SolInstruction {
        SolInstruction {
            program_id: MEMO_PROGRAM.into(),
            accounts: vec![SolAccountMeta {
                pubkey: SIGNER.into(),
                is_signer: true,
                is_writable: true,
            }],
            data: data.into(),
        }
    }

    #[test]
    fn preserves_instruction_order() {
        let ixs = vec![memo("AQ=="), memo("Ag=="), memo("Aw==")];
        let params = contract_call(source(), "SOL", &ixs);
        assert_eq!(params.chain_id, "SOL");
        assert_eq!(params.fee, None);
        assert_eq!(
            params.destination,
            Destination::SolContract { instructions: ixs }
        );
    }

    #[test]
    fn empty_instruction_list_is_allowed() -> eyre::Result<()> {
        let params = contract_call(source(), "TSOL", &[]);
        let v = serde_json::to_value(&params)?;
        assert_eq!(
            v.get("destination"),
            Some(&json!({"destination_type": "SOL_Contract", "instructions": []}))
        );
        assert!(v.get("fee").is_none());
        Ok(())
    }

    #[test]
    fn instructions_parse_from_platform_json() -> eyre::Result<()> {
        let ixs: Vec<SolInstruction> = serde_json::from_value(json!([{
            "program_id": MEMO_PROGRAM,
            "accounts": [{"pubkey": SIGNER, "is_signer": false, "is_writable": false}],
            "data": "AQ==",
        }]))?;
        assert_eq!(ixs.len(), 1);
        assert_eq!(ixs.first().map(|ix| ix.data.as_str()), Some("AQ=="));
        Ok(())
    }
}
