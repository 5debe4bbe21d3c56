use serde::Serialize;
use thiserror::Error;

use crate::dispatch::ChainFamily;
use crate::platform::PlatformError;

/// A structured error suitable for printing as CLI JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("unknown chain id: {0}")]
    UnknownChainId(u64),

    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("unsupported wallet type: {0} (only MPC wallets can send or sign)")]
    UnsupportedWalletType(String),

    #[error("{operation} is not supported for {family} addresses")]
    UnsupportedOperation {
        operation: &'static str,
        family: ChainFamily,
    },

    #[error("address {address} not found in wallet {wallet_id}")]
    AddressNotFound { address: String, wallet_id: String },

    #[error("submission rejected by platform: status {status}")]
    SubmissionRejected { status: String },

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl PortalError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownChainId(_) => "unknown_chain_id",
            Self::MalformedTransaction(_) => "malformed_transaction",
            Self::UnsupportedWalletType(_) => "unsupported_wallet_type",
            Self::UnsupportedOperation { .. } => "unsupported_operation",
            Self::AddressNotFound { .. } => "address_not_found",
            Self::SubmissionRejected { .. } => "submission_rejected",
            Self::Platform(e) => e.code(),
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedTransaction(msg.into())
    }
}

impl From<&PortalError> for ErrorReport {
    fn from(e: &PortalError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(PortalError::UnknownChainId(7).code(), "unknown_chain_id");
        assert_eq!(
            PortalError::SubmissionRejected {
                status: "Failed".into()
            }
            .code(),
            "submission_rejected"
        );
        assert_eq!(
            PortalError::Platform(PlatformError::Status {
                status: 401,
                body: "unauthorized".into()
            })
            .code(),
            "platform_status"
        );
    }

    #[test]
    fn report_carries_display_message() {
        let e = PortalError::UnsupportedOperation {
            operation: "send_transaction",
            family: ChainFamily::Generic,
        };
        let r = ErrorReport::from(&e);
        assert_eq!(r.code, "unsupported_operation");
        assert_eq!(
            r.message,
            "send_transaction is not supported for generic addresses"
        );
    }

    #[test]
    fn rejection_echoes_status() {
        let e = PortalError::SubmissionRejected {
            status: "PendingAuthorization".into(),
        };
        assert!(e.to_string().contains("PendingAuthorization"));
    }
}
