//! Error types for DNS operation encoding and submission.

use thiserror::Error;
use tondns_cell::CellError;

/// Result type for DNS operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Errors that can occur while encoding or submitting an operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OpsError {
    /// A user-supplied address did not parse.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The resolver (domain NFT) address did not parse.
    #[error("Invalid resolver address.")]
    InvalidResolverAddress,

    /// The collection address did not parse.
    #[error("Invalid collection address.")]
    InvalidCollectionAddress,

    /// Subdomain label is empty, too long or has characters outside `[a-z0-9-]`.
    #[error("Invalid subdomain: {0}")]
    InvalidSubdomain(String),

    /// Unknown DNS record category name.
    #[error("Unknown record category: {0}")]
    UnknownCategory(String),

    #[error("The wallet is not connected.")]
    WalletNotConnected,

    #[error("Transaction rejected by the user.")]
    TransactionRejected,

    #[error("Failed to send transaction.")]
    SendFailed,

    /// Cell encoding failed.
    #[error("Cell error: {0}")]
    Cell(#[from] CellError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            OpsError::WalletNotConnected.to_string(),
            "The wallet is not connected."
        );
        assert_eq!(
            OpsError::TransactionRejected.to_string(),
            "Transaction rejected by the user."
        );
        assert_eq!(OpsError::SendFailed.to_string(), "Failed to send transaction.");
        assert_eq!(
            OpsError::InvalidResolverAddress.to_string(),
            "Invalid resolver address."
        );

        let err = OpsError::InvalidSubdomain("-abc".to_string());
        assert_eq!(err.to_string(), "Invalid subdomain: -abc");
    }

    #[test]
    fn test_from_cell_error() {
        let err: OpsError = CellError::TooManyRefs(5).into();
        assert_eq!(err.to_string(), "Cell error: Too many cell references: 5 (max 4)");
    }
}
