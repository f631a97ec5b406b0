//! Error types for the read API and pre-flight checks.

use thiserror::Error;
use tondns_ops::OpsError;

/// Result type for read API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while querying the indexer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 429 Too Many Requests.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Still rate limited after the configured number of attempts.
    #[error("API failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Non-success status other than 429.
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Ops(#[from] OpsError),
}

/// Result type for pre-flight checks.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Reasons an operation must not be offered to the user.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Incorrect domain address.")]
    DomainNotFound,

    #[error("Can't find the domain owner address.")]
    OwnerUnknown,

    #[error("This address doesn't belong to you.")]
    NotOwner,

    /// Unknown code hash, or the indexer has no such collection.
    #[error("Invalid collection address.")]
    InvalidCollection,

    #[error("Invalid subdomain format: {0}")]
    InvalidSubdomain(String),

    /// `dnsresolve` is not available on the given contract.
    #[error("Incorrect DNS address.")]
    InvalidResolver,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<OpsError> for VerifyError {
    fn from(err: OpsError) -> Self {
        match err {
            OpsError::InvalidSubdomain(name) => VerifyError::InvalidSubdomain(name),
            OpsError::InvalidCollectionAddress => VerifyError::InvalidCollection,
            other => VerifyError::Api(ApiError::Ops(other)),
        }
    }
}
