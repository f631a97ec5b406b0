//! Wallet boundary.
//!
//! Signing happens outside this crate. A [`WalletSubmitter`] receives a
//! finished [`TransactionRequest`] and reports whether the user approved
//! it; [`submit`] translates that into the user-facing [`OpsError`]
//! variants.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::error::{OpsError, OpsResult};
use crate::message::{OperationMessage, TransactionRequest};

/// Failure reported by a wallet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("wallet not connected")]
    NotConnected,

    #[error("user rejected the request")]
    UserRejected,

    #[error("{0}")]
    Other(String),
}

/// A connected wallet able to sign and broadcast transaction requests.
#[async_trait::async_trait]
pub trait WalletSubmitter: Send + Sync {
    /// Whether a wallet session is currently open.
    fn is_connected(&self) -> bool;

    /// Ask the wallet to sign and send `request`.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<(), SubmitError>;
}

/// Send `messages` as one transaction request.
///
/// The request expires after [`crate::message::VALID_FOR_SECS`]. Nothing is
/// retried: a rejected or failed request has to be started again by the user.
pub async fn submit(
    wallet: &dyn WalletSubmitter,
    messages: Vec<OperationMessage>,
) -> OpsResult<TransactionRequest> {
    if !wallet.is_connected() {
        return Err(OpsError::WalletNotConnected);
    }

    let request = TransactionRequest::new(messages);
    debug!(
        "Submitting transaction with {} messages, valid until {}",
        request.messages.len(),
        request.valid_until
    );

    match wallet.send_transaction(request.clone()).await {
        Ok(()) => Ok(request),
        Err(SubmitError::NotConnected) => Err(OpsError::WalletNotConnected),
        Err(SubmitError::UserRejected) => Err(OpsError::TransactionRejected),
        Err(SubmitError::Other(reason)) => {
            error!("Wallet failed to send transaction: {}", reason);
            Err(OpsError::SendFailed)
        }
    }
}

/// In-memory wallet that records every request it accepts.
#[derive(Clone)]
pub struct RecordingWallet {
    connected: bool,
    failure: Option<SubmitError>,
    sent: Arc<RwLock<Vec<TransactionRequest>>>,
}

impl RecordingWallet {
    /// A connected wallet that approves everything.
    pub fn new() -> Self {
        Self {
            connected: true,
            failure: None,
            sent: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A wallet with no open session.
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::new()
        }
    }

    /// A connected wallet that fails every request with `failure`.
    pub fn failing(failure: SubmitError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new()
        }
    }

    /// Requests accepted so far.
    pub async fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.read().await.clone()
    }
}

impl Default for RecordingWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WalletSubmitter for RecordingWallet {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<(), SubmitError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        self.sent.write().await.push(request);
        Ok(())
    }
}
