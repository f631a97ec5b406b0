//! Outgoing messages handed to the wallet.
//!
//! A wallet signs a [`TransactionRequest`] holding one or more
//! [`OperationMessage`]s. Payloads and state inits travel as base64 BoCs and
//! amounts as decimal nanoton strings, matching the TON Connect
//! `sendTransaction` request.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tondns_cell::{Address, Cell, CellResult};

use crate::error::OpsResult;

/// How long a request stays valid after it is built, in seconds.
pub const VALID_FOR_SECS: u64 = 360;

/// Where a message goes, and the address text the wallet receives.
///
/// Addresses the user typed keep their text, so testnet and non-bounceable
/// flags survive. Derived addresses render in the default friendly form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub address: Address,
    text: String,
}

impl Destination {
    /// Parse a raw or friendly address, keeping the trimmed text as written.
    pub fn parse(text: &str) -> CellResult<Self> {
        let text = text.trim();
        Ok(Self {
            address: Address::parse(text)?,
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<Address> for Destination {
    fn from(address: Address) -> Self {
        Self {
            address,
            text: address.to_string(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One message of a transaction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMessage {
    /// Destination address, raw or friendly.
    pub address: String,
    /// Attached value in nanotons.
    pub amount: String,
    /// Base64 BoC of the message body.
    pub payload: String,
    /// Base64 BoC of the state init, for deploy messages only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_init: Option<String>,
}

impl OperationMessage {
    /// Build a message carrying `payload` to `destination`.
    pub fn new(destination: &Destination, amount: u64, payload: &Cell) -> OpsResult<Self> {
        Ok(Self {
            address: destination.text().to_string(),
            amount: amount.to_string(),
            payload: payload.to_boc_base64()?,
            state_init: None,
        })
    }

    /// Attach a state init.
    pub fn with_state_init(mut self, state_init: &Cell) -> OpsResult<Self> {
        self.state_init = Some(state_init.to_boc_base64()?);
        Ok(self)
    }

    /// The attached value in nanotons.
    pub fn amount_nanotons(&self) -> Option<u64> {
        self.amount.parse().ok()
    }
}

/// A batch of messages for the wallet to sign and send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Unix time after which the wallet must refuse to send.
    pub valid_until: u64,
    pub messages: Vec<OperationMessage>,
}

impl TransactionRequest {
    /// Build a request valid for [`VALID_FOR_SECS`] from now.
    pub fn new(messages: Vec<OperationMessage>) -> Self {
        Self {
            valid_until: unix_now() + VALID_FOR_SECS,
            messages,
        }
    }

    /// Override the expiry.
    pub fn with_valid_until(mut self, valid_until: u64) -> Self {
        self.valid_until = valid_until;
        self
    }

    /// Whether the request has expired at the given unix time.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.valid_until
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
