//! Fixed-width identifiers that DNS records point at.

use std::fmt;
use std::str::FromStr;

use crate::{CellError, CellResult};

fn parse_hex32(kind: &str, text: &str) -> CellResult<[u8; 32]> {
    let text = text.trim();
    if text.len() != 64 {
        return Err(CellError::InvalidIdentifier(format!(
            "{} must be 64 hex characters, got {}",
            kind,
            text.len()
        )));
    }
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(text, &mut bytes)
        .map_err(|e| CellError::InvalidIdentifier(format!("{}: {}", kind, e)))?;
    Ok(bytes)
}

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; 32]);

        impl $name {
            /// Wrap raw bytes.
            pub fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Parse 64 hex characters (either case).
            pub fn from_hex(text: &str) -> CellResult<Self> {
                parse_hex32($kind, text).map(Self)
            }

            /// Lowercase hex form.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = CellError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }
    };
}

hex_id!(
    /// 256-bit ADNL address of a TON Site server.
    AdnlAddress,
    "ADNL address"
);

hex_id!(
    /// 256-bit TON Storage bag id.
    StorageBagId,
    "bag id"
);
