//! Internal addresses and their textual forms.
//!
//! An address is a workchain id plus the 256-bit hash of the account's
//! state init. Two text encodings exist:
//!
//! - Raw: `workchain:hex64`, e.g. `0:b774d95e...`
//! - Friendly: 48 base64 characters over 36 bytes
//!   `tag(1) workchain(1) hash(32) crc16(2)`
//!
//! Friendly flags (bounceable, testnet) describe how an address is shown,
//! not which account it is, so equality only looks at workchain and hash.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};

use crate::{crc16_xmodem, CellError, CellResult};

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TESTNET: u8 = 0x80;

/// Length of a friendly address in characters.
const FRIENDLY_LEN: usize = 48;

/// An internal `addr_std` address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    /// Workchain ID (-1 for masterchain, 0 for basechain).
    pub workchain: i8,
    /// 256-bit account id.
    pub hash: [u8; 32],
}

/// How to render an address as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFlavor {
    /// `workchain:hex`.
    Raw,
    /// Base64 with flags and checksum.
    Friendly {
        bounceable: bool,
        testnet: bool,
        url_safe: bool,
    },
}

impl Default for AddressFlavor {
    fn default() -> Self {
        AddressFlavor::Friendly {
            bounceable: true,
            testnet: false,
            url_safe: true,
        }
    }
}

/// A friendly address together with the flags it was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendlyAddress {
    pub address: Address,
    pub bounceable: bool,
    pub testnet: bool,
}

impl Address {
    /// Serialized size of `addr_std` without anycast.
    pub const BIT_LEN: usize = 2 + 1 + 8 + 256;

    /// Create an address from its parts.
    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    /// Parse a raw or friendly address.
    pub fn parse(text: &str) -> CellResult<Self> {
        let text = text.trim();
        if text.contains(':') {
            Self::parse_raw(text)
        } else {
            Self::parse_friendly(text).map(|f| f.address)
        }
    }

    /// Parse `workchain:hex64`.
    pub fn parse_raw(text: &str) -> CellResult<Self> {
        let (workchain, hash) = text
            .split_once(':')
            .ok_or_else(|| CellError::InvalidAddress(format!("missing ':' in {}", text)))?;

        let workchain: i8 = workchain
            .parse()
            .map_err(|_| CellError::InvalidAddress(format!("invalid workchain: {}", workchain)))?;

        if hash.len() != 64 {
            return Err(CellError::InvalidAddress(format!(
                "hash must be 64 hex characters, got {}",
                hash.len()
            )));
        }

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hash, &mut bytes)
            .map_err(|e| CellError::InvalidAddress(format!("invalid hash hex: {}", e)))?;

        Ok(Self::new(workchain, bytes))
    }

    /// Parse a friendly address in either base64 alphabet, verifying the
    /// tag and the CRC16 checksum.
    pub fn parse_friendly(text: &str) -> CellResult<FriendlyAddress> {
        if text.len() != FRIENDLY_LEN {
            return Err(CellError::InvalidAddress(format!(
                "friendly address must be {} characters, got {}",
                FRIENDLY_LEN,
                text.len()
            )));
        }

        let engine = if text.contains(['-', '_']) { &URL_SAFE } else { &STANDARD };
        let bytes = engine
            .decode(text)
            .map_err(|e| CellError::InvalidAddress(format!("invalid base64: {}", e)))?;

        if bytes.len() != 36 {
            return Err(CellError::InvalidAddress(format!(
                "friendly address must decode to 36 bytes, got {}",
                bytes.len()
            )));
        }

        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        let actual = crc16_xmodem(&bytes[..34]);
        if expected != actual {
            return Err(CellError::InvalidAddress(format!(
                "checksum mismatch: expected {:04x}, got {:04x}",
                expected, actual
            )));
        }

        let mut tag = bytes[0];
        let testnet = tag & TAG_TESTNET != 0;
        tag &= !TAG_TESTNET;
        let bounceable = match tag {
            TAG_BOUNCEABLE => true,
            TAG_NON_BOUNCEABLE => false,
            other => {
                return Err(CellError::InvalidAddress(format!(
                    "unknown address tag 0x{:02x}",
                    other
                )));
            }
        };

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[2..34]);

        Ok(FriendlyAddress {
            address: Self::new(bytes[1] as i8, hash),
            bounceable,
            testnet,
        })
    }

    /// Render the address in the given flavor.
    pub fn to_string_with(&self, flavor: AddressFlavor) -> String {
        match flavor {
            AddressFlavor::Raw => self.to_raw_string(),
            AddressFlavor::Friendly {
                bounceable,
                testnet,
                url_safe,
            } => self.to_friendly(bounceable, testnet, url_safe),
        }
    }

    /// Render as `workchain:hex`.
    pub fn to_raw_string(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    /// Render as a friendly base64 address.
    pub fn to_friendly(&self, bounceable: bool, testnet: bool, url_safe: bool) -> String {
        let mut data = Vec::with_capacity(36);

        let mut tag = if bounceable { TAG_BOUNCEABLE } else { TAG_NON_BOUNCEABLE };
        if testnet {
            tag |= TAG_TESTNET;
        }
        data.push(tag);
        data.push(self.workchain as u8);
        data.extend_from_slice(&self.hash);
        data.extend_from_slice(&crc16_xmodem(&data).to_be_bytes());

        if url_safe {
            URL_SAFE.encode(&data)
        } else {
            STANDARD.encode(&data)
        }
    }

    /// Check if this is a masterchain address (workchain -1).
    pub fn is_masterchain(&self) -> bool {
        self.workchain == -1
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(AddressFlavor::default()))
    }
}

impl FromStr for Address {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DNS_ROOT: &str = "EQC3dNlesgVD8YbAazcauIrXBPfiVhMMr5YYk2in0Mtsz0Bz";
    const DNS_ROOT_RAW: &str = "0:b774d95eb20543f186c06b371ab88ad704f7e256130caf96189368a7d0cb6ccf";

    #[test]
    fn test_parse_friendly_known() {
        let parsed = Address::parse_friendly(DNS_ROOT).unwrap();
        assert!(parsed.bounceable);
        assert!(!parsed.testnet);
        assert_eq!(parsed.address.to_raw_string(), DNS_ROOT_RAW);
    }

    #[test]
    fn test_raw_and_friendly_are_equal() {
        let raw = Address::parse(DNS_ROOT_RAW).unwrap();
        let friendly = Address::parse(DNS_ROOT).unwrap();
        assert_eq!(raw, friendly);
        assert_eq!(raw.to_string(), DNS_ROOT);
    }

    #[test]
    fn test_testnet_non_bounceable_flags() {
        let parsed = Address::parse_friendly("0QASgfDPFbdLTVf_lXAqP_hdnBjEALIuJtHlMxvUmpNid8qx").unwrap();
        assert!(!parsed.bounceable);
        assert!(parsed.testnet);
        assert_eq!(
            hex::encode(parsed.address.hash),
            "1281f0cf15b74b4d57ff95702a3ff85d9c18c400b22e26d1e5331bd49a936277"
        );
        assert_eq!(
            parsed.address.to_friendly(false, true, true),
            "0QASgfDPFbdLTVf_lXAqP_hdnBjEALIuJtHlMxvUmpNid8qx"
        );
    }

    #[test]
    fn test_standard_alphabet_accepted() {
        let address = Address::parse(DNS_ROOT).unwrap();
        let standard = address.to_friendly(true, false, false);
        assert_eq!(Address::parse(&standard).unwrap(), address);
    }

    #[test]
    fn test_corrupted_checksum_rejected() {
        let mut corrupted = DNS_ROOT.to_string();
        corrupted.replace_range(47..48, "A");
        assert!(matches!(
            Address::parse(&corrupted),
            Err(CellError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_masterchain_raw() {
        let raw = format!("-1:{}", "00".repeat(32));
        let address = Address::parse(&raw).unwrap();
        assert!(address.is_masterchain());
        assert_eq!(address.to_raw_string(), raw);

        let friendly = address.to_string();
        assert!(friendly.starts_with("Ef8"));
        assert_eq!(Address::parse(&friendly).unwrap(), address);
    }

    #[test]
    fn test_invalid_inputs() {
        for input in [
            "",
            "0:abc",
            "300:0000000000000000000000000000000000000000000000000000000000000000",
            "0:zz00000000000000000000000000000000000000000000000000000000000000",
            "EQC3dNlesgVD8YbAazcauIrXBPfiVhMMr5YYk2in0Mtsz0B",
            "not an address at all, really not an address!!!",
        ] {
            assert!(
                matches!(Address::parse(input), Err(CellError::InvalidAddress(_))),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let mut data = vec![0x22, 0x00];
        data.extend_from_slice(&[0u8; 32]);
        data.extend_from_slice(&crc16_xmodem(&data).to_be_bytes());
        let text = URL_SAFE.encode(&data);
        assert!(Address::parse(&text).is_err());
    }
}
