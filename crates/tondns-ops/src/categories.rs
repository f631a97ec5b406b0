//! DNS record categories.
//!
//! Each category is addressed by the SHA-256 of its name. The keys are kept
//! as literal constants so they can be matched without hashing.

use std::fmt;
use std::str::FromStr;

use crate::error::OpsError;

const KEY_NEXT_RESOLVER: [u8; 32] = hex32("19f02441ee588fdb26ee24b2568dd035c3c9206e11ab979be62e55558a1d17ff");
const KEY_WALLET: [u8; 32] = hex32("e8d44050873dba865aa7c170ab4cce64d90839a34dcfd6cf71d14e0205443b1b");
const KEY_SITE: [u8; 32] = hex32("fbae041b02c41ed0fd8a4efb039bc780dd6af4a1f0c420f42561ae705dda43fe");
const KEY_STORAGE: [u8; 32] = hex32("49a25f9feefaffecad0fcd30c50dc9331cff8b55ece53def6285c09e17e6f5d7");

const fn hex_nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => panic!("invalid hex digit"),
    }
}

const fn hex32(s: &str) -> [u8; 32] {
    let bytes = s.as_bytes();
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        out[i] = (hex_nibble(bytes[2 * i]) << 4) | hex_nibble(bytes[2 * i + 1]);
        i += 1;
    }
    out
}

/// A record category on a domain item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsRecordKind {
    NextResolver,
    Wallet,
    Site,
    Storage,
}

impl DnsRecordKind {
    /// Every category, in the order the manager shows them.
    pub fn all() -> [DnsRecordKind; 4] {
        [
            DnsRecordKind::NextResolver,
            DnsRecordKind::Wallet,
            DnsRecordKind::Site,
            DnsRecordKind::Storage,
        ]
    }

    /// Category name as hashed into the key.
    pub fn name(&self) -> &'static str {
        match self {
            DnsRecordKind::NextResolver => "dns_next_resolver",
            DnsRecordKind::Wallet => "wallet",
            DnsRecordKind::Site => "site",
            DnsRecordKind::Storage => "storage",
        }
    }

    /// 256-bit dictionary key of the category.
    pub fn key(&self) -> [u8; 32] {
        match self {
            DnsRecordKind::NextResolver => KEY_NEXT_RESOLVER,
            DnsRecordKind::Wallet => KEY_WALLET,
            DnsRecordKind::Site => KEY_SITE,
            DnsRecordKind::Storage => KEY_STORAGE,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|kind| kind.name() == name)
    }

    /// Reverse lookup by key.
    pub fn from_key(key: &[u8; 32]) -> Option<Self> {
        Self::all().into_iter().find(|kind| kind.key() == *key)
    }
}

impl fmt::Display for DnsRecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DnsRecordKind {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| OpsError::UnknownCategory(s.to_string()))
    }
}
