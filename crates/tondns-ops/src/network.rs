//! Per-network constants.

use std::fmt;

use tondns_cell::Address;

use crate::error::{OpsError, OpsResult};

/// TON Connect chain id of mainnet.
pub const MAINNET_CHAIN_ID: &str = "-239";

/// TON Connect chain id of testnet.
pub const TESTNET_CHAIN_ID: &str = "-3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// Map a TON Connect chain id to a network.
    pub fn from_chain_id(chain_id: &str) -> Option<Self> {
        match chain_id {
            MAINNET_CHAIN_ID => Some(Network::Mainnet),
            TESTNET_CHAIN_ID => Some(Network::Testnet),
            _ => None,
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::Testnet)
    }

    /// Collection holding the `.ton` domain NFTs.
    pub fn dns_collection_address(&self) -> &'static str {
        match self {
            Network::Mainnet => "EQC3dNlesgVD8YbAazcauIrXBPfiVhMMr5YYk2in0Mtsz0Bz",
            Network::Testnet => "kQDjPtM6QusgMgWfl9kMcG-EALslbTITnKcH8VZK1pnH3f3K",
        }
    }

    /// Default royalty recipient for new collections.
    pub fn royalty_address(&self) -> &'static str {
        match self {
            Network::Mainnet => "UQCDrgGaI6gWK-qlyw69xWZosurGxrpRgIgSkVsgahUtxZR0",
            Network::Testnet => "0QASgfDPFbdLTVf_lXAqP_hdnBjEALIuJtHlMxvUmpNid8qx",
        }
    }

    /// Parsed [`Network::dns_collection_address`].
    pub fn dns_collection(&self) -> OpsResult<Address> {
        Address::parse(self.dns_collection_address()).map_err(|e| OpsError::InvalidAddress(e.to_string()))
    }

    /// toncenter v3 base URL, with trailing slash.
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://toncenter.com/api/v3/",
            Network::Testnet => "https://testnet.toncenter.com/api/v3/",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Testnet => f.write_str("testnet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_chain_id() {
        assert_eq!(Network::from_chain_id("-239"), Some(Network::Mainnet));
        assert_eq!(Network::from_chain_id("-3"), Some(Network::Testnet));
        assert_eq!(Network::from_chain_id("0"), None);
    }

    #[test]
    fn test_addresses_parse() {
        for network in [Network::Mainnet, Network::Testnet] {
            network.dns_collection().unwrap();
            let royalty = Address::parse_friendly(network.royalty_address()).unwrap();
            assert_eq!(royalty.testnet, network.is_testnet());
            assert!(!royalty.bounceable);
        }
    }

    #[test]
    fn test_api_base_url() {
        assert!(Network::Mainnet.api_base_url().starts_with("https://toncenter.com"));
        assert!(Network::Testnet.api_base_url().contains("testnet"));
        assert!(Network::Testnet.api_base_url().ends_with('/'));
    }
}
