//! Subdomain minting.
//!
//! A subdomain is minted by sending the label as a text comment to the
//! collection, which deploys the item itself. The item address can still be
//! computed offline, which is how availability is checked before minting.

use std::sync::Arc;

use tondns_cell::{derive_address, Address, Cell, CellBuilder};
use tracing::debug;

use crate::codes::item_code;
use crate::error::{OpsError, OpsResult};
use crate::message::{Destination, OperationMessage};
use crate::opcodes::TEXT_COMMENT;

/// Value attached to a mint, in nanotons.
pub const SUBDOMAIN_MINT_AMOUNT: u64 = 200_000_000;

/// Maximum subdomain label length in characters.
pub const MAX_SUBDOMAIN_LEN: usize = 64;

/// Whether `name` is a mintable label: 1 to 64 characters of `[a-z0-9-]`,
/// not starting or ending with `-`.
pub fn is_valid_subdomain(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_SUBDOMAIN_LEN
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Text comment body: `u32 0` followed by the snake string.
pub fn comment_cell(text: &str) -> OpsResult<Cell> {
    let mut builder = CellBuilder::new();
    builder.store_u32(TEXT_COMMENT)?;
    builder.store_string_tail(text)?;
    Ok(builder.build()?)
}

/// Address of the item the collection deploys for `subdomain`.
///
/// Item data is `hash(string_tail(subdomain))` followed by the collection
/// address.
pub fn item_address(collection: &Address, subdomain: &str) -> OpsResult<Address> {
    let mut label = CellBuilder::new();
    label.store_string_tail(subdomain)?;
    let label_hash = label.build()?.hash();

    let mut data = CellBuilder::new();
    data.store_bytes(&label_hash)?;
    data.store_address(collection)?;

    Ok(derive_address(0, item_code()?, Arc::new(data.build()?))?)
}

/// A prepared subdomain mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainMint {
    pub collection: Destination,
    pub subdomain: String,
}

impl SubdomainMint {
    pub fn new(collection: &str, subdomain: &str) -> OpsResult<Self> {
        let collection = Destination::parse(collection).map_err(|_| OpsError::InvalidCollectionAddress)?;
        if !is_valid_subdomain(subdomain) {
            return Err(OpsError::InvalidSubdomain(subdomain.to_string()));
        }
        Ok(Self {
            collection,
            subdomain: subdomain.to_string(),
        })
    }

    /// Address the minted item will have.
    pub fn item_address(&self) -> OpsResult<Address> {
        item_address(&self.collection.address, &self.subdomain)
    }

    /// The mint message to the collection.
    pub fn message(&self) -> OpsResult<OperationMessage> {
        let body = comment_cell(&self.subdomain)?;
        debug!("Prepared mint of {} in {}", self.subdomain, self.collection);
        OperationMessage::new(&self.collection, SUBDOMAIN_MINT_AMOUNT, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tondns_cell::{BagOfCells, CellSlice};

    const COLLECTION: &str = "EQC3dNlesgVD8YbAazcauIrXBPfiVhMMr5YYk2in0Mtsz0Bz";

    #[test]
    fn test_is_valid_subdomain() {
        for name in ["a", "abc", "a-b", "0x", "9", "a".repeat(64).as_str()] {
            assert!(is_valid_subdomain(name), "{}", name);
        }
        for name in ["", "-a", "a-", "-", "ABC", "a.b", "a_b", "ü", "a".repeat(65).as_str()] {
            assert!(!is_valid_subdomain(name), "{}", name);
        }
    }

    #[test]
    fn test_comment_cell() {
        let cell = comment_cell("shop").unwrap();
        assert_eq!(cell.bit_len(), 32 + 32);

        let mut slice = CellSlice::new(&cell);
        assert_eq!(slice.load_u32().unwrap(), 0);
        assert_eq!(slice.load_string_tail().unwrap(), "shop");
    }

    #[test]
    fn test_item_address_depends_on_label_and_collection() {
        let collection = Address::parse(COLLECTION).unwrap();
        let a = item_address(&collection, "alpha").unwrap();
        assert_eq!(a, item_address(&collection, "alpha").unwrap());
        assert_ne!(a, item_address(&collection, "beta").unwrap());

        let other = Address::new(0, [0x42; 32]);
        assert_ne!(a, item_address(&other, "alpha").unwrap());
    }

    #[test]
    fn test_mint_validation() {
        assert_eq!(
            SubdomainMint::new("bad", "shop").unwrap_err(),
            OpsError::InvalidCollectionAddress
        );
        assert!(matches!(
            SubdomainMint::new(COLLECTION, "Shop"),
            Err(OpsError::InvalidSubdomain(_))
        ));
    }

    #[test]
    fn test_mint_message_goes_to_collection() {
        let mint = SubdomainMint::new(COLLECTION, "shop").unwrap();
        let message = mint.message().unwrap();

        assert_eq!(message.address, COLLECTION);
        assert_eq!(message.amount, "200000000");
        assert!(message.state_init.is_none());
        assert_ne!(message.address, mint.item_address().unwrap().to_string());

        let boc = BagOfCells::deserialize_from_base64(&message.payload).unwrap();
        let mut slice = CellSlice::new(boc.single_root().unwrap());
        assert_eq!(slice.load_u32().unwrap(), 0);
        assert_eq!(slice.load_string_tail().unwrap(), "shop");
    }

    #[test]
    fn test_mint_keeps_testnet_collection_text() {
        let testnet = Address::parse(COLLECTION).unwrap().to_friendly(false, true, true);
        let mint = SubdomainMint::new(&testnet, "shop").unwrap();

        assert_eq!(mint.message().unwrap().address, testnet);
        assert_eq!(
            mint.item_address().unwrap(),
            SubdomainMint::new(COLLECTION, "shop").unwrap().item_address().unwrap()
        );
    }
}
