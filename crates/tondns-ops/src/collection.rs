//! DNS collection deployment.
//!
//! Deploying a collection for `example.ton` takes two messages in one
//! transaction:
//!
//! 1. the state init plus an initialize body, sent to the derived collection
//!    address;
//! 2. a `dns_next_resolver` change on the `example.ton` domain item pointing
//!    at that address, so that `*.example.ton` resolves through the
//!    collection.

use std::sync::Arc;

use tondns_cell::{Address, Cell, CellBuilder, StateInit};
use tracing::debug;

use crate::categories::DnsRecordKind;
use crate::codes::{collection_code, item_code};
use crate::content::CollectionContent;
use crate::error::{OpsError, OpsResult};
use crate::message::{Destination, OperationMessage};
use crate::opcodes::DEPLOY_COLLECTION;
use crate::records::{change_record_body, next_resolver_value};

/// Value attached to each of the two deploy messages, in nanotons.
pub const COLLECTION_DEPLOY_AMOUNT: u64 = 50_000_000;

/// Default royalty numerator.
pub const DEFAULT_ROYALTY_FACTOR: u16 = 5;

/// Default royalty denominator.
pub const DEFAULT_ROYALTY_BASE: u16 = 100;

/// Royalty parameters: `factor / base` of each sale goes to `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Royalty {
    pub factor: u16,
    pub base: u16,
    pub address: Address,
}

impl Royalty {
    /// 5% royalty to `address`.
    pub fn default_for(address: Address) -> Self {
        Self {
            factor: DEFAULT_ROYALTY_FACTOR,
            base: DEFAULT_ROYALTY_BASE,
            address,
        }
    }

    pub fn to_cell(&self) -> OpsResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u16(self.factor)?;
        builder.store_u16(self.base)?;
        builder.store_address(&self.address)?;
        Ok(builder.build()?)
    }
}

/// Persistent data of a collection contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionData {
    pub owner: Address,
    pub content: CollectionContent,
    pub royalty: Royalty,
    /// Parent domain without the `.ton` suffix.
    pub domain: String,
}

impl CollectionData {
    /// Encode as `owner ^content ^item_code ^royalty ^domain`.
    pub fn to_cell(&self) -> OpsResult<Cell> {
        let mut domain = CellBuilder::new();
        domain.store_string_tail(&self.domain)?;

        let mut builder = CellBuilder::new();
        builder.store_address(&self.owner)?;
        builder.store_ref(Arc::new(self.content.to_cell()?))?;
        builder.store_ref(item_code()?)?;
        builder.store_ref(Arc::new(self.royalty.to_cell()?))?;
        builder.store_ref(Arc::new(domain.build()?))?;
        Ok(builder.build()?)
    }
}

/// A prepared collection deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDeploy {
    pub data: CollectionData,
    /// Domain item whose next-resolver record will point at the collection.
    pub resolver: Destination,
}

impl CollectionDeploy {
    /// Prepare a deployment of `*.{domain}.ton`.
    ///
    /// Addresses may be raw or friendly.
    pub fn new(owner: &str, royalty_address: &str, domain: &str, resolver: &str) -> OpsResult<Self> {
        let owner = parse(owner)?;
        let royalty = Royalty::default_for(parse(royalty_address)?);
        let resolver = Destination::parse(resolver).map_err(|e| OpsError::InvalidAddress(e.to_string()))?;

        Ok(Self {
            data: CollectionData {
                owner,
                content: CollectionContent::for_domain(domain),
                royalty,
                domain: domain.to_string(),
            },
            resolver,
        })
    }

    pub fn state_init(&self) -> OpsResult<StateInit> {
        Ok(StateInit::new(collection_code()?, Arc::new(self.data.to_cell()?)))
    }

    /// The address the collection will live at (basechain).
    pub fn address(&self) -> OpsResult<Address> {
        Ok(self.state_init()?.address(0)?)
    }

    /// Initialize body: `u32 1, u64 0`.
    pub fn deploy_payload() -> OpsResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u32(DEPLOY_COLLECTION)?;
        builder.store_u64(0)?;
        Ok(builder.build()?)
    }

    /// The deploy message followed by the resolver update.
    pub fn messages(&self) -> OpsResult<Vec<OperationMessage>> {
        let state_init = self.state_init()?;
        let address = state_init.address(0)?;

        let deploy = OperationMessage::new(&address.into(), COLLECTION_DEPLOY_AMOUNT, &Self::deploy_payload()?)?
            .with_state_init(&state_init.to_cell()?)?;

        let resolver_body = change_record_body(
            DnsRecordKind::NextResolver,
            Some(next_resolver_value(&address)?),
        )?;
        let link = OperationMessage::new(&self.resolver, COLLECTION_DEPLOY_AMOUNT, &resolver_body)?;

        debug!(
            "Prepared deploy of {} collection at {}, resolver {}",
            self.data.domain, address, self.resolver
        );
        Ok(vec![deploy, link])
    }
}

fn parse(text: &str) -> OpsResult<Address> {
    Address::parse(text).map_err(|e| OpsError::InvalidAddress(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tondns_cell::{BagOfCells, CellSlice};

    const OWNER: &str = "UQCDrgGaI6gWK-qlyw69xWZosurGxrpRgIgSkVsgahUtxZR0";
    const RESOLVER: &str = "EQC3dNlesgVD8YbAazcauIrXBPfiVhMMr5YYk2in0Mtsz0Bz";

    fn deploy() -> CollectionDeploy {
        CollectionDeploy::new(OWNER, OWNER, "example", RESOLVER).unwrap()
    }

    #[test]
    fn test_royalty_cell() {
        let royalty = Royalty::default_for(Address::parse(OWNER).unwrap());
        let cell = royalty.to_cell().unwrap();
        assert_eq!(cell.bit_len(), 16 + 16 + 267);

        let mut slice = CellSlice::new(&cell);
        assert_eq!(slice.load_u16().unwrap(), 5);
        assert_eq!(slice.load_u16().unwrap(), 100);
    }

    #[test]
    fn test_data_cell_layout() {
        let cell = deploy().data.to_cell().unwrap();
        assert_eq!(cell.bit_len(), 267);
        assert_eq!(cell.reference_count(), 4);
        assert_eq!(cell.reference(1).unwrap().hash(), item_code().unwrap().hash());

        let mut slice = CellSlice::new(cell.reference(3).unwrap());
        assert_eq!(slice.load_string_tail().unwrap(), "example");
    }

    #[test]
    fn test_address_is_deterministic() {
        let a = deploy().address().unwrap();
        let b = deploy().address().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.workchain, 0);

        let other = CollectionDeploy::new(OWNER, OWNER, "other", RESOLVER)
            .unwrap()
            .address()
            .unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn test_known_content_and_address() {
        let content = CollectionContent::for_domain("Example").to_cell().unwrap();
        assert_eq!(
            hex::encode(content.hash()),
            "426ef6852e6e7cdf0348fc5755d327dfb1e31dc8cb631c9428dadb2aba6bd71a"
        );

        assert_eq!(
            deploy().address().unwrap().to_raw_string(),
            "0:8e61205d0904f13f010879529fe0b743a44dd15c874dba825bd5268b0ba78b8c"
        );
    }

    #[test]
    fn test_address_changes_with_each_field() {
        let base = deploy().address().unwrap();
        let other = Address::new(0, [0x42; 32]).to_string();

        // Content is normalized, but the domain cell keeps the casing.
        let cased = CollectionDeploy::new(OWNER, OWNER, "Example", RESOLVER).unwrap();
        assert_eq!(cased.data.content, deploy().data.content);
        assert_eq!(
            cased.address().unwrap().to_raw_string(),
            "0:d5e2d5bb0c169841f4096f3f2344b3c27ec2f03088499de080801308eeb089e4"
        );

        let owner = CollectionDeploy::new(&other, OWNER, "example", RESOLVER).unwrap();
        assert_ne!(owner.address().unwrap(), base);

        let royalty = CollectionDeploy::new(OWNER, &other, "example", RESOLVER).unwrap();
        assert_ne!(royalty.address().unwrap(), base);

        // The resolver only receives the link message.
        let resolver = CollectionDeploy::new(OWNER, OWNER, "example", &other).unwrap();
        assert_eq!(resolver.address().unwrap(), base);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            CollectionDeploy::new("bad", OWNER, "example", RESOLVER),
            Err(OpsError::InvalidAddress(_))
        ));
        assert!(matches!(
            CollectionDeploy::new(OWNER, OWNER, "example", "0:xyz"),
            Err(OpsError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_messages() {
        let deploy = deploy();
        let address = deploy.address().unwrap();
        let messages = deploy.messages().unwrap();
        assert_eq!(messages.len(), 2);

        let first = &messages[0];
        assert_eq!(first.address, address.to_string());
        assert_eq!(first.amount, "50000000");
        let state_init = BagOfCells::deserialize_from_base64(first.state_init.as_ref().unwrap()).unwrap();
        assert_eq!(
            state_init.single_root().unwrap().hash(),
            deploy.state_init().unwrap().to_cell().unwrap().hash()
        );
        let payload = BagOfCells::deserialize_from_base64(&first.payload).unwrap();
        let mut slice = CellSlice::new(payload.single_root().unwrap());
        assert_eq!(slice.load_u32().unwrap(), 1);
        assert_eq!(slice.load_u64().unwrap(), 0);

        let second = &messages[1];
        assert_eq!(second.address, RESOLVER);
        assert_eq!(second.amount, "50000000");
        assert!(second.state_init.is_none());

        let body = BagOfCells::deserialize_from_base64(&second.payload).unwrap();
        let body = body.single_root().unwrap();
        let mut value = CellSlice::new(body.reference(0).unwrap());
        assert_eq!(value.load_u16().unwrap(), 0xba93);
        assert_eq!(value.load_address().unwrap(), address);
    }

    #[test]
    fn test_link_message_keeps_resolver_text() {
        let testnet = Address::parse(RESOLVER).unwrap().to_friendly(false, true, true);
        let linked = CollectionDeploy::new(OWNER, OWNER, "example", &testnet).unwrap();
        let messages = linked.messages().unwrap();
        assert_eq!(messages[1].address, testnet);
        assert_eq!(linked.address().unwrap(), deploy().address().unwrap());
    }
}
