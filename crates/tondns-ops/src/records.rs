//! DNS record change payloads.
//!
//! A change is sent to the domain item (the resolver) as
//!
//! ```tlb
//! change_dns_record#4eb1f0f9 query_id:uint64 key:uint256 value:(Maybe ^DNSRecord)
//! ```
//!
//! where an absent value deletes the record. Record values share one layout:
//! a 16-bit prefix, the payload (32 raw bytes or an address) and a zero
//! flags byte.

use std::sync::Arc;

use tondns_cell::{Address, AdnlAddress, Cell, CellBuilder, StorageBagId};
use tracing::debug;

use crate::categories::DnsRecordKind;
use crate::error::{OpsError, OpsResult};
use crate::message::{Destination, OperationMessage};
use crate::opcodes::{CHANGE_DNS_RECORD, SET_NEXT_RESOLVER, SET_SITE, SET_STORAGE, SET_WALLET};

/// Value attached to every record change, in nanotons.
pub const DNS_MANAGER_AMOUNT: u64 = 5_000_000;

fn bytes_value(prefix: u16, bytes: &[u8; 32]) -> OpsResult<Arc<Cell>> {
    let mut builder = CellBuilder::new();
    builder.store_u16(prefix)?;
    builder.store_bytes(bytes)?;
    builder.store_u8(0)?;
    Ok(Arc::new(builder.build()?))
}

fn address_value(prefix: u16, address: &Address) -> OpsResult<Arc<Cell>> {
    let mut builder = CellBuilder::new();
    builder.store_u16(prefix)?;
    builder.store_address(address)?;
    builder.store_u8(0)?;
    Ok(Arc::new(builder.build()?))
}

/// Site record value. With `is_storage` the ADNL bytes are tagged as a
/// storage bag, which lets a site be served from TON Storage.
pub fn site_value(adnl: &AdnlAddress, is_storage: bool) -> OpsResult<Arc<Cell>> {
    let prefix = if is_storage { SET_STORAGE } else { SET_SITE };
    bytes_value(prefix, adnl.as_bytes())
}

pub fn storage_value(bag: &StorageBagId) -> OpsResult<Arc<Cell>> {
    bytes_value(SET_STORAGE, bag.as_bytes())
}

pub fn wallet_value(wallet: &Address) -> OpsResult<Arc<Cell>> {
    address_value(SET_WALLET, wallet)
}

pub fn next_resolver_value(resolver: &Address) -> OpsResult<Arc<Cell>> {
    address_value(SET_NEXT_RESOLVER, resolver)
}

/// Encode a change-record body. `None` deletes the record.
pub fn change_record_body(kind: DnsRecordKind, value: Option<Arc<Cell>>) -> OpsResult<Cell> {
    let mut builder = CellBuilder::new();
    builder.store_u32(CHANGE_DNS_RECORD)?;
    builder.store_u64(0)?;
    builder.store_uint_bytes(&kind.key(), 256)?;
    if let Some(value) = value {
        builder.store_ref(value)?;
    }
    Ok(builder.build()?)
}

/// Set the `site` record. The key stays `site` even when `is_storage` is set.
pub fn site_body(adnl: &AdnlAddress, is_storage: bool) -> OpsResult<Cell> {
    change_record_body(DnsRecordKind::Site, Some(site_value(adnl, is_storage)?))
}

pub fn storage_body(bag: &StorageBagId) -> OpsResult<Cell> {
    change_record_body(DnsRecordKind::Storage, Some(storage_value(bag)?))
}

/// Set the `wallet` record from a raw or friendly address.
pub fn wallet_body(wallet: &str) -> OpsResult<Cell> {
    let wallet = parse_address(wallet)?;
    change_record_body(DnsRecordKind::Wallet, Some(wallet_value(&wallet)?))
}

/// Set the `dns_next_resolver` record from a raw or friendly address.
pub fn resolver_body(resolver: &str) -> OpsResult<Cell> {
    let resolver = parse_address(resolver)?;
    change_record_body(DnsRecordKind::NextResolver, Some(next_resolver_value(&resolver)?))
}

pub fn delete_record_body(kind: DnsRecordKind) -> OpsResult<Cell> {
    change_record_body(kind, None)
}

fn parse_address(text: &str) -> OpsResult<Address> {
    Address::parse(text).map_err(|e| OpsError::InvalidAddress(e.to_string()))
}

/// A typed record change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsRecordChange {
    SetSite { adnl: AdnlAddress, is_storage: bool },
    SetStorage(StorageBagId),
    SetWallet(Address),
    SetNextResolver(Address),
    Delete(DnsRecordKind),
}

impl DnsRecordChange {
    /// The category this change writes to.
    pub fn kind(&self) -> DnsRecordKind {
        match self {
            DnsRecordChange::SetSite { .. } => DnsRecordKind::Site,
            DnsRecordChange::SetStorage(_) => DnsRecordKind::Storage,
            DnsRecordChange::SetWallet(_) => DnsRecordKind::Wallet,
            DnsRecordChange::SetNextResolver(_) => DnsRecordKind::NextResolver,
            DnsRecordChange::Delete(kind) => *kind,
        }
    }

    pub fn body(&self) -> OpsResult<Cell> {
        match self {
            DnsRecordChange::SetSite { adnl, is_storage } => site_body(adnl, *is_storage),
            DnsRecordChange::SetStorage(bag) => storage_body(bag),
            DnsRecordChange::SetWallet(wallet) => {
                change_record_body(DnsRecordKind::Wallet, Some(wallet_value(wallet)?))
            }
            DnsRecordChange::SetNextResolver(resolver) => change_record_body(
                DnsRecordKind::NextResolver,
                Some(next_resolver_value(resolver)?),
            ),
            DnsRecordChange::Delete(kind) => delete_record_body(*kind),
        }
    }

    /// Wrap the change in a message to the domain item at `resolver`.
    pub fn into_message(self, resolver: &str) -> OpsResult<OperationMessage> {
        let resolver = Destination::parse(resolver).map_err(|_| OpsError::InvalidResolverAddress)?;
        let body = self.body()?;
        debug!("Encoded {} record change for {}", self.kind(), resolver);
        OperationMessage::new(&resolver, DNS_MANAGER_AMOUNT, &body)
    }
}
