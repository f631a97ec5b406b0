//! In-memory [`ReadApi`] for tests and offline use.

use std::collections::{HashMap, HashSet};

use tondns_cell::Address;

use crate::client::ReadApi;
use crate::error::{ApiError, ApiResult};
use crate::types::{NftSummary, RunGetMethodResult};

/// Mock read API.
///
/// Entries are keyed by parsed [`Address`], so raw and friendly spellings of
/// the same account hit the same entry. Unparseable addresses behave like
/// accounts the indexer does not know.
#[derive(Debug, Default)]
pub struct MockReadApi {
    items: HashMap<Address, NftSummary>,
    domain_items: HashMap<(Address, Address), NftSummary>,
    collections: HashMap<Address, NftSummary>,
    code_hashes: HashMap<Address, String>,
    /// Contracts where `dnsresolve` is available.
    resolvers: HashSet<Address>,
    rate_limited: bool,
}

impl MockReadApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an NFT item.
    pub fn add_item(&mut self, address: Address, summary: NftSummary) {
        self.items.insert(address, summary);
    }

    /// Register an item of `collection`, returned by domain lookups.
    pub fn add_domain_item(&mut self, address: Address, collection: Address, summary: NftSummary) {
        self.domain_items.insert((address, collection), summary);
    }

    /// Register a collection and the code hash of its contract.
    pub fn add_collection(&mut self, address: Address, code_hash: &str, summary: NftSummary) {
        self.collections.insert(address, summary);
        self.code_hashes.insert(address, code_hash.to_string());
    }

    /// Set the code hash of any account.
    pub fn set_code_hash(&mut self, address: Address, code_hash: &str) {
        self.code_hashes.insert(address, code_hash.to_string());
    }

    /// Mark a contract as answering `dnsresolve`.
    pub fn add_resolver(&mut self, address: Address) {
        self.resolvers.insert(address);
    }

    /// Make every call fail with [`ApiError::RateLimited`].
    pub fn set_rate_limited(&mut self, rate_limited: bool) {
        self.rate_limited = rate_limited;
    }

    fn check_rate_limit(&self) -> ApiResult<()> {
        if self.rate_limited {
            Err(ApiError::RateLimited)
        } else {
            Ok(())
        }
    }
}

fn lookup<'a, V>(map: &'a HashMap<Address, V>, address: &str) -> Option<&'a V> {
    Address::parse(address).ok().and_then(|addr| map.get(&addr))
}

#[async_trait::async_trait]
impl ReadApi for MockReadApi {
    async fn run_get_method(
        &self,
        address: &str,
        method: &str,
        _stack: Vec<serde_json::Value>,
    ) -> ApiResult<RunGetMethodResult> {
        self.check_rate_limit()?;

        let known = Address::parse(address)
            .map(|addr| self.resolvers.contains(&addr))
            .unwrap_or(false);
        let available = known && method == "dnsresolve";

        Ok(RunGetMethodResult {
            exit_code: Some(if available { 2 } else { 11 }),
            available,
        })
    }

    async fn nft_item(&self, address: &str) -> ApiResult<Option<NftSummary>> {
        self.check_rate_limit()?;
        Ok(lookup(&self.items, address).cloned())
    }

    async fn nft_domain_item(&self, address: &str, collection: &str) -> ApiResult<Option<NftSummary>> {
        self.check_rate_limit()?;
        let key = match (Address::parse(address), Address::parse(collection)) {
            (Ok(item), Ok(collection)) => (item, collection),
            _ => return Ok(None),
        };
        Ok(self.domain_items.get(&key).cloned())
    }

    async fn nft_collection(&self, address: &str) -> ApiResult<Option<NftSummary>> {
        self.check_rate_limit()?;
        Ok(lookup(&self.collections, address).cloned())
    }

    async fn code_hash(&self, address: &str) -> ApiResult<Option<String>> {
        self.check_rate_limit()?;
        Ok(lookup(&self.code_hashes, address).cloned())
    }
}
