//! toncenter v3 response shapes and their display summaries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Subtitle shown for collections.
pub const COLLECTION_SUBTITLE: &str = "NFT Collection";

/// Title used when an item carries neither a domain nor a metadata name.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Display card for an NFT item or collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftSummary {
    pub title: String,
    pub image: String,
    pub subtitle: String,
    pub owner_address: String,
}

/// Body of `POST runGetMethod`.
#[derive(Debug, Clone, Serialize)]
pub struct RunGetMethodRequest<'a> {
    pub address: &'a str,
    pub method: &'a str,
    pub stack: &'a [serde_json::Value],
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunGetMethodResponse {
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub gas_used: Option<i64>,
    #[serde(default)]
    pub stack: Vec<serde_json::Value>,
}

/// Outcome of a get-method call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunGetMethodResult {
    pub exit_code: Option<i32>,

    /// `dnsresolve` called with an empty stack underflows with exit code 2,
    /// which proves the method exists.
    pub available: bool,
}

impl From<&RunGetMethodResponse> for RunGetMethodResult {
    fn from(response: &RunGetMethodResponse) -> Self {
        Self {
            exit_code: response.exit_code,
            available: response.exit_code == Some(2),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenInfo {
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressMetadata {
    #[serde(default)]
    pub token_info: Vec<TokenInfo>,
}

/// Indexer metadata, keyed by raw address.
pub type MetadataMap = HashMap<String, AddressMetadata>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemContent {
    pub domain: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemCollectionRef {
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NftItemEntry {
    pub address: String,
    pub owner_address: Option<String>,
    #[serde(default)]
    pub collection: Option<ItemCollectionRef>,
    #[serde(default)]
    pub content: Option<ItemContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NftItemsResponse {
    #[serde(default)]
    pub nft_items: Vec<NftItemEntry>,
    #[serde(default)]
    pub metadata: MetadataMap,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionContentEntry {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NftCollectionEntry {
    pub address: String,
    pub owner_address: Option<String>,
    #[serde(default)]
    pub collection_content: Option<CollectionContentEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NftCollectionsResponse {
    #[serde(default)]
    pub nft_collections: Vec<NftCollectionEntry>,
    #[serde(default)]
    pub metadata: MetadataMap,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountStateEntry {
    pub address: Option<String>,
    pub code_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountStatesResponse {
    #[serde(default)]
    pub accounts: Vec<AccountStateEntry>,
}

impl AccountStatesResponse {
    /// Code hash of the first account, if any.
    pub fn first_code_hash(&self) -> Option<String> {
        self.accounts
            .first()
            .and_then(|account| non_empty(account.code_hash.as_deref()))
            .map(str::to_string)
    }
}

/// Treat empty strings like missing values.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn first_token_info<'a>(metadata: &'a MetadataMap, address: Option<&str>) -> Option<&'a TokenInfo> {
    address
        .and_then(|addr| metadata.get(addr))
        .and_then(|meta| meta.token_info.first())
}

/// Fields shared by plain and domain item lookups.
struct ItemParts<'a> {
    item: &'a NftItemEntry,
    item_meta: Option<&'a TokenInfo>,
    collection_meta: Option<&'a TokenInfo>,
}

impl<'a> ItemParts<'a> {
    fn new(response: &'a NftItemsResponse) -> Option<Self> {
        let item = response.nft_items.first()?;
        let collection_address = item.collection.as_ref().and_then(|c| c.address.as_deref());
        Some(Self {
            item,
            item_meta: first_token_info(&response.metadata, Some(item.address.as_str())),
            collection_meta: first_token_info(&response.metadata, collection_address),
        })
    }

    fn domain(&self) -> Option<&'a str> {
        non_empty(self.item.content.as_ref().and_then(|c| c.domain.as_deref()))
    }

    fn summary(&self, title: String) -> NftSummary {
        let content_image = self.item.content.as_ref().and_then(|c| c.image.as_deref());
        let image = non_empty(content_image)
            .or_else(|| non_empty(self.item_meta.and_then(|m| m.image.as_deref())))
            .unwrap_or_default();
        let subtitle = non_empty(self.collection_meta.and_then(|m| m.name.as_deref())).unwrap_or_default();

        NftSummary {
            title,
            image: image.to_string(),
            subtitle: subtitle.to_string(),
            owner_address: self.item.owner_address.clone().unwrap_or_default(),
        }
    }
}

impl NftItemsResponse {
    /// Summary of the first item, for a generic NFT lookup.
    pub fn item_summary(&self) -> Option<NftSummary> {
        let parts = ItemParts::new(self)?;
        let title = parts
            .domain()
            .or_else(|| non_empty(parts.item_meta.and_then(|m| m.name.as_deref())))
            .unwrap_or(UNKNOWN_TITLE)
            .to_string();
        Some(parts.summary(title))
    }

    /// Summary of the first item, for a lookup inside the `.ton` collection.
    ///
    /// The title is the bare domain label, or empty when the item has none.
    pub fn domain_summary(&self) -> Option<NftSummary> {
        let parts = ItemParts::new(self)?;
        let title = parts
            .domain()
            .map(|domain| domain.strip_suffix(".ton").unwrap_or(domain))
            .unwrap_or_default()
            .to_string();
        Some(parts.summary(title))
    }
}

impl NftCollectionsResponse {
    pub fn collection_summary(&self) -> Option<NftSummary> {
        let collection = self.nft_collections.first()?;
        let meta = first_token_info(&self.metadata, Some(collection.address.as_str()));

        let title = non_empty(meta.and_then(|m| m.name.as_deref()))
            .or_else(|| non_empty(collection.collection_content.as_ref().and_then(|c| c.name.as_deref())))
            .unwrap_or_default();
        let image = non_empty(meta.and_then(|m| m.image.as_deref())).unwrap_or_default();

        Some(NftSummary {
            title: title.to_string(),
            image: image.to_string(),
            subtitle: COLLECTION_SUBTITLE.to_string(),
            owner_address: collection.owner_address.clone().unwrap_or_default(),
        })
    }
}
