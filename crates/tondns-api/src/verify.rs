//! Pre-flight checks run before an operation is offered for signing.
//!
//! Each check reads from a [`ReadApi`] and either returns what the UI should
//! display or the reason the operation must not proceed. The wallet and the
//! contracts stay the final authority; these checks only catch mistakes
//! early.

use tondns_cell::Address;
use tondns_ops::content::METADATA_BASE_URL;
use tondns_ops::{item_address, COLLECTION_CODE_HASH};
use tracing::debug;

use crate::client::ReadApi;
use crate::error::{VerifyError, VerifyResult};
use crate::types::NftSummary;

/// Get-method every DNS resolver contract exposes.
pub const DNS_RESOLVE_METHOD: &str = "dnsresolve";

/// Code hashes accepted as subdomain collections.
pub const VALID_COLLECTION_CODE_HASHES: &[&str] = &[COLLECTION_CODE_HASH];

/// `ABCD...WXYZ` form of an address for compact display, or `NULL` when empty.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.is_empty() {
        return "NULL".to_string();
    }

    let head: String = chars.iter().take(4).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}

fn parse_address(text: &str) -> VerifyResult<Address> {
    Address::parse(text.trim()).map_err(|e| VerifyError::InvalidAddress(e.to_string()))
}

/// Compare an indexer owner field with the connected wallet.
fn check_owner(owner_address: &str, owner: &Address) -> VerifyResult<()> {
    if owner_address.is_empty() {
        return Err(VerifyError::OwnerUnknown);
    }
    if parse_address(owner_address)? != *owner {
        return Err(VerifyError::NotOwner);
    }
    Ok(())
}

/// Check that `domain` is an item of the `.ton` collection owned by `owner`.
///
/// On success the summary title is the bare domain label, which is what
/// [`tondns_ops::CollectionDeploy::new`] expects.
pub async fn verify_domain_ownership(
    api: &dyn ReadApi,
    domain: &str,
    dns_collection: &Address,
    owner: &Address,
) -> VerifyResult<NftSummary> {
    let domain = domain.trim();
    let summary = api
        .nft_domain_item(domain, &dns_collection.to_string())
        .await?
        .filter(|item| !item.title.is_empty())
        .ok_or(VerifyError::DomainNotFound)?;

    check_owner(&summary.owner_address, owner)?;
    debug!("Verified ownership of {} ({})", summary.title, domain);
    Ok(summary)
}

/// Check that `collection` is a subdomain collection owned by `owner`.
///
/// The returned summary carries the collection preview image instead of the
/// indexer one.
pub async fn verify_collection(
    api: &dyn ReadApi,
    collection: &str,
    owner: &Address,
) -> VerifyResult<NftSummary> {
    let collection = collection.trim();

    let code_hash = api.code_hash(collection).await?;
    match code_hash.as_deref() {
        Some(hash) if VALID_COLLECTION_CODE_HASHES.contains(&hash) => {}
        other => {
            debug!("Rejecting collection {} with code hash {:?}", collection, other);
            return Err(VerifyError::InvalidCollection);
        }
    }

    let mut summary = api
        .nft_collection(collection)
        .await?
        .ok_or(VerifyError::InvalidCollection)?;

    check_owner(&summary.owner_address, owner)?;

    let label = summary
        .title
        .split(' ')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    summary.image = format!("{}{}.png", METADATA_BASE_URL, label);
    Ok(summary)
}

/// Whether `subdomain` is still free in `collection`.
///
/// The label must pass [`tondns_ops::is_valid_subdomain`]. The item address
/// is derived offline and looked up; an indexed item with a title means the
/// label is taken.
pub async fn check_subdomain_available(
    api: &dyn ReadApi,
    collection: &str,
    subdomain: &str,
) -> VerifyResult<bool> {
    let subdomain = subdomain.trim();
    if !tondns_ops::is_valid_subdomain(subdomain) {
        return Err(VerifyError::InvalidSubdomain(subdomain.to_string()));
    }

    let collection = parse_address(collection)?;
    let item = item_address(&collection, subdomain)?;

    let taken = api
        .nft_item(&item.to_string())
        .await?
        .is_some_and(|summary| !summary.title.is_empty());

    debug!("Subdomain {} at {}: taken = {}", subdomain, item, taken);
    Ok(!taken)
}

/// Check that `resolver` answers `dnsresolve` and describe it for display.
///
/// The display summary comes from the NFT item at that address, then from the
/// collection, then falls back to the shortened address.
pub async fn verify_resolver(api: &dyn ReadApi, resolver: &str) -> VerifyResult<NftSummary> {
    let normalized = parse_address(resolver)?.to_string();

    let result = api
        .run_get_method(&normalized, DNS_RESOLVE_METHOD, Vec::new())
        .await?;
    if !result.available {
        debug!("{} does not answer {}: exit code {:?}", normalized, DNS_RESOLVE_METHOD, result.exit_code);
        return Err(VerifyError::InvalidResolver);
    }

    let titled = |summary: Option<NftSummary>| summary.filter(|s| !s.title.is_empty());

    if let Some(item) = titled(api.nft_item(&normalized).await?) {
        return Ok(item);
    }
    if let Some(collection) = titled(api.nft_collection(&normalized).await?) {
        return Ok(collection);
    }

    Ok(NftSummary {
        title: shorten_address(&normalized),
        image: String::new(),
        subtitle: " ".to_string(),
        owner_address: normalized,
    })
}
