//! toncenter v3 read client.

use std::future::Future;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tondns_ops::Network;
use tracing::{debug, error, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::types::{
    AccountStatesResponse, NftCollectionsResponse, NftItemsResponse, NftSummary,
    RunGetMethodRequest, RunGetMethodResponse, RunGetMethodResult,
};

/// Header carrying the toncenter API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Read-only queries used to gather and check operation parameters.
///
/// Addresses are passed through as the user typed them; the indexer accepts
/// both raw and friendly forms.
#[async_trait::async_trait]
pub trait ReadApi: Send + Sync {
    /// Call a get-method on a contract.
    async fn run_get_method(
        &self,
        address: &str,
        method: &str,
        stack: Vec<serde_json::Value>,
    ) -> ApiResult<RunGetMethodResult>;

    /// Look up any NFT item.
    async fn nft_item(&self, address: &str) -> ApiResult<Option<NftSummary>>;

    /// Look up an item that must belong to `collection`.
    async fn nft_domain_item(&self, address: &str, collection: &str) -> ApiResult<Option<NftSummary>>;

    /// Look up an NFT collection.
    async fn nft_collection(&self, address: &str) -> ApiResult<Option<NftSummary>>;

    /// Base64 code hash of the account, if it is deployed.
    async fn code_hash(&self, address: &str) -> ApiResult<Option<String>>;
}

/// Run `op` again while it reports [`ApiError::RateLimited`].
///
/// Waits `config.retry_backoff` between attempts and gives up after
/// `config.max_retries` attempts. Any other error is returned at once.
pub async fn with_rate_limit_retry<T, F, Fut>(config: &ApiConfig, mut op: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let mut attempts = 0;

    while attempts < config.max_retries {
        match op().await {
            Err(ApiError::RateLimited) => {
                attempts += 1;
                if attempts < config.max_retries {
                    warn!(
                        "Rate limit exceeded, retrying in {} ms (attempt {}/{})",
                        config.retry_backoff.as_millis(),
                        attempts,
                        config.max_retries
                    );
                    tokio::time::sleep(config.retry_backoff).await;
                }
            }
            other => return other,
        }
    }

    error!("API failed after {} attempts", config.max_retries);
    Err(ApiError::RetriesExhausted {
        attempts: config.max_retries,
    })
}

/// [`ReadApi`] over the toncenter v3 HTTP API.
#[derive(Debug, Clone)]
pub struct ToncenterClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ToncenterClient {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Client for the network's public endpoint with default settings.
    pub fn for_network(network: Network) -> ApiResult<Self> {
        Self::new(ApiConfig::for_network(network))
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> ApiResult<T> {
        let url = self.url(endpoint);
        with_rate_limit_retry(&self.config, move || {
            let request = self.http.get(&url).query(query);
            self.send(request)
        })
        .await
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        with_rate_limit_retry(&self.config, move || {
            let request = self.http.post(&url).json(body);
            self.send(request)
        })
        .await
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ApiResult<T> {
        let request = match &self.config.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait::async_trait]
impl ReadApi for ToncenterClient {
    async fn run_get_method(
        &self,
        address: &str,
        method: &str,
        stack: Vec<serde_json::Value>,
    ) -> ApiResult<RunGetMethodResult> {
        let body = RunGetMethodRequest {
            address,
            method,
            stack: &stack,
        };

        match self.post_json::<_, RunGetMethodResponse>("runGetMethod", &body).await {
            Ok(response) => Ok(RunGetMethodResult::from(&response)),
            // toncenter answers uninitialized or unknown accounts with an error status
            Err(ApiError::Status { status, .. }) => {
                debug!("runGetMethod {} on {} failed with status {}", method, address, status);
                Ok(RunGetMethodResult {
                    exit_code: None,
                    available: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn nft_item(&self, address: &str) -> ApiResult<Option<NftSummary>> {
        let response: NftItemsResponse = self
            .get_json("nft/items", &[("address", address), ("limit", "1"), ("offset", "0")])
            .await?;

        let summary = response.item_summary();
        if summary.is_none() {
            debug!("NFT not found for address {}", address);
        }
        Ok(summary)
    }

    async fn nft_domain_item(&self, address: &str, collection: &str) -> ApiResult<Option<NftSummary>> {
        let response: NftItemsResponse = self
            .get_json(
                "nft/items",
                &[
                    ("address", address),
                    ("collection_address", collection),
                    ("limit", "1"),
                    ("offset", "0"),
                ],
            )
            .await?;

        let summary = response.domain_summary();
        if summary.is_none() {
            debug!("Domain item {} not found in {}", address, collection);
        }
        Ok(summary)
    }

    async fn nft_collection(&self, address: &str) -> ApiResult<Option<NftSummary>> {
        let response: NftCollectionsResponse = self
            .get_json(
                "nft/collections",
                &[("collection_address", address), ("limit", "1"), ("offset", "0")],
            )
            .await?;

        let summary = response.collection_summary();
        if summary.is_none() {
            debug!("NFT collection not found: {}", address);
        }
        Ok(summary)
    }

    async fn code_hash(&self, address: &str) -> ApiResult<Option<String>> {
        let response: AccountStatesResponse = self
            .get_json("accountStates", &[("address", address), ("include_boc", "false")])
            .await?;
        Ok(response.first_code_hash())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_config(max_retries: u32) -> ApiConfig {
        ApiConfig::default()
            .with_max_retries(max_retries)
            .with_retry_backoff(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let calls = &AtomicU32::new(0);
        let result = with_rate_limit_retry(&fast_config(5), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(ApiError::RateLimited)
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let calls = &AtomicU32::new(0);
        let result: ApiResult<()> = with_rate_limit_retry(&fast_config(5), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::RateLimited)
        })
        .await;

        assert!(matches!(result, Err(ApiError::RetriesExhausted { attempts: 5 })));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: ApiResult<()> = with_rate_limit_retry(&fast_config(5), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::Status {
                status: 500,
                body: String::new(),
            })
        })
        .await;

        assert!(matches!(result, Err(ApiError::Status { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_client_urls() {
        let client = ToncenterClient::new(ApiConfig::default().with_base_url("http://localhost/api/v3")).unwrap();
        assert_eq!(client.url("runGetMethod"), "http://localhost/api/v3/runGetMethod");

        let client = ToncenterClient::for_network(Network::Testnet).unwrap();
        assert_eq!(
            client.url("accountStates"),
            "https://testnet.toncenter.com/api/v3/accountStates"
        );
    }
}
