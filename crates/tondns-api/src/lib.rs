//! Read access to the TON indexer for DNS management.
//!
//! Domain operations are check-then-act: before a message is built, the
//! caller confirms on-chain state through the toncenter v3 API.
//!
//! - [`ReadApi`]: the read queries an operation needs, with
//!   [`ToncenterClient`] as the HTTP implementation and [`MockReadApi`] for
//!   tests
//! - [`verify`]: ownership, collection, subdomain and resolver checks
//!
//! Rate-limited requests are retried with a fixed backoff, see
//! [`with_rate_limit_retry`].
//!
//! # Example
//!
//! ```
//! use tondns_api::{check_subdomain_available, MockReadApi};
//!
//! let api = MockReadApi::new();
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let free = runtime
//!     .block_on(check_subdomain_available(
//!         &api,
//!         "EQC3dNlesgVD8YbAazcauIrXBPfiVhMMr5YYk2in0Mtsz0Bz",
//!         "shop",
//!     ))
//!     .unwrap();
//! assert!(free);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod types;
pub mod verify;

pub use client::{with_rate_limit_retry, ReadApi, ToncenterClient};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, VerifyError, VerifyResult};
pub use mock::MockReadApi;
pub use types::{NftSummary, RunGetMethodResult};
pub use verify::{
    check_subdomain_available, shorten_address, verify_collection, verify_domain_ownership,
    verify_resolver,
};
