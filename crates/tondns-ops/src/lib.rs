//! TON DNS operations.
//!
//! Builds the messages a domain owner signs to manage `.ton` domains:
//!
//! - **Record changes**: set or delete the `site`, `storage`, `wallet` and
//!   `dns_next_resolver` records of a domain item
//! - **Collection deploy**: create a subdomain collection for a domain and
//!   point the domain's next resolver at it
//! - **Subdomain mint**: request a new `*.domain.ton` item from a collection
//!
//! Every operation produces [`OperationMessage`]s, which [`submit`] hands to a
//! [`WalletSubmitter`] as one [`TransactionRequest`].
//!
//! # Example
//!
//! ```
//! use tondns_cell::AdnlAddress;
//! use tondns_ops::{DnsRecordChange, DNS_MANAGER_AMOUNT};
//!
//! let adnl = AdnlAddress::from_bytes([0xAB; 32]);
//! let message = DnsRecordChange::SetSite { adnl, is_storage: false }
//!     .into_message("EQC3dNlesgVD8YbAazcauIrXBPfiVhMMr5YYk2in0Mtsz0Bz")
//!     .unwrap();
//! assert_eq!(message.amount, DNS_MANAGER_AMOUNT.to_string());
//! ```

pub mod categories;
pub mod codes;
pub mod collection;
pub mod content;
pub mod error;
pub mod message;
pub mod network;
pub mod opcodes;
pub mod records;
pub mod subdomain;
pub mod wallet;

pub use categories::DnsRecordKind;
pub use codes::COLLECTION_CODE_HASH;
pub use collection::{CollectionData, CollectionDeploy, Royalty, COLLECTION_DEPLOY_AMOUNT};
pub use content::CollectionContent;
pub use error::{OpsError, OpsResult};
pub use message::{Destination, OperationMessage, TransactionRequest, VALID_FOR_SECS};
pub use network::Network;
pub use records::{DnsRecordChange, DNS_MANAGER_AMOUNT};
pub use subdomain::{is_valid_subdomain, item_address, SubdomainMint, SUBDOMAIN_MINT_AMOUNT};
pub use wallet::{submit, RecordingWallet, SubmitError, WalletSubmitter};
