//! Message opcodes and record prefixes.
//!
//! | Value | Meaning |
//! |-------|---------|
//! | `0x4eb1f0f9` | change a DNS record on a domain item |
//! | `1` | initialize a freshly deployed collection |
//! | `0` | text comment, used to mint subdomains |
//! | `0xba93` | `dns_next_resolver` record |
//! | `0x9fd3` | `dns_smc_address` record |
//! | `0xad01` | `dns_adnl_address` record |
//! | `0x7473` | `dns_storage_address` record |

/// Operation code of the change-record message.
pub const CHANGE_DNS_RECORD: u32 = 0x4eb1f0f9;

/// Operation code sent with a collection's state init.
pub const DEPLOY_COLLECTION: u32 = 1;

/// Operation code of a plain text comment.
pub const TEXT_COMMENT: u32 = 0;

/// Prefix of a next-resolver record value.
pub const SET_NEXT_RESOLVER: u16 = 0xba93;

/// Prefix of a wallet record value.
pub const SET_WALLET: u16 = 0x9fd3;

/// Prefix of a site (ADNL) record value.
pub const SET_SITE: u16 = 0xad01;

/// Prefix of a storage bag record value.
pub const SET_STORAGE: u16 = 0x7473;
