//! Cells, Bags of Cells and addresses for TON DNS tooling.
//!
//! This crate provides the binary building blocks every TON DNS operation
//! is encoded with:
//!
//! - **Cell**: immutable unit of on-chain data (up to 1023 bits, 4 refs)
//! - **CellBuilder**: consuming builder with range-checked stores
//! - **CellSlice**: sequential reader over a cell
//! - **BagOfCells**: canonical serialization of a cell tree
//! - **Address**: workchain + 256-bit hash, raw and friendly text forms
//! - **Dictionary**: `HashmapE 256 ^Cell` keyed by content hashes
//! - **StateInit**: code + data pair and offline address derivation
//! - **AdnlAddress** / **StorageBagId**: fixed 32-byte identifiers
//!
//! # Example
//!
//! ```
//! use tondns_cell::{BagOfCells, CellBuilder};
//!
//! let mut builder = CellBuilder::new();
//! builder.store_u32(0x4eb1f0f9).unwrap();
//! builder.store_u64(0).unwrap();
//! let cell = builder.build().unwrap();
//!
//! let boc = BagOfCells::from_root(cell);
//! let encoded = boc.to_base64().unwrap();
//! let decoded = BagOfCells::deserialize_from_base64(&encoded).unwrap();
//! assert_eq!(decoded.single_root().unwrap().bit_len(), 96);
//! ```

use sha2::{Digest, Sha256};
use thiserror::Error;

mod address;
mod boc;
mod builder;
mod cell;
mod dict;
mod ids;
mod slice;
mod state_init;

pub use address::{Address, AddressFlavor, FriendlyAddress};
pub use boc::BagOfCells;
pub use builder::CellBuilder;
pub use cell::{Cell, DEPTH_BYTES, HASH_BYTES};
pub use dict::{content_hash, Dictionary, DICT_KEY_BITS};
pub use ids::{AdnlAddress, StorageBagId};
pub use slice::CellSlice;
pub use state_init::{derive_address, StateInit};

/// Errors that can occur while building, reading or serializing cells.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CellError {
    /// The cell data exceeds the maximum of 1023 bits.
    #[error("Cell data too long: {0} bits (max 1023)")]
    DataTooLong(usize),

    /// The cell has too many references (max 4).
    #[error("Too many cell references: {0} (max 4)")]
    TooManyRefs(usize),

    /// A value does not fit the requested bit width.
    #[error("Value {value} does not fit in {bits} bits")]
    ValueOutOfRange { value: String, bits: usize },

    /// Invalid BoC format.
    #[error("Invalid BoC format: {0}")]
    InvalidBoc(String),

    /// Cell not found in BoC.
    #[error("Cell not found: index {0}")]
    CellNotFound(usize),

    /// CRC32 checksum mismatch.
    #[error("CRC32 mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    CrcMismatch { expected: u32, actual: u32 },

    /// Unexpected end of data.
    #[error("Unexpected end of data")]
    UnexpectedEof,

    /// Not enough bits available.
    #[error("Not enough bits: need {need}, have {have}")]
    NotEnoughBits { need: usize, have: usize },

    /// Not enough references available.
    #[error("Not enough refs: need {need}, have {have}")]
    NotEnoughRefs { need: usize, have: usize },

    /// Invalid address format.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid fixed-size identifier (ADNL address, bag id).
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Invalid base64 encoding.
    #[error("Invalid base64: {0}")]
    InvalidBase64(String),

    /// Invalid UTF-8 in a string tail.
    #[error("Invalid UTF-8 string: {0}")]
    InvalidString(String),

    /// Expected single root but found multiple or none.
    #[error("Expected single root, found {0}")]
    NotSingleRoot(usize),

    /// Exotic cells are not supported.
    #[error("Invalid cell type: {0}")]
    InvalidCellType(u8),

    /// Invalid bit length.
    #[error("Invalid bit length: {0}")]
    InvalidBitLength(usize),

    /// Malformed dictionary structure.
    #[error("Invalid dictionary: {0}")]
    InvalidDictionary(String),
}

/// Result type for cell operations.
pub type CellResult<T> = Result<T, CellError>;

/// Maximum number of bits in a cell's data.
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of references a cell can have.
pub const MAX_CELL_REFS: usize = 4;

/// Maximum number of whole bytes in a cell (1023 bits).
pub const MAX_CELL_BYTES: usize = MAX_CELL_BITS / 8;

/// BoC magic number for generic BoC.
pub const BOC_GENERIC_MAGIC: u32 = 0xb5ee9c72;

/// BoC magic number for indexed BoC.
pub const BOC_INDEXED_MAGIC: u32 = 0x68ff65f3;

/// BoC magic number for indexed CRC32 BoC.
pub const BOC_INDEXED_CRC32_MAGIC: u32 = 0xacc3a728;

/// Compute SHA256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute CRC32-C checksum (Castagnoli polynomial).
fn crc32c(data: &[u8]) -> u32 {
    const CRC32C: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);
    CRC32C.checksum(data)
}

/// Compute CRC16-XMODEM checksum, as used by friendly addresses.
fn crc16_xmodem(data: &[u8]) -> u16 {
    const CRC16: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_XMODEM);
    CRC16.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_constants() {
        assert_eq!(MAX_CELL_BITS, 1023);
        assert_eq!(MAX_CELL_REFS, 4);
        assert_eq!(MAX_CELL_BYTES, 127);
        assert_eq!(BOC_GENERIC_MAGIC, 0xb5ee9c72);
    }

    #[test]
    fn test_sha256() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_crc16_xmodem() {
        assert_eq!(crc16_xmodem(b"123456789"), 0x31C3);
    }

    #[test]
    fn test_crc32c() {
        assert_eq!(crc32c(b"123456789"), 0xE3069283);
    }

    #[test]
    fn test_empty_cell_hash() {
        let cell = CellBuilder::new().build().unwrap();
        assert_eq!(
            hex::encode(cell.hash()),
            "96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7"
        );
    }

    #[test]
    fn test_cell_tree_roundtrip() {
        let mut leaf = CellBuilder::new();
        leaf.store_string_tail("example").unwrap();
        let leaf = Arc::new(leaf.build().unwrap());

        let mut root = CellBuilder::new();
        root.store_u32(1).unwrap();
        root.store_ref(leaf.clone()).unwrap();
        root.store_ref(leaf).unwrap();
        let root = root.build().unwrap();

        let bytes = BagOfCells::from_root(root.clone()).serialize().unwrap();
        let parsed = BagOfCells::deserialize(&bytes).unwrap();
        let parsed_root = parsed.single_root().unwrap();

        assert_eq!(parsed_root.hash(), root.hash());
        assert_eq!(parsed_root.reference_count(), 2);
        assert_eq!(parsed_root.depth(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = CellError::ValueOutOfRange {
            value: "256".to_string(),
            bits: 8,
        };
        assert_eq!(err.to_string(), "Value 256 does not fit in 8 bits");

        let err = CellError::TooManyRefs(5);
        assert_eq!(err.to_string(), "Too many cell references: 5 (max 4)");
    }
}
