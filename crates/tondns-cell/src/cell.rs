//! Cell implementation.
//!
//! A Cell holds up to 1023 bits of data and up to 4 references to other
//! cells. Only ordinary cells are produced or accepted here, so every cell
//! has level 0 and a single representation hash.

use std::sync::Arc;

use crate::{sha256, BagOfCells, CellResult, MAX_CELL_BITS, MAX_CELL_REFS};

/// Hash size in bytes (SHA256).
pub const HASH_BYTES: usize = 32;

/// Depth size in bytes.
pub const DEPTH_BYTES: usize = 2;

/// An immutable ordinary cell.
///
/// Cells form a DAG where each cell references up to 4 children. The hash
/// commits to the cell's data and to the hashes and depths of its whole
/// subtree, and is computed once when the cell is created.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Raw data bytes (may contain partial byte at the end).
    pub(crate) data: Vec<u8>,
    /// Number of bits stored in data.
    pub(crate) bit_len: usize,
    /// References to child cells.
    pub(crate) references: Vec<Arc<Cell>>,
    hash: [u8; HASH_BYTES],
    depth: u16,
}

impl Cell {
    /// Create a new cell. Called by `CellBuilder::build()` and the BoC parser,
    /// both of which enforce the bit and reference limits.
    pub(crate) fn new(data: Vec<u8>, bit_len: usize, references: Vec<Arc<Cell>>) -> Self {
        debug_assert!(bit_len <= MAX_CELL_BITS);
        debug_assert!(references.len() <= MAX_CELL_REFS);

        let depth = references
            .iter()
            .map(|r| r.depth)
            .max()
            .map_or(0, |d| d.saturating_add(1));

        let mut cell = Cell {
            data,
            bit_len,
            references,
            hash: [0u8; HASH_BYTES],
            depth,
        };
        cell.hash = sha256(&cell.representation());
        cell
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, Vec::new())
    }

    /// The representation hash of this cell.
    pub fn hash(&self) -> [u8; HASH_BYTES] {
        self.hash
    }

    /// Depth of the subtree: 0 for a leaf, otherwise 1 + max child depth.
    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// The byte string the cell hash is computed over.
    ///
    /// `d1 d2 data_with_completion_tag depth(child)* hash(child)*`
    pub fn representation(&self) -> Vec<u8> {
        let mut repr = Vec::with_capacity(
            2 + self.byte_len() + self.references.len() * (DEPTH_BYTES + HASH_BYTES),
        );

        let (d1, d2) = self.descriptors();
        repr.push(d1);
        repr.push(d2);
        repr.extend_from_slice(&self.data_with_completion_tag());

        for reference in &self.references {
            repr.extend_from_slice(&reference.depth.to_be_bytes());
        }
        for reference in &self.references {
            repr.extend_from_slice(&reference.hash);
        }

        repr
    }

    /// Get the descriptor bytes (d1, d2).
    ///
    /// d1 = refs_count (ordinary cell, level 0)
    /// d2 = ceil(bit_len / 8) + floor(bit_len / 8)
    pub fn descriptors(&self) -> (u8, u8) {
        let d1 = self.references.len() as u8;
        let d2 = (self.bit_len.div_ceil(8) + self.bit_len / 8) as u8;
        (d1, d2)
    }

    /// Get data with completion tag.
    ///
    /// If bit_len is not byte-aligned, the bit after the last data bit is
    /// set to 1 and the rest of the byte stays 0.
    pub fn data_with_completion_tag(&self) -> Vec<u8> {
        let mut result = self.data[..self.byte_len()].to_vec();
        let remainder = self.bit_len % 8;
        if remainder != 0
            && let Some(last) = result.last_mut()
        {
            *last |= 1 << (7 - remainder);
        }
        result
    }

    /// Get the raw data bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the number of bits in this cell.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Get the number of bytes needed to store the data (rounded up).
    pub fn byte_len(&self) -> usize {
        self.bit_len.div_ceil(8)
    }

    /// Get all references to child cells.
    pub fn references(&self) -> &[Arc<Cell>] {
        &self.references
    }

    /// Get a reference by index.
    pub fn reference(&self, index: usize) -> Option<&Arc<Cell>> {
        self.references.get(index)
    }

    /// Get the number of references.
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Get a specific bit from the cell data.
    pub fn get_bit(&self, index: usize) -> Option<bool> {
        if index >= self.bit_len {
            return None;
        }
        Some((self.data[index / 8] >> (7 - index % 8)) & 1 == 1)
    }

    /// Serialize this cell as a single-root BoC.
    pub fn to_boc(&self) -> CellResult<Vec<u8>> {
        BagOfCells::from_root(self.clone()).serialize()
    }

    /// Serialize this cell as a base64 single-root BoC.
    pub fn to_boc_base64(&self) -> CellResult<String> {
        BagOfCells::from_root(self.clone()).to_base64()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cell() {
        let cell = Cell::empty();
        assert_eq!(cell.bit_len(), 0);
        assert_eq!(cell.reference_count(), 0);
        assert_eq!(cell.depth(), 0);
        assert_eq!(cell.descriptors(), (0, 0));
    }

    #[test]
    fn test_cell_descriptors() {
        let cell = Cell::new(vec![0xFF], 8, vec![]);
        assert_eq!(cell.descriptors(), (0, 2));

        let cell = Cell::new(vec![0b11111000], 5, vec![]);
        assert_eq!(cell.descriptors(), (0, 1));

        let child = Arc::new(Cell::empty());
        let cell = Cell::new(vec![], 0, vec![child.clone(), child]);
        assert_eq!(cell.descriptors(), (2, 0));
    }

    #[test]
    fn test_data_with_completion_tag() {
        let cell = Cell::new(vec![0xFF], 8, vec![]);
        assert_eq!(cell.data_with_completion_tag(), vec![0xFF]);

        // 11111 + tag 1 + 00
        let cell = Cell::new(vec![0b11111000], 5, vec![]);
        assert_eq!(cell.data_with_completion_tag(), vec![0b11111100]);
    }

    #[test]
    fn test_depth_calculation() {
        let cell0 = Cell::empty();
        assert_eq!(cell0.depth(), 0);

        let cell1 = Cell::new(vec![], 0, vec![Arc::new(cell0.clone())]);
        assert_eq!(cell1.depth(), 1);

        let cell2 = Cell::new(vec![], 0, vec![Arc::new(cell0), Arc::new(cell1)]);
        assert_eq!(cell2.depth(), 2);
    }

    #[test]
    fn test_representation_includes_children() {
        let child = Arc::new(Cell::new(vec![0xAB], 8, vec![]));
        let parent = Cell::new(vec![], 0, vec![child.clone()]);

        let repr = parent.representation();
        assert_eq!(repr.len(), 2 + DEPTH_BYTES + HASH_BYTES);
        assert_eq!(&repr[..2], &[1, 0]);
        assert_eq!(&repr[2..4], &[0, 0]);
        assert_eq!(&repr[4..], &child.hash());
    }

    #[test]
    fn test_equality_by_hash() {
        let a = Cell::new(vec![0x12, 0x34], 16, vec![]);
        let b = Cell::new(vec![0x12, 0x34], 16, vec![]);
        let c = Cell::new(vec![0x12, 0x34], 15, vec![]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
