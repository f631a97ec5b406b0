//! `HashmapE 256 ^Cell` dictionaries.
//!
//! Keys are 256-bit values (content hashes of attribute names or record
//! categories) and every value is stored behind a reference. The tree is a
//! binary Patricia trie: each edge carries a label with the common prefix of
//! the keys beneath it, then either the value reference (leaf) or two child
//! edges (fork).
//!
//! Labels are encoded in whichever of the three forms is shortest:
//!
//! ```text
//! hml_short$0  unary(len) bits        2 + 2*len
//! hml_long$10  len:#<=m bits          2 + bits(m) + len
//! hml_same$11  bit len:#<=m           3 + bits(m)
//! ```
//!
//! Ties prefer short over long and long over same, so the same dictionary
//! always serializes to the same root hash.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{sha256, Cell, CellBuilder, CellError, CellResult, CellSlice};

/// Key width of every dictionary built here.
pub const DICT_KEY_BITS: usize = 256;

/// SHA-256 of a UTF-8 attribute or category name, as used for dictionary keys.
pub fn content_hash(name: &str) -> [u8; 32] {
    sha256(name.as_bytes())
}

/// A dictionary from 256-bit keys to cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: BTreeMap<[u8; 32], Arc<Cell>>,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn set(&mut self, key: [u8; 32], value: Arc<Cell>) -> Option<Arc<Cell>> {
        self.entries.insert(key, value)
    }

    /// Look up a value.
    pub fn get(&self, key: &[u8; 32]) -> Option<&Arc<Cell>> {
        self.entries.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8; 32], &Arc<Cell>)> {
        self.entries.iter()
    }

    /// Build the root edge cell, or `None` for an empty dictionary.
    pub fn build_root(&self) -> CellResult<Option<Cell>> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let entries: Vec<_> = self.entries.iter().collect();
        build_edge(&entries, 0).map(Some)
    }

    /// Parse a dictionary from its root edge cell.
    pub fn load(root: &Cell) -> CellResult<Self> {
        let mut dict = Self::new();
        let mut prefix = Vec::with_capacity(DICT_KEY_BITS);
        load_edge(root, &mut prefix, &mut dict)?;
        Ok(dict)
    }

    /// Parse a `HashmapE` field: a presence bit and, when set, a reference
    /// to the root edge.
    pub fn load_from(slice: &mut CellSlice<'_>) -> CellResult<Self> {
        match slice.load_maybe_ref()? {
            Some(root) => Self::load(root),
            None => Ok(Self::new()),
        }
    }
}

fn key_bit(key: &[u8; 32], index: usize) -> bool {
    (key[index / 8] >> (7 - index % 8)) & 1 == 1
}

/// Minimum number of bits able to hold values `0..=m`.
fn len_bits(m: usize) -> usize {
    (usize::BITS - m.leading_zeros()) as usize
}

fn build_edge(entries: &[(&[u8; 32], &Arc<Cell>)], offset: usize) -> CellResult<Cell> {
    let remaining = DICT_KEY_BITS - offset;
    let (first, _) = entries[0];
    let (last, _) = entries[entries.len() - 1];

    let mut prefix_len = 0;
    while prefix_len < remaining && key_bit(first, offset + prefix_len) == key_bit(last, offset + prefix_len) {
        prefix_len += 1;
    }

    let label: Vec<bool> = (offset..offset + prefix_len).map(|i| key_bit(first, i)).collect();
    let mut builder = CellBuilder::new();
    store_label(&mut builder, &label, remaining)?;

    if prefix_len == remaining {
        if entries.len() != 1 {
            return Err(CellError::InvalidDictionary("duplicate key".to_string()));
        }
        builder.store_ref(entries[0].1.clone())?;
        return builder.build();
    }

    let split_at = offset + prefix_len;
    let pivot = entries.partition_point(|(key, _)| !key_bit(key, split_at));
    let left = build_edge(&entries[..pivot], split_at + 1)?;
    let right = build_edge(&entries[pivot..], split_at + 1)?;
    builder.store_ref(Arc::new(left))?;
    builder.store_ref(Arc::new(right))?;
    builder.build()
}

fn store_label(builder: &mut CellBuilder, label: &[bool], max_len: usize) -> CellResult<()> {
    let len = label.len();
    let width = len_bits(max_len);

    let short = 2 + 2 * len;
    let long = 2 + width + len;
    let same = 3 + width;
    let uniform = label.windows(2).all(|w| w[0] == w[1]);

    if short <= long && (!uniform || short <= same) {
        builder.store_bit(false)?;
        for _ in 0..len {
            builder.store_bit(true)?;
        }
        builder.store_bit(false)?;
        builder.store_bits(label)?;
    } else if !uniform || long <= same {
        builder.store_bit(true)?;
        builder.store_bit(false)?;
        builder.store_uint(len as u64, width)?;
        builder.store_bits(label)?;
    } else {
        builder.store_bit(true)?;
        builder.store_bit(true)?;
        builder.store_bit(label.first().copied().unwrap_or(false))?;
        builder.store_uint(len as u64, width)?;
    }
    Ok(())
}

fn load_label(slice: &mut CellSlice<'_>, max_len: usize) -> CellResult<Vec<bool>> {
    let width = len_bits(max_len);

    let label = if !slice.load_bit()? {
        let mut len = 0;
        while slice.load_bit()? {
            len += 1;
        }
        check_label_len(len, max_len)?;
        (0..len).map(|_| slice.load_bit()).collect::<CellResult<Vec<_>>>()?
    } else if !slice.load_bit()? {
        let len = slice.load_uint(width)? as usize;
        check_label_len(len, max_len)?;
        (0..len).map(|_| slice.load_bit()).collect::<CellResult<Vec<_>>>()?
    } else {
        let bit = slice.load_bit()?;
        let len = slice.load_uint(width)? as usize;
        check_label_len(len, max_len)?;
        vec![bit; len]
    };

    Ok(label)
}

fn check_label_len(len: usize, max_len: usize) -> CellResult<()> {
    if len > max_len {
        return Err(CellError::InvalidDictionary(format!(
            "label of {} bits exceeds remaining key length {}",
            len, max_len
        )));
    }
    Ok(())
}

fn load_edge(cell: &Cell, prefix: &mut Vec<bool>, dict: &mut Dictionary) -> CellResult<()> {
    let remaining = DICT_KEY_BITS - prefix.len();
    let mut slice = CellSlice::new(cell);
    let label = load_label(&mut slice, remaining)?;
    let depth = prefix.len();
    prefix.extend_from_slice(&label);

    if prefix.len() == DICT_KEY_BITS {
        let value = slice.load_ref()?.clone();
        dict.set(bits_to_key(prefix), value);
    } else {
        let left = slice.load_ref()?;
        let right = slice.load_ref()?;
        for (bit, child) in [(false, left), (true, right)] {
            prefix.push(bit);
            load_edge(child, prefix, dict)?;
            prefix.pop();
        }
    }

    prefix.truncate(depth);
    Ok(())
}

fn bits_to_key(bits: &[bool]) -> [u8; 32] {
    let mut key = [0u8; 32];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            key[i / 8] |= 1 << (7 - i % 8);
        }
    }
    key
}
