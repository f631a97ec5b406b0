//! CellBuilder for constructing cells.
//!
//! Every store is checked before anything is written: a value that does not
//! fit its bit width, or that would overflow the 1023-bit / 4-ref capacity,
//! fails and leaves the builder untouched. `build()` consumes the builder, so
//! a finalized cell can never be mutated through it.

use std::sync::Arc;

use crate::{
    Address, Cell, CellError, CellResult, Dictionary, MAX_CELL_BITS, MAX_CELL_BYTES, MAX_CELL_REFS,
};

/// Builder for constructing cells.
///
/// # Example
///
/// ```
/// use tondns_cell::CellBuilder;
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(0x12345678).unwrap();
/// builder.store_bytes(&[1, 2, 3, 4]).unwrap();
/// let cell = builder.build().unwrap();
/// assert_eq!(cell.bit_len(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct CellBuilder {
    /// Data buffer.
    data: Vec<u8>,
    /// Current bit position within the buffer.
    bit_len: usize,
    /// References to other cells.
    references: Vec<Arc<Cell>>,
}

impl CellBuilder {
    /// Create a new empty CellBuilder.
    pub fn new() -> Self {
        CellBuilder {
            data: Vec::with_capacity(128),
            bit_len: 0,
            references: Vec::new(),
        }
    }

    fn ensure_bits(&self, bits: usize) -> CellResult<()> {
        if self.bit_len + bits > MAX_CELL_BITS {
            return Err(CellError::DataTooLong(self.bit_len + bits));
        }
        Ok(())
    }

    fn ensure_refs(&self, refs: usize) -> CellResult<()> {
        if self.references.len() + refs > MAX_CELL_REFS {
            return Err(CellError::TooManyRefs(self.references.len() + refs));
        }
        Ok(())
    }

    /// Append a bit without capacity checks; callers check first.
    fn push_bit(&mut self, bit: bool) {
        let byte_index = self.bit_len / 8;
        if byte_index >= self.data.len() {
            self.data.push(0);
        }
        if bit {
            self.data[byte_index] |= 1 << (7 - self.bit_len % 8);
        }
        self.bit_len += 1;
    }

    /// Store a single bit.
    pub fn store_bit(&mut self, bit: bool) -> CellResult<&mut Self> {
        self.ensure_bits(1)?;
        self.push_bit(bit);
        Ok(self)
    }

    /// Store multiple bits.
    pub fn store_bits(&mut self, bits: &[bool]) -> CellResult<&mut Self> {
        self.ensure_bits(bits.len())?;
        for &bit in bits {
            self.push_bit(bit);
        }
        Ok(self)
    }

    /// Store an unsigned 8-bit integer.
    pub fn store_u8(&mut self, value: u8) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 8)
    }

    /// Store an unsigned 16-bit integer (big-endian).
    pub fn store_u16(&mut self, value: u16) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 16)
    }

    /// Store an unsigned 32-bit integer (big-endian).
    pub fn store_u32(&mut self, value: u32) -> CellResult<&mut Self> {
        self.store_uint(value as u64, 32)
    }

    /// Store an unsigned 64-bit integer (big-endian).
    pub fn store_u64(&mut self, value: u64) -> CellResult<&mut Self> {
        self.store_uint(value, 64)
    }

    /// Store a signed 8-bit integer.
    pub fn store_i8(&mut self, value: i8) -> CellResult<&mut Self> {
        self.store_int(value as i64, 8)
    }

    /// Store an unsigned integer with a specific bit width.
    ///
    /// Fails with `ValueOutOfRange` if `value >= 2^bits`.
    pub fn store_uint(&mut self, value: u64, bits: usize) -> CellResult<&mut Self> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        if bits < 64 && value >> bits != 0 {
            return Err(CellError::ValueOutOfRange {
                value: value.to_string(),
                bits,
            });
        }
        self.ensure_bits(bits)?;

        for i in (0..bits).rev() {
            self.push_bit((value >> i) & 1 == 1);
        }
        Ok(self)
    }

    /// Store a signed integer with a specific bit width (two's complement).
    ///
    /// Fails with `ValueOutOfRange` unless `-2^(bits-1) <= value < 2^(bits-1)`.
    pub fn store_int(&mut self, value: i64, bits: usize) -> CellResult<&mut Self> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        let fits = match bits {
            0 => value == 0,
            64 => true,
            _ => {
                let bound = 1i64 << (bits - 1);
                (-bound..bound).contains(&value)
            }
        };
        if !fits {
            return Err(CellError::ValueOutOfRange {
                value: value.to_string(),
                bits,
            });
        }
        self.ensure_bits(bits)?;

        let unsigned = value as u64;
        for i in (0..bits).rev() {
            self.push_bit((unsigned >> i) & 1 == 1);
        }
        Ok(self)
    }

    /// Store a big-endian unsigned integer given as bytes, in `bits` bits.
    ///
    /// Used for integers wider than 64 bits, such as 256-bit record keys.
    pub fn store_uint_bytes(&mut self, value: &[u8], bits: usize) -> CellResult<&mut Self> {
        let total = value.len() * 8;
        let significant = value
            .iter()
            .position(|&b| b != 0)
            .map_or(0, |i| total - i * 8 - value[i].leading_zeros() as usize);
        if significant > bits {
            return Err(CellError::ValueOutOfRange {
                value: format!("0x{}", hex::encode(value)),
                bits,
            });
        }
        self.ensure_bits(bits)?;

        for i in (0..bits).rev() {
            let bit = i < total && (value[value.len() - 1 - i / 8] >> (i % 8)) & 1 == 1;
            self.push_bit(bit);
        }
        Ok(self)
    }

    /// Store a byte array (storeBuffer).
    pub fn store_bytes(&mut self, bytes: &[u8]) -> CellResult<&mut Self> {
        self.ensure_bits(bytes.len() * 8)?;
        if self.bit_len.is_multiple_of(8) {
            self.data.truncate(self.bit_len / 8);
            self.data.extend_from_slice(bytes);
            self.bit_len += bytes.len() * 8;
        } else {
            for &byte in bytes {
                for i in (0..8).rev() {
                    self.push_bit((byte >> i) & 1 == 1);
                }
            }
        }
        Ok(self)
    }

    /// Store a reference to another cell.
    pub fn store_ref(&mut self, cell: Arc<Cell>) -> CellResult<&mut Self> {
        self.ensure_refs(1)?;
        self.references.push(cell);
        Ok(self)
    }

    /// Store `Maybe ^Cell`: a presence bit, then the reference if present.
    pub fn store_maybe_ref(&mut self, cell: Option<Arc<Cell>>) -> CellResult<&mut Self> {
        match cell {
            Some(cell) => {
                self.ensure_bits(1)?;
                self.ensure_refs(1)?;
                self.push_bit(true);
                self.references.push(cell);
                Ok(self)
            }
            None => self.store_bit(false),
        }
    }

    /// Store an internal address as `addr_std$10 anycast:nothing workchain:int8 hash:bits256`.
    pub fn store_address(&mut self, address: &Address) -> CellResult<&mut Self> {
        self.ensure_bits(Address::BIT_LEN)?;
        self.push_bit(true);
        self.push_bit(false);
        self.push_bit(false);
        self.store_i8(address.workchain)?;
        self.store_bytes(&address.hash)
    }

    /// Store a UTF-8 string as a snake string.
    ///
    /// As many whole bytes as fit go into this builder; the remainder is
    /// chained through child cells of up to 127 bytes each, linked by their
    /// single reference.
    pub fn store_string_tail(&mut self, value: &str) -> CellResult<&mut Self> {
        let bytes = value.as_bytes();
        let head_len = bytes.len().min(self.bits_left() / 8);
        let (head, rest) = bytes.split_at(head_len);

        if rest.is_empty() {
            return self.store_bytes(head);
        }

        self.ensure_refs(1)?;
        let tail = snake_chain(rest)?;
        self.store_bytes(head)?;
        self.store_ref(tail)
    }

    /// Store a `HashmapE` dictionary: `0` when empty, otherwise `1` and a
    /// reference to the root edge.
    pub fn store_dict(&mut self, dict: &Dictionary) -> CellResult<&mut Self> {
        let root = dict.build_root()?.map(Arc::new);
        self.store_maybe_ref(root)
    }

    /// Get the number of bits that can still be stored.
    pub fn bits_left(&self) -> usize {
        MAX_CELL_BITS - self.bit_len
    }

    /// Get the number of references that can still be added.
    pub fn refs_left(&self) -> usize {
        MAX_CELL_REFS - self.references.len()
    }

    /// Get the current number of bits stored.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Get the current number of references.
    pub fn ref_count(&self) -> usize {
        self.references.len()
    }

    /// Build the cell, consuming the builder.
    pub fn build(self) -> CellResult<Cell> {
        Ok(Cell::new(self.data, self.bit_len, self.references))
    }
}

impl Default for CellBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a chain of full cells holding `bytes`, last chunk first.
fn snake_chain(bytes: &[u8]) -> CellResult<Arc<Cell>> {
    let mut next: Option<Arc<Cell>> = None;
    for chunk in bytes.chunks(MAX_CELL_BYTES).rev() {
        let mut builder = CellBuilder::new();
        builder.store_bytes(chunk)?;
        if let Some(child) = next.take() {
            builder.store_ref(child)?;
        }
        next = Some(Arc::new(builder.build()?));
    }
    next.ok_or(CellError::UnexpectedEof)
}
