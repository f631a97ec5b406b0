//! CellSlice for reading data from cells.
//!
//! A CellSlice reads a cell sequentially, tracking the current position
//! within the cell's data and references.

use std::sync::Arc;

use crate::{Address, Cell, CellError, CellResult};

/// A slice view into a Cell for reading data.
///
/// # Example
///
/// ```
/// use tondns_cell::{CellBuilder, CellSlice};
///
/// let mut builder = CellBuilder::new();
/// builder.store_u32(0x12345678).unwrap();
/// let cell = builder.build().unwrap();
///
/// let mut slice = CellSlice::new(&cell);
/// assert_eq!(slice.load_u32().unwrap(), 0x12345678);
/// ```
#[derive(Debug, Clone)]
pub struct CellSlice<'a> {
    cell: &'a Cell,
    /// Current bit offset within the cell data.
    bit_offset: usize,
    /// Number of bits remaining (from bit_offset).
    bit_len: usize,
    /// Current reference offset.
    ref_offset: usize,
}

impl<'a> CellSlice<'a> {
    /// Create a new slice from a cell.
    pub fn new(cell: &'a Cell) -> Self {
        CellSlice {
            cell,
            bit_offset: 0,
            bit_len: cell.bit_len(),
            ref_offset: 0,
        }
    }

    /// Load a single bit.
    pub fn load_bit(&mut self) -> CellResult<bool> {
        if self.bit_len == 0 {
            return Err(CellError::NotEnoughBits { need: 1, have: 0 });
        }

        let bit = self.get_bit_at(self.bit_offset);
        self.bit_offset += 1;
        self.bit_len -= 1;
        Ok(bit)
    }

    /// Load an unsigned 8-bit integer.
    pub fn load_u8(&mut self) -> CellResult<u8> {
        self.load_uint(8).map(|v| v as u8)
    }

    /// Load an unsigned 16-bit integer (big-endian).
    pub fn load_u16(&mut self) -> CellResult<u16> {
        self.load_uint(16).map(|v| v as u16)
    }

    /// Load an unsigned 32-bit integer (big-endian).
    pub fn load_u32(&mut self) -> CellResult<u32> {
        self.load_uint(32).map(|v| v as u32)
    }

    /// Load an unsigned 64-bit integer (big-endian).
    pub fn load_u64(&mut self) -> CellResult<u64> {
        self.load_uint(64)
    }

    /// Load an unsigned integer with a specific bit width.
    pub fn load_uint(&mut self, bits: usize) -> CellResult<u64> {
        if bits > 64 {
            return Err(CellError::InvalidBitLength(bits));
        }
        self.ensure_bits(bits)?;

        let mut result: u64 = 0;
        for _ in 0..bits {
            result = (result << 1) | (self.load_bit()? as u64);
        }
        Ok(result)
    }

    /// Load a signed integer with a specific bit width (two's complement).
    pub fn load_int(&mut self, bits: usize) -> CellResult<i64> {
        if bits == 0 {
            return Ok(0);
        }

        let unsigned = self.load_uint(bits)?;
        if bits < 64 && unsigned & (1u64 << (bits - 1)) != 0 {
            // sign extend
            Ok((unsigned | !((1u64 << bits) - 1)) as i64)
        } else {
            Ok(unsigned as i64)
        }
    }

    /// Load a byte array.
    pub fn load_bytes(&mut self, count: usize) -> CellResult<Vec<u8>> {
        self.ensure_bits(count * 8)?;
        (0..count).map(|_| self.load_u8()).collect()
    }

    /// Load a fixed 32-byte value (bits256).
    pub fn load_bits256(&mut self) -> CellResult<[u8; 32]> {
        let bytes = self.load_bytes(32)?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    /// Load a reference to another cell.
    pub fn load_ref(&mut self) -> CellResult<&'a Arc<Cell>> {
        let reference = self.cell.reference(self.ref_offset).ok_or(CellError::NotEnoughRefs {
            need: 1,
            have: 0,
        })?;
        self.ref_offset += 1;
        Ok(reference)
    }

    /// Load `Maybe ^Cell`.
    pub fn load_maybe_ref(&mut self) -> CellResult<Option<&'a Arc<Cell>>> {
        if self.load_bit()? {
            self.load_ref().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Load an internal `addr_std` address.
    pub fn load_address(&mut self) -> CellResult<Address> {
        let tag = self.load_uint(2)?;
        if tag != 0b10 {
            return Err(CellError::InvalidAddress(format!(
                "expected addr_std, found tag {:02b}",
                tag
            )));
        }
        if self.load_bit()? {
            return Err(CellError::InvalidAddress("anycast is not supported".to_string()));
        }
        let workchain = self.load_int(8)? as i8;
        let hash = self.load_bits256()?;
        Ok(Address::new(workchain, hash))
    }

    /// Load the rest of a snake string, following the reference chain.
    pub fn load_string_tail(&mut self) -> CellResult<String> {
        let mut bytes = Vec::new();
        self.read_snake_bytes(&mut bytes)?;
        String::from_utf8(bytes).map_err(|e| CellError::InvalidString(e.to_string()))
    }

    fn read_snake_bytes(&mut self, out: &mut Vec<u8>) -> CellResult<()> {
        let mut current = self.clone();
        loop {
            if !current.bit_len.is_multiple_of(8) {
                return Err(CellError::InvalidString(format!(
                    "{} bits is not a whole number of bytes",
                    current.bit_len
                )));
            }
            out.extend(current.load_bytes(current.bit_len / 8)?);
            if current.refs_left() == 0 {
                break;
            }
            current = CellSlice::new(current.load_ref()?);
        }
        self.skip_bits(self.bit_len)?;
        self.ref_offset = self.cell.reference_count();
        Ok(())
    }

    /// Get the number of bits remaining.
    pub fn bits_left(&self) -> usize {
        self.bit_len
    }

    /// Get the number of references remaining.
    pub fn refs_left(&self) -> usize {
        self.cell.reference_count() - self.ref_offset
    }

    /// Skip a number of bits.
    pub fn skip_bits(&mut self, count: usize) -> CellResult<()> {
        self.ensure_bits(count)?;
        self.bit_offset += count;
        self.bit_len -= count;
        Ok(())
    }

    /// Check if the slice is empty (no bits or refs left).
    pub fn is_empty(&self) -> bool {
        self.bit_len == 0 && self.refs_left() == 0
    }

    fn ensure_bits(&self, count: usize) -> CellResult<()> {
        if count > self.bit_len {
            return Err(CellError::NotEnoughBits {
                need: count,
                have: self.bit_len,
            });
        }
        Ok(())
    }

    fn get_bit_at(&self, index: usize) -> bool {
        self.cell.get_bit(index).unwrap_or(false)
    }
}
