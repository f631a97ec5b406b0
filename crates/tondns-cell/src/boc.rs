//! Bag of Cells (BoC) serialization format.
//!
//! BoC is the standard serialization format for cell trees. Cells are
//! deduplicated by hash and written parent-first, so the root of a
//! single-root bag always has index 0. Serialization is deterministic:
//! the same tree always produces the same bytes.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{
    crc32c, Cell, CellError, CellResult, BOC_GENERIC_MAGIC, BOC_INDEXED_CRC32_MAGIC,
    BOC_INDEXED_MAGIC, DEPTH_BYTES, HASH_BYTES, MAX_CELL_BITS, MAX_CELL_REFS,
};

/// Bag of Cells - a serialized collection of cells.
#[derive(Debug, Clone)]
pub struct BagOfCells {
    /// Root cells.
    roots: Vec<Arc<Cell>>,
}

/// A parsed cell whose references are not resolved yet.
struct RawCell {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<usize>,
    /// Representation hash written by serializers that store hashes.
    stored_hash: Option<[u8; HASH_BYTES]>,
}

impl BagOfCells {
    /// Create a new BoC with the given root cells.
    pub fn new(roots: Vec<Arc<Cell>>) -> Self {
        BagOfCells { roots }
    }

    /// Create a BoC with a single root cell.
    pub fn from_root(root: Cell) -> Self {
        BagOfCells {
            roots: vec![Arc::new(root)],
        }
    }

    /// Get all root cells.
    pub fn roots(&self) -> &[Arc<Cell>] {
        &self.roots
    }

    /// Get a single root cell (errors if not exactly one root).
    pub fn single_root(&self) -> CellResult<&Arc<Cell>> {
        match self.roots.as_slice() {
            [root] => Ok(root),
            roots => Err(CellError::NotSingleRoot(roots.len())),
        }
    }

    /// Serialize the BoC to bytes with a CRC32C trailer and no index.
    pub fn serialize(&self) -> CellResult<Vec<u8>> {
        self.serialize_with_options(true, false)
    }

    /// Serialize with options.
    ///
    /// # Arguments
    /// * `with_crc` - Append a CRC32C checksum
    /// * `with_index` - Include the cell offset index
    pub fn serialize_with_options(&self, with_crc: bool, with_index: bool) -> CellResult<Vec<u8>> {
        if self.roots.is_empty() {
            return Err(CellError::InvalidBoc("No root cells".to_string()));
        }

        let cells = self.collect_cells_parent_first();
        let cell_count = cells.len();

        let hash_to_index: HashMap<[u8; 32], usize> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| (c.hash(), i))
            .collect();

        let size_bytes = Self::bytes_needed(cell_count);

        let mut cell_data: Vec<Vec<u8>> = Vec::with_capacity(cell_count);
        for cell in &cells {
            cell_data.push(Self::serialize_cell(cell, &hash_to_index, size_bytes)?);
        }
        let total_cells_size: usize = cell_data.iter().map(Vec::len).sum();
        let off_bytes = Self::bytes_needed(total_cells_size);

        let mut result = Vec::with_capacity(16 + total_cells_size);
        result.extend_from_slice(&BOC_GENERIC_MAGIC.to_be_bytes());

        // has_idx (bit 7) | has_crc (bit 6) | has_cache_bits (bit 5) | flags (bits 4-3) | size_bytes (bits 2-0)
        let flags: u8 = (if with_index { 1 << 7 } else { 0 })
            | (if with_crc { 1 << 6 } else { 0 })
            | (size_bytes as u8);
        result.push(flags);
        result.push(off_bytes as u8);

        Self::write_uint(&mut result, cell_count as u64, size_bytes);
        Self::write_uint(&mut result, self.roots.len() as u64, size_bytes);
        // absent cells
        Self::write_uint(&mut result, 0, size_bytes);
        Self::write_uint(&mut result, total_cells_size as u64, off_bytes);

        for root in &self.roots {
            let idx = hash_to_index
                .get(&root.hash())
                .ok_or_else(|| CellError::InvalidBoc("Root not found".to_string()))?;
            Self::write_uint(&mut result, *idx as u64, size_bytes);
        }

        if with_index {
            let mut offset = 0usize;
            for data in &cell_data {
                offset += data.len();
                Self::write_uint(&mut result, offset as u64, off_bytes);
            }
        }

        for data in cell_data {
            result.extend_from_slice(&data);
        }

        if with_crc {
            let crc = crc32c(&result);
            result.extend_from_slice(&crc.to_le_bytes());
        }

        Ok(result)
    }

    /// Serialize to a standard base64 string.
    pub fn to_base64(&self) -> CellResult<String> {
        Ok(STANDARD.encode(self.serialize()?))
    }

    /// Deserialize from bytes.
    ///
    /// Supports all three BoC formats:
    /// - `0xb5ee9c72` - Generic BoC (serialized_boc)
    /// - `0x68ff65f3` - Indexed BoC (serialized_boc_idx)
    /// - `0xacc3a728` - Indexed BoC with CRC32C (serialized_boc_idx_crc32c)
    pub fn deserialize(data: &[u8]) -> CellResult<Self> {
        if data.len() < 6 {
            return Err(CellError::UnexpectedEof);
        }

        let magic = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let mut offset = 4;

        let (has_idx, has_crc, size_bytes) = match magic {
            BOC_GENERIC_MAGIC => {
                let flags = data[offset];
                (flags & 0x80 != 0, flags & 0x40 != 0, (flags & 0x07) as usize)
            }
            BOC_INDEXED_MAGIC => (true, false, data[offset] as usize),
            BOC_INDEXED_CRC32_MAGIC => (true, true, data[offset] as usize),
            _ => {
                return Err(CellError::InvalidBoc(format!(
                    "Invalid magic: {:08x}, expected one of {:08x}, {:08x}, {:08x}",
                    magic, BOC_GENERIC_MAGIC, BOC_INDEXED_MAGIC, BOC_INDEXED_CRC32_MAGIC
                )));
            }
        };
        offset += 1;

        if size_bytes == 0 || size_bytes > 4 {
            return Err(CellError::InvalidBoc(format!("Invalid size_bytes: {}", size_bytes)));
        }

        let off_bytes = data[offset] as usize;
        offset += 1;
        if off_bytes == 0 || off_bytes > 8 {
            return Err(CellError::InvalidBoc(format!("Invalid off_bytes: {}", off_bytes)));
        }

        let data_end = if has_crc {
            let data_end = data.len().checked_sub(4).ok_or(CellError::UnexpectedEof)?;
            let expected = u32::from_le_bytes([
                data[data_end],
                data[data_end + 1],
                data[data_end + 2],
                data[data_end + 3],
            ]);
            let actual = crc32c(&data[..data_end]);
            if expected != actual {
                return Err(CellError::CrcMismatch { expected, actual });
            }
            data_end
        } else {
            data.len()
        };
        let data = &data[..data_end];

        let cells_count = Self::read_uint(data, &mut offset, size_bytes)? as usize;
        let roots_count = Self::read_uint(data, &mut offset, size_bytes)? as usize;
        let _absent_count = Self::read_uint(data, &mut offset, size_bytes)?;
        let total_cells_size = Self::read_uint(data, &mut offset, off_bytes)? as usize;

        if roots_count > cells_count {
            return Err(CellError::InvalidBoc(format!(
                "{} roots for {} cells",
                roots_count, cells_count
            )));
        }

        let mut root_indices = Vec::with_capacity(roots_count);
        for _ in 0..roots_count {
            root_indices.push(Self::read_uint(data, &mut offset, size_bytes)? as usize);
        }

        if has_idx {
            offset = cells_count
                .checked_mul(off_bytes)
                .and_then(|len| offset.checked_add(len))
                .ok_or(CellError::UnexpectedEof)?;
        }

        let cells_end = offset
            .checked_add(total_cells_size)
            .filter(|&end| end <= data.len())
            .ok_or(CellError::UnexpectedEof)?;
        let cells = Self::parse_cells(&data[offset..cells_end], cells_count, size_bytes)?;

        let roots = root_indices
            .iter()
            .map(|&idx| cells.get(idx).cloned().ok_or(CellError::CellNotFound(idx)))
            .collect::<CellResult<Vec<_>>>()?;

        Ok(BagOfCells { roots })
    }

    /// Deserialize from a standard base64 string.
    pub fn deserialize_from_base64(base64_str: &str) -> CellResult<Self> {
        let bytes = STANDARD
            .decode(base64_str.trim())
            .map_err(|e| CellError::InvalidBase64(e.to_string()))?;
        Self::deserialize(&bytes)
    }

    /// Deserialize from a hex string.
    pub fn deserialize_from_hex(hex_str: &str) -> CellResult<Self> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| CellError::InvalidBoc(format!("invalid hex string: {}", e)))?;
        Self::deserialize(&bytes)
    }

    /// Collect unique cells so that every parent precedes its children.
    ///
    /// Reversing a depth-first post-order gives a topological order of the DAG.
    fn collect_cells_parent_first(&self) -> Vec<Arc<Cell>> {
        let mut cells: Vec<Arc<Cell>> = Vec::new();
        let mut visited: HashMap<[u8; 32], ()> = HashMap::new();

        for root in self.roots.iter().rev() {
            Self::collect_post_order(root, &mut cells, &mut visited);
        }

        cells.reverse();
        cells
    }

    fn collect_post_order(
        cell: &Arc<Cell>,
        cells: &mut Vec<Arc<Cell>>,
        visited: &mut HashMap<[u8; 32], ()>,
    ) {
        if visited.insert(cell.hash(), ()).is_some() {
            return;
        }

        // Children are pushed in reverse so that, after the final reverse,
        // they appear in reference order.
        for reference in cell.references().iter().rev() {
            Self::collect_post_order(reference, cells, visited);
        }

        cells.push(cell.clone());
    }

    /// Serialize a single cell.
    fn serialize_cell(
        cell: &Cell,
        hash_to_index: &HashMap<[u8; 32], usize>,
        ref_size: usize,
    ) -> CellResult<Vec<u8>> {
        let mut result = Vec::with_capacity(2 + cell.byte_len() + cell.reference_count() * ref_size);

        let (d1, d2) = cell.descriptors();
        result.push(d1);
        result.push(d2);
        result.extend_from_slice(&cell.data_with_completion_tag());

        for reference in cell.references() {
            let idx = hash_to_index
                .get(&reference.hash())
                .ok_or_else(|| CellError::InvalidBoc("Reference not found".to_string()))?;
            Self::write_uint(&mut result, *idx as u64, ref_size);
        }

        Ok(result)
    }

    /// Parse cells from serialized data and link their references.
    fn parse_cells(data: &[u8], cell_count: usize, size_bytes: usize) -> CellResult<Vec<Arc<Cell>>> {
        let mut raw_cells: Vec<RawCell> = Vec::with_capacity(cell_count.min(data.len() / 2));
        let mut offset = 0;

        for _ in 0..cell_count {
            if offset + 2 > data.len() {
                return Err(CellError::UnexpectedEof);
            }

            let d1 = data[offset];
            let d2 = data[offset + 1];
            offset += 2;

            if d1 & 0x08 != 0 {
                let kind = data.get(offset).copied().unwrap_or(0);
                return Err(CellError::InvalidCellType(kind));
            }
            if d1 >> 5 != 0 {
                return Err(CellError::InvalidBoc(format!(
                    "Ordinary cell with level mask {}",
                    d1 >> 5
                )));
            }

            // Level 0 cells store one hash and one depth.
            let stored_hash = if d1 & 0x10 != 0 {
                let end = offset + HASH_BYTES + DEPTH_BYTES;
                if end > data.len() {
                    return Err(CellError::UnexpectedEof);
                }
                let mut hash = [0u8; HASH_BYTES];
                hash.copy_from_slice(&data[offset..offset + HASH_BYTES]);
                offset = end;
                Some(hash)
            } else {
                None
            };

            let refs_count = (d1 & 0x07) as usize;
            if refs_count > MAX_CELL_REFS {
                return Err(CellError::TooManyRefs(refs_count));
            }

            let data_len = (d2 as usize).div_ceil(2);
            if offset + data_len > data.len() {
                return Err(CellError::UnexpectedEof);
            }
            let cell_data = &data[offset..offset + data_len];
            offset += data_len;

            let bit_len = if d2.is_multiple_of(2) {
                data_len * 8
            } else {
                Self::find_bit_len(cell_data)?
            };
            if bit_len > MAX_CELL_BITS {
                return Err(CellError::DataTooLong(bit_len));
            }

            let mut refs = Vec::with_capacity(refs_count);
            for _ in 0..refs_count {
                refs.push(Self::read_uint(data, &mut offset, size_bytes)? as usize);
            }

            raw_cells.push(RawCell {
                data: Self::remove_completion_tag(cell_data, bit_len),
                bit_len,
                refs,
                stored_hash,
            });
        }

        // Parent-first bags reference higher indices, children-first bags
        // reference lower ones; build in whichever order resolves children first.
        let refs_point_higher = raw_cells
            .iter()
            .enumerate()
            .find_map(|(i, raw)| raw.refs.first().map(|&r| r > i))
            .unwrap_or(true);

        let order: Vec<usize> = if refs_point_higher {
            (0..cell_count).rev().collect()
        } else {
            (0..cell_count).collect()
        };

        let mut cells: Vec<Option<Arc<Cell>>> = vec![None; cell_count];
        for i in order {
            let raw = &raw_cells[i];
            let references = raw
                .refs
                .iter()
                .map(|&idx| {
                    cells
                        .get(idx)
                        .and_then(Clone::clone)
                        .ok_or(CellError::CellNotFound(idx))
                })
                .collect::<CellResult<Vec<_>>>()?;

            let cell = Cell::new(raw.data.clone(), raw.bit_len, references);
            if raw.stored_hash.is_some_and(|stored| stored != cell.hash()) {
                return Err(CellError::InvalidBoc(format!("Stored hash mismatch for cell {}", i)));
            }
            cells[i] = Some(Arc::new(cell));
        }

        cells
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.ok_or(CellError::CellNotFound(i)))
            .collect()
    }

    /// Find the bit length of a non-aligned cell from its completion tag:
    /// the last set bit of the final byte.
    fn find_bit_len(data: &[u8]) -> CellResult<usize> {
        match data.last() {
            Some(&last) if last != 0 => {
                Ok(data.len() * 8 - last.trailing_zeros() as usize - 1)
            }
            _ => Err(CellError::InvalidBoc("Missing completion tag".to_string())),
        }
    }

    /// Strip the completion tag, keeping exactly `bit_len` bits.
    fn remove_completion_tag(data: &[u8], bit_len: usize) -> Vec<u8> {
        let mut result = data[..bit_len.div_ceil(8)].to_vec();

        let remainder = bit_len % 8;
        if remainder != 0
            && let Some(last) = result.last_mut()
        {
            *last &= !((1u8 << (8 - remainder)) - 1);
        }

        result
    }

    /// Calculate bytes needed to represent a number.
    fn bytes_needed(n: usize) -> usize {
        if n == 0 {
            1
        } else {
            ((64 - (n as u64).leading_zeros()) as usize).div_ceil(8)
        }
    }

    /// Write an unsigned integer with specified byte width.
    fn write_uint(buf: &mut Vec<u8>, value: u64, bytes: usize) {
        for i in (0..bytes).rev() {
            buf.push((value >> (i * 8)) as u8);
        }
    }

    /// Read an unsigned integer with specified byte width.
    fn read_uint(data: &[u8], offset: &mut usize, bytes: usize) -> CellResult<u64> {
        if *offset + bytes > data.len() {
            return Err(CellError::UnexpectedEof);
        }

        let mut result: u64 = 0;
        for i in 0..bytes {
            result = (result << 8) | (data[*offset + i] as u64);
        }
        *offset += bytes;
        Ok(result)
    }
}
