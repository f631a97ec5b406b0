//! Contract state init and offline address derivation.

use std::sync::Arc;

use crate::{Address, Cell, CellBuilder, CellResult};

/// Initial code and data of a contract.
///
/// Serialized as `split_depth:nothing special:nothing code:^Cell
/// data:^Cell library:nothing`, i.e. the bits `00110` followed by the two
/// references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateInit {
    pub code: Arc<Cell>,
    pub data: Arc<Cell>,
}

impl StateInit {
    pub fn new(code: Arc<Cell>, data: Arc<Cell>) -> Self {
        Self { code, data }
    }

    /// Build the state init cell.
    pub fn to_cell(&self) -> CellResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_bit(false)?; // split_depth
        builder.store_bit(false)?; // special
        builder.store_bit(true)?; // code
        builder.store_bit(true)?; // data
        builder.store_bit(false)?; // library
        builder.store_ref(self.code.clone())?;
        builder.store_ref(self.data.clone())?;
        builder.build()
    }

    /// The address a contract deployed with this state init gets.
    pub fn address(&self, workchain: i8) -> CellResult<Address> {
        Ok(Address::new(workchain, self.to_cell()?.hash()))
    }
}

/// Derive a contract address from its code and data.
pub fn derive_address(workchain: i8, code: Arc<Cell>, data: Arc<Cell>) -> CellResult<Address> {
    StateInit::new(code, data).address(workchain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellSlice;

    fn cell_with(value: u32) -> Arc<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u32(value).unwrap();
        Arc::new(builder.build().unwrap())
    }

    #[test]
    fn test_state_init_layout() {
        let init = StateInit::new(cell_with(1), cell_with(2));
        let cell = init.to_cell().unwrap();

        assert_eq!(cell.bit_len(), 5);
        assert_eq!(cell.reference_count(), 2);
        assert_eq!(cell.data()[0] >> 3, 0b00110);

        let mut slice = CellSlice::new(&cell);
        slice.skip_bits(5).unwrap();
        assert_eq!(slice.load_ref().unwrap().hash(), cell_with(1).hash());
        assert_eq!(slice.load_ref().unwrap().hash(), cell_with(2).hash());
    }

    #[test]
    fn test_address_is_state_init_hash() {
        let init = StateInit::new(cell_with(1), cell_with(2));
        let address = derive_address(0, cell_with(1), cell_with(2)).unwrap();
        assert_eq!(address.workchain, 0);
        assert_eq!(address.hash, init.to_cell().unwrap().hash());
    }

    #[test]
    fn test_data_changes_address() {
        let a = derive_address(0, cell_with(1), cell_with(2)).unwrap();
        let b = derive_address(0, cell_with(1), cell_with(3)).unwrap();
        let c = derive_address(-1, cell_with(1), cell_with(2)).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.hash, c.hash);
    }
}
