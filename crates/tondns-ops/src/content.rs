//! On-chain metadata of a DNS collection.
//!
//! Content is stored in the TEP-64 on-chain layout: a `0x00` tag followed by
//! a dictionary from `sha256(attribute)` to text cells, where each text cell
//! is another `0x00` tag and a snake string.

use std::sync::Arc;

use tondns_cell::{content_hash, Cell, CellBuilder, CellError, CellSlice, Dictionary};

use crate::error::OpsResult;

/// Base URL of collection images and item metadata.
pub const METADATA_BASE_URL: &str = "https://dns.ness.su/api/ton/";

const ATTR_NAME: &str = "name";
const ATTR_IMAGE: &str = "image";
const ATTR_DESCRIPTION: &str = "description";
const ATTR_PREFIX_URI: &str = "prefix_uri";

/// `u8 0` followed by the snake-encoded string.
pub fn text_cell(value: &str) -> OpsResult<Arc<Cell>> {
    let mut builder = CellBuilder::new();
    builder.store_u8(0)?;
    builder.store_string_tail(value)?;
    Ok(Arc::new(builder.build()?))
}

/// Upper-case the first character and lower-case the rest.
pub fn format_domain_name(domain: &str) -> String {
    let mut chars = domain.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// Collection metadata attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionContent {
    pub name: String,
    pub image: String,
    pub description: String,
    pub prefix_uri: String,
}

impl CollectionContent {
    /// Metadata for the `*.{domain}.ton` collection.
    pub fn for_domain(domain: &str) -> Self {
        let lower = domain.to_lowercase();
        Self {
            name: format!("{} DNS Domains", format_domain_name(domain)),
            image: format!("{}{}.png", METADATA_BASE_URL, lower),
            description: format!("*.{}.ton domains", lower),
            prefix_uri: METADATA_BASE_URL.to_string(),
        }
    }

    fn to_dict(&self) -> OpsResult<Dictionary> {
        let mut dict = Dictionary::new();
        dict.set(content_hash(ATTR_NAME), text_cell(&self.name)?);
        dict.set(content_hash(ATTR_IMAGE), text_cell(&self.image)?);
        dict.set(content_hash(ATTR_DESCRIPTION), text_cell(&self.description)?);
        dict.set(content_hash(ATTR_PREFIX_URI), text_cell(&self.prefix_uri)?);
        Ok(dict)
    }

    /// Encode as on-chain content.
    pub fn to_cell(&self) -> OpsResult<Cell> {
        let mut builder = CellBuilder::new();
        builder.store_u8(0)?;
        builder.store_dict(&self.to_dict()?)?;
        Ok(builder.build()?)
    }

    /// Decode on-chain content written by [`CollectionContent::to_cell`].
    pub fn from_cell(cell: &Cell) -> OpsResult<Self> {
        let mut slice = CellSlice::new(cell);
        let tag = slice.load_u8()?;
        if tag != 0 {
            return Err(CellError::InvalidCellType(tag).into());
        }
        let dict = Dictionary::load_from(&mut slice)?;

        let attribute = |name: &str| -> OpsResult<String> {
            let value = dict
                .get(&content_hash(name))
                .ok_or_else(|| CellError::InvalidDictionary(format!("missing {}", name)))?;
            let mut slice = CellSlice::new(value);
            slice.load_u8()?;
            Ok(slice.load_string_tail()?)
        };

        Ok(Self {
            name: attribute(ATTR_NAME)?,
            image: attribute(ATTR_IMAGE)?,
            description: attribute(ATTR_DESCRIPTION)?,
            prefix_uri: attribute(ATTR_PREFIX_URI)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_domain_name() {
        assert_eq!(format_domain_name("ness"), "Ness");
        assert_eq!(format_domain_name("NESS"), "Ness");
        assert_eq!(format_domain_name("x"), "X");
        assert_eq!(format_domain_name(""), "");
    }

    #[test]
    fn test_for_domain() {
        let content = CollectionContent::for_domain("NeSS");
        assert_eq!(content.name, "Ness DNS Domains");
        assert_eq!(content.image, "https://dns.ness.su/api/ton/ness.png");
        assert_eq!(content.description, "*.ness.ton domains");
        assert_eq!(content.prefix_uri, "https://dns.ness.su/api/ton/");
    }

    #[test]
    fn test_text_cell_layout() {
        let cell = text_cell("abc").unwrap();
        assert_eq!(cell.bit_len(), 32);
        assert_eq!(cell.data(), &[0, b'a', b'b', b'c']);
    }

    #[test]
    fn test_content_cell_roundtrip() {
        let content = CollectionContent::for_domain("example");
        let cell = content.to_cell().unwrap();

        // tag + dict presence bit
        assert_eq!(cell.bit_len(), 9);
        assert_eq!(cell.reference_count(), 1);
        assert_eq!(CollectionContent::from_cell(&cell).unwrap(), content);
    }

    #[test]
    fn test_content_is_deterministic() {
        let a = CollectionContent::for_domain("alpha").to_cell().unwrap();
        let b = CollectionContent::for_domain("alpha").to_cell().unwrap();
        let c = CollectionContent::for_domain("beta").to_cell().unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
    }
}
