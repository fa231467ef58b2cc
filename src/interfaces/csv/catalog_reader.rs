use crate::domain::catalog::{CategoryId, ProductDraft};
use crate::domain::money::Price;
use crate::error::{MarketError, Result};
use serde::Deserialize;
use std::io::Read;

/// One line of a supplier catalog:
/// `sku,name,category,price,stock,min_order,description`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CatalogRow {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub stock: u32,
    #[serde(default)]
    pub min_order: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CatalogRow {
    /// The product this row describes, filed under an already resolved category.
    pub fn into_draft(self, category_id: CategoryId) -> ProductDraft {
        ProductDraft {
            name: self.name,
            description: self.description.filter(|d| !d.is_empty()),
            price: self.price,
            sku: self.sku,
            stock: self.stock,
            min_order: self.min_order.unwrap_or(1),
            category_id,
            image: None,
        }
    }
}

/// Reads catalog rows from a CSV source.
///
/// Fields are trimmed and short rows are accepted, so trailing optional
/// columns can be left out.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes rows; a malformed row is an `Err` and the rest keep coming.
    pub fn rows(self) -> impl Iterator<Item = Result<CatalogRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(MarketError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "sku, name, category, price, stock, min_order, description\n\
                    GL-1, Nitrile gloves, Medical, 12.50, 400, 10, Box of 100\n\
                    PN-2, Ballpoint pens, Office, 0.80, 1000";
        let rows: Vec<Result<CatalogRow>> = CatalogReader::new(data.as_bytes()).rows().collect();

        assert_eq!(rows.len(), 2);
        let gloves = rows[0].as_ref().unwrap();
        assert_eq!(gloves.sku, "GL-1");
        assert_eq!(gloves.price.value(), dec!(12.50));
        assert_eq!(gloves.min_order, Some(10));
        assert_eq!(gloves.description.as_deref(), Some("Box of 100"));

        let pens = rows[1].as_ref().unwrap();
        assert_eq!(pens.min_order, None);
        assert_eq!(pens.description, None);
    }

    #[test]
    fn test_reader_malformed_lines() {
        let data = "sku,name,category,price,stock\n\
                    A,Free,Office,0,1\n\
                    B,Negative stock,Office,1.00,-3\n\
                    C,Fine,Office,1.00,3";
        let rows: Vec<Result<CatalogRow>> = CatalogReader::new(data.as_bytes()).rows().collect();

        assert!(rows[0].is_err());
        assert!(rows[1].is_err());
        assert!(rows[2].is_ok());
    }

    #[test]
    fn test_into_draft_defaults() {
        let row = CatalogRow {
            sku: "X".into(),
            name: "Thing".into(),
            category: "Misc".into(),
            price: Price::new(dec!(2)).unwrap(),
            stock: 5,
            min_order: None,
            description: Some(String::new()),
        };
        let category_id = uuid::Uuid::new_v4();
        let draft = row.into_draft(category_id);
        assert_eq!(draft.min_order, 1);
        assert_eq!(draft.description, None);
        assert_eq!(draft.category_id, category_id);
    }
}
