use crate::domain::catalog::ProductView;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// One line of the exported catalog: `sku,name,category,price,stock,supplier`.
#[derive(Debug, Serialize, PartialEq)]
pub struct CatalogRecord {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub stock: u32,
    pub supplier: String,
}

impl From<ProductView> for CatalogRecord {
    fn from(view: ProductView) -> Self {
        Self {
            sku: view.product.sku,
            name: view.product.name,
            category: view.category.map(|c| c.name).unwrap_or_default(),
            price: view.product.price.value().normalize(),
            stock: view.product.stock,
            supplier: view.supplier.map(|s| s.email).unwrap_or_default(),
        }
    }
}

pub struct CatalogWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CatalogWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header and one record per product, then flushes.
    pub fn write_catalog(&mut self, products: impl IntoIterator<Item = ProductView>) -> Result<()> {
        let mut wrote_any = false;
        for product in products {
            self.writer.serialize(CatalogRecord::from(product))?;
            wrote_any = true;
        }
        if !wrote_any {
            self.writer
                .write_record(["sku", "name", "category", "price", "stock", "supplier"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
