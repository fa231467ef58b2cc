use super::catalog_reader::{CatalogReader, CatalogRow};
use crate::application::Marketplace;
use crate::domain::catalog::Product;
use crate::domain::user::User;
use crate::error::Result;
use std::io::Read;
use tracing::{info, warn};

/// Outcome of a catalog import.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Upserts every well-formed row under `supplier_email`.
///
/// Unreadable rows and rows the marketplace rejects are logged and skipped.
/// Only a failure to resolve the supplier aborts the run.
pub async fn import_catalog<R: Read>(
    market: &Marketplace,
    supplier_email: &str,
    source: R,
) -> Result<ImportReport> {
    let supplier = market.ensure_supplier(supplier_email).await?;
    let mut report = ImportReport::default();

    for (index, row) in CatalogReader::new(source).rows().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(line, error = %e, "skipping unreadable catalog row");
                report.skipped += 1;
                continue;
            }
        };

        let sku = row.sku.clone();
        match import_row(market, &supplier, row).await {
            Ok(_) => report.imported += 1,
            Err(e) => {
                warn!(line, sku = %sku, error = %e, "skipping rejected catalog row");
                report.skipped += 1;
            }
        }
    }

    info!(
        supplier = %supplier.email,
        imported = report.imported,
        skipped = report.skipped,
        "catalog import finished"
    );
    Ok(report)
}

async fn import_row(market: &Marketplace, supplier: &User, row: CatalogRow) -> Result<Product> {
    let category = market.ensure_category(&row.category).await?;
    market
        .upsert_product(supplier, row.into_draft(category.id))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::marketplace::testing::{marketplace, principal};
    use crate::domain::user::UserRole;
    use crate::error::MarketError;

    #[tokio::test]
    async fn test_import_skips_bad_rows_and_updates_existing() {
        let (market, _) = marketplace();
        let data = "sku,name,category,price,stock,min_order,description\n\
                    GL-1,Nitrile gloves,Medical,12.50,400,10,Box of 100\n\
                    BAD,Broken,Medical,abc,1\n\
                    PN-2,Pens,Office,0.80,1000";
        let report = import_catalog(&market, "Sales@Acme.test", data.as_bytes())
            .await
            .unwrap();
        assert_eq!(report, ImportReport { imported: 2, skipped: 1 });

        let again = "sku,name,category,price,stock\nGL-1,Nitrile gloves,medical,11.00,50";
        let report = import_catalog(&market, "sales@acme.test", again.as_bytes())
            .await
            .unwrap();
        assert_eq!(report.imported, 1);

        let snapshot = market.catalog_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].product.sku, "GL-1");
        assert_eq!(snapshot[0].product.stock, 50);
        assert_eq!(snapshot[0].product.min_order, 1);
        assert_eq!(market.list_categories().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_foreign_sku_is_skipped() {
        let (market, _) = marketplace();
        let data = "sku,name,category,price,stock\nSHARED,Thing,Misc,1.00,1";
        import_catalog(&market, "first@acme.test", data.as_bytes())
            .await
            .unwrap();
        let report = import_catalog(&market, "second@acme.test", data.as_bytes())
            .await
            .unwrap();
        assert_eq!(report, ImportReport { imported: 0, skipped: 1 });
    }

    #[tokio::test]
    async fn test_buyer_email_aborts_import() {
        let (market, _) = marketplace();
        let buyer = principal(&market, UserRole::Buyer).await;
        let data = "sku,name,category,price,stock\nX,Thing,Misc,1.00,1";
        let result = import_catalog(&market, &buyer.user.email, data.as_bytes()).await;
        assert!(matches!(result, Err(MarketError::Validation(_))));
    }
}
