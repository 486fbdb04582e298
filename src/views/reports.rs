//! Inventory report: one document, previewed as HTML and downloaded as CSV.

use anyhow::{Context, Result};

use super::ViewScope;
use crate::gateway::{GatewayError, ProductsApi};
use crate::models::{Product, Supplier};

pub const REPORT_TITLE: &str = "Carwash Reports";
pub const REPORT_FILENAME: &str = "Carwash_Reports.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub sections: Vec<ReportSection>,
}

/// Lay out the products table followed by the suppliers table.
pub fn build_report(products: &[Product], suppliers: &[Supplier]) -> ReportDocument {
    let products_section = ReportSection {
        title: "Products".to_string(),
        headers: ["Name", "Category", "Supplier", "Stock", "Price"]
            .map(String::from)
            .to_vec(),
        rows: products
            .iter()
            .map(|p| {
                vec![
                    p.name.clone(),
                    p.category_name().to_string(),
                    p.supplier_name().to_string(),
                    p.stock.to_string(),
                    p.price_display(),
                ]
            })
            .collect(),
    };

    let suppliers_section = ReportSection {
        title: "Suppliers".to_string(),
        headers: ["Name", "Contact", "Phone", "Email", "Address"]
            .map(String::from)
            .to_vec(),
        rows: suppliers
            .iter()
            .map(|s| {
                vec![
                    s.name.clone(),
                    s.contact_person_text().to_string(),
                    s.phone_text().to_string(),
                    s.email_text().to_string(),
                    s.address_text().to_string(),
                ]
            })
            .collect(),
    };

    ReportDocument {
        title: REPORT_TITLE.to_string(),
        sections: vec![products_section, suppliers_section],
    }
}

/// CSV rendition: a title line, then per section its title, header row
/// and rows, with a blank record before each section.
pub fn to_csv(document: &ReportDocument) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record([document.title.as_str()])?;
    for section in &document.sections {
        writer.write_record([""])?;
        writer.write_record([section.title.as_str()])?;
        writer.write_record(&section.headers)?;
        for row in &section.rows {
            writer.write_record(row)?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("{}", e.error()))
        .context("Failed to finish CSV report")
}

pub async fn load(api: &ProductsApi, scope: &ViewScope) -> Result<ReportDocument, GatewayError> {
    let (products, suppliers) = scope
        .run(async { tokio::try_join!(api.report_products(), api.report_suppliers()) })
        .await?;
    Ok(build_report(&products, &suppliers))
}
