//! Products backend: products, categories, suppliers and report feeds.

use super::{GatewayError, Resource, RestClient};
use crate::models::{Category, Product, Supplier};

#[derive(Debug, Clone)]
pub struct ProductsApi {
    client: RestClient,
}

impl ProductsApi {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub fn products(&self) -> Resource<Product> {
        Resource::new(self.client.clone(), "/api/products")
    }

    pub fn categories(&self) -> Resource<Category> {
        Resource::new(self.client.clone(), "/api/categories")
    }

    pub fn suppliers(&self) -> Resource<Supplier> {
        Resource::new(self.client.clone(), "/api/suppliers")
    }

    /// Products with category and supplier names joined in
    pub async fn report_products(&self) -> Result<Vec<Product>, GatewayError> {
        self.client.get_json("/api/reports/products").await
    }

    pub async fn report_suppliers(&self) -> Result<Vec<Supplier>, GatewayError> {
        self.client.get_json("/api/reports/suppliers").await
    }
}
