//! Services backend: services, service categories, variants and product
//! assignments.

use reqwest::Method;

use super::{GatewayError, Resource, RestClient};
use crate::models::{AssignmentPayload, Service, ServiceCategory, Variant};

#[derive(Debug, Clone)]
pub struct ServicesApi {
    client: RestClient,
}

impl ServicesApi {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub fn services(&self) -> Resource<Service> {
        Resource::new(self.client.clone(), "/api/services")
    }

    pub fn categories(&self) -> Resource<ServiceCategory> {
        Resource::new(self.client.clone(), "/api/service-categories")
    }

    pub async fn variants(&self) -> Result<Vec<Variant>, GatewayError> {
        self.client.get_json("/api/variants").await
    }

    /// Attach one product (with quantity) to a service variant.
    pub async fn assign(&self, assignment: &AssignmentPayload) -> Result<(), GatewayError> {
        self.client
            .send(Method::POST, "/api/service-products/assign", assignment)
            .await
    }
}
