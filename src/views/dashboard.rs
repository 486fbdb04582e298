//! Dashboard summaries.

use super::ViewScope;
use crate::gateway::{AppointmentsApi, GatewayError, ProductsApi, ServicesApi};
use crate::models::Product;

/// Shown instead of any card when one of the admin fetches fails.
pub const DASHBOARD_ERROR: &str = "Failed to fetch dashboard data.";

#[derive(Debug, Clone, PartialEq)]
pub struct AdminSummary {
    pub total_products: usize,
    pub total_services: usize,
    pub total_suppliers: usize,
    pub total_appointments: usize,
    pub low_stock: Vec<Product>,
}

impl AdminSummary {
    pub fn from_lists(
        products: Vec<Product>,
        services: usize,
        suppliers: usize,
        appointments: usize,
    ) -> Self {
        let total_products = products.len();
        let low_stock = products.into_iter().filter(Product::is_low_stock).collect();
        Self {
            total_products,
            total_services: services,
            total_suppliers: suppliers,
            total_appointments: appointments,
            low_stock,
        }
    }

    pub fn low_stock_count(&self) -> usize {
        self.low_stock.len()
    }
}

/// All four lists are fetched concurrently. The summary only exists when
/// every fetch succeeded; there is no partial dashboard.
pub async fn load_admin(
    products: &ProductsApi,
    services: &ServicesApi,
    appointments: &AppointmentsApi,
    scope: &ViewScope,
) -> Result<AdminSummary, String> {
    let (product_res, service_res, supplier_res) =
        (products.products(), services.services(), products.suppliers());
    let result = scope
        .run(async {
            tokio::try_join!(
                product_res.list(),
                service_res.list(),
                supplier_res.list(),
                appointments.fetch()
            )
        })
        .await;

    match result {
        Ok((product_list, service_list, supplier_list, appointment_list)) => {
            Ok(AdminSummary::from_lists(
                product_list,
                service_list.len(),
                supplier_list.len(),
                appointment_list.len(),
            ))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Dashboard fetch failed");
            Err(DASHBOARD_ERROR.to_string())
        }
    }
}

/// Employee dashboard: the product count and nothing else.
pub async fn load_employee(products: &ProductsApi, scope: &ViewScope) -> Result<usize, GatewayError> {
    let list = scope.run(products.products().list()).await?;
    Ok(list.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RestClient;
    use crate::test_support::StubBackend;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    fn products_backend(suppliers_ok: bool) -> Router {
        let router = Router::new().route(
            "/api/products",
            get(|| async {
                Json(json!([
                    {"product_id": 1, "name": "Soap", "stock": 5, "reorder_level": 5},
                    {"product_id": 2, "name": "Wax", "stock": 6, "reorder_level": 5},
                    {"product_id": 3, "name": "Gel", "stock": 4, "reorder_level": 5}
                ]))
            }),
        );
        if suppliers_ok {
            router.route("/api/suppliers", get(|| async { Json(json!([{"id": 1, "name": "Acme"}])) }))
        } else {
            router.route("/api/suppliers", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        }
    }

    async fn apis(suppliers_ok: bool) -> (StubBackend, StubBackend, ProductsApi, ServicesApi, AppointmentsApi) {
        let products_stub = StubBackend::spawn(products_backend(suppliers_ok)).await;
        let other_stub = StubBackend::spawn(
            Router::new()
                .route(
                    "/api/services",
                    get(|| async { Json(json!([{"service_id": 1, "service_name": "Wash"}])) }),
                )
                .route(
                    "/appointments",
                    get(|| async { Json(json!({"appointments": [{}, {}, {}, {}]})) }),
                ),
        )
        .await;
        let http = reqwest::Client::new();
        let products = ProductsApi::new(RestClient::new(&products_stub.base_url, http.clone()));
        let services = ServicesApi::new(RestClient::new(&other_stub.base_url, http.clone()));
        let appointments =
            AppointmentsApi::new(http, &format!("{}/appointments", other_stub.base_url));
        (products_stub, other_stub, products, services, appointments)
    }

    #[tokio::test]
    async fn test_admin_summary_counts_and_low_stock() {
        let (_p, _o, products, services, appointments) = apis(true).await;
        let scope = ViewScope::child_of(&CancellationToken::new());

        let summary = load_admin(&products, &services, &appointments, &scope)
            .await
            .unwrap();
        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.total_services, 1);
        assert_eq!(summary.total_suppliers, 1);
        assert_eq!(summary.total_appointments, 4);
        let low: Vec<&str> = summary.low_stock.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(low, vec!["Soap", "Gel"]);
    }

    #[tokio::test]
    async fn test_any_failure_hides_the_whole_dashboard() {
        let (_p, _o, products, services, appointments) = apis(false).await;
        let scope = ViewScope::child_of(&CancellationToken::new());

        let err = load_admin(&products, &services, &appointments, &scope)
            .await
            .unwrap_err();
        assert_eq!(err, DASHBOARD_ERROR);
    }

    #[tokio::test]
    async fn test_employee_sees_product_count() {
        let (stub, _o, products, _s, _a) = apis(true).await;
        let scope = ViewScope::child_of(&CancellationToken::new());

        assert_eq!(load_employee(&products, &scope).await.unwrap(), 3);
        assert_eq!(stub.total(), 1);
    }
}
