//! Products screen: admin CRUD table and the employee read-only catalog.

use serde::Deserialize;

use super::listing::{matches_search, ListQuery, Listing};
use super::validation::{self, FieldErrors};
use super::{submit, Submission, ViewScope};
use crate::gateway::{GatewayError, ProductsApi};
use crate::models::{Category, EntityId, Product, ProductPayload, Supplier};

/// Search matches the product name or its category's name.
pub fn search(product: &Product, term: &str) -> bool {
    matches_search(term, &[product.name.as_str(), product.category_name()])
}

#[derive(Debug, Clone)]
pub struct ProductsPage {
    pub listing: Listing<Product>,
    pub categories: Vec<Category>,
    pub suppliers: Vec<Supplier>,
    /// Whole unfiltered list, for edit lookups
    pub all: Vec<Product>,
}

impl ProductsPage {
    pub fn find(&self, id: &EntityId) -> Option<&Product> {
        super::find_by_id(&self.all, id, |p| &p.product_id)
    }
}

/// Categories and suppliers are fetched before products so the form's
/// select boxes and the joined names are ready together.
pub async fn load(
    api: &ProductsApi,
    scope: &ViewScope,
    query: &ListQuery,
    page_size: usize,
) -> Result<ProductsPage, GatewayError> {
    let categories = scope.run(api.categories().list()).await?;
    let suppliers = scope.run(api.suppliers().list()).await?;
    let products = scope.run(api.products().list()).await?;

    Ok(ProductsPage {
        listing: Listing::build(&products, query, page_size, search),
        categories,
        suppliers,
        all: products,
    })
}

/// Employee catalog row: only the columns an employee may see.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub name: String,
    pub category: String,
    pub stock: i64,
    pub low_stock: bool,
}

impl From<&Product> for CatalogRow {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category_name().to_string(),
            stock: product.stock,
            low_stock: product.is_low_stock(),
        }
    }
}

pub async fn load_catalog(
    api: &ProductsApi,
    scope: &ViewScope,
    query: &ListQuery,
    page_size: usize,
) -> Result<Listing<CatalogRow>, GatewayError> {
    let products = scope.run(api.products().list()).await?;
    let rows: Vec<CatalogRow> = products.iter().map(CatalogRow::from).collect();
    Ok(Listing::build(&rows, query, page_size, |row, term| {
        matches_search(term, &[row.name.as_str(), row.category.as_str()])
    }))
}

/// Create/edit form. Every field is kept as typed so a rejected form
/// comes back exactly as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub supplier_id: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub reorder_level: String,
}

impl ProductForm {
    pub fn edit(product: &Product) -> Self {
        Self {
            id: product.product_id.to_string(),
            name: product.name.clone(),
            description: product.description_text().to_string(),
            category_id: product.category_id_str().to_string(),
            supplier_id: product.supplier_id_str().to_string(),
            cost: product.cost.to_string(),
            price: product.price.to_string(),
            stock: product.stock.to_string(),
            reorder_level: product.reorder_level.to_string(),
        }
    }

    pub fn is_edit(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn record_id(&self) -> Option<EntityId> {
        EntityId::from_form(&self.id)
    }

    pub fn validate(&self) -> Result<ProductPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", validation::required_text(&self.name, "Name", 120));
        let category_id = EntityId::from_form(&self.category_id);
        if category_id.is_none() {
            errors.add("category_id", "Category is required");
        }
        let supplier_id = EntityId::from_form(&self.supplier_id);
        if supplier_id.is_none() {
            errors.add("supplier_id", "Supplier is required");
        }
        let cost = errors.check("cost", validation::amount(&self.cost, "Cost"));
        let price = errors.check("price", validation::amount(&self.price, "Price"));
        let stock = errors.check("stock", validation::count(&self.stock, "Stock", false));
        let reorder_level = errors.check(
            "reorder_level",
            validation::count(&self.reorder_level, "Reorder level", true),
        );

        match (name, category_id, supplier_id, cost, price, stock, reorder_level) {
            (
                Some(name),
                Some(category_id),
                Some(supplier_id),
                Some(cost),
                Some(price),
                Some(stock),
                Some(reorder_level),
            ) => Ok(ProductPayload {
                name,
                description: self.description.trim().to_string(),
                category_id,
                supplier_id,
                cost,
                price,
                stock,
                reorder_level,
            }),
            _ => Err(errors),
        }
    }
}

pub async fn save(api: &ProductsApi, scope: &ViewScope, form: ProductForm) -> Submission<ProductForm> {
    let payload = form.validate();
    let id = form.record_id();
    submit(scope, &api.products(), form, id, payload, "Product").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RestClient;
    use crate::test_support::StubBackend;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    fn backend() -> Router {
        Router::new()
            .route(
                "/api/categories",
                get(|| async { Json(json!([{"id": 1, "name": "Detailing"}])) }),
            )
            .route(
                "/api/suppliers",
                get(|| async { Json(json!([{"id": 4, "name": "Acme"}])) }),
            )
            .route(
                "/api/products",
                get(|| async {
                    Json(json!([
                        {"product_id": 1, "name": "Tire gel", "stock": 2, "reorder_level": 5,
                         "categories": {"name": "Detailing"}},
                        {"product_id": 2, "name": "Foam", "stock": 40, "reorder_level": 5,
                         "categories": {"name": "Washing"}},
                        {"product_id": 3, "name": "Glass cleaner", "stock": 9, "reorder_level": 3,
                         "categories": {"name": "Detailing"}}
                    ]))
                })
                .post(|| async { StatusCode::CREATED }),
            )
            .route("/api/products/:id", axum::routing::put(|| async { StatusCode::OK }))
    }

    fn valid_form() -> ProductForm {
        ProductForm {
            id: String::new(),
            name: "Wax".to_string(),
            description: "Carnauba".to_string(),
            category_id: "1".to_string(),
            supplier_id: "4".to_string(),
            cost: "3.5".to_string(),
            price: "7".to_string(),
            stock: "10".to_string(),
            reorder_level: "".to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_fetches_lookups_before_products() {
        let stub = StubBackend::spawn(backend()).await;
        let api = ProductsApi::new(RestClient::new(&stub.base_url, reqwest::Client::new()));
        let scope = ViewScope::child_of(&CancellationToken::new());

        let query = ListQuery {
            q: "detail".to_string(),
            page: None,
        };
        let page = load(&api, &scope, &query, 5).await.unwrap();
        assert_eq!(page.listing.filtered_count, 2, "matches on joined category name");
        assert_eq!(page.categories.len(), 1);
        assert!(page.find(&EntityId::from(2)).is_some());

        let order: Vec<String> = stub.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(order, vec!["/api/categories", "/api/suppliers", "/api/products"]);
    }

    #[tokio::test]
    async fn test_catalog_only_fetches_products() {
        let stub = StubBackend::spawn(backend()).await;
        let api = ProductsApi::new(RestClient::new(&stub.base_url, reqwest::Client::new()));
        let scope = ViewScope::child_of(&CancellationToken::new());

        let listing = load_catalog(&api, &scope, &ListQuery::default(), 5).await.unwrap();
        assert_eq!(listing.rows.len(), 3);
        assert!(listing.rows[0].low_stock);
        assert_eq!(stub.total(), 1);
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let form = ProductForm {
            name: " ".to_string(),
            cost: "-2".to_string(),
            price: "abc".to_string(),
            stock: "".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        for field in ["name", "category_id", "supplier_id", "cost", "price", "stock"] {
            assert!(errors.has(field), "missing error for {field}");
        }
        assert!(!errors.has("reorder_level"));
    }

    #[tokio::test]
    async fn test_save_posts_new_and_puts_existing() {
        let stub = StubBackend::spawn(backend()).await;
        let api = ProductsApi::new(RestClient::new(&stub.base_url, reqwest::Client::new()));
        let scope = ViewScope::child_of(&CancellationToken::new());

        let created = save(&api, &scope, valid_form()).await;
        assert!(matches!(created, Submission::Saved(_)));

        let edited = save(
            &api,
            &scope,
            ProductForm {
                id: "2".to_string(),
                ..valid_form()
            },
        )
        .await;
        assert!(matches!(edited, Submission::Saved(_)));

        let requests = stub.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].body.as_ref().unwrap()["reorder_level"], 0);
        assert_eq!(requests[0].body.as_ref().unwrap()["category_id"], 1);
        assert_eq!(requests[1].method, "PUT");
        assert_eq!(requests[1].path, "/api/products/2");
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let stub = StubBackend::spawn(backend()).await;
        let api = ProductsApi::new(RestClient::new(&stub.base_url, reqwest::Client::new()));
        let scope = ViewScope::child_of(&CancellationToken::new());

        let form = ProductForm {
            price: "-1".to_string(),
            ..valid_form()
        };
        match save(&api, &scope, form).await {
            Submission::Rejected { form, errors } => {
                assert_eq!(form.price, "-1");
                assert_eq!(errors, vec!["Price cannot be negative".to_string()]);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(stub.total(), 0);
    }
}
